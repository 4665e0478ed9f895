use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::composer::DEFAULT_CHANNEL;
use crate::data::{COMPOSER_CHANNELS, FEED_CHANNELS};
use crate::feed::FeedFilter;
use crate::model::User;

const DEFAULT_ENV_PREFIX: &str = "FEED_TUI";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub composer: ComposerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub replies_expanded: bool,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            replies_expanded: false,
        }
    }
}

fn default_theme() -> String {
    "default".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedConfig {
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
    #[serde(default)]
    pub default_filter: FeedFilter,
    #[serde(default = "default_feed_channels")]
    pub channels: Vec<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            seed_file: None,
            default_filter: FeedFilter::All,
            channels: default_feed_channels(),
        }
    }
}

fn default_feed_channels() -> Vec<String> {
    FEED_CHANNELS.iter().map(|name| name.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProfileConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl ProfileConfig {
    /// The configured identity, if one was given.
    pub fn user(&self) -> Option<User> {
        if self.id.trim().is_empty() || self.name.trim().is_empty() {
            return None;
        }
        Some(User {
            avatar: self.avatar.clone(),
            role: self.role.clone(),
            ..User::new(self.id.trim(), self.name.trim())
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComposerConfig {
    #[serde(default = "default_composer_channel")]
    pub default_channel: String,
    #[serde(default = "default_composer_channels")]
    pub channels: Vec<String>,
    #[serde(default = "default_schedule_step", with = "humantime_serde")]
    pub schedule_step: Duration,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            default_channel: default_composer_channel(),
            channels: default_composer_channels(),
            schedule_step: default_schedule_step(),
        }
    }
}

fn default_composer_channel() -> String {
    DEFAULT_CHANNEL.into()
}

fn default_composer_channels() -> Vec<String> {
    COMPOSER_CHANNELS.iter().map(|name| name.to_string()).collect()
}

fn default_schedule_step() -> Duration {
    Duration::from_secs(60 * 60)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

fn default_log_file() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join("feed-tui").join("feed-tui.log"))
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        if path.exists() {
            let from_file = read_config_file(path)?;
            cfg = merge_config(cfg, from_file);
        }
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    apply_env(&mut cfg, load_env(prefix));

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if !other.ui.theme.is_empty() {
        base.ui.theme = other.ui.theme;
    }
    base.ui.replies_expanded = other.ui.replies_expanded;

    if other.feed.seed_file.is_some() {
        base.feed.seed_file = other.feed.seed_file;
    }
    base.feed.default_filter = other.feed.default_filter;
    if !other.feed.channels.is_empty() {
        base.feed.channels = other.feed.channels;
    }

    if !other.profile.id.is_empty() {
        base.profile.id = other.profile.id;
    }
    if !other.profile.name.is_empty() {
        base.profile.name = other.profile.name;
    }
    if !other.profile.avatar.is_empty() {
        base.profile.avatar = other.profile.avatar;
    }
    if other.profile.role.is_some() {
        base.profile.role = other.profile.role;
    }

    if !other.composer.default_channel.is_empty() {
        base.composer.default_channel = other.composer.default_channel;
    }
    if !other.composer.channels.is_empty() {
        base.composer.channels = other.composer.channels;
    }
    if !other.composer.schedule_step.is_zero() {
        base.composer.schedule_step = other.composer.schedule_step;
    }

    base.logging.file = other.logging.file;
    if !other.logging.level.is_empty() {
        base.logging.level = other.logging.level;
    }

    base
}

fn load_env(prefix: &str) -> HashMap<String, String> {
    let upper_prefix = format!("{}_", prefix.to_uppercase());
    env::vars()
        .filter_map(|(key, value)| {
            key.strip_prefix(&upper_prefix)
                .map(|stripped| (stripped.to_ascii_lowercase().replace("__", "."), value))
        })
        .collect()
}

fn apply_env(cfg: &mut Config, values: HashMap<String, String>) {
    for (key, value) in values {
        apply_env_value(cfg, &key, value);
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "ui.theme" => cfg.ui.theme = value,
        "ui.replies_expanded" => cfg.ui.replies_expanded = parse_bool(&value),
        "feed.seed_file" => cfg.feed.seed_file = Some(PathBuf::from(value)),
        "feed.default_filter" => match serde_yaml::from_str::<FeedFilter>(&value) {
            Ok(filter) => cfg.feed.default_filter = filter,
            Err(err) => tracing::warn!(value = %value, error = %err, "ignoring feed filter"),
        },
        "feed.channels" => {
            let channels = parse_list(&value);
            if !channels.is_empty() {
                cfg.feed.channels = channels;
            }
        }
        "profile.id" => cfg.profile.id = value,
        "profile.name" => cfg.profile.name = value,
        "profile.avatar" => cfg.profile.avatar = value,
        "profile.role" => cfg.profile.role = Some(value),
        "composer.default_channel" => cfg.composer.default_channel = value,
        "composer.channels" => {
            let channels = parse_list(&value);
            if !channels.is_empty() {
                cfg.composer.channels = channels;
            }
        }
        "composer.schedule_step" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.composer.schedule_step = duration;
            }
        }
        "logging.file" => {
            cfg.logging.file = if value.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            }
        }
        "logging.level" => cfg.logging.level = value,
        // The log filter variable shares the prefix but is read by the logger.
        "log" => {}
        _ => tracing::debug!(key, "unknown config override"),
    }
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("feed-tui").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::tempdir;

    fn isolated(prefix: &str, config_file: Option<PathBuf>) -> LoadOptions {
        LoadOptions {
            config_file: Some(
                config_file.unwrap_or_else(|| PathBuf::from("/nonexistent/feed-tui.yaml")),
            ),
            env_prefix: Some(prefix.to_string()),
        }
    }

    #[test]
    fn load_defaults_without_files() {
        let cfg = load(isolated("FEED_TUI_TEST_DEFAULTS", None)).unwrap();
        assert_eq!(cfg.ui.theme, "default");
        assert_eq!(cfg.composer.default_channel, "General");
        assert_eq!(cfg.composer.schedule_step, Duration::from_secs(3600));
        assert_eq!(cfg.feed.channels.len(), 9);
        assert_eq!(cfg.feed.default_filter, FeedFilter::All);
        assert!(cfg.profile.user().is_none());
    }

    #[test]
    fn file_values_are_merged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "feed:\n  default_filter: saved\ncomposer:\n  schedule_step: 30m\nprofile:\n  id: u1\n  name: Casey\n",
        )
        .unwrap();
        let cfg = load(isolated("FEED_TUI_TEST_FILE", Some(path))).unwrap();
        assert_eq!(cfg.feed.default_filter, FeedFilter::Saved);
        assert_eq!(cfg.composer.schedule_step, Duration::from_secs(30 * 60));
        assert_eq!(cfg.composer.channels.len(), 5);
        assert_eq!(cfg.profile.user().unwrap().name, "Casey");
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "ui: [not, a, map").unwrap();
        let err = load(isolated("FEED_TUI_TEST_BROKEN", Some(path))).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn env_overrides() {
        env::set_var("FEED_TUI_TEST_ENV_UI__THEME", "dracula");
        env::set_var("FEED_TUI_TEST_ENV_FEED__CHANNELS", "One, Two");
        env::set_var("FEED_TUI_TEST_ENV_FEED__DEFAULT_FILTER", "my-posts");
        let cfg = load(isolated("FEED_TUI_TEST_ENV", None)).unwrap();
        assert_eq!(cfg.ui.theme, "dracula");
        assert_eq!(cfg.feed.channels, vec!["One".to_string(), "Two".to_string()]);
        assert_eq!(cfg.feed.default_filter, FeedFilter::MyPosts);
        env::remove_var("FEED_TUI_TEST_ENV_UI__THEME");
        env::remove_var("FEED_TUI_TEST_ENV_FEED__CHANNELS");
        env::remove_var("FEED_TUI_TEST_ENV_FEED__DEFAULT_FILTER");
    }
}
