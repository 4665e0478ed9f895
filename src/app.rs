use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config;
use crate::data::{self, FeedSource, FileFeedSource, MockFeedSource};
use crate::logging;
use crate::model::Viewer;
use crate::ui;

/// Startup choices made on the command line.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub seed: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

pub fn run(opts: AppOptions) -> Result<()> {
    let cfg = config::load(config::LoadOptions {
        config_file: opts.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")?;
    let config_path = opts.config_file.clone().or_else(config::default_path);
    let display_path = friendly_path(config_path.as_ref());

    if let Err(err) = logging::init(&cfg.logging) {
        eprintln!("warning: logging disabled: {err:#}");
    }
    tracing::debug!(theme = %cfg.ui.theme, config = %display_path, "configuration loaded");

    let fallback_user = cfg.profile.user().unwrap_or_else(data::mock_viewer);
    let seed = opts.seed.or_else(|| cfg.feed.seed_file.clone());
    let source: Box<dyn FeedSource> = match seed.as_deref() {
        Some(path) => Box::new(FileFeedSource::open(path, fallback_user).context("open seed file")?),
        None => Box::new(MockFeedSource::new(fallback_user)),
    };

    let posts = source.load_posts().context("load posts")?;
    let viewer = Viewer::new(source.current_user());
    let origin = match seed.as_ref() {
        Some(path) => friendly_path(Some(path)),
        None => "built-in sample feed".to_string(),
    };
    tracing::info!(posts = posts.len(), viewer = %viewer.user.id, %origin, "feed ready");

    let status = format!(
        "Signed in as {}. {} posts from {}. Config: {}. Press n to write, q to quit.",
        viewer.user.name,
        posts.len(),
        origin,
        display_path
    );

    let options = ui::Options {
        status_message: status,
        posts,
        viewer,
        filter: cfg.feed.default_filter,
        feed_channels: cfg.feed.channels.clone(),
        composer_channels: cfg.composer.channels.clone(),
        default_channel: cfg.composer.default_channel.clone(),
        schedule_step: cfg.composer.schedule_step,
        replies_expanded: cfg.ui.replies_expanded,
    };

    let mut model = ui::Model::new(options);
    model.run()?;
    tracing::info!("session ended");

    Ok(())
}

fn friendly_path(path: Option<&PathBuf>) -> String {
    if let Some(path) = path {
        if let Some(home) = dirs::home_dir() {
            if let Ok(stripped) = path.strip_prefix(&home) {
                let mut display = String::from("~");
                if !stripped.as_os_str().is_empty() {
                    display.push_str(&format!("/{}", stripped.display()));
                }
                return display;
            }
        }
        path.display().to_string()
    } else {
        "~/.config/feed-tui/config.yaml".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friendly_path_abbreviates_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let path = home.join("notes").join("seed.yaml");
        assert_eq!(friendly_path(Some(&path)), "~/notes/seed.yaml");
    }

    #[test]
    fn friendly_path_falls_back_to_default_location() {
        assert_eq!(friendly_path(None), "~/.config/feed-tui/config.yaml");
    }
}
