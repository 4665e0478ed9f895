use std::path::PathBuf;

use feed_tui::app::AppOptions;

fn main() {
    let opts = match handle_cli_flags() {
        Ok(Some(opts)) => opts,
        Ok(None) => return,
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    };

    if let Err(err) = feed_tui::run(opts) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

/// Returns `None` when a flag handled everything and the UI should not start.
fn handle_cli_flags() -> anyhow::Result<Option<AppOptions>> {
    let mut opts = AppOptions::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("Feed-TUI {}", feed_tui::VERSION);
                return Ok(None);
            }
            "--help" | "-h" => {
                println!(
                    "Feed-TUI — Browse and post to a community feed from the terminal.\n\n  --version, -V          Show version and exit\n  --help,    -h          Show this help message\n  --seed <path>          Load posts from a YAML or JSON seed file\n  --config <path>        Read configuration from <path>\n  --export-seed <path>   Write the built-in sample feed as YAML and exit"
                );
                return Ok(None);
            }
            "--seed" => opts.seed = Some(PathBuf::from(flag_value(&mut args, "--seed")?)),
            "--config" => {
                opts.config_file = Some(PathBuf::from(flag_value(&mut args, "--config")?))
            }
            "--export-seed" => {
                let path = PathBuf::from(flag_value(&mut args, "--export-seed")?);
                feed_tui::data::export_seed(&path)?;
                println!("Wrote sample feed to {}", path.display());
                return Ok(None);
            }
            other => anyhow::bail!("unknown argument {other}; see --help"),
        }
    }
    Ok(Some(opts))
}

fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<String> {
    args.next()
        .filter(|value| !value.starts_with('-'))
        .ok_or_else(|| anyhow::anyhow!("{flag} needs a path"))
}
