use std::{fs::OpenOptions, path::Path, sync::Mutex};

use color_eyre::{Result, eyre::eyre};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// The interactive screen owns the terminal, so without a log file it gets no
/// subscriber at all. Plain commands log warnings to stderr.
pub fn init(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter("info"))
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|err| eyre!("failed to install log subscriber: {err}"))?;
        }
        None if interactive => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter("warn"))
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|err| eyre!("failed to install log subscriber: {err}"))?;
        }
    }

    Ok(())
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
