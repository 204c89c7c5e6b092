use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. The terminal belongs to the UI, so logs
/// go to `log_file` when given and are discarded otherwise.
///
/// Only the first call installs anything. Later calls still open `log_file`
/// but keep the existing subscriber, and report that through it.
pub fn init(log_file: Option<&Path>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init(),
    };
    if let Err(err) = installed {
        tracing::debug!(error = %err, "subscriber already installed, keeping it");
    }
    Ok(())
}
