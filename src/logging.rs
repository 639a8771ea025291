//! Opt-in diagnostics written to a temp-dir log file so the overlay never
//! scribbles over the host's screen.

use std::{env, fs, path::PathBuf, sync::OnceLock};

use tracing_subscriber::fmt::time::UtcTime;

use crate::config::AppConfig;

static LOGGING_INIT: OnceLock<()> = OnceLock::new();

/// Path of the log file, overridable through the environment.
pub fn log_file_path() -> PathBuf {
    env::var("POCKETMENU_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("pocketmenu.log"))
}

/// Install the global subscriber when logging was requested. Safe to call
/// more than once; only the first call wins.
pub fn init_logging(config: &AppConfig) {
    if !(config.logs || config.log_timings) {
        return;
    }
    let max_level = if config.log_timings {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let _ = LOGGING_INIT.get_or_init(|| {
        let path = log_file_path();
        let file = match fs::OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => file,
            Err(_) => return,
        };
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_timer(UtcTime::rfc_3339())
            .with_max_level(max_level)
            .with_writer(file)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
