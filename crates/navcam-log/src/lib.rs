//! Logging setup for the navigation camera.
//!
//! Library crates emit `tracing` events; hosts call [`init_logging`] once at
//! startup. Output goes to the console, and in debug builds also to a JSON file
//! for post-mortem analysis. `RUST_LOG` takes precedence over the configured
//! `debug.log_level`.

use navcam_config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_NAME: &str = "navcam.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - Optional directory for the JSON log file (debug builds only)
/// * `debug_build` - Whether this is a debug build (enables file logging)
/// * `config` - Optional configuration providing the log level
///
/// ```no_run
/// use navcam_config::Config;
/// use navcam_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let directive = filter_directive(config);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));

    let console = fmt::layer()
        .with_target(true)
        .compact()
        .with_timer(fmt::time::uptime());
    let registry = tracing_subscriber::registry().with(filter).with(console);

    let json_file = log_dir
        .filter(|_| debug_build)
        .and_then(|dir| std::fs::create_dir_all(dir).ok().map(|()| log_file_path(dir)))
        .and_then(|path| std::fs::File::create(path).ok());

    match json_file {
        Some(file) => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_current_span(false)
                    .with_timer(fmt::time::uptime()),
            )
            .init(),
        None => registry.init(),
    }
}

/// Filter directive from the config, or the default when unset.
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.clone()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Where the JSON log is written inside `log_dir`.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

/// An `EnvFilter` with the default directive.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
