//! Structured logging for strata.
//!
//! Console output with uptime timestamps and thread names, plus a JSON log
//! file in debug builds. The level comes from `RUST_LOG` when set, otherwise
//! from the config's `debug.log_level`.

use std::path::Path;

use strata_config::Config;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE: &str = "strata.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - enables file logging
/// * `config` - source of the default log level
///
/// Panics if a global subscriber is already installed.
///
/// ```no_run
/// use strata_config::Config;
/// use strata_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter = log_filter(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true) // chunk build workers are named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && let Ok(file_layer) = json_file_layer(log_dir)
    {
        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Filter directive for `config`, falling back to [`DEFAULT_FILTER`].
pub fn log_filter(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.clone()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// A layer writing one JSON object per event to `log_dir/strata.log`,
/// creating the directory if needed.
pub fn json_file_layer<S>(log_dir: &Path) -> std::io::Result<impl Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    std::fs::create_dir_all(log_dir)?;
    let log_file = std::fs::File::create(log_dir.join(LOG_FILE))?;

    Ok(fmt::layer()
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::uptime())
        .json())
}
