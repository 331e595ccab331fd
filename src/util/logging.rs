//! Structured logging setup for redock
//!
//! Two destinations are configured:
//!
//! - stderr, pretty or JSON. When the console progress handler is active the
//!   `redock::progress` target is left out here, since those events are
//!   already printed for the user.
//! - an append-only, non-ANSI log file in the project root (`redock.log` by
//!   default) that records everything, progress events included.
//!
//! `RUST_LOG` replaces the default `redock=<level>` filter when set.
//!
//! # Example
//!
//! ```no_run
//! use redock::util::logging::{init_logging, LoggingConfig};
//! use tracing::Level;
//!
//! init_logging(LoggingConfig {
//!     level: Level::DEBUG,
//!     log_file: Some("/tmp/app/redock.log".into()),
//!     ..Default::default()
//! });
//!
//! tracing::info!("Application started");
//! ```

use crate::progress::PROGRESS_TARGET;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output on stderr
    pub use_json: bool,

    /// Include the module target (e.g., redock::workflow) in stderr logs
    pub include_target: bool,

    /// Leave progress events to the console handler
    pub console_progress: bool,

    /// Append log records to this file
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            console_progress: true,
            log_file: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }
}

/// Parses a log level from a string
///
/// Unknown values fall back to `Level::INFO` with a warning on stderr.
///
/// ```
/// use redock::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("INFO"), Level::INFO);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Picks the level from, in order: an explicit `--log-level`, `-v`, `-q`,
/// then `REDOCK_LOG_LEVEL` as read by `lookup`
pub fn resolve_level<F>(log_level: Option<&str>, verbose: bool, quiet: bool, lookup: F) -> Level
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(level) = log_level {
        parse_level(level)
    } else if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        lookup("REDOCK_LOG_LEVEL")
            .map(|level| parse_level(&level))
            .unwrap_or(Level::INFO)
    }
}

/// `REDOCK_LOG_JSON=true` switches stderr output to JSON
pub fn json_from_env() -> bool {
    env::var("REDOCK_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false)
}

/// Installs the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            for directive in [
                format!("redock={}", config.level),
                "bollard=warn".to_string(),
                "hyper=warn".to_string(),
            ] {
                if let Ok(directive) = directive.parse() {
                    filter = filter.add_directive(directive);
                }
            }
        }

        let hide_progress = config.console_progress;
        let not_progress = filter_fn(move |meta| !(hide_progress && meta.target() == PROGRESS_TARGET));

        let stderr_layer = if config.use_json {
            fmt::layer()
                .json()
                .with_target(config.include_target)
                .with_writer(std::io::stderr)
                .with_filter(not_progress)
                .boxed()
        } else {
            fmt::layer()
                .with_target(config.include_target)
                .with_writer(std::io::stderr)
                .with_filter(not_progress)
                .boxed()
        };

        let file_layer = config.log_file.as_ref().and_then(|path| {
            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(true)
                        .with_writer(Mutex::new(file)),
                ),
                Err(e) => {
                    eprintln!("Cannot open log file {}: {}", path.display(), e);
                    None
                }
            }
        });

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    });
}

/// Initializes logging from `REDOCK_LOG_LEVEL` and `REDOCK_LOG_JSON` only
pub fn init_from_env() {
    init_logging(LoggingConfig {
        level: resolve_level(None, false, false, |key| env::var(key).ok()),
        use_json: json_from_env(),
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use yare::parameterized;

    #[parameterized(
        trace = { "trace", Level::TRACE },
        debug = { "debug", Level::DEBUG },
        info = { "info", Level::INFO },
        warn = { "warn", Level::WARN },
        error = { "error", Level::ERROR },
        upper = { "DEBUG", Level::DEBUG },
        mixed = { "Warn", Level::WARN },
        invalid = { "loud", Level::INFO },
        empty = { "", Level::INFO },
    )]
    fn test_parse_level(input: &str, expected: Level) {
        assert_eq!(parse_level(input), expected);
    }

    #[test]
    fn test_resolve_level_precedence() {
        let env = |key: &str| (key == "REDOCK_LOG_LEVEL").then(|| "warn".to_string());
        let no_env = |_: &str| None;

        assert_eq!(resolve_level(Some("trace"), true, false, env), Level::TRACE);
        assert_eq!(resolve_level(None, true, false, env), Level::DEBUG);
        assert_eq!(resolve_level(None, false, true, env), Level::ERROR);
        assert_eq!(resolve_level(None, false, false, env), Level::WARN);
        assert_eq!(resolve_level(None, false, false, no_env), Level::INFO);
    }

    #[test]
    #[serial]
    fn test_json_from_env() {
        env::remove_var("REDOCK_LOG_JSON");
        assert!(!json_from_env());
        env::set_var("REDOCK_LOG_JSON", "true");
        assert!(json_from_env());
        env::set_var("REDOCK_LOG_JSON", "yes please");
        assert!(!json_from_env());
        env::remove_var("REDOCK_LOG_JSON");
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
        assert!(config.console_progress);
        assert!(config.log_file.is_none());

        assert_eq!(LoggingConfig::with_level(Level::DEBUG).level, Level::DEBUG);
    }
}
