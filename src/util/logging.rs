//! Structured logging setup
//!
//! Wraps `tracing-subscriber` so the binary and embedding tools get the same
//! filtering rules. Output always goes to stderr, leaving stdout free for the
//! rendered descriptor.
//!
//! # Example
//!
//! ```no_run
//! use mojo_descriptor::util::logging;
//! use tracing::{debug, info};
//!
//! logging::init_from_env();
//!
//! info!("Extraction started");
//! debug!(goal = "run", "Assembled mojo descriptor");
//! ```

use std::env;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

const LEVEL_ENV: &str = "MOJO_DESCRIPTOR_LOG_LEVEL";
const JSON_ENV: &str = "MOJO_DESCRIPTOR_LOG_JSON";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's own events
    pub level: Level,

    /// Emit one JSON object per event
    pub use_json: bool,

    /// Include the module target (e.g., mojo_descriptor::scanner)
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
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

    /// JSON output with full event metadata, for build servers that collect logs
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            ..Default::default()
        }
    }
}

/// Parses a log level name, case-insensitively.
///
/// Unknown names fall back to `INFO`.
///
/// ```
/// use mojo_descriptor::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("chatty"), Level::INFO);
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

/// The crate-level directive for `level`, e.g. `mojo_descriptor=debug`
fn crate_directive(level: Level) -> Option<Directive> {
    format!("{}={}", env!("CARGO_CRATE_NAME"), level)
        .parse()
        .ok()
}

/// Builds the event filter: `RUST_LOG` first, then the crate's own level.
pub fn build_filter(level: Level) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match crate_directive(level) {
        Some(directive) => filter.add_directive(directive),
        None => filter,
    }
}

/// Installs the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from `MOJO_DESCRIPTOR_LOG_LEVEL` and
/// `MOJO_DESCRIPTOR_LOG_JSON`; `RUST_LOG` is honoured as usual.
pub fn init_from_env() {
    init_logging(config_from_env());
}

/// Logging settings from `MOJO_DESCRIPTOR_LOG_LEVEL` and
/// `MOJO_DESCRIPTOR_LOG_JSON`.
pub fn config_from_env() -> LoggingConfig {
    let level = env::var(LEVEL_ENV)
        .map(|s| parse_level(&s))
        .unwrap_or(Level::INFO);

    let use_json = env::var(JSON_ENV)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    LoggingConfig {
        level,
        use_json,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("Debug"), Level::DEBUG);
        assert_eq!(parse_level("INFO"), Level::INFO);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_presets() {
        let default = LoggingConfig::default();
        assert_eq!(default.level, Level::INFO);
        assert!(!default.use_json);

        let production = LoggingConfig::production();
        assert!(production.use_json);
        assert!(production.include_location);

        let development = LoggingConfig::development();
        assert_eq!(development.level, Level::DEBUG);
        assert!(!development.use_json);
        assert!(development.include_target);
    }

    #[test]
    fn test_crate_directive() {
        let directive = crate_directive(Level::DEBUG).unwrap();
        assert_eq!(directive.to_string(), "mojo_descriptor=debug");
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        env::set_var(LEVEL_ENV, "warn");
        env::set_var(JSON_ENV, "true");
        let config = config_from_env();
        env::remove_var(LEVEL_ENV);
        env::remove_var(JSON_ENV);

        assert_eq!(config.level, Level::WARN);
        assert!(config.use_json);
    }
}
