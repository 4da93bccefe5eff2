//! Centralized logging configuration
//!
//! Log lines go to stderr so the batch summary on stdout stays clean for
//! pipelines. `GRAMCAST_LOG_FORMAT` selects text or JSON output and
//! `GRAMCAST_LOG_LEVEL` (or `RUST_LOG`) sets the filter.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text output
    Text,
    /// One JSON object per line, for cron/monitoring pipelines
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json",
                s
            )),
        }
    }
}

/// Initialize the tracing subscriber once at process start.
///
/// `verbose` forces a debug-level filter; otherwise the filter comes from
/// `RUST_LOG`, then `GRAMCAST_LOG_LEVEL`, then "info".
///
/// # Panics
///
/// Panics if a subscriber has already been installed.
pub fn init(format: LogFormat, verbose: bool) {
    let default_level = if verbose {
        "debug".to_string()
    } else {
        std::env::var("GRAMCAST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .init();
        }
    }
}

/// The format selected by `GRAMCAST_LOG_FORMAT`, falling back to text.
pub fn format_from_env() -> LogFormat {
    std::env::var("GRAMCAST_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LogFormat::Text)
}

/// Initialize with settings from the environment.
pub fn init_default() {
    init(format_from_env(), false);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
    }

    #[test]
    fn test_log_format_from_str_invalid() {
        let result = "pretty".parse::<LogFormat>();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid log format"));
    }
}
