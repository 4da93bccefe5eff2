//! Configuration management for Gramcast
//!
//! All configuration is environment-supplied and read once at process
//! start into an explicit [`Config`] struct; components receive what they
//! need by value instead of reading process-wide state.

use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::{ConfigError, Result};

/// Graph API base used when `GRAMCAST_GRAPH_URL` is not set.
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com/v19.0";

/// Container readiness polling defaults: 30 attempts at 10s is a 5 minute
/// ceiling per container.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_ATTEMPTS: u32 = 30;

#[derive(Clone)]
pub struct Config {
    /// Bearer credential supplied on every API call.
    pub access_token: String,

    /// Target account identifier on the publishing API.
    pub account_id: String,

    /// Location of the posts JSON document.
    pub posts_file: PathBuf,

    /// Timezone anchoring every post's schedule.
    pub timezone: Tz,

    /// Base URL of the publishing API.
    pub graph_url: String,

    pub polling: PollSettings,
}

/// Bounds of the container readiness loop. Tests inject a near-zero
/// interval so no suite ever waits on the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_POLL_ATTEMPTS,
        }
    }
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// Required: `GRAMCAST_ACCESS_TOKEN`, `GRAMCAST_ACCOUNT_ID`,
    /// `GRAMCAST_POSTS_FILE`, `GRAMCAST_TIMEZONE`. Optional:
    /// `GRAMCAST_GRAPH_URL`, `GRAMCAST_POLL_INTERVAL` (humantime form,
    /// e.g. "10s"), `GRAMCAST_POLL_ATTEMPTS`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVar` for an absent required variable
    /// and `ConfigError::InvalidValue` for one that fails to parse.
    pub fn from_env() -> Result<Self> {
        let access_token = required_var("GRAMCAST_ACCESS_TOKEN")?;
        let account_id = required_var("GRAMCAST_ACCOUNT_ID")?;

        let posts_file = required_var("GRAMCAST_POSTS_FILE")?;
        let posts_file = PathBuf::from(shellexpand::tilde(&posts_file).to_string());

        let timezone = required_var("GRAMCAST_TIMEZONE")?;
        let timezone: Tz = timezone.parse().map_err(|e| ConfigError::InvalidValue {
            name: "GRAMCAST_TIMEZONE".to_string(),
            reason: format!("{}", e),
        })?;

        let graph_url = std::env::var("GRAMCAST_GRAPH_URL")
            .unwrap_or_else(|_| DEFAULT_GRAPH_URL.to_string());

        let interval = match std::env::var("GRAMCAST_POLL_INTERVAL") {
            Ok(raw) => humantime::parse_duration(&raw).map_err(|e| ConfigError::InvalidValue {
                name: "GRAMCAST_POLL_INTERVAL".to_string(),
                reason: e.to_string(),
            })?,
            Err(_) => DEFAULT_POLL_INTERVAL,
        };

        let max_attempts = match std::env::var("GRAMCAST_POLL_ATTEMPTS") {
            Ok(raw) => raw.parse::<u32>().map_err(|e| ConfigError::InvalidValue {
                name: "GRAMCAST_POLL_ATTEMPTS".to_string(),
                reason: e.to_string(),
            })?,
            Err(_) => DEFAULT_POLL_ATTEMPTS,
        };

        Ok(Self {
            access_token,
            account_id,
            posts_file,
            timezone,
            graph_url,
            polling: PollSettings {
                interval,
                max_attempts,
            },
        })
    }
}

// The access token never appears in logs or debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_token", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("posts_file", &self.posts_file)
            .field("timezone", &self.timezone)
            .field("graph_url", &self.graph_url)
            .field("polling", &self.polling)
            .finish()
    }
}

fn required_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name.to_string()).into()),
    }
}
