//! Runtime configuration loaded from the environment (and `.env`).

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_RECORD_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Directory holding one `YYYY-MM-DD.log` per day
    pub record_dir: PathBuf,
    pub record_interval: Duration,
    /// External reporting endpoint; `None` disables forwarding only
    pub webhook_url: Option<String>,
    pub webhook_timeout: Duration,
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            record_dir: PathBuf::from("records"),
            record_interval: DEFAULT_RECORD_INTERVAL,
            webhook_url: None,
            webhook_timeout: DEFAULT_WEBHOOK_TIMEOUT,
            static_dir: PathBuf::from("static"),
        }
    }
}

impl AppConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);

        let record_dir = std::env::var("RECORD_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.record_dir);

        let record_interval =
            secs_from_env("RECORD_INTERVAL_SECS").unwrap_or(defaults.record_interval);
        let webhook_timeout =
            secs_from_env("WEBHOOK_TIMEOUT_SECS").unwrap_or(defaults.webhook_timeout);

        let webhook_url = std::env::var("WEBHOOK_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        if webhook_url.is_none() {
            tracing::info!("WEBHOOK_URL not set, records will only be written locally");
        }

        Self {
            port,
            record_dir,
            record_interval,
            webhook_url,
            webhook_timeout,
            static_dir,
        }
    }
}

/// Positive whole seconds, or `None` when unset/zero/garbage
fn secs_from_env(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PORT",
        "RECORD_DIR",
        "RECORD_INTERVAL_SECS",
        "WEBHOOK_URL",
        "WEBHOOK_TIMEOUT_SECS",
        "STATIC_DIR",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        clear_env();
        let config = AppConfig::from_env();

        assert_eq!(config.port, 4000);
        assert_eq!(config.record_dir, PathBuf::from("records"));
        assert_eq!(config.record_interval, Duration::from_secs(10));
        assert!(config.webhook_url.is_none());
    }

    #[test]
    #[serial]
    fn test_reads_overrides() {
        clear_env();
        std::env::set_var("PORT", "8080");
        std::env::set_var("RECORD_DIR", "/tmp/counts");
        std::env::set_var("RECORD_INTERVAL_SECS", "30");
        std::env::set_var("WEBHOOK_URL", "https://example.com/hook");

        let config = AppConfig::from_env();
        clear_env();

        assert_eq!(config.port, 8080);
        assert_eq!(config.record_dir, PathBuf::from("/tmp/counts"));
        assert_eq!(config.record_interval, Duration::from_secs(30));
        assert_eq!(config.webhook_url.as_deref(), Some("https://example.com/hook"));
    }

    #[test]
    #[serial]
    fn test_bad_values_fall_back() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("RECORD_INTERVAL_SECS", "0");
        std::env::set_var("WEBHOOK_URL", "   ");

        let config = AppConfig::from_env();
        clear_env();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.record_interval, DEFAULT_RECORD_INTERVAL);
        assert!(config.webhook_url.is_none());
    }
}
