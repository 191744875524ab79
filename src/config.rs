// Configuration for the chat client
//
// Configuration is loaded in order of precedence:
// 1. Environment variables (highest priority)
// 2. Config file (~/.config/polychat/config.toml)
// 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::path::PathBuf;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default production backend
pub const PRODUCTION_BASE_URL: &str = "https://langchain-rag-chatbot.onrender.com";

/// Local development backend (selected by --local)
pub const LOCAL_BASE_URL: &str = "http://localhost:8000";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Retry behavior for the API client
///
/// The backend occasionally drops connections; a single retry with a small
/// jittered delay recovers most of those without hammering the server.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt (only for network-level failures)
    pub max_retries: u32,

    /// Jitter window in milliseconds for the delay before a retry
    pub jitter_min_ms: u64,
    pub jitter_max_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            jitter_min_ms: 200,
            jitter_max_ms: 700,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the chatbot backend (no trailing slash)
    pub base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Seconds between background health probes
    pub probe_interval_secs: u64,

    /// Maximum message length accepted by the backend
    pub max_message_len: usize,

    /// Retry behavior for message sends
    pub retry: RetryConfig,

    /// Theme name: "dark" or "light"
    pub theme: String,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: PRODUCTION_BASE_URL.to_string(),
            request_timeout_secs: 30,
            probe_interval_secs: 30,
            max_message_len: 4000,
            retry: RetryConfig::default(),
            theme: "dark".to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Retry settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
struct FileRetry {
    max_retries: Option<u32>,
    jitter_min_ms: Option<u64>,
    jitter_max_ms: Option<u64>,
}

/// Logging settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
struct FileLogging {
    level: Option<String>,
}

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    probe_interval_secs: Option<u64>,
    max_message_len: Option<usize>,
    theme: Option<String>,

    /// Optional [retry] section
    retry: Option<FileRetry>,

    /// Optional [logging] section
    logging: Option<FileLogging>,
}

impl Config {
    /// Load configuration: env vars > config file > defaults
    pub fn from_env() -> Self {
        let mut config = Config::default();

        // Layer 1: config file
        if let Some(file) = Self::load_file() {
            config.apply_file(file);
        }

        // Layer 2: environment variables
        if let Ok(url) = std::env::var("POLYCHAT_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(theme) = std::env::var("POLYCHAT_THEME") {
            config.theme = theme;
        }
        if let Ok(level) = std::env::var("POLYCHAT_LOG") {
            config.logging.level = level;
        }
        if let Ok(secs) = std::env::var("POLYCHAT_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout_secs = secs;
            }
        }

        config.normalize();
        config
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(url) = file.base_url {
            self.base_url = url;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
        if let Some(secs) = file.probe_interval_secs {
            self.probe_interval_secs = secs;
        }
        if let Some(len) = file.max_message_len {
            self.max_message_len = len;
        }
        if let Some(theme) = file.theme {
            self.theme = theme;
        }
        if let Some(retry) = file.retry {
            if let Some(n) = retry.max_retries {
                self.retry.max_retries = n;
            }
            if let Some(ms) = retry.jitter_min_ms {
                self.retry.jitter_min_ms = ms;
            }
            if let Some(ms) = retry.jitter_max_ms {
                self.retry.jitter_max_ms = ms;
            }
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
        }
    }

    /// Drop the trailing slash so route formatting stays uniform
    fn normalize(&mut self) {
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        if self.retry.jitter_max_ms < self.retry.jitter_min_ms {
            self.retry.jitter_max_ms = self.retry.jitter_min_ms;
        }
    }

    /// Path to the config file, if a config directory exists on this platform
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("polychat").join("config.toml"))
    }

    fn load_file() -> Option<FileConfig> {
        let path = Self::config_path()?;
        let contents = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&contents) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Warning: ignoring malformed config file: {}", e);
                None
            }
        }
    }

    /// Render the current configuration as a commented TOML template
    pub fn to_toml(&self) -> String {
        format!(
            r#"# polychat configuration
# Values here are overridden by POLYCHAT_* environment variables.

# Backend base URL
base_url = "{base_url}"

# Per-request timeout in seconds
request_timeout_secs = {timeout}

# Seconds between background health probes
probe_interval_secs = {probe}

# Maximum message length the backend accepts
max_message_len = {max_len}

# Theme: "dark" or "light"
theme = "{theme}"

[retry]
# Retries after the first attempt (network failures only)
max_retries = {retries}
# Jitter window for the delay before a retry
jitter_min_ms = {jmin}
jitter_max_ms = {jmax}

[logging]
# Log level: trace, debug, info, warn, error
level = "{level}"
"#,
            base_url = self.base_url,
            timeout = self.request_timeout_secs,
            probe = self.probe_interval_secs,
            max_len = self.max_message_len,
            theme = self.theme,
            retries = self.retry.max_retries,
            jmin = self.retry.jitter_min_ms,
            jmax = self.retry.jitter_max_ms,
            level = self.logging.level,
        )
    }

    /// Write a default config file if none exists (helps users discover options)
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        let _ = std::fs::write(&path, Config::default().to_toml());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_production() {
        let config = Config::default();
        assert_eq!(config.base_url, PRODUCTION_BASE_URL);
        assert_eq!(config.max_message_len, 4000);
        assert_eq!(config.retry.max_retries, 1);
    }

    #[test]
    fn file_values_override_defaults() {
        let file: FileConfig = toml::from_str(
            r#"
            base_url = "http://localhost:8000"
            theme = "light"

            [retry]
            max_retries = 2

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply_file(file);

        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.theme, "light");
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.logging.level, "debug");
        // Untouched values keep defaults
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn partial_file_is_accepted() {
        let file: FileConfig = toml::from_str("theme = \"light\"").unwrap();
        let mut config = Config::default();
        config.apply_file(file);
        assert_eq!(config.theme, "light");
        assert_eq!(config.base_url, PRODUCTION_BASE_URL);
    }

    #[test]
    fn normalize_strips_trailing_slash() {
        let mut config = Config {
            base_url: "http://localhost:8000/".to_string(),
            ..Config::default()
        };
        config.normalize();
        assert_eq!(config.base_url, "http://localhost:8000");
    }

    #[test]
    fn template_round_trips_through_toml() {
        let rendered = Config::default().to_toml();
        let parsed: FileConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.base_url.as_deref(), Some(PRODUCTION_BASE_URL));
        assert_eq!(parsed.logging.unwrap().level.as_deref(), Some("info"));
    }
}
