//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `BOOKSHELF` (nested keys use `__`).
//!
//! # Configuration File Format
//!
//! ```toml
//! [api_keys]
//! google_books = "your-api-key"
//!
//! [providers]
//! google_books_url = "https://www.googleapis.com/books/v1"
//! open_library_url = "https://openlibrary.org"
//! open_library_covers_url = "https://covers.openlibrary.org/b"
//! page_size = 10
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [search]
//! failure_policy = "fail_fast"
//! fetch_details = true
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Environment overrides, e.g. `BOOKSHELF__SEARCH__FAILURE_POLICY=tolerate`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::aggregator::PartialFailurePolicy;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "BOOKSHELF";

/// Config file name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "bookshelf-search.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API keys for catalog services
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Catalog endpoints
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Aggregation settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Google Books API key
    #[serde(default = "default_google_books_key")]
    pub google_books: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            google_books: default_google_books_key(),
        }
    }
}

fn default_google_books_key() -> Option<String> {
    std::env::var("GOOGLE_BOOKS_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Catalog endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_google_books_url")]
    pub google_books_url: String,

    #[serde(default = "default_open_library_url")]
    pub open_library_url: String,

    #[serde(default = "default_open_library_covers_url")]
    pub open_library_covers_url: String,

    /// Results requested from each catalog per search
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            google_books_url: default_google_books_url(),
            open_library_url: default_open_library_url(),
            open_library_covers_url: default_open_library_covers_url(),
            page_size: default_page_size(),
        }
    }
}

fn default_google_books_url() -> String {
    "https://www.googleapis.com/books/v1".to_string()
}

fn default_open_library_url() -> String {
    "https://openlibrary.org".to_string()
}

fn default_open_library_covers_url() -> String {
    "https://covers.openlibrary.org/b".to_string()
}

fn default_page_size() -> usize {
    crate::models::DEFAULT_PAGE_SIZE
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Overrides the default `bookshelf-search/<version>` user agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: None,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Aggregation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// What happens when one catalog fails during a search
    #[serde(default)]
    pub failure_policy: PartialFailurePolicy,

    /// Whether Open Library results are enriched with edition and work records
    #[serde(default = "default_true")]
    pub fetch_details: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            failure_policy: PartialFailurePolicy::default(),
            fetch_details: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Check values that would otherwise fail at request time
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.page_size == 0 {
            return Err(ConfigError::Invalid(
                "providers.page_size must be at least 1".to_string(),
            ));
        }
        if self.http.timeout_secs == 0 || self.http.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http timeouts must be at least 1 second".to_string(),
            ));
        }

        for (name, value) in [
            ("providers.google_books_url", &self.providers.google_books_url),
            ("providers.open_library_url", &self.providers.open_library_url),
            (
                "providers.open_library_covers_url",
                &self.providers.open_library_covers_url,
            ),
        ] {
            url::Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{} is not a valid URL: {}", name, e)))?;
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Get the configuration from environment variables and defaults only
pub fn get_config() -> Result<Config, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Per-user config file location (`<config dir>/bookshelf-search/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bookshelf-search").join("config.toml"))
}

/// Find a config file in the working directory or the per-user location
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    default_config_path().filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.providers.page_size, 10);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.search.failure_policy, PartialFailurePolicy::FailFast);
        assert!(config.search.fetch_details);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(
            &path,
            r#"
[api_keys]
google_books = "test-key"

[providers]
open_library_url = "http://127.0.0.1:9000"
page_size = 5

[search]
failure_policy = "tolerate"
fetch_details = false

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.api_keys.google_books, Some("test-key".to_string()));
        assert_eq!(config.providers.open_library_url, "http://127.0.0.1:9000");
        assert_eq!(
            config.providers.google_books_url,
            "https://www.googleapis.com/books/v1"
        );
        assert_eq!(config.providers.page_size, 5);
        assert_eq!(config.search.failure_policy, PartialFailurePolicy::Tolerate);
        assert!(!config.search.fetch_details);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api_keys.google_books = Some("saved-key".to_string());
        config.providers.page_size = 20;
        config.save(&path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.api_keys.google_books, Some("saved-key".to_string()));
        assert_eq!(loaded.providers.page_size, 20);
    }

    #[test]
    fn test_config_rejects_zero_page_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[providers]\npage_size = 0\n").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_rejects_bad_url() {
        let mut config = Config::default();
        config.providers.google_books_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_nonexistent() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_file_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        std::fs::write(&path, "invalid = toml = content").unwrap();

        assert!(load_config(&path).is_err());
    }
}
