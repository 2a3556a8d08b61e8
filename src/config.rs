use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound on listing pages fetched at once
pub const MAX_FETCH_CONCURRENCY: usize = 64;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Where price history is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Json,
    Postgres,
}

impl StoreBackend {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "json" => Ok(StoreBackend::Json),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            _ => Err(format!(
                "Invalid STORE_BACKEND: {}. Must be one of: [\"json\", \"postgres\"]",
                s
            )),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Listing fetch configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub listing_path: String,
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Storage locations
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub history_file: PathBuf,
    pub portfolio_file: PathBuf,
    pub report_dir: Option<PathBuf>,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub store: StoreConfig,
    /// Only present for the postgres backend
    pub database: Option<DatabaseConfig>,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(5);

        let acquire_timeout_secs = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_secs = env::var("DATABASE_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600); // 10 minutes

        let max_lifetime_secs = env::var("DATABASE_MAX_LIFETIME_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1800); // 30 minutes

        let test_before_acquire = env::var("DATABASE_TEST_BEFORE_ACQUIRE")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/watch_ledger".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl FetchConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let base_url = env::var("TRACKER_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let listing_path = env::var("TRACKER_LISTING_PATH").unwrap_or(defaults.listing_path);

        let concurrency = env::var("FETCH_CONCURRENCY")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.concurrency);

        let timeout_secs = env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_secs);

        let user_agent = env::var("FETCH_USER_AGENT").unwrap_or(defaults.user_agent);

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(format!("Invalid TRACKER_BASE_URL: {}", base_url));
        }

        if !listing_path.starts_with('/') {
            return Err(format!(
                "TRACKER_LISTING_PATH must start with '/': {}",
                listing_path
            ));
        }

        if concurrency == 0 {
            return Err("FETCH_CONCURRENCY must be greater than 0".to_string());
        }
        let concurrency = concurrency.min(MAX_FETCH_CONCURRENCY);

        if timeout_secs == 0 {
            return Err("FETCH_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            base_url,
            listing_path,
            concurrency,
            timeout_secs,
            user_agent,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Listing page URL for a page number
    pub fn page_url(&self, page: u32) -> String {
        format!("{}{}?page={}", self.base_url, self.listing_path, page)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tropicalwatch.com".to_string(),
            listing_path: "/".to_string(),
            concurrency: 10,
            timeout_secs: 30,
            user_agent: concat!("watch-ledger/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, String> {
        let backend = match env::var("STORE_BACKEND") {
            Ok(s) => StoreBackend::from_str(&s)?,
            Err(_) => StoreBackend::Json,
        };

        let history_file = env::var("HISTORY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("watch_data.json"));

        let portfolio_file = env::var("PORTFOLIO_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("portfolio_statistics.json"));

        let report_dir = env::var("REPORT_DIR").ok().map(PathBuf::from);

        Ok(Self {
            backend,
            history_file,
            portfolio_file,
            report_dir,
        })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Json,
            history_file: PathBuf::from("watch_data.json"),
            portfolio_file: PathBuf::from("portfolio_statistics.json"),
            report_dir: None,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let fetch = FetchConfig::from_env()?;
        let store = StoreConfig::from_env()?;

        let database = match store.backend {
            StoreBackend::Postgres => Some(DatabaseConfig::from_env()?),
            StoreBackend::Json => None,
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = env::var("LOG_FORMAT")
            .map(|s| LogFormat::from_str(&s))
            .unwrap_or_default();

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        Ok(Self {
            fetch,
            store,
            database,
            log_level: log_level.to_lowercase(),
            log_format,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            store: StoreConfig::default(),
            database: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.store.backend, StoreBackend::Json);
        assert!(config.database.is_none());
        assert_eq!(config.fetch.concurrency, 10);
        assert_eq!(config.fetch.page_url(3), "https://tropicalwatch.com/?page=3");
    }

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!(StoreBackend::from_str("JSON"), Ok(StoreBackend::Json));
        assert_eq!(StoreBackend::from_str("postgresql"), Ok(StoreBackend::Postgres));
        assert!(StoreBackend::from_str("sqlite").is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_str("anything"), LogFormat::Pretty);
    }
}
