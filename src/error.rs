use crate::database::DatabaseError;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database setup errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// History or portfolio store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Snapshot fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Stored state violates a history invariant
    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if the error means stored history can no longer be trusted
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            AppError::DataIntegrity(_) | AppError::Store(StoreError::Corrupt(_))
        )
    }

    /// Check if error is a database connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            AppError::Database(DatabaseError::PoolCreation(_))
                | AppError::Database(DatabaseError::ConnectionTimeout)
        )
    }
}

/// An existing record was found without any price history
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Data integrity violation: record {inventory_id} has an empty price history")]
pub struct DataIntegrityError {
    pub inventory_id: String,
}

/// Errors turning a raw listing into a seed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Listing has no stable key and cannot be tracked
    #[error("Listing has no inventory id")]
    MissingInventoryId,
}

/// History and portfolio store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// File system error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database query error
    #[error("Query error: {0}")]
    Query(#[from] SqlxError),

    /// Stored data that cannot be turned back into records
    #[error("Corrupt stored data: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Snapshot fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport or status errors from the HTTP client
    #[error("HTTP error fetching page {page}: {source}")]
    Http {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Page body could not be decoded into listings
    #[error("Could not decode page {page}: {message}")]
    Decode { page: u32, message: String },
}

impl FetchError {
    /// Page the error belongs to, if any
    pub fn page(&self) -> Option<u32> {
        match self {
            FetchError::Http { page, .. } | FetchError::Decode { page, .. } => Some(*page),
            FetchError::Client(_) => None,
        }
    }
}
