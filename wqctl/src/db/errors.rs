use crate::db::store::RecordKind;
use thiserror::Error;

/// Unified error type for record store operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// A stored document could not be decoded into its record type
    #[error("Failed to decode {kind} document {id}: {source}")]
    Decode {
        kind: RecordKind,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded into a storable document
    #[error("Failed to encode {kind} document: {source}")]
    Encode {
        kind: RecordKind,
        #[source]
        source: serde_json::Error,
    },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convert from sqlx::Error, keeping `RowNotFound` distinguishable
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            other => DbError::Other(anyhow::Error::from(other)),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Other(anyhow::Error::from(err))
    }
}

/// Type alias for record store results
pub type Result<T> = std::result::Result<T, DbError>;
