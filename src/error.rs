use thiserror::Error;

/// Rejected mutation. Nothing reaches `AppData` when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("no {kind} with id '{id}'")]
    UnknownId { kind: &'static str, id: String },
    #[error("'{prefix}' matches more than one {kind}")]
    AmbiguousId { kind: &'static str, prefix: String },
    #[error("actual time can only be recorded on a completed task")]
    NotCompleted,
    #[error("actual time must be a non-negative number of hours, got {0}")]
    InvalidActualTime(f64),
}

impl ValidationError {
    pub fn unknown(kind: &'static str, id: &str) -> Self {
        Self::UnknownId {
            kind,
            id: id.to_string(),
        }
    }
}

/// Failure of a remote save or fetch. Local state is never touched when one is returned.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote file not found")]
    NotFound,
    #[error("remote store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("could not encode document: {0}")]
    Encode(String),
    #[error("could not decode remote document: {0}")]
    Decode(String),
    #[error("a sync operation is already in progress")]
    Busy,
}

impl From<reqwest::Error> for SyncError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value.to_string())
    }
}

/// Failure writing one of the local store slots.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not write {key}: {source}")]
    Write {
        key: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    /// The in-memory change was applied but could not be written to disk.
    #[error("change applied but not saved: {0}")]
    Persistence(#[from] StoreError),
}

pub type AppResult<T> = Result<T, AppError>;
