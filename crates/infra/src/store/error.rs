use thiserror::Error;

/// Storage operation error.
///
/// These are infrastructure failures (remote writes, isolation, availability) as
/// opposed to domain errors. A failed write leaves the collection or ledger unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or lost a write.
    #[error("remote write failed: {0}")]
    RemoteWrite(String),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    /// Record could not be encoded or decoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn remote_write(msg: impl Into<String>) -> Self {
        Self::RemoteWrite(msg.into())
    }

    pub(crate) fn poisoned() -> Self {
        Self::Unavailable("lock poisoned".to_string())
    }
}
