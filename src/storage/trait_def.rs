use crate::models::{NewLink, ShortLink, Visitor};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("short code '{0}' already exists")]
    CodeConflict(String),
    #[error("short code '{0}' not found")]
    NotFound(String),
    #[error("short code '{0}' has expired")]
    Expired(String),
    #[error("no free short code could be generated")]
    CodeSpaceExhausted,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The mapping store. All operations are synchronous and in-memory.
pub trait Storage: Send + Sync {
    /// Create a new mapping, generating a short code unless one is requested.
    /// Existing codes, live or expired, are never overwritten.
    fn create(&self, new_link: NewLink) -> StoreResult<ShortLink>;

    /// Resolve a live short code to its destination, recording one click
    fn resolve(&self, short_code: &str, visitor: Visitor) -> StoreResult<String>;

    /// Snapshot of every mapping in creation order, expired ones included
    fn list(&self) -> Vec<ShortLink>;
}
