//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business/domain failures (validation,
/// uniqueness, referential protection). Infrastructure concerns (unreachable
/// stores, timeouts) belong to the store error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed or out-of-range input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A unique key already exists (category name, product sku).
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A required reference points at a record that does not exist.
    #[error("unknown reference: {0}")]
    UnknownReference(String),

    /// Deletion blocked because dependent records still exist.
    #[error("referential conflict: {0}")]
    ReferentialConflict(String),

    /// A requested record was not found (domain-level).
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate_key(msg: impl Into<String>) -> Self {
        Self::DuplicateKey(msg.into())
    }

    pub fn unknown_reference(msg: impl Into<String>) -> Self {
        Self::UnknownReference(msg.into())
    }

    pub fn referential_conflict(msg: impl Into<String>) -> Self {
        Self::ReferentialConflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
