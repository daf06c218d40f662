//! # DomainError
//!
//! Centralized error handling for Yatube.
//! Every port and service returns this type; the HTTP adapters decide how
//! each variant surfaces (status code on the REST API, redirect on the
//! rendered pages).

use thiserror::Error;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Lookup by slug, username or id failed (e.g. `("group", "news")`)
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// Authenticated, but not the author (or not staff) of the resource
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The operation needs an authenticated requester
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Input rejected (e.g. empty text, self-subscription on the API)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Resource already exists (e.g. duplicate username or group slug)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g. DB down, hashing failure)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        DomainError::NotFound(entity, key.to_string())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        DomainError::Internal(err.to_string())
    }
}

/// A specialized Result type for Yatube logic.
pub type Result<T> = std::result::Result<T, DomainError>;
