//! Typed error handling for the card manager
//!
//! # Error Categories
//!
//! - [`CardError`]: request-level errors, mapped to HTTP responses
//! - [`ValidationError`]: bad input the caller can fix (400)
//! - [`StoreError`]: card store failures; the duplicate-key case is the
//!   retry signal of the issuance loop and never reaches a caller
//! - [`CipherError`]: field encryption failures
//!
//! Ledger failures live in [`crate::ledger::LedgerError`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::ledger::LedgerError;

/// Request-level error returned by the issuance service and its handlers
#[derive(Debug, Error)]
pub enum CardError {
    /// The request body is unusable
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No authenticated user was attached to the request
    #[error("Missing or invalid user identity")]
    Unauthorized,

    /// The card store failed with something other than a duplicate key
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    /// A bounded retry policy ran out of attempts on duplicate keys
    #[error("{context}: still colliding after {attempts} attempts")]
    RetriesExhausted { context: &'static str, attempts: u32 },

    /// The ledger rejected the call or could not be reached
    #[error("{context}: {source}")]
    Downstream {
        context: &'static str,
        #[source]
        source: LedgerError,
    },
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl CardError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CardError::Validation(_) => StatusCode::BAD_REQUEST,
            CardError::Unauthorized => StatusCode::UNAUTHORIZED,
            CardError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CardError::RetriesExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CardError::Downstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CardError::Validation(e) => e.error_code(),
            CardError::Unauthorized => "UNAUTHORIZED",
            CardError::Storage { .. } => "STORAGE_ERROR",
            CardError::RetriesExhausted { .. } => "STORAGE_ERROR",
            CardError::Downstream { .. } => "DOWNSTREAM_SERVICE_ERROR",
        }
    }

    /// Message safe to hand back to the caller
    ///
    /// Storage and ledger details are logged, not returned.
    pub fn public_message(&self) -> String {
        match self {
            CardError::Storage { context, .. }
            | CardError::RetriesExhausted { context, .. }
            | CardError::Downstream { context, .. } => (*context).to_string(),
            other => other.to_string(),
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.public_message(),
        }
    }
}

impl IntoResponse for CardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to request payloads
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The body could not be decoded at all
    #[error("Failed to parse JSON request")]
    InvalidJson { message: String },

    /// A required field is absent or empty
    #[error("Missing fields")]
    MissingFields,

    /// The balance does not fit the card store
    #[error("Balance out of range")]
    BalanceOutOfRange,
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
            ValidationError::MissingFields => "MISSING_FIELDS",
            ValidationError::BalanceOutOfRange => "BALANCE_OUT_OF_RANGE",
        }
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Absent or empty fields win over a bad balance.
        let field_errors = errors.field_errors();
        let only_range = !field_errors.is_empty()
            && field_errors
                .values()
                .flat_map(|errs| errs.iter())
                .all(|e| e.code == "range");

        if only_range {
            ValidationError::BalanceOutOfRange
        } else {
            ValidationError::MissingFields
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors returned by a [`CardStore`](crate::core::CardStore)
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the insert; retry with new values
    #[error("duplicate key{}", .constraint.as_deref().map(|c| format!(" ({})", c)).unwrap_or_default())]
    DuplicateKey { constraint: Option<String> },

    /// Any other backend failure
    #[error("{backend} error: {message}")]
    Backend { backend: String, message: String },

    /// A sensitive field could not be sealed or opened
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),
}

impl StoreError {
    /// Whether this error is the retryable uniqueness violation
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }

    pub fn backend(backend: &str, message: impl ToString) -> Self {
        StoreError::Backend {
            backend: backend.to_string(),
            message: message.to_string(),
        }
    }
}

// =============================================================================
// Cipher Errors
// =============================================================================

/// Errors related to field encryption
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("encryption key must not be empty")]
    InvalidKey,

    #[error("failed to encrypt field")]
    Encrypt,

    /// Wrong key, truncated data or tampered data
    #[error("failed to decrypt field")]
    Decrypt,

    #[error("decrypted field is not valid UTF-8")]
    InvalidUtf8,
}
