//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! Every variant is recoverable at the request boundary; the api layer maps
//! each one onto an HTTP response.

use std::fmt;

#[derive(Debug)]
pub enum LifecycleError {
    /// Referenced entity (book, user, borrowing record) does not exist
    NotFound,
    /// Malformed input, e.g. an unparsable or past expected-return date
    InvalidRequest(String),
    /// The user already holds an active borrowing for this book
    DuplicateBorrowing,
    /// No available copies of a physical book
    OutOfStock,
    /// Caller is neither the borrower nor staff
    Forbidden,
    /// The record is terminal; a second return is rejected
    AlreadyReturned,
    /// Transient persistence failure, surfaced to the caller as-is.
    /// Retrying is the caller's decision; the core never retries.
    Storage(String),
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::NotFound => write!(f, "Resource not found"),
            LifecycleError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            LifecycleError::DuplicateBorrowing => {
                write!(f, "You have already borrowed this book")
            }
            LifecycleError::OutOfStock => {
                write!(f, "No copies of this book are currently available")
            }
            LifecycleError::Forbidden => write!(f, "Not authorized to perform this operation"),
            LifecycleError::AlreadyReturned => write!(f, "Book has already been returned"),
            LifecycleError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for LifecycleError {}

// Conversion from SeaORM errors (used in the service and infrastructure layers)
impl From<sea_orm::DbErr> for LifecycleError {
    fn from(e: sea_orm::DbErr) -> Self {
        LifecycleError::Storage(e.to_string())
    }
}
