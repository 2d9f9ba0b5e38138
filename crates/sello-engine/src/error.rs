//! # Engine Error Types
//!
//! The typed error taxonomy exposed to the HTTP layer.
//!
//! ## Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       EngineError Taxonomy                              │
//! │                                                                         │
//! │  Validation         malformed/missing input; the store was never       │
//! │                     mutated                                             │
//! │  NotFound           a referenced entity is absent                      │
//! │  InsufficientStock  a decrement would drive stock negative (a          │
//! │                     conflict; carries the numbers for the message)     │
//! │  Conflict           duplicate variant key, lifecycle guard, bad        │
//! │                     status transition                                  │
//! │  Internal           unexpected store/transaction failure               │
//! │                                                                         │
//! │  Every mutating operation runs in one transaction; ANY of these        │
//! │  triggers a full rollback before the error reaches the caller.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine returns typed errors only; rendering user-facing messages is
//! the HTTP layer's job.

use thiserror::Error;

use sello_core::{CoreError, ValidationError};
use sello_db::DbError;

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or missing input. Detected before any write begins.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist (or was purged).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A decrement would drive stock negative.
    ///
    /// ## When This Occurs
    /// - An order requests more than the on-hand quantity
    /// - A concurrent transaction won the stock between our check and write
    #[error("Insufficient stock for variant {variant_id}: available {available}, requested {requested}")]
    InsufficientStock {
        variant_id: String,
        available: i64,
        requested: i64,
    },

    /// The operation conflicts with current state.
    ///
    /// ## When This Occurs
    /// - Duplicate (type, color, size) variant key
    /// - Deactivating an already-inactive entity
    /// - Purging a variant still referenced by a pack
    /// - A disallowed order-status transition
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Unexpected store or transaction failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Conflict error with a message.
    pub fn conflict(message: impl Into<String>) -> Self {
        EngineError::Conflict {
            message: message.into(),
        }
    }

    /// True for the conflict family (including insufficient stock), which
    /// the HTTP layer maps to a "try again" response.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            EngineError::Conflict { .. } | EngineError::InsufficientStock { .. }
        )
    }
}

impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            DbError::UniqueViolation { field, value } => EngineError::Conflict {
                message: format!("duplicate {field}: '{value}' already exists"),
            },
            DbError::ForeignKeyViolation { message } => EngineError::Conflict { message },
            other => EngineError::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => EngineError::Validation(v),
            CoreError::UnknownStatus(status) => {
                EngineError::Validation(ValidationError::InvalidFormat {
                    field: "status".to_string(),
                    reason: format!("unknown status '{status}'"),
                })
            }
            CoreError::UndefinedStamping { slug } => {
                EngineError::Validation(ValidationError::InvalidFormat {
                    field: "add_ons".to_string(),
                    reason: format!("stamping option '{slug}' has no defined cost"),
                })
            }
            CoreError::InvalidStatusTransition { from, to } => EngineError::Conflict {
                message: format!("cannot transition order from {from} to {to}"),
            },
            CoreError::CorruptData(e) => EngineError::Internal(e.to_string()),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================
