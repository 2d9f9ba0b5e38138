//! # Error Types
//!
//! Domain-specific error types for sello-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sello-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  sello-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  sello-engine errors (separate crate)                                  │
//! │  └── EngineError      - What the HTTP layer sees (typed taxonomy)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → HTTP layer          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (variant id, status, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message upstream

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested order-status transition is not allowed by the machine.
    ///
    /// ## When This Occurs
    /// - Skipping states (pending_payment → shipped)
    /// - Leaving a terminal state (completed → anything)
    #[error("Cannot transition order from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Status string received at the boundary is not a known state.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// A requested stamping add-on has no defined surcharge for the product.
    ///
    /// ## When This Occurs
    /// - The storefront sends a stamping slug absent from the product
    ///   type's stamping price map
    #[error("Stamping option '{slug}' has no defined cost for this product")]
    UndefinedStamping { slug: String },

    /// Stored JSON column could not be decoded.
    #[error("Corrupt stored data: {0}")]
    CorruptData(#[from] serde_json::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid email, invalid hex color).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two mutually exclusive fields were both set, or neither was.
    #[error("{left} and {right} are mutually exclusive; exactly one is required")]
    ExactlyOneOf { left: String, right: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidStatusTransition {
            from: "pending_payment".to_string(),
            to: "shipped".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot transition order from pending_payment to shipped"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::ExactlyOneOf {
            left: "variant_id".to_string(),
            right: "pack_id".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "variant_id and pack_id are mutually exclusive; exactly one is required"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
