//! # Error Types
//!
//! Domain-specific error types for shoehub-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shoehub-core errors (this file)                                       │
//! │  ├── CoreError        - Domain rule failures (overflow, numbering)     │
//! │  └── ValidationError  - Field-level input validation failures          │
//! │                                                                         │
//! │  shoehub-db errors (separate crate)                                    │
//! │  └── DbError          - NotFound / Conflict / Integrity / storage      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A monetary computation left the representable range.
    #[error("Amount overflow while computing {context}")]
    AmountOverflow { context: String },

    /// The yearly order sequence ran past its six-digit width.
    ///
    /// Allowing a seventh digit would break the rule that string order of
    /// order numbers equals numeric order, so allocation stops instead.
    #[error("Order numbers for {year} are exhausted (max {max})")]
    OrderNumberExhausted { year: i32, max: u32 },

    /// A string could not be parsed as `SH-YYYY-NNNNNN`.
    #[error("Invalid order number '{0}'")]
    InvalidOrderNumber(String),

    /// A status change not allowed under the strict status policy.
    ///
    /// ## When This Occurs
    /// - `StatusPolicy::Strict` and e.g. `delivered → pending`
    /// - `StatusPolicy::Strict` and `delivered` while payment is not `paid`
    #[error("{field} cannot change from {from} to {to}")]
    InvalidTransition {
        field: String,
        from: String,
        to: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Every variant names the offending field, using a path such as
/// `items[1].quantity` for nested order input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
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

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid email, invalid amount text).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} '{value}' must be one of: {allowed:?}")]
    NotAllowed {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// A collection that needs at least one element is empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },

    /// A date that must fall strictly after a reference date does not.
    #[error("{field} must be after {reference}")]
    NotAfter { field: String, reference: String },

    /// A discount larger than the order it applies to.
    #[error("{field} {discount} exceeds the order amount {limit}")]
    DiscountTooLarge {
        field: String,
        discount: String,
        limit: String,
    },

    /// Duplicate value (e.g., duplicate category name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Returns the field path this error refers to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Empty { field }
            | ValidationError::NotAfter { field, .. }
            | ValidationError::DiscountTooLarge { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }

    /// Prefixes the field path, e.g. `quantity` → `items[2].quantity`.
    pub fn within(mut self, prefix: &str) -> Self {
        let slot = match &mut self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Empty { field }
            | ValidationError::NotAfter { field, .. }
            | ValidationError::DiscountTooLarge { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        };
        *slot = format!("{}.{}", prefix, slot);
        self
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
