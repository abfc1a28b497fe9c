//! Error types for INNKEEP operations

use crate::identity::PropertyId;
use crate::period::PeriodKind;
use chrono::NaiveDate;
use thiserror::Error;

/// Period and timezone validation errors.
///
/// These are validation failures: surfaced to the caller, never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Unknown timezone: {name}")]
    UnknownTimezone { name: String },

    #[error("Anchor date out of range for {kind} period: {anchor}")]
    AnchorOutOfRange { kind: PeriodKind, anchor: NaiveDate },

    #[error("No valid local instant for {date} in {zone}")]
    UnresolvableBoundary { date: NaiveDate, zone: String },
}

/// Connection pool errors.
///
/// Both variants are terminal for the in-flight request: the caller gets an
/// explicit failure, never a fabricated or placeholder total.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("Connection pool exhausted after {waited_ms}ms")]
    Exhausted { waited_ms: u64 },

    #[error("Database unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for the revenue subsystem.
///
/// `NotOwned` carries no detail beyond the requested property id: a missing
/// property and a property registered to another tenant produce the same
/// value, so the error cannot be used to probe for property existence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RevenueError {
    #[error("Property {property_id} is not accessible for the requesting tenant")]
    NotOwned { property_id: PropertyId },

    #[error("Invalid period: {0}")]
    InvalidPeriod(#[from] PeriodError),

    #[error("Pool unavailable: {0}")]
    PoolUnavailable(#[from] PoolError),

    #[error("Aggregation failed: {reason}")]
    AggregationFailure { reason: String },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl RevenueError {
    /// Construct an aggregation failure from any displayable cause.
    pub fn aggregation(reason: impl ToString) -> Self {
        RevenueError::AggregationFailure {
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for revenue operations.
pub type RevenueResult<T> = Result<T, RevenueError>;

// =============================================================================
// TESTS
// =============================================================================
