// ABOUTME: Unified error types and error codes for the training-volume engine
// ABOUTME: Classifies failures into validation, configuration, concurrency, and storage families
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Only failures that cannot be recovered locally are represented here.
//! Data-integrity and constraint problems are recovered by substituting safe
//! values and are reported as [`crate::EngineWarning`] next to a valid result.
//!
//! Two failure classes reach the caller:
//! - configuration errors (unknown strategy, malformed constraints, invalid
//!   tunables), which are rejected immediately and never touch stored state
//! - concurrent update conflicts, which the store layer retries and only
//!   surfaces once the retry budget is exhausted

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Standard error codes used throughout the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Caller supplied an invalid value
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A value is outside its permitted range
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3003,

    // Resource Management (4000-4999)
    /// Requested resource does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,

    // Configuration (6000-6999)
    /// Generic configuration failure
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Configuration values failed validation
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,
    /// Distribution strategy name is not registered
    #[serde(rename = "UNKNOWN_STRATEGY")]
    UnknownStrategy = 6100,

    // Concurrency (7000-7999)
    /// Optimistic version check failed on write
    #[serde(rename = "CONCURRENT_UPDATE_CONFLICT")]
    ConcurrentUpdateConflict = 7000,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Storage backend failure
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// Data serialization/deserialization failure
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code an enclosing service should map this error to
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput
            | Self::ValueOutOfRange
            | Self::ConfigInvalid
            | Self::UnknownStrategy => 400,
            Self::ResourceNotFound => 404,
            Self::ConcurrentUpdateConflict => 409,
            Self::ConfigError
            | Self::InternalError
            | Self::DatabaseError
            | Self::SerializationError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::UnknownStrategy => "The requested distribution strategy is not registered",
            Self::ConcurrentUpdateConflict => {
                "The training state was modified concurrently; retry with fresh state"
            }
            Self::InternalError => "An internal error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether a caller may retry the failed operation unchanged
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::ConcurrentUpdateConflict)
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// User the failing operation was scoped to
    pub user_id: Option<Uuid>,
    /// Resource identifier if applicable (muscle group, strategy name, ...)
    pub resource_id: Option<String>,
    /// Additional key-value context
    pub details: serde_json::Value,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            user_id: None,
            resource_id: None,
            details: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// Unified error type for the engine
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add a user ID to the error context
    #[must_use]
    pub const fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.context.user_id = Some(user_id);
        self
    }

    /// Add a resource ID to the error context
    #[must_use]
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.context.resource_id = Some(resource_id.into());
        self
    }

    /// Add details to the error context
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.context.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Whether the failed operation may be retried
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Value outside of permitted range
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValueOutOfRange, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Unknown distribution strategy
    pub fn unknown_strategy(name: &str, available: &[String]) -> Self {
        Self::new(
            ErrorCode::UnknownStrategy,
            format!(
                "Unknown distribution strategy '{name}'. Available: {}",
                available.join(", ")
            ),
        )
        .with_resource_id(name)
    }

    /// Optimistic version mismatch on write
    pub fn conflict(resource: impl Into<String>, expected: u64, actual: u64) -> Self {
        let resource = resource.into();
        Self::new(
            ErrorCode::ConcurrentUpdateConflict,
            format!("{resource} changed concurrently (expected version {expected}, found {actual})"),
        )
        .with_details(serde_json::json!({
            "expected_version": expected,
            "actual_version": actual,
        }))
        .with_resource_id(resource)
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::InvalidInput.http_status(), 400);
        assert_eq!(ErrorCode::UnknownStrategy.http_status(), 400);
        assert_eq!(ErrorCode::ConcurrentUpdateConflict.http_status(), 409);
        assert_eq!(ErrorCode::DatabaseError.http_status(), 500);
    }

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(AppError::conflict("landmark", 1, 2).is_retryable());
        assert!(!AppError::config("bad").is_retryable());
        assert!(!AppError::unknown_strategy("X", &[]).is_retryable());
    }

    #[test]
    fn test_unknown_strategy_lists_available_names() {
        let error = AppError::unknown_strategy(
            "MYSTERY",
            &["BALANCED".to_owned(), "CONSERVATIVE".to_owned()],
        );
        assert_eq!(error.code, ErrorCode::UnknownStrategy);
        assert!(error.message.contains("BALANCED, CONSERVATIVE"));
        assert_eq!(error.context.resource_id.as_deref(), Some("MYSTERY"));
    }
}
