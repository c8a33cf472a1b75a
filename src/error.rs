//! Error types for pathguard
//!
//! This module defines the error hierarchy used throughout the crate.
//! Configuration problems are fatal and surface at startup; a denied request
//! is an [`AccessDeniedError`] only when the caller asks for one through
//! `AuthorizationEvaluator::require`.

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Access denied: {0}")]
    AccessDenied(#[from] AccessDeniedError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("Invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Conflicting rules: pattern '{pattern}' is declared at positions {first} and {second}")]
    ConflictingRules {
        pattern: String,
        first: usize,
        second: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// Access control errors
#[derive(Error, Debug)]
#[error("Access denied for path '{path}': {reason}")]
pub struct AccessDeniedError {
    pub path: String,
    pub reason: String,
}

impl AccessDeniedError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn unauthenticated(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: "authentication is required".into(),
        }
    }

    pub fn missing_role(path: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: format!("role '{}' is required", role.into()),
        }
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;
