//! Core error types for BuildTrack
//!
//! Every rule violation in the tracker is a recoverable, user-facing error.
//! Variants carry enough context to render a message without a lookup.

use std::collections::HashMap;
use thiserror::Error;

/// Core error type for all tracker operations
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid quantity for {field}: {value}")]
    InvalidQuantity { field: &'static str, value: f64 },

    #[error("Insufficient stock for {material}: requested {requested}, remaining {remaining}")]
    InsufficientStock {
        material: String,
        requested: f64,
        remaining: f64,
    },

    #[error("A rejection reason is required")]
    MissingRejectionReason,

    #[error("Cannot transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Access denied: {action}")]
    AccessDenied { action: String },

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TrackerError {
    pub fn missing(field: &'static str) -> Self {
        TrackerError::MissingField { field }
    }

    pub fn invalid_quantity(field: &'static str, value: f64) -> Self {
        TrackerError::InvalidQuantity { field, value }
    }

    pub fn access_denied(action: impl Into<String>) -> Self {
        TrackerError::AccessDenied {
            action: action.into(),
        }
    }

    pub fn not_found(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        TrackerError::NotFound {
            entity,
            field,
            value: value.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        TrackerError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        TrackerError::Conflict {
            message: message.into(),
        }
    }

    /// Field the error is attached to, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            TrackerError::MissingField { field } | TrackerError::InvalidQuantity { field, .. } => {
                Some(field)
            }
            TrackerError::InsufficientStock { .. } => Some("quantity"),
            TrackerError::MissingRejectionReason => Some("rejection_reason"),
            _ => None,
        }
    }
}

/// Validation errors collection, keyed by field
#[derive(Error, Debug, Default, Clone)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: HashMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    /// Base messages first, then field messages sorted by field name
    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        let mut fields: Vec<_> = self.errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        for (field, field_messages) in fields {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// Turn an empty collection into `Ok(())`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// HTTP status code mapping for errors
impl TrackerError {
    pub fn status_code(&self) -> u16 {
        match self {
            TrackerError::MissingField { .. }
            | TrackerError::InvalidQuantity { .. }
            | TrackerError::InsufficientStock { .. }
            | TrackerError::MissingRejectionReason
            | TrackerError::Validation(_) => 422,
            TrackerError::InvalidStateTransition { .. } | TrackerError::Conflict { .. } => 409,
            TrackerError::AccessDenied { .. } => 403,
            TrackerError::NotFound { .. } => 404,
            TrackerError::Unauthorized { .. } => 401,
            TrackerError::Database(_) | TrackerError::Internal(_) | TrackerError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            TrackerError::MissingField { .. } => "missing_field",
            TrackerError::InvalidQuantity { .. } => "invalid_quantity",
            TrackerError::InsufficientStock { .. } => "insufficient_stock",
            TrackerError::MissingRejectionReason => "missing_rejection_reason",
            TrackerError::InvalidStateTransition { .. } => "invalid_state_transition",
            TrackerError::AccessDenied { .. } => "access_denied",
            TrackerError::NotFound { .. } => "not_found",
            TrackerError::Unauthorized { .. } => "unauthorized",
            TrackerError::Validation(_) => "validation_failed",
            TrackerError::Conflict { .. } => "conflict",
            TrackerError::Database(_) => "database_error",
            TrackerError::Internal(_) => "internal_error",
            TrackerError::Config(_) => "configuration_error",
        }
    }
}
