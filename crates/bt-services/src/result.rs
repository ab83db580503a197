//! Service Result type
//!
//! Every service call ends in a `ServiceResult`: the produced value or the
//! `TrackerError` that stopped it, plus an optional message for display.

use bt_core::error::{TrackerError, ValidationErrors};
use std::fmt;

/// Represents the result of a service call
#[derive(Debug)]
pub struct ServiceResult<T> {
    result: Result<T, TrackerError>,
    /// Message for display
    message: Option<String>,
}

impl<T> ServiceResult<T> {
    pub fn success(result: T) -> Self {
        Self {
            result: Ok(result),
            message: None,
        }
    }

    pub fn success_with_message(result: T, message: impl Into<String>) -> Self {
        Self {
            result: Ok(result),
            message: Some(message.into()),
        }
    }

    pub fn failure(error: TrackerError) -> Self {
        Self {
            result: Err(error),
            message: None,
        }
    }

    /// Create a failed service result with a single field error
    pub fn failure_with_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Self::failure(TrackerError::Validation(errors))
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }

    /// Get the result (if successful)
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    /// Get the error (if failed)
    pub fn error(&self) -> Option<&TrackerError> {
        self.result.as_ref().err()
    }

    /// Field errors, when the failure was a validation failure
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match &self.result {
            Err(TrackerError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Execute closure if successful
    pub fn on_success<F>(self, f: F) -> Self
    where
        F: FnOnce(&T),
    {
        if let Ok(result) = &self.result {
            f(result);
        }
        self
    }

    /// Execute closure if failed
    pub fn on_failure<F>(self, f: F) -> Self
    where
        F: FnOnce(&TrackerError),
    {
        if let Err(error) = &self.result {
            f(error);
        }
        self
    }

    /// Map the result if successful
    pub fn map<U, F>(self, f: F) -> ServiceResult<U>
    where
        F: FnOnce(T) -> U,
    {
        ServiceResult {
            result: self.result.map(f),
            message: self.message,
        }
    }

    /// Chain with another service call if successful
    pub fn and_then<U, F>(self, f: F) -> ServiceResult<U>
    where
        F: FnOnce(T) -> ServiceResult<U>,
    {
        match self.result {
            Ok(result) => f(result),
            Err(error) => ServiceResult {
                result: Err(error),
                message: self.message,
            },
        }
    }

    pub fn into_result(self) -> Result<T, TrackerError> {
        self.result
    }
}

impl<T> From<Result<T, TrackerError>> for ServiceResult<T> {
    fn from(result: Result<T, TrackerError>) -> Self {
        Self {
            result,
            message: None,
        }
    }
}

impl<T> From<Result<T, ValidationErrors>> for ServiceResult<T> {
    fn from(result: Result<T, ValidationErrors>) -> Self {
        result.map_err(TrackerError::Validation).into()
    }
}

impl<T> From<ServiceResult<T>> for Result<T, TrackerError> {
    fn from(result: ServiceResult<T>) -> Self {
        result.result
    }
}

impl<T: fmt::Display> fmt::Display for ServiceResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(result) => write!(f, "Success: {}", result),
            Err(TrackerError::Validation(errors)) => {
                write!(f, "Failure: {}", errors.full_messages().join(", "))
            }
            Err(error) => write!(f, "Failure: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_result() {
        let result = ServiceResult::success(42);
        assert!(result.is_success());
        assert!(!result.is_failure());
        assert_eq!(result.result(), Some(&42));
        assert!(result.error().is_none());
    }

    #[test]
    fn test_failure_result() {
        let result: ServiceResult<i32> = ServiceResult::failure_with_error("email", "is invalid");
        assert!(result.is_failure());
        assert!(result.result().is_none());
        assert!(result.errors().map(|e| e.has_error("email")).unwrap_or(false));
        assert_eq!(result.to_string(), "Failure: email is invalid");
    }

    #[test]
    fn test_domain_failure_has_no_field_errors() {
        let result: ServiceResult<i32> =
            ServiceResult::failure(TrackerError::access_denied("log work"));
        assert!(result.errors().is_none());
        assert_eq!(result.error().map(|e| e.status_code()), Some(403));
    }

    #[test]
    fn test_map_and_then() {
        let mapped = ServiceResult::success(42).map(|n| n * 2);
        assert_eq!(mapped.result(), Some(&84));

        let chained = ServiceResult::success(42).and_then(|n| ServiceResult::success(n.to_string()));
        assert_eq!(chained.result(), Some(&"42".to_string()));

        let failed: ServiceResult<i32> = ServiceResult::failure(TrackerError::missing("project"));
        let chained = failed
            .with_message("not saved")
            .and_then(|n| ServiceResult::success(n + 1));
        assert!(chained.is_failure());
        assert_eq!(chained.message(), Some("not saved"));
    }

    #[test]
    fn test_callbacks() {
        let mut succeeded = false;
        ServiceResult::success(1).on_success(|_| succeeded = true);
        assert!(succeeded);

        let mut failed = false;
        ServiceResult::<i32>::failure(TrackerError::MissingRejectionReason).on_failure(|_| failed = true);
        assert!(failed);
    }

    #[test]
    fn test_into_result() {
        let result: Result<i32, TrackerError> = ServiceResult::success(7).into();
        assert_eq!(result.ok(), Some(7));

        let from_validation: ServiceResult<()> = Err(ValidationErrors::new()).into();
        assert!(matches!(from_validation.into_result(), Err(TrackerError::Validation(_))));
    }
}
