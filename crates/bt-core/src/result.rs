//! Result type aliases

use crate::error::TrackerError;

/// Standard Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;
