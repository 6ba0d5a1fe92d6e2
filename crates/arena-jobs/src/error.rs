//! Validation errors raised while assembling a job.

use std::fmt;
use thiserror::Error;

/// Result type alias for job assembly.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The flag name itself was empty.
    EmptyFlag,
    /// A scalar value was empty.
    EmptyValue,
    /// A list option was given no elements.
    EmptyList,
    /// A map option was given no entries.
    EmptyMap,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFlag => write!(f, "flag name cannot be empty"),
            Self::EmptyValue => write!(f, "value cannot be empty"),
            Self::EmptyList => write!(f, "at least one value is required"),
            Self::EmptyMap => write!(f, "at least one entry is required"),
        }
    }
}

/// Error returned when an option cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed for '{flag}': {kind}")]
pub struct ValidationError {
    /// The flag that failed validation.
    pub flag: String,
    /// The kind of validation error.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(flag: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            flag: flag.into(),
            kind,
        }
    }

    /// Create an empty value error.
    #[must_use]
    pub fn empty(flag: impl Into<String>) -> Self {
        Self::new(flag, ValidationErrorKind::EmptyValue)
    }

    /// Create an empty list error.
    #[must_use]
    pub fn empty_list(flag: impl Into<String>) -> Self {
        Self::new(flag, ValidationErrorKind::EmptyList)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_display() {
        let err = ValidationError::empty("--image");
        assert_eq!(err.to_string(), "validation failed for '--image': value cannot be empty");
    }

    #[test]
    fn test_empty_list_display() {
        let err = ValidationError::empty_list("--toleration");
        assert_eq!(
            err.to_string(),
            "validation failed for '--toleration': at least one value is required"
        );
    }

    #[test]
    fn test_empty_map_display() {
        let err = ValidationError::new("--env", ValidationErrorKind::EmptyMap);
        assert!(err.to_string().ends_with("at least one entry is required"));
    }

    #[test]
    fn test_empty_flag_display() {
        let err = ValidationError::new("", ValidationErrorKind::EmptyFlag);
        assert_eq!(err.to_string(), "validation failed for '': flag name cannot be empty");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ValidationError>();
    }
}
