//! Error types for the GCodeWarp core crate.
//!
//! Configuration problems are the only fatal errors in the system: a bad
//! parameter aborts the run before any output is produced. Everything that
//! goes wrong inside a file (unparseable move fields, unknown markers) is
//! recovered by passing the offending line through unmodified.

use thiserror::Error;

/// Errors related to modulation parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid for a non-range reason.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_error_display() {
        let err = ParameterError::OutOfRange {
            name: "resolution",
            value: -0.2,
            min: 0.0,
            max: f64::INFINITY,
        };
        assert_eq!(
            err.to_string(),
            "Parameter 'resolution' out of range: -0.2 (valid: 0..inf)"
        );

        let err = ParameterError::InvalidValue {
            name: "frequency",
            reason: "must be finite".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for 'frequency': must be finite");
    }
}
