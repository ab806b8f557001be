//! Error types for metric construction.

use thiserror::Error;

/// Errors that can occur when constructing a metric.
///
/// All fatal conditions surface at construction time. Once a [`crate::Metric`]
/// has been created successfully, no operation on it can fail.
#[derive(Debug, Error)]
pub enum MetricError {
    /// The metric name is empty
    #[error("Please provide a metric name")]
    InvalidName,

    /// The timeline supports neither mark/measure annotation nor basic
    /// now-timing, so no measurement can be made at all
    #[error("This library cannot be used in this environment")]
    UnsupportedEnvironment,
}

/// Result type for metric operations.
pub type MetricResult<T> = Result<T, MetricError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MetricError::InvalidName;
        assert_eq!(err.to_string(), "Please provide a metric name");

        let err = MetricError::UnsupportedEnvironment;
        assert_eq!(
            err.to_string(),
            "This library cannot be used in this environment"
        );
    }
}
