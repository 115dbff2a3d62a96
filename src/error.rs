//! Error types.
//!
//! The library reports failures through typed enums so callers can branch on
//! the category (bad input, broken installation, anything else). The binary
//! wraps them in `AppError`, which only carries an exit code and a message.

use thiserror::Error;

use crate::domain::{Field, PerimeterZone};

/// Error returned by every transformation call.
#[derive(Error, Debug)]
pub enum TransformError {
    /// An input coordinate cannot be transformed at this position.
    #[error("{field} {value:.3} m cannot be transformed: position is {zone}")]
    OutOfRange {
        field: Field,
        value: f64,
        zone: PerimeterZone,
    },

    /// The correction dataset is missing, corrupt or of an unknown version.
    #[error("correction dataset unavailable: {0}")]
    DatasetUnavailable(#[from] DatasetError),

    /// Anything else. The detail is kept for logs, never displayed.
    #[error("internal transformation error")]
    Internal(String),
}

/// Coarse error category for caller-side branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Range,
    Dataset,
    Internal,
}

impl TransformError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TransformError::OutOfRange { .. } => ErrorCategory::Range,
            TransformError::DatasetUnavailable(_) => ErrorCategory::Dataset,
            TransformError::Internal(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_range_error(&self) -> bool {
        self.category() == ErrorCategory::Range
    }

    /// Zone of a range error, if this is one.
    pub fn zone(&self) -> Option<PerimeterZone> {
        match self {
            TransformError::OutOfRange { zone, .. } => Some(*zone),
            _ => None,
        }
    }

    pub(crate) fn out_of_range(field: Field, value: f64, zone: PerimeterZone) -> Self {
        TransformError::OutOfRange { field, value, zone }
    }
}

impl From<GridError> for TransformError {
    // Strict lookups only happen for positions the perimeter already
    // accepted, so a grid miss here means the dataset and perimeter disagree.
    fn from(err: GridError) -> Self {
        TransformError::Internal(err.to_string())
    }
}

/// Failure to load or validate the correction dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("dataset file not found: {0}")]
    Missing(String),

    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset truncated at byte {offset} (needed {needed} more bytes)")]
    Truncated { offset: usize, needed: usize },

    #[error("not a correction dataset (bad magic)")]
    BadMagic,

    #[error("unsupported dataset version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    #[error("dataset checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid dataset: {0}")]
    Invalid(String),
}

/// Interpolator failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("position E {easting:.3} / N {northing:.3} is outside the grid extent")]
    OutOfGridBounds { easting: f64, northing: f64 },
}

/// Error surfaced by the `reframe` binary.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<TransformError> for AppError {
    fn from(err: TransformError) -> Self {
        match err.category() {
            ErrorCategory::Range => AppError::new(3, format!("REFRAME error: {err}")),
            ErrorCategory::Dataset | ErrorCategory::Internal => {
                AppError::new(4, crate::report::INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_display_hides_detail() {
        let err = TransformError::Internal("grid row 42 missing".to_string());
        assert_eq!(err.to_string(), "internal transformation error");
        assert!(format!("{err:?}").contains("grid row 42"));
    }

    #[test]
    fn categories_are_distinct() {
        let range = TransformError::out_of_range(Field::Easting, 1.0, PerimeterZone::Rejected);
        let dataset = TransformError::from(DatasetError::BadMagic);
        assert_eq!(range.category(), ErrorCategory::Range);
        assert_eq!(range.zone(), Some(PerimeterZone::Rejected));
        assert_eq!(dataset.category(), ErrorCategory::Dataset);
        assert!(dataset.zone().is_none());
    }

    #[test]
    fn app_error_exit_codes() {
        let range = TransformError::out_of_range(Field::Height, 500.0, PerimeterZone::Fallback);
        assert_eq!(AppError::from(range).exit_code(), 3);
        let missing = TransformError::from(DatasetError::Missing("x".into()));
        assert_eq!(AppError::from(missing).exit_code(), 4);
    }
}
