//! Error handling for SpiralBand
//!
//! Provides error types for the generation pipeline:
//! - Configuration errors (malformed caller input, aborts the run)
//! - Resource errors (fonts that cannot be resolved or loaded)
//!
//! Numeric degeneracies (zero calibration integral, broken glyph contours) are
//! absorbed where they occur and never surface here.

use thiserror::Error;

/// Configuration error type
///
/// Raised when caller-supplied parameters cannot produce a program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The point sequence handed to the step builder was empty
    #[error("Point sequence is empty")]
    EmptyPath,

    /// A required input was not supplied
    #[error("Missing required parameter '{param}'")]
    MissingParameter {
        /// The name of the missing parameter.
        param: String,
    },

    /// A parameter value is unusable
    #[error("Invalid parameter '{param}': {reason}")]
    InvalidParameter {
        /// The parameter name.
        param: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The slot list does not match the grid dimensions
    #[error("Grid has {expected} slots but {actual} slot configs were supplied")]
    SlotCountMismatch {
        /// columns × rows
        expected: usize,
        /// Number of slot entries received.
        actual: usize,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidParameter`].
    pub fn invalid(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

/// Resource error type
///
/// Represents fonts or other external resources that could not be obtained.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// No installed face matches the requested family/weight
    #[error("Font not available: {family}{}", bold_suffix(.bold))]
    FontUnavailable {
        /// The requested family name.
        family: String,
        /// Whether a bold face was requested.
        bold: bool,
    },

    /// A face was found but could not be parsed
    #[error("Failed to load font {family}: {reason}")]
    FontLoad {
        /// The requested family name.
        family: String,
        /// The reason loading failed.
        reason: String,
    },
}

fn bold_suffix(bold: &bool) -> &'static str {
    if *bold {
        " (bold)"
    } else {
        ""
    }
}

/// Main error type for SpiralBand
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Resource error
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// An error raised while generating one band slot
    #[error("Band slot {slot}: {source}")]
    Slot {
        /// Row-major index of the failing slot.
        slot: usize,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Attach the slot index of the band being generated.
    pub fn in_slot(self, slot: usize) -> Self {
        match self {
            // Keep the innermost slot; nesting adds nothing.
            Error::Slot { .. } => self,
            other => Error::Slot {
                slot,
                source: Box::new(other),
            },
        }
    }

    /// Slot index carried by this error, if any.
    pub fn slot(&self) -> Option<usize> {
        match self {
            Error::Slot { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    /// Check if this is (or wraps) a configuration error
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::Slot { source, .. } => source.is_configuration_error(),
            _ => false,
        }
    }

    /// Check if this is (or wraps) a resource error
    pub fn is_resource_error(&self) -> bool {
        match self {
            Error::Resource(_) => true,
            Error::Slot { source, .. } => source.is_resource_error(),
            _ => false,
        }
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        assert_eq!(ConfigError::EmptyPath.to_string(), "Point sequence is empty");

        let err = ConfigError::invalid("circumference", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'circumference': must be positive"
        );

        let err = ConfigError::SlotCountMismatch {
            expected: 4,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Grid has 4 slots but 3 slot configs were supplied"
        );
    }

    #[test]
    fn test_resource_error_display() {
        let err = ResourceError::FontUnavailable {
            family: "DejaVu Sans".to_string(),
            bold: true,
        };
        assert_eq!(err.to_string(), "Font not available: DejaVu Sans (bold)");

        let err = ResourceError::FontUnavailable {
            family: "Serif".to_string(),
            bold: false,
        };
        assert_eq!(err.to_string(), "Font not available: Serif");
    }

    #[test]
    fn test_slot_context() {
        let err = Error::from(ConfigError::EmptyPath).in_slot(2);
        assert_eq!(err.slot(), Some(2));
        assert!(err.is_configuration_error());
        assert!(!err.is_resource_error());
        assert_eq!(err.to_string(), "Band slot 2: Point sequence is empty");

        // Re-wrapping keeps the original slot
        let err = err.in_slot(5);
        assert_eq!(err.slot(), Some(2));
    }

    #[test]
    fn test_resource_classification() {
        let err: Error = ResourceError::FontLoad {
            family: "Sans".to_string(),
            reason: "truncated file".to_string(),
        }
        .into();
        assert!(err.is_resource_error());
        assert!(err.slot().is_none());
    }
}
