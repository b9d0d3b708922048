//! Error and warning types for pattern generation.
//!
//! Validation problems surface immediately as an [`IgnitionError`] naming the
//! violated invariant. Problems that only affect part of a pattern (a heat that
//! cannot be traced on the terrain, a crew of the wrong size) are reported as
//! [`PatternWarning`]s next to the pattern and never abort generation.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Fatal errors raised while validating inputs or generating a pattern
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IgnitionError {
    /// A parameter or crew constraint was violated at construction time
    #[error("constraint violation on `{parameter}`: {reason}")]
    ConstraintViolation {
        /// Name of the offending parameter or constraint flag
        parameter: &'static str,
        /// Human readable description of the violated invariant
        reason: String,
    },

    /// The boundary polygon cannot be used for geometric work
    #[error("degenerate geometry: {reason}")]
    GeometryDegenerate {
        /// What made the geometry unusable
        reason: String,
    },

    /// Contour following could not be carried out on the elevation grid
    #[error("elevation grid coverage: {reason}")]
    GridCoverage {
        /// What part of the request fell outside the usable grid
        reason: String,
    },
}

impl IgnitionError {
    pub(crate) fn constraint(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            parameter,
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::GeometryDegenerate {
            reason: reason.into(),
        }
    }

    pub(crate) fn coverage(reason: impl Into<String>) -> Self {
        Self::GridCoverage {
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = IgnitionError> = std::result::Result<T, E>;

/// Require a finite, strictly positive parameter value
pub(crate) fn require_positive(parameter: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(IgnitionError::constraint(
            parameter,
            format!("must be finite and positive, got {value}"),
        ))
    }
}

/// Require a finite, non-negative parameter value
pub(crate) fn require_non_negative(parameter: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(IgnitionError::constraint(
            parameter,
            format!("must be finite and non-negative, got {value}"),
        ))
    }
}

/// How a crew-size mismatch was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrewResolution {
    /// The first igniter was cloned up to the required size
    ClonedFirst,
    /// Only the leading igniters by crew order were kept
    Truncated,
}

/// Non-fatal conditions reported alongside a generated pattern
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PatternWarning {
    /// The crew did not match the size a technique requires
    CrewSizeMismatch {
        technique: &'static str,
        expected: usize,
        actual: usize,
        resolution: CrewResolution,
    },
    /// A heat produced no ignition line and was left out of the pattern
    HeatDropped { heat: usize, reason: String },
    /// Part of the firing area cannot be reached across the elevation grid
    UnreachableCells { count: usize },
    /// A geometric operation produced several parts; only the largest was kept
    MultipartArea { operation: &'static str, parts: usize },
}

impl fmt::Display for PatternWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrewSizeMismatch {
                technique,
                expected,
                actual,
                resolution,
            } => {
                let action = match resolution {
                    CrewResolution::ClonedFirst => "cloned the first igniter",
                    CrewResolution::Truncated => "kept the leading igniters",
                };
                write!(
                    f,
                    "{technique} firing needs exactly {expected} igniter(s), \
                     crew has {actual}; {action}"
                )
            }
            Self::HeatDropped { heat, reason } => write!(f, "heat {heat} dropped: {reason}"),
            Self::UnreachableCells { count } => write!(
                f,
                "{count} grid cell(s) inside the firing area are unreachable from the source line"
            ),
            Self::MultipartArea { operation, parts } => write!(
                f,
                "{operation} produced {parts} parts; only the largest is used"
            ),
        }
    }
}
