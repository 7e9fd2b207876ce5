//! Validation errors raised while decoding or building a field model

use crate::physics::math::Scalar;
use thiserror::Error;

/// Everything that can make a parameter buffer or model description
/// untrustworthy. Evaluation itself never fails; all checks happen when the
/// model is decoded, so a bad model is rejected before integration starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("parameter buffer too short: expected at least {expected} values, found {found}")]
    BufferTooShort { expected: usize, found: usize },

    #[error("{name} must be a non-negative integer, found {value}")]
    InvalidCount { name: &'static str, value: Scalar },

    #[error("num_coeff is {found} but lmax {lmax} packs {expected} coefficients")]
    CoefficientCount {
        lmax: usize,
        expected: usize,
        found: usize,
    },

    #[error("boundary flag must be 0 (exterior) or 1 (interior), found {0}")]
    InvalidBoundary(Scalar),

    #[error("scale radius must be positive and finite, found {0}")]
    InvalidScaleRadius(Scalar),

    #[error("{name} must be finite, found {value}")]
    NonFinite { name: &'static str, value: Scalar },

    #[error("{name} has {found} entries, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Interpret a buffer entry as a count (lmax, num_coeff, polynomial degree).
pub(crate) fn count_from_scalar(name: &'static str, value: Scalar) -> Result<usize, ModelError> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as Scalar {
        Ok(value as usize)
    } else {
        Err(ModelError::InvalidCount { name, value })
    }
}

pub(crate) fn ensure_finite(name: &'static str, value: Scalar) -> Result<Scalar, ModelError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::NonFinite { name, value })
    }
}
