//! Radial basis functions for the interior and exterior solutions

use crate::physics::error::ModelError;
use crate::physics::math::Scalar;
use serde::{Deserialize, Serialize};

/// Which radial solution of Laplace's equation models the field.
///
/// Encoded in parameter buffers as `1.0` (interior) or `0.0` (exterior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCondition {
    /// Regular at the origin, growing as s^l
    Interior,
    /// Decaying at infinity as s^-(l+1)
    Exterior,
}

impl BoundaryCondition {
    pub fn from_flag(flag: Scalar) -> Result<Self, ModelError> {
        if flag == 1.0 {
            Ok(Self::Interior)
        } else if flag == 0.0 {
            Ok(Self::Exterior)
        } else {
            Err(ModelError::InvalidBoundary(flag))
        }
    }

    pub fn flag(self) -> Scalar {
        match self {
            Self::Interior => 1.0,
            Self::Exterior => 0.0,
        }
    }

    /// Radial factor of the degree-`l` potential term at scaled radius `s`
    #[inline]
    pub fn potential(self, s: Scalar, l: usize) -> Scalar {
        let l = l as Scalar;
        match self {
            Self::Interior => libm::pow(s, l),
            Self::Exterior => libm::pow(s, -(l + 1.0)),
        }
    }

    /// d/ds of [`Self::potential`]
    #[inline]
    pub fn potential_derivative(self, s: Scalar, l: usize) -> Scalar {
        let l = l as Scalar;
        match self {
            Self::Interior => l * libm::pow(s, l - 1.0),
            Self::Exterior => -(l + 1.0) * libm::pow(s, -(l + 2.0)),
        }
    }

    /// Radial factor of the degree-`l` density term at scaled radius `s`
    #[inline]
    pub fn density(self, s: Scalar, l: usize) -> Scalar {
        let l = l as Scalar;
        match self {
            Self::Interior => l * (l + 1.0) * libm::pow(s, l - 2.0),
            Self::Exterior => l * (l + 1.0) * libm::pow(s, -(l + 3.0)),
        }
    }
}
