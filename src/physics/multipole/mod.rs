//! Spherical-harmonic multipole expansion of a gravitational field
//!
//! The potential is
//!
//! ```text
//! Φ(x) = (G M / r_s) Σ_l Σ_{m≤l} R_l(s) Y_lm(cos θ) (S_lm cos mφ + T_lm sin mφ)
//! ```
//!
//! with s = r / r_s and R_l either s^l (interior) or s^-(l+1) (exterior).

pub mod angular;
pub mod coefficients;
pub mod evaluator;
pub mod params;
pub mod radial;
pub mod time_dependent;

pub use coefficients::{
    CoefficientSet, ExpansionConfig, TimePolynomial, TimeVaryingCoefficients, num_coefficients,
    packed_index,
};
pub use evaluator::MultipoleEvaluator;
pub use radial::BoundaryCondition;
pub use time_dependent::TimeDependentMultipole;

use crate::physics::error::ModelError;
use crate::physics::field::AccelerationField;
use crate::physics::math::{Scalar, Vector};
use crate::physics::special::{LegendreRecurrence, SpecialFunctions};

/// A validated, time-invariant expansion that owns its coefficients and
/// special-function backend.
#[derive(Debug, Clone)]
pub struct MultipoleExpansion<F = LegendreRecurrence> {
    config: ExpansionConfig,
    coefficients: CoefficientSet,
    functions: F,
}

impl MultipoleExpansion<LegendreRecurrence> {
    pub fn from_parameters(params: &[Scalar]) -> Result<Self, ModelError> {
        Self::from_parameters_with(params, LegendreRecurrence)
    }
}

impl<F: SpecialFunctions> MultipoleExpansion<F> {
    pub fn new(
        config: ExpansionConfig,
        coefficients: CoefficientSet,
        functions: F,
    ) -> Result<Self, ModelError> {
        config.validate()?;
        if coefficients.lmax() != config.lmax {
            return Err(ModelError::LengthMismatch {
                name: "coefficients",
                expected: config.num_coefficients(),
                found: coefficients.len(),
            });
        }
        Ok(Self::from_parts(config, coefficients, functions))
    }

    pub(crate) fn from_parts(
        config: ExpansionConfig,
        coefficients: CoefficientSet,
        functions: F,
    ) -> Self {
        Self {
            config,
            coefficients,
            functions,
        }
    }

    pub fn from_parameters_with(params: &[Scalar], functions: F) -> Result<Self, ModelError> {
        let (config, coefficients) = params::decode_static(params)?;
        Ok(Self::from_parts(config, coefficients, functions))
    }

    pub fn to_parameters(&self) -> Vec<Scalar> {
        params::encode_static(&self.config, &self.coefficients)
    }

    #[inline]
    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    #[inline]
    pub fn coefficients(&self) -> &CoefficientSet {
        &self.coefficients
    }

    pub fn evaluator(&self) -> MultipoleEvaluator<'_, F> {
        MultipoleEvaluator::new(&self.config, &self.coefficients, &self.functions)
    }

    pub fn potential(&self, position: Vector) -> Scalar {
        self.evaluator().potential(position)
    }

    /// Add ∇Φ(`position`) to `out`
    pub fn gradient(&self, position: Vector, out: &mut Vector) {
        self.evaluator().gradient(position, out);
    }

    pub fn density(&self, position: Vector) -> Scalar {
        self.evaluator().density(position)
    }
}

impl<F: SpecialFunctions> AccelerationField for MultipoleExpansion<F> {
    fn at(&self, position: Vector) -> Vector {
        let mut gradient = Vector::ZERO;
        self.gradient(position, &mut gradient);
        -gradient
    }
}
