//! Expansions whose coefficients are polynomials in time

use super::coefficients::{CoefficientSet, ExpansionConfig, TimeVaryingCoefficients};
use super::evaluator::MultipoleEvaluator;
use super::params::{decode_time_varying, encode_time_varying};
use super::radial::BoundaryCondition;
use super::MultipoleExpansion;
use crate::physics::error::ModelError;
use crate::physics::math::{Scalar, Vector};
use crate::physics::special::{LegendreRecurrence, SpecialFunctions};

/// A multipole expansion with `S_lm(t)` and `T_lm(t)` given as polynomials.
///
/// Every evaluation re-derives the instantaneous coefficients for the
/// requested time and hands them to [`MultipoleEvaluator`]; nothing
/// time-dependent is retained between calls. Time-varying expansions are
/// always evaluated on the interior branch.
#[derive(Debug, Clone)]
pub struct TimeDependentMultipole<F = LegendreRecurrence> {
    config: ExpansionConfig,
    coefficients: TimeVaryingCoefficients,
    functions: F,
}

impl TimeDependentMultipole<LegendreRecurrence> {
    pub fn from_parameters(params: &[Scalar]) -> Result<Self, ModelError> {
        Self::from_parameters_with(params, LegendreRecurrence)
    }
}

impl<F: SpecialFunctions> TimeDependentMultipole<F> {
    pub fn new(
        config: ExpansionConfig,
        coefficients: TimeVaryingCoefficients,
        functions: F,
    ) -> Result<Self, ModelError> {
        config.validate()?;
        if coefficients.lmax() != config.lmax {
            return Err(ModelError::LengthMismatch {
                name: "time-varying coefficients",
                expected: config.num_coefficients(),
                found: coefficients.s_lm().len(),
            });
        }
        Ok(Self {
            config: ExpansionConfig {
                boundary: BoundaryCondition::Interior,
                ..config
            },
            coefficients,
            functions,
        })
    }

    pub fn from_parameters_with(params: &[Scalar], functions: F) -> Result<Self, ModelError> {
        let (config, coefficients) = decode_time_varying(params)?;
        Ok(Self {
            config,
            coefficients,
            functions,
        })
    }

    pub fn to_parameters(&self) -> Vec<Scalar> {
        encode_time_varying(&self.config, &self.coefficients)
    }

    #[inline]
    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    #[inline]
    pub fn coefficients(&self) -> &TimeVaryingCoefficients {
        &self.coefficients
    }

    pub fn coefficients_at(&self, t: Scalar) -> CoefficientSet {
        self.coefficients.at(t)
    }

    pub fn potential(&self, t: Scalar, position: Vector) -> Scalar {
        let coefficients = self.coefficients_at(t);
        MultipoleEvaluator::new(&self.config, &coefficients, &self.functions).potential(position)
    }

    /// Add ∇Φ(t, `position`) to `out`
    pub fn gradient(&self, t: Scalar, position: Vector, out: &mut Vector) {
        let coefficients = self.coefficients_at(t);
        MultipoleEvaluator::new(&self.config, &coefficients, &self.functions)
            .gradient(position, out);
    }

    /// Always zero, like the static expansion's density.
    pub fn density(&self, t: Scalar, position: Vector) -> Scalar {
        let coefficients = self.coefficients_at(t);
        MultipoleEvaluator::new(&self.config, &coefficients, &self.functions).density(position)
    }

    /// Add ∇Φ(t, ·) at every position to the matching output slot
    pub fn gradient_batch(&self, t: Scalar, positions: &[Vector], out: &mut [Vector]) {
        let coefficients = self.coefficients_at(t);
        MultipoleEvaluator::new(&self.config, &coefficients, &self.functions)
            .gradient_batch(positions, out);
    }

    pub fn potential_batch(&self, t: Scalar, positions: &[Vector]) -> Vec<Scalar> {
        let coefficients = self.coefficients_at(t);
        MultipoleEvaluator::new(&self.config, &coefficients, &self.functions)
            .potential_batch(positions)
    }
}

impl<F: SpecialFunctions + Clone> TimeDependentMultipole<F> {
    /// Freeze the expansion at time `t` into a static model
    pub fn snapshot(&self, t: Scalar) -> MultipoleExpansion<F> {
        MultipoleExpansion::from_parts(self.config, self.coefficients_at(t), self.functions.clone())
    }
}
