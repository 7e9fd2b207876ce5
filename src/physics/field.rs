//! Field-model interfaces seen by an orbit integrator
//!
//! Two seams are offered. [`AccelerationField`] is the structured one: an
//! integrator asks for the acceleration at a position. [`FieldModel`] is the
//! flat one used by frameworks that pass every model a time, a parameter
//! buffer and a position buffer, and that decode the parameters on every
//! call.

use bevy::log::{debug, warn};

use crate::physics::error::ModelError;
use crate::physics::math::{Scalar, Vector};
use crate::physics::multipole::{MultipoleExpansion, TimeDependentMultipole};
use crate::physics::special::{LegendreRecurrence, SpecialFunctions};

/// Acceleration at a position, consumed by integrators.
pub trait AccelerationField {
    fn at(&self, position: Vector) -> Vector;
}

/// Uniform flat-buffer call signature.
///
/// `validate` performs every check the evaluation methods perform; a driver
/// should call it once before integrating so that bad parameters fail loudly
/// up front rather than mid-trajectory.
pub trait FieldModel: Send + Sync {
    /// Short name of the model, matching the `class` of a model file
    fn name(&self) -> &'static str;

    fn validate(&self, params: &[Scalar]) -> Result<(), ModelError>;

    fn potential(
        &self,
        t: Scalar,
        params: &[Scalar],
        q: &[Scalar; 3],
    ) -> Result<Scalar, ModelError>;

    /// Add ∇Φ(t, q) to `out`; existing contents are accumulated into, not
    /// replaced.
    fn gradient(
        &self,
        t: Scalar,
        params: &[Scalar],
        q: &[Scalar; 3],
        out: &mut [Scalar; 3],
    ) -> Result<(), ModelError>;

    fn density(
        &self,
        t: Scalar,
        params: &[Scalar],
        q: &[Scalar; 3],
    ) -> Result<Scalar, ModelError>;
}

fn add_into(out: &mut [Scalar; 3], gradient: Vector) {
    out[0] += gradient.x;
    out[1] += gradient.y;
    out[2] += gradient.z;
}

/// Time-invariant expansion behind the flat signature. `t` is ignored.
#[derive(Debug, Clone, Default)]
pub struct StaticMultipoleModel<F = LegendreRecurrence> {
    functions: F,
}

impl<F: SpecialFunctions + Clone> StaticMultipoleModel<F> {
    pub fn new(functions: F) -> Self {
        Self { functions }
    }

    fn decode(&self, params: &[Scalar]) -> Result<MultipoleExpansion<F>, ModelError> {
        MultipoleExpansion::from_parameters_with(params, self.functions.clone())
    }
}

impl<F: SpecialFunctions + Clone> FieldModel for StaticMultipoleModel<F> {
    fn name(&self) -> &'static str {
        "MultipoleExpansion"
    }

    fn validate(&self, params: &[Scalar]) -> Result<(), ModelError> {
        let model = self
            .decode(params)
            .inspect_err(|e| warn!("Rejected {} parameters: {e}", self.name()))?;
        debug!(
            "Validated {} parameters: lmax {}, {} coefficients",
            self.name(),
            model.config().lmax,
            model.config().num_coefficients()
        );
        Ok(())
    }

    fn potential(
        &self,
        _t: Scalar,
        params: &[Scalar],
        q: &[Scalar; 3],
    ) -> Result<Scalar, ModelError> {
        Ok(self.decode(params)?.potential(Vector::from_array(*q)))
    }

    fn gradient(
        &self,
        _t: Scalar,
        params: &[Scalar],
        q: &[Scalar; 3],
        out: &mut [Scalar; 3],
    ) -> Result<(), ModelError> {
        let mut gradient = Vector::ZERO;
        self.decode(params)?.gradient(Vector::from_array(*q), &mut gradient);
        add_into(out, gradient);
        Ok(())
    }

    fn density(
        &self,
        _t: Scalar,
        params: &[Scalar],
        q: &[Scalar; 3],
    ) -> Result<Scalar, ModelError> {
        Ok(self.decode(params)?.density(Vector::from_array(*q)))
    }
}

/// Expansion with polynomial time dependence behind the flat signature.
#[derive(Debug, Clone, Default)]
pub struct TimeDependentMultipoleModel<F = LegendreRecurrence> {
    functions: F,
}

impl<F: SpecialFunctions + Clone> TimeDependentMultipoleModel<F> {
    pub fn new(functions: F) -> Self {
        Self { functions }
    }

    fn decode(&self, params: &[Scalar]) -> Result<TimeDependentMultipole<F>, ModelError> {
        TimeDependentMultipole::from_parameters_with(params, self.functions.clone())
    }
}

impl<F: SpecialFunctions + Clone> FieldModel for TimeDependentMultipoleModel<F> {
    fn name(&self) -> &'static str {
        "TimeDependentMultipole"
    }

    fn validate(&self, params: &[Scalar]) -> Result<(), ModelError> {
        let model = self
            .decode(params)
            .inspect_err(|e| warn!("Rejected {} parameters: {e}", self.name()))?;
        debug!(
            "Validated {} parameters: lmax {}, {} coefficients",
            self.name(),
            model.config().lmax,
            model.config().num_coefficients()
        );
        Ok(())
    }

    fn potential(
        &self,
        t: Scalar,
        params: &[Scalar],
        q: &[Scalar; 3],
    ) -> Result<Scalar, ModelError> {
        Ok(self.decode(params)?.potential(t, Vector::from_array(*q)))
    }

    fn gradient(
        &self,
        t: Scalar,
        params: &[Scalar],
        q: &[Scalar; 3],
        out: &mut [Scalar; 3],
    ) -> Result<(), ModelError> {
        let mut gradient = Vector::ZERO;
        self.decode(params)?.gradient(t, Vector::from_array(*q), &mut gradient);
        add_into(out, gradient);
        Ok(())
    }

    fn density(
        &self,
        t: Scalar,
        params: &[Scalar],
        q: &[Scalar; 3],
    ) -> Result<Scalar, ModelError> {
        Ok(self.decode(params)?.density(t, Vector::from_array(*q)))
    }
}

/// A time-dependent expansion viewed at a fixed time, for integrators that
/// only know about [`AccelerationField`].
pub struct FrozenAt<'a, F = LegendreRecurrence> {
    pub model: &'a TimeDependentMultipole<F>,
    pub t: Scalar,
}

impl<F: SpecialFunctions> AccelerationField for FrozenAt<'_, F> {
    fn at(&self, position: Vector) -> Vector {
        let mut gradient = Vector::ZERO;
        self.model.gradient(self.t, position, &mut gradient);
        -gradient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_params() -> Vec<Scalar> {
        // Exterior dipole, G = 1, M = 2, r_s = 1.5
        vec![1.0, 1.0, 3.0, 0.0, 2.0, 1.5, 1.0, 0.0, 0.3, 0.0, -0.2, 0.1]
    }

    #[test]
    fn test_static_model_matches_structured_expansion() {
        let params = static_params();
        let model = StaticMultipoleModel::<LegendreRecurrence>::default();
        let expansion = MultipoleExpansion::from_parameters(&params).unwrap();
        let q = [0.5, -1.0, 0.75];

        assert_eq!(
            model.potential(0.0, &params, &q).unwrap(),
            expansion.potential(Vector::from_array(q))
        );
        assert_eq!(model.density(0.0, &params, &q).unwrap(), 0.0);
    }

    #[test]
    fn test_gradient_accumulates_into_output() {
        let params = static_params();
        let model = StaticMultipoleModel::<LegendreRecurrence>::default();
        let q = [0.5, -1.0, 0.75];

        let mut once = [0.0; 3];
        model.gradient(0.0, &params, &q, &mut once).unwrap();

        let mut twice = [0.0; 3];
        model.gradient(0.0, &params, &q, &mut twice).unwrap();
        model.gradient(0.0, &params, &q, &mut twice).unwrap();

        for axis in 0..3 {
            assert!((twice[axis] - 2.0 * once[axis]).abs() < 1e-14);
        }
    }

    #[test]
    fn test_validation_fails_before_evaluation() {
        let mut params = static_params();
        params[2] = 2.0;
        let model = StaticMultipoleModel::<LegendreRecurrence>::default();

        assert!(model.validate(&params).is_err());
        let mut out = [7.0; 3];
        assert!(model.gradient(0.0, &params, &[1.0, 1.0, 1.0], &mut out).is_err());
        assert_eq!(out, [7.0; 3]);
    }

    #[test]
    fn test_validation_rejects_oversized_degree() {
        let params = [1.0, u32::MAX as Scalar, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0];
        let static_model = StaticMultipoleModel::<LegendreRecurrence>::default();
        assert!(matches!(
            static_model.validate(&params),
            Err(ModelError::InvalidCount { name: "lmax", .. })
        ));

        let time_model = TimeDependentMultipoleModel::<LegendreRecurrence>::default();
        assert!(matches!(
            time_model.validate(&params),
            Err(ModelError::InvalidCount { name: "lmax", .. })
        ));
    }

    #[test]
    fn test_time_dependent_model_uses_time() {
        // lmax = 0, S_00(t) = 1 + t
        let params = vec![1.0, 0.0, 1.0, 2.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let model = TimeDependentMultipoleModel::<LegendreRecurrence>::default();
        model.validate(&params).unwrap();

        let q = [1.0, 2.0, 2.0];
        let at_zero = model.potential(0.0, &params, &q).unwrap();
        let at_one = model.potential(1.0, &params, &q).unwrap();
        assert!((at_one - 2.0 * at_zero).abs() < 1e-14);
    }

    #[test]
    fn test_frozen_field_matches_snapshot() {
        let params = vec![1.0, 0.0, 1.0, 2.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let model = TimeDependentMultipole::from_parameters(&params).unwrap();
        let position = Vector::new(1.0, -1.0, 0.5);

        let frozen = FrozenAt { model: &model, t: 3.0 };
        assert_eq!(frozen.at(position), model.snapshot(3.0).at(position));
    }
}
