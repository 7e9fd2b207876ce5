//! Multipole prelude module
//!
//! This module re-exports the most commonly used types and traits to reduce
//! import boilerplate.

// Internal re-exports - Config
pub use crate::config::{LoadedModel, ModelConfig};

// Internal re-exports - Math
pub use crate::physics::math::{SQRT_FOUR_PI, Scalar, SphericalCoord, Vector};

// Internal re-exports - Errors
pub use crate::physics::error::ModelError;

// Internal re-exports - Field models
pub use crate::physics::field::{
    AccelerationField, FieldModel, FrozenAt, StaticMultipoleModel, TimeDependentMultipoleModel,
};
pub use crate::physics::multipole::{
    BoundaryCondition, CoefficientSet, ExpansionConfig, MultipoleEvaluator, MultipoleExpansion,
    TimeDependentMultipole, TimePolynomial, TimeVaryingCoefficients,
};
pub use crate::physics::special::{LegendreRecurrence, SpecialFunctions};
