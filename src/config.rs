//! Model files
//!
//! A model file names the model class and carries its parameters in a
//! readable form rather than as a flat buffer:
//!
//! ```toml
//! class = "MultipoleExpansion"
//! gravitational_constant = 1.0
//! mass = 1.0
//! scale_radius = 1.0
//! lmax = 0
//! boundary = "exterior"
//! s_lm = [-3.544907701811031]
//! t_lm = [0.0]
//! ```
//!
//! Time-dependent models use `class = "TimeDependentMultipole"`, omit
//! `boundary` and give each `s_lm`/`t_lm` entry as a list of polynomial
//! coefficients in ascending power of time.

use bevy::log::{debug, info, warn};
use chrono::Local;
use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::physics::error::ModelError;
use crate::physics::math::{SQRT_FOUR_PI, Scalar, Vector};
use crate::physics::multipole::{
    BoundaryCondition, CoefficientSet, ExpansionConfig, MultipoleExpansion,
    TimeDependentMultipole, TimePolynomial, TimeVaryingCoefficients,
};
use crate::physics::special::LegendreRecurrence;

/// Prefix of environment variables that override model-file keys,
/// e.g. `MULTIPOLE__MASS=2.5`.
pub const ENV_PREFIX: &str = "MULTIPOLE";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "class")]
pub enum ModelConfig {
    MultipoleExpansion(StaticModelConfig),
    TimeDependentMultipole(TimeDependentModelConfig),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StaticModelConfig {
    pub gravitational_constant: Scalar,
    pub mass: Scalar,
    pub scale_radius: Scalar,
    pub lmax: usize,
    pub boundary: BoundaryCondition,
    pub s_lm: Vec<Scalar>,
    pub t_lm: Vec<Scalar>,
}

/// The boundary is not stored; time-dependent models are always interior.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimeDependentModelConfig {
    pub gravitational_constant: Scalar,
    pub mass: Scalar,
    pub scale_radius: Scalar,
    pub lmax: usize,
    pub s_lm: Vec<Vec<Scalar>>,
    pub t_lm: Vec<Vec<Scalar>>,
}

/// Point-mass monopole with G = M = r_s = 1
impl Default for ModelConfig {
    fn default() -> Self {
        Self::MultipoleExpansion(StaticModelConfig {
            gravitational_constant: 1.0,
            mass: 1.0,
            scale_radius: 1.0,
            lmax: 0,
            boundary: BoundaryCondition::Exterior,
            s_lm: vec![-SQRT_FOUR_PI],
            t_lm: vec![0.0],
        })
    }
}

/// A model built from a [`ModelConfig`], ready to evaluate.
#[derive(Debug, Clone)]
pub enum LoadedModel {
    Static(MultipoleExpansion),
    TimeDependent(TimeDependentMultipole),
}

impl LoadedModel {
    pub fn potential(&self, t: Scalar, position: Vector) -> Scalar {
        match self {
            Self::Static(model) => model.potential(position),
            Self::TimeDependent(model) => model.potential(t, position),
        }
    }

    /// Add ∇Φ(t, `position`) to `out`
    pub fn gradient(&self, t: Scalar, position: Vector, out: &mut Vector) {
        match self {
            Self::Static(model) => model.gradient(position, out),
            Self::TimeDependent(model) => model.gradient(t, position, out),
        }
    }

    pub fn density(&self, t: Scalar, position: Vector) -> Scalar {
        match self {
            Self::Static(model) => model.density(position),
            Self::TimeDependent(model) => model.density(t, position),
        }
    }

    pub fn to_parameters(&self) -> Vec<Scalar> {
        match self {
            Self::Static(model) => model.to_parameters(),
            Self::TimeDependent(model) => model.to_parameters(),
        }
    }
}

impl ModelConfig {
    /// Model class name as written in the `class` key
    pub fn class(&self) -> &'static str {
        match self {
            Self::MultipoleExpansion(_) => "MultipoleExpansion",
            Self::TimeDependentMultipole(_) => "TimeDependentMultipole",
        }
    }

    pub fn gravitational_constant_mut(&mut self) -> &mut Scalar {
        match self {
            Self::MultipoleExpansion(model) => &mut model.gravitational_constant,
            Self::TimeDependentMultipole(model) => &mut model.gravitational_constant,
        }
    }

    pub fn mass_mut(&mut self) -> &mut Scalar {
        match self {
            Self::MultipoleExpansion(model) => &mut model.mass,
            Self::TimeDependentMultipole(model) => &mut model.mass,
        }
    }

    pub fn scale_radius_mut(&mut self) -> &mut Scalar {
        match self {
            Self::MultipoleExpansion(model) => &mut model.scale_radius,
            Self::TimeDependentMultipole(model) => &mut model.scale_radius,
        }
    }

    /// Read a model file, layering `MULTIPOLE__*` environment overrides on
    /// top of it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Reading model file {}", path.display());
        Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load a model file, falling back to the default model if it is missing
    /// or unreadable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("Model file {} not found. Using defaults.", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(model) => model,
            Err(e) => {
                warn!(
                    "Failed to parse model file {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Per-user model file, e.g. `~/.config/multipole/model.toml` on Linux
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "multipole").map(|dirs| dirs.config_dir().join("model.toml"))
    }

    pub fn load_from_user_config() -> Self {
        match Self::user_config_path() {
            Some(path) => Self::load_or_default(path),
            None => {
                warn!("Could not determine the user configuration directory. Using defaults.");
                Self::default()
            }
        }
    }

    /// Save the model to a file, stamped with the time it was written
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S %z");
        let content = format!(
            "# {} model written {stamp}\n{}",
            self.class(),
            toml::to_string_pretty(self)?
        );
        std::fs::write(path, content)?;
        info!("Saved {} model to {}", self.class(), path.display());
        Ok(())
    }

    pub fn expansion_config(&self) -> Result<ExpansionConfig, ModelError> {
        match self {
            Self::MultipoleExpansion(model) => ExpansionConfig::new(
                model.gravitational_constant,
                model.lmax,
                model.boundary,
                model.mass,
                model.scale_radius,
            ),
            Self::TimeDependentMultipole(model) => ExpansionConfig::new(
                model.gravitational_constant,
                model.lmax,
                BoundaryCondition::Interior,
                model.mass,
                model.scale_radius,
            ),
        }
    }

    /// Validate the model and build it with the reference special functions
    pub fn build(&self) -> Result<LoadedModel, ModelError> {
        let config = self.expansion_config()?;
        match self {
            Self::MultipoleExpansion(model) => {
                let coefficients =
                    CoefficientSet::new(model.lmax, model.s_lm.clone(), model.t_lm.clone())?;
                let expansion = MultipoleExpansion::new(config, coefficients, LegendreRecurrence)?;
                Ok(LoadedModel::Static(expansion))
            }
            Self::TimeDependentMultipole(model) => {
                let polynomials = |series: &[Vec<Scalar>]| {
                    series
                        .iter()
                        .map(|coefficients| TimePolynomial::new(coefficients.clone()))
                        .collect::<Vec<_>>()
                };
                let coefficients = TimeVaryingCoefficients::new(
                    model.lmax,
                    polynomials(&model.s_lm),
                    polynomials(&model.t_lm),
                )?;
                let expansion =
                    TimeDependentMultipole::new(config, coefficients, LegendreRecurrence)?;
                Ok(LoadedModel::TimeDependent(expansion))
            }
        }
    }

    /// Flat parameter buffer for the model's class
    pub fn to_parameters(&self) -> Result<Vec<Scalar>, ModelError> {
        Ok(self.build()?.to_parameters())
    }
}

impl From<&MultipoleExpansion> for ModelConfig {
    fn from(model: &MultipoleExpansion) -> Self {
        let config = model.config();
        Self::MultipoleExpansion(StaticModelConfig {
            gravitational_constant: config.gravitational_constant,
            mass: config.mass,
            scale_radius: config.scale_radius,
            lmax: config.lmax,
            boundary: config.boundary,
            s_lm: model.coefficients().s_lm().to_vec(),
            t_lm: model.coefficients().t_lm().to_vec(),
        })
    }
}

impl From<&TimeDependentMultipole> for ModelConfig {
    fn from(model: &TimeDependentMultipole) -> Self {
        let config = model.config();
        let series = |polynomials: &[TimePolynomial]| {
            polynomials
                .iter()
                .map(|polynomial| polynomial.coefficients().to_vec())
                .collect()
        };
        Self::TimeDependentMultipole(TimeDependentModelConfig {
            gravitational_constant: config.gravitational_constant,
            mass: config.mass,
            scale_radius: config.scale_radius,
            lmax: config.lmax,
            s_lm: series(model.coefficients().s_lm()),
            t_lm: series(model.coefficients().t_lm()),
        })
    }
}
