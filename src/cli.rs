//! Command line interface for Multipole

use bevy::log::{debug, info};
use clap::Parser;
use std::fmt;

use crate::config::{LoadedModel, ModelConfig};
use crate::physics::error::ModelError;
use crate::physics::math::{Scalar, Vector};

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Model file could not be loaded
    ConfigLoad(String),
    /// Model parameters failed validation
    InvalidModel(ModelError),
    /// Model file could not be written
    Save(String),
    /// Nothing to evaluate
    NoPoints,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ConfigLoad(msg) => write!(f, "Failed to load model: {msg}"),
            CliError::InvalidModel(err) => write!(f, "Invalid model: {err}"),
            CliError::Save(msg) => write!(f, "Failed to save model: {msg}"),
            CliError::NoPoints => write!(f, "No evaluation points given; pass --point x,y,z"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ModelError> for CliError {
    fn from(err: ModelError) -> Self {
        CliError::InvalidModel(err)
    }
}

/// Multipole - evaluate spherical-harmonic expansions of gravitational fields
#[derive(Parser, Debug)]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"),
    about,
    long_about = None
)]
pub struct Args {
    /// Path to model file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub model: Option<String>,

    /// Evaluation point, repeatable
    #[arg(
        short,
        long = "point",
        value_name = "X,Y,Z",
        value_parser = parse_point,
        allow_hyphen_values = true
    )]
    pub points: Vec<Vector>,

    /// Evaluation time for time-dependent models
    #[arg(short, long, value_name = "T", default_value_t = 0.0, allow_negative_numbers = true)]
    pub time: Scalar,

    /// Gravitational constant (overrides model file)
    #[arg(short = 'g', long, value_name = "VALUE")]
    pub gravity: Option<Scalar>,

    /// Total mass (overrides model file)
    #[arg(long, value_name = "VALUE")]
    pub mass: Option<Scalar>,

    /// Scale radius (overrides model file)
    #[arg(long, value_name = "VALUE")]
    pub scale_radius: Option<Scalar>,

    /// Also print the potential gradient
    #[arg(long)]
    pub gradient: bool,

    /// Also print the density
    #[arg(long)]
    pub density: bool,

    /// Print the flat parameter buffer of the model
    #[arg(long)]
    pub print_parameters: bool,

    /// Write the resolved model, overrides included, to a file
    #[arg(long, value_name = "FILE")]
    pub save: Option<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Parses a point given as `x,y,z`
pub fn parse_point(value: &str) -> Result<Vector, String> {
    let components = value
        .split(',')
        .map(|component| {
            component
                .trim()
                .parse::<Scalar>()
                .map_err(|e| format!("invalid coordinate '{}': {e}", component.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match components.as_slice() {
        [x, y, z] => Ok(Vector::new(*x, *y, *z)),
        _ => Err(format!(
            "expected three comma-separated coordinates, found {}",
            components.len()
        )),
    }
}

/// Loads the model file or the per-user default, then applies command-line
/// overrides
pub fn load_and_apply_config(args: &Args) -> Result<ModelConfig, CliError> {
    let mut config = if let Some(model_path) = &args.model {
        info!("Loading model from: {model_path}");
        ModelConfig::load(model_path)
            .map_err(|e| CliError::ConfigLoad(format!("{model_path}: {e}")))?
    } else {
        ModelConfig::load_from_user_config()
    };

    if let Some(gravity) = args.gravity {
        info!("Overriding gravitational constant to: {gravity}");
        *config.gravitational_constant_mut() = gravity;
    }

    if let Some(mass) = args.mass {
        info!("Overriding mass to: {mass}");
        *config.mass_mut() = mass;
    }

    if let Some(scale_radius) = args.scale_radius {
        info!("Overriding scale radius to: {scale_radius}");
        *config.scale_radius_mut() = scale_radius;
    }

    Ok(config)
}

/// Field values at one point
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub position: Vector,
    pub potential: Scalar,
    pub gradient: Option<Vector>,
    pub density: Option<Scalar>,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.position;
        write!(f, "q=({}, {}, {}) potential={:e}", q.x, q.y, q.z, self.potential)?;
        if let Some(gradient) = self.gradient {
            write!(
                f,
                " gradient=({:e}, {:e}, {:e})",
                gradient.x, gradient.y, gradient.z
            )?;
        }
        if let Some(density) = self.density {
            write!(f, " density={density:e}")?;
        }
        Ok(())
    }
}

pub fn evaluate_points(args: &Args, model: &LoadedModel) -> Vec<Evaluation> {
    args.points
        .iter()
        .map(|&position| Evaluation {
            position,
            potential: model.potential(args.time, position),
            gradient: args.gradient.then(|| {
                let mut gradient = Vector::ZERO;
                model.gradient(args.time, position, &mut gradient);
                gradient
            }),
            density: args.density.then(|| model.density(args.time, position)),
        })
        .collect()
}

/// Resolves the model, then prints its parameters and field values as asked
pub fn run(args: &Args) -> Result<(), CliError> {
    let config = load_and_apply_config(args)?;
    let model = config.build()?;
    debug!("Built {} model", config.class());

    if let Some(path) = &args.save {
        config
            .save(path)
            .map_err(|e| CliError::Save(format!("{path}: {e}")))?;
    }

    if args.print_parameters {
        let parameters = model
            .to_parameters()
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("{} {parameters}", config.class());
    }

    if args.points.is_empty() {
        if args.print_parameters || args.save.is_some() {
            return Ok(());
        }
        return Err(CliError::NoPoints);
    }

    for evaluation in evaluate_points(args, &model) {
        println!("{evaluation}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("1, -2.5,3e2"), Ok(Vector::new(1.0, -2.5, 300.0)));
        assert!(parse_point("1,2").is_err());
        assert!(parse_point("1,2,z").is_err());
    }

    #[test]
    fn test_repeated_points_and_overrides() {
        let args = Args::parse_from([
            "multipole",
            "--point",
            "1,0,0",
            "-p",
            "0,0,-2",
            "--mass",
            "4",
            "--time",
            "-1.5",
        ]);
        assert_eq!(args.points.len(), 2);
        assert_eq!(args.mass, Some(4.0));
        assert_eq!(args.time, -1.5);
    }

    #[test]
    fn test_overrides_reach_the_model() {
        let path = std::env::temp_dir()
            .join(format!("multipole-cli-{}", std::process::id()))
            .join("model.toml");
        ModelConfig::default().save(&path).unwrap();

        let args = Args::parse_from([
            "multipole",
            "--model",
            path.to_str().unwrap(),
            "--gravity",
            "2",
            "--mass",
            "3",
            "--point",
            "2,0,0",
            "--gradient",
            "--density",
        ]);
        let model = load_and_apply_config(&args).unwrap().build().unwrap();
        let evaluations = evaluate_points(&args, &model);
        std::fs::remove_file(&path).unwrap();

        // -G M / r with G M = 6
        assert!((evaluations[0].potential + 3.0).abs() < 1e-14);
        let gradient = evaluations[0].gradient.unwrap();
        assert!((gradient.x - 1.5).abs() < 1e-14);
        assert_eq!(evaluations[0].density, Some(0.0));
    }

    #[test]
    fn test_missing_model_file_is_an_error() {
        let args = Args::parse_from(["multipole", "--model", "/nonexistent/model.toml"]);
        assert!(matches!(
            load_and_apply_config(&args),
            Err(CliError::ConfigLoad(_))
        ));
    }

    #[test]
    fn test_invalid_override_is_reported() {
        let mut config = ModelConfig::default();
        *config.scale_radius_mut() = 0.0;
        let err = CliError::from(config.build().unwrap_err());
        assert_eq!(
            err.to_string(),
            "Invalid model: scale radius must be positive and finite, found 0"
        );
    }
}
