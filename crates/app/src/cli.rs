//! Command-line options.

use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use simulation::config::BrewConfig;
use simulation::geometry::ConfigError;

/// Headless pour-over brew simulator.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "pourover", version, about, long_about = None)]
pub struct Options {
    /// Drive a brew with newline-delimited JSON over stdin/stdout.
    #[arg(long)]
    pub agent: bool,
    /// Seed of the scripted pour spiral.
    #[arg(long, value_name = "N", default_value_t = 42)]
    pub seed: u64,
    /// Grounds to grind for the demo brew (grams).
    #[arg(long, value_name = "GRAMS", default_value_t = 15.0)]
    pub grams: f32,
    /// Grind size, 0 (fine) - 100 (coarse).
    #[arg(long = "grind", value_name = "SIZE", default_value_t = 50.0)]
    pub grind_size: f32,
    /// Pour temperature (°C).
    #[arg(long = "temp", value_name = "CELSIUS", default_value_t = 93.0)]
    pub temperature: f32,
    /// JSON file overriding the default calibration.
    #[arg(long = "config", value_name = "PATH")]
    pub config_path: Option<PathBuf>,
    /// Run the demo at the fixed tick cadence instead of as fast as possible.
    #[arg(long, conflicts_with = "agent")]
    pub realtime: bool,
    /// Print the bed debug report to stderr after the demo brew.
    #[arg(long, conflicts_with = "agent")]
    pub report: bool,
}

/// Failure to load the file given with `--config`.
#[derive(Debug)]
pub enum LoadConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Invalid { path: PathBuf, source: ConfigError },
}

impl fmt::Display for LoadConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadConfigError::Read { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            LoadConfigError::Invalid { path, source } => {
                write!(f, "bad config {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for LoadConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadConfigError::Read { source, .. } => Some(source),
            LoadConfigError::Invalid { source, .. } => Some(source),
        }
    }
}

impl Options {
    /// The default calibration, or the JSON file given with `--config`.
    pub fn load_config(&self) -> Result<BrewConfig, LoadConfigError> {
        let Some(path) = &self.config_path else {
            return Ok(BrewConfig::default());
        };
        let json = std::fs::read_to_string(path).map_err(|source| LoadConfigError::Read {
            path: path.clone(),
            source,
        })?;
        BrewConfig::from_json(&json).map_err(|source| LoadConfigError::Invalid {
            path: path.clone(),
            source,
        })
    }
}
