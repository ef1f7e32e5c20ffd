//! Simulation configuration.
//!
//! Every tunable of the brew model lives in one immutable [`BrewConfig`]
//! resource that is threaded through bed initialisation, the physics step,
//! scoring and the session. Nothing reads module-level mutable state, so any
//! number of independent sessions can run side by side (tests do this).
//!
//! The defaults are the reference calibration. Hosts can load overrides from
//! JSON (`serde`) and must call [`BrewConfig::validate`] before use.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::{ConeGeometry, ConfigError};

/// Trace amounts below this are zeroed by the cleanup pass (grams).
pub const CLEANUP_EPSILON: f32 = 0.001;

/// A cell "has content" for pour routing when any mass field exceeds this (grams).
pub const CONTENT_THRESHOLD: f32 = 0.01;

// =============================================================================
// Substance properties
// =============================================================================

/// Densities in g/cm³ plus the absorption ratio of dry grounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Substances {
    pub water_density: f32,
    /// Porous and light.
    pub dry_grounds_density: f32,
    /// Absorbed water makes saturated grounds heavy.
    pub wet_grounds_density: f32,
    /// Grams of water one gram of dry grounds absorbs when it saturates.
    pub absorption_ratio: f32,
    /// Nominal cell volume in cm³, used by the volumetric helpers only.
    pub cell_volume: f32,
}

impl Default for Substances {
    fn default() -> Self {
        Self {
            water_density: 1.0,
            dry_grounds_density: 0.4,
            wet_grounds_density: 1.2,
            absorption_ratio: 2.0,
            cell_volume: 0.075,
        }
    }
}

impl Substances {
    /// Fraction of a wet-grounds mass that is the original grounds.
    #[inline]
    pub fn grounds_fraction_of_wet(&self) -> f32 {
        1.0 / (1.0 + self.absorption_ratio)
    }

    /// Fraction of a wet-grounds mass that is absorbed water.
    #[inline]
    pub fn water_fraction_of_wet(&self) -> f32 {
        self.absorption_ratio / (1.0 + self.absorption_ratio)
    }
}

// =============================================================================
// Physics rates
// =============================================================================

/// Per-tick transfer rates of the physics passes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhysicsRates {
    /// Share of a cell's dry grounds that may saturate in one tick.
    pub absorption_fraction: f32,
    /// Base share of bottom-layer free water leaving the vessel per tick.
    pub base_drain_rate: f32,
    /// Drain multiplier at grind size 0; rises linearly to 1.0 at grind 100.
    pub fine_grind_drain_floor: f32,
    /// Share of the drain rate that a cell packed to capacity with grounds blocks.
    pub grounds_drain_blockage: f32,
    /// Share of free water percolating into a cell dense with grounds.
    pub percolation_rate: f32,
    /// Share of free water falling into a mostly empty cell.
    pub free_fall_rate: f32,
    /// Share of the free-water difference equalised with a lateral neighbour.
    pub lateral_rate: f32,
    /// Number of lateral spreading sweeps per tick.
    pub lateral_passes: usize,
    /// Share of a cell's wet grounds sinking per tick.
    pub settle_rate: f32,
    /// Share of a cell's dry grounds floating up per tick.
    pub float_rate: f32,
    /// Base solids extracted per tick by a draining cell at the reference temperature.
    pub extraction_rate: f32,
    /// Temperature at which `extraction_rate` applies (°C).
    pub extraction_reference_temp: f32,
    /// Upper bound on extraction per tick as a share of the cell's grounds.
    pub max_extraction_fraction: f32,
}

impl Default for PhysicsRates {
    fn default() -> Self {
        Self {
            absorption_fraction: 0.8,
            base_drain_rate: 0.12,
            fine_grind_drain_floor: 0.3,
            grounds_drain_blockage: 0.3,
            percolation_rate: 0.7,
            free_fall_rate: 0.95,
            lateral_rate: 0.5,
            lateral_passes: 2,
            settle_rate: 0.08,
            float_rate: 0.05,
            extraction_rate: 0.02,
            extraction_reference_temp: 92.0,
            max_extraction_fraction: 0.25,
        }
    }
}

impl PhysicsRates {
    /// Shares above 1 would move more than a cell holds.
    fn validate(&self) -> Result<(), ConfigError> {
        let shares = [
            ("absorption_fraction", self.absorption_fraction),
            ("base_drain_rate", self.base_drain_rate),
            ("fine_grind_drain_floor", self.fine_grind_drain_floor),
            ("grounds_drain_blockage", self.grounds_drain_blockage),
            ("percolation_rate", self.percolation_rate),
            ("free_fall_rate", self.free_fall_rate),
            ("lateral_rate", self.lateral_rate),
            ("settle_rate", self.settle_rate),
            ("float_rate", self.float_rate),
            ("max_extraction_fraction", self.max_extraction_fraction),
        ];
        for (name, value) in shares {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        if !self.extraction_rate.is_finite() || self.extraction_rate < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "extraction_rate",
                value: self.extraction_rate,
            });
        }
        Ok(())
    }

    /// Drain rate for a grind size on the 0 (fine) - 100 (coarse) scale.
    /// Finer grinds drain slower.
    pub fn drain_rate_for_grind(&self, grind_size: f32) -> f32 {
        let grind = grind_size.clamp(0.0, 100.0) / 100.0;
        let modifier =
            self.fine_grind_drain_floor + grind * (1.0 - self.fine_grind_drain_floor);
        self.base_drain_rate * modifier
    }
}

// =============================================================================
// Session limits
// =============================================================================

/// Host-session parameters: dial ranges, dose limits and pour size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionLimits {
    pub default_grind_size: f32,
    pub default_temperature: f32,
    pub min_temperature: f32,
    pub max_temperature: f32,
    /// Most grounds the grinder will hold (grams).
    pub max_grounds_weight: f32,
    /// Least grounds needed before pouring may start (grams).
    pub min_grounds_weight: f32,
    /// Least water poured before a brew may be finished (grams).
    pub min_water_weight: f32,
    /// Bed mass units added per pour action.
    pub pour_amount: f32,
    /// Grams of host-facing water weight represented by one bed mass unit.
    pub water_scale: f32,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            default_grind_size: 50.0,
            default_temperature: 92.0,
            min_temperature: 80.0,
            max_temperature: 100.0,
            max_grounds_weight: 50.0,
            min_grounds_weight: 5.0,
            min_water_weight: 10.0,
            pour_amount: 0.2,
            water_scale: 2.0,
        }
    }
}

// =============================================================================
// BrewConfig resource
// =============================================================================

/// Immutable configuration for one or more brew sessions.
#[derive(Resource, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrewConfig {
    pub geometry: ConeGeometry,
    pub substances: Substances,
    pub rates: PhysicsRates,
    pub limits: SessionLimits,
    /// Room temperature: initial cell temperature and the extraction cut-off (°C).
    pub ambient_temperature: f32,
    /// Flat mass ceiling of a cell (grams of dry + wet + free).
    pub cell_capacity: f32,
    /// Most dry grounds seeded into one cell when the bed is filled (grams).
    pub max_grounds_per_cell: f32,
    /// Fixed host cadence of the physics tick (seconds).
    pub tick_seconds: f32,
}

impl Default for BrewConfig {
    fn default() -> Self {
        Self {
            geometry: ConeGeometry::default(),
            substances: Substances::default(),
            rates: PhysicsRates::default(),
            limits: SessionLimits::default(),
            ambient_temperature: 20.0,
            cell_capacity: 3.0,
            max_grounds_per_cell: 0.8,
            tick_seconds: 0.15,
        }
    }
}

impl BrewConfig {
    /// Parse a config from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the geometry, that every physical quantity is positive, and that
    /// every per-tick share lies in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geometry.validate()?;

        let positives = [
            ("water_density", self.substances.water_density),
            ("dry_grounds_density", self.substances.dry_grounds_density),
            ("wet_grounds_density", self.substances.wet_grounds_density),
            ("absorption_ratio", self.substances.absorption_ratio),
            ("cell_volume", self.substances.cell_volume),
            ("cell_capacity", self.cell_capacity),
            ("max_grounds_per_cell", self.max_grounds_per_cell),
            ("tick_seconds", self.tick_seconds),
            ("pour_amount", self.limits.pour_amount),
            ("water_scale", self.limits.water_scale),
            (
                "extraction_reference_temp",
                self.rates.extraction_reference_temp,
            ),
        ];
        for (name, value) in positives {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        self.rates.validate()?;
        if !self.ambient_temperature.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "ambient_temperature",
                value: self.ambient_temperature,
            });
        }
        Ok(())
    }
}
