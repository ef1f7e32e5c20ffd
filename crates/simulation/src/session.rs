//! One brew from grinding to the scored cup.
//!
//! [`BrewSession`] owns the bed, the pour log and the dial settings, and moves
//! through `Grind -> Pour -> Complete`. Host actions arrive through the
//! [`crate::brew_actions`] queue; the physics step runs once per fixed tick
//! while the session is in the pour phase.

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bed::{create_empty_bed, CoffeeBed};
use crate::config::BrewConfig;
use crate::extraction::{score_brew, BrewInputs, BrewResult, Roast};
use crate::pattern::{PourEvent, PourLog};
use crate::physics::{step_bed, StepReport};
use crate::vessel::map_point_to_cell;
use crate::BrewSet;

// =============================================================================
// Phase and errors
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrewPhase {
    #[default]
    Grind,
    Pour,
    Complete,
}

impl BrewPhase {
    pub fn label(self) -> &'static str {
        match self {
            BrewPhase::Grind => "grind",
            BrewPhase::Pour => "pour",
            BrewPhase::Complete => "complete",
        }
    }
}

impl fmt::Display for BrewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a session refused an action. The session is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BrewError {
    WrongPhase {
        action: String,
        phase: BrewPhase,
    },
    NotEnoughGrounds {
        have: f32,
        need: f32,
    },
    NotEnoughWater {
        have: f32,
        need: f32,
    },
    /// The pour point is outside the vessel rim.
    OutsideVessel,
    /// Pouring with an empty dripper.
    NoGrounds,
    /// A dial or amount that must be a finite number was not.
    InvalidValue {
        name: String,
        value: f32,
    },
}

impl fmt::Display for BrewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrewError::WrongPhase { action, phase } => {
                write!(f, "cannot {action} during the {phase} phase")
            }
            BrewError::NotEnoughGrounds { have, need } => {
                write!(f, "need at least {need}g of grounds, have {have:.1}g")
            }
            BrewError::NotEnoughWater { have, need } => {
                write!(f, "need at least {need}g of water, have {have:.1}g")
            }
            BrewError::OutsideVessel => write!(f, "pour point is outside the vessel"),
            BrewError::NoGrounds => write!(f, "no grounds in the dripper"),
            BrewError::InvalidValue { name, value } => {
                write!(f, "`{name}` must be a finite number, got {value}")
            }
        }
    }
}

impl std::error::Error for BrewError {}

fn require_finite(name: &str, value: f32) -> Result<f32, BrewError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BrewError::InvalidValue {
            name: name.to_string(),
            value,
        })
    }
}

// =============================================================================
// BrewSession resource
// =============================================================================

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrewSession {
    pub phase: BrewPhase,
    /// 0 (fine) - 100 (coarse).
    pub grind_size: f32,
    /// Pour temperature (°C).
    pub temperature: f32,
    pub roast: Roast,
    /// Grams of grounds in the dripper.
    pub grounds_weight: f32,
    /// Grams of water poured so far.
    pub water_weight: f32,
    /// Seconds since the first pour.
    pub contact_time: f32,
    /// Grams of liquid that left the bed, before subtracting absorption.
    pub drained_total: f32,
    /// Estimated grams of coffee in the mug.
    pub coffee_in_mug: f32,
    pub bed: CoffeeBed,
    pub pours: PourLog,
    /// Whether the first pour has started the brew clock.
    pub clock_running: bool,
    pub result: Option<BrewResult>,
}

impl FromWorld for BrewSession {
    fn from_world(world: &mut World) -> Self {
        match world.get_resource::<BrewConfig>() {
            Some(config) => Self::new(config),
            None => Self::new(&BrewConfig::default()),
        }
    }
}

impl BrewSession {
    /// A fresh session in the grind phase with the default dial settings.
    pub fn new(config: &BrewConfig) -> Self {
        Self {
            phase: BrewPhase::Grind,
            grind_size: config.limits.default_grind_size,
            temperature: config.limits.default_temperature,
            roast: Roast::default(),
            grounds_weight: 0.0,
            water_weight: 0.0,
            contact_time: 0.0,
            drained_total: 0.0,
            coffee_in_mug: 0.0,
            bed: create_empty_bed(config),
            pours: PourLog::default(),
            clock_running: false,
            result: None,
        }
    }

    fn expect_phase(&self, action: &str, allowed: &[BrewPhase]) -> Result<(), BrewError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(BrewError::WrongPhase {
                action: action.to_string(),
                phase: self.phase,
            })
        }
    }

    // -------------------------------------------------------------------------
    // Dials
    // -------------------------------------------------------------------------

    /// Set the grind size, clamped to 0-100. Only before the brew finishes.
    pub fn set_grind_size(&mut self, size: f32) -> Result<f32, BrewError> {
        self.expect_phase("change grind size", &[BrewPhase::Grind, BrewPhase::Pour])?;
        self.grind_size = require_finite("grind_size", size)?.clamp(0.0, 100.0);
        Ok(self.grind_size)
    }

    /// Set the pour temperature, clamped to the kettle's range.
    pub fn set_temperature(&mut self, celsius: f32, config: &BrewConfig) -> Result<f32, BrewError> {
        self.expect_phase("change temperature", &[BrewPhase::Grind, BrewPhase::Pour])?;
        let limits = &config.limits;
        self.temperature = require_finite("temperature", celsius)?
            .clamp(limits.min_temperature, limits.max_temperature);
        Ok(self.temperature)
    }

    pub fn set_roast(&mut self, roast: Roast) -> Result<(), BrewError> {
        self.expect_phase("change roast", &[BrewPhase::Grind, BrewPhase::Pour])?;
        self.roast = roast;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Grind `grams` more into the dripper, up to the grinder's capacity.
    pub fn grind(&mut self, grams: f32, config: &BrewConfig) -> Result<f32, BrewError> {
        self.expect_phase("grind", &[BrewPhase::Grind])?;
        let grams = require_finite("grams", grams)?.max(0.0);
        self.grounds_weight = (self.grounds_weight + grams).min(config.limits.max_grounds_weight);
        Ok(self.grounds_weight)
    }

    /// Load the grounds into a fresh bed and start the pour phase.
    pub fn start_pour(&mut self, config: &BrewConfig) -> Result<(), BrewError> {
        self.expect_phase("start pouring", &[BrewPhase::Grind])?;
        let need = config.limits.min_grounds_weight;
        if self.grounds_weight < need {
            return Err(BrewError::NotEnoughGrounds {
                have: self.grounds_weight,
                need,
            });
        }

        let mut bed = create_empty_bed(config);
        bed.add_grounds(self.grounds_weight, config);
        self.bed = bed;
        self.pours.clear();
        self.water_weight = 0.0;
        self.contact_time = 0.0;
        self.drained_total = 0.0;
        self.coffee_in_mug = 0.0;
        self.clock_running = false;
        self.phase = BrewPhase::Pour;
        Ok(())
    }

    /// Pour one shot of water at a point on the vessel's top-down view,
    /// normalised to `[0, 1]` on both axes.
    pub fn pour_at(&mut self, norm_x: f32, norm_y: f32, config: &BrewConfig) -> Result<PourEvent, BrewError> {
        self.expect_phase("pour", &[BrewPhase::Pour])?;
        if self.grounds_weight <= 0.0 {
            return Err(BrewError::NoGrounds);
        }
        let hit = map_point_to_cell(norm_x, norm_y, self.bed.geometry())
            .ok_or(BrewError::OutsideVessel)?;

        let amount = config.limits.pour_amount;
        self.bed
            .pour_water(hit.ring, hit.sector, amount, self.temperature)
            .ok_or(BrewError::OutsideVessel)?;
        self.water_weight += amount * config.limits.water_scale;
        self.clock_running = true;

        let (x, y) = hit.planar();
        let event = PourEvent {
            x,
            y,
            ring: hit.ring,
            sector: hit.sector,
            time: self.contact_time,
        };
        self.pours.push(event);
        Ok(event)
    }

    /// Advance the bed by one physics tick. No-op outside the pour phase.
    pub fn tick(&mut self, config: &BrewConfig) -> Option<StepReport> {
        if self.phase != BrewPhase::Pour {
            return None;
        }
        let report = step_bed(&mut self.bed, self.grind_size, config.tick_seconds, config);
        if self.clock_running {
            self.contact_time += config.tick_seconds;
        }
        if report.drained > 0.0 {
            self.drained_total += report.drained * config.limits.water_scale;
            let absorbed = self.grounds_weight * config.substances.absorption_ratio;
            let most_possible = (self.water_weight - absorbed).max(0.0);
            self.coffee_in_mug = (self.drained_total - absorbed).max(0.0).min(most_possible);
        }
        Some(report)
    }

    /// Score the brew and move to the complete phase.
    pub fn finish(&mut self, config: &BrewConfig) -> Result<BrewResult, BrewError> {
        self.expect_phase("finish", &[BrewPhase::Pour])?;
        let need = config.limits.min_water_weight;
        if self.water_weight < need {
            return Err(BrewError::NotEnoughWater {
                have: self.water_weight,
                need,
            });
        }

        let pattern = self.pours.analyze(self.bed.geometry());
        let inputs = BrewInputs {
            temperature: self.temperature,
            grind_size: self.grind_size,
            grounds_weight: self.grounds_weight,
            water_weight: self.water_weight,
            contact_time: self.contact_time,
            roast: self.roast,
        };
        let result = score_brew(&inputs, &self.bed, &pattern);
        self.result = Some(result.clone());
        self.clock_running = false;
        self.phase = BrewPhase::Complete;
        Ok(result)
    }

    /// Discard everything and start over with default settings.
    pub fn reset(&mut self, config: &BrewConfig) {
        *self = Self::new(config);
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Sent once when a brew is scored.
#[derive(Event, Debug, Clone)]
pub struct BrewCompleted {
    pub result: BrewResult,
    pub tick: u64,
}

pub fn brewing_active(session: Res<BrewSession>) -> bool {
    session.phase == BrewPhase::Pour
}

pub fn advance_brew_physics(config: Res<BrewConfig>, mut session: ResMut<BrewSession>) {
    if let Some(report) = session.tick(&config) {
        if report.drained > 0.0 {
            debug!(
                "drained {:.3} units, {:.4}g solids extracted",
                report.drained, report.extracted
            );
        }
    }
}

pub fn log_brew_completion(mut completed: EventReader<BrewCompleted>) {
    for event in completed.read() {
        let result = &event.result;
        info!(
            "brew complete at tick {}: {} (score {}, yield {:.1}%, TDS {:.2}%)",
            event.tick,
            result.quality.label(),
            result.score,
            result.extraction_yield,
            result.tds
        );
        for note in &result.notes {
            info!("  note: {}", note);
        }
    }
}

/// Registers the session, its completion event and the per-tick physics.
pub struct BrewSessionPlugin;

impl Plugin for BrewSessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BrewSession>()
            .add_event::<BrewCompleted>()
            .add_systems(
                FixedUpdate,
                advance_brew_physics
                    .run_if(brewing_active)
                    .in_set(BrewSet::Physics),
            )
            .add_systems(FixedUpdate, log_brew_completion.in_set(BrewSet::Report));
    }
}
