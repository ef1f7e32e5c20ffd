//! Builds a `BrewObservation` snapshot from ECS resources each tick.
//!
//! Runs in `BrewSet::Report` after the bed stats refresh, so the snapshot
//! reflects this tick's actions and physics.

use bevy::prelude::*;

use crate::brew_actions::{ActionResult, ActionResultLog};
use crate::brew_observation::{ActionResultEntry, BedSnapshot, BrewObservation, BrewWarning};
use crate::session::{BrewPhase, BrewSession};
use crate::stats::{format_brew_time, BedStats};
use crate::TickCounter;

/// Free water (bed units) above which the bed counts as pooling.
const POOLING_THRESHOLD: f32 = 12.0;
const COLD_WATER: f32 = 85.0;
const HOT_WATER: f32 = 96.0;
const FINE_GRIND: f32 = 20.0;
const LONG_BREW_SECONDS: f32 = 300.0;
const RECENT_RESULTS: usize = 10;

/// The most recent brew observation, updated every tick in `BrewSet::Report`.
#[derive(Resource, Default, Debug, Clone)]
pub struct CurrentObservation {
    pub observation: BrewObservation,
}

pub fn build_observation(
    tick_counter: Res<TickCounter>,
    session: Res<BrewSession>,
    stats: Res<BedStats>,
    action_log: Res<ActionResultLog>,
    mut current: ResMut<CurrentObservation>,
) {
    current.observation = observe(tick_counter.0, &session, &stats, &action_log);
}

pub fn observe(
    tick: u64,
    session: &BrewSession,
    stats: &BedStats,
    action_log: &ActionResultLog,
) -> BrewObservation {
    let free_water = stats.layers.iter().map(|l| l.free_water).sum();
    let bed = BedSnapshot {
        water_in_bed: stats.water_in_bed,
        grounds_in_bed: stats.grounds_in_bed,
        free_water,
        total_extracted: stats.total_extracted,
        content_height: stats.grounds_height,
        layers: session.bed.geometry().layers(),
    };

    let recent_action_results = action_log
        .last_n(RECENT_RESULTS)
        .iter()
        .map(|(action, result)| ActionResultEntry {
            action: action.name().to_string(),
            success: result.is_success(),
            message: match result {
                ActionResult::Success => None,
                ActionResult::SuccessWithWarning(w) => Some(w.clone()),
                ActionResult::Error(e) => Some(e.to_string()),
            },
        })
        .collect();

    BrewObservation {
        tick,
        phase: session.phase,
        contact_time: session.contact_time,
        brew_time: format_brew_time(session.contact_time),
        grind_size: session.grind_size,
        temperature: session.temperature,
        roast: session.roast,
        grounds_weight: session.grounds_weight,
        water_weight: session.water_weight,
        coffee_in_mug: session.coffee_in_mug,
        pour_count: session.pours.len(),
        warnings: compute_warnings(session, &bed),
        bed,
        recent_action_results,
        result: session.result.clone(),
    }
}

fn compute_warnings(session: &BrewSession, bed: &BedSnapshot) -> Vec<BrewWarning> {
    let mut warnings = Vec::new();

    if session.temperature < COLD_WATER {
        warnings.push(BrewWarning::WaterTooCold);
    } else if session.temperature > HOT_WATER {
        warnings.push(BrewWarning::WaterTooHot);
    }
    if session.grind_size < FINE_GRIND {
        warnings.push(BrewWarning::GrindTooFine);
    }

    if session.phase == BrewPhase::Pour {
        if bed.free_water > POOLING_THRESHOLD {
            warnings.push(BrewWarning::Pooling);
        }
        if bed.layers > 0 && bed.content_height >= bed.layers {
            warnings.push(BrewWarning::Overflowing);
        }
        if session.contact_time > LONG_BREW_SECONDS {
            warnings.push(BrewWarning::LongBrew);
        }
    }

    warnings
}
