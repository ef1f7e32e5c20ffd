//! Per-tick physics of the coffee bed.
//!
//! One step advances the bed through seven passes in a fixed order, each over
//! the whole grid before the next begins:
//!   1. Absorption: dry grounds soak up free water and become wet grounds
//!   2. Drainage: bottom-layer water leaves the vessel, extracting solids
//!   3. Settling: wet grounds sink, displacing water upward
//!   4. Vertical flow: free water falls or percolates downward
//!   5. Lateral spreading: free water equalises between horizontal neighbours
//!   6. Buoyancy: dry grounds float up through water, displacing it downward
//!   7. Cleanup: clamp to non-negative and zero trace amounts
//!
//! Passes mutate the working bed in place, so within a pass a cell sees the
//! edits already made to cells visited before it.

mod passes;
#[cfg(test)]
mod tests;

pub use passes::{
    absorb_water, cleanup_trace_amounts, drain_bottom_layer, float_dry_grounds,
    flow_water_down, settle_wet_grounds, spread_water_laterally,
};

use serde::{Deserialize, Serialize};

use crate::bed::CoffeeBed;
use crate::config::BrewConfig;

/// What left or changed in the bed during one physics step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Water that exited through the bottom of the vessel (grams).
    pub drained: f32,
    /// Coffee solids dissolved into bottom-layer water (grams).
    pub extracted: f32,
}

/// Advance `bed` by one tick in place.
///
/// `grind_size` is on the 0 (fine) - 100 (coarse) scale. The transfer rates are
/// per tick, calibrated for the host's fixed cadence; `delta_time` advances the
/// bed's simulated clock.
pub fn step_bed(
    bed: &mut CoffeeBed,
    grind_size: f32,
    delta_time: f32,
    config: &BrewConfig,
) -> StepReport {
    absorb_water(bed, config);
    let report = drain_bottom_layer(bed, grind_size, config);
    settle_wet_grounds(bed, config);
    flow_water_down(bed, config);
    for _ in 0..config.rates.lateral_passes {
        spread_water_laterally(bed, config);
    }
    float_dry_grounds(bed, config);
    cleanup_trace_amounts(bed);

    bed.simulated_seconds += delta_time.max(0.0);
    report
}

/// Produce the next generation of `bed` and the water drained this tick.
///
/// The input bed is left untouched.
pub fn simulate_physics_step(
    bed: &CoffeeBed,
    grind_size: f32,
    delta_time: f32,
    config: &BrewConfig,
) -> (CoffeeBed, f32) {
    let mut next = bed.clone();
    let report = step_bed(&mut next, grind_size, delta_time, config);
    (next, report.drained)
}
