//! The individual physics passes, in execution order.
//!
//! Each pass sweeps the whole grid and edits cells in place. Vertical passes
//! only pair cells in rings that exist at both heights, so nothing ever moves
//! into a cell outside the cone.

use super::StepReport;
use crate::bed::CoffeeBed;
use crate::config::{BrewConfig, CLEANUP_EPSILON};

/// Dry grounds below this do not absorb (grams).
const ABSORB_MIN_DRY: f32 = 0.005;
/// Smallest absorption applied in one cell (grams of dry grounds).
const ABSORB_MIN_GROUNDS: f32 = 0.001;
/// Smallest amount moved by any transfer, and the "has water" floor.
const MIN_TRANSFER: f32 = 0.01;
/// Bottom cells with less grounds than this extract nothing (grams).
const EXTRACT_MIN_GROUNDS: f32 = 0.1;
/// Drained grams per unit of extraction rate.
const EXTRACT_DRAIN_SCALE: f32 = 10.0;
/// Share of the space below that settling grounds may take per tick.
const SETTLE_SPACE_SHARE: f32 = 0.3;
/// Grounds below which water falls freely instead of percolating (grams).
const PERCOLATION_GROUNDS: f32 = 0.3;
/// Lowest porosity factor of a packed cell.
const MIN_POROSITY: f32 = 0.3;
/// Share of its temperature falling water keeps.
const FLOW_HEAT_RETENTION: f32 = 0.98;
/// Cells need this much free water to spread or float grounds (grams).
const STANDING_WATER: f32 = 0.1;
/// Free-water difference below which neighbours are left alone (grams).
const LATERAL_MIN_DIFF: f32 = 0.05;
/// Share of a neighbour's free space lateral flow may fill.
const LATERAL_SPACE_SHARE: f32 = 0.5;
/// Share of a cell's free water it may give to one neighbour.
const LATERAL_SOURCE_SHARE: f32 = 0.3;
/// Share of the space above floating grounds may take per tick.
const FLOAT_SPACE_SHARE: f32 = 0.3;
/// Share of the water above that floating grounds push down.
const FLOAT_DISPLACE_SHARE: f32 = 0.5;

// =============================================================================
// 1. Absorption
// =============================================================================

/// Dry grounds soak up free water in their own cell and become wet grounds.
///
/// One gram of dry grounds takes `absorption_ratio` grams of water and turns
/// into `1 + absorption_ratio` grams of wet grounds, so cell mass is unchanged.
pub fn absorb_water(bed: &mut CoffeeBed, config: &BrewConfig) {
    let ratio = config.substances.absorption_ratio;
    let fraction = config.rates.absorption_fraction;
    let (geometry, cells) = bed.parts_mut();

    for h in 0..geometry.layers() {
        for r in 0..geometry.active_rings_at_height(h) {
            for s in 0..geometry.sectors() {
                let cell = &mut cells[geometry.index(r, s, h)];
                if cell.dry_grounds <= ABSORB_MIN_DRY || cell.free_water <= MIN_TRANSFER {
                    continue;
                }
                let grounds = (cell.dry_grounds * fraction).min(cell.free_water / ratio);
                if grounds > ABSORB_MIN_GROUNDS {
                    cell.dry_grounds -= grounds;
                    cell.free_water -= grounds * ratio;
                    cell.wet_grounds += grounds * (1.0 + ratio);
                }
            }
        }
    }
}

// =============================================================================
// 2. Drainage
// =============================================================================

/// Free water in the bottom layer leaves the vessel, carrying dissolved solids.
///
/// Grounds in the cell partially block the filter. Hot water passing through
/// grounds extracts solids in proportion to the amount drained.
pub fn drain_bottom_layer(bed: &mut CoffeeBed, grind_size: f32, config: &BrewConfig) -> StepReport {
    let rates = &config.rates;
    let drain_rate = rates.drain_rate_for_grind(grind_size);
    let capacity = config.cell_capacity;
    let ambient = config.ambient_temperature;
    let mut report = StepReport::default();
    let (geometry, cells) = bed.parts_mut();

    for r in 0..geometry.active_rings_at_height(0) {
        for s in 0..geometry.sectors() {
            let cell = &mut cells[geometry.index(r, s, 0)];
            if cell.free_water <= MIN_TRANSFER {
                continue;
            }

            let blocked = rates.grounds_drain_blockage * cell.grounds_mass() / capacity;
            let effective = (drain_rate * (1.0 - blocked)).max(0.0);
            let out = cell.free_water * effective;
            cell.free_water -= out;
            report.drained += out;

            let grounds = cell.total_grounds(&config.substances);
            if grounds > EXTRACT_MIN_GROUNDS && cell.temperature > ambient {
                let temp_factor = cell.temperature / rates.extraction_reference_temp;
                let extracted = (rates.extraction_rate * temp_factor * (out / EXTRACT_DRAIN_SCALE))
                    .min(grounds * rates.max_extraction_fraction);
                cell.extracted_solids += extracted;
                report.extracted += extracted;
            }
        }
    }

    report
}

// =============================================================================
// 3. Gravity settling
// =============================================================================

/// Saturated grounds sink into free space below, pushing water up in exchange.
pub fn settle_wet_grounds(bed: &mut CoffeeBed, config: &BrewConfig) {
    let capacity = config.cell_capacity;
    let settle_rate = config.rates.settle_rate;
    let wet_density = config.substances.wet_grounds_density;
    let (geometry, cells) = bed.parts_mut();

    for h in (1..geometry.layers()).rev() {
        for r in 0..geometry.shared_rings(h, h - 1) {
            for s in 0..geometry.sectors() {
                let above = geometry.index(r, s, h);
                let below = geometry.index(r, s, h - 1);

                let above_wet = cells[above].wet_grounds;
                if above_wet <= MIN_TRANSFER {
                    continue;
                }
                let space_below = cells[below].spare_capacity(capacity);
                if space_below <= MIN_TRANSFER {
                    continue;
                }

                let sink = (above_wet * settle_rate).min(space_below * SETTLE_SPACE_SHARE);
                if sink <= MIN_TRANSFER {
                    continue;
                }
                cells[above].wet_grounds -= sink;
                cells[below].wet_grounds += sink;

                let displaced = (sink / wet_density).min(cells[below].free_water);
                if displaced > MIN_TRANSFER {
                    cells[below].free_water -= displaced;
                    cells[above].free_water += displaced;
                }
            }
        }
    }
}

// =============================================================================
// 4. Vertical flow
// =============================================================================

/// Free water falls into the cell below: quickly through open space, slower
/// through a packed bed.
pub fn flow_water_down(bed: &mut CoffeeBed, config: &BrewConfig) {
    let capacity = config.cell_capacity;
    let rates = &config.rates;
    let (geometry, cells) = bed.parts_mut();

    for h in (1..geometry.layers()).rev() {
        for r in 0..geometry.shared_rings(h, h - 1) {
            for s in 0..geometry.sectors() {
                let above = geometry.index(r, s, h);
                let below = geometry.index(r, s, h - 1);

                let free = cells[above].free_water;
                if free <= MIN_TRANSFER {
                    continue;
                }

                let grounds_below = cells[below].grounds_mass();
                let rate = if grounds_below > PERCOLATION_GROUNDS {
                    rates.percolation_rate * (1.0 - grounds_below / capacity).max(MIN_POROSITY)
                } else {
                    rates.free_fall_rate
                };
                let flow = (free * rate).min(cells[below].spare_capacity(capacity));
                if flow <= MIN_TRANSFER {
                    continue;
                }

                let carried_heat = cells[above].temperature * FLOW_HEAT_RETENTION;
                cells[above].free_water -= flow;
                cells[below].free_water += flow;
                cells[below].temperature = cells[below].temperature.max(carried_heat);
            }
        }
    }
}

// =============================================================================
// 5. Lateral spreading
// =============================================================================

/// One sweep of free water equalising toward drier horizontal neighbours.
pub fn spread_water_laterally(bed: &mut CoffeeBed, config: &BrewConfig) {
    let capacity = config.cell_capacity;
    let lateral_rate = config.rates.lateral_rate;
    let (geometry, cells) = bed.parts_mut();

    for h in 0..geometry.layers() {
        for r in 0..geometry.active_rings_at_height(h) {
            for s in 0..geometry.sectors() {
                let idx = geometry.index(r, s, h);
                if cells[idx].free_water <= STANDING_WATER {
                    continue;
                }

                let (neighbors, count) = geometry.lateral_neighbors(r, s, h);
                for &(nr, ns) in &neighbors[..count] {
                    let n_idx = geometry.index(nr, ns, h);
                    let diff = cells[idx].free_water - cells[n_idx].free_water;
                    if diff <= LATERAL_MIN_DIFF {
                        continue;
                    }

                    let flow = (diff * lateral_rate)
                        .min(cells[n_idx].spare_capacity(capacity) * LATERAL_SPACE_SHARE)
                        .min(cells[idx].free_water * LATERAL_SOURCE_SHARE);
                    if flow <= MIN_TRANSFER {
                        continue;
                    }

                    cells[idx].free_water -= flow;
                    cells[n_idx].free_water += flow;
                    cells[n_idx].temperature =
                        (cells[n_idx].temperature + cells[idx].temperature) / 2.0;
                }
            }
        }
    }
}

// =============================================================================
// 6. Buoyancy
// =============================================================================

/// Dry grounds sitting in standing water float up a layer, pushing water down.
pub fn float_dry_grounds(bed: &mut CoffeeBed, config: &BrewConfig) {
    let capacity = config.cell_capacity;
    let float_rate = config.rates.float_rate;
    let (geometry, cells) = bed.parts_mut();

    for h in 0..geometry.layers().saturating_sub(1) {
        for r in 0..geometry.shared_rings(h, h + 1) {
            for s in 0..geometry.sectors() {
                let below = geometry.index(r, s, h);
                let above = geometry.index(r, s, h + 1);

                if cells[below].dry_grounds <= MIN_TRANSFER
                    || cells[below].free_water <= STANDING_WATER
                {
                    continue;
                }

                let float = (cells[below].dry_grounds * float_rate)
                    .min(cells[above].spare_capacity(capacity) * FLOAT_SPACE_SHARE);
                if float <= MIN_TRANSFER {
                    continue;
                }
                cells[below].dry_grounds -= float;
                cells[above].dry_grounds += float;

                let displaced = float.min(cells[above].free_water * FLOAT_DISPLACE_SHARE);
                if displaced > MIN_TRANSFER {
                    cells[above].free_water -= displaced;
                    cells[below].free_water += displaced;
                }
            }
        }
    }
}

// =============================================================================
// 7. Cleanup
// =============================================================================

/// Clamp every mass field to non-negative and zero trace amounts.
pub fn cleanup_trace_amounts(bed: &mut CoffeeBed) {
    let (_, cells) = bed.parts_mut();
    for cell in cells.iter_mut() {
        cell.dry_grounds = zero_trace(cell.dry_grounds);
        cell.wet_grounds = zero_trace(cell.wet_grounds);
        cell.free_water = zero_trace(cell.free_water);
        cell.extracted_solids = cell.extracted_solids.max(0.0);
    }
}

#[inline]
fn zero_trace(value: f32) -> f32 {
    let value = value.max(0.0);
    if value < CLEANUP_EPSILON {
        0.0
    } else {
        value
    }
}
