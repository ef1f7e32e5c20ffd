use std::fmt::Write as _;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bed::CoffeeBed;
use crate::config::BrewConfig;
use crate::session::BrewSession;
use crate::BrewSet;

/// A column counts toward the content height above these amounts (grams).
const HEIGHT_GROUNDS_THRESHOLD: f32 = 0.01;
const HEIGHT_WATER_THRESHOLD: f32 = 0.1;

/// Totals over the in-cone cells of one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerStats {
    pub dry_grounds: f32,
    pub wet_grounds: f32,
    pub free_water: f32,
    pub cell_count: usize,
    pub active_rings: usize,
}

impl LayerStats {
    pub fn is_empty(&self) -> bool {
        self.dry_grounds < 0.01 && self.wet_grounds < 0.01 && self.free_water < 0.01
    }
}

pub fn layer_stats(bed: &CoffeeBed, height: usize) -> LayerStats {
    let g = bed.geometry();
    if height >= g.layers() {
        return LayerStats::default();
    }
    let active_rings = g.active_rings_at_height(height);
    let mut stats = LayerStats {
        active_rings,
        ..Default::default()
    };
    for r in 0..active_rings {
        for s in 0..g.sectors() {
            if let Some(cell) = bed.get(r, s, height) {
                stats.dry_grounds += cell.dry_grounds;
                stats.wet_grounds += cell.wet_grounds;
                stats.free_water += cell.free_water;
                stats.cell_count += 1;
            }
        }
    }
    stats
}

/// Free water plus the water held in wet grounds (grams).
pub fn water_in_bed(bed: &CoffeeBed, config: &BrewConfig) -> f32 {
    bed.sum_by(|c| c.total_water(&config.substances))
}

/// Dry grounds plus the grounds share of wet grounds (grams).
pub fn grounds_in_bed(bed: &CoffeeBed, config: &BrewConfig) -> f32 {
    bed.sum_by(|c| c.total_grounds(&config.substances))
}

/// Highest filled layer over all columns, as a count of layers (0 for an empty bed).
pub fn grounds_height(bed: &CoffeeBed) -> usize {
    let g = bed.geometry();
    let mut max_height = 0;
    for r in 0..g.rings() {
        for s in 0..g.sectors() {
            let Some(column) = bed.column(r, s) else {
                continue;
            };
            let top = column.iter().rposition(|c| {
                c.dry_grounds > HEIGHT_GROUNDS_THRESHOLD
                    || c.wet_grounds > HEIGHT_GROUNDS_THRESHOLD
                    || c.free_water > HEIGHT_WATER_THRESHOLD
            });
            if let Some(h) = top {
                max_height = max_height.max(h + 1);
            }
        }
    }
    max_height
}

pub fn total_extracted(bed: &CoffeeBed) -> f32 {
    bed.sum_by(|c| c.extracted_solids)
}

// =============================================================================
// BedStats resource
// =============================================================================

/// Aggregates of the current bed, refreshed once per fixed tick.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BedStats {
    pub water_in_bed: f32,
    pub grounds_in_bed: f32,
    pub grounds_height: usize,
    pub total_extracted: f32,
    pub layers: Vec<LayerStats>,
}

impl BedStats {
    pub fn compute(bed: &CoffeeBed, config: &BrewConfig) -> Self {
        Self {
            water_in_bed: water_in_bed(bed, config),
            grounds_in_bed: grounds_in_bed(bed, config),
            grounds_height: grounds_height(bed),
            total_extracted: total_extracted(bed),
            layers: (0..bed.geometry().layers())
                .map(|h| layer_stats(bed, h))
                .collect(),
        }
    }
}

pub fn refresh_bed_stats(
    session: Res<BrewSession>,
    config: Res<BrewConfig>,
    mut stats: ResMut<BedStats>,
) {
    *stats = BedStats::compute(&session.bed, &config);
}

pub struct StatsPlugin;

impl Plugin for StatsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BedStats>()
            .add_systems(FixedUpdate, refresh_bed_stats.in_set(BrewSet::Report));
    }
}

// =============================================================================
// Text output
// =============================================================================

/// `m:ss`, rounding down to the whole second.
pub fn format_brew_time(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Plain-text snapshot of a session for bug reports.
pub fn debug_report(session: &BrewSession, config: &BrewConfig) -> String {
    let bed = &session.bed;
    let layers = bed.geometry().layers();
    let rings = bed.geometry().rings();
    let mut out = String::new();

    let _ = writeln!(out, "Pour-Over Simulator Debug Data");
    let _ = writeln!(out, "========================================");
    let _ = writeln!(out, "Phase: {}", session.phase.label());
    let _ = writeln!(
        out,
        "Grounds: {:.1}g (grind size: {})",
        session.grounds_weight, session.grind_size
    );
    let _ = writeln!(out, "Water poured: {:.0}g", session.water_weight);
    let _ = writeln!(out, "Time: {}", format_brew_time(session.contact_time));
    let _ = writeln!(out, "Temperature: {}°C", session.temperature);
    let _ = writeln!(out, "Drained coffee: {:.0}g", session.coffee_in_mug);
    let _ = writeln!(out, "WaterInBed metric: {:.2}g", water_in_bed(bed, config));
    let _ = writeln!(out, "Content height: {} / {}", grounds_height(bed), layers);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Sample Columns (height 0=bottom, {}=top):",
        layers.saturating_sub(1)
    );

    for (ring, label) in [(0, "Center"), (2.min(rings - 1), "Mid-ring")] {
        let Some(column) = bed.column(ring, 0) else {
            continue;
        };
        let _ = writeln!(out, "{label} (ring:{ring} sector:0):");
        for (h, cell) in column.iter().enumerate() {
            let _ = write!(
                out,
                "  H{h}: DryG:{:.2}g WetG:{:.2}g FreeW:{:.2}g",
                cell.dry_grounds, cell.wet_grounds, cell.free_water
            );
            if cell.extracted_solids > 0.0 {
                let _ = write!(out, " Extract:{:.3}", cell.extracted_solids);
            }
            let _ = writeln!(out);
        }
        let dry: f32 = column.iter().map(|c| c.dry_grounds).sum();
        let wet: f32 = column.iter().map(|c| c.wet_grounds).sum();
        let free: f32 = column.iter().map(|c| c.free_water).sum();
        let _ = writeln!(out, "  Total dry: {dry:.2}g");
        let _ = writeln!(out, "  Total wet: {wet:.2}g");
        let _ = writeln!(out, "  Total water: {free:.2}g");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Layer Summary:");
    for h in 0..layers {
        let stats = layer_stats(bed, h);
        if stats.is_empty() {
            continue;
        }
        let _ = writeln!(
            out,
            "H{h}: DryG:{:.2}g WetG:{:.2}g FreeW:{:.2}g ({} cells)",
            stats.dry_grounds, stats.wet_grounds, stats.free_water, stats.cell_count
        );
    }

    out
}
