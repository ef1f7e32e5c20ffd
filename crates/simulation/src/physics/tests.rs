use super::*;
use crate::bed::{add_grounds_to_bed, create_empty_bed};
use crate::config::{BrewConfig, CLEANUP_EPSILON};

fn config() -> BrewConfig {
    BrewConfig::default()
}

fn bed_mass(bed: &CoffeeBed) -> f32 {
    bed.sum_by(|c| c.total_mass())
}

fn seeded_with_pour(grounds: f32, water: f32) -> (CoffeeBed, BrewConfig) {
    let config = config();
    let mut bed = add_grounds_to_bed(&create_empty_bed(&config), grounds, &config);
    bed.pour_water(0, 0, water, 92.0).expect("pour accepted");
    (bed, config)
}

fn assert_non_negative(bed: &CoffeeBed) {
    for cell in bed.cells() {
        assert!(cell.dry_grounds >= 0.0, "negative dry: {cell:?}");
        assert!(cell.wet_grounds >= 0.0, "negative wet: {cell:?}");
        assert!(cell.free_water >= 0.0, "negative water: {cell:?}");
        assert!(cell.extracted_solids >= 0.0, "negative solids: {cell:?}");
    }
}

fn assert_outside_cone_empty(bed: &CoffeeBed) {
    let g = bed.geometry();
    for r in 0..g.rings() {
        for s in 0..g.sectors() {
            for h in 0..g.layers() {
                if !g.is_cell_in_cone(r, h) {
                    let cell = bed.get(r, s, h).unwrap();
                    assert!(cell.is_empty(), "mass outside cone at ({r},{s},{h}): {cell:?}");
                }
            }
        }
    }
}

// -------------------------------------------------------------------------
// Individual passes
// -------------------------------------------------------------------------

#[test]
fn test_absorption_converts_dry_to_wet() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    {
        let cell = bed.get_mut(0, 0, 0).unwrap();
        cell.dry_grounds = 0.8;
        cell.free_water = 1.0;
    }
    let before = *bed.get(0, 0, 0).unwrap();

    absorb_water(&mut bed, &config);

    let after = *bed.get(0, 0, 0).unwrap();
    assert!(after.dry_grounds < before.dry_grounds);
    assert!(after.wet_grounds > before.wet_grounds);
    // Water-limited: 1.0 g of water saturates 0.5 g of grounds.
    assert!((after.dry_grounds - 0.3).abs() < 1e-6);
    assert!((after.wet_grounds - 1.5).abs() < 1e-6);
    assert!(after.free_water.abs() < 1e-6);
    assert!((after.total_mass() - before.total_mass()).abs() < 1e-6);
}

#[test]
fn test_absorption_skips_trace_water() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    {
        let cell = bed.get_mut(0, 0, 0).unwrap();
        cell.dry_grounds = 0.8;
        cell.free_water = 0.005;
    }
    absorb_water(&mut bed, &config);
    let cell = bed.get(0, 0, 0).unwrap();
    assert_eq!(cell.dry_grounds, 0.8);
    assert_eq!(cell.wet_grounds, 0.0);
}

#[test]
fn test_drainage_scales_with_grind() {
    let config = config();
    let mut fine = create_empty_bed(&config);
    fine.pour_water(0, 0, 5.0, 92.0).unwrap();
    let mut coarse = fine.clone();

    let fine_report = drain_bottom_layer(&mut fine, 0.0, &config);
    let coarse_report = drain_bottom_layer(&mut coarse, 100.0, &config);

    assert!((fine_report.drained - 0.18).abs() < 1e-5);
    assert!((coarse_report.drained - 0.6).abs() < 1e-5);
    // No grounds, no extraction.
    assert_eq!(fine_report.extracted, 0.0);
}

#[test]
fn test_drainage_extracts_from_hot_grounds_only() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    for (sector, temperature) in [(0, 92.0), (1, config.ambient_temperature)] {
        let cell = bed.get_mut(0, sector, 0).unwrap();
        cell.wet_grounds = 1.5;
        cell.free_water = 2.0;
        cell.temperature = temperature;
    }

    let report = drain_bottom_layer(&mut bed, 50.0, &config);

    // eff = 0.078 * (1 - 0.3 * 1.5 / 3) = 0.0663 per cell, both cells drain.
    let out = 2.0 * 0.078 * 0.85;
    assert!((report.drained - 2.0 * out).abs() < 1e-5);
    let hot = bed.get(0, 0, 0).unwrap();
    let expected = 0.02 * (out / 10.0);
    assert!((hot.extracted_solids - expected).abs() < 1e-7);
    assert!((report.extracted - expected).abs() < 1e-7);
    assert_eq!(bed.get(0, 1, 0).unwrap().extracted_solids, 0.0);
}

#[test]
fn test_settling_moves_wet_grounds_down() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    bed.get_mut(0, 0, 5).unwrap().wet_grounds = 2.0;

    settle_wet_grounds(&mut bed, &config);

    assert!((bed.get(0, 0, 5).unwrap().wet_grounds - 1.84).abs() < 1e-5);
    // Layer 4 passes 8% of what it just received on to layer 3 in the same sweep.
    assert!((bed.get(0, 0, 4).unwrap().wet_grounds - 0.1472).abs() < 1e-5);
    assert!((bed.get(0, 0, 3).unwrap().wet_grounds - 0.0128).abs() < 1e-5);
    let column_wet: f32 = bed.column(0, 0).unwrap().iter().map(|c| c.wet_grounds).sum();
    assert!((column_wet - 2.0).abs() < 1e-5);
}

#[test]
fn test_settling_displaces_water_upward() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    bed.get_mut(0, 0, 5).unwrap().wet_grounds = 2.0;
    bed.get_mut(0, 0, 4).unwrap().free_water = 1.0;

    settle_wet_grounds(&mut bed, &config);

    // 0.16 g of wet grounds displaces 0.16 / 1.2 g of water.
    let displaced = 0.16 / 1.2;
    assert!((bed.get(0, 0, 4).unwrap().free_water - (1.0 - displaced)).abs() < 1e-5);
    assert!((bed.get(0, 0, 5).unwrap().free_water - displaced).abs() < 1e-5);
}

#[test]
fn test_flow_falls_freely_and_carries_heat() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    {
        let cell = bed.get_mut(0, 0, 5).unwrap();
        cell.free_water = 1.0;
        cell.temperature = 90.0;
    }

    flow_water_down(&mut bed, &config);

    // The water cascades: 0.95 lands on layer 4, then 95% of that keeps going.
    let layer5 = bed.get(0, 0, 5).unwrap();
    assert!((layer5.free_water - 0.05).abs() < 1e-5);
    let layer4 = bed.get(0, 0, 4).unwrap();
    assert!((layer4.temperature - 88.2).abs() < 1e-4);
    let column_water: f32 = bed.column(0, 0).unwrap().iter().map(|c| c.free_water).sum();
    assert!((column_water - 1.0).abs() < 1e-5);
}

#[test]
fn test_flow_percolates_slower_through_grounds() {
    let config = config();
    let mut open = create_empty_bed(&config);
    open.get_mut(0, 0, 1).unwrap().free_water = 1.0;
    let mut packed = open.clone();
    packed.get_mut(0, 0, 0).unwrap().wet_grounds = 1.5;

    flow_water_down(&mut open, &config);
    flow_water_down(&mut packed, &config);

    let open_flow = open.get(0, 0, 0).unwrap().free_water;
    let packed_flow = packed.get(0, 0, 0).unwrap().free_water;
    assert!((open_flow - 0.95).abs() < 1e-5);
    // 0.7 * max(0.3, 1 - 1.5 / 3) = 0.35
    assert!((packed_flow - 0.35).abs() < 1e-5);
}

#[test]
fn test_flow_respects_capacity_below() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    bed.get_mut(0, 0, 1).unwrap().free_water = 2.0;
    bed.get_mut(0, 0, 0).unwrap().free_water = 2.5;

    flow_water_down(&mut bed, &config);

    assert!((bed.get(0, 0, 0).unwrap().total_mass() - config.cell_capacity).abs() < 1e-5);
    assert!((bed.get(0, 0, 1).unwrap().free_water - 1.5).abs() < 1e-5);
}

#[test]
fn test_lateral_spreading_feeds_drier_neighbours() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    bed.get_mut(0, 0, 0).unwrap().free_water = 1.0;

    spread_water_laterally(&mut bed, &config);

    let source = bed.get(0, 0, 0).unwrap().free_water;
    assert!(source < 1.0);
    assert!(bed.get(0, 7, 0).unwrap().free_water > 0.0);
    assert!(bed.get(0, 1, 0).unwrap().free_water > 0.0);
    let layer_water: f32 = (0..8).map(|s| bed.get(0, s, 0).unwrap().free_water).sum();
    assert!((layer_water - 1.0).abs() < 1e-5);
    assert_outside_cone_empty(&bed);
}

#[test]
fn test_lateral_spreading_ignores_small_differences() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    for s in 0..8 {
        bed.get_mut(0, s, 0).unwrap().free_water = 0.5;
    }
    bed.get_mut(0, 0, 0).unwrap().free_water = 0.54;
    let before = bed.clone();

    spread_water_laterally(&mut bed, &config);

    assert_eq!(bed, before);
}

#[test]
fn test_buoyancy_lifts_dry_grounds_in_water() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    {
        let cell = bed.get_mut(0, 0, 0).unwrap();
        cell.dry_grounds = 0.8;
        cell.free_water = 0.5;
    }
    bed.get_mut(0, 0, 1).unwrap().free_water = 1.0;

    float_dry_grounds(&mut bed, &config);

    let below = bed.get(0, 0, 0).unwrap();
    let above = bed.get(0, 0, 1).unwrap();
    assert!((below.dry_grounds - 0.76).abs() < 1e-5);
    assert!((above.dry_grounds - 0.04).abs() < 1e-5);
    // The floating grounds push 0.04 g of water down.
    assert!((below.free_water - 0.54).abs() < 1e-5);
    assert!((above.free_water - 0.96).abs() < 1e-5);
}

#[test]
fn test_buoyancy_needs_standing_water() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    bed.get_mut(0, 0, 0).unwrap().dry_grounds = 0.8;
    let before = bed.clone();
    float_dry_grounds(&mut bed, &config);
    assert_eq!(bed, before);
}

#[test]
fn test_cleanup_clamps_and_zeroes_traces() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    {
        let cell = bed.get_mut(0, 0, 0).unwrap();
        cell.dry_grounds = -0.2;
        cell.wet_grounds = CLEANUP_EPSILON / 2.0;
        cell.free_water = 0.5;
        cell.extracted_solids = -1.0;
    }

    cleanup_trace_amounts(&mut bed);

    let cell = bed.get(0, 0, 0).unwrap();
    assert_eq!(cell.dry_grounds, 0.0);
    assert_eq!(cell.wet_grounds, 0.0);
    assert_eq!(cell.free_water, 0.5);
    assert_eq!(cell.extracted_solids, 0.0);
}

// -------------------------------------------------------------------------
// Whole step
// -------------------------------------------------------------------------

#[test]
fn test_empty_bed_stays_empty() {
    let config = config();
    let bed = create_empty_bed(&config);
    let (next, drained) = simulate_physics_step(&bed, 50.0, 0.15, &config);
    assert_eq!(drained, 0.0);
    assert_eq!(next.cells(), bed.cells());
}

#[test]
fn test_simulate_leaves_input_untouched() {
    let (bed, config) = seeded_with_pour(18.0, 5.0);
    let snapshot = bed.clone();
    let (next, _) = simulate_physics_step(&bed, 50.0, 0.15, &config);
    assert_eq!(bed, snapshot);
    assert_ne!(next.cells(), snapshot.cells());
    assert!((next.simulated_seconds - 0.15).abs() < 1e-6);
}

#[test]
fn test_water_poured_on_empty_bed_drains() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    bed.pour_water(0, 0, 5.0, 92.0).unwrap();
    let report = step_bed(&mut bed, 50.0, 0.15, &config);
    assert!(report.drained > 0.0);
    assert!((report.drained - 5.0 * 0.078).abs() < 1e-5);
}

#[test]
fn test_step_keeps_mass_non_negative_and_inside_cone() {
    let (mut bed, config) = seeded_with_pour(30.0, 10.0);
    for tick in 0..400 {
        if tick % 10 == 0 && tick < 200 {
            let sector = (tick / 10) % 8;
            let _ = bed.pour_water(tick % 4, sector, 1.0, 95.0);
        }
        step_bed(&mut bed, 35.0, 0.15, &config);
        assert_non_negative(&bed);
    }
    assert_outside_cone_empty(&bed);
}

#[test]
fn test_each_step_conserves_mass_up_to_cleanup() {
    let (mut bed, config) = seeded_with_pour(18.0, 20.0);
    // Cleanup may zero at most one trace per field per cell.
    let cleanup_bound = 3.0 * CLEANUP_EPSILON * bed.cells().len() as f32;
    for _ in 0..200 {
        let before = bed_mass(&bed);
        let report = step_bed(&mut bed, 50.0, 0.15, &config);
        let after = bed_mass(&bed) + report.drained;
        assert!(
            after <= before + 5e-3,
            "mass created: before {before}, after {after}"
        );
        assert!(
            before - after <= cleanup_bound + 5e-3,
            "mass lost: before {before}, after {after}"
        );
    }
}

// The 18 g bed never drains down to 0.5 g of free water after a 20 g pour:
// the grounds absorb most of it and the rest stays perched on cells already
// at capacity. So this runs a fixed number of ticks and checks conservation.
#[test]
fn test_single_pour_then_drain_holds_water_in_the_bed() {
    let (mut bed, config) = seeded_with_pour(18.0, 20.0);
    let s = &config.substances;
    let mut drained = 0.0;
    for _ in 0..300 {
        drained += step_bed(&mut bed, 50.0, 0.15, &config).drained;
    }

    let water: f32 = bed.sum_by(|c| c.total_water(s));
    let grounds: f32 = bed.sum_by(|c| c.total_grounds(s));
    assert!((water + drained - 20.0).abs() < 0.5, "water {water} + drained {drained}");
    assert!((grounds - 18.0).abs() < 0.25, "grounds {grounds}");
    // The grounds soak up most of the pour, so far less than the pour drains.
    assert!(drained < 20.0);
    assert!(bed.sum_by(|c| c.wet_grounds) > 0.0);
}

#[test]
fn test_step_is_deterministic() {
    let (start, config) = seeded_with_pour(22.0, 12.0);
    let mut a = start.clone();
    let mut b = start;
    for _ in 0..150 {
        let ra = step_bed(&mut a, 40.0, 0.15, &config);
        let rb = step_bed(&mut b, 40.0, 0.15, &config);
        assert_eq!(ra, rb);
    }
    assert_eq!(a, b);
}

#[test]
fn test_negative_delta_time_does_not_rewind_clock() {
    let config = config();
    let mut bed = create_empty_bed(&config);
    step_bed(&mut bed, 50.0, -1.0, &config);
    assert_eq!(bed.simulated_seconds, 0.0);
}

#[test]
fn test_full_strength_rates_never_overdraw_a_cell() {
    let mut config = config();
    let rates = &mut config.rates;
    rates.absorption_fraction = 1.0;
    rates.base_drain_rate = 1.0;
    rates.fine_grind_drain_floor = 1.0;
    rates.percolation_rate = 1.0;
    rates.free_fall_rate = 1.0;
    rates.lateral_rate = 1.0;
    rates.settle_rate = 1.0;
    rates.float_rate = 1.0;
    rates.max_extraction_fraction = 1.0;
    assert!(config.validate().is_ok());

    let mut bed = add_grounds_to_bed(&create_empty_bed(&config), 18.0, &config);
    bed.pour_water(0, 0, 5.0, 92.0).expect("pour accepted");
    let mut poured = 5.0;
    let mut drained = 0.0;
    for tick in 0..200 {
        if tick % 10 == 0 {
            bed.pour_water(tick % 4, tick % 8, 1.0, 92.0).expect("pour accepted");
            poured += 1.0;
        }
        let report = step_bed(&mut bed, 100.0, 0.15, &config);
        assert!(report.drained >= 0.0);
        drained += report.drained;
        assert_non_negative(&bed);
    }
    assert!(drained <= poured + 1e-3, "drained {drained} of {poured}");
}
