//! Ordering of input, physics and reporting within one fixed tick.

use crate::brew_actions::BrewAction;
use crate::config::BrewConfig;
use crate::geometry::ConeGeometry;
use crate::test_harness::TestBrew;

#[test]
fn tick_counter_advances_once_per_tick() {
    let mut brew = TestBrew::new();
    let start = brew.tick_count();
    brew.tick(25);
    assert_eq!(brew.tick_count(), start + 25);
    assert_eq!(brew.observation().tick, start + 25);
}

#[test]
fn physics_is_idle_before_pouring_starts() {
    let mut brew = TestBrew::new();
    brew.act(BrewAction::Grind { grams: 18.0 });
    let bed = brew.session().bed.clone();
    brew.tick(50);
    assert_eq!(brew.session().bed, bed);
    assert_eq!(brew.session().bed.simulated_seconds, 0.0);
}

#[test]
fn brew_clock_waits_for_first_pour() {
    let mut brew = TestBrew::new().with_grounds(18.0);
    brew.tick(10);
    assert_eq!(brew.session().contact_time, 0.0);
    // The bed itself is stepped from the moment pouring starts.
    assert!(brew.session().bed.simulated_seconds > 0.0);

    brew.act(BrewAction::PourAt { x: 0.5, y: 0.5 });
    brew.tick(9);
    let expected = 10.0 * brew.config().tick_seconds;
    assert!((brew.session().contact_time - expected).abs() < 1e-4);
    assert_eq!(brew.observation().brew_time, "0:01");
}

#[test]
fn poured_water_soaks_into_the_grounds() {
    let mut brew = TestBrew::new().with_grounds(18.0);
    brew.act(BrewAction::PourAt { x: 0.5, y: 0.5 });
    assert!((brew.stats().water_in_bed - 0.2).abs() < 1e-3);

    brew.tick(5);
    let stats = brew.stats();
    let free: f32 = stats.layers.iter().map(|l| l.free_water).sum();
    let wet: f32 = stats.layers.iter().map(|l| l.wet_grounds).sum();
    assert!(free < 0.2);
    assert!(wet > 0.0);
}

#[test]
fn stats_reflect_the_seeded_bed() {
    let brew = TestBrew::new().with_grounds(18.0);
    brew.assert_grounds_conserved(0.01);
    assert_eq!(brew.stats().grounds_height, 3);
    assert_eq!(brew.stats().layers.len(), 10);
}

#[test]
fn custom_geometry_is_used_by_the_session() {
    let config = BrewConfig {
        geometry: ConeGeometry::new(3, 6, vec![1, 2, 3, 3]).expect("valid cone"),
        ..Default::default()
    };
    let brew = TestBrew::with_config(config).with_grounds(10.0);
    let geometry = brew.session().bed.geometry();
    assert_eq!(geometry.rings(), 3);
    assert_eq!(geometry.sectors(), 6);
    assert_eq!(brew.stats().layers.len(), 4);
    brew.assert_grounds_conserved(0.01);
}
