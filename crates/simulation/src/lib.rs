use bevy::prelude::*;

pub mod agent_protocol;
pub mod bed;
pub mod brew_actions;
pub mod brew_observation;
pub mod cell;
pub mod config;
pub mod extraction;
pub mod geometry;
pub mod observation_builder;
pub mod observation_plugin;
pub mod pattern;
pub mod physics;
pub mod pour_script;
pub mod session;
pub mod sim_rng;
pub mod simulation_sets;
pub mod stats;
pub mod vessel;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use bed::{add_grounds_to_bed, create_empty_bed, pour_water_into_cell, CoffeeBed};
pub use cell::CellContents;
pub use config::BrewConfig;
pub use extraction::{calculate_extraction, BrewResult, Quality, Roast};
pub use geometry::{ConeGeometry, ConfigError};
pub use pattern::{analyze_pour_pattern, PourEvent, PourPattern};
pub use physics::simulate_physics_step;
pub use session::{BrewPhase, BrewSession};
pub use simulation_sets::BrewSet;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Fixed ticks since startup. Stamped on queued actions and completion events.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickCounter(pub u64);

pub fn advance_tick_counter(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

/// Everything needed to brew headlessly. Insert a custom [`BrewConfig`]
/// before adding the plugin to override the default calibration.
pub struct BrewSimulationPlugin;

impl Plugin for BrewSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BrewConfig>()
            .init_resource::<TickCounter>();

        let tick_seconds = app.world().resource::<BrewConfig>().tick_seconds;
        app.insert_resource(Time::<Fixed>::from_seconds(f64::from(tick_seconds)));

        app.configure_sets(
            FixedUpdate,
            (BrewSet::Input, BrewSet::Physics, BrewSet::Report).chain(),
        );
        app.add_systems(
            FixedUpdate,
            advance_tick_counter
                .before(brew_actions::execute_queued_brew_actions)
                .in_set(BrewSet::Input),
        );

        app.add_plugins((
            sim_rng::BrewRngPlugin,
            session::BrewSessionPlugin,
            brew_actions::BrewActionsPlugin,
            stats::StatsPlugin,
            observation_plugin::ObservationPlugin,
        ));
    }
}
