//! Registers `CurrentObservation` and the `build_observation` system.

use bevy::prelude::*;

use crate::observation_builder::{build_observation, CurrentObservation};
use crate::stats::refresh_bed_stats;
use crate::BrewSet;

pub struct ObservationPlugin;

impl Plugin for ObservationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CurrentObservation>();
        app.add_systems(
            FixedUpdate,
            build_observation
                .after(refresh_bed_stats)
                .in_set(BrewSet::Report),
        );
    }
}
