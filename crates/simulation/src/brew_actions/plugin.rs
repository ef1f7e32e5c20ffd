//! Plugin that wires up the brew-actions subsystem: queue, executor, and log.

use bevy::prelude::*;

use super::executor::execute_queued_brew_actions;
use super::result_log::ActionResultLog;
use super::BrewActionQueue;
use crate::BrewSet;

pub struct BrewActionsPlugin;

impl Plugin for BrewActionsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BrewActionQueue>();
        app.init_resource::<ActionResultLog>();

        app.add_systems(
            FixedUpdate,
            execute_queued_brew_actions.in_set(BrewSet::Input),
        );
    }
}
