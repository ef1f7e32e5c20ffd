//! # TestBrew — headless integration test harness
//!
//! A fluent builder that wraps `bevy::app::App` + `BrewSimulationPlugin` for
//! running brews in tests and benches without a host.

mod assertions;

use bevy::app::App;
use bevy::prelude::*;

use crate::brew_actions::{ActionResult, ActionResultLog, ActionSource, BrewAction, BrewActionQueue};
use crate::brew_observation::BrewObservation;
use crate::config::BrewConfig;
use crate::extraction::BrewResult;
use crate::observation_builder::CurrentObservation;
use crate::pour_script::PourScript;
use crate::session::{BrewCompleted, BrewSession};
use crate::sim_rng::BrewRng;
use crate::stats::BedStats;
use crate::{BrewSimulationPlugin, TickCounter};

/// Use builder methods to set up a brew, then call `tick()` to advance the
/// simulation and assert on the resulting ECS state.
pub struct TestBrew {
    app: App,
}

impl Default for TestBrew {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBrew {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// A fresh session with the default calibration.
    pub fn new() -> Self {
        Self::with_config(BrewConfig::default())
    }

    pub fn with_config(config: BrewConfig) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        // Insert the config BEFORE the plugin so the session is built from it.
        app.insert_resource(config);
        app.add_plugins(BrewSimulationPlugin);
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Setup (builder pattern: consumes and returns Self)
    // -----------------------------------------------------------------------

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.app.insert_resource(BrewRng::from_seed_u64(seed));
        self
    }

    pub fn with_dials(mut self, grind_size: f32, temperature: f32) -> Self {
        self.act(BrewAction::SetGrindSize { size: grind_size });
        self.act(BrewAction::SetTemperature {
            celsius: temperature,
        });
        self
    }

    /// Grind `grams` and start pouring.
    pub fn with_grounds(mut self, grams: f32) -> Self {
        self.act(BrewAction::Grind { grams });
        self.act(BrewAction::StartPour);
        self
    }

    // -----------------------------------------------------------------------
    // Driving the simulation
    // -----------------------------------------------------------------------

    /// Run `n` fixed ticks.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    /// Queue an action without ticking.
    pub fn queue(&mut self, action: BrewAction) {
        let tick = self.tick_count();
        self.app
            .world_mut()
            .resource_mut::<BrewActionQueue>()
            .push(tick, ActionSource::Agent, action);
    }

    /// Queue an action, run one tick and return its result.
    pub fn act(&mut self, action: BrewAction) -> ActionResult {
        self.queue(action);
        self.tick(1);
        self.last_result()
    }

    /// Pour `script` one point per tick, using the harness RNG.
    pub fn pour_script(&mut self, script: &PourScript) -> Vec<ActionResult> {
        let actions = {
            let mut rng = self.app.world_mut().resource_mut::<BrewRng>();
            script.actions(&mut rng.0)
        };
        actions.into_iter().map(|a| self.act(a)).collect()
    }

    /// Finish the brew and return the result.
    pub fn finish(&mut self) -> Option<BrewResult> {
        match self.act(BrewAction::Finish) {
            r if r.is_success() => self.session().result.clone(),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn session(&self) -> &BrewSession {
        self.resource::<BrewSession>()
    }

    pub fn config(&self) -> &BrewConfig {
        self.resource::<BrewConfig>()
    }

    pub fn stats(&self) -> &BedStats {
        self.resource::<BedStats>()
    }

    pub fn observation(&self) -> &BrewObservation {
        &self.resource::<CurrentObservation>().observation
    }

    pub fn tick_count(&self) -> u64 {
        self.resource::<TickCounter>().0
    }

    pub fn last_result(&self) -> ActionResult {
        self.resource::<ActionResultLog>()
            .last_n(1)
            .first()
            .map(|(_, r)| r.clone())
            .unwrap_or(ActionResult::Success)
    }

    /// Completion events sent since the harness was built.
    pub fn completions(&self) -> Vec<BrewCompleted> {
        self.resource::<Events<BrewCompleted>>()
            .iter_current_update_events()
            .cloned()
            .collect()
    }
}
