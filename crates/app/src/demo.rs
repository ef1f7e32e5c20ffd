//! Scripted demo brew: grind, pour a seeded spiral, let it drain, score it.
//!
//! The script is fed to the action queue one step per fixed tick by
//! `feed_demo_script`. The result is printed to stdout as JSON.

use std::collections::VecDeque;
use std::process::ExitCode;

use bevy::log::LogPlugin;
use bevy::prelude::*;

use simulation::brew_actions::{execute_queued_brew_actions, ActionSource, BrewAction, BrewActionQueue};
use simulation::config::BrewConfig;
use simulation::pour_script::PourScript;
use simulation::session::{BrewCompleted, BrewSession};
use simulation::sim_rng::BrewRng;
use simulation::stats::debug_report;
use simulation::{BrewSet, BrewSimulationPlugin, TickCounter};

use crate::cli::Options;

/// Ticks to let the bed drain after the last pour.
const DRAIN_TICKS: usize = 400;
/// Hard stop in case the script never completes.
const MAX_TICKS: u64 = 20_000;

/// Remaining demo steps; `None` waits a tick.
#[derive(Resource, Default)]
struct DemoScript {
    steps: VecDeque<Option<BrewAction>>,
}

fn build_script(options: &Options, rng: &mut BrewRng) -> DemoScript {
    let mut steps = VecDeque::new();
    steps.push_back(Some(BrewAction::SetGrindSize {
        size: options.grind_size,
    }));
    steps.push_back(Some(BrewAction::SetTemperature {
        celsius: options.temperature,
    }));
    steps.push_back(Some(BrewAction::Grind {
        grams: options.grams,
    }));
    steps.push_back(Some(BrewAction::StartPour));
    steps.extend(PourScript::default().actions(&mut rng.0).into_iter().map(Some));
    steps.extend(std::iter::repeat(None).take(DRAIN_TICKS));
    steps.push_back(Some(BrewAction::Finish));
    DemoScript { steps }
}

fn feed_demo_script(
    mut script: ResMut<DemoScript>,
    mut queue: ResMut<BrewActionQueue>,
    tick: Res<TickCounter>,
) {
    if let Some(Some(action)) = script.steps.pop_front() {
        queue.push(tick.0, ActionSource::Script, action);
    }
}

fn exit_when_done(
    script: Res<DemoScript>,
    tick: Res<TickCounter>,
    mut completed: EventReader<BrewCompleted>,
    mut exit: EventWriter<AppExit>,
) {
    let finished = completed.read().next().is_some();
    if finished || (script.steps.is_empty() && tick.0 > 0) || tick.0 >= MAX_TICKS {
        exit.send(AppExit::Success);
    }
}

pub fn run_demo(options: &Options, config: BrewConfig) -> ExitCode {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(LogPlugin::default());
    app.insert_resource(config);
    app.add_plugins(BrewSimulationPlugin);

    let mut rng = BrewRng::from_seed_u64(options.seed);
    let script = build_script(options, &mut rng);
    app.insert_resource(rng);
    app.insert_resource(script);
    app.add_systems(
        FixedUpdate,
        feed_demo_script
            .before(execute_queued_brew_actions)
            .in_set(BrewSet::Input),
    );
    app.add_systems(FixedUpdate, exit_when_done.in_set(BrewSet::Report));

    info!(
        "demo brew: {}g at grind {} and {}°C, seed {}",
        options.grams, options.grind_size, options.temperature, options.seed
    );

    if options.realtime {
        app.run();
    } else {
        app.finish();
        app.cleanup();
        loop {
            app.world_mut().run_schedule(FixedUpdate);
            let world = app.world();
            let done = world.resource::<DemoScript>().steps.is_empty()
                || world.resource::<TickCounter>().0 >= MAX_TICKS;
            if done {
                break;
            }
        }
    }

    let world = app.world();
    let session = world.resource::<BrewSession>();
    if options.report {
        eprintln!("{}", debug_report(session, world.resource::<BrewConfig>()));
    }

    match &session.result {
        Some(result) => match serde_json::to_string_pretty(result) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("could not serialize the result: {e}");
                ExitCode::FAILURE
            }
        },
        None => {
            error!("the demo brew did not finish (phase: {})", session.phase);
            ExitCode::FAILURE
        }
    }
}
