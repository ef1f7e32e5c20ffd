//! Headless `--agent` mode: a blocking synchronous loop that reads JSON
//! commands from stdin and writes JSON responses to stdout.
//!
//! Each line of stdin is a JSON object with a `"cmd"` discriminator. Each
//! line of stdout is a JSON response with `"protocol_version"` and `"type"`
//! fields. See [`simulation::agent_protocol`] for the full schema. Logs go to
//! stderr so stdout stays clean JSON.

use std::io::{BufRead, Write};

use bevy::log::LogPlugin;
use bevy::prelude::*;

use simulation::agent_protocol::{
    make_response, AgentCommand, AgentResponse, ResponsePayload, MAX_STEP_TICKS, PROTOCOL_VERSION,
};
use simulation::brew_actions::{ActionResult, ActionResultLog, ActionSource, BrewAction, BrewActionQueue};
use simulation::config::BrewConfig;
use simulation::observation_builder::CurrentObservation;
use simulation::session::BrewSession;
use simulation::stats::debug_report;
use simulation::{BrewSimulationPlugin, TickCounter};

pub fn run_agent_mode(config: BrewConfig) {
    let mut app = App::new();
    app.add_plugins(LogPlugin::default());
    build_agent_app(&mut app, config);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    write_response(&mut stdout, &make_response(ResponsePayload::Ready));
    info!(
        "pourover agent mode v{} ready, waiting for commands on stdin",
        PROTOCOL_VERSION
    );

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("stdin read error: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<AgentCommand>(&line) {
            Ok(cmd) => process_command(cmd, &mut app),
            Err(e) => make_response(ResponsePayload::Error {
                message: format!("Parse error: {e}"),
            }),
        };
        let is_goodbye = matches!(response.payload, ResponsePayload::Goodbye);
        write_response(&mut stdout, &response);

        if is_goodbye {
            break;
        }
    }

    info!("pourover agent mode shutting down");
}

fn build_agent_app(app: &mut App, config: BrewConfig) {
    app.add_plugins(MinimalPlugins);
    app.insert_resource(config);
    app.add_plugins(BrewSimulationPlugin);
    app.finish();
    app.cleanup();
    // One tick so the observation reflects the fresh session.
    run_ticks(app, 1);
}

fn write_response(out: &mut impl Write, response: &AgentResponse) {
    match serde_json::to_string(response) {
        Ok(json) => {
            let _ = writeln!(out, "{json}");
        }
        Err(e) => {
            error!("could not serialize response: {e}");
            let _ = writeln!(
                out,
                r#"{{"protocol_version":{PROTOCOL_VERSION},"type":"error","message":"serialization failed"}}"#
            );
        }
    }
    let _ = out.flush();
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

fn run_ticks(app: &mut App, n: u64) {
    for _ in 0..n {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

fn current_tick(app: &App) -> u64 {
    app.world()
        .get_resource::<TickCounter>()
        .map(|t| t.0)
        .unwrap_or(0)
}

/// Queue one action, run one tick so the executor applies it, and return
/// the logged result.
fn act(app: &mut App, action: BrewAction) -> ActionResult {
    let tick = current_tick(app);
    app.world_mut()
        .resource_mut::<BrewActionQueue>()
        .push(tick, ActionSource::Agent, action);
    run_ticks(app, 1);

    app.world()
        .get_resource::<ActionResultLog>()
        .and_then(|log| log.last_n(1).first().map(|(_, r)| r.clone()))
        .unwrap_or(ActionResult::Success)
}

fn process_command(cmd: AgentCommand, app: &mut App) -> AgentResponse {
    match cmd {
        AgentCommand::Observe => {
            let observation = app
                .world()
                .get_resource::<CurrentObservation>()
                .map(|co| co.observation.clone())
                .unwrap_or_default();
            make_response(ResponsePayload::Observation { observation })
        }

        AgentCommand::Act { action } => {
            let result = act(app, action);
            make_response(ResponsePayload::ActionResult { result })
        }

        AgentCommand::BatchAct { actions } => {
            let results = actions.into_iter().map(|a| act(app, a)).collect();
            make_response(ResponsePayload::BatchResult { results })
        }

        AgentCommand::Step { ticks } => {
            run_ticks(app, ticks.min(MAX_STEP_TICKS));
            make_response(ResponsePayload::StepComplete {
                tick: current_tick(app),
            })
        }

        AgentCommand::Report => {
            let world = app.world();
            let text = debug_report(
                world.resource::<BrewSession>(),
                world.resource::<BrewConfig>(),
            );
            make_response(ResponsePayload::Report { text })
        }

        AgentCommand::Reset => match act(app, BrewAction::Reset) {
            ActionResult::Error(e) => make_response(ResponsePayload::Error {
                message: e.to_string(),
            }),
            _ => make_response(ResponsePayload::Ok),
        },

        AgentCommand::Quit => make_response(ResponsePayload::Goodbye),
    }
}
