//! Action executor system: drains the [`BrewActionQueue`] each fixed tick and
//! applies every queued [`BrewAction`] to the [`BrewSession`], recording
//! results in the [`ActionResultLog`].

use bevy::prelude::*;

use crate::config::BrewConfig;
use crate::session::{BrewCompleted, BrewPhase, BrewSession};
use crate::TickCounter;

use super::result_log::ActionResultLog;
use super::{ActionResult, BrewAction, BrewActionQueue};

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Drains all pending actions from the queue and executes them in order.
pub fn execute_queued_brew_actions(
    mut queue: ResMut<BrewActionQueue>,
    mut log: ResMut<ActionResultLog>,
    mut session: ResMut<BrewSession>,
    mut completed: EventWriter<BrewCompleted>,
    config: Res<BrewConfig>,
    tick: Res<TickCounter>,
) {
    for queued in queue.drain() {
        let was_complete = session.phase == BrewPhase::Complete;
        let result = execute_single(&queued.action, &mut session, &config);

        match &result {
            ActionResult::Error(err) => {
                warn!(
                    "{:?} action `{}` rejected: {}",
                    queued.source,
                    queued.action.name(),
                    err
                );
            }
            ActionResult::SuccessWithWarning(w) => {
                debug!("action `{}`: {}", queued.action.name(), w);
            }
            ActionResult::Success => {}
        }

        if !was_complete && session.phase == BrewPhase::Complete {
            if let Some(result) = session.result.clone() {
                completed.send(BrewCompleted {
                    result,
                    tick: tick.0,
                });
            }
        }
        log.push(queued.action, result);
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub(crate) fn execute_single(
    action: &BrewAction,
    session: &mut BrewSession,
    config: &BrewConfig,
) -> ActionResult {
    match *action {
        BrewAction::Grind { grams } => execute_grind(grams, session, config),
        BrewAction::SetGrindSize { size } => match session.set_grind_size(size) {
            Ok(applied) => clamped(size, applied, "grind size"),
            Err(e) => ActionResult::Error(e),
        },
        BrewAction::SetTemperature { celsius } => {
            match session.set_temperature(celsius, config) {
                Ok(applied) => clamped(celsius, applied, "temperature"),
                Err(e) => ActionResult::Error(e),
            }
        }
        BrewAction::SetRoast { roast } => session.set_roast(roast).into(),
        BrewAction::StartPour => session.start_pour(config).into(),
        BrewAction::PourAt { x, y } => session.pour_at(x, y, config).map(|_| ()).into(),
        BrewAction::Finish => session.finish(config).map(|_| ()).into(),
        BrewAction::Reset => {
            session.reset(config);
            ActionResult::Success
        }
    }
}

// ---------------------------------------------------------------------------
// Execution functions
// ---------------------------------------------------------------------------

fn execute_grind(grams: f32, session: &mut BrewSession, config: &BrewConfig) -> ActionResult {
    let before = session.grounds_weight;
    match session.grind(grams, config) {
        Ok(total) if total < before + grams => ActionResult::SuccessWithWarning(format!(
            "grinder holds at most {}g",
            config.limits.max_grounds_weight
        )),
        Ok(_) => ActionResult::Success,
        Err(e) => ActionResult::Error(e),
    }
}

fn clamped(requested: f32, applied: f32, what: &str) -> ActionResult {
    if requested == applied {
        ActionResult::Success
    } else {
        ActionResult::SuccessWithWarning(format!("{what} clamped to {applied}"))
    }
}
