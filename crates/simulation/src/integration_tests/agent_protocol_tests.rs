//! Wire format of the agent protocol against a live harness.

use crate::agent_protocol::*;
use crate::brew_actions::{ActionResult, BrewAction};
use crate::session::BrewError;
use crate::test_harness::TestBrew;

fn to_json(payload: ResponsePayload) -> serde_json::Value {
    serde_json::to_value(make_response(payload)).unwrap()
}

#[test]
fn test_act_command_drives_the_harness() {
    let mut brew = TestBrew::new();
    let line = r#"{"cmd":"batch_act","actions":[{"Grind":{"grams":20.0}},"StartPour",{"PourAt":{"x":0.5,"y":0.5}}]}"#;
    let AgentCommand::BatchAct { actions } = serde_json::from_str(line).unwrap() else {
        panic!("expected BatchAct");
    };
    let results: Vec<ActionResult> = actions.into_iter().map(|a| brew.act(a)).collect();
    assert!(results.iter().all(ActionResult::is_success));
    assert_eq!(brew.session().pours.len(), 1);
}

#[test]
fn test_observation_response_shape() {
    let mut brew = TestBrew::new().with_grounds(18.0);
    brew.act(BrewAction::PourAt { x: 0.5, y: 0.5 });
    let json = to_json(ResponsePayload::Observation {
        observation: brew.observation().clone(),
    });

    assert_eq!(json["protocol_version"], 1);
    assert_eq!(json["type"], "observation");
    let obs = &json["observation"];
    assert_eq!(obs["phase"], "pour");
    assert_eq!(obs["pour_count"], 1);
    assert_eq!(obs["bed"]["layers"], 10);
    assert!(obs["result"].is_null());
}

#[test]
fn test_error_result_serializes_with_details() {
    let json = to_json(ResponsePayload::ActionResult {
        result: ActionResult::Error(BrewError::NotEnoughWater {
            have: 4.0,
            need: 10.0,
        }),
    });
    assert_eq!(json["type"], "action_result");
    assert_eq!(json["result"]["Error"]["NotEnoughWater"]["need"], 10.0);
}

#[test]
fn test_step_complete_reports_tick() {
    let mut brew = TestBrew::new();
    let AgentCommand::Step { ticks } = serde_json::from_str(r#"{"cmd":"step","ticks":50000}"#).unwrap() else {
        panic!("expected Step");
    };
    let start = brew.tick_count();
    brew.tick(ticks.min(MAX_STEP_TICKS) as u32);
    let json = to_json(ResponsePayload::StepComplete {
        tick: brew.tick_count(),
    });
    assert_eq!(json["tick"], start + MAX_STEP_TICKS);
}
