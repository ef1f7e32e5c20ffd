//! Agent text protocol types for the `--agent` headless mode.
//!
//! Defines the JSON command/response envelope that external programs (LLMs,
//! scripts, test harnesses) use to drive a brew over newline-delimited JSON
//! on stdin/stdout. The I/O loop lives in `crates/app/src/agent_mode.rs`.

use serde::{Deserialize, Serialize};

use crate::brew_actions::{ActionResult, BrewAction};
use crate::brew_observation::BrewObservation;

/// Upper bound on ticks per `step` command.
pub const MAX_STEP_TICKS: u64 = 10_000;

// ---------------------------------------------------------------------------
// Commands (stdin → simulation)
// ---------------------------------------------------------------------------

/// One line of stdin. The `cmd` field is the discriminator tag.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd")]
pub enum AgentCommand {
    /// Request the current brew observation.
    #[serde(rename = "observe")]
    Observe,

    /// Execute a single brew action.
    #[serde(rename = "act")]
    Act { action: BrewAction },

    /// Execute multiple brew actions in sequence, one tick each.
    #[serde(rename = "batch_act")]
    BatchAct { actions: Vec<BrewAction> },

    /// Advance the simulation by `ticks` fixed ticks (capped at [`MAX_STEP_TICKS`]).
    #[serde(rename = "step")]
    Step { ticks: u64 },

    /// Plain-text debug report of the bed.
    #[serde(rename = "report")]
    Report,

    /// Discard the brew and start over.
    #[serde(rename = "reset")]
    Reset,

    #[serde(rename = "quit")]
    Quit,
}

// ---------------------------------------------------------------------------
// Responses (simulation → stdout)
// ---------------------------------------------------------------------------

/// Every response includes the protocol version and a tagged payload.
#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub protocol_version: u32,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ResponsePayload {
    #[serde(rename = "ready")]
    Ready,

    #[serde(rename = "observation")]
    Observation { observation: BrewObservation },

    /// Result of a single `act` command.
    #[serde(rename = "action_result")]
    ActionResult { result: ActionResult },

    /// Results of a `batch_act` command, in order.
    #[serde(rename = "batch_result")]
    BatchResult { results: Vec<ActionResult> },

    /// The simulation has advanced; reports the current tick counter.
    #[serde(rename = "step_complete")]
    StepComplete { tick: u64 },

    #[serde(rename = "report")]
    Report { text: String },

    #[serde(rename = "ok")]
    Ok,

    #[serde(rename = "error")]
    Error { message: String },

    /// The session is ending (response to `quit`).
    #[serde(rename = "goodbye")]
    Goodbye,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Current protocol version. Bump when the command/response schema changes.
pub const PROTOCOL_VERSION: u32 = 1;

pub fn make_response(payload: ResponsePayload) -> AgentResponse {
    AgentResponse {
        protocol_version: PROTOCOL_VERSION,
        payload,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
