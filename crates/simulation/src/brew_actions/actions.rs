use serde::{Deserialize, Serialize};

use crate::extraction::Roast;

/// Everything a host can ask a brew session to do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BrewAction {
    Grind {
        grams: f32,
    },
    SetGrindSize {
        size: f32,
    },
    SetTemperature {
        celsius: f32,
    },
    SetRoast {
        roast: Roast,
    },
    StartPour,
    /// A point on the vessel view, normalised to `[0, 1]` on both axes.
    PourAt {
        x: f32,
        y: f32,
    },
    Finish,
    Reset,
}

impl BrewAction {
    pub fn name(&self) -> &'static str {
        match self {
            BrewAction::Grind { .. } => "grind",
            BrewAction::SetGrindSize { .. } => "set_grind_size",
            BrewAction::SetTemperature { .. } => "set_temperature",
            BrewAction::SetRoast { .. } => "set_roast",
            BrewAction::StartPour => "start_pour",
            BrewAction::PourAt { .. } => "pour_at",
            BrewAction::Finish => "finish",
            BrewAction::Reset => "reset",
        }
    }
}
