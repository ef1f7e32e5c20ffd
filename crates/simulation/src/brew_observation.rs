//! Compact, typed, serializable snapshot of a brew.
//!
//! `BrewObservation` is what an agent sees each turn: the dials, the recipe so
//! far, a summary of the bed and any warnings worth reacting to.

use serde::{Deserialize, Serialize};

use crate::extraction::{BrewResult, Roast};
use crate::session::BrewPhase;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BrewObservation {
    // -- Time ---------------------------------------------------------------
    pub tick: u64,
    pub phase: BrewPhase,
    /// Seconds since the first pour.
    pub contact_time: f32,
    /// `contact_time` as `m:ss`.
    pub brew_time: String,

    // -- Dials --------------------------------------------------------------
    pub grind_size: f32,
    pub temperature: f32,
    pub roast: Roast,

    // -- Recipe -------------------------------------------------------------
    pub grounds_weight: f32,
    pub water_weight: f32,
    pub coffee_in_mug: f32,
    pub pour_count: usize,

    // -- Bed ----------------------------------------------------------------
    pub bed: BedSnapshot,

    pub warnings: Vec<BrewWarning>,
    pub recent_action_results: Vec<ActionResultEntry>,

    /// Present once the brew is finished.
    pub result: Option<BrewResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BedSnapshot {
    pub water_in_bed: f32,
    pub grounds_in_bed: f32,
    pub free_water: f32,
    pub total_extracted: f32,
    /// Filled layers, counted from the bottom.
    pub content_height: usize,
    pub layers: usize,
}

/// Signals an agent may want to react to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BrewWarning {
    WaterTooCold,
    WaterTooHot,
    GrindTooFine,
    /// Free water is pooling on top of the bed.
    Pooling,
    /// Content has reached the top layer.
    Overflowing,
    LongBrew,
}

/// Compact summary of a recently executed brew action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionResultEntry {
    pub action: String,
    pub success: bool,
    /// Warning or error text, if any.
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_default_is_empty() {
        let obs = BrewObservation::default();
        assert_eq!(obs.tick, 0);
        assert_eq!(obs.phase, BrewPhase::Grind);
        assert!(obs.warnings.is_empty());
        assert!(obs.result.is_none());
    }

    #[test]
    fn observation_serializes_to_json() {
        let obs = BrewObservation {
            tick: 42,
            phase: BrewPhase::Pour,
            brew_time: "0:06".into(),
            warnings: vec![BrewWarning::Pooling],
            recent_action_results: vec![ActionResultEntry {
                action: "pour_at".into(),
                success: false,
                message: Some("pour point is outside the vessel".into()),
            }],
            ..Default::default()
        };
        let json = serde_json::to_string(&obs).unwrap();
        assert!(json.contains("\"tick\":42"));
        assert!(json.contains("\"phase\":\"pour\""));
        assert!(json.contains("Pooling"));
        assert!(json.contains("\"result\":null"));
    }
}
