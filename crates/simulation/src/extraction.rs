//! Brew scoring: strength, extraction yield, diagnostic notes and a composite score.

use serde::{Deserialize, Serialize};

use crate::bed::CoffeeBed;
use crate::pattern::PourPattern;

/// Reported strength range (% total dissolved solids).
const TDS_RANGE: (f32, f32) = (0.8, 2.0);
/// Reported extraction yield range (%).
const YIELD_RANGE: (f32, f32) = (10.0, 28.0);
/// Yield window of a balanced cup (%).
const OPTIMAL_YIELD: (f32, f32) = (18.0, 22.0);
const TARGET_YIELD: f32 = 20.0;
const TARGET_TDS: f32 = 1.25;
const MAX_NOTES: usize = 4;

pub const NOTE_NO_DATA: &str = "No brew data";

/// Extraction bucket of a finished brew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Under,
    Optimal,
    Over,
}

impl Quality {
    pub fn from_yield(extraction_yield: f32) -> Self {
        if extraction_yield < OPTIMAL_YIELD.0 {
            Quality::Under
        } else if extraction_yield > OPTIMAL_YIELD.1 {
            Quality::Over
        } else {
            Quality::Optimal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::Under => "Under-extracted",
            Quality::Optimal => "Optimal",
            Quality::Over => "Over-extracted",
        }
    }
}

/// Roast level of the beans. Recorded on the result; it does not affect the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Roast {
    Light,
    #[default]
    Medium,
    Dark,
}

/// The scored outcome of a brew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrewResult {
    /// Strength in % TDS, two decimals.
    pub tds: f32,
    /// Extraction yield in %, one decimal.
    pub extraction_yield: f32,
    pub quality: Quality,
    /// Composite score, 0-100.
    pub score: u32,
    pub notes: Vec<String>,
    #[serde(default)]
    pub roast: Roast,
}

impl BrewResult {
    /// Result for a brew with no grounds or no water.
    pub fn no_data(roast: Roast) -> Self {
        Self {
            tds: 0.0,
            extraction_yield: 0.0,
            quality: Quality::Under,
            score: 0,
            notes: vec![NOTE_NO_DATA.to_string()],
            roast,
        }
    }
}

/// Everything the scorer needs besides the bed and pour pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrewInputs {
    /// Pour temperature (°C).
    pub temperature: f32,
    /// 0 (fine) - 100 (coarse).
    pub grind_size: f32,
    pub grounds_weight: f32,
    pub water_weight: f32,
    /// Seconds from first pour to finish.
    pub contact_time: f32,
    pub roast: Roast,
}

/// Score a brew from its recipe, final bed and pour pattern.
#[allow(clippy::too_many_arguments)]
pub fn calculate_extraction(
    temperature: f32,
    grind_size: f32,
    grounds_weight: f32,
    water_weight: f32,
    contact_time: f32,
    bed: &CoffeeBed,
    pattern: &PourPattern,
    roast: Roast,
) -> BrewResult {
    score_brew(
        &BrewInputs {
            temperature,
            grind_size,
            grounds_weight,
            water_weight,
            contact_time,
            roast,
        },
        bed,
        pattern,
    )
}

pub fn score_brew(inputs: &BrewInputs, bed: &CoffeeBed, pattern: &PourPattern) -> BrewResult {
    if inputs.grounds_weight <= 0.0 || inputs.water_weight <= 0.0 {
        return BrewResult::no_data(inputs.roast);
    }

    let total_extracted = bed.sum_by(|c| c.extracted_solids);
    let tds = (100.0 * total_extracted / inputs.water_weight).clamp(TDS_RANGE.0, TDS_RANGE.1);
    let extraction_yield =
        (100.0 * total_extracted / inputs.grounds_weight).clamp(YIELD_RANGE.0, YIELD_RANGE.1);

    let mut notes = diagnostic_notes(inputs, pattern);
    notes.truncate(MAX_NOTES);

    let extraction_closeness = 100.0 - 10.0 * (extraction_yield - TARGET_YIELD).abs();
    let tds_closeness = 100.0 - 80.0 * (tds - TARGET_TDS).abs();
    let pattern_score = pattern.average() * 100.0;
    let score = (extraction_closeness * 0.4 + tds_closeness * 0.3 + pattern_score * 0.3)
        .clamp(0.0, 100.0)
        .round() as u32;

    BrewResult {
        tds: round_to(tds, 100.0),
        extraction_yield: round_to(extraction_yield, 10.0),
        quality: Quality::from_yield(extraction_yield),
        score,
        notes,
        roast: inputs.roast,
    }
}

fn diagnostic_notes(inputs: &BrewInputs, pattern: &PourPattern) -> Vec<String> {
    let mut notes = Vec::new();

    if inputs.temperature < 85.0 {
        notes.push("Water too cold");
    } else if inputs.temperature > 96.0 {
        notes.push("Water too hot");
    }

    if inputs.grind_size < 20.0 {
        notes.push("Grind too fine - bed stalling");
    } else if inputs.grind_size > 80.0 {
        notes.push("Grind too coarse");
    }

    if inputs.contact_time < 120.0 {
        notes.push("Brew too fast");
    } else if inputs.contact_time > 300.0 {
        notes.push("Brew too slow");
    }

    if pattern.edge_avoidance < 0.5 {
        notes.push("Too much edge pouring");
    }
    if pattern.channeling < 0.4 {
        notes.push("Channeling detected");
    }
    if pattern.circularity > 0.6 {
        notes.push("Good circular pour");
    }

    notes.into_iter().map(String::from).collect()
}

fn round_to(value: f32, scale: f32) -> f32 {
    (value * scale).round() / scale
}
