//! Pour pattern analysis.
//!
//! Every accepted pour is logged as a [`PourEvent`]. When the brew finishes the
//! log is reduced to four scores in `[0, 1]` describing how well the water was
//! distributed over the bed.

use serde::{Deserialize, Serialize};

use crate::geometry::ConeGeometry;

/// Fewer events than this produce the neutral pattern.
const MIN_EVENTS: usize = 3;
/// Evenness reported when no event hit a valid sector.
const NO_SECTOR_EVENNESS: f32 = 0.3;
/// Penalty weight of pours in the two outermost rings.
const EDGE_PENALTY: f32 = 0.8;
/// Amplifies how far the busiest sector exceeds a uniform share.
const CHANNELING_GAIN: f32 = 3.0;

/// One accepted pour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PourEvent {
    /// Planar position relative to the vessel centre, in vessel radii.
    pub x: f32,
    pub y: f32,
    pub ring: usize,
    pub sector: usize,
    /// Seconds since the first pour of the brew.
    pub time: f32,
}

/// Append-only, time-ordered record of the pours in one brew.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PourLog {
    events: Vec<PourEvent>,
}

impl PourLog {
    /// Append `event`, pulling its timestamp up to the last one if it is earlier.
    pub fn push(&mut self, mut event: PourEvent) {
        if let Some(last) = self.events.last() {
            event.time = event.time.max(last.time);
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[PourEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn analyze(&self, geometry: &ConeGeometry) -> PourPattern {
        analyze_pour_pattern(&self.events, geometry)
    }
}

/// Distribution scores of a pour sequence, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PourPattern {
    /// How evenly pours cover the sectors that were hit.
    pub evenness: f32,
    /// 1 when no pour hit the outer two rings.
    pub edge_avoidance: f32,
    /// Share of consecutive pours that move to an adjacent sector.
    pub circularity: f32,
    /// 1 when no sector is favoured; lower means a channel is likely.
    pub channeling: f32,
}

impl Default for PourPattern {
    fn default() -> Self {
        Self {
            evenness: 0.5,
            edge_avoidance: 1.0,
            circularity: 0.0,
            channeling: 1.0,
        }
    }
}

impl PourPattern {
    /// Mean of the four scores.
    pub fn average(&self) -> f32 {
        (self.evenness + self.edge_avoidance + self.circularity + self.channeling) / 4.0
    }
}

/// Score a pour sequence against the bed's sector and ring layout.
///
/// Events whose ring or sector lies outside `geometry` still count toward the
/// totals but are not bucketed.
pub fn analyze_pour_pattern(events: &[PourEvent], geometry: &ConeGeometry) -> PourPattern {
    if events.len() < MIN_EVENTS {
        return PourPattern::default();
    }

    let sectors = geometry.sectors();
    let rings = geometry.rings();
    let total = events.len() as f32;

    let mut sector_counts = vec![0u32; sectors];
    let mut ring_counts = vec![0u32; rings];
    for event in events {
        if let Some(count) = sector_counts.get_mut(event.sector) {
            *count += 1;
        }
        if let Some(count) = ring_counts.get_mut(event.ring) {
            *count += 1;
        }
    }

    let max_sector = sector_counts.iter().copied().max().unwrap_or(0);
    let min_sector = sector_counts.iter().copied().filter(|&c| c > 0).min();
    let evenness = match min_sector {
        Some(min) => (min as f32 / (max_sector as f32 * 0.5)).min(1.0),
        None => NO_SECTOR_EVENNESS,
    };

    let edge_start = rings.saturating_sub(2);
    let edge_pours: u32 = ring_counts[edge_start..].iter().sum();
    let edge_avoidance = 1.0 - (edge_pours as f32 / total) * EDGE_PENALTY;

    let adjacent_steps = events
        .windows(2)
        .filter(|pair| is_adjacent_sector(pair[0].sector, pair[1].sector, sectors))
        .count();
    let circularity = adjacent_steps as f32 / (events.len() - 1) as f32;

    let peak_share = max_sector as f32 / total;
    let excess = (peak_share - 1.0 / sectors as f32) * CHANNELING_GAIN;
    let channeling = (1.0 - excess.min(1.0)).clamp(0.0, 1.0);

    PourPattern {
        evenness,
        edge_avoidance,
        circularity,
        channeling,
    }
}

/// Whether `a` and `b` are neighbouring sectors on the ring, in either direction.
fn is_adjacent_sector(a: usize, b: usize, sectors: usize) -> bool {
    let diff = a.abs_diff(b);
    diff == 1 || (sectors > 1 && diff == sectors - 1)
}
