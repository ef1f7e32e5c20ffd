//! Scripted pouring: a seeded spiral over the bed.
//!
//! Used by the demo binary, the integration tests and the benches to brew
//! without an interactive host.

use std::f32::consts::{PI, TAU};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::brew_actions::{ActionSource, BrewAction, BrewActionQueue};
use crate::vessel::{VESSEL_RADIUS, VIEW_SIZE};

/// Spiral out from the centre to `max_radius` and back again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PourScript {
    /// Number of pour actions; one is issued per fixed tick.
    pub pours: usize,
    /// Outermost point of the spiral as a fraction of the rim radius.
    pub max_radius: f32,
    /// Full revolutions over the whole script.
    pub turns: f32,
    /// Random offset per point, as a fraction of the rim radius.
    pub jitter: f32,
}

impl Default for PourScript {
    fn default() -> Self {
        Self {
            pours: 600,
            max_radius: 0.7,
            turns: 12.0,
            jitter: 0.03,
        }
    }
}

impl PourScript {
    /// Normalised pour points, in the order they should be poured.
    pub fn points(&self, rng: &mut impl Rng) -> Vec<(f32, f32)> {
        let rim = VESSEL_RADIUS / VIEW_SIZE;
        let last = self.pours.saturating_sub(1).max(1) as f32;
        (0..self.pours)
            .map(|i| {
                let t = i as f32 / last;
                // Triangle wave: 0 at both ends, 1 halfway through.
                let reach = 1.0 - (2.0 * t - 1.0).abs();
                let radius = self.max_radius * reach;
                let angle = self.turns * TAU * t - PI / 2.0;
                let jx = rng.gen_range(-1.0f32..=1.0) * self.jitter;
                let jy = rng.gen_range(-1.0f32..=1.0) * self.jitter;
                (
                    0.5 + (radius * angle.cos() + jx) * rim,
                    0.5 + (radius * angle.sin() + jy) * rim,
                )
            })
            .collect()
    }

    /// The pour actions of this script.
    pub fn actions(&self, rng: &mut impl Rng) -> Vec<BrewAction> {
        self.points(rng)
            .into_iter()
            .map(|(x, y)| BrewAction::PourAt { x, y })
            .collect()
    }

    /// Queue the whole script at once; the executor applies it in one tick.
    pub fn queue_all(&self, queue: &mut BrewActionQueue, tick: u64, rng: &mut impl Rng) {
        for action in self.actions(rng) {
            queue.push(tick, ActionSource::Script, action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrewConfig;
    use crate::sim_rng::BrewRng;
    use crate::vessel::map_point_to_cell;

    #[test]
    fn test_points_stay_inside_the_vessel() {
        let geometry = BrewConfig::default().geometry;
        let mut rng = BrewRng::default();
        let points = PourScript::default().points(&mut rng.0);
        assert_eq!(points.len(), 600);
        for (x, y) in points {
            assert!(map_point_to_cell(x, y, &geometry).is_some(), "({x}, {y})");
        }
    }

    #[test]
    fn test_spiral_starts_and_ends_near_centre() {
        let geometry = BrewConfig::default().geometry;
        let mut rng = BrewRng::default();
        let points = PourScript::default().points(&mut rng.0);
        let first = map_point_to_cell(points[0].0, points[0].1, &geometry).unwrap();
        let middle = map_point_to_cell(points[300].0, points[300].1, &geometry).unwrap();
        let last = map_point_to_cell(points[599].0, points[599].1, &geometry).unwrap();
        assert_eq!(first.ring, 0);
        assert_eq!(last.ring, 0);
        assert_eq!(middle.ring, 2);
    }

    #[test]
    fn test_same_seed_same_script() {
        let script = PourScript::default();
        let a = script.actions(&mut BrewRng::from_seed_u64(7).0);
        let b = script.actions(&mut BrewRng::from_seed_u64(7).0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_queue_all_tags_script_source() {
        let script = PourScript {
            pours: 5,
            ..Default::default()
        };
        let mut queue = BrewActionQueue::default();
        script.queue_all(&mut queue, 9, &mut BrewRng::default().0);
        let drained = queue.drain();
        assert_eq!(drained.len(), 5);
        assert!(drained
            .iter()
            .all(|q| q.source == ActionSource::Script && q.tick == 9));
    }
}
