//! Assertion helpers for `TestBrew` integration tests.

use crate::session::BrewPhase;

use super::TestBrew;

impl TestBrew {
    pub fn assert_phase(&self, phase: BrewPhase) {
        let actual = self.session().phase;
        assert_eq!(actual, phase, "Expected phase {phase}, got {actual}");
    }

    /// Assert no in-cone cell holds a negative amount of anything.
    pub fn assert_bed_non_negative(&self) {
        for (r, s, h, cell) in self.session().bed.iter_active() {
            assert!(
                cell.dry_grounds >= 0.0
                    && cell.wet_grounds >= 0.0
                    && cell.free_water >= 0.0
                    && cell.extracted_solids >= 0.0,
                "negative contents at ({r}, {s}, {h}): {cell:?}"
            );
        }
    }

    /// Assert the dripper still holds the grounds it was seeded with.
    pub fn assert_grounds_conserved(&self, tolerance: f32) {
        let expected = self.session().grounds_weight;
        let actual = self.stats().grounds_in_bed;
        assert!(
            (actual - expected).abs() <= tolerance,
            "Expected {expected}g of grounds in the bed, found {actual}g"
        );
    }
}
