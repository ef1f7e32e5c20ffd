//! Contents of a single bed cell, tracked as grams of each substance.

use serde::{Deserialize, Serialize};

use crate::config::Substances;

/// One wedge-shaped voxel of the coffee bed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellContents {
    /// Unsaturated grounds (grams).
    pub dry_grounds: f32,
    /// Saturated grounds: original grounds plus absorbed water in one pool (grams).
    pub wet_grounds: f32,
    /// Liquid water not bound to grounds (grams).
    pub free_water: f32,
    /// Cumulative dissolved coffee solids carried in this cell (grams).
    pub extracted_solids: f32,
    /// Water temperature (°C).
    pub temperature: f32,
}

impl CellContents {
    /// An empty cell at the given temperature.
    pub const fn empty(temperature: f32) -> Self {
        Self {
            dry_grounds: 0.0,
            wet_grounds: 0.0,
            free_water: 0.0,
            extracted_solids: 0.0,
            temperature,
        }
    }

    /// Dry + wet grounds as stored (wet includes its absorbed water).
    #[inline]
    pub fn grounds_mass(&self) -> f32 {
        self.dry_grounds + self.wet_grounds
    }

    /// Flat mass used against the cell capacity: dry + wet + free.
    #[inline]
    pub fn total_mass(&self) -> f32 {
        self.dry_grounds + self.wet_grounds + self.free_water
    }

    /// Space left under a flat mass ceiling, never negative.
    #[inline]
    pub fn spare_capacity(&self, capacity: f32) -> f32 {
        (capacity - self.total_mass()).max(0.0)
    }

    /// Grams of original coffee grounds: dry plus the grounds share of wet.
    pub fn total_grounds(&self, substances: &Substances) -> f32 {
        self.dry_grounds + self.wet_grounds * substances.grounds_fraction_of_wet()
    }

    /// Grams of water: free plus the water absorbed into wet grounds.
    pub fn total_water(&self, substances: &Substances) -> f32 {
        self.free_water + self.wet_grounds * substances.water_fraction_of_wet()
    }

    /// Volume occupied by the cell's contents in cm³.
    pub fn used_volume(&self, substances: &Substances) -> f32 {
        self.dry_grounds / substances.dry_grounds_density
            + self.wet_grounds / substances.wet_grounds_density
            + self.free_water / substances.water_density
    }

    /// Remaining air volume in cm³.
    pub fn air_volume(&self, substances: &Substances) -> f32 {
        (substances.cell_volume - self.used_volume(substances)).max(0.0)
    }

    /// Whether the cell has (almost) no air left by volume.
    pub fn is_full(&self, substances: &Substances) -> bool {
        self.air_volume(substances) < 0.001
    }

    /// Whether any mass field exceeds `threshold`.
    #[inline]
    pub fn has_content(&self, threshold: f32) -> bool {
        self.dry_grounds > threshold || self.wet_grounds > threshold || self.free_water > threshold
    }

    /// Whether every mass field is exactly zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dry_grounds == 0.0
            && self.wet_grounds == 0.0
            && self.free_water == 0.0
            && self.extracted_solids == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(dry: f32, wet: f32, free: f32) -> CellContents {
        CellContents {
            dry_grounds: dry,
            wet_grounds: wet,
            free_water: free,
            ..CellContents::empty(20.0)
        }
    }

    #[test]
    fn test_empty_cell() {
        let c = CellContents::empty(20.0);
        assert!(c.is_empty());
        assert!((c.temperature - 20.0).abs() < f32::EPSILON);
        assert!(!c.has_content(0.01));
    }

    #[test]
    fn test_total_grounds_and_water_split_wet_pool() {
        let s = Substances::default();
        let c = cell(0.5, 3.0, 1.0);
        // 3 g wet = 1 g grounds + 2 g absorbed water
        assert!((c.total_grounds(&s) - 1.5).abs() < 1e-6);
        assert!((c.total_water(&s) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_spare_capacity_clamps_at_zero() {
        let c = cell(1.0, 1.5, 1.0);
        assert!((c.total_mass() - 3.5).abs() < 1e-6);
        assert_eq!(c.spare_capacity(3.0), 0.0);
        assert!((c.spare_capacity(4.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_used_volume_uses_densities() {
        let s = Substances::default();
        let c = cell(0.004, 0.012, 0.01);
        // 0.004/0.4 + 0.012/1.2 + 0.01/1.0 = 0.03 cm³
        assert!((c.used_volume(&s) - 0.03).abs() < 1e-6);
        assert!((c.air_volume(&s) - 0.045).abs() < 1e-6);
        assert!(!c.is_full(&s));
        assert!(cell(0.03, 0.0, 0.0).is_full(&s));
    }

    #[test]
    fn test_has_content_threshold() {
        assert!(!cell(0.005, 0.0, 0.0).has_content(0.01));
        assert!(cell(0.0, 0.0, 0.02).has_content(0.01));
    }
}
