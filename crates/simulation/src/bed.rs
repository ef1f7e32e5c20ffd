//! The coffee bed: a `rings × sectors × layers` grid of [`CellContents`].
//!
//! Cells are stored column-contiguous (`(ring * sectors + sector) * layers + height`)
//! so a column scan is a slice walk. Cells outside the cone exist in storage
//! but every writer here checks [`ConeGeometry::is_cell_in_cone`] first, so
//! they stay zero for the lifetime of the bed.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cell::CellContents;
use crate::config::{BrewConfig, CONTENT_THRESHOLD};
use crate::geometry::ConeGeometry;

/// Stop seeding grounds once less than this remains (grams).
const SEED_REMAINDER_THRESHOLD: f32 = 0.01;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoffeeBed {
    cells: Vec<CellContents>,
    geometry: ConeGeometry,
    /// Seconds of simulated time accumulated by physics steps.
    pub simulated_seconds: f32,
}

impl Default for CoffeeBed {
    fn default() -> Self {
        let config = BrewConfig::default();
        Self::empty(&config.geometry, config.ambient_temperature)
    }
}

impl CoffeeBed {
    /// An empty bed: every cell zeroed at ambient temperature.
    pub fn empty(geometry: &ConeGeometry, ambient_temperature: f32) -> Self {
        Self {
            cells: vec![CellContents::empty(ambient_temperature); geometry.cell_count()],
            geometry: geometry.clone(),
            simulated_seconds: 0.0,
        }
    }

    #[inline]
    pub fn geometry(&self) -> &ConeGeometry {
        &self.geometry
    }

    #[inline]
    pub fn index(&self, ring: usize, sector: usize, height: usize) -> usize {
        self.geometry.index(ring, sector, height)
    }

    #[inline]
    pub fn in_bounds(&self, ring: usize, sector: usize, height: usize) -> bool {
        ring < self.geometry.rings()
            && sector < self.geometry.sectors()
            && height < self.geometry.layers()
    }

    /// Cell at `(ring, sector, height)`, or `None` when out of bounds.
    pub fn get(&self, ring: usize, sector: usize, height: usize) -> Option<&CellContents> {
        if !self.in_bounds(ring, sector, height) {
            return None;
        }
        self.cells.get(self.index(ring, sector, height))
    }

    /// Mutable access to an in-cone cell. Cells outside the cone are not handed
    /// out, so they cannot receive mass.
    pub fn get_mut(
        &mut self,
        ring: usize,
        sector: usize,
        height: usize,
    ) -> Option<&mut CellContents> {
        if !self.in_bounds(ring, sector, height) || !self.geometry.is_cell_in_cone(ring, height) {
            return None;
        }
        let idx = self.index(ring, sector, height);
        self.cells.get_mut(idx)
    }

    /// Cells of one `(ring, sector)` column, bottom first.
    pub fn column(&self, ring: usize, sector: usize) -> Option<&[CellContents]> {
        if ring >= self.geometry.rings() || sector >= self.geometry.sectors() {
            return None;
        }
        let start = self.index(ring, sector, 0);
        self.cells.get(start..start + self.geometry.layers())
    }

    /// Raw storage, including out-of-cone cells.
    #[inline]
    pub fn cells(&self) -> &[CellContents] {
        &self.cells
    }

    /// Geometry alongside mutable storage, for passes that index cells directly.
    #[inline]
    pub(crate) fn parts_mut(&mut self) -> (&ConeGeometry, &mut [CellContents]) {
        (&self.geometry, &mut self.cells)
    }

    /// In-cone cells with their coordinates, layer by layer from the bottom.
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, usize, usize, &CellContents)> + '_ {
        let g = &self.geometry;
        (0..g.layers()).flat_map(move |h| {
            (0..g.active_rings_at_height(h)).flat_map(move |r| {
                (0..g.sectors()).map(move |s| (r, s, h, &self.cells[self.index(r, s, h)]))
            })
        })
    }

    /// Sum of `f` over every cell in the grid.
    pub fn sum_by(&self, f: impl Fn(&CellContents) -> f32) -> f32 {
        self.cells.iter().map(f).sum()
    }

    // -------------------------------------------------------------------------
    // Seeding
    // -------------------------------------------------------------------------

    /// Distribute `total_grounds` grams of dry grounds from the bottom layer up.
    ///
    /// Each layer gives every in-cone cell an equal share of what remains,
    /// capped at `max_grounds_per_cell`, until the grounds run out or the grid
    /// is full. Seeded cells hold only dry grounds afterwards.
    pub fn add_grounds(&mut self, total_grounds: f32, config: &BrewConfig) {
        let mut remaining = total_grounds.max(0.0);
        let layers = self.geometry.layers();
        let sectors = self.geometry.sectors();

        for h in 0..layers {
            if remaining <= SEED_REMAINDER_THRESHOLD {
                break;
            }
            let active_rings = self.geometry.active_rings_at_height(h);
            let cells_at_height = self.geometry.active_cells_at_height(h);
            let per_cell = config
                .max_grounds_per_cell
                .min(remaining / cells_at_height as f32);

            for r in 0..active_rings {
                for s in 0..sectors {
                    let idx = self.index(r, s, h);
                    let cell = &mut self.cells[idx];
                    cell.dry_grounds = per_cell;
                    cell.wet_grounds = 0.0;
                    cell.free_water = 0.0;
                }
            }

            remaining -= per_cell * cells_at_height as f32;
        }
    }

    // -------------------------------------------------------------------------
    // Pour routing
    // -------------------------------------------------------------------------

    /// Layer that a pour into `(ring, sector)` lands on.
    ///
    /// Water lands on top of the existing surface: one layer above the topmost
    /// cell with content if that layer is inside the cone, otherwise on the
    /// surface cell itself. An empty column takes the water at its bottommost
    /// in-cone cell. `None` for coordinates outside the grid.
    pub fn pour_landing_height(&self, ring: usize, sector: usize) -> Option<usize> {
        let column = self.column(ring, sector)?;
        let layers = self.geometry.layers();

        let surface = (0..layers)
            .rev()
            .filter(|&h| self.geometry.is_cell_in_cone(ring, h))
            .find(|&h| column[h].has_content(CONTENT_THRESHOLD));

        match surface {
            Some(h) => {
                let above = h + 1;
                if self.geometry.is_cell_in_cone(ring, above) {
                    Some(above)
                } else {
                    Some(h)
                }
            }
            None => (0..layers).find(|&h| self.geometry.is_cell_in_cone(ring, h)),
        }
    }

    /// Pour `amount` grams of water at `temperature` onto column `(ring, sector)`.
    ///
    /// Returns the landing height, or `None` (bed untouched) when the column is
    /// outside the grid or the amount is not a positive finite number. The
    /// landing cell takes the pour temperature outright.
    pub fn pour_water(
        &mut self,
        ring: usize,
        sector: usize,
        amount: f32,
        temperature: f32,
    ) -> Option<usize> {
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        let height = self.pour_landing_height(ring, sector)?;
        let cell = self.get_mut(ring, sector, height)?;
        cell.free_water += amount;
        cell.temperature = temperature;
        Some(height)
    }
}

// =============================================================================
// Value-style entry points
// =============================================================================

/// A fresh bed for `config`: every cell zeroed at ambient temperature.
pub fn create_empty_bed(config: &BrewConfig) -> CoffeeBed {
    CoffeeBed::empty(&config.geometry, config.ambient_temperature)
}

/// Copy of `bed` with `total_grounds` grams of dry grounds seeded bottom-up.
pub fn add_grounds_to_bed(bed: &CoffeeBed, total_grounds: f32, config: &BrewConfig) -> CoffeeBed {
    let mut next = bed.clone();
    next.add_grounds(total_grounds, config);
    next
}

/// Copy of `bed` with a pour applied, or `None` when the pour is rejected.
pub fn pour_water_into_cell(
    bed: &CoffeeBed,
    ring: usize,
    sector: usize,
    water_amount: f32,
    temperature: f32,
) -> Option<CoffeeBed> {
    let mut next = bed.clone();
    next.pour_water(ring, sector, water_amount, temperature)?;
    Some(next)
}
