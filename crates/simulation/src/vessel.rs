//! Mapping a point on the vessel's top-down view to a bed column.
//!
//! The host draws the vessel inside a 100×100 view box centred at (50, 50)
//! with the rim at radius 36. Sectors are counted clockwise starting from the
//! top of the drawing.

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::geometry::ConeGeometry;

/// Side of the square view box.
pub const VIEW_SIZE: f32 = 100.0;
/// Centre of the view box on both axes.
pub const VIEW_CENTER: f32 = 50.0;
/// Rim radius in view-box units.
pub const VESSEL_RADIUS: f32 = 36.0;

/// A point that landed inside the vessel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselHit {
    pub ring: usize,
    pub sector: usize,
    /// Position in view-box units.
    pub visual_x: f32,
    pub visual_y: f32,
}

impl VesselHit {
    /// Position relative to the vessel centre, in vessel radii.
    pub fn planar(&self) -> (f32, f32) {
        (
            (self.visual_x - VIEW_CENTER) / VESSEL_RADIUS,
            (self.visual_y - VIEW_CENTER) / VESSEL_RADIUS,
        )
    }
}

/// Map a point normalised to the vessel's bounding square (`[0, 1]` on both
/// axes, y pointing down) to the column under it. `None` outside the rim.
pub fn map_point_to_cell(norm_x: f32, norm_y: f32, geometry: &ConeGeometry) -> Option<VesselHit> {
    if !norm_x.is_finite() || !norm_y.is_finite() {
        return None;
    }
    let visual_x = norm_x * VIEW_SIZE;
    let visual_y = norm_y * VIEW_SIZE;
    let dx = visual_x - VIEW_CENTER;
    let dy = visual_y - VIEW_CENTER;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance > VESSEL_RADIUS {
        return None;
    }

    let rings = geometry.rings();
    let sectors = geometry.sectors();
    let ring = ((distance / VESSEL_RADIUS * rings as f32).floor() as usize).min(rings - 1);

    let angle = dy.atan2(dx) - PI / 2.0;
    let turn = ((angle + PI) / TAU + 1.0).rem_euclid(1.0);
    let sector = ((turn * sectors as f32).floor() as usize).min(sectors - 1);

    Some(VesselHit {
        ring,
        sector,
        visual_x,
        visual_y,
    })
}

/// Normalised point at the centre of column `(ring, sector)`; the inverse of
/// [`map_point_to_cell`] up to cell resolution.
pub fn cell_center_point(ring: usize, sector: usize, geometry: &ConeGeometry) -> (f32, f32) {
    let rings = geometry.rings() as f32;
    let sectors = geometry.sectors() as f32;
    let radius = (ring as f32 + 0.5) / rings * VESSEL_RADIUS;
    let turn = (sector as f32 + 0.5) / sectors;
    let angle = turn * TAU - PI / 2.0;
    let x = VIEW_CENTER + radius * angle.cos();
    let y = VIEW_CENTER + radius * angle.sin();
    (x / VIEW_SIZE, y / VIEW_SIZE)
}
