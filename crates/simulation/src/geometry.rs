//! Cone geometry of the brewing vessel.
//!
//! The bed is a grid of `rings × sectors × layers` wedge-shaped cells. The
//! vessel is a cone, narrow at the bottom (layer 0) and wide at the top, so not
//! every `(ring, layer)` pair is physically inside it. `ConeGeometry` owns the
//! per-layer ring profile and answers the "is this cell inside the cone?"
//! question that every other module asks before touching a cell.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of concentric rings, centre to edge.
pub const DEFAULT_RINGS: usize = 4;
/// Default number of angular sectors.
pub const DEFAULT_SECTORS: usize = 8;
/// Default number of vertical layers.
pub const DEFAULT_LAYERS: usize = 10;

/// Active ring count per layer for the default V60-style cone:
/// 1 ring for layers 0-1, 2 for 2-3, 3 for 4-6 and full width for 7-9.
pub const DEFAULT_CONE_PROFILE: [usize; DEFAULT_LAYERS] = [1, 1, 2, 2, 3, 3, 3, 4, 4, 4];

// =============================================================================
// ConfigError
// =============================================================================

/// Errors raised when validating a bed geometry or simulation configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The grid must have at least one ring, sector and layer.
    EmptyDimension(&'static str),
    /// A layer's active ring count is zero or exceeds the ring count.
    RingCountOutOfRange {
        layer: usize,
        active: usize,
        rings: usize,
    },
    /// The cone narrows going up: layer `layer` has fewer rings than the one below.
    ProfileNotMonotonic { layer: usize },
    /// The outermost ring is never active, so the grid has a dead ring.
    TopLayerNotFullWidth { active: usize, rings: usize },
    /// A tunable was non-finite or outside its allowed range.
    InvalidParameter { name: &'static str, value: f32 },
    /// The config text is not valid JSON for a `BrewConfig`.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyDimension(name) => write!(f, "bed dimension `{name}` must be > 0"),
            ConfigError::RingCountOutOfRange {
                layer,
                active,
                rings,
            } => write!(
                f,
                "layer {layer} has {active} active rings, expected 1..={rings}"
            ),
            ConfigError::ProfileNotMonotonic { layer } => {
                write!(f, "cone profile narrows at layer {layer}")
            }
            ConfigError::TopLayerNotFullWidth { active, rings } => write!(
                f,
                "top layer has {active} active rings but the bed has {rings}"
            ),
            ConfigError::InvalidParameter { name, value } => {
                write!(f, "parameter `{name}` is out of range, got {value}")
            }
            ConfigError::Parse(msg) => write!(f, "cannot parse config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// ConeGeometry
// =============================================================================

/// Grid dimensions plus the active-ring profile of the cone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConeGeometry {
    rings: usize,
    sectors: usize,
    profile: Vec<usize>,
}

impl Default for ConeGeometry {
    fn default() -> Self {
        Self {
            rings: DEFAULT_RINGS,
            sectors: DEFAULT_SECTORS,
            profile: DEFAULT_CONE_PROFILE.to_vec(),
        }
    }
}

impl ConeGeometry {
    /// Build a geometry from a per-layer active-ring profile.
    ///
    /// The layer count is `profile.len()`. The profile must be non-decreasing,
    /// every entry must lie in `1..=rings`, and the top layer must span all rings.
    pub fn new(rings: usize, sectors: usize, profile: Vec<usize>) -> Result<Self, ConfigError> {
        let geometry = Self {
            rings,
            sectors,
            profile,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rings == 0 {
            return Err(ConfigError::EmptyDimension("rings"));
        }
        if self.sectors == 0 {
            return Err(ConfigError::EmptyDimension("sectors"));
        }
        if self.profile.is_empty() {
            return Err(ConfigError::EmptyDimension("layers"));
        }
        for (layer, &active) in self.profile.iter().enumerate() {
            if active == 0 || active > self.rings {
                return Err(ConfigError::RingCountOutOfRange {
                    layer,
                    active,
                    rings: self.rings,
                });
            }
            if layer > 0 && active < self.profile[layer - 1] {
                return Err(ConfigError::ProfileNotMonotonic { layer });
            }
        }
        let top = self.profile[self.profile.len() - 1];
        if top != self.rings {
            return Err(ConfigError::TopLayerNotFullWidth {
                active: top,
                rings: self.rings,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn rings(&self) -> usize {
        self.rings
    }

    #[inline]
    pub fn sectors(&self) -> usize {
        self.sectors
    }

    #[inline]
    pub fn layers(&self) -> usize {
        self.profile.len()
    }

    /// Total number of cells in the grid, including those outside the cone.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rings * self.sectors * self.layers()
    }

    /// Storage index of `(ring, sector, height)`; columns are contiguous.
    #[inline]
    pub fn index(&self, ring: usize, sector: usize, height: usize) -> usize {
        (ring * self.sectors + sector) * self.layers() + height
    }

    /// How many rings exist at `height`. Heights above the top layer report the
    /// top layer's width.
    #[inline]
    pub fn active_rings_at_height(&self, height: usize) -> usize {
        let top = self.profile.len().saturating_sub(1);
        self.profile.get(height.min(top)).copied().unwrap_or(0)
    }

    /// Whether `(ring, height)` lies inside the cone. Always false for heights
    /// outside the grid.
    #[inline]
    pub fn is_cell_in_cone(&self, ring: usize, height: usize) -> bool {
        height < self.layers() && ring < self.active_rings_at_height(height)
    }

    /// Number of in-cone cells in one layer.
    #[inline]
    pub fn active_cells_at_height(&self, height: usize) -> usize {
        self.active_rings_at_height(height) * self.sectors
    }

    /// Rings that exist at both `a` and `b`: the cells that can exchange mass
    /// vertically between those layers.
    #[inline]
    pub fn shared_rings(&self, a: usize, b: usize) -> usize {
        self.active_rings_at_height(a)
            .min(self.active_rings_at_height(b))
    }

    /// Horizontal neighbours of `(ring, sector)` at `height`: the two adjacent
    /// sectors of the same ring (wrapping) and the same sector of the inner and
    /// outer ring when those are inside the cone.
    pub fn lateral_neighbors(
        &self,
        ring: usize,
        sector: usize,
        height: usize,
    ) -> ([(usize, usize); 4], usize) {
        let mut out = [(0, 0); 4];
        let mut count = 0;

        out[count] = (ring, (sector + self.sectors - 1) % self.sectors);
        count += 1;
        out[count] = (ring, (sector + 1) % self.sectors);
        count += 1;

        if ring > 0 && self.is_cell_in_cone(ring - 1, height) {
            out[count] = (ring - 1, sector);
            count += 1;
        }
        if ring + 1 < self.rings && self.is_cell_in_cone(ring + 1, height) {
            out[count] = (ring + 1, sector);
            count += 1;
        }

        (out, count)
    }
}
