//! Grid cells and the grid data store interface.
//!
//! The engine only ever looks cells up; a store owns and caches them.

mod latlon;

pub use latlon::{GridSpec, LatLonGrid};

use glam::DVec3;

use crate::geo::{WorldPoint, WorldRect};
use crate::sphere::{arc_lat_range, vec3_to_lonlat, Quad, UP};

/// Tolerance for point-in-quad tests against inward normals
pub const CONTAINS_TOLERANCE: f64 = 1e-12;

/// Integer bounding box over grid indices.
///
/// Either empty (`min_x > max_x`) or the tightest box around everything
/// absorbed so far. Absorbing only ever grows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl CellRange {
    pub const fn empty() -> Self {
        Self {
            min_x: i32::MAX,
            max_x: i32::MIN,
            min_y: i32::MAX,
            max_y: i32::MIN,
        }
    }

    pub fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self { min_x, max_x, min_y, max_y }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }

    /// Grow to include grid index `(i, j)`
    #[inline]
    pub fn absorb_point(&mut self, i: i32, j: i32) {
        self.min_x = self.min_x.min(i);
        self.max_x = self.max_x.max(i);
        self.min_y = self.min_y.min(j);
        self.max_y = self.max_y.max(j);
    }

    /// Grow to include another range; an empty range changes nothing
    #[inline]
    pub fn absorb_range(&mut self, other: &CellRange) {
        if other.is_empty() {
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Indices in increasing row, then column order
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> {
        let (min_x, max_x) = (self.min_x, self.max_x);
        let rows = if self.is_empty() { 1..=0 } else { self.min_y..=self.max_y };
        rows.flat_map(move |j| (min_x..=max_x).map(move |i| (i, j)))
    }

    /// Number of cells covered
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.max_x - self.min_x + 1) as usize * (self.max_y - self.min_y + 1) as usize
    }
}

impl Default for CellRange {
    fn default() -> Self {
        Self::empty()
    }
}

/// Longitude/latitude bounding box in degrees. `lon_max` may exceed 180 when
/// the box crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLatBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl LonLatBox {
    pub const GLOBE: LonLatBox = LonLatBox {
        lon_min: -180.0,
        lon_max: 180.0,
        lat_min: -90.0,
        lat_max: 90.0,
    };

    /// Box around a quad's corners and great-circle edges
    pub fn around_quad(quad: &Quad) -> Self {
        let (lon0, _) = vec3_to_lonlat(quad.corners[0]);
        let mut lon_min = lon0;
        let mut lon_max = lon0;
        let mut lat_min = f64::MAX;
        let mut lat_max = f64::MIN;

        for (a, b, _) in quad.edges() {
            // Unwrap each corner to be continuous with the first one
            let (lon, _) = vec3_to_lonlat(a);
            let lon = lon0 + (lon - lon0 + 180.0).rem_euclid(360.0) - 180.0;
            lon_min = lon_min.min(lon);
            lon_max = lon_max.max(lon);

            let (lo, hi) = arc_lat_range(a, b);
            lat_min = lat_min.min(lo);
            lat_max = lat_max.max(hi);
        }

        Self { lon_min, lon_max, lat_min, lat_max }
    }
}

/// One quadrilateral patch of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub i: i32,
    pub j: i32,
    pub quad: Quad,
    /// Unusable (degenerate, or flagged by the store)
    pub dead: bool,
    /// One of the body's poles lies inside this cell
    pub contains_pole: bool,
    pub bounds: LonLatBox,
}

impl GridCell {
    /// Build a cell from corner vectors ordered `sw, se, ne, nw`.
    pub fn new(i: i32, j: i32, corners: [DVec3; 4], dead: bool) -> Self {
        let quad = Quad::new(corners[0], corners[1], corners[2], corners[3]);
        let degenerate = quad.is_degenerate();
        let contains_pole = !degenerate
            && (quad.contains(UP, CONTAINS_TOLERANCE) || quad.contains(-UP, CONTAINS_TOLERANCE));

        let bounds = if degenerate {
            LonLatBox::GLOBE
        } else if contains_pole {
            let inner = LonLatBox::around_quad(&quad);
            let north = quad.contains(UP, CONTAINS_TOLERANCE);
            LonLatBox {
                lon_min: -180.0,
                lon_max: 180.0,
                lat_min: if north { inner.lat_min } else { -90.0 },
                lat_max: if north { 90.0 } else { inner.lat_max },
            }
        } else {
            LonLatBox::around_quad(&quad)
        };

        Self {
            i,
            j,
            quad,
            dead: dead || degenerate,
            contains_pole,
            bounds,
        }
    }

    #[inline]
    pub fn contains(&self, p: DVec3) -> bool {
        !self.dead && self.quad.contains(p, CONTAINS_TOLERANCE)
    }
}

/// The grid data store, as seen by the rendering engine.
///
/// Column indices passed in are base-period indices as produced by
/// [`GridStore::index_range`]; `world_vertex` must accept `i + 1` / `j + 1`
/// for the far corners of the last column and row.
pub trait GridStore {
    /// Number of columns in one period
    fn columns(&self) -> i32;

    /// Cell at `(i, j)`, or `None` outside the grid
    fn cell(&self, i: i32, j: i32) -> Option<&GridCell>;

    fn is_dead(&self, i: i32, j: i32) -> bool {
        self.cell(i, j).map_or(true, |c| c.dead)
    }

    /// World coordinates of grid vertex `(i, j)` (the `sw` corner of cell `(i, j)`)
    fn world_vertex(&self, i: i32, j: i32) -> WorldPoint;

    /// Cell whose world footprint contains `p`
    fn cell_containing(&self, p: WorldPoint) -> Option<(i32, i32)>;

    /// Coarse bound over all rows of column `i`
    fn super_cell(&self, i: i32) -> Option<&GridCell>;

    /// Inclusive row range holding valid cells
    fn valid_grid_range(&self) -> (i32, i32);

    /// Grid indices covering a world window, with columns folded into the
    /// base period. Rows are not clamped.
    fn index_range(&self, window: &WorldRect) -> CellRange;

    /// World corners of cell `(i, j)` ordered `sw, se, ne, nw`
    fn world_corners(&self, i: i32, j: i32) -> [WorldPoint; 4] {
        [
            self.world_vertex(i, j),
            self.world_vertex(i + 1, j),
            self.world_vertex(i + 1, j + 1),
            self.world_vertex(i, j + 1),
        ]
    }
}
