use rayon::prelude::*;

use crate::error::ConfigError;
use crate::geo::{wrap_world_x, WorldPoint, WorldRect, WORLD_PERIOD};
use crate::grid::{CellRange, GridCell, GridStore};
use crate::map::Projection;

/// Shape of a regular world-space grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub columns: usize,
    pub rows: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// Cells with any corner at |world y| >= this are dead
    pub pole_cutoff: f64,
}

impl GridSpec {
    /// A full-longitude grid with `step`-degree cells between the given latitudes
    pub fn global(step: f64, y_min: f64, y_max: f64) -> Self {
        let columns = (WORLD_PERIOD / step).round().max(1.0) as usize;
        let rows = ((y_max - y_min) / step).round().max(1.0) as usize;
        Self {
            columns,
            rows,
            x_min: -180.0,
            x_max: 180.0,
            y_min,
            y_max,
            pole_cutoff: 89.5,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid(self.columns, self.rows));
        }
        let bad_x = !(self.x_min < self.x_max) || self.x_min < -180.0 || self.x_max > 180.0;
        let bad_y = !(self.y_min < self.y_max) || self.y_min < -90.0 || self.y_max > 90.0;
        if bad_x || bad_y {
            return Err(ConfigError::BadExtent(self.x_min, self.x_max, self.y_min, self.y_max));
        }
        Ok(())
    }

    /// Grid covers the whole period, so columns wrap
    fn wraps(&self) -> bool {
        (self.x_max - self.x_min - WORLD_PERIOD).abs() < 1e-9
    }
}

/// Regular grid in world coordinates whose vertices are placed on the sphere
/// by a projection.
///
/// World lines of the grid are straight; the sphere sees a distorted mesh
/// whenever the projection is not the identity.
pub struct LatLonGrid {
    spec: GridSpec,
    dx: f64,
    dy: f64,
    /// Row-major, `j * columns + i`
    cells: Vec<GridCell>,
    /// One bound per column spanning its live rows
    super_cells: Vec<Option<GridCell>>,
}

impl LatLonGrid {
    /// Build every cell and column bound up front.
    pub fn new(spec: GridSpec, projection: &(dyn Projection + Sync)) -> Result<Self, ConfigError> {
        spec.validate()?;
        let dx = (spec.x_max - spec.x_min) / spec.columns as f64;
        let dy = (spec.y_max - spec.y_min) / spec.rows as f64;
        let (nx, ny) = (spec.columns as i32, spec.rows as i32);

        let vertex = |i: i32, j: i32| WorldPoint::new(spec.x_min + i as f64 * dx, spec.y_min + j as f64 * dy);
        let unit = |p: WorldPoint| projection.world_to_unit(p).unwrap_or(glam::DVec3::NAN);

        let cells: Vec<GridCell> = (0..spec.columns * spec.rows)
            .into_par_iter()
            .map(|idx| {
                let (i, j) = ((idx % spec.columns) as i32, (idx / spec.columns) as i32);
                let world = [vertex(i, j), vertex(i + 1, j), vertex(i + 1, j + 1), vertex(i, j + 1)];
                let dead = world.iter().any(|w| w.y.abs() >= spec.pole_cutoff);
                GridCell::new(i, j, world.map(unit), dead)
            })
            .collect();

        let super_cells = (0..nx)
            .map(|i| {
                let live: Vec<i32> = (0..ny).filter(|&j| !cells[(j * nx + i) as usize].dead).collect();
                let (&first, &last) = (live.first()?, live.last()?);
                let corners = [
                    vertex(i, first),
                    vertex(i + 1, first),
                    vertex(i + 1, last + 1),
                    vertex(i, last + 1),
                ];
                Some(GridCell::new(i, -1, corners.map(unit), false))
            })
            .collect();

        Ok(Self { spec, dx, dy, cells, super_cells })
    }

    pub fn rows(&self) -> i32 {
        self.spec.rows as i32
    }

    /// Flag a cell unusable, e.g. masked out by the caller. Indexes built
    /// afterwards skip it and line scans stop on it.
    pub fn set_dead(&mut self, i: i32, j: i32) {
        let Some(i) = self.column(i) else {
            return;
        };
        if (0..self.rows()).contains(&j) {
            let idx = (j * self.columns() + i) as usize;
            self.cells[idx].dead = true;
        }
    }

    /// Fold a column index into `[0, columns)` for wrapping grids
    #[inline(always)]
    fn column(&self, i: i32) -> Option<i32> {
        if self.spec.wraps() {
            Some(i.rem_euclid(self.columns()))
        } else if (0..self.columns()).contains(&i) {
            Some(i)
        } else {
            None
        }
    }
}

impl GridStore for LatLonGrid {
    fn columns(&self) -> i32 {
        self.spec.columns as i32
    }

    fn cell(&self, i: i32, j: i32) -> Option<&GridCell> {
        let i = self.column(i)?;
        if !(0..self.rows()).contains(&j) {
            return None;
        }
        self.cells.get((j * self.columns() + i) as usize)
    }

    fn world_vertex(&self, i: i32, j: i32) -> WorldPoint {
        WorldPoint::new(self.spec.x_min + i as f64 * self.dx, self.spec.y_min + j as f64 * self.dy)
    }

    fn cell_containing(&self, p: WorldPoint) -> Option<(i32, i32)> {
        let x = if self.spec.wraps() { wrap_world_x(p.x) } else { p.x };
        let i = ((x - self.spec.x_min) / self.dx).floor() as i32;
        let j = ((p.y - self.spec.y_min) / self.dy).floor() as i32;
        let i = self.column(i)?;
        (0..self.rows()).contains(&j).then_some((i, j))
    }

    fn super_cell(&self, i: i32) -> Option<&GridCell> {
        let i = self.column(i)?;
        self.super_cells.get(i as usize)?.as_ref()
    }

    fn valid_grid_range(&self) -> (i32, i32) {
        (0, self.rows() - 1)
    }

    fn index_range(&self, window: &WorldRect) -> CellRange {
        let full = (0, self.columns() - 1);
        let (min_x, max_x) = if self.spec.wraps() {
            if window.width() >= WORLD_PERIOD {
                full
            } else {
                let lo = ((wrap_world_x(window.min_x) - self.spec.x_min) / self.dx).floor() as i32;
                let hi = ((wrap_world_x(window.max_x) - self.spec.x_min) / self.dx).floor() as i32;
                // Window straddles the seam; both ends of the column range are visible
                if hi < lo {
                    full
                } else {
                    (lo.max(0), hi.min(full.1))
                }
            }
        } else {
            let lo = ((window.min_x - self.spec.x_min) / self.dx).floor() as i32;
            let hi = ((window.max_x - self.spec.x_min) / self.dx).floor() as i32;
            (lo.max(0), hi.min(full.1))
        };
        let min_y = ((window.min_y - self.spec.y_min) / self.dy).floor() as i32;
        let max_y = ((window.max_y - self.spec.y_min) / self.dy).floor() as i32;
        CellRange::new(min_x, max_x, min_y, max_y)
    }
}
