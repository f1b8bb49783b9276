use glam::DVec3;

use crate::error::ConfigError;
use crate::geo::{normalize_lat, SpatialPoint};
use crate::grid::{CellRange, GridStore, LonLatBox};
use crate::sphere::extreme_latitude;

/// Longitude/latitude bin sizes for the spatial index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    bin_size_x: u32,
    bin_size_y: u32,
}

impl IndexConfig {
    /// Bin sizes in degrees; they must divide 360 and 180 evenly
    pub fn new(bin_size_x: u32, bin_size_y: u32) -> Result<Self, ConfigError> {
        if bin_size_x == 0 || 360 % bin_size_x != 0 {
            return Err(ConfigError::LonBinSize(bin_size_x));
        }
        if bin_size_y == 0 || 180 % bin_size_y != 0 {
            return Err(ConfigError::LatBinSize(bin_size_y));
        }
        Ok(Self { bin_size_x, bin_size_y })
    }

    #[inline(always)]
    pub fn bins_x(&self) -> i32 {
        (360 / self.bin_size_x) as i32
    }

    #[inline(always)]
    pub fn bins_y(&self) -> i32 {
        (180 / self.bin_size_y) as i32
    }

    /// Unwrapped longitude bin; callers fold it modulo `bins_x`
    #[inline(always)]
    fn bin_x(&self, lon: f64) -> i32 {
        ((lon + 180.0) / self.bin_size_x as f64).floor() as i32
    }

    #[inline(always)]
    fn bin_y(&self, lat: f64) -> i32 {
        ((normalize_lat(lat)) / self.bin_size_y as f64).floor() as i32
    }

    /// Every bin a lon/lat box touches, longitude folded and latitude clamped
    fn bins_for_box(&self, b: &LonLatBox) -> impl Iterator<Item = (i32, i32)> {
        let bins_x = self.bins_x();
        let x0 = self.bin_x(b.lon_min);
        // A box wider than the globe still only visits each column once
        let x1 = self.bin_x(b.lon_max).min(x0 + bins_x - 1);
        let y0 = self.bin_y(b.lat_min).clamp(0, self.bins_y() - 1);
        let y1 = self.bin_y(b.lat_max).clamp(0, self.bins_y() - 1);
        (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| (x.rem_euclid(bins_x), y)))
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            bin_size_x: 10,
            bin_size_y: 10,
        }
    }
}

/// Fixed lon/lat bins, each holding the range of grid cells that touch it.
///
/// Built in one pass for a given grid-index range and never updated in place;
/// a new extent means a new index.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    config: IndexConfig,
    grid_range: CellRange,
    /// Row-major, `y * bins_x + x`
    bins: Vec<Option<CellRange>>,
}

impl SpatialIndex {
    /// Index every live cell of `grid_range` into the bins its bounds span.
    pub fn build(store: &(impl GridStore + ?Sized), grid_range: CellRange, config: IndexConfig) -> Self {
        let mut index = Self {
            config,
            grid_range,
            bins: vec![None; (config.bins_x() * config.bins_y()) as usize],
        };

        for (i, j) in grid_range.iter() {
            if store.is_dead(i, j) {
                continue;
            }
            let Some(cell) = store.cell(i, j) else {
                continue;
            };
            for (x, y) in config.bins_for_box(&cell.bounds) {
                let slot = &mut index.bins[(y * config.bins_x() + x) as usize];
                slot.get_or_insert_with(CellRange::empty).absorb_point(i, j);
            }
        }

        index
    }

    pub fn config(&self) -> IndexConfig {
        self.config
    }

    /// Grid-index range this index was built over
    pub fn grid_range(&self) -> CellRange {
        self.grid_range
    }

    /// Cells recorded for bin `(x, y)`
    #[inline(always)]
    pub fn bin(&self, x: i32, y: i32) -> Option<&CellRange> {
        if !(0..self.config.bins_x()).contains(&x) || !(0..self.config.bins_y()).contains(&y) {
            return None;
        }
        self.bins[(y * self.config.bins_x() + x) as usize].as_ref()
    }

    /// Number of bins holding at least one cell
    pub fn populated_bins(&self) -> usize {
        self.bins.iter().filter(|b| b.is_some()).count()
    }

    /// Candidate cells a great-circle segment might cross, or `None` when no
    /// bin under its bounding box holds any cell.
    pub fn cell_range_for_line(
        &self,
        a: SpatialPoint,
        b: SpatialPoint,
        va: DVec3,
        vb: DVec3,
    ) -> Option<CellRange> {
        let mut lon_min = a.lon.min(b.lon);
        let mut lon_max = a.lon.max(b.lon);
        if lon_max - lon_min > 180.0 {
            // Crosses the antimeridian: go the short way round
            (lon_min, lon_max) = (lon_max, lon_min + 360.0);
        }

        let mut bounds = LonLatBox {
            lon_min,
            lon_max,
            lat_min: a.lat.min(b.lat),
            lat_max: a.lat.max(b.lat),
        };
        if let Some(extreme) = extreme_latitude(va, vb) {
            bounds.lat_min = bounds.lat_min.min(extreme);
            bounds.lat_max = bounds.lat_max.max(extreme);
        }

        let mut range = CellRange::empty();
        for (x, y) in self.config.bins_for_box(&bounds) {
            if let Some(entry) = self.bin(x, y) {
                range.absorb_range(entry);
            }
        }
        (!range.is_empty()).then_some(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridSpec, LatLonGrid};
    use crate::map::RotatedPole;
    use crate::sphere::lonlat_to_vec3;

    fn two_by_two() -> LatLonGrid {
        let spec = GridSpec {
            columns: 2,
            rows: 2,
            x_min: 0.0,
            x_max: 20.0,
            y_min: -10.0,
            y_max: 10.0,
            pole_cutoff: 90.0,
        };
        LatLonGrid::new(spec, &RotatedPole::identity()).unwrap()
    }

    fn query(index: &SpatialIndex, a: (f64, f64), b: (f64, f64)) -> Option<CellRange> {
        index.cell_range_for_line(
            SpatialPoint::new(a.0, a.1),
            SpatialPoint::new(b.0, b.1),
            lonlat_to_vec3(a.0, a.1),
            lonlat_to_vec3(b.0, b.1),
        )
    }

    #[test]
    fn test_config_rejects_uneven_bins() {
        assert_eq!(IndexConfig::new(7, 10), Err(ConfigError::LonBinSize(7)));
        assert_eq!(IndexConfig::new(10, 0), Err(ConfigError::LatBinSize(0)));
        assert_eq!(IndexConfig::new(45, 45).unwrap().bins_y(), 4);
    }

    #[test]
    fn test_build_populates_bins() {
        let grid = two_by_two();
        let index = SpatialIndex::build(&grid, CellRange::new(0, 1, 0, 1), IndexConfig::default());
        // lon 0-10 / lat -10-0 is bin (18, 8), the south-west cell's home bin
        let home = index.bin(18, 8).expect("bin under the south-west cell");
        assert_eq!((home.min_x, home.min_y, home.max_y), (0, 0, 0));
        assert!(index.bin(0, 0).is_none());
        assert!(index.populated_bins() > 0);
    }

    #[test]
    fn test_segment_inside_one_bin() {
        let grid = two_by_two();
        let index = SpatialIndex::build(&grid, CellRange::new(0, 1, 0, 1), IndexConfig::default());
        let got = query(&index, (2.0, -8.0), (4.0, -6.0));
        assert_eq!(got, index.bin(18, 8).copied());
    }

    #[test]
    fn test_segment_across_cells() {
        let grid = two_by_two();
        let index = SpatialIndex::build(&grid, CellRange::new(0, 1, 0, 1), IndexConfig::default());
        assert_eq!(query(&index, (5.0, -5.0), (15.0, 5.0)), Some(CellRange::new(0, 1, 0, 1)));
    }

    #[test]
    fn test_segment_far_away_finds_nothing() {
        let grid = two_by_two();
        let index = SpatialIndex::build(&grid, CellRange::new(0, 1, 0, 1), IndexConfig::default());
        assert_eq!(query(&index, (100.0, 40.0), (110.0, 45.0)), None);
    }

    #[test]
    fn test_dead_cells_contribute_nothing() {
        let grid = LatLonGrid::new(GridSpec::global(10.0, -90.0, 90.0), &RotatedPole::identity()).unwrap();
        let index = SpatialIndex::build(&grid, CellRange::new(0, 35, 0, 17), IndexConfig::default());
        // Rows 0 and 17 touch the poles and are dead; no bin may reference them
        for y in 0..18 {
            for x in 0..36 {
                if let Some(r) = index.bin(x, y) {
                    assert!(r.min_y >= 1 && r.max_y <= 16, "bin ({x}, {y}) holds {r:?}");
                }
            }
        }
        assert!(index.bin(18, 9).is_some());
    }

    #[test]
    fn test_antimeridian_segment_wraps() {
        let grid = LatLonGrid::new(GridSpec::global(10.0, -80.0, 80.0), &RotatedPole::identity()).unwrap();
        let index = SpatialIndex::build(&grid, CellRange::new(0, 35, 0, 15), IndexConfig::default());
        let r = query(&index, (175.0, 1.0), (-175.0, 2.0)).unwrap();
        // Both edge columns are candidates, nothing from the middle of the map rows away
        assert_eq!((r.min_x, r.max_x), (0, 35));
        assert!(r.min_y >= 7 && r.max_y <= 9);
    }

    #[test]
    fn test_high_latitude_arc_extends_box() {
        let grid = LatLonGrid::new(GridSpec::global(10.0, -80.0, 80.0), &RotatedPole::identity()).unwrap();
        let index = SpatialIndex::build(&grid, CellRange::new(0, 35, 0, 15), IndexConfig::default());
        // Endpoints at 60N, but the arc between them passes near 73N
        let r = query(&index, (-60.0, 60.0), (60.0, 60.0)).unwrap();
        assert!(r.max_y >= 15);
    }
}
