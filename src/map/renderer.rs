use crate::geo::{SpatialPoint, WorldPoint, WorldRect, WORLD_PERIOD};
use crate::grid::{CellRange, GridStore};
use crate::map::bilinear::{blend_world, uninterpolate};
use crate::map::clip::clip_line_to_quad;
use crate::map::projection::Projection;
use crate::map::spatial::{IndexConfig, SpatialIndex};
use crate::map::target::{DrawTarget, Paint, Translated};

/// One piece of a path outline, in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(WorldPoint),
    LineTo(WorldPoint),
    /// Quadratic curve (control, end). Not rendered.
    QuadTo(WorldPoint, WorldPoint),
    /// Cubic curve (control 1, control 2, end). Not rendered.
    CubicTo(WorldPoint, WorldPoint, WorldPoint),
    Close,
}

/// Something the painter knows how to push through the grid
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line(WorldPoint, WorldPoint),
    Path(Vec<PathSegment>),
}

/// Render settings for map layers and the engine
#[derive(Clone, Debug)]
pub struct RenderSettings {
    pub index: IndexConfig,
    /// Stop each segment after its first drawn cell
    pub preview: bool,
    pub show_coastlines: bool,
    pub show_graticule: bool,
    pub show_mesh: bool,
    pub show_labels: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            preview: false,
            show_coastlines: true,
            show_graticule: true,
            show_mesh: false,
            show_labels: true,
        }
    }
}

/// Counters for what a draw did, including the paths that recover silently
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Straight segments handed to the rasterizer
    pub segments: usize,
    /// Per-cell sub-segments emitted in the base period
    pub drawn: usize,
    pub curves_skipped: usize,
    /// Segment scans cut short by a dead cell
    pub dead_stops: usize,
    /// Cells skipped because the inverse mapping went non-finite
    pub anomalies: usize,
}

impl DrawStats {
    pub fn merge(&mut self, other: &DrawStats) {
        self.segments += other.segments;
        self.drawn += other.drawn;
        self.curves_skipped += other.curves_skipped;
        self.dead_stops += other.dead_stops;
        self.anomalies += other.anomalies;
    }
}

/// Owns the spatial index for the current visible extent.
pub struct GridRenderer {
    pub settings: RenderSettings,
    index: Option<SpatialIndex>,
}

impl GridRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings, index: None }
    }

    pub fn index(&self) -> Option<&SpatialIndex> {
        self.index.as_ref()
    }

    /// Bring the index in line with the visible window.
    ///
    /// Returns `true` if it was rebuilt. Nothing happens while the grid-index
    /// range and bin sizes stay the same.
    pub fn update_extent(&mut self, store: &dyn GridStore, window: &WorldRect) -> bool {
        let range = clamped_range(store, window);
        let config = self.settings.index;
        if let Some(index) = &self.index {
            if index.grid_range() == range && index.config() == config {
                return false;
            }
        }

        let index = SpatialIndex::build(store, range, config);
        log::debug!(
            "rebuilt spatial index over cells x={}..={} y={}..={} ({} cells, {} populated bins)",
            range.min_x,
            range.max_x,
            range.min_y,
            range.max_y,
            range.len(),
            index.populated_bins()
        );
        self.index = Some(index);
        true
    }

    /// Drop the index; the next `update_extent` rebuilds unconditionally
    pub fn invalidate(&mut self) {
        self.index = None;
    }

    /// A painter over `target` for the window the index was last built for.
    ///
    /// `None` until `update_extent` has run once.
    pub fn painter<'a, T: DrawTarget + ?Sized>(
        &'a self,
        store: &'a dyn GridStore,
        projection: &'a dyn Projection,
        window: WorldRect,
        target: &'a mut T,
    ) -> Option<GridPainter<'a, T>> {
        let index = self.index.as_ref()?;
        Some(GridPainter {
            raster: Rasterizer {
                index,
                store,
                projection,
                preview: self.settings.preview,
            },
            window,
            target,
            stats: DrawStats::default(),
        })
    }
}

/// The store's index range for `window`, rows clamped to its valid range
fn clamped_range(store: &dyn GridStore, window: &WorldRect) -> CellRange {
    let mut range = store.index_range(window);
    let (lo, hi) = store.valid_grid_range();
    range.min_y = range.min_y.max(lo);
    range.max_y = range.max_y.min(hi);
    range
}

/// Read-only state every painter derived from one renderer shares
#[derive(Clone, Copy)]
struct Rasterizer<'a> {
    index: &'a SpatialIndex,
    store: &'a dyn GridStore,
    projection: &'a dyn Projection,
    preview: bool,
}

type Lines = Vec<(WorldPoint, WorldPoint)>;

impl Rasterizer<'_> {
    fn shape(&self, shape: &Shape, out: &mut Lines, stats: &mut DrawStats) {
        match shape {
            Shape::Line(a, b) => self.world_segment(*a, *b, out, stats),
            Shape::Path(segments) => self.path(segments, out, stats),
        }
    }

    fn path(&self, segments: &[PathSegment], out: &mut Lines, stats: &mut DrawStats) {
        let mut start: Option<WorldPoint> = None;
        let mut pen: Option<WorldPoint> = None;

        for segment in segments {
            match *segment {
                PathSegment::MoveTo(p) => {
                    start = Some(p);
                    pen = Some(p);
                }
                PathSegment::LineTo(p) => {
                    match pen {
                        Some(from) => self.world_segment(from, p, out, stats),
                        None => start = Some(p),
                    }
                    pen = Some(p);
                }
                PathSegment::QuadTo(_, end) | PathSegment::CubicTo(_, _, end) => {
                    log::warn!("skipping curved path segment ending at ({}, {})", end.x, end.y);
                    stats.curves_skipped += 1;
                    if start.is_none() {
                        start = Some(end);
                    }
                    pen = Some(end);
                }
                PathSegment::Close => {
                    if let (Some(from), Some(to)) = (pen, start) {
                        if from != to {
                            self.world_segment(from, to, out, stats);
                        }
                    }
                    pen = start;
                }
            }
        }
    }

    fn world_segment(&self, a: WorldPoint, b: WorldPoint, out: &mut Lines, stats: &mut DrawStats) {
        stats.segments += 1;
        let (Some(sa), Some(sb)) = (
            self.projection.world_to_spatial(a),
            self.projection.world_to_spatial(b),
        ) else {
            return;
        };
        self.segment(sa, sb, out, stats);
    }

    /// Rasterize one great-circle segment into base-period world lines.
    fn segment(&self, a: SpatialPoint, b: SpatialPoint, out: &mut Lines, stats: &mut DrawStats) {
        let va = self.projection.spatial_to_unit(a);
        let vb = self.projection.spatial_to_unit(b);
        let Some(range) = self.index.cell_range_for_line(a, b, va, vb) else {
            return;
        };

        for (i, j) in range.iter() {
            let cell = match self.store.cell(i, j) {
                Some(cell) if !cell.dead => cell,
                _ => {
                    log::trace!("dead cell ({i}, {j}) ends scan");
                    stats.dead_stops += 1;
                    break;
                }
            };

            let Some((ca, cb)) = clip_line_to_quad(va, vb, &cell.quad) else {
                continue;
            };
            let (Some((ua, wa)), Some((ub, wb))) = (uninterpolate(ca, &cell.quad), uninterpolate(cb, &cell.quad))
            else {
                stats.anomalies += 1;
                continue;
            };

            let corners = self.store.world_corners(i, j);
            out.push((blend_world(&corners, ua, wa), blend_world(&corners, ub, wb)));
            stats.drawn += 1;

            if self.preview {
                break;
            }
        }
    }

    /// Base-period world position of a spatial point, if a live cell in the
    /// index's range holds it
    fn locate(&self, p: SpatialPoint) -> Option<WorldPoint> {
        let v = self.projection.spatial_to_unit(p);
        let range = self.index.grid_range();

        for i in range.min_x..=range.max_x {
            let Some(column) = self.store.super_cell(i) else {
                continue;
            };
            if !column.contains(v) {
                continue;
            }
            for j in range.min_y..=range.max_y {
                let Some(cell) = self.store.cell(i, j) else {
                    continue;
                };
                if !cell.contains(v) {
                    continue;
                }
                let Some((u, w)) = uninterpolate(v, &cell.quad) else {
                    return None;
                };
                return Some(blend_world(&self.store.world_corners(i, j), u, w));
            }
        }
        None
    }
}

/// Decorator that routes shapes and text through the grid before they reach
/// the wrapped target.
///
/// Lines are rasterized once in the base period, then replayed into one
/// translated copy of the target per period the window overlaps.
pub struct GridPainter<'a, T: DrawTarget + ?Sized> {
    raster: Rasterizer<'a>,
    window: WorldRect,
    target: &'a mut T,
    stats: DrawStats,
}

impl<'a, T: DrawTarget + ?Sized> GridPainter<'a, T> {
    /// Child painter for a nested pass. It reborrows this painter's target
    /// and keeps its own stats.
    pub fn create(&mut self) -> GridPainter<'_, T> {
        GridPainter {
            raster: self.raster,
            window: self.window,
            target: &mut *self.target,
            stats: DrawStats::default(),
        }
    }

    pub fn window(&self) -> WorldRect {
        self.window
    }

    pub fn stats(&self) -> DrawStats {
        self.stats
    }

    /// Fold a child's counters into this painter's
    pub fn absorb_stats(&mut self, other: &DrawStats) {
        self.stats.merge(other);
    }

    pub fn draw_shape(&mut self, shape: &Shape) {
        let mut lines = Vec::new();
        self.raster.shape(shape, &mut lines, &mut self.stats);
        self.replay(&lines);
    }

    /// Great-circle polyline through spatial points
    pub fn draw_spatial_polyline(&mut self, points: &[SpatialPoint]) {
        let mut lines = Vec::new();
        for pair in points.windows(2) {
            self.stats.segments += 1;
            self.raster.segment(pair[0], pair[1], &mut lines, &mut self.stats);
        }
        self.replay(&lines);
    }

    pub fn draw_spatial_segment(&mut self, a: SpatialPoint, b: SpatialPoint) {
        self.draw_spatial_polyline(&[a, b]);
    }

    /// Every visible world position of `p`, one per period it shows up in
    pub fn spatial_to_worlds(&self, p: SpatialPoint) -> Vec<WorldPoint> {
        let Some(base) = self.raster.locate(p) else {
            return Vec::new();
        };
        self.window
            .periods()
            .map(|k| base.translate(k as f64 * WORLD_PERIOD))
            .filter(|w| self.window.contains(*w))
            .collect()
    }

    /// Label anchored at a spatial point, repeated in every period it's visible in
    pub fn draw_spatial_string(&mut self, text: &str, at: SpatialPoint) {
        for w in self.spatial_to_worlds(at) {
            self.target.draw_string(text, w);
        }
    }

    fn replay(&mut self, lines: &[(WorldPoint, WorldPoint)]) {
        if lines.is_empty() {
            return;
        }
        for k in self.window.periods() {
            let mut copy = Translated::new(&mut *self.target, k as f64 * WORLD_PERIOD, self.window);
            for &(a, b) in lines {
                copy.draw_line(a, b);
            }
        }
    }
}

impl<T: DrawTarget + ?Sized> DrawTarget for GridPainter<'_, T> {
    fn draw_line(&mut self, a: WorldPoint, b: WorldPoint) {
        self.draw_shape(&Shape::Line(a, b));
    }

    fn draw_string(&mut self, text: &str, at: WorldPoint) {
        if let Some(p) = self.raster.projection.world_to_spatial(at) {
            self.draw_spatial_string(text, p);
        }
    }

    fn set_paint(&mut self, paint: Paint) {
        self.target.set_paint(paint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridCell, GridSpec, LatLonGrid};
    use crate::map::target::RecordingTarget;
    use crate::map::RotatedPole;
    use crate::sphere::{lonlat_to_vec3, Pencil};
    use approx::assert_abs_diff_eq;
    use ratatui::style::Color;

    const GLOBE_WINDOW: WorldRect = WorldRect {
        min_x: -180.0,
        min_y: -90.0,
        max_x: 180.0,
        max_y: 90.0,
    };

    fn small_grid(columns: usize, rows: usize, x_max: f64, y_min: f64) -> LatLonGrid {
        let spec = GridSpec {
            columns,
            rows,
            x_min: 0.0,
            x_max,
            y_min,
            y_max: 10.0,
            pole_cutoff: 90.0,
        };
        LatLonGrid::new(spec, &RotatedPole::identity()).unwrap()
    }

    /// The 2x2 grid over lon [0, 20] x lat [-10, 10]
    fn two_by_two() -> LatLonGrid {
        small_grid(2, 2, 20.0, -10.0)
    }

    fn renderer_for(store: &dyn GridStore, window: &WorldRect, preview: bool) -> GridRenderer {
        let mut renderer = GridRenderer::new(RenderSettings {
            preview,
            ..RenderSettings::default()
        });
        assert!(renderer.update_extent(store, window));
        renderer
    }

    fn wp(x: f64, y: f64) -> WorldPoint {
        WorldPoint::new(x, y)
    }

    #[test]
    fn test_two_by_two_draws_two_subsegments() {
        let grid = two_by_two();
        let proj = RotatedPole::identity();
        let renderer = renderer_for(&grid, &GLOBE_WINDOW, false);
        let mut rec = RecordingTarget::new();

        let stats = {
            let mut painter = renderer.painter(&grid, &proj, GLOBE_WINDOW, &mut rec).unwrap();
            painter.draw_shape(&Shape::Line(wp(5.0, -5.0), wp(15.0, 5.0)));
            painter.stats()
        };

        assert_eq!(stats.segments, 1);
        assert_eq!(stats.drawn, 2);
        assert_eq!(rec.lines.len(), 2);

        // Both pieces meet at the shared corner (10, 0)
        let (_, end) = rec.lines[0];
        let (start, _) = rec.lines[1];
        assert_abs_diff_eq!(end.x, 10.0, epsilon = 1e-6);
        assert_abs_diff_eq!(end.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(start.x, 10.0, epsilon = 1e-6);
        assert_abs_diff_eq!(start.y, 0.0, epsilon = 1e-6);

        // Every clipped endpoint maps into its cell's unit square
        let (a, b) = (lonlat_to_vec3(5.0, -5.0), lonlat_to_vec3(15.0, 5.0));
        for (i, j) in [(0, 0), (1, 1)] {
            let quad = &grid.cell(i, j).unwrap().quad;
            let (ca, cb) = clip_line_to_quad(a, b, quad).unwrap();
            for p in [ca, cb] {
                let (u, v) = uninterpolate(p, quad).unwrap();
                assert!((-1e-9..=1.0 + 1e-9).contains(&u), "u = {u}");
                assert!((-1e-9..=1.0 + 1e-9).contains(&v), "v = {v}");
            }
        }
    }

    #[test]
    fn test_preview_stops_after_first_cell() {
        let grid = two_by_two();
        let proj = RotatedPole::identity();
        let renderer = renderer_for(&grid, &GLOBE_WINDOW, true);
        let mut rec = RecordingTarget::new();

        let mut painter = renderer.painter(&grid, &proj, GLOBE_WINDOW, &mut rec).unwrap();
        painter.draw_line(wp(5.0, -5.0), wp(15.0, 5.0));
        assert_eq!(painter.stats().drawn, 1);
    }

    #[test]
    fn test_dead_cell_stops_scan() {
        let mut grid = small_grid(3, 1, 30.0, 0.0);
        grid.set_dead(1, 0);
        let proj = RotatedPole::identity();
        let renderer = renderer_for(&grid, &GLOBE_WINDOW, false);
        let mut rec = RecordingTarget::new();

        let mut painter = renderer.painter(&grid, &proj, GLOBE_WINDOW, &mut rec).unwrap();
        painter.draw_shape(&Shape::Line(wp(5.0, 5.0), wp(25.0, 5.0)));
        let stats = painter.stats();
        assert_eq!(stats.drawn, 1);
        assert_eq!(stats.dead_stops, 1);
    }

    #[test]
    fn test_path_skips_curves_and_moves_pen() {
        let grid = two_by_two();
        let proj = RotatedPole::identity();
        let renderer = renderer_for(&grid, &GLOBE_WINDOW, false);
        let mut rec = RecordingTarget::new();

        let stats = {
            let mut painter = renderer.painter(&grid, &proj, GLOBE_WINDOW, &mut rec).unwrap();
            painter.draw_shape(&Shape::Path(vec![
                PathSegment::MoveTo(wp(5.0, -5.0)),
                PathSegment::CubicTo(wp(3.0, -2.0), wp(3.0, 2.0), wp(5.0, 5.0)),
                PathSegment::LineTo(wp(15.0, 5.0)),
                PathSegment::Close,
            ]));
            painter.stats()
        };

        assert_eq!(stats.curves_skipped, 1);
        assert_eq!(stats.segments, 2);
        // Each straight segment crosses into a second cell
        assert_eq!(stats.drawn, 4);
        assert_eq!(rec.lines.len(), 4);
        // The first drawn line starts where the curve ended
        assert_abs_diff_eq!(rec.lines[0].0.x, 5.0, epsilon = 1e-6);
        // Rows are not great circles, so y only lands near the input
        assert_abs_diff_eq!(rec.lines[0].0.y, 5.0, epsilon = 0.1);
        // Close heads back to the move-to point; its south-west piece ends there
        assert_abs_diff_eq!(rec.lines[2].1.x, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(rec.lines[2].1.y, -5.0, epsilon = 0.1);
    }

    #[test]
    fn test_lines_repeat_per_period() {
        let grid = LatLonGrid::new(GridSpec::global(10.0, -80.0, 80.0), &RotatedPole::identity()).unwrap();
        let proj = RotatedPole::identity();
        let window = WorldRect::new(-540.0, -90.0, 540.0, 90.0);
        let renderer = renderer_for(&grid, &window, false);
        let mut rec = RecordingTarget::new();

        let mut painter = renderer.painter(&grid, &proj, window, &mut rec).unwrap();
        painter.draw_spatial_segment(SpatialPoint::new(5.0, 5.0), SpatialPoint::new(15.0, 5.0));
        assert_eq!(painter.stats().drawn, 2);
        // Two pieces, replayed once per period
        assert_eq!(rec.lines.len(), 6);
        let xs: Vec<f64> = rec.lines.iter().map(|(a, _)| a.x).collect();
        assert_abs_diff_eq!(xs[0], -355.0, epsilon = 1e-6);
        assert_abs_diff_eq!(xs[2] - xs[0], 360.0, epsilon = 1e-9);
        assert_abs_diff_eq!(xs[4] - xs[2], 360.0, epsilon = 1e-9);
        assert_abs_diff_eq!(xs[3] - xs[1], 360.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reverse_lookup_period_count() {
        let grid = LatLonGrid::new(GridSpec::global(10.0, -80.0, 80.0), &RotatedPole::identity()).unwrap();
        let proj = RotatedPole::identity();
        let mut rec = RecordingTarget::new();

        let wide = WorldRect::new(-540.0, -90.0, 540.0, 90.0);
        let renderer = renderer_for(&grid, &wide, false);
        let painter = renderer.painter(&grid, &proj, wide, &mut rec).unwrap();
        let hits = painter.spatial_to_worlds(SpatialPoint::new(5.0, 5.0));
        assert_eq!(hits.len(), 3);
        assert_abs_diff_eq!(hits[1].x, 5.0, epsilon = 1e-9);

        let narrow = WorldRect::new(-100.0, -50.0, 100.0, 50.0);
        let renderer = renderer_for(&grid, &narrow, false);
        let painter = renderer.painter(&grid, &proj, narrow, &mut rec).unwrap();
        assert!(painter.spatial_to_worlds(SpatialPoint::new(150.0, 5.0)).is_empty());
        assert_eq!(painter.spatial_to_worlds(SpatialPoint::new(5.0, 5.0)).len(), 1);
    }

    #[test]
    fn test_labels_and_paint_pass_through() {
        let grid = LatLonGrid::new(GridSpec::global(10.0, -80.0, 80.0), &RotatedPole::identity()).unwrap();
        let proj = RotatedPole::identity();
        let renderer = renderer_for(&grid, &GLOBE_WINDOW, false);
        let mut rec = RecordingTarget::new();
        {
            let mut painter = renderer.painter(&grid, &proj, GLOBE_WINDOW, &mut rec).unwrap();
            painter.set_paint(Paint::new(Color::Yellow));
            let mut child = painter.create();
            child.draw_spatial_string("Here", SpatialPoint::new(-45.0, 30.0));
        }
        assert_eq!(rec.paint, Paint::new(Color::Yellow));
        assert_eq!(rec.strings.len(), 1);
        assert_abs_diff_eq!(rec.strings[0].1.x, -45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_update_extent_rebuilds_only_on_change() {
        let grid = LatLonGrid::new(GridSpec::global(10.0, -80.0, 80.0), &RotatedPole::identity()).unwrap();
        let mut renderer = GridRenderer::new(RenderSettings::default());
        assert!(renderer.painter(&grid, &RotatedPole::identity(), GLOBE_WINDOW, &mut RecordingTarget::new()).is_none());

        let window = WorldRect::new(-20.0, -10.0, 20.0, 10.0);
        assert!(renderer.update_extent(&grid, &window));
        assert!(!renderer.update_extent(&grid, &window));
        // Same cells, slightly shifted window
        assert!(!renderer.update_extent(&grid, &WorldRect::new(-15.0, -5.0, 25.0, 15.0)));
        assert!(renderer.update_extent(&grid, &WorldRect::new(-60.0, -10.0, 20.0, 10.0)));

        renderer.settings.index = IndexConfig::new(20, 20).unwrap();
        assert!(renderer.update_extent(&grid, &WorldRect::new(-60.0, -10.0, 20.0, 10.0)));
    }

    /// Wraps a grid and hands out one cell whose west-east pencil has no axis
    struct BrokenPencil {
        grid: LatLonGrid,
        broken: GridCell,
    }

    impl BrokenPencil {
        fn new(grid: LatLonGrid, i: i32, j: i32) -> Self {
            let mut broken = grid.cell(i, j).unwrap().clone();
            let west = broken.quad.normals[3];
            broken.quad.west_east = Pencil::new(west, west);
            Self { grid, broken }
        }
    }

    impl GridStore for BrokenPencil {
        fn columns(&self) -> i32 {
            self.grid.columns()
        }

        fn cell(&self, i: i32, j: i32) -> Option<&GridCell> {
            if (i, j) == (self.broken.i, self.broken.j) {
                Some(&self.broken)
            } else {
                self.grid.cell(i, j)
            }
        }

        fn world_vertex(&self, i: i32, j: i32) -> WorldPoint {
            self.grid.world_vertex(i, j)
        }

        fn cell_containing(&self, p: WorldPoint) -> Option<(i32, i32)> {
            self.grid.cell_containing(p)
        }

        fn super_cell(&self, i: i32) -> Option<&GridCell> {
            self.grid.super_cell(i)
        }

        fn valid_grid_range(&self) -> (i32, i32) {
            self.grid.valid_grid_range()
        }

        fn index_range(&self, window: &WorldRect) -> CellRange {
            self.grid.index_range(window)
        }
    }

    #[test]
    fn test_non_finite_inverse_skips_cell_and_keeps_scanning() {
        let store = BrokenPencil::new(small_grid(2, 1, 20.0, 0.0), 0, 0);
        let proj = RotatedPole::identity();
        let renderer = renderer_for(&store, &GLOBE_WINDOW, false);
        let mut rec = RecordingTarget::new();

        let stats = {
            let mut painter = renderer.painter(&store, &proj, GLOBE_WINDOW, &mut rec).unwrap();
            painter.draw_spatial_segment(SpatialPoint::new(5.0, 5.0), SpatialPoint::new(15.0, 5.0));
            painter.stats()
        };

        assert_eq!(stats.anomalies, 1);
        // The healthy cell after the broken one still draws
        assert_eq!(stats.drawn, 1);
        assert_eq!(rec.lines.len(), 1);
        let (a, b) = rec.lines[0];
        assert!(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite());
        assert_abs_diff_eq!(a.x, 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_stats_merge() {
        let mut a = DrawStats {
            segments: 1,
            drawn: 2,
            ..DrawStats::default()
        };
        a.merge(&DrawStats {
            segments: 3,
            anomalies: 1,
            ..DrawStats::default()
        });
        assert_eq!((a.segments, a.drawn, a.anomalies), (4, 2, 1));
    }
}
