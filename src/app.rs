use anyhow::Result;
use ratatui::style::Color;

use gridwarp::braille::BrailleTarget;
use gridwarp::data::{self, Layers, Polyline};
use gridwarp::geo::{SpatialPoint, WorldPoint, WorldRect, WORLD_PERIOD};
use gridwarp::grid::{GridSpec, GridStore, LatLonGrid};
use gridwarp::map::{
    DrawStats, DrawTarget, GridRenderer, Paint, RenderSettings, RotatedPole, Translated, Viewport,
};

/// Grid spacing of the viewer's mesh, in world degrees
const GRID_STEP: f64 = 5.0;

/// Where the north pole goes when the rotated frame is switched on
const ROTATED_POLE: SpatialPoint = SpatialPoint { lon: -40.0, lat: 50.0 };

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub renderer: GridRenderer,
    pub layers: Layers,
    pub graticule: Vec<Polyline>,
    pub projection: RotatedPole,
    pub grid: LatLonGrid,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Counters from the last painted frame
    pub last_stats: DrawStats,
}

impl App {
    pub fn new(width: usize, height: usize, layers: Layers) -> Result<Self> {
        let projection = RotatedPole::identity();
        let grid = build_grid(&projection)?;

        // Braille gives 2x4 resolution per character
        // Account for border (2 chars horizontal, 2 chars vertical plus status bar)
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);

        Ok(Self {
            viewport: Viewport::world(inner_width * 2, inner_height * 4),
            renderer: GridRenderer::new(RenderSettings::default()),
            layers,
            graticule: data::graticule(30.0),
            projection,
            grid,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            last_stats: DrawStats::default(),
        })
    }

    /// Update viewport size to the map area, in character cells
    pub fn resize_map(&mut self, cols: u16, rows: u16) {
        self.viewport.width = cols as usize * 2;
        self.viewport.height = rows as usize * 4;
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = screen_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = screen_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Back to the whole-world view, keeping data and layer toggles
    pub fn reset_view(&mut self) {
        self.viewport = Viewport::world(self.viewport.width, self.viewport.height);
    }

    pub fn toggle_coastlines(&mut self) {
        self.renderer.settings.show_coastlines = !self.renderer.settings.show_coastlines;
    }

    pub fn toggle_graticule(&mut self) {
        self.renderer.settings.show_graticule = !self.renderer.settings.show_graticule;
    }

    pub fn toggle_mesh(&mut self) {
        self.renderer.settings.show_mesh = !self.renderer.settings.show_mesh;
    }

    pub fn toggle_labels(&mut self) {
        self.renderer.settings.show_labels = !self.renderer.settings.show_labels;
    }

    pub fn toggle_preview(&mut self) {
        self.renderer.settings.preview = !self.renderer.settings.preview;
    }

    pub fn is_rotated(&self) -> bool {
        self.projection != RotatedPole::identity()
    }

    /// Swap between plate carrée and the rotated-pole frame
    pub fn toggle_rotated_pole(&mut self) -> Result<()> {
        let projection = if self.is_rotated() {
            RotatedPole::identity()
        } else {
            RotatedPole::new(ROTATED_POLE)
        };
        self.grid = build_grid(&projection)?;
        self.projection = projection;
        // Same index range, different cells
        self.renderer.invalidate();
        Ok(())
    }

    /// Handle mouse drag
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            // Drag moves the map with the cursor, so pan the other way
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (last_y as i32 - y as i32) * 4;
            self.viewport.pan(dx, dy);
        }
        self.last_mouse = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Mouse position in braille pixels inside the map area
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| screen_to_pixel(col, row))
    }

    /// World point and grid cell under the mouse
    pub fn cursor_cell(&self) -> Option<(WorldPoint, (i32, i32))> {
        let (px, py) = self.mouse_pixel_pos()?;
        let world = self.viewport.pixel_to_world(px, py);
        Some((world, self.grid.cell_containing(world)?))
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    /// Center in world coordinates
    pub fn center_coords(&self) -> String {
        format!("x {:.1} y {:.1}", self.viewport.center_x, self.viewport.center_y)
    }

    /// How many horizontal repeats of the world are on screen
    pub fn period_count(&self) -> usize {
        self.viewport.world_window().periods().count()
    }

    /// Cities worth labelling at the current zoom
    fn min_population(&self) -> u64 {
        match self.viewport.zoom {
            z if z > 15.0 => 0,
            z if z > 6.0 => 200_000,
            z if z > 2.0 => 1_000_000,
            _ => 10_000_000,
        }
    }

    /// Paint every enabled layer through the grid for the current viewport.
    pub fn paint(&mut self) -> BrailleTarget {
        let window = self.viewport.world_window();
        self.renderer.update_extent(&self.grid, &window);

        let mut target = BrailleTarget::new(self.viewport.clone());
        let settings = self.renderer.settings.clone();
        let min_population = self.min_population();

        if settings.show_mesh {
            self.paint_mesh(&mut target, window);
        }

        let Some(mut painter) = self.renderer.painter(&self.grid, &self.projection, window, &mut target) else {
            self.last_stats = DrawStats::default();
            return target;
        };

        if settings.show_graticule {
            let mut pass = painter.create();
            pass.set_paint(Paint::new(Color::Blue));
            for line in &self.graticule {
                pass.draw_spatial_polyline(line);
            }
            let stats = pass.stats();
            painter.absorb_stats(&stats);
        }

        if settings.show_coastlines {
            let mut pass = painter.create();
            pass.set_paint(Paint::new(Color::Cyan));
            for line in &self.layers.coastlines {
                pass.draw_spatial_polyline(line);
            }
            pass.set_paint(Paint::new(Color::Yellow));
            for line in &self.layers.borders {
                pass.draw_spatial_polyline(line);
            }
            let stats = pass.stats();
            painter.absorb_stats(&stats);
        }

        if settings.show_labels {
            painter.set_paint(Paint::new(Color::White));
            for city in self.layers.cities_above(min_population) {
                painter.draw_spatial_string(&city.name, city.position);
            }
        }

        self.last_stats = painter.stats();
        target
    }

    /// Cell edges of the indexed range, drawn straight in world space. Every
    /// edge lies on its own cell's boundary, so the grid clipper would never
    /// see it cross anything.
    fn paint_mesh(&self, target: &mut BrailleTarget, window: WorldRect) {
        let Some(range) = self.renderer.index().map(|i| i.grid_range()) else {
            return;
        };
        target.set_paint(Paint::new(Color::DarkGray));
        for k in window.periods() {
            let mut copy = Translated::new(&mut *target, k as f64 * WORLD_PERIOD, window);
            for (i, j) in range.iter() {
                let [sw, se, _, nw] = self.grid.world_corners(i, j);
                copy.draw_line(sw, se);
                copy.draw_line(sw, nw);
            }
        }
    }
}

/// Terminal cell to braille pixel, accounting for the 1-cell border
fn screen_to_pixel(col: u16, row: u16) -> (i32, i32) {
    (col.saturating_sub(1) as i32 * 2, row.saturating_sub(1) as i32 * 4)
}

/// The viewer's mesh: global, dead beyond 85° world latitude
fn build_grid(projection: &RotatedPole) -> Result<LatLonGrid> {
    let spec = GridSpec {
        pole_cutoff: 85.0,
        ..GridSpec::global(GRID_STEP, -90.0, 90.0)
    };
    Ok(LatLonGrid::new(spec, projection)?)
}
