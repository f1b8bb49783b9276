use glam::{DMat3, DVec3};

use crate::geo::{wrap_world_x, SpatialPoint, WorldPoint, WorldRect, WORLD_PERIOD};
use crate::sphere::{lonlat_to_vec3, vec3_to_lonlat};

/// Conversions between the map's world frame and the body's surface.
pub trait Projection {
    fn world_to_spatial(&self, p: WorldPoint) -> Option<SpatialPoint>;

    fn spatial_to_world(&self, p: SpatialPoint) -> Option<WorldPoint>;

    #[inline]
    fn spatial_to_unit(&self, p: SpatialPoint) -> DVec3 {
        lonlat_to_vec3(p.lon, p.lat)
    }

    #[inline]
    fn world_to_unit(&self, p: WorldPoint) -> Option<DVec3> {
        self.world_to_spatial(p).map(|s| self.spatial_to_unit(s))
    }
}

/// Rotated-pole lat/lon frame: world (x, y) are longitude/latitude measured
/// against a displaced north pole. A pole at (0°, 90°) is plate carrée.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedPole {
    north_pole: SpatialPoint,
    /// Rotated-frame vector -> geographic vector
    to_spatial: DMat3,
    to_world: DMat3,
}

impl RotatedPole {
    pub fn new(north_pole: SpatialPoint) -> Self {
        let to_spatial = DMat3::from_rotation_z(north_pole.lon.to_radians())
            * DMat3::from_rotation_y((90.0 - north_pole.lat).to_radians());
        Self {
            north_pole,
            to_spatial,
            to_world: to_spatial.transpose(),
        }
    }

    pub fn identity() -> Self {
        Self::new(SpatialPoint::new(0.0, 90.0))
    }

    pub fn north_pole(&self) -> SpatialPoint {
        self.north_pole
    }
}

impl Default for RotatedPole {
    fn default() -> Self {
        Self::identity()
    }
}

impl Projection for RotatedPole {
    fn world_to_spatial(&self, p: WorldPoint) -> Option<SpatialPoint> {
        if !(-90.0..=90.0).contains(&p.y) || !p.x.is_finite() {
            return None;
        }
        let v = self.to_spatial * lonlat_to_vec3(wrap_world_x(p.x), p.y);
        let (lon, lat) = vec3_to_lonlat(v);
        Some(SpatialPoint::new(lon, lat))
    }

    fn spatial_to_world(&self, p: SpatialPoint) -> Option<WorldPoint> {
        if !(-90.0..=90.0).contains(&p.lat) || !p.lon.is_finite() {
            return None;
        }
        let v = self.to_world * lonlat_to_vec3(p.lon, p.lat);
        let (x, y) = vec3_to_lonlat(v);
        Some(WorldPoint::new(x, y))
    }
}

/// Viewport representing the visible world window and zoom level
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center world x (kept in [-180, 180))
    pub center_x: f64,
    /// Center world y
    pub center_y: f64,
    /// Zoom level (1 = one full period across the canvas)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_x: f64, center_y: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_x,
            center_y,
            zoom,
            width,
            height,
        }
    }

    /// Create a world view (shows one whole period)
    pub fn world(width: usize, height: usize) -> Self {
        Self::new(0.0, 0.0, 1.0, width, height)
    }

    /// Pixels per world unit
    #[inline(always)]
    pub fn pixels_per_world(&self) -> f64 {
        self.zoom * self.width.max(1) as f64 / WORLD_PERIOD
    }

    /// Visible world window
    pub fn world_window(&self) -> WorldRect {
        let scale = self.pixels_per_world();
        let half_w = self.width as f64 / 2.0 / scale;
        let half_h = self.height as f64 / 2.0 / scale;
        WorldRect::new(
            self.center_x - half_w,
            self.center_y - half_h,
            self.center_x + half_w,
            self.center_y + half_h,
        )
    }

    /// Project a world coordinate to pixel coordinates (y grows downward)
    pub fn world_to_pixel(&self, p: WorldPoint) -> (i32, i32) {
        let scale = self.pixels_per_world();
        let px = (p.x - self.center_x) * scale + self.width as f64 / 2.0;
        let py = (self.center_y - p.y) * scale + self.height as f64 / 2.0;
        (px.floor() as i32, py.floor() as i32)
    }

    /// Unproject pixel coordinates back to world coordinates
    pub fn pixel_to_world(&self, px: i32, py: i32) -> WorldPoint {
        let scale = self.pixels_per_world();
        WorldPoint::new(
            (px as f64 - self.width as f64 / 2.0) / scale + self.center_x,
            self.center_y - (py as f64 - self.height as f64 / 2.0) / scale,
        )
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.pixels_per_world();
        // Whole-period shifts render identically, so keep x near the base period
        self.center_x = wrap_world_x(self.center_x + dx as f64 / scale);
        self.center_y = (self.center_y - dy as f64 / scale).clamp(-90.0, 90.0);
    }

    /// Zoom in by a factor
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(100.0);
    }

    /// Zoom out by a factor
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(0.25);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor keeping the world point under the pixel fixed
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let anchor = self.pixel_to_world(px, py);
        self.zoom = (self.zoom * factor).clamp(0.25, 100.0);

        // Re-center so the anchor maps back to the same pixel
        let scale = self.pixels_per_world();
        self.center_x = wrap_world_x(anchor.x - (px as f64 - self.width as f64 / 2.0) / scale);
        self.center_y = (anchor.y + (py as f64 - self.height as f64 / 2.0) / scale).clamp(-90.0, 90.0);
    }

    /// Check if a projected point is visible in the viewport
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10
            && px < self.width as i32 + 10
            && py >= -10
            && py < self.height as i32 + 10
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0
            && min_x < self.width as i32
            && max_y >= 0
            && min_y < self.height as i32
    }
}
