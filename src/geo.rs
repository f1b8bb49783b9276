use std::ops::RangeInclusive;

/// Width of one repetition of the world x axis
pub const WORLD_PERIOD: f64 = 360.0;

/// Geographic (body-fixed) coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpatialPoint {
    pub lon: f64,
    pub lat: f64,
}

impl SpatialPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Point in the map's planar frame, periodic in x
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Shift horizontally by `dx` world units
    #[inline(always)]
    pub fn translate(self, dx: f64) -> Self {
        Self::new(self.x + dx, self.y)
    }
}

/// Axis-aligned world rectangle (the visible window, or a clip box)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl WorldRect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    #[inline(always)]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline(always)]
    pub fn contains(&self, p: WorldPoint) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Rough bounding box check, same spirit as the pixel-space visibility test
    pub fn segment_might_intersect(&self, a: WorldPoint, b: WorldPoint) -> bool {
        a.x.max(b.x) >= self.min_x
            && a.x.min(b.x) <= self.max_x
            && a.y.max(b.y) >= self.min_y
            && a.y.min(b.y) <= self.max_y
    }

    /// Periods this window overlaps. Period `k` covers x in [-180 + 360k, 180 + 360k).
    pub fn periods(&self) -> RangeInclusive<i64> {
        let first = ((self.min_x + 180.0) / WORLD_PERIOD).floor() as i64;
        let last = ((self.max_x + 180.0) / WORLD_PERIOD).ceil() as i64 - 1;
        first..=last.max(first)
    }
}

/// Normalize longitude from [-180, 180] to [0, 360) for grid indexing
#[inline(always)]
pub fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0)
}

/// Normalize latitude from [-90, 90] to [0, 180) for grid indexing
#[inline(always)]
pub fn normalize_lat(lat: f64) -> f64 {
    (lat + 90.0).clamp(0.0, 179.999)
}

/// Wrap a world x coordinate into the base period [-180, 180)
#[inline(always)]
pub fn wrap_world_x(x: f64) -> f64 {
    normalize_lon(x) - 180.0
}
