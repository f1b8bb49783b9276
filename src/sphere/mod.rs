//! Unit-sphere vector helpers.
//!
//! Points on the body are `glam::DVec3` directions from the center. Great
//! circles are represented by their plane normal.

mod quad;

pub use quad::{Pencil, Quad};

use glam::DVec3;

/// A surface location as a direction from the body's center
pub type UnitVector3 = DVec3;

/// Rotation axis of the body; "up" for latitude purposes
pub const UP: DVec3 = DVec3::Z;

/// Below this, a cross product is treated as zero (coincident or parallel planes)
pub const DEGENERATE_EPSILON: f64 = 1e-14;

/// Convert lon/lat (degrees) to a unit sphere vector.
#[inline(always)]
pub fn lonlat_to_vec3(lon: f64, lat: f64) -> DVec3 {
    let lon_rad = lon.to_radians();
    let lat_rad = lat.to_radians();
    DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    )
}

/// Convert a unit vector back to (lon, lat) in degrees.
#[inline(always)]
pub fn vec3_to_lonlat(v: DVec3) -> (f64, f64) {
    let lat = v.z.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = v.y.atan2(v.x).to_degrees();
    (lon, lat)
}

/// Rotate `v` about the unit `axis` by `angle` radians (Rodrigues).
#[inline]
pub fn rotate_about(v: DVec3, axis: DVec3, angle: f64) -> DVec3 {
    let (sin_a, cos_a) = angle.sin_cos();
    v * cos_a + axis.cross(v) * sin_a + axis * axis.dot(v) * (1.0 - cos_a)
}

/// Angle between two unit vectors, stable for tiny and near-antipodal separations.
#[inline]
pub fn angle_between(a: DVec3, b: DVec3) -> f64 {
    a.cross(b).length().atan2(a.dot(b))
}

/// Great-circle arc length between two unit vectors, in radians.
#[inline]
pub fn arc_length(a: DVec3, b: DVec3) -> f64 {
    angle_between(a, b)
}

/// Signed latitude (degrees) of the great-circle vertex lying strictly between
/// `a` and `b`, if the short arc passes over one.
///
/// The vertex is the point of maximum |latitude| on the arc's great circle.
/// It lies between the endpoints when they fall on opposite sides of the plane
/// through the circle's normal and the rotation axis.
pub fn extreme_latitude(a: DVec3, b: DVec3) -> Option<f64> {
    let n = a.cross(b);
    let len = n.length();
    if len < DEGENERATE_EPSILON {
        return None;
    }
    let n = n / len;

    let axis = n.cross(UP);
    if axis.length_squared() < DEGENERATE_EPSILON * DEGENERATE_EPSILON {
        // Circle is the equator; its latitude never leaves 0
        return None;
    }

    let side_a = axis.dot(a);
    let side_b = axis.dot(b);
    if (side_a < 0.0) == (side_b < 0.0) {
        return None;
    }

    let lat = n.z.abs().clamp(0.0, 1.0).acos().to_degrees();
    let north_vertex = UP - n * n.z;
    if north_vertex.dot(a + b) >= 0.0 {
        Some(lat)
    } else {
        Some(-lat)
    }
}

/// Latitude range (degrees) covered by the short arc from `a` to `b`.
pub fn arc_lat_range(a: DVec3, b: DVec3) -> (f64, f64) {
    let (_, lat_a) = vec3_to_lonlat(a);
    let (_, lat_b) = vec3_to_lonlat(b);
    let mut lo = lat_a.min(lat_b);
    let mut hi = lat_a.max(lat_b);
    if let Some(extreme) = extreme_latitude(a, b) {
        lo = lo.min(extreme);
        hi = hi.max(extreme);
    }
    (lo, hi)
}

/// Where the short arc `a`→`b` meets the great circle with normal `plane`.
/// Returns `None` when the two great circles coincide.
pub fn arc_plane_intersection(a: DVec3, b: DVec3, plane: DVec3) -> Option<DVec3> {
    let x = a.cross(b).cross(plane);
    let len = x.length();
    if len < DEGENERATE_EPSILON || !len.is_finite() {
        return None;
    }
    let x = x / len;
    // Of the two antipodal crossings, keep the one on the short arc's side
    if x.dot(a + b) < 0.0 {
        Some(-x)
    } else {
        Some(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lonlat_round_trip() {
        let (lon, lat) = vec3_to_lonlat(lonlat_to_vec3(-73.5, 40.7));
        assert_abs_diff_eq!(lon, -73.5, epsilon = 1e-12);
        assert_abs_diff_eq!(lat, 40.7, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_about_quarter_turn() {
        let v = rotate_about(DVec3::X, DVec3::Z, std::f64::consts::FRAC_PI_2);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_extreme_latitude_between_endpoints() {
        // Same latitude, 90° apart: the great circle bulges poleward in between
        let a = lonlat_to_vec3(-45.0, 45.0);
        let b = lonlat_to_vec3(45.0, 45.0);
        let lat = extreme_latitude(a, b).expect("vertex lies on the arc");
        assert!(lat > 45.0);
        // Southern hemisphere mirror
        let a = lonlat_to_vec3(-45.0, -45.0);
        let b = lonlat_to_vec3(45.0, -45.0);
        assert!(extreme_latitude(a, b).expect("vertex lies on the arc") < -45.0);
    }

    #[test]
    fn test_extreme_latitude_absent_for_monotonic_arc() {
        let a = lonlat_to_vec3(5.0, -5.0);
        let b = lonlat_to_vec3(15.0, 5.0);
        assert_eq!(extreme_latitude(a, b), None);
        // Meridian arcs never pass a vertex unless they cross a pole
        assert_eq!(extreme_latitude(lonlat_to_vec3(10.0, 0.0), lonlat_to_vec3(10.0, 30.0)), None);
    }

    #[test]
    fn test_arc_plane_intersection_equator() {
        let a = lonlat_to_vec3(5.0, -5.0);
        let b = lonlat_to_vec3(15.0, 5.0);
        let x = arc_plane_intersection(a, b, UP).expect("arc crosses the equator");
        let (lon, lat) = vec3_to_lonlat(x);
        assert_abs_diff_eq!(lat, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(lon, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_arc_plane_intersection_coincident() {
        let a = lonlat_to_vec3(0.0, 0.0);
        let b = lonlat_to_vec3(30.0, 0.0);
        assert!(arc_plane_intersection(a, b, UP).is_none());
    }
}
