//! Clipping great-circle segments to spherical quads.
//!
//! A quad is the intersection of four hemispheres, one per edge. Each edge
//! is applied in turn (south, east, north, west), the same way a 2D convex
//! clipper walks a polygon's edges, but with arcs instead of straight lines.

use glam::DVec3;

use crate::sphere::{arc_plane_intersection, Quad};

/// `normal · p` inside this band counts as lying on the edge's great circle
pub const CLIP_EPSILON: f64 = 1e-12;

/// Outcome of clipping against a single edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeClip {
    /// Wholly on the excluded side; the segment cannot touch the quad
    Reject,
    /// Crossing expected but the great circles do not meet (degenerate tangency)
    Neutral,
    /// Both endpoints already on the inward side
    Inside,
    /// An endpoint was moved onto the edge's great circle
    Crossed,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Out,
    On,
    In,
}

#[inline(always)]
fn side(normal: DVec3, p: DVec3) -> Side {
    let s = normal.dot(p);
    if s < -CLIP_EPSILON {
        Side::Out
    } else if s > CLIP_EPSILON {
        Side::In
    } else {
        Side::On
    }
}

/// Clip `(a, b)` against the hemisphere on the inward side of one edge.
pub fn clip_to_edge(a: DVec3, b: DVec3, normal: DVec3) -> (EdgeClip, DVec3, DVec3) {
    match (side(normal, a), side(normal, b)) {
        (Side::Out, Side::Out | Side::On) | (Side::On, Side::Out) => (EdgeClip::Reject, a, b),
        (Side::Out, Side::In) => match arc_plane_intersection(a, b, normal) {
            Some(x) => (EdgeClip::Crossed, x, b),
            None => (EdgeClip::Neutral, a, b),
        },
        (Side::In, Side::Out) => match arc_plane_intersection(a, b, normal) {
            Some(x) => (EdgeClip::Crossed, a, x),
            None => (EdgeClip::Neutral, a, b),
        },
        _ => (EdgeClip::Inside, a, b),
    }
}

/// Clip a great-circle segment to a quad.
///
/// Returns the surviving part, or `None` when the segment misses the quad.
///
/// At least one edge has to actually cut the segment. A segment that every
/// edge reports as inside or neutral never crossed a cell boundary and is
/// treated as a miss, the same as one grazing a bounding great circle.
pub fn clip_line_to_quad(a: DVec3, b: DVec3, quad: &Quad) -> Option<(DVec3, DVec3)> {
    let (mut a, mut b) = (a, b);
    let mut crossed = false;

    for normal in quad.normals {
        let (result, na, nb) = clip_to_edge(a, b, normal);
        match result {
            EdgeClip::Reject => return None,
            EdgeClip::Crossed => crossed = true,
            EdgeClip::Neutral | EdgeClip::Inside => {}
        }
        (a, b) = (na, nb);
    }

    crossed.then_some((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::{arc_length, lonlat_to_vec3, vec3_to_lonlat};
    use approx::assert_abs_diff_eq;

    fn cell(lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> Quad {
        Quad::new(
            lonlat_to_vec3(lon0, lat0),
            lonlat_to_vec3(lon1, lat0),
            lonlat_to_vec3(lon1, lat1),
            lonlat_to_vec3(lon0, lat1),
        )
    }

    #[test]
    fn test_segment_inside_without_crossing_fails() {
        let q = cell(0.0, 0.0, 10.0, 10.0);
        let a = lonlat_to_vec3(2.0, 2.0);
        let b = lonlat_to_vec3(8.0, 7.0);
        for normal in q.normals {
            assert_eq!(clip_to_edge(a, b, normal).0, EdgeClip::Inside);
        }
        assert_eq!(clip_line_to_quad(a, b, &q), None);
    }

    #[test]
    fn test_neutral_edges_without_crossing_fail() {
        let q = cell(0.0, 0.0, 10.0, 10.0);
        // Antipodal endpoints straddle every edge but span no unique great circle
        let a = lonlat_to_vec3(5.0, 5.0);
        let b = -a;
        for normal in q.normals {
            assert_eq!(clip_to_edge(a, b, normal), (EdgeClip::Neutral, a, b));
        }
        assert_eq!(clip_line_to_quad(a, b, &q), None);
    }

    #[test]
    fn test_segment_crossing_east_edge_is_cut() {
        let q = cell(0.0, -10.0, 10.0, 0.0);
        let a = lonlat_to_vec3(5.0, -5.0);
        let b = lonlat_to_vec3(15.0, 5.0);
        let (ca, cb) = clip_line_to_quad(a, b, &q).expect("segment enters the quad");
        assert_eq!(ca, a);
        let (lon, lat) = vec3_to_lonlat(cb);
        assert_abs_diff_eq!(lon, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lat, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reject_when_outside_one_edge() {
        let q = cell(0.0, 0.0, 10.0, 10.0);
        // Entirely west of the quad
        let a = lonlat_to_vec3(-8.0, 2.0);
        let b = lonlat_to_vec3(-3.0, 8.0);
        assert_eq!(clip_line_to_quad(a, b, &q), None);
        // Entirely north of the quad
        let a = lonlat_to_vec3(2.0, 20.0);
        let b = lonlat_to_vec3(8.0, 25.0);
        assert_eq!(clip_line_to_quad(a, b, &q), None);
    }

    #[test]
    fn test_touching_corner_only_is_rejected() {
        // Passes exactly through the shared corner (10, 0) of a neighbouring cell
        let q = cell(10.0, -10.0, 20.0, 0.0);
        let a = lonlat_to_vec3(5.0, -5.0);
        let b = lonlat_to_vec3(15.0, 5.0);
        assert_eq!(clip_line_to_quad(a, b, &q), None);
    }

    #[test]
    fn test_clip_never_expands() {
        let q = cell(0.0, 0.0, 10.0, 10.0);
        let cases = [
            ((-5.0, 5.0), (15.0, 5.0)),
            ((5.0, -5.0), (5.0, 15.0)),
            ((-3.0, -3.0), (12.0, 12.0)),
            ((2.0, 3.0), (8.0, 14.0)),
            ((-20.0, 4.0), (3.0, 6.0)),
        ];
        for ((lon0, lat0), (lon1, lat1)) in cases {
            let a = lonlat_to_vec3(lon0, lat0);
            let b = lonlat_to_vec3(lon1, lat1);
            let (ca, cb) = clip_line_to_quad(a, b, &q).expect("every case crosses the quad");
            assert!(arc_length(ca, cb) <= arc_length(a, b) + 1e-15);
            assert!(q.contains(ca, 1e-9) && q.contains(cb, 1e-9));
        }
    }

    #[test]
    fn test_edge_classification() {
        let q = cell(0.0, 0.0, 10.0, 10.0);
        let west = q.normals[3];
        let inside = lonlat_to_vec3(5.0, 5.0);
        let outside = lonlat_to_vec3(-5.0, 5.0);
        assert_eq!(clip_to_edge(inside, inside, west).0, EdgeClip::Inside);
        assert_eq!(clip_to_edge(outside, outside, west).0, EdgeClip::Reject);
        assert_eq!(clip_to_edge(outside, inside, west).0, EdgeClip::Crossed);
    }
}
