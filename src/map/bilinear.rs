use glam::DVec3;

use crate::geo::WorldPoint;
use crate::sphere::Quad;

/// Quad-local `(u, v)` to a point on the sphere.
///
/// `u` sweeps the west edge's great circle to the east edge's, `v` the south
/// edge's to the north edge's; the point is where the two swept circles meet,
/// taken on the `nw` corner's side of the sphere.
pub fn interpolate(u: f64, v: f64, quad: &Quad) -> DVec3 {
    let meridian = quad.west_east.at(u);
    let parallel = quad.south_north.at(v);
    let p = meridian.cross(parallel).normalize();
    if p.dot(quad.corners[Quad::NW]) < 0.0 {
        -p
    } else {
        p
    }
}

/// A point inside the quad to quad-local `(u, v)`.
///
/// Returns `None` when either parameter comes out non-finite, which happens
/// for points sitting on a degenerate separating plane.
pub fn uninterpolate(p: DVec3, quad: &Quad) -> Option<(f64, f64)> {
    let u = quad.west_east.param(p);
    let v = quad.south_north.param(p);
    if u.is_finite() && v.is_finite() {
        Some((u, v))
    } else {
        log::warn!("uninterpolate produced non-finite (u, v) = ({u}, {v}) for {p:?}");
        None
    }
}

/// Bilinear blend of a cell's world corners (`sw, se, ne, nw`)
#[inline]
pub fn blend_world(corners: &[WorldPoint; 4], u: f64, v: f64) -> WorldPoint {
    let [sw, se, ne, nw] = corners;
    let w_sw = (1.0 - u) * (1.0 - v);
    let w_se = u * (1.0 - v);
    let w_ne = u * v;
    let w_nw = (1.0 - u) * v;
    WorldPoint::new(
        w_sw * sw.x + w_se * se.x + w_ne * ne.x + w_nw * nw.x,
        w_sw * sw.y + w_se * se.y + w_ne * ne.y + w_nw * nw.y,
    )
}
