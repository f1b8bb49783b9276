use glam::DVec3;

use super::{angle_between, rotate_about};

/// A one-parameter family of great circles sharing an axis, swept from one
/// plane normal to another.
///
/// `at(0)` is the starting plane and `at(1)` the ending plane. `param` is the
/// inverse: it returns the parameter of the family member passing through a
/// point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pencil {
    from: DVec3,
    axis: DVec3,
    span: f64,
}

impl Pencil {
    /// Sweep from plane normal `from` to plane normal `to`. Identical planes
    /// leave the axis undefined (NaN), which surfaces later as a NaN parameter.
    pub fn new(from: DVec3, to: DVec3) -> Self {
        Self {
            from,
            axis: from.cross(to).normalize(),
            span: angle_between(from, to),
        }
    }

    /// Total sweep angle in radians
    pub fn span(&self) -> f64 {
        self.span
    }

    /// Plane normal at fraction `t` of the sweep
    #[inline]
    pub fn at(&self, t: f64) -> DVec3 {
        rotate_about(self.from, self.axis, t * self.span)
    }

    /// Fraction of the sweep at which the member plane contains `p`.
    #[inline]
    pub fn param(&self, p: DVec3) -> f64 {
        // n(phi) = from * cos(phi) + sweep * sin(phi); solve p . n(phi) = 0 on (-pi/2, pi/2)
        let sweep = self.axis.cross(self.from);
        let phi = (-p.dot(self.from) / p.dot(sweep)).atan();
        phi / self.span
    }
}

/// A spherical quadrilateral bounded by four great-circle edges.
///
/// Corners are ordered `sw, se, ne, nw` (counter-clockwise seen from
/// outside); edge normals are ordered south, east, north, west and point
/// into the quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub corners: [DVec3; 4],
    pub normals: [DVec3; 4],
    /// West edge plane swept to the east edge plane
    pub west_east: Pencil,
    /// South edge plane swept to the north edge plane
    pub south_north: Pencil,
}

impl Quad {
    pub const SW: usize = 0;
    pub const SE: usize = 1;
    pub const NE: usize = 2;
    pub const NW: usize = 3;

    pub fn new(sw: DVec3, se: DVec3, ne: DVec3, nw: DVec3) -> Self {
        let corners = [sw, se, ne, nw];
        let normals = [
            sw.cross(se).normalize(),
            se.cross(ne).normalize(),
            ne.cross(nw).normalize(),
            nw.cross(sw).normalize(),
        ];
        // West and south inward normals already face across the quad;
        // the east and north ones are flipped so each pencil sweeps one way
        let west_east = Pencil::new(normals[3], -normals[1]);
        let south_north = Pencil::new(normals[0], -normals[2]);
        Self { corners, normals, west_east, south_north }
    }

    /// Ordered edges as (start corner, end corner, inward normal)
    pub fn edges(&self) -> impl Iterator<Item = (DVec3, DVec3, DVec3)> + '_ {
        (0..4).map(move |k| (self.corners[k], self.corners[(k + 1) % 4], self.normals[k]))
    }

    /// Inward-normal sign test, inclusive of the boundary within `tolerance`
    pub fn contains(&self, p: DVec3, tolerance: f64) -> bool {
        self.normals.iter().all(|n| n.dot(p) >= -tolerance)
    }

    /// Normalized sum of the corners
    pub fn centroid(&self) -> DVec3 {
        self.corners.iter().copied().sum::<DVec3>().normalize()
    }

    /// True when any edge normal failed to normalize (repeated or antipodal corners)
    pub fn is_degenerate(&self) -> bool {
        self.normals.iter().any(|n| !n.is_finite())
    }
}
