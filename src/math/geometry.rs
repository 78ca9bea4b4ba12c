//! Rays, segments, planes, axis-aligned boxes and bounding spheres.

use super::vector::Vector3;
use super::{TOL, TOL_SQ};

/// An infinite ray: an origin plus a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin of the ray.
    pub p: Vector3,
    /// Normalized direction. Always normalized by construction, which
    /// closes the "un-normalized caller" open question upstream: there is
    /// no way to build a `Ray` whose direction skipped normalization.
    pub d: Vector3,
}

impl Ray {
    /// Builds a ray, normalizing `d`.
    pub fn new(p: Vector3, d: Vector3) -> Self {
        Self {
            p,
            d: d.normalized(),
        }
    }

    /// Point along the ray at parameter `t`.
    pub fn at(self, t: f64) -> Vector3 {
        self.p + self.d * t
    }
}

/// A bounded ray: origin, direction, and a finite, non-negative distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySeg {
    /// Origin of the segment.
    pub p: Vector3,
    /// Normalized direction, or the zero vector for a degenerate segment.
    pub d: Vector3,
    /// Length of the segment. Zero for a degenerate (point) segment.
    pub dist: f64,
}

impl RaySeg {
    /// Builds a segment between two endpoints. Collapses to a degenerate,
    /// zero-length segment when the endpoints are within [`TOL`] of each
    /// other rather than producing a `NaN` direction.
    pub fn new(p: Vector3, p2: Vector3) -> Self {
        let delta = p.point(p2);
        let len_sq = delta.length_sq();
        if len_sq <= TOL_SQ {
            Self {
                p,
                d: Vector3::ZERO,
                dist: 0.0,
            }
        } else {
            let dist = len_sq.sqrt();
            Self {
                p,
                d: delta / dist,
                dist,
            }
        }
    }

    /// Builds a segment from a ray plus an explicit distance.
    pub fn from_ray(ray: Ray, dist: f64) -> Self {
        Self {
            p: ray.p,
            d: ray.d,
            dist,
        }
    }

    /// The far endpoint of the segment.
    pub fn end(self) -> Vector3 {
        self.p + self.d * self.dist
    }

    /// Point along the segment at parameter `t`.
    pub fn at(self, t: f64) -> Vector3 {
        self.p + self.d * t
    }
}

/// Result of testing a point against a [`Plane`] within its tolerance band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Strictly on the side the normal points toward.
    Front,
    /// Strictly on the side opposite the normal.
    Back,
    /// Within `tol` of the plane.
    On,
}

/// A plane represented by a unit normal and the signed distance of the
/// origin from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal.
    pub n: Vector3,
    /// `n . p0` for any point `p0` on the plane.
    pub dist: f64,
}

impl Plane {
    /// Builds a plane from a point and a (not necessarily normalized) normal.
    pub fn new(p0: Vector3, normal: Vector3) -> Self {
        let n = normal.normalized();
        Self { n, dist: n.dot(p0) }
    }

    /// Builds a plane through three points, CCW winding defining the normal.
    pub fn from_points(p0: Vector3, p1: Vector3, p2: Vector3) -> Self {
        let normal = p0.point(p1).cross(p0.point(p2));
        Self::new(p0, normal)
    }

    /// Signed distance of `p` from the plane.
    pub fn signed_distance(self, p: Vector3) -> f64 {
        self.n.dot(p) - self.dist
    }

    /// Three-valued side test with a `tol`-wide band around the plane.
    pub fn get_side(self, p: Vector3) -> Side {
        let d = self.signed_distance(p);
        if d > TOL {
            Side::Front
        } else if d < -TOL {
            Side::Back
        } else {
            Side::On
        }
    }

    /// Solves the line-plane intersection `p = ray.p + t*ray.d` for `t`.
    /// `None` when the ray direction is (near-)parallel to the plane.
    pub fn ray_dist(self, ray: Ray) -> Option<f64> {
        let denom = self.n.dot(ray.d);
        if denom.abs() < TOL {
            return None;
        }
        Some((self.dist - self.n.dot(ray.p)) / denom)
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Center of the box.
    pub center: Vector3,
    /// Half-extent along each axis.
    pub half_size: Vector3,
}

impl Aabb {
    /// Builds a box directly from its center and half-size.
    pub fn new(center: Vector3, half_size: Vector3) -> Self {
        Self { center, half_size }
    }

    /// Builds a box from its min and max corners.
    ///
    /// This implements the corrected behavior: `center = (min+max)/2`,
    /// `half_size = |max-min|/2`. The source this crate is modeled on has a
    /// self-referential bug here that ignores its own parameters; this is
    /// the intended fix, not a reproduction of that bug.
    pub fn from_extents(min: Vector3, max: Vector3) -> Self {
        let center = (min + max) * 0.5;
        let half_size = Vector3::new(
            (max.x() - min.x()).abs() * 0.5,
            (max.y() - min.y()).abs() * 0.5,
            (max.z() - min.z()).abs() * 0.5,
        );
        Self { center, half_size }
    }

    /// Lower corner.
    pub fn min_extent(self) -> Vector3 {
        self.center - self.half_size
    }

    /// Upper corner.
    pub fn max_extent(self) -> Vector3 {
        self.center + self.half_size
    }

    /// Full size along each axis.
    pub fn size(self) -> Vector3 {
        self.half_size * 2.0
    }

    /// True when `p` lies within the box (inclusive).
    pub fn inside(self, p: Vector3) -> bool {
        let min = self.min_extent();
        let max = self.max_extent();
        p.x() >= min.x()
            && p.x() <= max.x()
            && p.y() >= min.y()
            && p.y() <= max.y()
            && p.z() >= min.z()
            && p.z() <= max.z()
    }

    /// Slab-method ray clip. Returns the portion of the ray inside the box,
    /// or `None` if it misses entirely. `tMin` is clamped to 0 so the
    /// returned segment starts at the later of the ray origin or the slab
    /// entry point.
    pub fn clip(self, ray: Ray) -> Option<RaySeg> {
        let min = self.min_extent();
        let max = self.max_extent();
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;

        for axis in 0..3 {
            let (o, d, lo, hi) = match axis {
                0 => (ray.p.x(), ray.d.x(), min.x(), max.x()),
                1 => (ray.p.y(), ray.d.y(), min.y(), max.y()),
                _ => (ray.p.z(), ray.d.z(), min.z(), max.z()),
            };
            if d.abs() < TOL {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv_d = 1.0 / d;
            let mut t0 = (lo - o) * inv_d;
            let mut t1 = (hi - o) * inv_d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        let t_min = t_min.max(0.0);
        Some(RaySeg::from_ray(ray, t_max - t_min).with_origin(ray.at(t_min)))
    }

    /// Permissive union test used by the grid builder: true when any vertex
    /// lies inside the box, any triangle edge crosses the box, or the
    /// triangle's supporting plane passes through a box edge. Deliberately
    /// over-inclusive; `collidesWith` is the strict test.
    pub fn intersects(self, tri: (Vector3, Vector3, Vector3)) -> bool {
        let (a, b, c) = tri;
        if self.inside(a) || self.inside(b) || self.inside(c) {
            return true;
        }
        if self.segment_intersects(a, b) || self.segment_intersects(b, c) || self.segment_intersects(c, a) {
            return true;
        }
        // Triangle plane against the 12 edges of the box.
        let plane = Plane::from_points(a, b, c);
        if plane.n.is_near_zero() {
            return false;
        }
        let min = self.min_extent();
        let max = self.max_extent();
        let corners = [
            Vector3::new(min.x(), min.y(), min.z()),
            Vector3::new(max.x(), min.y(), min.z()),
            Vector3::new(min.x(), max.y(), min.z()),
            Vector3::new(max.x(), max.y(), min.z()),
            Vector3::new(min.x(), min.y(), max.z()),
            Vector3::new(max.x(), min.y(), max.z()),
            Vector3::new(min.x(), max.y(), max.z()),
            Vector3::new(max.x(), max.y(), max.z()),
        ];
        let box_edges: [(usize, usize); 12] = [
            (0, 1), (0, 2), (0, 4), (1, 3), (1, 5), (2, 3),
            (2, 6), (3, 7), (4, 5), (4, 6), (5, 7), (6, 7),
        ];
        for (i, j) in box_edges {
            let p0 = corners[i];
            let p1 = corners[j];
            let d0 = plane.signed_distance(p0);
            let d1 = plane.signed_distance(p1);
            if d0 * d1 > 0.0 {
                continue;
            }
            let denom = d0 - d1;
            if denom.abs() < TOL {
                continue;
            }
            let t = d0 / denom;
            let hit = p0 + (p1 - p0) * t;
            if self.inside(hit) && point_in_or_on_triangle(hit, a, b, c) {
                return true;
            }
        }
        false
    }

    fn segment_intersects(self, p0: Vector3, p1: Vector3) -> bool {
        let seg = RaySeg::new(p0, p1);
        if seg.d.is_near_zero() {
            return false;
        }
        match self.clip(Ray { p: p0, d: seg.d }) {
            Some(clipped) => clipped.dist >= 0.0 && clipped.at(0.0).point(p0).length_sq() <= seg.dist * seg.dist,
            None => false,
        }
    }

    /// Strict separating-axis test against a triangle: 3 box axes, the
    /// triangle normal, and the 9 box-edge x triangle-edge cross products.
    /// Axes whose length is below `tol` are skipped (degenerate edges).
    pub fn collides_with(self, tri: (Vector3, Vector3, Vector3)) -> bool {
        let (a, b, c) = tri;
        let box_axes = [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        let tri_edges = [a.point(b), b.point(c), c.point(a)];

        for axis in box_axes {
            if !self.overlaps_on_axis(axis, a, b, c) {
                return false;
            }
        }

        let normal = tri_edges[0].cross(tri_edges[1]);
        if !normal.is_near_zero() && !self.overlaps_on_axis(normal, a, b, c) {
            return false;
        }

        for box_axis in box_axes {
            for edge in tri_edges {
                let axis = box_axis.cross(edge);
                if axis.length_sq() < TOL_SQ {
                    continue;
                }
                if !self.overlaps_on_axis(axis, a, b, c) {
                    return false;
                }
            }
        }
        true
    }

    fn overlaps_on_axis(self, axis: Vector3, a: Vector3, b: Vector3, c: Vector3) -> bool {
        let mut sat = Sat::new(axis);
        sat.append(a);
        sat.append(b);
        sat.append(c);

        let min = self.min_extent();
        let max = self.max_extent();
        let corners = [
            Vector3::new(min.x(), min.y(), min.z()),
            Vector3::new(max.x(), min.y(), min.z()),
            Vector3::new(min.x(), max.y(), min.z()),
            Vector3::new(max.x(), max.y(), min.z()),
            Vector3::new(min.x(), min.y(), max.z()),
            Vector3::new(max.x(), min.y(), max.z()),
            Vector3::new(min.x(), max.y(), max.z()),
            Vector3::new(max.x(), max.y(), max.z()),
        ];
        let mut sat_box = Sat::new(axis);
        for corner in corners {
            sat_box.append(corner);
        }

        sat.overlaps(&sat_box)
    }
}

impl RaySeg {
    fn with_origin(self, p: Vector3) -> Self {
        Self { p, ..self }
    }
}

fn point_in_or_on_triangle(p: Vector3, a: Vector3, b: Vector3, c: Vector3) -> bool {
    let bcs = super::Bcs3::new(a, b, c);
    if !bcs.valid {
        return false;
    }
    let coord = bcs.project_point(p);
    coord.inside()
}

/// A separating-axis-theorem helper: projects a running set of points onto
/// an axis and tracks the min/max extent, then checks overlap against
/// another projection.
struct Sat {
    axis: Vector3,
    min: f64,
    max: f64,
    any: bool,
}

impl Sat {
    fn new(axis: Vector3) -> Self {
        Self {
            axis,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            any: false,
        }
    }

    fn append(&mut self, p: Vector3) {
        let proj = self.axis.dot(p);
        self.min = self.min.min(proj);
        self.max = self.max.max(proj);
        self.any = true;
    }

    fn overlaps(&self, other: &Sat) -> bool {
        if !self.any || !other.any {
            return true;
        }
        self.max >= other.min && other.max >= self.min
    }
}

/// A bounding sphere given its center and *squared* radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center of the sphere.
    pub center: Vector3,
    /// `radius^2`.
    pub radius_sq: f64,
}

impl Sphere {
    /// Builds a sphere from a center and radius.
    pub fn new(center: Vector3, radius: f64) -> Self {
        Self {
            center,
            radius_sq: radius * radius,
        }
    }

    /// Builds the sphere bounding three triangle vertices: centered at
    /// their centroid, radius is the farthest vertex distance.
    pub fn bounding_triangle(a: Vector3, b: Vector3, c: Vector3) -> Self {
        let centroid = (a + b + c) / 3.0;
        let r_sq = (a.point(centroid)).length_sq().max((b.point(centroid)).length_sq()).max((c.point(centroid)).length_sq());
        Self {
            center: centroid,
            radius_sq: r_sq,
        }
    }

    /// Conservative overlap test: `|c - c'|^2 < r^2 + r'^2`. Over-estimates
    /// overlap (more permissive than a tight sphere-sphere test) which is
    /// acceptable for a cull-in check that only needs to avoid false
    /// negatives.
    pub fn touches(self, other: Self) -> bool {
        self.center.point(other.center).length_sq() < self.radius_sq + other.radius_sq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_from_extents_is_centered() {
        let b = Aabb::from_extents(Vector3::new(-1.0, -2.0, -3.0), Vector3::new(3.0, 4.0, 5.0));
        assert_eq!(b.center, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(b.half_size, Vector3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn aabb_clip_ray_from_inside_starts_at_origin() {
        let b = Aabb::new(Vector3::ZERO, Vector3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));
        let clipped = b.clip(ray).expect("ray starts inside box");
        assert!(clipped.p.point(Vector3::ZERO).length_sq() < 1e-9);
    }

    #[test]
    fn aabb_clip_missing_ray_is_none() {
        let b = Aabb::new(Vector3::ZERO, Vector3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vector3::new(10.0, 10.0, 10.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(b.clip(ray).is_none());
    }

    #[test]
    fn plane_side_bands() {
        let plane = Plane::new(Vector3::ZERO, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(plane.get_side(Vector3::new(0.0, 0.0, 1.0)), Side::Front);
        assert_eq!(plane.get_side(Vector3::new(0.0, 0.0, -1.0)), Side::Back);
        assert_eq!(plane.get_side(Vector3::ZERO), Side::On);
    }

    #[test]
    fn sphere_touches_is_conservative() {
        let a = Sphere::new(Vector3::ZERO, 1.0);
        let b = Sphere::new(Vector3::new(1.9, 0.0, 0.0), 1.0);
        assert!(a.touches(b));
    }

    #[test]
    fn collides_with_separated_triangle_is_false() {
        let b = Aabb::new(Vector3::ZERO, Vector3::new(1.0, 1.0, 1.0));
        let tri = (
            Vector3::new(10.0, 10.0, 10.0),
            Vector3::new(11.0, 10.0, 10.0),
            Vector3::new(10.0, 11.0, 10.0),
        );
        assert!(!b.collides_with(tri));
    }

    #[test]
    fn collides_with_overlapping_triangle_is_true() {
        let b = Aabb::new(Vector3::ZERO, Vector3::new(1.0, 1.0, 1.0));
        let tri = (
            Vector3::new(-2.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(0.0, 2.0, 0.0),
        );
        assert!(b.collides_with(tri));
    }
}
