//! Barycentric coordinate frame of a 3D triangle (`Bcs3`), used both by the
//! rasterizer (to interpolate per-vertex attributes) and the BPCD grid's
//! narrow-phase ray test.

use super::geometry::{Plane, Ray, RaySeg};
use super::matrix::Matrix2;
use super::vector::{Vector2, Vector3};

/// A 2D barycentric coordinate pair `(alpha, beta)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BcsCoord {
    /// Weight of the first edge vector `u`.
    pub alpha: f64,
    /// Weight of the second edge vector `v`.
    pub beta: f64,
}

impl BcsCoord {
    /// True when the coordinate lies within the unit triangle:
    /// `alpha >= 0, beta >= 0, alpha + beta <= 1`.
    pub fn inside(self) -> bool {
        self.alpha >= 0.0 && self.beta >= 0.0 && self.alpha + self.beta <= 1.0
    }
}

/// Barycentric frame of a triangle `(o, u = o->p1, v = o->p2)`, with the
/// inverse Gram matrix cached so `project` is a single matrix-vector
/// multiply, and the supporting plane cached for ray/segment tests.
#[derive(Debug, Clone, Copy)]
pub struct Bcs3 {
    /// Triangle origin vertex.
    pub o: Vector3,
    /// First edge vector, `p1 - o`.
    pub u: Vector3,
    /// Second edge vector, `p2 - o`.
    pub v: Vector3,
    /// Cached inverse of `[[u.u, u.v], [u.v, v.v]]`.
    m: Matrix2,
    /// Supporting plane of the triangle.
    pub plane: Plane,
    /// False when the triangle is degenerate (zero area, `det == 0`).
    pub valid: bool,
}

impl Bcs3 {
    /// Builds the barycentric frame of triangle `(p0, p1, p2)`.
    pub fn new(p0: Vector3, p1: Vector3, p2: Vector3) -> Self {
        let u = p0.point(p1);
        let v = p0.point(p2);
        let gram = Matrix2::new(u.dot(u), u.dot(v), u.dot(v), v.dot(v));
        let det = gram.determinant();
        let m = gram.inverted();
        Self {
            o: p0,
            u,
            v,
            m,
            plane: Plane::from_points(p0, p1, p2),
            valid: det != 0.0,
        }
    }

    /// Projects an arbitrary point (assumed to already lie on the plane,
    /// or close to it) onto the barycentric frame.
    pub fn project_point(&self, p: Vector3) -> BcsCoord {
        let r = self.o.point(p);
        let rhs = Vector2::new(r.dot(self.u), r.dot(self.v));
        let coeffs = self.m.mul_vec(rhs);
        BcsCoord {
            alpha: coeffs.x(),
            beta: coeffs.y(),
        }
    }

    /// Reconstructs the world-space point for a barycentric coordinate.
    pub fn point_at(&self, coord: BcsCoord) -> Vector3 {
        self.o + self.u * coord.alpha + self.v * coord.beta
    }

    /// Projects an unbounded ray onto the triangle. Rejects back-facing
    /// hits: `d.n > 0` is required (the ray must face *toward* the
    /// triangle's front, i.e. opposite the segment convention below). This
    /// sign inversion relative to `project_rayseg` is deliberate, preserved
    /// verbatim from the source this module is modeled on, and separates
    /// the two call sites' front/back-face discrimination needs.
    pub fn project_ray(&self, ray: Ray) -> Option<BcsCoord> {
        let ddotn = ray.d.dot(self.plane.n);
        if ddotn <= 0.0 {
            return None;
        }
        let dist = self.plane.ray_dist(ray)?;
        if dist < 0.0 {
            return None;
        }
        let coord = self.project_point(ray.at(dist));
        if coord.inside() {
            Some(coord)
        } else {
            None
        }
    }

    /// Projects a bounded segment onto the triangle. Rejects when
    /// `d.n >= 0` (front-face, single-sided: the segment must approach
    /// from the side the normal points away from) and when the hit falls
    /// outside `[0, raySeg.dist]`.
    pub fn project_rayseg(&self, seg: RaySeg) -> Option<BcsCoord> {
        let ddotn = seg.d.dot(self.plane.n);
        if ddotn >= 0.0 {
            return None;
        }
        let ray = Ray { p: seg.p, d: seg.d };
        let dist = self.plane.ray_dist(ray)?;
        if dist <= 0.0 || dist > seg.dist {
            return None;
        }
        let coord = self.project_point(seg.at(dist));
        if coord.inside() {
            Some(coord)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_within_tolerance() {
        let o = Vector3::new(0.0, 0.0, 0.0);
        let p1 = Vector3::new(1.0, 0.0, 0.0);
        let p2 = Vector3::new(0.0, 1.0, 0.0);
        let bcs = Bcs3::new(o, p1, p2);
        assert!(bcs.valid);
        for &(alpha, beta) in &[(0.25, 0.25), (0.0, 1.0), (1.0, 0.0), (0.5, 0.3)] {
            let p = bcs.point_at(BcsCoord { alpha, beta });
            let coord = bcs.project_point(p);
            assert!((coord.alpha - alpha).abs() < 1e-9);
            assert!((coord.beta - beta).abs() < 1e-9);
        }
    }

    #[test]
    fn degenerate_triangle_is_invalid() {
        let o = Vector3::new(0.0, 0.0, 0.0);
        let p1 = Vector3::new(1.0, 0.0, 0.0);
        let p2 = Vector3::new(2.0, 0.0, 0.0);
        let bcs = Bcs3::new(o, p1, p2);
        assert!(!bcs.valid);
    }

    #[test]
    fn rayseg_requires_front_face_approach() {
        let bcs = Bcs3::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        // Plane normal is +Z; approaching from above with d pointing down
        // (d.n < 0) is the accepted, front-facing case for a segment.
        let hit = RaySeg::new(Vector3::new(0.2, 0.2, 1.0), Vector3::new(0.2, 0.2, -1.0));
        assert!(bcs.project_rayseg(hit).is_some());
        // Approaching from below (d.n > 0) is rejected for a segment.
        let miss = RaySeg::new(Vector3::new(0.2, 0.2, -1.0), Vector3::new(0.2, 0.2, 1.0));
        assert!(bcs.project_rayseg(miss).is_none());
    }
}
