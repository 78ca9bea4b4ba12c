//! Fixed-dimension vector and matrix math, plus the geometric primitives
//! (rays, planes, AABBs, barycentric frames) built on top of them.

mod vector;
mod matrix;
mod geometry;
mod bcs;

pub use vector::{Vector2, Vector3, Vector4};
pub use matrix::{Matrix2, Matrix3};
pub use geometry::{Aabb, Plane, Ray, RaySeg, Side, Sphere};
pub use bcs::{Bcs3, BcsCoord};

/// Below this magnitude a scalar or vector component is treated as zero.
pub const TOL: f64 = 1e-8;
/// `TOL * TOL`, used wherever a squared-length comparison avoids a sqrt.
pub const TOL_SQ: f64 = 1e-16;
