//! Vector2/3/4: thin wrappers over `glam`'s double-precision vector types that
//! layer on the tolerance-aware semantics (`tol`/`tol_sq`, zero-on-near-zero
//! normalization, `point`) the rest of the crate relies on.

use std::ops::{Add, Div, Mul, Neg, Sub};

use glam::{DVec2, DVec3, DVec4};

use super::{TOL, TOL_SQ};

macro_rules! vector_type {
    ($name:ident, $glam:ty, $dim:expr) => {
        /// A fixed-dimension floating point vector.
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name(pub $glam);

        impl $name {
            /// Builds a vector whose components are all zero.
            pub const ZERO: Self = Self(<$glam>::ZERO);

            /// Squared Euclidean length, avoids the square root in `length`.
            pub fn length_sq(self) -> f64 {
                self.0.length_squared()
            }

            /// Euclidean length.
            pub fn length(self) -> f64 {
                self.0.length()
            }

            /// Dot product.
            pub fn dot(self, other: Self) -> f64 {
                self.0.dot(other.0)
            }

            /// Normalizes the vector, returning the zero vector when the
            /// length is below [`TOL`] rather than producing `NaN`.
            pub fn normalized(self) -> Self {
                if self.length_sq() < TOL_SQ {
                    Self::ZERO
                } else {
                    Self(self.0 / self.length())
                }
            }

            /// Vector pointing from `self` to `other`.
            pub fn point(self, other: Self) -> Self {
                Self(other.0 - self.0)
            }

            /// True when every component is within [`TOL`] of zero.
            pub fn is_near_zero(self) -> bool {
                self.length_sq() < TOL_SQ
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }
        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }
        impl Mul<f64> for $name {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self {
                Self(self.0 * rhs)
            }
        }
        impl Div<f64> for $name {
            type Output = Self;
            fn div(self, rhs: f64) -> Self {
                Self(self.0 / rhs)
            }
        }
        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl From<$glam> for $name {
            fn from(v: $glam) -> Self {
                Self(v)
            }
        }

        #[allow(dead_code)]
        const _: usize = $dim;
    };
}

vector_type!(Vector2, DVec2, 2);
vector_type!(Vector3, DVec3, 3);
vector_type!(Vector4, DVec4, 4);

impl Vector2 {
    /// Builds a vector from its two components.
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }
    /// X component.
    pub fn x(self) -> f64 {
        self.0.x
    }
    /// Y component.
    pub fn y(self) -> f64 {
        self.0.y
    }
}

impl Vector3 {
    /// Builds a vector from its three components.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(DVec3::new(x, y, z))
    }
    /// X component.
    pub fn x(self) -> f64 {
        self.0.x
    }
    /// Y component.
    pub fn y(self) -> f64 {
        self.0.y
    }
    /// Z component.
    pub fn z(self) -> f64 {
        self.0.z
    }
    /// Cross product, defined only in three dimensions.
    pub fn cross(self, other: Self) -> Self {
        Self(self.0.cross(other.0))
    }
    /// Componentwise minimum.
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }
    /// Componentwise maximum.
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }
}

impl Vector4 {
    /// Builds a vector from its four components.
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self(DVec4::new(x, y, z, w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_below_tol_is_zero() {
        let v = Vector3::new(1e-10, 0.0, 0.0);
        assert_eq!(v.normalized(), Vector3::ZERO);
    }

    #[test]
    fn normalized_unit_length() {
        let v = Vector3::new(3.0, 4.0, 0.0).normalized();
        assert!((v.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn point_direction() {
        let a = Vector3::new(1.0, 0.0, 0.0);
        let b = Vector3::new(1.0, 1.0, 0.0);
        assert_eq!(a.point(b), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn cross_product_right_handed() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Vector3::new(0.0, 0.0, 1.0));
    }
}
