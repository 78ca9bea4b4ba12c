//! Row-major 2x2 and 3x3 matrices. Inversion is total: a singular matrix
//! inverts to the zero matrix rather than panicking or returning `Option`,
//! matching the source library's contract that callers check `determinant`
//! themselves when they care.

use super::vector::{Vector2, Vector3};

/// A row-major 2x2 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix2 {
    /// First row.
    pub row0: Vector2,
    /// Second row.
    pub row1: Vector2,
}

impl Matrix2 {
    /// The 2x2 identity matrix.
    pub const IDENTITY: Self = Self {
        row0: Vector2(glam::DVec2::new(1.0, 0.0)),
        row1: Vector2(glam::DVec2::new(0.0, 1.0)),
    };

    /// Builds a matrix from its four entries in row-major order.
    pub fn new(m00: f64, m01: f64, m10: f64, m11: f64) -> Self {
        Self {
            row0: Vector2::new(m00, m01),
            row1: Vector2::new(m10, m11),
        }
    }

    /// `m00*m11 - m01*m10`.
    pub fn determinant(self) -> f64 {
        self.row0.x() * self.row1.y() - self.row0.y() * self.row1.x()
    }

    /// Matrix-vector product.
    pub fn mul_vec(self, v: Vector2) -> Vector2 {
        Vector2::new(self.row0.dot(v), self.row1.dot(v))
    }

    /// Inverts via the adjugate formula; returns the zero matrix when
    /// `determinant() == 0.0`.
    pub fn inverted(self) -> Self {
        let det = self.determinant();
        if det == 0.0 {
            return Self::new(0.0, 0.0, 0.0, 0.0);
        }
        let inv_det = 1.0 / det;
        Self::new(
            self.row1.y() * inv_det,
            -self.row0.y() * inv_det,
            -self.row1.x() * inv_det,
            self.row0.x() * inv_det,
        )
    }
}

/// A row-major 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    /// First row.
    pub row0: Vector3,
    /// Second row.
    pub row1: Vector3,
    /// Third row.
    pub row2: Vector3,
}

impl Matrix3 {
    /// The 3x3 identity matrix.
    pub const IDENTITY: Self = Self {
        row0: Vector3(glam::DVec3::new(1.0, 0.0, 0.0)),
        row1: Vector3(glam::DVec3::new(0.0, 1.0, 0.0)),
        row2: Vector3(glam::DVec3::new(0.0, 0.0, 1.0)),
    };

    /// Builds a matrix from its three rows.
    pub fn from_rows(row0: Vector3, row1: Vector3, row2: Vector3) -> Self {
        Self { row0, row1, row2 }
    }

    /// A diagonal matrix with the given entries.
    pub fn diag(x: f64, y: f64, z: f64) -> Self {
        Self::from_rows(
            Vector3::new(x, 0.0, 0.0),
            Vector3::new(0.0, y, 0.0),
            Vector3::new(0.0, 0.0, z),
        )
    }

    /// Determinant via cofactor expansion along the first row.
    pub fn determinant(self) -> f64 {
        let (a, b, c) = (self.row0.x(), self.row0.y(), self.row0.z());
        let (d, e, f) = (self.row1.x(), self.row1.y(), self.row1.z());
        let (g, h, i) = (self.row2.x(), self.row2.y(), self.row2.z());
        a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g)
    }

    /// Matrix-vector product.
    pub fn mul_vec(self, v: Vector3) -> Vector3 {
        Vector3::new(self.row0.dot(v), self.row1.dot(v), self.row2.dot(v))
    }

    /// Inverts via the adjugate formula; returns the zero matrix when
    /// `determinant() == 0.0`.
    pub fn inverted(self) -> Self {
        let det = self.determinant();
        if det == 0.0 {
            return Self::from_rows(Vector3::ZERO, Vector3::ZERO, Vector3::ZERO);
        }
        let (a, b, c) = (self.row0.x(), self.row0.y(), self.row0.z());
        let (d, e, f) = (self.row1.x(), self.row1.y(), self.row1.z());
        let (g, h, i) = (self.row2.x(), self.row2.y(), self.row2.z());
        let inv_det = 1.0 / det;
        // Adjugate transposed, scaled by 1/det.
        Self::from_rows(
            Vector3::new(e * i - f * h, c * h - b * i, b * f - c * e) * inv_det,
            Vector3::new(f * g - d * i, a * i - c * g, c * d - a * f) * inv_det,
            Vector3::new(d * h - e * g, b * g - a * h, a * e - b * d) * inv_det,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix2_inverse_roundtrip() {
        let m = Matrix2::new(4.0, 7.0, 2.0, 6.0);
        let inv = m.inverted();
        let v = Vector2::new(1.0, 2.0);
        let roundtrip = inv.mul_vec(m.mul_vec(v));
        assert!((roundtrip.x() - v.x()).abs() < 1e-9);
        assert!((roundtrip.y() - v.y()).abs() < 1e-9);
    }

    #[test]
    fn matrix2_singular_inverts_to_zero() {
        let m = Matrix2::new(1.0, 2.0, 2.0, 4.0);
        assert_eq!(m.determinant(), 0.0);
        assert_eq!(m.inverted(), Matrix2::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn matrix3_identity_inverts_to_itself() {
        assert_eq!(Matrix3::IDENTITY.inverted(), Matrix3::IDENTITY);
    }

    #[test]
    fn matrix3_singular_inverts_to_zero() {
        let m = Matrix3::from_rows(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(2.0, 4.0, 6.0),
            Vector3::new(1.0, 0.0, 1.0),
        );
        assert_eq!(m.determinant(), 0.0);
        let zero = Matrix3::from_rows(Vector3::ZERO, Vector3::ZERO, Vector3::ZERO);
        assert_eq!(m.inverted(), zero);
    }
}
