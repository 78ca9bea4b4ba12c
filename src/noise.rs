//! Random direction sampling. Reimplements the reference Mersenne-Twister
//! sampling routines against `rand::Rng`, since no MT19937 crate exists in
//! this project's dependency corpus; callers get the same spherical
//! parameterization, just backed by any `Rng` implementation.

use std::f64::consts::PI;

use rand::Rng;

use crate::math::Vector3;

/// Draws a cosine-ish importance-sampled direction on the unit hemisphere
/// around `+Z`. Callers wanting a hemisphere around an arbitrary normal
/// should rotate the result, or — as the ambient occlusion task does —
/// simply rejection-sample full-sphere directions against the normal.
pub fn random_point_on_hemisphere<R: Rng + ?Sized>(rng: &mut R) -> Vector3 {
    let yaw = 2.0 * PI * rng.random::<f64>();
    let pitch = (rng.random::<f64>().sqrt()).asin();
    spherical_to_cartesian(yaw, pitch)
}

/// Draws a uniformly distributed direction on the unit sphere.
pub fn random_point_on_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vector3 {
    let yaw = 2.0 * PI * rng.random::<f64>();
    let pitch = (2.0 * rng.random::<f64>() - 1.0).acos();
    spherical_to_cartesian(yaw, pitch)
}

fn spherical_to_cartesian(yaw: f64, pitch: f64) -> Vector3 {
    let sin_pitch = pitch.sin();
    Vector3::new(sin_pitch * yaw.cos(), sin_pitch * yaw.sin(), pitch.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sphere_samples_are_unit_length() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..64 {
            let d = random_point_on_sphere(&mut rng);
            assert!((d.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn hemisphere_samples_are_unit_length() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..64 {
            let d = random_point_on_hemisphere(&mut rng);
            assert!((d.length() - 1.0).abs() < 1e-9);
        }
    }
}
