//! Configuration surface the solver recognizes. No CLI, environment
//! variables, or persisted binary state are read by the core; everything
//! is plain struct fields with `Default` matching the documented defaults.

use crate::color::Color;
use crate::math::Vector3;

/// Optional directional/ambient lighting layered on top of the always-on
/// ambient occlusion pass. `skyColor` alone (no sun) reproduces the AO-only
/// variant, which uses it as a uniform modulator.
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    /// Uniform ambient sky modulator.
    pub sky_color: Color,
    /// Directional "sun" color, combined with `sun_direction` to add a
    /// direct-lighting term. `None` disables the direct term entirely.
    pub sun: Option<SunLight>,
}

/// A single directional light.
#[derive(Debug, Clone, Copy)]
pub struct SunLight {
    /// Color/intensity of the directional light.
    pub color: Color,
    /// Direction the light travels *in* (points from the sun toward the
    /// scene); shadow rays are cast toward `-sun_direction`.
    pub direction: Vector3,
}

impl Default for Lighting {
    fn default() -> Self {
        Lighting {
            sky_color: Color::new(212, 250, 250),
            sun: None,
        }
    }
}

/// All configuration the solver recognizes (§6 of the bake pipeline spec).
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Fraction of the scene bounding extent used as the BPCD cell side.
    pub cell_scale: f64,
    /// Lightmap raster width, power-of-two preferred.
    pub raster_width: u32,
    /// Lightmap raster height, power-of-two preferred.
    pub raster_height: u32,
    /// Accepted ray samples per texel.
    pub sample_count: u32,
    /// World-unit bias applied along the normal before tracing, to avoid
    /// self-intersection at the origin texel.
    pub shadow_bias: f64,
    /// Maximum world-unit distance a sample ray is traced.
    pub ray_max_distance: f64,
    /// Lighting configuration.
    pub lighting: Lighting,
    /// Number of worker threads.
    pub num_workers: usize,
    /// Size in bytes of the backing arena heap.
    pub heap_bytes: usize,
    /// Base RNG seed; per-worker seeds are derived deterministically from
    /// this value and the worker's index.
    pub seed: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            cell_scale: 0.125,
            raster_width: 256,
            raster_height: 256,
            sample_count: 80,
            shadow_bias: 0.001,
            ray_max_distance: 10.0,
            lighting: Lighting::default(),
            num_workers: std::thread::available_parallelism()
                .map(|n| n.get().min(14))
                .unwrap_or(4),
            heap_bytes: 32 * 1024 * 1024,
            seed: 5489,
        }
    }
}
