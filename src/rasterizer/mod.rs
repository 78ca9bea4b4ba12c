//! The barycentric rasterizer (§4.E): a layered [`Canvas`] G-buffer, filled
//! scanline-by-scanline by [`Scanner`] from triangle vertices carried as
//! [`Point`]s, each with a `plot` tuple typed per layer. Attribute
//! interpolation happens once per scanline-crossing in the scanner, not
//! once per texel, so the baker never re-derives barycentrics downstream.

pub mod scanner;
pub mod texture;

pub use scanner::Scanner;
pub use texture::{TextureHandle, TextureRegistry};

use crate::color::Color;
use crate::math::{Vector2, Vector3};

/// Maximum simultaneous layers a [`Canvas`] may hold (§3).
pub const MAX_LAYERS: usize = 8;

/// The kind of value stored by one canvas layer, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// A single scalar (used here for the coverage/id mask).
    Scalar,
    /// A 2D vector.
    Vector2,
    /// A 3D vector (world position, world normal).
    Vector3,
    /// A packed RGB color.
    Color,
    /// A texture lookup, resolved on demand via the [`TextureRegistry`]
    /// rather than during rasterization.
    Texel,
}

/// One tagged attribute value, matching the [`LayerKind`] of the layer it
/// is plotted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Variable {
    /// See [`LayerKind::Scalar`].
    Scalar(f64),
    /// See [`LayerKind::Vector2`].
    Vector2(Vector2),
    /// See [`LayerKind::Vector3`].
    Vector3(Vector3),
    /// See [`LayerKind::Color`].
    Color(Color),
    /// A texture handle, mip level, and UV coordinate to sample at.
    Texel {
        /// Which texture to sample.
        handle: TextureHandle,
        /// Mip level to sample at.
        mip_level: u32,
        /// UV coordinate within the texture.
        uv: Vector2,
    },
}

impl Variable {
    fn default_for(kind: LayerKind) -> Variable {
        match kind {
            LayerKind::Scalar => Variable::Scalar(0.0),
            LayerKind::Vector2 => Variable::Vector2(Vector2::ZERO),
            LayerKind::Vector3 => Variable::Vector3(Vector3::ZERO),
            LayerKind::Color => Variable::Color(Color::BLACK),
            LayerKind::Texel => Variable::Texel {
                handle: TextureHandle::NONE,
                mip_level: 0,
                uv: Vector2::ZERO,
            },
        }
    }

    /// Linearly blends two variables of the same kind toward `alpha`.
    /// `Texel` preserves `(handle, mip_level)` when both endpoints agree
    /// and interpolates `uv`; otherwise it picks whichever endpoint's
    /// sampler `alpha` is closer to (§4.E). Mismatched kinds are a
    /// programmer error upstream; this falls back to `a` rather than
    /// panicking mid-raster.
    pub fn blend(a: &Variable, b: &Variable, alpha: f64) -> Variable {
        match (a, b) {
            (Variable::Scalar(x), Variable::Scalar(y)) => Variable::Scalar(x + (y - x) * alpha),
            (Variable::Vector2(x), Variable::Vector2(y)) => Variable::Vector2(*x + (*y - *x) * alpha),
            (Variable::Vector3(x), Variable::Vector3(y)) => Variable::Vector3(*x + (*y - *x) * alpha),
            (Variable::Color(x), Variable::Color(y)) => Variable::Color(x.lerp(*y, alpha)),
            (
                Variable::Texel {
                    handle: h0,
                    mip_level: m0,
                    uv: uv0,
                },
                Variable::Texel {
                    handle: h1,
                    mip_level: m1,
                    uv: uv1,
                },
            ) => {
                if h0 == h1 && m0 == m1 {
                    Variable::Texel {
                        handle: *h0,
                        mip_level: *m0,
                        uv: *uv0 + (*uv1 - *uv0) * alpha,
                    }
                } else if alpha >= 0.5 {
                    *b
                } else {
                    *a
                }
            }
            _ => *a,
        }
    }
}

/// A raster sample site: a 2D position plus one `plot` variable per canvas
/// layer (§3).
#[derive(Debug, Clone)]
pub struct Point {
    /// 2D raster-space position.
    pub p: Vector2,
    /// One attribute per canvas layer, in layer order.
    pub plot: Vec<Variable>,
}

impl Point {
    /// Builds a point from its position and per-layer attributes.
    pub fn new(p: Vector2, plot: Vec<Variable>) -> Self {
        Point { p, plot }
    }

    /// Linearly blends `a` and `b` toward `alpha`, including every plot
    /// attribute.
    pub fn blend(a: &Point, b: &Point, alpha: f64) -> Point {
        let p = a.p + (b.p - a.p) * alpha;
        let plot = a
            .plot
            .iter()
            .zip(b.plot.iter())
            .map(|(x, y)| Variable::blend(x, y, alpha))
            .collect();
        Point { p, plot }
    }
}

struct Layer {
    kind: LayerKind,
    data: Vec<Variable>,
}

impl Layer {
    fn new(kind: LayerKind, len: usize) -> Self {
        Layer {
            kind,
            data: vec![Variable::default_for(kind); len],
        }
    }
}

/// A lightmap G-buffer: up to [`MAX_LAYERS`] densely packed attribute
/// layers, one entry per pixel each (§4.E).
pub struct Canvas {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
}

impl Canvas {
    /// Allocates a canvas with one layer per entry in `layer_kinds`.
    /// Panics if more than [`MAX_LAYERS`] kinds are requested.
    pub fn new(width: u32, height: u32, layer_kinds: &[LayerKind]) -> Self {
        assert!(
            layer_kinds.len() <= MAX_LAYERS,
            "canvas supports at most {} layers, got {}",
            MAX_LAYERS,
            layer_kinds.len()
        );
        let len = (width as usize) * (height as usize);
        let layers = layer_kinds.iter().map(|&kind| Layer::new(kind, len)).collect();
        Canvas { width, height, layers }
    }

    /// Raster width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Raster height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// The kind of a layer.
    pub fn layer_kind(&self, index: usize) -> LayerKind {
        self.layers[index].kind
    }

    /// Clamps `(x, y)` to the valid pixel range and flattens it to an
    /// index.
    pub fn xy(&self, x: i64, y: i64) -> usize {
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        cy * self.width as usize + cx
    }

    /// Read access to one layer's dense attribute buffer.
    pub fn layer(&self, index: usize) -> &[Variable] {
        &self.layers[index].data
    }

    /// Writes one variable tuple (one entry per layer, in layer order)
    /// into the texel at `(x, y)`.
    pub fn plot(&mut self, x: i64, y: i64, values: &[Variable]) {
        let idx = self.xy(x, y);
        for (layer, value) in self.layers.iter_mut().zip(values.iter()) {
            layer.data[idx] = *value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_xy_clamps_out_of_range() {
        let canvas = Canvas::new(4, 4, &[LayerKind::Scalar]);
        assert_eq!(canvas.xy(-5, -5), canvas.xy(0, 0));
        assert_eq!(canvas.xy(100, 100), canvas.xy(3, 3));
    }

    #[test]
    fn plot_writes_every_layer() {
        let mut canvas = Canvas::new(2, 2, &[LayerKind::Scalar, LayerKind::Color]);
        canvas.plot(1, 0, &[Variable::Scalar(1.0), Variable::Color(Color::WHITE)]);
        let idx = canvas.xy(1, 0);
        assert_eq!(canvas.layer(0)[idx], Variable::Scalar(1.0));
        assert_eq!(canvas.layer(1)[idx], Variable::Color(Color::WHITE));
    }

    #[test]
    fn point_blend_interpolates_every_plot_kind() {
        let a = Point::new(
            Vector2::new(0.0, 0.0),
            vec![Variable::Scalar(0.0), Variable::Vector3(Vector3::ZERO)],
        );
        let b = Point::new(
            Vector2::new(10.0, 0.0),
            vec![Variable::Scalar(10.0), Variable::Vector3(Vector3::new(2.0, 0.0, 0.0))],
        );
        let mid = Point::blend(&a, &b, 0.5);
        assert_eq!(mid.plot[0], Variable::Scalar(5.0));
        assert_eq!(mid.plot[1], Variable::Vector3(Vector3::new(1.0, 0.0, 0.0)));
    }
}
