//! Collaborator interfaces the solver is generic over (§6): where a mesh
//! comes from, where its textures come from, and where a finished lightmap
//! goes. None of these are implemented by this crate — the caller supplies
//! concrete types (a glTF loader, an in-memory test fixture, a PNG writer,
//! whatever fits their pipeline).

use std::error::Error;

use crate::color::Color;
use crate::math::Vector3;

/// One triangle of a [`MeshData`], indexing into its shared vertex arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// First vertex index.
    pub a: u32,
    /// Second vertex index.
    pub b: u32,
    /// Third vertex index.
    pub c: u32,
    /// Index into [`MeshData::material_names`].
    pub material: u32,
}

/// A mesh ready for baking: positions, normals, two UV channels (texture
/// and lightmap), and a triangle list referencing them.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Per-vertex world-space position.
    pub positions: Vec<Vector3>,
    /// Per-vertex world-space normal.
    pub normals: Vec<Vector3>,
    /// Per-vertex texture UV.
    pub uv_texture: Vec<(f64, f64)>,
    /// Per-vertex lightmap UV, assumed non-overlapping across the mesh.
    pub uv_lightmap: Vec<(f64, f64)>,
    /// Triangles, each referencing the vertex arrays above and one material.
    pub triangles: Vec<Triangle>,
    /// Material names, indexed by [`Triangle::material`].
    pub material_names: Vec<String>,
}

/// Supplies mesh geometry to bake. Implemented by the caller against
/// whatever asset pipeline they already have.
pub trait MeshSource {
    /// Error type this source's loader can fail with.
    type Error: Error + Send + Sync + 'static;

    /// Loads the named mesh.
    fn load_mesh(&self, name: &str) -> Result<MeshData, Self::Error>;
}

/// A decoded texture: width, height, and row-major RGBA8 pixels.
#[derive(Debug, Clone)]
pub struct RawTexture {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Row-major, top-down RGBA8 pixel data, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

/// Supplies a material's albedo texture. Implemented by the caller.
pub trait TextureSource {
    /// Error type this source's loader can fail with.
    type Error: Error + Send + Sync + 'static;

    /// Loads the albedo texture for a material name.
    fn load_texture(&self, material_name: &str) -> Result<RawTexture, Self::Error>;
}

/// Receives a finished lightmap. Implemented by the caller (write a PNG,
/// upload to a GPU texture, keep it in memory for a test assertion).
pub trait ImageSink {
    /// Error type this sink's write path can fail with.
    type Error: Error + Send + Sync + 'static;

    /// Writes a `width x height` RGB image to `path`, in row-major,
    /// top-down order.
    fn write_image(&self, width: u32, height: u32, rgb: &[Color], path: &str) -> Result<(), Self::Error>;
}
