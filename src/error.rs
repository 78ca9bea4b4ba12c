//! Error types for each fallible boundary in the crate. Each enum gets a
//! manual `Display` and `std::error::Error` impl rather than a derive macro,
//! matching the texture catalog's error handling this crate's heap, grid and
//! solver layers are modeled on.

use std::fmt;

/// Errors raised by the arena [`crate::heap::Heap`].
#[derive(Debug)]
pub enum HeapError {
    /// The heap's fixed backing buffer is exhausted; the heap was sized
    /// too small for the workload and this is a construction-time
    /// precondition violation, not a recoverable condition.
    OutOfMemory {
        /// Bytes requested when the allocator gave up.
        requested: usize,
        /// Bytes remaining in the bump region.
        remaining: usize,
    },
    /// The requested heap size fell outside the permitted `[4 KiB, 256 MiB]`
    /// range.
    SizeOutOfRange {
        /// The size that was requested.
        requested: usize,
    },
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::OutOfMemory { requested, remaining } => write!(
                f,
                "heap exhausted: requested {} bytes, {} remaining",
                requested, remaining
            ),
            HeapError::SizeOutOfRange { requested } => {
                write!(f, "heap size {} bytes outside [4 KiB, 256 MiB]", requested)
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// Errors raised by [`crate::heap::array::Array`].
#[derive(Debug)]
pub enum ArrayError {
    /// `append` was called on a `Fixed`-growth array that is already full.
    FixedCapacityExceeded {
        /// The array's fixed capacity.
        capacity: usize,
    },
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayError::FixedCapacityExceeded { capacity } => {
                write!(f, "append exceeded fixed capacity of {}", capacity)
            }
        }
    }
}

impl std::error::Error for ArrayError {}

/// Errors surfaced while ingesting a mesh from an external [`crate::external::MeshSource`].
#[derive(Debug)]
pub enum MeshError {
    /// The source reported zero meshes.
    NoMeshes,
    /// A mesh had zero triangles.
    NoTriangles,
    /// The solver was asked to bake into a lightmap with a zero dimension.
    ZeroLightmapDimension {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::NoMeshes => write!(f, "mesh source yielded zero meshes"),
            MeshError::NoTriangles => write!(f, "mesh has zero triangles"),
            MeshError::ZeroLightmapDimension { width, height } => write!(
                f,
                "lightmap dimensions must be non-zero, got {}x{}",
                width, height
            ),
        }
    }
}

impl std::error::Error for MeshError {}

/// Errors raised while building the [`crate::bpcd::Grid`].
#[derive(Debug)]
pub enum GridError {
    /// The requested cell size was zero or negative.
    NonPositiveCellSize {
        /// The rejected cell size.
        cell_size: f64,
    },
    /// The backing heap could not satisfy the triangle array's allocation.
    Heap(HeapError),
    /// The backing triangle array could not grow to fit the mesh.
    Array(ArrayError),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::NonPositiveCellSize { cell_size } => {
                write!(f, "grid cell size must be positive, got {}", cell_size)
            }
            GridError::Heap(e) => write!(f, "grid build failed: {}", e),
            GridError::Array(e) => write!(f, "grid build failed: {}", e),
        }
    }
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridError::Heap(e) => Some(e),
            GridError::Array(e) => Some(e),
            GridError::NonPositiveCellSize { .. } => None,
        }
    }
}

impl From<HeapError> for GridError {
    fn from(e: HeapError) -> Self {
        GridError::Heap(e)
    }
}

impl From<ArrayError> for GridError {
    fn from(e: ArrayError) -> Self {
        GridError::Array(e)
    }
}

/// Top-level error returned by [`crate::solver::Solver::create`]; wraps the
/// unrecoverable cases in §7 of the bake pipeline's error design.
#[derive(Debug)]
pub enum SolverError {
    /// The backing heap could not satisfy an allocation during setup.
    Heap(HeapError),
    /// Mesh ingestion failed in an unrecoverable way.
    Mesh(MeshError),
    /// The BPCD grid could not be built from the ingested mesh.
    Grid(GridError),
    /// The external mesh source reported a failure. Boxed because the
    /// source's own error type is generic over the caller's loader
    /// implementation (§6) — this is the one boundary where type erasure
    /// genuinely earns its keep rather than every fallible boundary
    /// getting a `Box<dyn Error>` escape hatch.
    MeshSource(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Heap(e) => write!(f, "solver setup failed: {}", e),
            SolverError::Mesh(e) => write!(f, "solver setup failed: {}", e),
            SolverError::Grid(e) => write!(f, "solver setup failed: {}", e),
            SolverError::MeshSource(e) => write!(f, "solver setup failed: mesh source error: {}", e),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Heap(e) => Some(e),
            SolverError::Mesh(e) => Some(e),
            SolverError::Grid(e) => Some(e),
            SolverError::MeshSource(e) => Some(e.as_ref()),
        }
    }
}

impl From<HeapError> for SolverError {
    fn from(e: HeapError) -> Self {
        SolverError::Heap(e)
    }
}

impl From<MeshError> for SolverError {
    fn from(e: MeshError) -> Self {
        SolverError::Mesh(e)
    }
}

impl From<GridError> for SolverError {
    fn from(e: GridError) -> Self {
        SolverError::Grid(e)
    }
}
