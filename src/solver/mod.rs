//! Ties every other module into the actual bake pipeline (§4.G): ingest a
//! mesh, build its BPCD grid, rasterize a G-buffer over the lightmap UVs,
//! spread ambient-occlusion (plus optional direct sun) tasks across a
//! worker pool, and drain the result into an [`Image`].

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bpcd::{Grid, Trace};
use crate::color::Color;
use crate::config::SolverConfig;
use crate::error::{MeshError, SolverError};
use crate::external::{ImageSink, MeshData, MeshSource, TextureSource};
use crate::heap::Heap;
use crate::image::Image;
use crate::math::{Ray, RaySeg, Vector2, Vector3};
use crate::noise::random_point_on_sphere;
use crate::rasterizer::{Canvas, LayerKind, Point, Scanner, TextureHandle, TextureRegistry, Variable};
use crate::workers::{Task, Workers};

/// Per-worker state: a seeded RNG plus read-only access to the grid and
/// config every [`AoTask`] needs. `config` is `Copy`, so no sharing
/// mechanism is needed for it beyond a plain clone per worker.
pub struct Toolbox {
    rng: StdRng,
    grid: Arc<Grid>,
    config: SolverConfig,
}

/// One texel's worth of ambient-occlusion (and optional direct-light) work.
pub struct AoTask {
    x: u32,
    y: u32,
    position: Vector3,
    normal: Vector3,
    albedo: Color,
    result: Color,
}

impl Task for AoTask {
    type Toolbox = Toolbox;

    fn perform(&mut self, toolbox: &mut Self::Toolbox) {
        let config = toolbox.config;
        let n = self.normal;
        let origin = self.position + n * config.shadow_bias;

        let mut accepted = 0u32;
        let mut sum = 0.0;
        while accepted < config.sample_count {
            let d = random_point_on_sphere(&mut toolbox.rng);
            let ddotn = d.dot(n);
            if ddotn <= 0.0 {
                continue;
            }
            let seg = RaySeg::from_ray(Ray::new(origin, d), config.ray_max_distance);
            let mut trace = Trace::default();
            if !toolbox.grid.trace_ray(seg, &mut trace, None) {
                sum += ddotn;
            }
            accepted += 1;
        }
        let occlusion = (sum * 2.0 / config.sample_count as f64).clamp(0.0, 1.0);
        let mut color = self.albedo.modulate(config.lighting.sky_color).scale(occlusion);

        if let Some(sun) = config.lighting.sun {
            let shadow_dir = -sun.direction.normalized();
            let ndotl = n.dot(shadow_dir).max(0.0);
            if ndotl > 0.0 {
                let shadow_seg = RaySeg::from_ray(Ray::new(origin, shadow_dir), config.ray_max_distance);
                let mut shadow_trace = Trace::default();
                if !toolbox.grid.trace_ray(shadow_seg, &mut shadow_trace, None) {
                    let direct = self.albedo.modulate(sun.color).scale(ndotl);
                    color = color.saturating_add(direct);
                }
            }
        }
        self.result = color;
    }
}

/// A single lightmap bake: owns the heap, grid, texture registry, and
/// rasterized G-buffer it was built from, plus the finished result image.
pub struct Solver {
    heap: Arc<Mutex<Heap>>,
    grid: Arc<Grid>,
    textures: TextureRegistry,
    canvas: Canvas,
    result: Image,
    config: SolverConfig,
}

fn signed_area_2d(a: Vector2, b: Vector2, c: Vector2) -> f64 {
    (b.x() - a.x()) * (c.y() - a.y()) - (c.x() - a.x()) * (b.y() - a.y())
}

fn uv_area(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    ((b.0 - a.0) * (c.1 - a.1) - (c.0 - a.0) * (b.1 - a.1)).abs() * 0.5
}

impl Solver {
    /// Ingests `mesh_name` from `mesh_source`, loads each referenced
    /// material's texture from `texture_source` (a failed load logs a
    /// warning and falls back to [`TextureHandle::NONE`], per §7), builds
    /// the BPCD grid and G-buffer, runs the worker pool, and returns the
    /// finished bake.
    pub fn create<M, TS>(
        mesh_source: &M,
        texture_source: &TS,
        mesh_name: &str,
        config: SolverConfig,
    ) -> Result<Solver, SolverError>
    where
        M: MeshSource,
        TS: TextureSource,
    {
        if config.raster_width == 0 || config.raster_height == 0 {
            return Err(SolverError::Mesh(MeshError::ZeroLightmapDimension {
                width: config.raster_width,
                height: config.raster_height,
            }));
        }

        let mesh: MeshData = mesh_source
            .load_mesh(mesh_name)
            .map_err(|e| SolverError::MeshSource(Box::new(e)))?;
        if mesh.triangles.is_empty() {
            return Err(SolverError::Mesh(MeshError::NoTriangles));
        }

        let heap = Arc::new(Mutex::new(Heap::new(config.heap_bytes)?));

        let triangles_points: Vec<(Vector3, Vector3, Vector3)> = mesh
            .triangles
            .iter()
            .map(|t| (mesh.positions[t.a as usize], mesh.positions[t.b as usize], mesh.positions[t.c as usize]))
            .collect();

        let cell_size = Self::compute_cell_size(&mesh, config.cell_scale);
        let grid = Arc::new(Grid::build(Arc::clone(&heap), &triangles_points, cell_size)?);

        let mut textures = TextureRegistry::new();
        let mut handle_for_material: Vec<TextureHandle> = Vec::with_capacity(mesh.material_names.len());
        for name in &mesh.material_names {
            let handle = match texture_source.load_texture(name) {
                Ok(raw) => {
                    let pixels = raw
                        .rgba
                        .chunks_exact(4)
                        .map(|px| Color::new(px[0], px[1], px[2]))
                        .collect();
                    let mut image = Image::new(raw.width, raw.height, pixels);
                    image.create_mips();
                    textures.load_texture(image, name)
                }
                Err(err) => {
                    log::warn!(target: "solver", "material '{}' texture load failed, using black fallback: {}", name, err);
                    TextureHandle::NONE
                }
            };
            handle_for_material.push(handle);
        }

        let width = config.raster_width;
        let height = config.raster_height;
        let mut canvas = Canvas::new(
            width,
            height,
            &[LayerKind::Scalar, LayerKind::Vector3, LayerKind::Vector3, LayerKind::Texel],
        );
        let mut scanner = Scanner::new(height);

        for tri in &mesh.triangles {
            let idx = [tri.a as usize, tri.b as usize, tri.c as usize];
            let raster: Vec<Vector2> = idx
                .iter()
                .map(|&i| {
                    let (u, v) = mesh.uv_lightmap[i];
                    Vector2::new(u * (width.max(1) - 1) as f64, v * (height.max(1) - 1) as f64)
                })
                .collect();

            let handle = handle_for_material
                .get(tri.material as usize)
                .copied()
                .unwrap_or(TextureHandle::NONE);
            let (tex_w, tex_h) = textures
                .get(handle)
                .map(|img| (img.width() as f64, img.height() as f64))
                .unwrap_or((1.0, 1.0));
            let lm_area = signed_area_2d(raster[0], raster[1], raster[2]).abs() * 0.5;
            let tex_area = uv_area(mesh.uv_texture[idx[0]], mesh.uv_texture[idx[1]], mesh.uv_texture[idx[2]]) * tex_w * tex_h;
            let mip_level = Image::compute_mip_level(tex_area, lm_area);

            let points: Vec<Point> = (0..3)
                .map(|k| {
                    let i = idx[k];
                    let (u, v) = mesh.uv_texture[i];
                    Point::new(
                        raster[k],
                        vec![
                            Variable::Scalar(1.0),
                            Variable::Vector3(mesh.positions[i]),
                            Variable::Vector3(mesh.normals[i]),
                            Variable::Texel {
                                handle,
                                mip_level,
                                uv: Vector2::new(u, v),
                            },
                        ],
                    )
                })
                .collect();

            scanner.build_edge(&points[0], &points[1]);
            scanner.build_edge(&points[1], &points[2]);
            scanner.build_edge(&points[2], &points[0]);
            scanner.scan_reset(&mut canvas);
        }

        log::info!(
            target: "solver",
            "rasterized {} triangles into a {}x{} G-buffer, grid has {} cells",
            mesh.triangles.len(),
            width,
            height,
            grid.cell_count()
        );

        let mut tasks = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let i = canvas.xy(x as i64, y as i64);
                let Variable::Scalar(mask) = canvas.layer(0)[i] else {
                    continue;
                };
                if mask <= 0.0 {
                    continue;
                }
                let Variable::Vector3(position) = canvas.layer(1)[i] else {
                    continue;
                };
                let Variable::Vector3(normal) = canvas.layer(2)[i] else {
                    continue;
                };
                let Variable::Texel { handle, mip_level, uv } = canvas.layer(3)[i] else {
                    continue;
                };
                let albedo = textures.sample_texture(handle, uv.x(), uv.y(), mip_level);
                tasks.push(AoTask {
                    x,
                    y,
                    position,
                    normal: normal.normalized(),
                    albedo,
                    result: Color::BLACK,
                });
            }
        }

        log::info!(target: "workers", "dispatching {} texel tasks across {} workers", tasks.len(), config.num_workers);

        let base_seed = config.seed as u64;
        let grid_for_pool = Arc::clone(&grid);
        let pool: Workers<AoTask> = Workers::new(config.num_workers, move |worker_index| Toolbox {
            rng: StdRng::seed_from_u64(base_seed ^ (worker_index as u64).wrapping_mul(0x9E3779B97F4A7C15)),
            grid: Arc::clone(&grid_for_pool),
            config,
        });
        for task in tasks {
            pool.enqueue(task);
        }
        pool.begin();
        let results = pool.join();

        let mut pixels = vec![Color::BLACK; (width as usize) * (height as usize)];
        for task in &results {
            pixels[(task.y as usize) * (width as usize) + task.x as usize] = task.result;
        }
        let result = Image::new(width, height, pixels);

        Ok(Solver {
            heap,
            grid,
            textures,
            canvas,
            result,
            config,
        })
    }

    fn compute_cell_size(mesh: &MeshData, cell_scale: f64) -> f64 {
        let mut min = Vector3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Vector3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &p in &mesh.positions {
            min = min.min(p);
            max = max.max(p);
        }
        let extent = max - min;
        let avg = (extent.x() + extent.y() + extent.z()) / 3.0;
        (cell_scale * avg).max(crate::math::TOL)
    }

    /// The solver's configuration.
    pub fn config(&self) -> SolverConfig {
        self.config
    }

    /// The BPCD grid built for this bake.
    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    /// The rasterized G-buffer this bake's tasks were derived from.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The finished lightmap.
    pub fn result(&self) -> &Image {
        &self.result
    }

    /// The shared arena heap this bake allocated from.
    pub fn heap(&self) -> &Arc<Mutex<Heap>> {
        &self.heap
    }

    /// Writes the finished lightmap through `sink`.
    pub fn save<S: ImageSink>(&self, sink: &S, path: &str) -> Result<(), S::Error> {
        sink.write_image(self.result.width(), self.result.height(), self.result.pixels(), path)
    }
}
