//! Uniform 3D cell index over a triangle soup, built once per bake and then
//! traced read-only from worker threads (§4.C, §5).
//!
//! Cells are keyed by `(l, r, c)` — level/row/column, i.e. z/y/x — through
//! the same find-or-insert [`Hashmap`] the rest of the heap layer uses.
//! Traversal is an Amanatides-Woo DDA: step the axis whose next cell
//! boundary is nearest, stepping every axis tied for nearest together so a
//! ray grazing a cell diagonal doesn't skip the corner cell.

use std::sync::{Arc, Mutex};

use crate::error::GridError;
use crate::heap::array::{Array, Growth};
use crate::heap::hashmap::{Hashable, Hashmap};
use crate::heap::Heap;
use crate::math::{Aabb, Bcs3, BcsCoord, RaySeg, Sphere, Vector3, TOL};

/// Initial bucket count for the cell table; grows by the same
/// Fibonacci-like policy as every other [`Hashmap`] in this crate.
const INITIAL_TABLE_SIZE: usize = 64;

/// Hard cap on DDA steps per [`Grid::trace_ray`] call. A ray that has not
/// resolved within this many cell crossings is treated as a miss rather
/// than looping indefinitely on a malformed grid.
pub const MAX_TRACE_STEPS: u32 = 500;

fn cell_hash(l: i64, r: i64, c: i64) -> u64 {
    let mut h: u64 = 2166136261;
    for v in [l, r, c] {
        h ^= v as u64;
        h = h.wrapping_mul(16777619);
    }
    h
}

/// One occupied grid cell: its integer coordinate, world-space bounds, and
/// the triangles (by index into [`Grid`]'s triangle array) whose bounding
/// sphere and supporting geometry were found to overlap it.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Level (z) coordinate.
    pub l: i64,
    /// Row (y) coordinate.
    pub r: i64,
    /// Column (x) coordinate.
    pub c: i64,
    /// World-space bounds of this cell.
    pub aabb: Aabb,
    /// Indices into the owning [`Grid`]'s triangle array.
    pub tri_indices: Vec<u32>,
}

impl Hashable for Cell {
    fn hash_of(&self) -> u64 {
        cell_hash(self.l, self.r, self.c)
    }
}

fn cell_of(origin: Vector3, cell_size: Vector3, p: Vector3) -> (i64, i64, i64) {
    let rel = p - origin;
    let l = (rel.z() / cell_size.z()).floor() as i64;
    let r = (rel.y() / cell_size.y()).floor() as i64;
    let c = (rel.x() / cell_size.x()).floor() as i64;
    (l, r, c)
}

fn cell_aabb(origin: Vector3, cell_size: Vector3, l: i64, r: i64, c: i64) -> Aabb {
    let center = origin
        + Vector3::new(
            (c as f64 + 0.5) * cell_size.x(),
            (r as f64 + 0.5) * cell_size.y(),
            (l as f64 + 0.5) * cell_size.z(),
        );
    Aabb::new(center, cell_size * 0.5)
}

fn clean(x: f64) -> f64 {
    if x.abs() < TOL {
        0.0
    } else {
        x
    }
}

/// `(step, initial t_max, t_delta)` for one axis of the DDA traversal.
/// A zero direction component yields an infinite `t_max`/`t_delta`, so that
/// axis never triggers a step — explicit infinity rather than a division
/// that would otherwise need special-casing at every call site.
fn axis_steps(p: f64, d: f64, idx: i64, origin: f64, cell_size: f64) -> (i64, f64, f64) {
    if d > 0.0 {
        let boundary = origin + (idx as f64 + 1.0) * cell_size;
        (1, (boundary - p) / d, cell_size / d)
    } else if d < 0.0 {
        let boundary = origin + idx as f64 * cell_size;
        (-1, (boundary - p) / d, cell_size / -d)
    } else {
        (0, f64::INFINITY, f64::INFINITY)
    }
}

/// Result of one [`Grid::trace_ray`] call: the nearest hit found, if any.
#[derive(Debug, Clone)]
pub struct Trace {
    /// Index of the hit triangle into the grid's triangle array.
    pub index: Option<u32>,
    /// Barycentric coordinate of the hit within that triangle.
    pub bcs_coord: Option<BcsCoord>,
    /// World-space hit point.
    pub point: Vector3,
    /// Distance from the segment origin to the hit.
    pub dist: f64,
}

impl Default for Trace {
    fn default() -> Self {
        Trace {
            index: None,
            bcs_coord: None,
            point: Vector3::ZERO,
            dist: f64::INFINITY,
        }
    }
}

/// A uniform broad-phase grid over a fixed triangle set, queried by
/// segment trace once baking begins.
pub struct Grid {
    heap: Arc<Mutex<Heap>>,
    triangles: Array<Bcs3>,
    cells: Hashmap<Cell>,
    origin: Vector3,
    cell_size: Vector3,
}

impl Grid {
    /// Builds a grid over `triangles_points`, an isotropic `cell_size` on a
    /// side. Degenerate triangles are still appended (so triangle indices
    /// stay stable against the caller's mesh) but contribute no cells.
    pub fn build(
        heap: Arc<Mutex<Heap>>,
        triangles_points: &[(Vector3, Vector3, Vector3)],
        cell_size: f64,
    ) -> Result<Grid, GridError> {
        if cell_size <= 0.0 {
            return Err(GridError::NonPositiveCellSize { cell_size });
        }
        let cell_size_vec = Vector3::new(cell_size, cell_size, cell_size);

        let mut min_corner = Vector3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        for &(a, b, c) in triangles_points {
            for v in [a, b, c] {
                min_corner = min_corner.min(v);
            }
        }
        let origin = if triangles_points.is_empty() { Vector3::ZERO } else { min_corner };

        let initial_cap = triangles_points.len().max(1);
        let mut triangles: Array<Bcs3> = Array::new(heap.clone(), initial_cap, Growth::Fib)?;
        let mut cells: Hashmap<Cell> = Hashmap::new(INITIAL_TABLE_SIZE);
        let cell_radius = cell_size_vec.length() * 0.5;

        for (tri_index, &(a, b, c)) in triangles_points.iter().enumerate() {
            let bcs = Bcs3::new(a, b, c);
            triangles.append(bcs)?;
            if !bcs.valid {
                continue;
            }

            let sphere = Sphere::bounding_triangle(a, b, c);

            let (la, ra, ca) = cell_of(origin, cell_size_vec, a);
            let (lb, rb, cb) = cell_of(origin, cell_size_vec, b);
            let (lc, rc, cc) = cell_of(origin, cell_size_vec, c);

            let l_min = la.min(lb).min(lc) - 1;
            let l_max = la.max(lb).max(lc) + 1;
            let r_min = ra.min(rb).min(rc) - 1;
            let r_max = ra.max(rb).max(rc) + 1;
            let c_min = ca.min(cb).min(cc) - 1;
            let c_max = ca.max(cb).max(cc) + 1;

            for l in l_min..=l_max {
                for r in r_min..=r_max {
                    for col in c_min..=c_max {
                        let aabb = cell_aabb(origin, cell_size_vec, l, r, col);
                        if !sphere.touches(Sphere::new(aabb.center, cell_radius)) {
                            continue;
                        }
                        if !aabb.intersects((a, b, c)) {
                            continue;
                        }
                        let idx = cells.insert_if(Cell {
                            l,
                            r,
                            c: col,
                            aabb,
                            tri_indices: Vec::new(),
                        });
                        cells.get_mut(idx).tri_indices.push(tri_index as u32);
                    }
                }
            }
        }

        Ok(Grid {
            heap,
            triangles,
            cells,
            origin,
            cell_size: cell_size_vec,
        })
    }

    /// Number of triangles held (including degenerate ones kept for index
    /// stability).
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Origin corner the cell coordinate system is measured from.
    pub fn origin(&self) -> Vector3 {
        self.origin
    }

    /// Isotropic cell size.
    pub fn cell_size(&self) -> Vector3 {
        self.cell_size
    }

    /// The shared heap this grid's triangle array was reserved from.
    pub fn heap(&self) -> &Arc<Mutex<Heap>> {
        &self.heap
    }

    /// Traces `seg` through the grid via DDA cell stepping, writing the
    /// nearest triangle hit (if any) into `trace` and returning whether a
    /// hit was found. When `visited` is `Some`, every cell coordinate
    /// stepped through is appended to it, in traversal order — used by
    /// tests and diagnostics, not by the solver's hot path.
    pub fn trace_ray(&self, seg: RaySeg, trace: &mut Trace, mut visited: Option<&mut Vec<(i64, i64, i64)>>) -> bool {
        *trace = Trace::default();
        if seg.d.is_near_zero() || seg.dist <= 0.0 {
            return false;
        }

        let dx = clean(seg.d.x());
        let dy = clean(seg.d.y());
        let dz = clean(seg.d.z());

        let (mut l, mut r, mut c) = cell_of(self.origin, self.cell_size, seg.p);

        let (step_c, mut t_max_x, t_delta_x) = axis_steps(seg.p.x(), dx, c, self.origin.x(), self.cell_size.x());
        let (step_r, mut t_max_y, t_delta_y) = axis_steps(seg.p.y(), dy, r, self.origin.y(), self.cell_size.y());
        let (step_l, mut t_max_z, t_delta_z) = axis_steps(seg.p.z(), dz, l, self.origin.z(), self.cell_size.z());

        let mut steps = 0u32;
        loop {
            if let Some(v) = visited.as_deref_mut() {
                v.push((l, r, c));
            }
            if let Some(idx) = self.cells.find_by_hash(cell_hash(l, r, c)) {
                let cell = self.cells.get(idx);
                if cell.l == l && cell.r == r && cell.c == c {
                    for &tri_index in &cell.tri_indices {
                        let bcs = &self.triangles[tri_index as usize];
                        if let Some(coord) = bcs.project_rayseg(seg) {
                            let hit = bcs.point_at(coord);
                            let dist = seg.p.point(hit).length();
                            if dist < trace.dist {
                                trace.index = Some(tri_index);
                                trace.bcs_coord = Some(coord);
                                trace.point = hit;
                                trace.dist = dist;
                            }
                        }
                    }
                }
            }

            let min_t = t_max_x.min(t_max_y).min(t_max_z);
            if trace.index.is_some() && trace.dist <= min_t {
                break;
            }
            if min_t > seg.dist {
                break;
            }
            steps += 1;
            if steps >= MAX_TRACE_STEPS {
                break;
            }

            if (t_max_x - min_t).abs() < TOL {
                c += step_c;
                t_max_x += t_delta_x;
            }
            if (t_max_y - min_t).abs() < TOL {
                r += step_r;
                t_max_y += t_delta_y;
            }
            if (t_max_z - min_t).abs() < TOL {
                l += step_l;
                t_max_z += t_delta_z;
            }
        }

        trace.index.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;

    fn heap() -> Arc<Mutex<Heap>> {
        Arc::new(Mutex::new(Heap::new(1 << 16).unwrap()))
    }

    fn floor_triangle() -> (Vector3, Vector3, Vector3) {
        (
            Vector3::new(-5.0, 0.0, -5.0),
            Vector3::new(5.0, 0.0, -5.0),
            Vector3::new(0.0, 0.0, 5.0),
        )
    }

    #[test]
    fn zero_cell_size_is_rejected() {
        let result = Grid::build(heap(), &[floor_triangle()], 0.0);
        assert!(matches!(result, Err(GridError::NonPositiveCellSize { .. })));
    }

    #[test]
    fn ray_straight_down_hits_the_floor() {
        let grid = Grid::build(heap(), &[floor_triangle()], 0.5).unwrap();
        let seg = RaySeg::new(Vector3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -5.0, 0.0));
        let mut trace = Trace::default();
        let hit = grid.trace_ray(seg, &mut trace, None);
        assert!(hit);
        assert_eq!(trace.index, Some(0));
        assert!((trace.point.y() - 0.0).abs() < 1e-6);
    }

    #[test]
    fn segment_shorter_than_distance_to_surface_misses() {
        let grid = Grid::build(heap(), &[floor_triangle()], 0.5).unwrap();
        let ray = crate::math::Ray::new(Vector3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        let seg = RaySeg::from_ray(ray, 2.0);
        let mut trace = Trace::default();
        assert!(!grid.trace_ray(seg, &mut trace, None));
    }

    #[test]
    fn trace_records_visited_cells() {
        let grid = Grid::build(heap(), &[floor_triangle()], 0.5).unwrap();
        let seg = RaySeg::new(Vector3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -5.0, 0.0));
        let mut trace = Trace::default();
        let mut visited = Vec::new();
        grid.trace_ray(seg, &mut trace, Some(&mut visited));
        assert!(!visited.is_empty());
    }

    #[test]
    fn miss_beyond_triangle_bounds() {
        let grid = Grid::build(heap(), &[floor_triangle()], 0.5).unwrap();
        let seg = RaySeg::new(Vector3::new(20.0, 5.0, 20.0), Vector3::new(20.0, -5.0, 20.0));
        let mut trace = Trace::default();
        assert!(!grid.trace_ray(seg, &mut trace, None));
    }
}
