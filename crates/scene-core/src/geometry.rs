//! Subdivided icosahedron used as the core mesh.
//!
//! The mesh is a non-indexed triangle list: every triangle owns its three
//! vertices, so per-vertex deformation tears the surface into facets and
//! recomputed normals come out flat.

use glam::Vec3;

const ICOSA_INDICES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosa_vertices() -> [Vec3; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
}

#[derive(Clone, Debug)]
pub struct IcosphereMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

impl IcosphereMesh {
    /// Each icosahedron face is split into `(detail + 1)^2` triangles and
    /// every vertex pushed out to `radius`.
    pub fn new(radius: f32, detail: u32) -> Self {
        let base = icosa_vertices();
        let cols = detail as usize + 1;
        let mut positions = Vec::with_capacity(20 * cols * cols * 3);
        for face in ICOSA_INDICES {
            subdivide_face(base[face[0]], base[face[1]], base[face[2]], cols, &mut positions);
        }
        let normals: Vec<Vec3> = positions.iter().map(|p| p.normalize_or_zero()).collect();
        for (p, n) in positions.iter_mut().zip(normals.iter()) {
            *p = *n * radius;
        }
        Self { positions, normals }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

fn subdivide_face(a: Vec3, b: Vec3, c: Vec3, cols: usize, out: &mut Vec<Vec3>) {
    // rows[i][j]: i walks from edge ab towards c, j across the row.
    let mut rows: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);
    for i in 0..=cols {
        let t = i as f32 / cols as f32;
        let aj = a.lerp(c, t);
        let bj = b.lerp(c, t);
        let count = cols - i;
        let row = (0..=count)
            .map(|j| {
                if j == 0 && count == 0 {
                    aj
                } else {
                    aj.lerp(bj, j as f32 / count as f32)
                }
            })
            .collect();
        rows.push(row);
    }
    for i in 0..cols {
        for j in 0..(2 * (cols - i) - 1) {
            let k = j / 2;
            if j % 2 == 0 {
                out.push(rows[i][k + 1]);
                out.push(rows[i + 1][k]);
                out.push(rows[i][k]);
            } else {
                out.push(rows[i][k + 1]);
                out.push(rows[i + 1][k + 1]);
                out.push(rows[i + 1][k]);
            }
        }
    }
}

/// Write flat per-triangle normals for a non-indexed triangle list.
/// Degenerate triangles get a zero normal rather than NaN.
pub fn recompute_flat_normals(positions: &[Vec3], normals: &mut [Vec3]) {
    for (tri, out) in positions.chunks_exact(3).zip(normals.chunks_exact_mut(3)) {
        let cb = tri[2] - tri[1];
        let ab = tri[0] - tri[1];
        let n = cb.cross(ab).normalize_or_zero();
        out.fill(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_three_has_960_vertices_on_the_sphere() {
        let mesh = IcosphereMesh::new(2.5, 3);
        assert_eq!(mesh.vertex_count(), 20 * 16 * 3);
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            assert!((p.length() - 2.5).abs() < 1e-4);
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn flat_normals_point_outwards() {
        let mesh = IcosphereMesh::new(1.0, 1);
        let mut normals = vec![Vec3::ZERO; mesh.vertex_count()];
        recompute_flat_normals(&mesh.positions, &mut normals);
        for (tri, n) in mesh.positions.chunks_exact(3).zip(normals.chunks_exact(3)) {
            let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
            assert!(n[0].dot(centroid) > 0.0);
        }
    }

    #[test]
    fn degenerate_triangle_gets_zero_normal() {
        let positions = [Vec3::ONE; 3];
        let mut normals = [Vec3::X; 3];
        recompute_flat_normals(&positions, &mut normals);
        assert_eq!(normals, [Vec3::ZERO; 3]);
    }
}
