use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Interleaved vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Unit cube centred on the origin, 4 vertices per face so every face
    /// gets its own flat normal and a full 0..1 UV square.
    pub fn cube() -> Self {
        // (normal, tangent u, tangent v) per face
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in FACES {
            let base = vertices.len() as u32;
            for (su, sv) in CORNERS {
                let position =
                    std::array::from_fn(|i| 0.5 * (normal[i] + su * u[i] + sv * v[i]));
                vertices.push(Vertex {
                    position,
                    normal,
                    uv: [(su + 1.0) * 0.5, 1.0 - (sv + 1.0) * 0.5],
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            name: "cube".to_owned(),
            vertices,
            indices,
        }
    }
}

/// Area-weighted per-vertex normals for meshes that ship without any.
pub(crate) fn face_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from(positions[a]);
        // Unnormalized, so larger triangles weigh more.
        let n = (Vec3::from(positions[b]) - pa).cross(Vec3::from(positions[c]) - pa);
        for i in [a, b, c] {
            normals[i] += n;
        }
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_vertices_average_by_area() {
        // A large triangle facing +Z and a small one facing +X share vertex 0.
        let positions = [
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [0.0, 2.0, 0.0],
            [0.0, 0.0, -0.1],
            [0.0, 0.1, 0.0],
        ];
        let normals = face_normals(&positions, &[0, 1, 2, 0, 3, 4]);
        let shared = Vec3::from(normals[0]);
        assert!((shared.length() - 1.0).abs() < 1e-5);
        assert!(shared.z > shared.x);
        assert_eq!(normals[1], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn unreferenced_and_degenerate_vertices_point_up() {
        let positions = [[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [5.0, 5.0, 5.0]];
        let normals = face_normals(&positions, &[0, 1, 2, 0, 1, 9]);
        assert!(normals.iter().all(|n| *n == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn cube_has_flat_faces() {
        let cube = MeshData::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert_eq!(cube.triangle_count(), 12);
        for vertex in &cube.vertices {
            for c in vertex.position {
                assert_eq!(c.abs(), 0.5);
            }
        }
    }

    #[test]
    fn cube_winding_is_counter_clockwise_from_outside() {
        let cube = MeshData::cube();
        let normals: Vec<[f32; 3]> = cube.vertices.iter().map(|v| v.normal).collect();
        let positions: Vec<[f32; 3]> = cube.vertices.iter().map(|v| v.position).collect();
        let computed = face_normals(&positions, &cube.indices);
        for (expected, got) in normals.iter().zip(&computed) {
            for k in 0..3 {
                assert!((expected[k] - got[k]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn face_normals_of_xy_triangle_point_up_z() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = face_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals, vec![[0.0, 0.0, 1.0]; 3]);
    }
}
