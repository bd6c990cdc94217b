use crate::AssetError;
use crate::mesh::{MeshData, Vertex, face_normals};
use std::path::{Path, PathBuf};
use vista_common::MaterialHandle;

/// One drawable part of a model. Parts without their own material are drawn
/// with the material of the entity that references the model.
#[derive(Debug, Clone, PartialEq)]
pub struct SubMesh {
    pub mesh: MeshData,
    pub material: Option<MaterialHandle>,
}

/// A model as referenced by a `MeshHandle`: one or more sub-meshes drawn
/// together.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub name: String,
    pub meshes: Vec<SubMesh>,
}

impl ModelData {
    pub fn single(mesh: MeshData) -> Self {
        Self {
            name: mesh.name.clone(),
            meshes: vec![SubMesh {
                mesh,
                material: None,
            }],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.triangle_count()).sum()
    }
}

/// Material read from an OBJ's MTL library.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjMaterial {
    pub name: String,
    pub diffuse: [f32; 3],
    pub alpha: f32,
    /// Diffuse texture, resolved against the OBJ's directory.
    pub diffuse_texture: Option<PathBuf>,
}

/// Parsed OBJ file before its materials are registered.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjScene {
    pub name: String,
    /// Meshes with an index into `materials`.
    pub meshes: Vec<(MeshData, Option<usize>)>,
    pub materials: Vec<ObjMaterial>,
}

/// Parse an OBJ file, triangulated with a single index buffer per mesh.
/// A missing or broken MTL library is logged and yields no materials.
pub fn load_obj(path: &Path) -> Result<ObjScene, AssetError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let materials = materials.unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), "no usable MTL library: {err}");
        Vec::new()
    });
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

    let materials = materials
        .into_iter()
        .enumerate()
        .map(|(i, mtl)| ObjMaterial {
            name: if mtl.name.is_empty() {
                format!("material_{i}")
            } else {
                mtl.name
            },
            diffuse: mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]),
            alpha: mtl.dissolve.unwrap_or(1.0),
            diffuse_texture: mtl.diffuse_texture.map(|t| base_dir.join(t)),
        })
        .collect();

    let meshes = models
        .into_iter()
        .map(|model| {
            let material = model.mesh.material_id;
            (convert_mesh(model.name, model.mesh), material)
        })
        .collect();

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ObjScene {
        name,
        meshes,
        materials,
    })
}

fn convert_mesh(name: String, mesh: tobj::Mesh) -> MeshData {
    let positions: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();

    let normals: Vec<[f32; 3]> = if mesh.normals.len() == mesh.positions.len() {
        mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect()
    } else {
        face_normals(&positions, &mesh.indices)
    };

    let has_uvs = mesh.texcoords.len() / 2 == positions.len();
    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, position)| Vertex {
            position: *position,
            normal: normals[i],
            // OBJ texture space has v pointing up.
            uv: if has_uvs {
                [mesh.texcoords[2 * i], 1.0 - mesh.texcoords[2 * i + 1]]
            } else {
                [0.0, 0.0]
            },
        })
        .collect();

    MeshData {
        name,
        vertices,
        indices: mesh.indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";

    #[test]
    fn quad_is_triangulated_with_computed_normals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.obj");
        std::fs::write(&path, format!("o quad\n{QUAD}")).unwrap();

        let scene = load_obj(&path).unwrap();
        assert_eq!(scene.name, "quad");
        assert_eq!(scene.meshes.len(), 1);
        let (mesh, material) = &scene.meshes[0];
        assert_eq!(*material, None);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        for vertex in &mesh.vertices {
            assert!((vertex.normal[2] - 1.0).abs() < 1e-6);
        }
        // v flipped for top-left origin textures
        assert_eq!(mesh.vertices[0].uv, [0.0, 1.0]);
    }

    #[test]
    fn mtl_materials_are_resolved_next_to_the_obj() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("box.mtl"),
            "newmtl crate\nKd 0.5 0.25 1.0\nmap_Kd crate.png\n",
        )
        .unwrap();
        let obj = format!("mtllib box.mtl\no box\nusemtl crate\n{QUAD}");
        let path = dir.path().join("box.obj");
        std::fs::write(&path, obj).unwrap();

        let scene = load_obj(&path).unwrap();
        assert_eq!(scene.materials.len(), 1);
        let material = &scene.materials[0];
        assert_eq!(material.name, "crate");
        assert_eq!(material.diffuse, [0.5, 0.25, 1.0]);
        assert_eq!(material.diffuse_texture, Some(dir.path().join("crate.png")));
        assert_eq!(scene.meshes[0].1, Some(0));
    }

    #[test]
    fn missing_obj_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_obj(&dir.path().join("missing.obj")),
            Err(AssetError::Obj { .. })
        ));
    }
}
