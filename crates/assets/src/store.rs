use crate::mesh::MeshData;
use crate::model::{ModelData, SubMesh, load_obj};
use crate::texture::{TextureData, load_texture};
use std::path::Path;
use vista_common::{MaterialHandle, MeshHandle, TextureHandle};

/// Surface description used by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub base_color: [f32; 4],
    /// Added after lighting; values above 1 only survive with HDR on.
    pub emissive: [f32; 3],
    /// `TextureHandle::INVALID` means untextured.
    pub texture: TextureHandle,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: "default".to_owned(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            emissive: [0.0; 3],
            texture: TextureHandle::INVALID,
        }
    }
}

impl MaterialData {
    pub fn color(name: impl Into<String>, base_color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            base_color,
            ..Self::default()
        }
    }

    pub fn emissive(name: impl Into<String>, emissive: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            base_color: [0.0, 0.0, 0.0, 1.0],
            emissive,
            ..Self::default()
        }
    }
}

/// Handle-indexed storage for textures, models and materials.
///
/// Handles are indices into append-only vectors, so they stay valid for the
/// store's lifetime. `MaterialHandle(0)` is always the default material.
#[derive(Debug, Clone)]
pub struct AssetStore {
    textures: Vec<TextureData>,
    models: Vec<ModelData>,
    materials: Vec<MaterialData>,
    cube: Option<MeshHandle>,
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetStore {
    pub const DEFAULT_MATERIAL: MaterialHandle = MaterialHandle(0);

    pub fn new() -> Self {
        Self {
            textures: Vec::new(),
            models: Vec::new(),
            materials: vec![MaterialData::default()],
            cube: None,
        }
    }

    // --- Textures ---
    pub fn add_texture(&mut self, texture: TextureData) -> TextureHandle {
        self.textures.push(texture);
        TextureHandle(self.textures.len() as u32 - 1)
    }

    /// Decode and store a texture, or log and return `INVALID`.
    pub fn load_texture(&mut self, path: &Path, gamma: bool) -> TextureHandle {
        match load_texture(path, gamma) {
            Ok(texture) => self.add_texture(texture),
            Err(err) => {
                tracing::error!("Texture failed to load at path {}: {err}", path.display());
                TextureHandle::INVALID
            }
        }
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureData> {
        self.textures.get(handle.0 as usize)
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureHandle, &TextureData)> {
        self.textures
            .iter()
            .enumerate()
            .map(|(i, t)| (TextureHandle(i as u32), t))
    }

    // --- Materials ---
    pub fn add_material(&mut self, material: MaterialData) -> MaterialHandle {
        self.materials.push(material);
        MaterialHandle(self.materials.len() as u32 - 1)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&MaterialData> {
        self.materials.get(handle.0 as usize)
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialHandle, &MaterialData)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialHandle(i as u32), m))
    }

    // --- Models ---
    pub fn add_model(&mut self, model: ModelData) -> MeshHandle {
        self.models.push(model);
        MeshHandle(self.models.len() as u32 - 1)
    }

    /// Load an OBJ with its MTL materials and their diffuse textures, or log
    /// and return `INVALID`.
    pub fn load_model(&mut self, path: &Path) -> MeshHandle {
        let scene = match load_obj(path) {
            Ok(scene) => scene,
            Err(err) => {
                tracing::error!("Model failed to load at path {}: {err}", path.display());
                return MeshHandle::INVALID;
            }
        };

        let materials: Vec<MaterialHandle> = scene
            .materials
            .into_iter()
            .map(|mtl| {
                let texture = match &mtl.diffuse_texture {
                    Some(texture_path) => self.load_texture(texture_path, true),
                    None => TextureHandle::INVALID,
                };
                let [r, g, b] = mtl.diffuse;
                self.add_material(MaterialData {
                    name: mtl.name,
                    base_color: [r, g, b, mtl.alpha],
                    texture,
                    ..MaterialData::default()
                })
            })
            .collect();

        let meshes = scene
            .meshes
            .into_iter()
            .map(|(mesh, index)| SubMesh {
                mesh,
                material: index.and_then(|i| materials.get(i).copied()),
            })
            .collect();
        let model = ModelData {
            name: scene.name,
            meshes,
        };
        tracing::info!(
            path = %path.display(),
            meshes = model.meshes.len(),
            triangles = model.triangle_count(),
            "model loaded"
        );
        self.add_model(model)
    }

    /// The built-in unit cube, registered on first use.
    pub fn cube(&mut self) -> MeshHandle {
        if let Some(handle) = self.cube {
            return handle;
        }
        let handle = self.add_model(ModelData::single(MeshData::cube()));
        self.cube = Some(handle);
        handle
    }

    /// Load `path` if given, falling back to the cube when it is absent or
    /// fails to load.
    pub fn model_or_cube(&mut self, path: Option<&Path>) -> MeshHandle {
        if let Some(path) = path {
            let handle = self.load_model(path);
            if handle.is_valid() {
                return handle;
            }
            tracing::warn!("using the built-in cube instead of {}", path.display());
        }
        self.cube()
    }

    pub fn model(&self, handle: MeshHandle) -> Option<&ModelData> {
        self.models.get(handle.0 as usize)
    }

    pub fn models(&self) -> impl Iterator<Item = (MeshHandle, &ModelData)> {
        self.models
            .iter()
            .enumerate()
            .map(|(i, m)| (MeshHandle(i as u32), m))
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn default_material_is_always_present() {
        let store = AssetStore::new();
        assert_eq!(
            store.material(AssetStore::DEFAULT_MATERIAL),
            Some(&MaterialData::default())
        );
    }

    #[test]
    fn failed_loads_return_invalid_handles() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AssetStore::new();
        let texture = store.load_texture(&dir.path().join("missing.png"), false);
        let model = store.load_model(&dir.path().join("missing.obj"));

        assert_eq!(texture, TextureHandle::INVALID);
        assert_eq!(model, MeshHandle::INVALID);
        assert!(store.texture(texture).is_none());
        assert!(store.model(model).is_none());
    }

    #[test]
    fn cube_is_registered_once() {
        let mut store = AssetStore::new();
        let a = store.cube();
        let b = store.cube();
        assert_eq!(a, b);
        assert_eq!(store.model_count(), 1);
        assert_eq!(store.model(a).unwrap().vertex_count(), 24);
    }

    #[test]
    fn model_or_cube_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AssetStore::new();
        let handle = store.model_or_cube(Some(&dir.path().join("nanosuit.obj")));
        assert_eq!(handle, store.cube());
        assert_eq!(store.model_or_cube(None), handle);
    }

    #[test]
    fn obj_materials_and_textures_are_registered() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(2, 2, image::Rgb([200, 100, 50]))
            .save(dir.path().join("crate.png"))
            .unwrap();
        std::fs::write(
            dir.path().join("box.mtl"),
            "newmtl crate\nKd 1 1 1\nmap_Kd crate.png\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("box.obj"),
            "mtllib box.mtl\no box\nusemtl crate\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();

        let mut store = AssetStore::new();
        let handle = store.load_model(&dir.path().join("box.obj"));
        assert!(handle.is_valid());

        let model = store.model(handle).unwrap();
        assert_eq!(model.triangle_count(), 1);
        let material = store.material(model.meshes[0].material.unwrap()).unwrap();
        assert_eq!(material.name, "crate");
        let texture = store.texture(material.texture).unwrap();
        assert!(texture.srgb);
        assert_eq!((texture.width, texture.height), (2, 2));
    }
}
