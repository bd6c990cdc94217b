use crate::settings::Settings;
use vista_assets::{AssetStore, CubemapData, MaterialData, cubemap_paths, load_cubemap};
use vista_common::TextureHandle;
use vista_ecs::Scene;
use vista_ecs::demos::{self, DemoAssets, HDR_LIGHTS};

/// Everything a frame loop needs besides a window and a renderer.
#[derive(Debug, Clone)]
pub struct DemoSetup {
    pub assets: AssetStore,
    pub handles: DemoAssets,
    pub scene: Scene,
    pub skybox: Option<CubemapData>,
}

/// Load the configured assets and build the configured demo scene.
///
/// Missing or broken files never fail the setup: the model falls back to the
/// built-in cube, a missing texture leaves the cube untextured and a broken
/// skybox is dropped.
pub fn load_demo(settings: &Settings) -> DemoSetup {
    let mut assets = AssetStore::new();

    let model = assets.model_or_cube(settings.model_path.as_deref());
    let cube = assets.cube();
    let texture = settings
        .texture_path
        .as_deref()
        .map(|path| assets.load_texture(path, true))
        .unwrap_or(TextureHandle::INVALID);
    let cube_material = assets.add_material(MaterialData {
        name: "surface".to_owned(),
        base_color: [1.0, 1.0, 1.0, 1.0],
        texture,
        ..MaterialData::default()
    });
    // Each marker glows with its light's radiance.
    let light_materials = std::array::from_fn(|i| {
        let color = HDR_LIGHTS[i].color.to_array();
        assets.add_material(MaterialData::emissive(format!("light{i}"), color))
    });

    let handles = DemoAssets {
        model,
        model_material: AssetStore::DEFAULT_MATERIAL,
        cube,
        cube_material,
        light_materials,
    };

    let mut scene = Scene::new();
    demos::build_demo(&mut scene, settings.demo, &handles);

    let skybox = settings.skybox.as_ref().and_then(|sky| {
        match load_cubemap(&cubemap_paths(&sky.dir, &sky.extension)) {
            Ok(cubemap) => Some(cubemap),
            Err(err) => {
                tracing::error!("skybox disabled: {err}");
                None
            }
        }
    });

    DemoSetup {
        assets,
        handles,
        scene,
        skybox,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SkyboxSettings;
    use std::path::PathBuf;
    use vista_common::DemoKind;

    #[test]
    fn missing_model_falls_back_to_cube() {
        let settings = Settings {
            model_path: Some(PathBuf::from("/nonexistent/model.obj")),
            ..Settings::default()
        };
        let setup = load_demo(&settings);
        assert_eq!(setup.handles.model, setup.handles.cube);
        assert_eq!(setup.assets.model_count(), 1);
        assert_eq!(setup.scene.entity_count(), 1);
    }

    #[test]
    fn missing_texture_leaves_surface_untextured() {
        let settings = Settings {
            texture_path: Some(PathBuf::from("/nonexistent/wood.png")),
            ..Settings::default()
        };
        let setup = load_demo(&settings);
        let material = setup.assets.material(setup.handles.cube_material).unwrap();
        assert!(!material.texture.is_valid());
    }

    #[test]
    fn hdr_demo_gives_each_light_its_own_emission() {
        let settings = Settings {
            demo: DemoKind::Hdr,
            ..Settings::default()
        };
        let setup = load_demo(&settings);
        let emission = |i: usize| {
            let handle = setup.handles.light_materials[i];
            setup.assets.material(handle).unwrap().emissive
        };
        assert_eq!(emission(0), [200.0, 200.0, 200.0]);
        for i in 1..HDR_LIGHTS.len() {
            assert_ne!(emission(i), emission(0));
            assert!(emission(i).iter().all(|c| *c < 1.0));
        }

        let far = setup.scene.find_by_name("light0").unwrap();
        let material = setup.scene.renderable(far).unwrap().material;
        assert_eq!(material, setup.handles.light_materials[0]);
        // Tunnel plus one marker per light.
        assert_eq!(setup.scene.entity_count(), 1 + demos::HDR_LIGHTS.len());
    }

    #[test]
    fn skybox_with_no_faces_on_disk_still_loads_black() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            skybox: Some(SkyboxSettings {
                dir: dir.path().to_path_buf(),
                extension: "png".to_owned(),
            }),
            ..Settings::default()
        };
        let setup = load_demo(&settings);
        let skybox = setup.skybox.unwrap();
        assert_eq!(skybox.faces.len(), 6);
        assert_eq!(skybox.face_size(), (1, 1));
    }
}
