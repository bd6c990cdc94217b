//! Scene builders for the three demos.

use crate::components::Renderable;
use crate::rng::SplitMix64;
use crate::scene::Scene;
use glam::Vec3;
use vista_common::{DemoKind, EntityId, MaterialHandle, MeshHandle, Transform};

/// Meshes and materials the demos draw with. `model` falls back to `cube`
/// when no model could be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoAssets {
    pub model: MeshHandle,
    pub model_material: MaterialHandle,
    pub cube: MeshHandle,
    pub cube_material: MaterialHandle,
    /// One emissive material per entry of [`HDR_LIGHTS`], in the same order.
    pub light_materials: [MaterialHandle; LIGHT_COUNT],
}

/// Asteroid ring layout for the instancing demo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingConfig {
    pub amount: usize,
    pub radius: f32,
    /// Maximum jitter off the ring circle.
    pub offset: f32,
    pub seed: u64,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            amount: 1000,
            radius: 50.0,
            offset: 2.5,
            seed: 0x5eed,
        }
    }
}

/// A point light used by the HDR tunnel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
}

pub const LIGHT_COUNT: usize = 4;

/// The tunnel's lights: one very bright light at the far end and three dim
/// coloured ones near the entrance. The colours are radiance, far outside
/// [0, 1] for the far light, so exposure decides what clips.
pub const HDR_LIGHTS: [PointLight; LIGHT_COUNT] = [
    PointLight {
        position: Vec3::new(0.0, 0.0, 49.5),
        color: Vec3::new(200.0, 200.0, 200.0),
    },
    PointLight {
        position: Vec3::new(-1.4, -1.9, 9.0),
        color: Vec3::new(0.1, 0.0, 0.0),
    },
    PointLight {
        position: Vec3::new(0.0, -1.8, 4.0),
        color: Vec3::new(0.0, 0.0, 0.2),
    },
    PointLight {
        position: Vec3::new(0.8, -1.7, 6.0),
        color: Vec3::new(0.0, 0.1, 0.0),
    },
];

/// Populate `scene` for `kind`.
pub fn build_demo(scene: &mut Scene, kind: DemoKind, assets: &DemoAssets) {
    match kind {
        DemoKind::Model => {
            build_model(scene, assets);
        }
        DemoKind::Instancing => {
            build_instancing(scene, assets, &RingConfig::default());
        }
        DemoKind::Hdr => {
            build_hdr(scene, assets);
        }
    }
    tracing::info!(demo = %kind, entities = scene.entity_count(), "demo scene built");
}

/// One model at the origin with an identity model matrix.
pub fn build_model(scene: &mut Scene, assets: &DemoAssets) -> EntityId {
    let id = scene.spawn_named("model", Transform::default());
    attach(scene, id, assets.model, assets.model_material);
    id
}

/// A planet plus a ring of rocks parented to a common ring root.
/// Returns `(planet, ring)`.
pub fn build_instancing(
    scene: &mut Scene,
    assets: &DemoAssets,
    config: &RingConfig,
) -> (EntityId, EntityId) {
    let mut planet_transform = Transform::new(Vec3::new(0.0, -3.0, 0.0));
    planet_transform.scale(Vec3::splat(4.0));
    let planet = scene.spawn_named("planet", planet_transform);
    attach(scene, planet, assets.model, assets.model_material);

    let ring = scene.spawn_named("ring", Transform::default());
    let mut rng = SplitMix64::new(config.seed);
    for i in 0..config.amount {
        let angle = (i as f32 / config.amount as f32 * 360.0).to_radians();
        let x = angle.sin() * config.radius + rng.range(-config.offset, config.offset);
        // Keep the ring flatter than it is wide.
        let y = rng.range(-config.offset, config.offset) * 0.4;
        let z = angle.cos() * config.radius + rng.range(-config.offset, config.offset);

        let mut transform = Transform::new(Vec3::new(x, y, z));
        transform.scale(Vec3::splat(rng.range(0.05, 0.25)));
        transform.rotate(rng.range(0.0, 360.0), Vec3::new(0.4, 0.6, 0.8));

        let rock = scene.spawn(transform);
        attach(scene, rock, assets.cube, assets.cube_material);
        link(scene, rock, ring);
    }
    (planet, ring)
}

/// A long box the camera sits inside, plus a small marker cube per light.
/// Returns the tunnel entity.
pub fn build_hdr(scene: &mut Scene, assets: &DemoAssets) -> EntityId {
    let mut tunnel_transform = Transform::new(Vec3::new(0.0, 0.0, 25.0));
    tunnel_transform.scale(Vec3::new(2.5, 2.5, 27.5));
    let tunnel = scene.spawn_named("tunnel", tunnel_transform);
    attach(scene, tunnel, assets.cube, assets.cube_material);

    for (i, (light, material)) in HDR_LIGHTS.iter().zip(assets.light_materials).enumerate() {
        let mut transform = Transform::new(light.position);
        transform.scale(Vec3::splat(0.1));
        let marker = scene.spawn_named(format!("light{i}"), transform);
        attach(scene, marker, assets.cube, material);
    }
    tunnel
}

fn attach(scene: &mut Scene, id: EntityId, mesh: MeshHandle, material: MaterialHandle) {
    // `id` was spawned by the caller, so the scene always knows it.
    if let Err(err) = scene.set_renderable(id, Renderable::new(mesh, material)) {
        tracing::warn!(%err, "failed to attach renderable");
    }
}

fn link(scene: &mut Scene, child: EntityId, parent: EntityId) {
    if let Err(err) = scene.set_parent(child, parent) {
        tracing::warn!(%err, "failed to parent entity");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::propagate_transforms;

    fn assets() -> DemoAssets {
        DemoAssets {
            model: MeshHandle(0),
            model_material: MaterialHandle(0),
            cube: MeshHandle(1),
            cube_material: MaterialHandle(1),
            light_materials: [2, 3, 4, 5].map(MaterialHandle),
        }
    }

    #[test]
    fn model_demo_has_identity_model_matrix() {
        let mut scene = Scene::new();
        let id = build_model(&mut scene, &assets());
        propagate_transforms(&mut scene);
        assert_eq!(scene.transform(id).unwrap().world_matrix(), glam::Mat4::IDENTITY);
        assert_eq!(scene.renderable(id).unwrap().mesh, MeshHandle(0));
    }

    #[test]
    fn instancing_ring_is_deterministic() {
        let config = RingConfig {
            amount: 64,
            ..RingConfig::default()
        };
        let mut a = Scene::new();
        let mut b = Scene::new();
        build_instancing(&mut a, &assets(), &config);
        build_instancing(&mut b, &assets(), &config);
        assert_eq!(a.transforms(), b.transforms());
        // planet + ring root + rocks
        assert_eq!(a.entity_count(), 66);
        assert_eq!(a.renderables().len(), 65);
    }

    #[test]
    fn rocks_stay_near_the_ring() {
        let config = RingConfig::default();
        let mut scene = Scene::new();
        let (_, ring) = build_instancing(&mut scene, &assets(), &config);
        propagate_transforms(&mut scene);

        let rocks: Vec<_> = scene.children(ring).collect();
        assert_eq!(rocks.len(), config.amount);
        let max_dist = config.radius + 2.0 * config.offset;
        let min_dist = config.radius - 2.0 * config.offset;
        for rock in rocks {
            let p = scene.transform(rock).unwrap().world_position(false);
            let planar = Vec3::new(p.x, 0.0, p.z).length();
            assert!((min_dist..=max_dist).contains(&planar), "rock at {p:?}");
            assert!(p.y.abs() <= config.offset * 0.4);
        }
    }

    #[test]
    fn hdr_demo_places_light_markers() {
        let mut scene = Scene::new();
        build_demo(&mut scene, DemoKind::Hdr, &assets());
        propagate_transforms(&mut scene);

        let far = scene.find_by_name("light0").unwrap();
        let p = scene.transform(far).unwrap().world_position(false);
        assert!(p.abs_diff_eq(HDR_LIGHTS[0].position, 1e-5));
        assert_eq!(scene.renderable(far).unwrap().material, MaterialHandle(2));
        let near = scene.find_by_name("light3").unwrap();
        assert_eq!(scene.renderable(near).unwrap().material, MaterialHandle(5));
        assert_eq!(scene.entity_count(), 1 + HDR_LIGHTS.len());
    }
}
