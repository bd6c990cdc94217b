use crate::scene::Scene;
use vista_render::DrawList;

/// Recompute every world matrix from the local matrices and parent links.
///
/// Roots get `world = local`; children get `parent.world * local`.
pub fn propagate_transforms(scene: &mut Scene) {
    for id in scene.hierarchy_order() {
        let parent_world = scene
            .parent(id)
            .and_then(|parent| scene.transform(parent))
            .map(|t| t.world_matrix());
        if let Some(transform) = scene.transform_mut(id) {
            let local = transform.local_matrix();
            let world = match parent_world {
                Some(parent_world) => parent_world * local,
                None => local,
            };
            transform.set_world_matrix(world);
        }
    }
}

/// Queue every renderable entity with its current world matrix.
pub fn collect_draws(scene: &Scene, draws: &mut DrawList) {
    for (id, renderable) in scene.renderables() {
        if let Some(transform) = scene.transform(*id) {
            draws.push(renderable.mesh, renderable.material, transform.world_matrix());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Renderable;
    use glam::{Mat4, Vec3};
    use vista_common::{MaterialHandle, MeshHandle, Transform};

    #[test]
    fn roots_copy_local_into_world() {
        let mut scene = Scene::new();
        let id = scene.spawn(Transform::new(Vec3::new(1.0, 2.0, 3.0)));
        propagate_transforms(&mut scene);
        let t = scene.transform(id).unwrap();
        assert_eq!(t.world_matrix(), t.local_matrix());
        assert_eq!(t.world_position(false), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn children_compose_with_parent_world() {
        let mut scene = Scene::new();
        // Spawn the child first so id order disagrees with hierarchy order.
        let child = scene.spawn(Transform::new(Vec3::X));
        let mut root_transform = Transform::new(Vec3::new(0.0, 5.0, 0.0));
        root_transform.scale(Vec3::splat(2.0));
        let root = scene.spawn(root_transform);
        scene.set_parent(child, root).unwrap();

        propagate_transforms(&mut scene);
        let world = scene.transform(child).unwrap().world_position(false);
        assert!(world.abs_diff_eq(Vec3::new(2.0, 5.0, 0.0), 1e-6));
    }

    #[test]
    fn world_decomposition_follows_propagation() {
        let mut scene = Scene::new();
        let root = scene.spawn(Transform::new(Vec3::new(0.0, 0.0, -4.0)));
        let child = scene.spawn(Transform::new(Vec3::Y));
        scene.set_parent(child, root).unwrap();
        propagate_transforms(&mut scene);

        let transform = scene.transform_mut(child).unwrap();
        transform.decompose();
        assert!(transform.world_position(true).abs_diff_eq(Vec3::new(0.0, 1.0, -4.0), 1e-6));
        assert!(transform.local_position(true).abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn collect_draws_batches_renderables() {
        let mut scene = Scene::new();
        for i in 0..3 {
            let id = scene.spawn(Transform::new(Vec3::X * i as f32));
            scene
                .set_renderable(id, Renderable::new(MeshHandle(1), MaterialHandle(0)))
                .unwrap();
        }
        // Not renderable.
        scene.spawn(Transform::default());
        propagate_transforms(&mut scene);

        let mut draws = DrawList::new();
        collect_draws(&scene, &mut draws);
        assert_eq!(draws.batch_count(), 1);
        assert_eq!(draws.instance_count(), 3);
        let batch = draws.batches().next().unwrap();
        assert_eq!(batch.models[2], Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));
    }
}
