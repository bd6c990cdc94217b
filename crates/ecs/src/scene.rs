use crate::components::{Name, Parent, Renderable};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use vista_common::{EntityId, Transform};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),
    #[error("entity {0} cannot be its own parent")]
    SelfParent(EntityId),
    #[error("parenting {child} under {parent} would create a cycle")]
    Cycle { child: EntityId, parent: EntityId },
}

/// Counts reported by `vista-cli info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneSummary {
    pub entities: usize,
    pub renderables: usize,
    pub roots: usize,
}

/// Entity arena plus per-component storage.
///
/// Every live entity has a [`Transform`]; the other components are optional.
/// Ids are never reused within a scene.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    next_id: u32,
    transforms: BTreeMap<EntityId, Transform>,
    renderables: BTreeMap<EntityId, Renderable>,
    parents: BTreeMap<EntityId, Parent>,
    names: BTreeMap<EntityId, Name>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, transform: Transform) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.transforms.insert(id, transform);
        id
    }

    pub fn spawn_named(&mut self, name: impl Into<String>, transform: Transform) -> EntityId {
        let id = self.spawn(transform);
        self.names.insert(id, Name(name.into()));
        id
    }

    /// Remove an entity and all of its components. Its children become roots.
    pub fn despawn(&mut self, id: EntityId) -> Option<Transform> {
        let transform = self.transforms.remove(&id)?;
        self.renderables.remove(&id);
        self.parents.remove(&id);
        self.names.remove(&id);

        let orphans: Vec<EntityId> = self
            .parents
            .iter()
            .filter(|(_, parent)| parent.0 == id)
            .map(|(child, _)| *child)
            .collect();
        for child in orphans {
            tracing::debug!(%child, parent = %id, "parent despawned; child is now a root");
            self.parents.remove(&child);
        }
        Some(transform)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.transforms.contains_key(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.transforms.len()
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.transforms.keys().copied()
    }

    pub fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.transforms.get(&id)
    }

    pub fn transform_mut(&mut self, id: EntityId) -> Option<&mut Transform> {
        self.transforms.get_mut(&id)
    }

    pub fn transforms(&self) -> &BTreeMap<EntityId, Transform> {
        &self.transforms
    }

    // --- Renderable ---
    pub fn set_renderable(&mut self, id: EntityId, renderable: Renderable) -> Result<(), SceneError> {
        self.require(id)?;
        self.renderables.insert(id, renderable);
        Ok(())
    }

    pub fn remove_renderable(&mut self, id: EntityId) -> Option<Renderable> {
        self.renderables.remove(&id)
    }

    pub fn renderable(&self, id: EntityId) -> Option<&Renderable> {
        self.renderables.get(&id)
    }

    pub fn renderables(&self) -> &BTreeMap<EntityId, Renderable> {
        &self.renderables
    }

    // --- Name ---
    pub fn set_name(&mut self, id: EntityId, name: impl Into<String>) -> Result<(), SceneError> {
        self.require(id)?;
        self.names.insert(id, Name(name.into()));
        Ok(())
    }

    pub fn name(&self, id: EntityId) -> Option<&str> {
        self.names.get(&id).map(|n| n.0.as_str())
    }

    /// First entity (lowest id) carrying `name`.
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.names
            .iter()
            .find(|(_, n)| n.0 == name)
            .map(|(id, _)| *id)
    }

    // --- Parent ---
    pub fn set_parent(&mut self, child: EntityId, parent: EntityId) -> Result<(), SceneError> {
        self.require(child)?;
        self.require(parent)?;
        if child == parent {
            return Err(SceneError::SelfParent(child));
        }
        let mut cursor = Some(parent);
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return Err(SceneError::Cycle { child, parent });
            }
            cursor = self.parent(ancestor);
        }
        self.parents.insert(child, Parent(parent));
        Ok(())
    }

    pub fn clear_parent(&mut self, child: EntityId) -> Option<EntityId> {
        self.parents.remove(&child).map(|p| p.0)
    }

    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.parents.get(&id).map(|p| p.0)
    }

    pub fn children(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.parents
            .iter()
            .filter(move |(_, parent)| parent.0 == id)
            .map(|(child, _)| *child)
    }

    /// Number of ancestors above `id`.
    pub fn depth(&self, id: EntityId) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent(id);
        while let Some(ancestor) = cursor {
            depth += 1;
            cursor = self.parent(ancestor);
        }
        depth
    }

    /// All entities with every parent ahead of its children; ties are broken
    /// by id.
    pub fn hierarchy_order(&self) -> Vec<EntityId> {
        let mut order: Vec<(usize, EntityId)> =
            self.entities().map(|id| (self.depth(id), id)).collect();
        order.sort_unstable();
        order.into_iter().map(|(_, id)| id).collect()
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            entities: self.entity_count(),
            renderables: self.renderables.len(),
            roots: self.entity_count() - self.parents.len(),
        }
    }

    fn require(&self, id: EntityId) -> Result<(), SceneError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(SceneError::UnknownEntity(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use vista_common::{MaterialHandle, MeshHandle};

    #[test]
    fn ids_are_sequential_and_not_reused() {
        let mut scene = Scene::new();
        let a = scene.spawn(Transform::default());
        let b = scene.spawn(Transform::default());
        assert_eq!((a, b), (EntityId(0), EntityId(1)));

        scene.despawn(a);
        let c = scene.spawn(Transform::default());
        assert_eq!(c, EntityId(2));
        assert_eq!(scene.entity_count(), 2);
    }

    #[test]
    fn despawn_clears_components_and_orphans_children() {
        let mut scene = Scene::new();
        let parent = scene.spawn_named("parent", Transform::default());
        let child = scene.spawn(Transform::new(Vec3::X));
        scene
            .set_renderable(parent, Renderable::new(MeshHandle(0), MaterialHandle(0)))
            .unwrap();
        scene.set_parent(child, parent).unwrap();

        assert!(scene.despawn(parent).is_some());
        assert!(scene.renderable(parent).is_none());
        assert!(scene.name(parent).is_none());
        assert_eq!(scene.parent(child), None);
        assert!(scene.despawn(parent).is_none());
    }

    #[test]
    fn components_require_a_live_entity() {
        let mut scene = Scene::new();
        let ghost = EntityId(9);
        assert_eq!(
            scene.set_name(ghost, "ghost"),
            Err(SceneError::UnknownEntity(ghost))
        );
    }

    #[test]
    fn parent_cycles_are_rejected() {
        let mut scene = Scene::new();
        let a = scene.spawn(Transform::default());
        let b = scene.spawn(Transform::default());
        let c = scene.spawn(Transform::default());
        scene.set_parent(b, a).unwrap();
        scene.set_parent(c, b).unwrap();

        assert_eq!(scene.set_parent(a, c), Err(SceneError::Cycle { child: a, parent: c }));
        assert_eq!(scene.set_parent(a, a), Err(SceneError::SelfParent(a)));
        assert_eq!(scene.depth(c), 2);
        assert_eq!(scene.children(a).collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn hierarchy_order_puts_parents_first() {
        let mut scene = Scene::new();
        let child = scene.spawn(Transform::default());
        let root = scene.spawn(Transform::default());
        let grandchild = scene.spawn(Transform::default());
        scene.set_parent(child, root).unwrap();
        scene.set_parent(grandchild, child).unwrap();

        assert_eq!(scene.hierarchy_order(), vec![root, child, grandchild]);
    }

    #[test]
    fn find_by_name_and_summary() {
        let mut scene = Scene::new();
        let planet = scene.spawn_named("planet", Transform::default());
        let rock = scene.spawn_named("rock", Transform::default());
        scene.set_parent(rock, planet).unwrap();
        scene
            .set_renderable(rock, Renderable::new(MeshHandle(1), MaterialHandle(0)))
            .unwrap();

        assert_eq!(scene.find_by_name("rock"), Some(rock));
        assert_eq!(scene.find_by_name("moon"), None);
        assert_eq!(
            scene.summary(),
            SceneSummary {
                entities: 2,
                renderables: 1,
                roots: 1
            }
        );
    }
}
