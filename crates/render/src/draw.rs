use glam::Mat4;
use std::collections::BTreeMap;
use vista_common::{MaterialHandle, MeshHandle};

/// One mesh/material pair and the model matrix of every instance using it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawBatch<'a> {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub models: &'a [Mat4],
}

impl DrawBatch<'_> {
    pub fn instance_count(&self) -> u32 {
        self.models.len() as u32
    }

    /// Batches with more than one instance are drawn with a single instanced
    /// call; single instances get a `modelMatrix` uniform instead.
    pub fn is_instanced(&self) -> bool {
        self.models.len() > 1
    }
}

/// Draw submissions for one frame, grouped by (mesh, material).
///
/// Batches iterate in handle order and instances in submission order, so a
/// deterministic scene walk yields a deterministic list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    batches: BTreeMap<(MeshHandle, MaterialHandle), Vec<Mat4>>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one instance. Invalid meshes are skipped.
    pub fn push(&mut self, mesh: MeshHandle, material: MaterialHandle, model: Mat4) {
        if !mesh.is_valid() {
            tracing::trace!(?material, "skipping draw with invalid mesh handle");
            return;
        }
        self.batches.entry((mesh, material)).or_default().push(model);
    }

    pub fn batches(&self) -> impl Iterator<Item = DrawBatch<'_>> {
        self.batches
            .iter()
            .map(|((mesh, material), models)| DrawBatch {
                mesh: *mesh,
                material: *material,
                models,
            })
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn instance_count(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn clear(&mut self) {
        self.batches.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn groups_instances_by_mesh_and_material() {
        let mut list = DrawList::new();
        let rock = MeshHandle(1);
        let planet = MeshHandle(0);
        for i in 0..4 {
            list.push(rock, MaterialHandle(1), Mat4::from_translation(Vec3::X * i as f32));
        }
        list.push(planet, MaterialHandle(0), Mat4::IDENTITY);

        assert_eq!(list.batch_count(), 2);
        assert_eq!(list.instance_count(), 5);

        let batches: Vec<_> = list.batches().collect();
        assert_eq!(batches[0].mesh, planet);
        assert!(!batches[0].is_instanced());
        assert_eq!(batches[1].instance_count(), 4);
        assert!(batches[1].is_instanced());
        // Submission order is kept within a batch.
        assert_eq!(batches[1].models[3].w_axis.x, 3.0);
    }

    #[test]
    fn invalid_mesh_is_dropped() {
        let mut list = DrawList::new();
        list.push(MeshHandle::INVALID, MaterialHandle(0), Mat4::IDENTITY);
        assert!(list.is_empty());
    }

    #[test]
    fn clear_empties_the_list() {
        let mut list = DrawList::new();
        list.push(MeshHandle(0), MaterialHandle(0), Mat4::IDENTITY);
        list.clear();
        assert_eq!(list.instance_count(), 0);
    }
}
