use crate::decompose::{Decomposition, decompose_matrix};
use glam::{Mat4, Quat, Vec3, Vec4};

/// Matrix-backed spatial transform of a movable entity.
///
/// `translate`, `rotate` and `scale` right-multiply the local matrix, so they
/// act in the entity's current local frame. The world matrix is written by
/// the owning scene when it propagates parent transforms; a fresh transform
/// has an identity world matrix.
///
/// Scale, rotation, skew and perspective are only available through the
/// decomposition cache, refreshed by [`Transform::decompose`]. Until then the
/// getters return zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    local: Mat4,
    world: Mat4,
    local_parts: Decomposition,
    world_parts: Decomposition,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Transform {
    /// Identity local and world matrices, then `translate(local_position)`.
    pub fn new(local_position: Vec3) -> Self {
        let mut transform = Self {
            local: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
            local_parts: Decomposition::default(),
            world_parts: Decomposition::default(),
        };
        transform.translate(local_position);
        transform
    }

    pub fn local_matrix(&self) -> Mat4 {
        self.local
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// Overwrite the local-to-world matrix (scene propagation).
    pub fn set_world_matrix(&mut self, world: Mat4) {
        self.world = world;
    }

    pub fn translate(&mut self, translation: Vec3) {
        self.local *= Mat4::from_translation(translation);
    }

    /// Rotate by `angle_degrees` around `axis`. The axis is normalized first;
    /// a zero axis yields NaN entries.
    pub fn rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        self.local *= Mat4::from_axis_angle(axis.normalize(), angle_degrees.to_radians());
    }

    pub fn scale(&mut self, scale: Vec3) {
        self.local *= Mat4::from_scale(scale);
    }

    /// Refresh the cached components of both the local and world matrices.
    ///
    /// A matrix that cannot be decomposed leaves its cache untouched.
    pub fn decompose(&mut self) {
        match decompose_matrix(&self.local) {
            Some(parts) => self.local_parts = adapt_rotation_convention(parts),
            None => tracing::trace!("local matrix is singular; keeping cached components"),
        }
        match decompose_matrix(&self.world) {
            Some(parts) => self.world_parts = adapt_rotation_convention(parts),
            None => tracing::trace!("world matrix is singular; keeping cached components"),
        }
    }

    /// Translation of the local matrix, read live from the matrix or from the
    /// decomposition cache.
    pub fn local_position(&self, decomposed: bool) -> Vec3 {
        if decomposed {
            self.local_parts.translation
        } else {
            self.local.w_axis.truncate()
        }
    }

    pub fn world_position(&self, decomposed: bool) -> Vec3 {
        if decomposed {
            self.world_parts.translation
        } else {
            self.world.w_axis.truncate()
        }
    }

    pub fn local_scale(&self) -> Vec3 {
        self.local_parts.scale
    }

    pub fn local_rotation(&self) -> Quat {
        self.local_parts.rotation
    }

    pub fn local_skew(&self) -> Vec3 {
        self.local_parts.skew
    }

    pub fn local_perspective(&self) -> Vec4 {
        self.local_parts.perspective
    }

    pub fn world_scale(&self) -> Vec3 {
        self.world_parts.scale
    }

    pub fn world_rotation(&self) -> Quat {
        self.world_parts.rotation
    }

    pub fn world_skew(&self) -> Vec3 {
        self.world_parts.skew
    }

    pub fn world_perspective(&self) -> Vec4 {
        self.world_parts.perspective
    }
}

/// Rotation convention of the cached components: the conjugate of the
/// quaternion produced by `decompose_matrix`.
///
/// For unit quaternions this is the inverse rotation. Consumers that rebuild
/// a matrix from the cache must conjugate back.
fn adapt_rotation_convention(mut parts: Decomposition) -> Decomposition {
    parts.rotation = parts.rotation.conjugate();
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same_rotation(a: Quat, b: Quat) -> bool {
        a.dot(b).abs() > 1.0 - 1e-5
    }

    #[test]
    fn new_translates_local_only() {
        let t = Transform::new(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.local_position(false), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.world_matrix(), Mat4::IDENTITY);
        assert_eq!(t.world_position(false), Vec3::ZERO);
    }

    #[test]
    fn translate_then_decompose_round_trips_position() {
        let mut t = Transform::default();
        t.translate(Vec3::new(-3.5, 0.25, 9.0));
        t.decompose();
        assert!(t.local_position(true).abs_diff_eq(Vec3::new(-3.5, 0.25, 9.0), 1e-5));
        assert!(t.local_scale().abs_diff_eq(Vec3::ONE, 1e-6));
    }

    #[test]
    fn cached_components_are_zero_before_decompose() {
        let t = Transform::new(Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(t.local_position(true), Vec3::ZERO);
        assert_eq!(t.local_scale(), Vec3::ZERO);
        assert_eq!(t.local_rotation().length_squared(), 0.0);
        assert_eq!(t.world_perspective(), Vec4::ZERO);
    }

    #[test]
    fn cache_goes_stale_until_next_decompose() {
        let mut t = Transform::default();
        t.translate(Vec3::X);
        t.decompose();
        t.translate(Vec3::X);
        assert_eq!(t.local_position(false), Vec3::new(2.0, 0.0, 0.0));
        assert!(t.local_position(true).abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn decompose_is_idempotent() {
        let mut t = Transform::new(Vec3::new(1.0, -2.0, 0.5));
        t.rotate(33.0, Vec3::new(0.0, 1.0, 1.0));
        t.scale(Vec3::new(2.0, 2.0, 0.5));
        t.decompose();
        let first = t.clone();
        t.decompose();
        assert_eq!(first, t);
    }

    #[test]
    fn operations_compose_in_local_frame() {
        let mut t = Transform::default();
        t.rotate(90.0, Vec3::Y);
        // Local +X now points along world -Z.
        t.translate(Vec3::X);
        assert!(t.local_position(false).abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));

        let mut s = Transform::default();
        s.scale(Vec3::splat(2.0));
        s.translate(Vec3::X);
        assert!(s.local_position(false).abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn cached_rotation_is_conjugated() {
        let mut t = Transform::default();
        t.rotate(90.0, Vec3::Y);
        t.decompose();
        let applied = Quat::from_rotation_y(90.0_f32.to_radians());
        assert!(same_rotation(t.local_rotation(), applied.conjugate()));
        assert!(same_rotation(t.local_rotation().conjugate(), applied));
    }

    #[test]
    fn world_components_follow_world_matrix() {
        let mut t = Transform::new(Vec3::X);
        t.set_world_matrix(Mat4::from_translation(Vec3::new(0.0, 4.0, 0.0)) * t.local_matrix());
        t.decompose();
        assert!(t.world_position(true).abs_diff_eq(Vec3::new(1.0, 4.0, 0.0), 1e-6));
        assert_eq!(t.world_position(false), t.world_position(true));
        assert!(t.world_scale().abs_diff_eq(Vec3::ONE, 1e-6));
        assert_eq!(t.world_skew(), Vec3::ZERO);
    }

    #[test]
    fn singular_local_keeps_previous_cache() {
        let mut t = Transform::new(Vec3::Y);
        t.decompose();
        t.scale(Vec3::ZERO);
        t.decompose();
        assert!(t.local_position(true).abs_diff_eq(Vec3::Y, 1e-6));
        assert!(t.local_scale().abs_diff_eq(Vec3::ONE, 1e-6));
    }
}
