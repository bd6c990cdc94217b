//! Named-uniform contract between the frame loop and shader programs.

use glam::{Mat4, Vec3};
use std::collections::BTreeMap;

pub const VIEW_MATRIX: &str = "viewMatrix";
pub const PROJECTION_MATRIX: &str = "projectionMatrix";
pub const MODEL_MATRIX: &str = "modelMatrix";
pub const CAMERA_POSITION: &str = "cameraPosition";
pub const HDR: &str = "hdr";
pub const EXPOSURE: &str = "exposure";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec3(Vec3),
    Float(f32),
    Int(i32),
}

/// A linked shader program that accepts named uniforms.
///
/// Setting a uniform the program does not declare is not an error; GPU
/// backends silently drop it.
pub trait ShaderProgram {
    /// Make this program current for subsequent uniform writes and draws.
    fn use_program(&mut self);

    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }
}

/// CPU-side program that records the latest value of every uniform.
///
/// Backends pack it into their own buffer layout; tests inspect it directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformSet {
    label: String,
    values: BTreeMap<String, UniformValue>,
    bind_count: u32,
}

impl UniformSet {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of `use_program` calls seen so far.
    pub fn bind_count(&self) -> u32 {
        self.bind_count
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.values.get(name).copied()
    }

    pub fn mat4(&self, name: &str) -> Option<Mat4> {
        match self.get(name)? {
            UniformValue::Mat4(m) => Some(m),
            _ => None,
        }
    }

    pub fn vec3(&self, name: &str) -> Option<Vec3> {
        match self.get(name)? {
            UniformValue::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            UniformValue::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            UniformValue::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, UniformValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl ShaderProgram for UniformSet {
    fn use_program(&mut self) {
        self.bind_count += 1;
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.values.insert(name.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_setters_store_latest_value() {
        let mut program = UniformSet::new("scene");
        program.use_program();
        program.set_float(EXPOSURE, 1.0);
        program.set_float(EXPOSURE, 2.5);
        program.set_int(HDR, 1);
        program.set_vec3(CAMERA_POSITION, Vec3::new(0.0, 0.0, 3.0));

        assert_eq!(program.bind_count(), 1);
        assert_eq!(program.float(EXPOSURE), Some(2.5));
        assert_eq!(program.int(HDR), Some(1));
        assert_eq!(program.vec3(CAMERA_POSITION), Some(Vec3::new(0.0, 0.0, 3.0)));
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn typed_getter_rejects_mismatched_kind() {
        let mut program = UniformSet::new("scene");
        program.set_mat4(VIEW_MATRIX, Mat4::IDENTITY);
        assert_eq!(program.mat4(VIEW_MATRIX), Some(Mat4::IDENTITY));
        assert_eq!(program.float(VIEW_MATRIX), None);
        assert_eq!(program.mat4(PROJECTION_MATRIX), None);
    }
}
