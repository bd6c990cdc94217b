//! CPU-side packing of the per-frame and per-instance GPU data.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use vista_render::uniforms::{self, ShaderProgram, UniformValue};

/// Uniform layout shared by the scene and skybox shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// x: hdr flag (0 or 1), y: exposure, zw unused.
    pub params: [f32; 4],
}

/// Named-uniform program whose values are packed into [`SceneUniforms`].
///
/// `modelMatrix` is accepted but unused: every draw reads its model matrix
/// from the instance buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneProgram {
    view: Mat4,
    projection: Mat4,
    camera_position: Vec3,
    hdr: bool,
    exposure: f32,
}

impl Default for SceneProgram {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            hdr: false,
            exposure: 1.0,
        }
    }
}

impl SceneProgram {
    pub fn pack(&self) -> SceneUniforms {
        let view_proj = self.projection * self.view;
        SceneUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            camera_position: self.camera_position.extend(1.0).to_array(),
            params: [if self.hdr { 1.0 } else { 0.0 }, self.exposure, 0.0, 0.0],
        }
    }
}

impl ShaderProgram for SceneProgram {
    fn use_program(&mut self) {}

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        match (name, value) {
            (uniforms::VIEW_MATRIX, UniformValue::Mat4(m)) => self.view = m,
            (uniforms::PROJECTION_MATRIX, UniformValue::Mat4(m)) => self.projection = m,
            (uniforms::CAMERA_POSITION, UniformValue::Vec3(v)) => self.camera_position = v,
            (uniforms::HDR, UniformValue::Int(flag)) => self.hdr = flag != 0,
            (uniforms::EXPOSURE, UniformValue::Float(exposure)) => self.exposure = exposure,
            _ => tracing::trace!(name, "uniform not used by the scene program"),
        }
    }
}

/// Per-instance vertex data: model matrix plus its normal matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the upper 3x3, one padded column per row.
    pub normal: [[f32; 4]; 3],
}

impl InstanceData {
    pub fn from_model(model: Mat4) -> Self {
        let linear = Mat3::from_mat4(model);
        let normal = if linear.determinant().abs() > f32::EPSILON {
            linear.inverse().transpose()
        } else {
            Mat3::IDENTITY
        };
        Self {
            model: model.to_cols_array_2d(),
            normal: [
                normal.x_axis.extend(0.0).to_array(),
                normal.y_axis.extend(0.0).to_array(),
                normal.z_axis.extend(0.0).to_array(),
            ],
        }
    }
}

/// Material layout of the scene shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub base_color: [f32; 4],
    pub emissive: [f32; 4],
}

impl MaterialUniforms {
    pub fn new(base_color: [f32; 4], emissive: [f32; 3]) -> Self {
        Self {
            base_color,
            emissive: [emissive[0], emissive[1], emissive[2], 0.0],
        }
    }
}
