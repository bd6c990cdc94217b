//! wgpu render backend.
//!
//! Uploads an [`vista_assets::AssetStore`] once, then draws each frame's
//! [`vista_render::DrawList`] as instanced, material-bound draws followed by
//! an optional cubemap skybox and an optional overlay pass.
//!
//! # Invariants
//! - The renderer never mutates scene state.
//! - Surface size follows the frame's viewport; a zero-sized viewport skips
//!   the frame without touching the surface.

mod context;
mod gpu;
mod shaders;
mod textures;
mod uniforms;

pub use context::{GpuContext, GpuInitError};
pub use gpu::{OverlayPass, WgpuRenderer};
pub use textures::texture_format;
pub use uniforms::{InstanceData, MaterialUniforms, SceneProgram, SceneUniforms};
