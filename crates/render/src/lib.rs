//! Rendering interface: camera, draw lists and the shader uniform contract.
//!
//! # Invariants
//! - A renderer never mutates scene state; it only consumes a [`FrameView`]
//!   and a [`DrawList`].
//! - Camera basis vectors are orthonormal after every update.
//! - Camera pitch stays within ±89° when constrained and zoom within
//!   [1°, 45°].

pub mod camera;
mod draw;
mod renderer;
pub mod uniforms;

pub use camera::{Camera, Projection};
pub use draw::{DrawBatch, DrawList};
pub use renderer::{DebugTextRenderer, FrameView, RecordedFrame, RenderError, Renderer};
pub use uniforms::{ShaderProgram, UniformSet, UniformValue};
