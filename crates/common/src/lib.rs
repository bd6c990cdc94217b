//! Shared types for the vista render harness.
//!
//! # Invariants
//! - `Transform` mutations right-multiply the local matrix.
//! - Decomposed transform components are a cache; they are only refreshed by
//!   an explicit `Transform::decompose` call.

mod decompose;
mod transform;
mod types;

pub use decompose::{Decomposition, decompose_matrix};
pub use transform::Transform;
pub use types::{
    CameraMovement, DemoKind, EntityId, MaterialHandle, MeshHandle, ParseDemoKindError,
    TextureHandle,
};
