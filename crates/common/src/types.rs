use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Plain arena identifier for an entity in a scene.
///
/// Ids are handed out sequentially by the owning scene and never reused
/// within its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a mesh (or multi-mesh model) owned by an asset store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

impl MeshHandle {
    /// Returned when a model failed to load; never resolves to a mesh.
    pub const INVALID: MeshHandle = MeshHandle(u32::MAX);

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

/// Handle to a material (base color plus optional texture).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialHandle(pub u32);

/// Handle to decoded texture data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// Returned when an image failed to load; renderers substitute a
    /// fallback texture.
    pub const INVALID: TextureHandle = TextureHandle(u32::MAX);

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

/// Direction of a keyboard-driven camera step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

impl CameraMovement {
    pub const ALL: [CameraMovement; 4] = [
        CameraMovement::Forward,
        CameraMovement::Backward,
        CameraMovement::Left,
        CameraMovement::Right,
    ];
}

/// Which demo scene the harness runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoKind {
    /// A single textured model at the origin.
    #[default]
    Model,
    /// A planet circled by a ring of instanced rocks.
    Instancing,
    /// A lit tunnel rendered with an exposure-controlled HDR toggle.
    Hdr,
}

impl DemoKind {
    pub const ALL: [DemoKind; 3] = [DemoKind::Model, DemoKind::Instancing, DemoKind::Hdr];

    pub fn as_str(&self) -> &'static str {
        match self {
            DemoKind::Model => "model",
            DemoKind::Instancing => "instancing",
            DemoKind::Hdr => "hdr",
        }
    }
}

impl fmt::Display for DemoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown demo '{0}' (expected one of: model, instancing, hdr)")]
pub struct ParseDemoKindError(pub String);

impl FromStr for DemoKind {
    type Err = ParseDemoKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DemoKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseDemoKindError(s.to_string()))
    }
}
