//! Asset loading: decoded textures, OBJ models and the built-in cube.
//!
//! The renderer consumes assets by handle, never by file path. Loads that
//! fail are logged and yield an `INVALID` handle instead of an error, so a
//! demo keeps running with a placeholder.

mod mesh;
mod model;
mod store;
mod texture;

pub use mesh::{MeshData, Vertex};
pub use model::{ModelData, ObjMaterial, ObjScene, SubMesh, load_obj};
pub use store::{AssetStore, MaterialData};
pub use texture::{
    CUBEMAP_FACES, CubemapData, PixelFormat, TextureData, cubemap_paths, load_cubemap,
    load_texture,
};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to load OBJ {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("unsupported channel count {channels} in {path}")]
    UnsupportedChannels { path: PathBuf, channels: u8 },
    #[error("a cubemap needs 6 faces, got {0}")]
    CubemapFaceCount(usize),
    #[error("cubemap face {path} is {width}x{height}, expected {expected_width}x{expected_height}")]
    CubemapFaceSize {
        path: PathBuf,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
}
