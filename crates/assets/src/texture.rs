use crate::AssetError;
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Cubemap face file stems in upload order: +X, -X, +Y, -Y, +Z, -Z.
pub const CUBEMAP_FACES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

/// Channel layout of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Single channel, kept as one byte per pixel.
    R8,
    /// Three channels, expanded to RGBA with opaque alpha on load.
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn from_channel_count(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(Self::R8),
            3 => Some(Self::Rgb8),
            4 => Some(Self::Rgba8),
            _ => None,
        }
    }

    /// Bytes per pixel of the upload-ready data.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            Self::R8 => 1,
            Self::Rgb8 | Self::Rgba8 => 4,
        }
    }
}

/// Decoded texture, ready to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Colour data is stored in sRGB and must be linearised on sampling.
    pub srgb: bool,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// RGBA texture filled with one colour.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            srgb: false,
            pixels: rgba.repeat((width * height) as usize),
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * self.format.bytes_per_pixel()
    }
}

/// Six RGBA faces of equal size in +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Debug, Clone, PartialEq)]
pub struct CubemapData {
    pub faces: Vec<TextureData>,
}

impl CubemapData {
    pub fn face_size(&self) -> (u32, u32) {
        self.faces
            .first()
            .map(|face| (face.width, face.height))
            .unwrap_or((0, 0))
    }
}

/// Decode an image file. `gamma` marks colour data as sRGB.
pub fn load_texture(path: &Path, gamma: bool) -> Result<TextureData, AssetError> {
    let image = decode(path)?;
    let channels = image.color().channel_count();
    let format = PixelFormat::from_channel_count(channels).ok_or_else(|| {
        AssetError::UnsupportedChannels {
            path: path.to_path_buf(),
            channels,
        }
    })?;

    let (width, height) = (image.width(), image.height());
    let pixels = match format {
        PixelFormat::R8 => image.into_luma8().into_raw(),
        PixelFormat::Rgb8 | PixelFormat::Rgba8 => image.into_rgba8().into_raw(),
    };
    tracing::debug!(path = %path.display(), width, height, ?format, gamma, "texture decoded");
    Ok(TextureData {
        width,
        height,
        format,
        srgb: gamma,
        pixels,
    })
}

/// Face paths `<dir>/<face>.<extension>` in upload order.
pub fn cubemap_paths(dir: &Path, extension: &str) -> Vec<PathBuf> {
    CUBEMAP_FACES
        .iter()
        .map(|face| dir.join(format!("{face}.{extension}")))
        .collect()
}

/// Load six cubemap faces. A face that fails to decode is logged and
/// replaced by a black face so the remaining faces still show.
pub fn load_cubemap(paths: &[PathBuf]) -> Result<CubemapData, AssetError> {
    if paths.len() != CUBEMAP_FACES.len() {
        return Err(AssetError::CubemapFaceCount(paths.len()));
    }

    let decoded: Vec<Option<TextureData>> = paths
        .iter()
        .map(|path| match decode(path) {
            Ok(image) => Some(TextureData {
                width: image.width(),
                height: image.height(),
                format: PixelFormat::Rgba8,
                srgb: false,
                pixels: image.into_rgba8().into_raw(),
            }),
            Err(err) => {
                tracing::error!("cubemap face failed to load: {err}");
                None
            }
        })
        .collect();

    let (width, height) = decoded
        .iter()
        .flatten()
        .next()
        .map(|face| (face.width, face.height))
        .unwrap_or((1, 1));

    let mut faces = Vec::with_capacity(paths.len());
    for (path, face) in paths.iter().zip(decoded) {
        let face = face.unwrap_or_else(|| TextureData::solid(width, height, [0, 0, 0, 255]));
        if (face.width, face.height) != (width, height) {
            return Err(AssetError::CubemapFaceSize {
                path: path.clone(),
                width: face.width,
                height: face.height,
                expected_width: width,
                expected_height: height,
            });
        }
        faces.push(face);
    }
    Ok(CubemapData { faces })
}

fn decode(path: &Path) -> Result<DynamicImage, AssetError> {
    let io = |source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    };
    image::ImageReader::open(path)
        .map_err(io)?
        .with_guessed_format()
        .map_err(io)?
        .decode()
        .map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })
}
