use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use vista_common::DemoKind;
use vista_render::{Camera, Projection, camera};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "vista".to_owned(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    pub zoom: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            world_up: Vec3::Y,
            yaw: camera::DEFAULT_YAW,
            pitch: camera::DEFAULT_PITCH,
            speed: camera::DEFAULT_SPEED,
            sensitivity: camera::DEFAULT_SENSITIVITY,
            zoom: camera::DEFAULT_ZOOM,
        }
    }
}

impl CameraSettings {
    pub fn build(&self) -> Camera {
        let mut camera = Camera::new(self.position, self.world_up, self.yaw, self.pitch);
        camera.movement_speed = self.speed;
        camera.mouse_sensitivity = self.sensitivity;
        camera.set_zoom(self.zoom);
        camera
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        let projection = Projection::default();
        Self {
            near: projection.near,
            far: projection.far,
        }
    }
}

impl ProjectionSettings {
    pub fn build(&self) -> Projection {
        Projection {
            near: self.near,
            far: self.far,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HdrSettings {
    pub enabled: bool,
    pub exposure: f32,
    /// Exposure change per second while Q or E is held.
    pub exposure_rate: f32,
}

impl Default for HdrSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            exposure: 1.0,
            exposure_rate: 0.5,
        }
    }
}

/// Cubemap background: six face images named `right`, `left`, `top`,
/// `bottom`, `front`, `back` with a shared extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyboxSettings {
    pub dir: PathBuf,
    pub extension: String,
}

impl Default for SkyboxSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("skybox"),
            extension: "jpg".to_owned(),
        }
    }
}

/// Harness configuration, read from YAML. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    pub projection: ProjectionSettings,
    pub hdr: HdrSettings,
    pub demo: DemoKind,
    /// Upper bound on a frame's delta time in seconds.
    pub max_frame_delta: Option<f32>,
    pub model_path: Option<PathBuf>,
    pub texture_path: Option<PathBuf>,
    pub skybox: Option<SkyboxSettings>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_yaml(&text)?;
        tracing::debug!(path = %path.display(), demo = %settings.demo, "settings loaded");
        Ok(settings)
    }

    pub fn from_yaml(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String, SettingsError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
