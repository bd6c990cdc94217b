//! Frame orchestration: clock, window host contract, settings, demo setup
//! and the loop that ties input, camera, scene and renderer together.
//!
//! # Invariants
//! - Per frame, in order: clock, input poll, camera update, projection,
//!   view, draw, present.
//! - The framebuffer size is read once per frame, after the event poll.
//! - Keyboard movement uses the current frame's delta time.

mod clock;
mod frame_loop;
mod host;
mod settings;
mod setup;

pub use clock::{Clock, FrameStats, ManualTime, MonotonicTime, TimeSource};
pub use frame_loop::{FrameError, FrameLoop, FrameReport, HdrState};
pub use host::{FrameHost, ScriptedFrame, ScriptedHost};
pub use setup::{DemoSetup, load_demo};
pub use settings::{
    CameraSettings, HdrSettings, ProjectionSettings, Settings, SettingsError, SkyboxSettings,
    WindowSettings,
};
