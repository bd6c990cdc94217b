use crate::clock::{Clock, FrameStats, TimeSource};
use crate::host::FrameHost;
use crate::settings::Settings;
use serde::Serialize;
use thiserror::Error;
use vista_ecs::{Scene, collect_draws, propagate_transforms};
use vista_input::{Action, Bindings, InputState};
use vista_render::{Camera, DrawList, FrameView, Projection, RenderError, Renderer};

#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// HDR tone-mapping switch and exposure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HdrState {
    pub enabled: bool,
    pub exposure: f32,
    pub exposure_rate: f32,
}

impl HdrState {
    fn adjust_exposure(&mut self, amount: f32) {
        self.exposure = (self.exposure + amount).max(0.0);
    }
}

/// What happened during one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameReport {
    pub index: u64,
    pub delta: f32,
    pub draw_batches: usize,
    pub instances: usize,
    /// False when the renderer skipped the frame after a recoverable error.
    pub presented: bool,
}

/// Drives the per-frame sequence over a window host, a renderer and a time
/// source. Owns the camera, the input state and the scene.
pub struct FrameLoop<H, R, T> {
    host: H,
    renderer: R,
    time: T,
    clock: Clock,
    stats: FrameStats,
    input: InputState,
    bindings: Bindings,
    camera: Camera,
    projection: Projection,
    scene: Scene,
    draws: DrawList,
    hdr: HdrState,
    overlay_visible: bool,
    frame_index: u64,
}

impl<H: FrameHost, R: Renderer, T: TimeSource> FrameLoop<H, R, T> {
    pub fn new(host: H, renderer: R, time: T, scene: Scene, settings: &Settings) -> Self {
        let bindings = Bindings::default();
        let mut input = InputState::new();
        bindings.install(&mut input);
        Self {
            host,
            renderer,
            time,
            clock: Clock::with_max_delta(settings.max_frame_delta),
            stats: FrameStats::new(),
            input,
            bindings,
            camera: settings.camera.build(),
            projection: settings.projection.build(),
            scene,
            draws: DrawList::new(),
            hdr: HdrState {
                enabled: settings.hdr.enabled,
                exposure: settings.hdr.exposure,
                exposure_rate: settings.hdr.exposure_rate,
            },
            overlay_visible: false,
            frame_index: 0,
        }
    }

    /// Replace the key bindings, re-registering toggle keys.
    pub fn set_bindings(&mut self, bindings: Bindings) {
        self.input = InputState::new();
        bindings.install(&mut self.input);
        self.bindings = bindings;
    }

    /// Run frames until the host closes. Returns the number of frames run.
    pub fn run(&mut self) -> Result<u64, FrameError> {
        let start = self.frame_index;
        while self.host.is_open() {
            self.run_frame()?;
        }
        let frames = self.frame_index - start;
        tracing::info!(frames, "frame loop finished");
        Ok(frames)
    }

    /// One full iteration: clock, input, camera, projection, view, draw,
    /// present.
    pub fn run_frame(&mut self) -> Result<FrameReport, FrameError> {
        let index = self.frame_index;
        let _span = tracing::debug_span!("frame", index).entered();

        let delta = self.clock.tick(self.time.now());
        self.stats.record(delta);

        self.host.poll_events(&mut self.input);
        self.update_camera(delta);

        let (width, height) = self.host.framebuffer_size();
        let projection = self.projection.matrix(
            self.camera.zoom(),
            Projection::aspect_ratio(width, height),
        );
        let view = self.camera.view_matrix();

        propagate_transforms(&mut self.scene);
        self.draws.clear();
        collect_draws(&self.scene, &mut self.draws);

        let frame = FrameView {
            view,
            projection,
            camera_position: self.camera.position,
            hdr: self.hdr.enabled,
            exposure: self.hdr.exposure,
            viewport: (width, height),
        };

        let presented = match self.renderer.render(&frame, &self.draws) {
            Ok(()) => {
                self.renderer.present();
                self.host.swap_buffers();
                true
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!("skipping frame {index}: {err}");
                false
            }
            Err(err) => {
                tracing::error!("render failed: {err}");
                return Err(err.into());
            }
        };

        self.frame_index += 1;
        let report = FrameReport {
            index,
            delta,
            draw_batches: self.draws.batch_count(),
            instances: self.draws.instance_count(),
            presented,
        };
        tracing::trace!(?report, "frame done");
        Ok(report)
    }

    fn update_camera(&mut self, delta: f32) {
        for offset in self.input.drain_look_offsets() {
            self.camera.process_mouse_movement(offset.x, offset.y, true);
        }
        for dy in self.input.drain_scroll_offsets() {
            self.camera.process_mouse_scroll(dy);
        }

        let toggled = self.input.update_toggles();
        for action in self.bindings.resolve(&self.input, &toggled) {
            match action {
                Action::Move(direction) => self.camera.process_keyboard(direction, delta),
                Action::Quit => {
                    tracing::info!("quit requested");
                    self.host.close();
                }
                Action::ToggleHdr => {
                    self.hdr.enabled = !self.hdr.enabled;
                    tracing::info!(enabled = self.hdr.enabled, "hdr toggled");
                }
                Action::ExposureUp => self.hdr.adjust_exposure(self.hdr.exposure_rate * delta),
                Action::ExposureDown => self.hdr.adjust_exposure(-self.hdr.exposure_rate * delta),
                Action::ToggleOverlay => self.overlay_visible = !self.overlay_visible,
            }
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn time_mut(&mut self) -> &mut T {
        &mut self.time
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn hdr(&self) -> HdrState {
        self.hdr
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn into_parts(self) -> (H, R, Scene) {
        (self.host, self.renderer, self.scene)
    }
}
