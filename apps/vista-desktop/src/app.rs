use crate::host::WinitHost;
use crate::overlay::EguiOverlay;
use anyhow::Context as _;
use std::sync::Arc;
use vista_frame::{DemoSetup, FrameHost, FrameLoop, HdrState, MonotonicTime, Settings};
use vista_render_wgpu::{GpuContext, WgpuRenderer};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

type DesktopLoop = FrameLoop<WinitHost, WgpuRenderer<EguiOverlay>, MonotonicTime>;

/// Snapshot of the loop state shown by the F1 overlay.
struct OverlayStatus {
    fps: f32,
    frames: u64,
    position: [f32; 3],
    yaw: f32,
    pitch: f32,
    zoom: f32,
    hdr: HdrState,
    entities: usize,
    backend: String,
}

impl OverlayStatus {
    fn capture(frame_loop: &DesktopLoop) -> Self {
        let camera = frame_loop.camera();
        let info = frame_loop.renderer().context().adapter_info();
        Self {
            fps: frame_loop.stats().fps(),
            frames: frame_loop.stats().total_frames(),
            position: camera.position.to_array(),
            yaw: camera.yaw(),
            pitch: camera.pitch(),
            zoom: camera.zoom(),
            hdr: frame_loop.hdr(),
            entities: frame_loop.scene().entity_count(),
            backend: format!("{} ({})", info.name, info.backend.to_str()),
        }
    }

    fn show(&self, ctx: &egui::Context) {
        egui::Window::new("vista")
            .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.label(format!("{:.0} fps ({} frames)", self.fps, self.frames));
                ui.label(&self.backend);
                ui.separator();
                let [x, y, z] = self.position;
                ui.label(format!("Position: ({x:.2}, {y:.2}, {z:.2})"));
                ui.label(format!("Yaw {:.1}  Pitch {:.1}", self.yaw, self.pitch));
                ui.label(format!("Zoom: {:.1}", self.zoom));
                ui.separator();
                let hdr = if self.hdr.enabled { "on" } else { "off" };
                ui.label(format!("HDR: {hdr}  Exposure: {:.2}", self.hdr.exposure));
                ui.label(format!("Entities: {}", self.entities));
            });
    }
}

/// winit application: creates the window and GPU on resume, then runs one
/// loop frame per redraw.
pub struct App {
    settings: Settings,
    setup: Option<DemoSetup>,
    frame_loop: Option<DesktopLoop>,
    egui_ctx: egui::Context,
    egui_winit: Option<egui_winit::State>,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(settings: Settings, setup: DemoSetup) -> Self {
        Self {
            settings,
            setup: Some(setup),
            frame_loop: None,
            egui_ctx: egui::Context::default(),
            egui_winit: None,
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn finish(self) -> anyhow::Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_settings = &self.settings.window;
        let attrs = Window::default_attributes()
            .with_title(window_settings.title.clone())
            .with_inner_size(PhysicalSize::new(
                window_settings.width,
                window_settings.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let size = window.inner_size();

        let gpu = GpuContext::new(
            window.clone(),
            size.width,
            size.height,
            window_settings.vsync,
        )?;
        let overlay = EguiOverlay::new(&gpu);
        let setup = self.setup.take().context("demo scene already consumed")?;
        let renderer = WgpuRenderer::new(gpu, overlay, &setup.assets, setup.skybox.as_ref());

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let host = WinitHost::new(window.clone());
        self.frame_loop = Some(FrameLoop::new(
            host,
            renderer,
            MonotonicTime::new(),
            setup.scene,
            &self.settings,
        ));
        self.egui_winit = Some(egui_winit);
        window.request_redraw();
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(frame_loop) = self.frame_loop.as_mut() else {
            return;
        };

        if frame_loop.overlay_visible() {
            if let Some(egui_winit) = self.egui_winit.as_mut() {
                let window = frame_loop.host().window().clone();
                let status = OverlayStatus::capture(frame_loop);
                let raw_input = egui_winit.take_egui_input(&window);
                let full_output = self.egui_ctx.run(raw_input, |ctx| status.show(ctx));
                egui_winit.handle_platform_output(&window, full_output.platform_output);
                let jobs = self
                    .egui_ctx
                    .tessellate(full_output.shapes, full_output.pixels_per_point);
                frame_loop.renderer_mut().overlay_mut().prepare(
                    jobs,
                    full_output.textures_delta,
                    full_output.pixels_per_point,
                );
            }
        }

        if let Err(e) = frame_loop.run_frame() {
            tracing::error!("stopping after render failure: {e}");
            self.error = Some(e.into());
            event_loop.exit();
            return;
        }
        if !frame_loop.host().is_open() {
            tracing::info!(frames = frame_loop.frame_index(), "window closed");
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.frame_loop.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("failed to start: {e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::RedrawRequested) {
            self.redraw(event_loop);
            return;
        }
        let Some(frame_loop) = self.frame_loop.as_mut() else {
            return;
        };
        if let Some(egui_winit) = self.egui_winit.as_mut() {
            // The overlay is display-only; input always reaches the host.
            let _ = egui_winit.on_window_event(frame_loop.host().window(), &event);
        }
        frame_loop.host_mut().on_window_event(&event);
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(frame_loop) = self.frame_loop.as_mut() {
            frame_loop.host_mut().on_device_event(&event);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(frame_loop) = &self.frame_loop {
            frame_loop.host().window().request_redraw();
        }
    }
}
