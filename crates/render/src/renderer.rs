use crate::draw::DrawList;
use crate::uniforms::{self, ShaderProgram, UniformSet};
use glam::{Mat4, Vec3};
use std::fmt::Write as _;
use thiserror::Error;

/// Per-frame camera and post-processing state handed to a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub hdr: bool,
    pub exposure: f32,
    /// Framebuffer size in pixels.
    pub viewport: (u32, u32),
}

impl Default for FrameView {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            hdr: false,
            exposure: 1.0,
            viewport: (1, 1),
        }
    }
}

impl FrameView {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Bind `program` and write the per-frame uniforms.
    pub fn apply(&self, program: &mut impl ShaderProgram) {
        program.use_program();
        program.set_mat4(uniforms::PROJECTION_MATRIX, self.projection);
        program.set_mat4(uniforms::VIEW_MATRIX, self.view);
        program.set_vec3(uniforms::CAMERA_POSITION, self.camera_position);
        program.set_int(uniforms::HDR, i32::from(self.hdr));
        program.set_float(uniforms::EXPOSURE, self.exposure);
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface lost")]
    SurfaceLost,
    #[error("surface outdated")]
    SurfaceOutdated,
    #[error("timed out acquiring the next frame")]
    Timeout,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("renderer backend error: {0}")]
    Backend(String),
}

impl RenderError {
    /// Lost or outdated surfaces and timeouts are recovered by reconfiguring
    /// and skipping the frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RenderError::SurfaceLost | RenderError::SurfaceOutdated | RenderError::Timeout
        )
    }
}

/// Backend-agnostic renderer. It reads the frame view and draw list and
/// never touches scene state.
pub trait Renderer {
    /// Record and submit the frame's draws.
    fn render(&mut self, frame: &FrameView, draws: &DrawList) -> Result<(), RenderError>;

    /// Make the most recently rendered frame visible.
    fn present(&mut self) {}
}

/// What [`DebugTextRenderer`] captured for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub view: FrameView,
    pub uniforms: UniformSet,
    pub draw_calls: usize,
    pub instances: usize,
    pub text: String,
}

/// Headless renderer that drives the uniform contract through a
/// [`UniformSet`] and produces a human-readable frame dump.
///
/// Used by the CLI and by frame-loop tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: Vec<RecordedFrame>,
    rendered: u64,
    presented: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Drain the recorded frames. Frame numbering keeps counting.
    pub fn take_frames(&mut self) -> Vec<RecordedFrame> {
        std::mem::take(&mut self.frames)
    }
}

impl Renderer for DebugTextRenderer {
    fn render(&mut self, frame: &FrameView, draws: &DrawList) -> Result<(), RenderError> {
        let mut program = UniformSet::new("debug");
        frame.apply(&mut program);

        let mut text = String::new();
        let p = frame.camera_position;
        let _ = writeln!(
            text,
            "=== Frame {} (viewport {}x{}) ===",
            self.rendered,
            frame.viewport.0,
            frame.viewport.1
        );
        let _ = writeln!(
            text,
            "Camera: pos=({:.2}, {:.2}, {:.2}) hdr={} exposure={:.2}",
            p.x, p.y, p.z, frame.hdr, frame.exposure
        );
        let _ = writeln!(
            text,
            "Batches: {} Instances: {}",
            draws.batch_count(),
            draws.instance_count()
        );

        let mut draw_calls = 0;
        for batch in draws.batches() {
            if !batch.is_instanced() {
                if let Some(model) = batch.models.first() {
                    program.set_mat4(uniforms::MODEL_MATRIX, *model);
                }
            }
            draw_calls += 1;
            let _ = writeln!(
                text,
                "  mesh={} material={} instances={}",
                batch.mesh.0,
                batch.material.0,
                batch.instance_count()
            );
        }

        self.rendered += 1;
        self.frames.push(RecordedFrame {
            view: *frame,
            uniforms: program,
            draw_calls,
            instances: draws.instance_count(),
            text,
        });
        Ok(())
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_common::{MaterialHandle, MeshHandle};

    #[test]
    fn debug_renderer_empty_frame() {
        let mut renderer = DebugTextRenderer::new();
        renderer.render(&FrameView::default(), &DrawList::new()).unwrap();
        let frame = renderer.last_frame().unwrap();
        assert!(frame.text.contains("Frame 0"));
        assert!(frame.text.contains("Batches: 0 Instances: 0"));
        assert_eq!(frame.draw_calls, 0);
    }

    #[test]
    fn debug_renderer_writes_frame_uniforms() {
        let view = FrameView {
            view: Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0)),
            camera_position: Vec3::new(0.0, 0.0, 3.0),
            hdr: true,
            exposure: 2.0,
            ..FrameView::default()
        };
        let mut renderer = DebugTextRenderer::new();
        renderer.render(&view, &DrawList::new()).unwrap();

        let program = &renderer.last_frame().unwrap().uniforms;
        assert_eq!(program.bind_count(), 1);
        assert_eq!(program.mat4(uniforms::VIEW_MATRIX), Some(view.view));
        assert_eq!(program.int(uniforms::HDR), Some(1));
        assert_eq!(program.float(uniforms::EXPOSURE), Some(2.0));
        assert_eq!(
            program.vec3(uniforms::CAMERA_POSITION),
            Some(Vec3::new(0.0, 0.0, 3.0))
        );
    }

    #[test]
    fn single_instances_set_model_matrix() {
        let mut draws = DrawList::new();
        let model = Mat4::from_translation(Vec3::Y);
        draws.push(MeshHandle(0), MaterialHandle(0), model);
        for _ in 0..3 {
            draws.push(MeshHandle(1), MaterialHandle(0), Mat4::IDENTITY);
        }

        let mut renderer = DebugTextRenderer::new();
        renderer.render(&FrameView::default(), &draws).unwrap();
        renderer.present();

        let frame = renderer.last_frame().unwrap();
        assert_eq!(frame.draw_calls, 2);
        assert_eq!(frame.instances, 4);
        assert_eq!(frame.uniforms.mat4(uniforms::MODEL_MATRIX), Some(model));
        assert!(frame.text.contains("mesh=1 material=0 instances=3"));
        assert_eq!(renderer.presented(), 1);
    }

    #[test]
    fn taking_frames_releases_history_but_keeps_numbering() {
        let mut renderer = DebugTextRenderer::new();
        renderer.render(&FrameView::default(), &DrawList::new()).unwrap();
        assert_eq!(renderer.take_frames().len(), 1);
        assert!(renderer.frames().is_empty());

        renderer.render(&FrameView::default(), &DrawList::new()).unwrap();
        assert_eq!(renderer.frames().len(), 1);
        assert!(renderer.last_frame().unwrap().text.contains("Frame 1"));
    }

    #[test]
    fn recoverable_errors() {
        assert!(RenderError::SurfaceLost.is_recoverable());
        assert!(RenderError::Timeout.is_recoverable());
        assert!(!RenderError::OutOfMemory.is_recoverable());
    }
}
