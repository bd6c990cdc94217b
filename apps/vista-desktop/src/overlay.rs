use vista_render_wgpu::{GpuContext, OverlayPass};

/// Tessellated egui output waiting for the next rendered frame.
struct PendingFrame {
    jobs: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
    pixels_per_point: f32,
}

/// egui painted over the scene inside the renderer's frame.
pub struct EguiOverlay {
    renderer: egui_wgpu::Renderer,
    pending: Option<PendingFrame>,
}

impl EguiOverlay {
    pub fn new(gpu: &GpuContext) -> Self {
        Self {
            renderer: egui_wgpu::Renderer::new(gpu.device(), gpu.format(), None, 1, false),
            pending: None,
        }
    }

    /// Queue egui output for the next frame. Texture updates from a frame
    /// that was never painted are carried over.
    pub fn prepare(
        &mut self,
        jobs: Vec<egui::ClippedPrimitive>,
        mut textures: egui::TexturesDelta,
        pixels_per_point: f32,
    ) {
        if let Some(previous) = self.pending.take() {
            let mut carried = previous.textures;
            carried.append(textures);
            textures = carried;
        }
        self.pending = Some(PendingFrame {
            jobs,
            textures,
            pixels_per_point,
        });
    }
}

impl OverlayPass for EguiOverlay {
    fn paint(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) {
        let Some(frame) = self.pending.take() else {
            return;
        };
        let (width, height) = gpu.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: frame.pixels_per_point,
        };

        for (id, image_delta) in &frame.textures.set {
            self.renderer
                .update_texture(gpu.device(), gpu.queue(), *id, image_delta);
        }
        self.renderer.update_buffers(
            gpu.device(),
            gpu.queue(),
            encoder,
            &frame.jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer
                .render(&mut pass, &frame.jobs, &screen_descriptor);
        }
        for id in &frame.textures.free {
            self.renderer.free_texture(id);
        }
    }
}
