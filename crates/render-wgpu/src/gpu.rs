use crate::context::GpuContext;
use crate::shaders;
use crate::textures::{self, DEPTH_FORMAT};
use crate::uniforms::{InstanceData, MaterialUniforms, SceneProgram};
use std::collections::BTreeMap;
use std::ops::Range;
use vista_assets::{AssetStore, CubemapData, TextureData, Vertex};
use vista_common::{MaterialHandle, MeshHandle};
use vista_render::{DrawList, FrameView, RenderError, Renderer};
use wgpu::util::DeviceExt;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};

const INITIAL_INSTANCE_CAPACITY: u32 = 1024;

/// Extra pass drawn on top of the scene, after the skybox, into the same
/// swapchain image.
pub trait OverlayPass {
    fn paint(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    );
}

impl OverlayPass for () {
    fn paint(&mut self, _: &GpuContext, _: &mut wgpu::CommandEncoder, _: &wgpu::TextureView) {}
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material: Option<MaterialHandle>,
}

struct Skybox {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

/// wgpu implementation of [`Renderer`].
///
/// Assets are uploaded once at construction; draw batches naming meshes that
/// were not uploaded are skipped. Each batch becomes one instanced draw per
/// sub-mesh.
pub struct WgpuRenderer<O: OverlayPass = ()> {
    context: GpuContext,
    overlay: O,
    scene_pipeline: wgpu::RenderPipeline,
    program: SceneProgram,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: BTreeMap<MeshHandle, Vec<GpuMesh>>,
    materials: Vec<wgpu::BindGroup>,
    instance_buffer: wgpu::Buffer,
    instance_capacity: u32,
    skybox: Option<Skybox>,
    depth_texture: wgpu::TextureView,
    depth_size: (u32, u32),
    pending: Option<wgpu::SurfaceTexture>,
}

impl<O: OverlayPass> WgpuRenderer<O> {
    pub fn new(
        context: GpuContext,
        overlay: O,
        assets: &AssetStore,
        skybox: Option<&CubemapData>,
    ) -> Self {
        let device = context.device();
        let queue = context.queue();

        let program = SceneProgram::default();
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_uniform_buffer"),
            contents: bytemuck::bytes_of(&program.pack()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1, wgpu::TextureViewDimension::D2),
                sampler_entry(2),
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_repeat_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });
        let scene_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&scene_layout),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                            2 => Float32x2,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                            8 => Float32x4,
                            9 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: context.format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Interiors such as the HDR tunnel are viewed from inside.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Textures: missing or invalid handles sample a 1x1 white texel.
        let white = textures::upload_texture(
            device,
            queue,
            "white_texture",
            &TextureData::solid(1, 1, [255, 255, 255, 255]),
        );
        let texture_views: Vec<wgpu::TextureView> = assets
            .textures()
            .map(|(handle, data)| {
                textures::upload_texture(device, queue, &format!("texture_{}", handle.0), data)
            })
            .collect();

        let materials: Vec<wgpu::BindGroup> = assets
            .materials()
            .map(|(handle, material)| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("material_{}", material.name)),
                    contents: bytemuck::bytes_of(&MaterialUniforms::new(
                        material.base_color,
                        material.emissive,
                    )),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let view = texture_views
                    .get(material.texture.0 as usize)
                    .filter(|_| material.texture.is_valid())
                    .unwrap_or(&white);
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("material_bind_group_{}", handle.0)),
                    layout: &material_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                })
            })
            .collect();

        let mut meshes = BTreeMap::new();
        for (handle, model) in assets.models() {
            let parts = model
                .meshes
                .iter()
                .filter(|part| !part.mesh.indices.is_empty())
                .map(|part| GpuMesh {
                    vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{}_vertices", part.mesh.name)),
                        contents: bytemuck::cast_slice(&part.mesh.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{}_indices", part.mesh.name)),
                        contents: bytemuck::cast_slice(&part.mesh.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                    index_count: part.mesh.indices.len() as u32,
                    material: part.material,
                })
                .collect();
            meshes.insert(handle, parts);
        }

        let instance_capacity = INITIAL_INSTANCE_CAPACITY;
        let instance_buffer = create_instance_buffer(device, instance_capacity);

        let skybox = skybox.map(|cubemap| {
            create_skybox(
                device,
                queue,
                &uniform_layout,
                context.format(),
                cubemap,
            )
        });

        let (width, height) = context.size();
        let depth_texture = textures::create_depth_texture(device, width, height);

        tracing::info!(
            models = meshes.len(),
            materials = materials.len(),
            textures = texture_views.len(),
            skybox = skybox.is_some(),
            "uploaded assets to GPU"
        );

        Self {
            context,
            overlay,
            scene_pipeline,
            program,
            uniform_buffer,
            uniform_bind_group,
            meshes,
            materials,
            instance_buffer,
            instance_capacity,
            skybox,
            depth_texture,
            depth_size: (width, height),
            pending: None,
        }
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }

    fn ensure_instance_capacity(&mut self, needed: u32) {
        if needed <= self.instance_capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        tracing::debug!(capacity, "growing instance buffer");
        self.instance_buffer = create_instance_buffer(self.context.device(), capacity);
        self.instance_capacity = capacity;
    }

    fn ensure_depth_size(&mut self, width: u32, height: u32) {
        if self.depth_size != (width, height) {
            self.depth_texture =
                textures::create_depth_texture(self.context.device(), width, height);
            self.depth_size = (width, height);
        }
    }
}

impl<O: OverlayPass> Renderer for WgpuRenderer<O> {
    fn render(&mut self, frame: &FrameView, draws: &DrawList) -> Result<(), RenderError> {
        let (width, height) = frame.viewport;
        if !self.context.resize(width, height) {
            tracing::trace!("zero-sized framebuffer; nothing to draw");
            return Ok(());
        }
        self.ensure_depth_size(width, height);

        frame.apply(&mut self.program);
        self.context.queue().write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.program.pack()),
        );

        let mut instances: Vec<InstanceData> = Vec::with_capacity(draws.instance_count());
        let mut ranges: Vec<(MeshHandle, MaterialHandle, Range<u32>)> = Vec::new();
        for batch in draws.batches() {
            if !self.meshes.contains_key(&batch.mesh) {
                tracing::trace!(mesh = batch.mesh.0, "mesh not uploaded; skipping batch");
                continue;
            }
            let start = instances.len() as u32;
            instances.extend(batch.models.iter().map(|m| InstanceData::from_model(*m)));
            ranges.push((batch.mesh, batch.material, start..instances.len() as u32));
        }
        self.ensure_instance_capacity(instances.len() as u32);
        if !instances.is_empty() {
            self.context.queue().write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instances),
            );
        }

        let surface_texture = self.context.acquire()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame_encoder"),
                });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if !ranges.is_empty() {
                pass.set_pipeline(&self.scene_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            }
            for (mesh, material, range) in &ranges {
                let Some(parts) = self.meshes.get(mesh) else {
                    continue;
                };
                for part in parts {
                    let handle = part.material.unwrap_or(*material);
                    let Some(bind_group) = self
                        .materials
                        .get(handle.0 as usize)
                        .or_else(|| self.materials.first())
                    else {
                        continue;
                    };
                    pass.set_bind_group(1, bind_group, &[]);
                    pass.set_vertex_buffer(0, part.vertex_buffer.slice(..));
                    pass.set_index_buffer(part.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..part.index_count, 0, range.clone());
                }
            }

            if let Some(skybox) = &self.skybox {
                pass.set_pipeline(&skybox.pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_bind_group(1, &skybox.bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
        }

        self.overlay.paint(&self.context, &mut encoder, &view);

        self.context
            .queue()
            .submit(std::iter::once(encoder.finish()));
        self.pending = Some(surface_texture);
        Ok(())
    }

    fn present(&mut self) {
        if let Some(surface_texture) = self.pending.take() {
            surface_texture.present();
        }
    }
}

fn texture_entry(binding: u32, dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("instance_buffer"),
        size: u64::from(capacity) * std::mem::size_of::<InstanceData>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_skybox(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    uniform_layout: &wgpu::BindGroupLayout,
    surface_format: wgpu::TextureFormat,
    cubemap: &CubemapData,
) -> Skybox {
    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("skybox_layout"),
        entries: &[
            texture_entry(0, wgpu::TextureViewDimension::Cube),
            sampler_entry(1),
        ],
    });
    let view = textures::upload_cubemap(device, queue, cubemap);
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("skybox_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("skybox_bind_group"),
        layout: &layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("skybox_pipeline_layout"),
        bind_group_layouts: &[uniform_layout, &layout],
        push_constant_ranges: &[],
    });
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("skybox_shader"),
        source: wgpu::ShaderSource::Wgsl(shaders::SKYBOX_SHADER.into()),
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("skybox_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_sky"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_sky"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        // Drawn last at the far plane, so only uncovered pixels pass.
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    });

    Skybox {
        pipeline,
        bind_group,
    }
}
