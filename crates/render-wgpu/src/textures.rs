use vista_assets::{CubemapData, PixelFormat, TextureData};
use wgpu::util::DeviceExt;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// GPU format for decoded texture data.
///
/// Three-channel sources were expanded to RGBA on load, so they share the
/// four-channel formats.
pub fn texture_format(format: PixelFormat, srgb: bool) -> wgpu::TextureFormat {
    match (format, srgb) {
        (PixelFormat::R8, _) => wgpu::TextureFormat::R8Unorm,
        (PixelFormat::Rgb8 | PixelFormat::Rgba8, true) => wgpu::TextureFormat::Rgba8UnormSrgb,
        (PixelFormat::Rgb8 | PixelFormat::Rgba8, false) => wgpu::TextureFormat::Rgba8Unorm,
    }
}

pub(crate) fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    data: &TextureData,
) -> wgpu::TextureView {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: data.width.max(1),
                height: data.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(data.format, data.srgb),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &data.pixels,
    );
    texture.create_view(&Default::default())
}

/// Upload six faces as one cube texture. Faces are stored layer after layer
/// in +X, -X, +Y, -Y, +Z, -Z order, matching the cube layer order.
pub(crate) fn upload_cubemap(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    cubemap: &CubemapData,
) -> wgpu::TextureView {
    let (width, height) = cubemap.face_size();
    let srgb = cubemap.faces.first().is_some_and(|face| face.srgb);
    let pixels: Vec<u8> = cubemap
        .faces
        .iter()
        .flat_map(|face| face.pixels.iter().copied())
        .collect();

    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("skybox_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(PixelFormat::Rgba8, srgb),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &pixels,
    );
    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("skybox_view"),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    })
}

pub(crate) fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
