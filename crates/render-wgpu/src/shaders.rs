/// WGSL shader for lit, textured, instanced meshes with optional HDR tone
/// mapping.
pub const SCENE_SHADER: &str = r#"
struct Scene {
    view_proj: mat4x4<f32>,
    inv_view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    // x: hdr flag, y: exposure
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> scene: Scene;

struct Material {
    base_color: vec4<f32>,
    emissive: vec4<f32>,
};

@group(1) @binding(0)
var<uniform> material: Material;
@group(1) @binding(1)
var albedo_texture: texture_2d<f32>;
@group(1) @binding(2)
var albedo_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) normal_0: vec4<f32>,
    @location(8) normal_1: vec4<f32>,
    @location(9) normal_2: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let normal_matrix = mat3x3<f32>(
        instance.normal_0.xyz,
        instance.normal_1.xyz,
        instance.normal_2.xyz,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = scene.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = normal_matrix * vertex.normal;
    out.uv = vertex.uv;
    return out;
}

fn tone_map(color: vec3<f32>) -> vec3<f32> {
    if (scene.params.x > 0.5) {
        return vec3<f32>(1.0) - exp(-color * scene.params.y);
    }
    return clamp(color, vec3<f32>(0.0), vec3<f32>(1.0));
}

@fragment
fn fs_main(in: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    let albedo = textureSample(albedo_texture, albedo_sampler, in.uv) * material.base_color;

    // Two-sided: interiors (the HDR tunnel) face away from their normals.
    var n = normalize(in.world_normal);
    if (!front) {
        n = -n;
    }
    let to_eye = normalize(scene.camera_position.xyz - in.world_position);
    let key_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let diffuse = max(dot(n, key_dir), 0.0) * 0.6 + max(dot(n, to_eye), 0.0) * 0.4;
    let ambient = 0.15;

    let color = albedo.rgb * (ambient + diffuse) + material.emissive.rgb;
    return vec4<f32>(tone_map(color), albedo.a);
}
"#;

/// WGSL shader for the cubemap background, drawn as a fullscreen triangle at
/// the far plane.
pub const SKYBOX_SHADER: &str = r#"
struct Scene {
    view_proj: mat4x4<f32>,
    inv_view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> scene: Scene;

@group(1) @binding(0)
var sky_texture: texture_cube<f32>;
@group(1) @binding(1)
var sky_sampler: sampler;

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

@vertex
fn vs_sky(@builtin(vertex_index) index: u32) -> SkyOutput {
    let x = f32(i32(index & 1u) * 4 - 1);
    let y = f32(i32(index >> 1u) * 4 - 1);

    var out: SkyOutput;
    out.clip_position = vec4<f32>(x, y, 1.0, 1.0);
    out.ndc = vec2<f32>(x, y);
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    let far = scene.inv_view_proj * vec4<f32>(in.ndc, 1.0, 1.0);
    let dir = far.xyz / far.w - scene.camera_position.xyz;
    return textureSample(sky_texture, sky_sampler, normalize(dir));
}
"#;
