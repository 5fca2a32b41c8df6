//! WGSL sources. Every program is [`COMMON`] followed by its own body.

use shaderbox_scene::ShaderProgram;

/// Bindings, vertex layout and lighting helpers shared by all programs.
pub const COMMON: &str = r#"
const PI: f32 = 3.14159265;

struct Light {
    position: vec4<f32>,
    color: vec4<f32>,
};

struct Frame {
    view_proj: mat4x4<f32>,
    inv_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    light_count: vec4<u32>,
    lights: array<Light, 8>,
};

struct Object {
    model: mat4x4<f32>,
    color1: vec4<f32>,
    color2: vec4<f32>,
    params: vec4<f32>,
    extra: vec4<f32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;
@group(0) @binding(1) var env_texture: texture_2d<f32>;
@group(0) @binding(2) var env_sampler: sampler;

@group(1) @binding(0) var<uniform> object: Object;
@group(1) @binding(1) var object_texture: texture_2d<f32>;
@group(1) @binding(2) var object_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) height: f32,
};

fn to_clip(position: vec3<f32>, normal: vec3<f32>, uv: vec2<f32>, height: f32) -> VertexOutput {
    let world = object.model * vec4<f32>(position, 1.0);
    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_pos = world.xyz;
    out.normal = normalize((object.model * vec4<f32>(normal, 0.0)).xyz);
    out.uv = uv;
    out.height = height;
    return out;
}

fn equirect_uv(dir: vec3<f32>) -> vec2<f32> {
    let d = normalize(dir);
    return vec2<f32>(atan2(d.z, d.x) / (2.0 * PI) + 0.5, acos(clamp(d.y, -1.0, 1.0)) / PI);
}

fn point_lighting(pos: vec3<f32>, n: vec3<f32>, roughness: f32) -> vec3<f32> {
    var total = frame.ambient.rgb;
    let view_dir = normalize(frame.camera_pos.xyz - pos);
    let shininess = mix(128.0, 4.0, clamp(roughness, 0.0, 1.0));
    for (var i = 0u; i < frame.light_count.x; i = i + 1u) {
        let light = frame.lights[i];
        let to_light = light.position.xyz - pos;
        let dist = length(to_light);
        let l = to_light / max(dist, 0.0001);
        var falloff = 1.0 / (1.0 + dist * dist);
        if (light.position.w > 0.0) {
            falloff = falloff * clamp(1.0 - dist / light.position.w, 0.0, 1.0);
        }
        let diffuse = max(dot(n, l), 0.0);
        let h = normalize(l + view_dir);
        let specular = pow(max(dot(n, h), 0.0), shininess) * (1.0 - roughness);
        total = total + light.color.rgb * light.color.w * falloff * (diffuse + specular);
    }
    return total;
}
"#;

/// Two-color sine blend over the object texture, moving with time.
pub const WAVE: &str = r#"
@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    return to_clip(in.position, in.normal, in.uv, 0.0);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let time = object.params.x;
    let wave = object.params.y;
    let blend = 0.5 + 0.5 * sin(in.uv.y * wave + time);
    let tint = mix(object.color1.rgb, object.color2.rgb, blend);
    let texel = textureSample(object_texture, object_sampler, in.uv);
    return vec4<f32>(tint * texel.rgb, 1.0);
}
"#;

/// Vertex displacement along Y, colored by height.
pub const DISPLACE: &str = r#"
fn displacement(p: vec2<f32>, time: f32, wave: f32, amplitude: f32) -> f32 {
    let k = wave * 0.1;
    return amplitude * (sin(p.x * k + time) * cos(p.y * k * 0.8 + time * 0.7));
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let time = object.params.x;
    let wave = object.params.y;
    let amplitude = object.params.z;
    let h = displacement(in.position.xz, time, wave, amplitude);
    let e = 0.05;
    let hx = displacement(in.position.xz + vec2<f32>(e, 0.0), time, wave, amplitude);
    let hz = displacement(in.position.xz + vec2<f32>(0.0, e), time, wave, amplitude);
    let normal = normalize(vec3<f32>(h - hx, e, h - hz));
    let shifted = in.position + vec3<f32>(0.0, h, 0.0);
    let t = select(0.5, 0.5 + 0.5 * h / amplitude, amplitude > 0.0);
    return to_clip(shifted, normal, in.uv, t);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = mix(object.color1.rgb, object.color2.rgb, clamp(in.height, 0.0, 1.0));
    let light = normalize(vec3<f32>(0.4, 1.0, 0.3));
    let shade = 0.35 + 0.65 * max(dot(normalize(in.normal), light), 0.0);
    return vec4<f32>(base * shade, 1.0);
}
"#;

/// Lit material with emissive and environment reflection.
pub const STANDARD: &str = r#"
@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    return to_clip(in.position, in.normal, in.uv, 0.0);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let roughness = object.extra.z;
    let metalness = object.extra.w;
    let albedo = object.color1.rgb;
    let lit = albedo * point_lighting(in.world_pos, n, roughness);

    let view = normalize(in.world_pos - frame.camera_pos.xyz);
    let reflected = reflect(view, n);
    let env = textureSample(env_texture, env_sampler, equirect_uv(reflected)).rgb;
    let reflection = env * object.params.w * mix(0.04, 1.0, metalness) * (1.0 - roughness);

    let emissive = object.color2.rgb * object.color2.w;
    return vec4<f32>(lit + reflection + emissive, 1.0);
}
"#;

/// Fullscreen triangle sampling the environment map behind everything.
pub const SKY: &str = r#"
struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

@vertex
fn vs_sky(@builtin(vertex_index) index: u32) -> SkyOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    let ndc = uv * 2.0 - 1.0;
    var out: SkyOutput;
    out.clip_position = vec4<f32>(ndc, 1.0, 1.0);
    out.ndc = ndc;
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    let far = frame.inv_view_proj * vec4<f32>(in.ndc, 1.0, 1.0);
    let dir = far.xyz / far.w - frame.camera_pos.xyz;
    return textureSample(env_texture, env_sampler, equirect_uv(dir));
}
"#;

pub fn program_source(program: ShaderProgram) -> String {
    let body = match program {
        ShaderProgram::Wave => WAVE,
        ShaderProgram::Displace => DISPLACE,
    };
    format!("{COMMON}\n{body}")
}

pub fn standard_source() -> String {
    format!("{COMMON}\n{STANDARD}")
}

pub fn sky_source() -> String {
    format!("{COMMON}\n{SKY}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_program_has_entry_points() {
        for source in [
            program_source(ShaderProgram::Wave),
            program_source(ShaderProgram::Displace),
            standard_source(),
        ] {
            assert!(source.contains("fn vs_main"));
            assert!(source.contains("fn fs_main"));
            assert!(source.contains("var<uniform> frame"));
        }
        assert!(sky_source().contains("fn vs_sky"));
    }
}
