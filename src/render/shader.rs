use super::RenderError;
use glam::{Mat4, Vec3};
use glow::HasContext;
use std::collections::HashMap;

/// Linked program plus the uniform locations it was asked to resolve.
pub struct ShaderProgram {
    program: glow::Program,
    uniforms: HashMap<&'static str, glow::UniformLocation>,
}

impl ShaderProgram {
    /// # Safety
    /// Requires the GL context to be current on this thread.
    pub unsafe fn new(
        gl: &glow::Context,
        vertex_src: &str,
        fragment_src: &str,
        uniform_names: &[&'static str],
    ) -> Result<Self, RenderError> {
        let program = gl.create_program().map_err(RenderError::Resource)?;
        let vertex = compile(gl, glow::VERTEX_SHADER, vertex_src)?;
        let fragment = compile(gl, glow::FRAGMENT_SHADER, fragment_src)?;

        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.link_program(program);
        let linked = gl.get_program_link_status(program);
        gl.detach_shader(program, vertex);
        gl.detach_shader(program, fragment);
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);
        if !linked {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(RenderError::ProgramLink(log));
        }

        let mut uniforms = HashMap::new();
        for &name in uniform_names {
            match gl.get_uniform_location(program, name) {
                Some(location) => {
                    uniforms.insert(name, location);
                }
                None => log::debug!("Uniform {name} is unused by its program"),
            }
        }
        Ok(Self { program, uniforms })
    }

    /// # Safety
    /// Requires the GL context to be current.
    pub unsafe fn bind(&self, gl: &glow::Context) {
        gl.use_program(Some(self.program));
    }

    /// # Safety
    /// Requires this program to be bound.
    pub unsafe fn set_f32(&self, gl: &glow::Context, name: &str, value: f32) {
        gl.uniform_1_f32(self.uniforms.get(name), value);
    }

    /// # Safety
    /// Requires this program to be bound.
    pub unsafe fn set_vec3(&self, gl: &glow::Context, name: &str, value: Vec3) {
        gl.uniform_3_f32(self.uniforms.get(name), value.x, value.y, value.z);
    }

    /// # Safety
    /// Requires this program to be bound.
    pub unsafe fn set_mat4(&self, gl: &glow::Context, name: &str, value: &Mat4) {
        gl.uniform_matrix_4_f32_slice(self.uniforms.get(name), false, &value.to_cols_array());
    }

    /// # Safety
    /// Requires the GL context that created the program to be current.
    pub unsafe fn destroy(&self, gl: &glow::Context) {
        gl.delete_program(self.program);
    }
}

unsafe fn compile(gl: &glow::Context, kind: u32, source: &str) -> Result<glow::Shader, RenderError> {
    let shader = gl.create_shader(kind).map_err(RenderError::Resource)?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(RenderError::ShaderCompile(log));
    }
    Ok(shader)
}

pub const MESH_VERTEX: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;

uniform mat4 u_model;
uniform mat4 u_view_proj;

out vec3 v_world;
out vec3 v_normal;
out vec3 v_color;

void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    v_world = world.xyz;
    v_normal = mat3(u_model) * a_normal;
    v_color = a_color;
    gl_Position = u_view_proj * world;
}
"#;

/// Shared tail of every fragment shader: ACES filmic curve, gamma, fog.
const FRAGMENT_COMMON: &str = r#"
uniform vec3 u_camera;
uniform float u_exposure;
uniform vec3 u_fog_color;
uniform float u_fog_near;
uniform float u_fog_far;

vec3 aces_filmic(vec3 x) {
    const float a = 2.51;
    const float b = 0.03;
    const float c = 2.43;
    const float d = 0.59;
    const float e = 0.14;
    return clamp((x * (a * x + b)) / (x * (c * x + d) + e), 0.0, 1.0);
}

vec3 finish(vec3 linear, vec3 world) {
    vec3 mapped = pow(aces_filmic(linear * u_exposure), vec3(1.0 / 2.2));
    float fog = smoothstep(u_fog_near, u_fog_far, distance(world, u_camera));
    return mix(mapped, u_fog_color, fog);
}
"#;

pub fn lit_fragment() -> String {
    format!(
        r#"#version 300 es
precision highp float;

in vec3 v_world;
in vec3 v_normal;
in vec3 v_color;
out vec4 frag_color;
{FRAGMENT_COMMON}
uniform vec3 u_ambient;
uniform vec3 u_sun_position;
uniform vec3 u_sun_color;
uniform float u_sun_intensity;
uniform vec3 u_fill_position;
uniform vec3 u_fill_color;
uniform float u_fill_intensity;
uniform vec3 u_accent_position;
uniform vec3 u_accent_color;
uniform float u_accent_intensity;
uniform float u_accent_range;
uniform float u_accent_decay;

void main() {{
    vec3 n = normalize(v_normal);
    vec3 view_dir = normalize(u_camera - v_world);

    vec3 sun_dir = normalize(u_sun_position);
    float sun_diffuse = max(dot(n, sun_dir), 0.0);
    float sun_spec = pow(max(dot(n, normalize(sun_dir + view_dir)), 0.0), 32.0) * 0.15;
    vec3 sun = u_sun_color * u_sun_intensity * (sun_diffuse + sun_spec);

    vec3 fill = u_fill_color * u_fill_intensity * max(dot(n, normalize(u_fill_position)), 0.0);

    vec3 to_accent = u_accent_position - v_world;
    float dist = length(to_accent);
    float window = pow(clamp(1.0 - pow(dist / u_accent_range, 4.0), 0.0, 1.0), 2.0);
    float falloff = window / max(pow(dist, u_accent_decay), 0.01);
    vec3 accent = u_accent_color * u_accent_intensity * falloff * max(dot(n, to_accent / max(dist, 1e-4)), 0.0);

    vec3 linear = v_color * (u_ambient + sun + fill + accent);
    frag_color = vec4(finish(linear, v_world), 1.0);
}}
"#
    )
}

/// Flat colour for lines and helpers; still fogged and tone mapped.
pub fn unlit_fragment() -> String {
    format!(
        r#"#version 300 es
precision highp float;

in vec3 v_world;
in vec3 v_normal;
in vec3 v_color;
out vec4 frag_color;
{FRAGMENT_COMMON}
uniform float u_emissive;

void main() {{
    frag_color = vec4(finish(v_color * u_emissive, v_world), 1.0);
}}
"#
    )
}

/// Radial darkening for the contact shadow; `v_color.r` is the distance
/// from the disc centre in `[0, 1]`.
pub fn shadow_fragment() -> String {
    format!(
        r#"#version 300 es
precision highp float;

in vec3 v_world;
in vec3 v_normal;
in vec3 v_color;
out vec4 frag_color;
{FRAGMENT_COMMON}
uniform float u_opacity;

void main() {{
    float edge = 1.0 - smoothstep(0.0, 1.0, v_color.r);
    float fog = smoothstep(u_fog_near, u_fog_far, distance(v_world, u_camera));
    frag_color = vec4(0.0, 0.0, 0.0, u_opacity * edge * edge * (1.0 - fog));
}}
"#
    )
}
