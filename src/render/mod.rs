mod camera;
mod mesh;
mod shader;

pub use camera::{CameraController, LOOK_TARGET};

use crate::assets::SceneAssets;
use crate::scene::lighting::{rgb_from_hex, SceneLightState};
use crate::scene::{LightRig, StaticRig};
use glam::{Mat4, Vec3};
use glow::HasContext;
use mesh::GpuMesh;
use shader::ShaderProgram;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create GL resource: {0}")]
    Resource(String),
    #[error("shader failed to compile: {0}")]
    ShaderCompile(String),
    #[error("shader program failed to link: {0}")]
    ProgramLink(String),
}

const PLACEHOLDER_SIZE: f32 = 1.5;
const PLACEHOLDER_COLOR: u32 = 0xd4af37;
const PLACEHOLDER_SPIN_SPEED: f32 = 0.8;
const PLACEHOLDER_EMISSIVE: f32 = 1.3;
const SHADOW_SEGMENTS: u32 = 48;
const SHADOW_LIFT: f32 = 0.01;

const COMMON_UNIFORMS: [&str; 7] = [
    "u_model",
    "u_view_proj",
    "u_camera",
    "u_exposure",
    "u_fog_color",
    "u_fog_near",
    "u_fog_far",
];

const LIT_UNIFORMS: [&str; 12] = [
    "u_ambient",
    "u_sun_position",
    "u_sun_color",
    "u_sun_intensity",
    "u_fill_position",
    "u_fill_color",
    "u_fill_intensity",
    "u_accent_position",
    "u_accent_color",
    "u_accent_intensity",
    "u_accent_range",
    "u_accent_decay",
];

struct ModelMesh {
    mesh: GpuMesh,
    floor: f32,
}

/// OpenGL renderer for the portfolio scene. Owns every GL object it creates
/// and must be [`destroy`](Self::destroy)ed while its context is current.
pub struct RenderContext {
    gl: Arc<glow::Context>,
    lit: ShaderProgram,
    unlit: ShaderProgram,
    shadow: ShaderProgram,
    placeholder: GpuMesh,
    shadow_disc: GpuMesh,
    model: Option<ModelMesh>,
    camera: CameraController,
    rig: StaticRig,
    lights: SceneLightState,
    environment_tint: Option<Vec3>,
    model_rotation_y: f32,
    placeholder_angle: f32,
    viewport_width: u32,
    viewport_height: u32,
}

impl RenderContext {
    pub fn new(gl: Arc<glow::Context>, rig: StaticRig, width: u32, height: u32) -> Result<Self, RenderError> {
        let with_common = |extra: &[&'static str]| {
            COMMON_UNIFORMS
                .iter()
                .chain(extra.iter())
                .copied()
                .collect::<Vec<_>>()
        };

        // SAFETY: callers hand over a context that is current on this thread.
        let (lit, unlit, shadow, placeholder, shadow_disc) = unsafe {
            let lit = ShaderProgram::new(
                &gl,
                shader::MESH_VERTEX,
                &shader::lit_fragment(),
                &with_common(&LIT_UNIFORMS),
            )?;
            let unlit = ShaderProgram::new(
                &gl,
                shader::MESH_VERTEX,
                &shader::unlit_fragment(),
                &with_common(&["u_emissive"]),
            )?;
            let shadow = ShaderProgram::new(
                &gl,
                shader::MESH_VERTEX,
                &shader::shadow_fragment(),
                &with_common(&["u_opacity"]),
            )?;
            let placeholder = GpuMesh::upload(
                &gl,
                &mesh::wire_cube(PLACEHOLDER_SIZE, rgb_from_hex(PLACEHOLDER_COLOR)),
                glow::LINES,
            )?;
            let shadow_disc = GpuMesh::upload(&gl, &mesh::disc(rig.shadow.radius, SHADOW_SEGMENTS), glow::TRIANGLES)?;
            (lit, unlit, shadow, placeholder, shadow_disc)
        };
        log::info!("Renderer initialised ({}x{})", width, height);

        Ok(Self {
            gl,
            lit,
            unlit,
            shadow,
            placeholder,
            shadow_disc,
            model: None,
            camera: CameraController::from_bounds(LOOK_TARGET, crate::assets::MODEL_RADIUS),
            rig,
            lights: SceneLightState::from_progress(0.0),
            environment_tint: None,
            model_rotation_y: 0.0,
            placeholder_angle: 0.0,
            viewport_width: width.max(1),
            viewport_height: height.max(1),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport_width = width.max(1);
        self.viewport_height = height.max(1);
    }

    /// Replaces the model with freshly loaded assets.
    pub fn set_assets(&mut self, assets: &SceneAssets) -> Result<(), RenderError> {
        self.clear_model();
        let mesh_data = &assets.model.mesh;
        // SAFETY: the renderer only lives while its context is current.
        let mesh = unsafe { GpuMesh::upload(&self.gl, mesh_data, glow::TRIANGLES)? };
        let floor = mesh_data.bounds().map(|bounds| bounds.min.y).unwrap_or(self.rig.shadow.height);
        let radius = mesh_data.bounds().map(|bounds| bounds.radius()).unwrap_or(crate::assets::MODEL_RADIUS);
        self.camera = CameraController::from_bounds(LOOK_TARGET, radius);
        self.environment_tint = assets.environment_tint;
        self.model = Some(ModelMesh { mesh, floor });
        Ok(())
    }

    /// Drops the model so the loading placeholder shows again.
    pub fn clear_model(&mut self) {
        if let Some(model) = self.model.take() {
            // SAFETY: see `set_assets`.
            unsafe { model.mesh.destroy(&self.gl) };
        }
    }

    /// Spins the loading placeholder; does nothing once a model is shown.
    pub fn advance_placeholder(&mut self, dt: f32) {
        if self.model.is_none() {
            self.placeholder_angle =
                (self.placeholder_angle + PLACEHOLDER_SPIN_SPEED * dt).rem_euclid(std::f32::consts::TAU);
        }
    }

    fn ambient(&self) -> Vec3 {
        let base = self.rig.ambient_color * self.rig.ambient_intensity;
        match self.environment_tint {
            Some(tint) => base + tint * self.rig.environment_intensity,
            None => base,
        }
    }

    pub fn render(&self) {
        let gl = &self.gl;
        let aspect = self.viewport_width as f32 / self.viewport_height as f32;
        let view_proj = self.camera.projection_matrix(aspect) * self.camera.view_matrix();
        let background = self.rig.background;

        // SAFETY: the renderer only lives while its context is current.
        unsafe {
            gl.viewport(0, 0, self.viewport_width as i32, self.viewport_height as i32);
            gl.disable(glow::SCISSOR_TEST);
            gl.disable(glow::CULL_FACE);
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);
            gl.depth_mask(true);
            gl.disable(glow::BLEND);
            gl.clear_color(background.x, background.y, background.z, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            match &self.model {
                Some(model) => {
                    let transform = Mat4::from_rotation_y(self.model_rotation_y);
                    self.lit.bind(gl);
                    self.set_common(&self.lit, &view_proj, &transform);
                    self.set_lighting();
                    model.mesh.draw(gl);
                    self.draw_shadow(&view_proj, model.floor);
                }
                None => {
                    let transform = Mat4::from_rotation_y(self.placeholder_angle)
                        * Mat4::from_rotation_x(self.placeholder_angle * 0.5);
                    self.unlit.bind(gl);
                    self.set_common(&self.unlit, &view_proj, &transform);
                    self.unlit.set_f32(gl, "u_emissive", PLACEHOLDER_EMISSIVE);
                    self.placeholder.draw(gl);
                    self.draw_shadow(&view_proj, self.rig.shadow.height);
                }
            }

            gl.use_program(None);
            gl.disable(glow::DEPTH_TEST);
        }
    }

    unsafe fn set_common(&self, program: &ShaderProgram, view_proj: &Mat4, model: &Mat4) {
        let gl = &self.gl;
        program.set_mat4(gl, "u_model", model);
        program.set_mat4(gl, "u_view_proj", view_proj);
        program.set_vec3(gl, "u_camera", self.camera.eye());
        program.set_f32(gl, "u_exposure", self.lights.exposure);
        program.set_vec3(gl, "u_fog_color", self.rig.background);
        program.set_f32(gl, "u_fog_near", self.rig.fog_near);
        program.set_f32(gl, "u_fog_far", self.rig.fog_far);
    }

    unsafe fn set_lighting(&self) {
        let gl = &self.gl;
        let lit = &self.lit;
        let accent = &self.rig.accent;
        lit.set_vec3(gl, "u_ambient", self.ambient());
        lit.set_vec3(gl, "u_sun_position", self.lights.position);
        lit.set_vec3(gl, "u_sun_color", self.lights.color);
        lit.set_f32(gl, "u_sun_intensity", self.lights.intensity);
        lit.set_vec3(gl, "u_fill_position", self.rig.fill_position);
        lit.set_vec3(gl, "u_fill_color", self.rig.fill_color);
        lit.set_f32(gl, "u_fill_intensity", self.lights.fill_intensity);
        lit.set_vec3(gl, "u_accent_position", accent.position);
        lit.set_vec3(gl, "u_accent_color", accent.color);
        lit.set_f32(gl, "u_accent_intensity", accent.intensity);
        lit.set_f32(gl, "u_accent_range", accent.range);
        lit.set_f32(gl, "u_accent_decay", accent.decay);
    }

    unsafe fn draw_shadow(&self, view_proj: &Mat4, floor: f32) {
        let gl = &self.gl;
        let transform = Mat4::from_translation(Vec3::new(0.0, floor - SHADOW_LIFT, 0.0));
        gl.enable(glow::BLEND);
        gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        gl.depth_mask(false);
        self.shadow.bind(gl);
        self.set_common(&self.shadow, view_proj, &transform);
        self.shadow.set_f32(gl, "u_opacity", self.rig.shadow.opacity);
        self.shadow_disc.draw(gl);
        gl.depth_mask(true);
        gl.disable(glow::BLEND);
    }

    /// Releases every GL object. The context must still be current.
    pub fn destroy(&mut self) {
        self.clear_model();
        // SAFETY: see `set_assets`.
        unsafe {
            self.placeholder.destroy(&self.gl);
            self.shadow_disc.destroy(&self.gl);
            self.lit.destroy(&self.gl);
            self.unlit.destroy(&self.gl);
            self.shadow.destroy(&self.gl);
        }
        log::info!("Renderer resources released");
    }
}

impl LightRig for RenderContext {
    fn apply_lighting(&mut self, lights: &SceneLightState) {
        self.lights = *lights;
    }

    fn apply_model_rotation(&mut self, rotation_y: f32) {
        self.model_rotation_y = rotation_y;
    }
}
