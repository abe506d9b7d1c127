use glam::{Mat4, Vec3};

pub const FOV_Y_DEG: f32 = 45.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;

/// Point the camera looks at; slightly above the model centre.
pub const LOOK_TARGET: Vec3 = Vec3::new(0.0, 1.0, 0.0);

const FRAMING_PADDING: f32 = 1.3;

#[derive(Debug, Clone, Copy)]
pub struct CameraController {
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraController {
    pub fn new(position: [f32; 3], yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let (yaw, pitch) = forward_to_yaw_pitch(target - eye);
        Self::new(eye.to_array(), yaw, pitch)
    }

    /// Places the camera on the `(1, 1, 1)` diagonal from `target`, far enough
    /// that a sphere of `radius` fits the vertical field of view.
    pub fn from_bounds(target: Vec3, radius: f32) -> Self {
        let half_fov = (FOV_Y_DEG.to_radians() * 0.5).sin();
        let distance = if radius > 0.0 {
            radius / half_fov * FRAMING_PADDING
        } else {
            3.0
        };
        let eye = target + Vec3::ONE.normalize() * distance;
        Self::looking_at(eye, target)
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let cos_pitch = self.pitch.cos();
        let forward = Vec3::new(
            self.yaw.cos() * cos_pitch,
            self.pitch.sin(),
            self.yaw.sin() * cos_pitch,
        );
        let right = Vec3::new(-self.yaw.sin(), 0.0, self.yaw.cos());
        let up = right.cross(forward).normalize_or_zero();
        (forward, right, up)
    }

    pub fn view_matrix(&self) -> Mat4 {
        let (forward, _right, up) = self.basis();
        let eye = self.eye();
        Mat4::look_at_rh(eye, eye + forward, up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(FOV_Y_DEG.to_radians(), aspect.max(1e-3), NEAR, FAR)
    }
}

fn forward_to_yaw_pitch(forward: Vec3) -> (f32, f32) {
    let forward = forward.try_normalize().unwrap_or(Vec3::NEG_Z);
    let yaw = forward.z.atan2(forward.x);
    let pitch = forward.y.clamp(-1.0, 1.0).asin();
    (yaw, pitch)
}
