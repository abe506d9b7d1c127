use std::f32::consts::{PI, TAU};

/// Fraction of the remaining angle covered each frame.
pub const ROTATION_DAMPING: f32 = 0.08;

/// One full turn of the model across the whole scroll range.
pub fn target_rotation(progress: f32) -> f32 {
    progress * TAU
}

/// Signed difference `target - current` folded onto the shortest path.
pub fn shortest_angle(current: f32, target: f32) -> f32 {
    let mut diff = (target - current) % TAU;
    if diff.abs() > PI {
        diff -= TAU.copysign(diff);
    }
    diff
}

/// Y rotation of the model. `current` chases `target` a little every frame
/// so sudden progress jumps never snap the model around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub target_rotation_y: f32,
    pub current_rotation_y: f32,
    damping: f32,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self::new(ROTATION_DAMPING)
    }
}

impl ModelTransform {
    pub fn new(damping: f32) -> Self {
        Self {
            target_rotation_y: 0.0,
            current_rotation_y: 0.0,
            damping: damping.clamp(0.0, 1.0),
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target_rotation_y = target;
    }

    /// One render-frame step. Returns the new current angle, kept in `[0, 2π)`.
    pub fn step(&mut self) -> f32 {
        let diff = shortest_angle(self.current_rotation_y, self.target_rotation_y);
        self.current_rotation_y = (self.current_rotation_y + diff * self.damping).rem_euclid(TAU);
        self.current_rotation_y
    }
}
