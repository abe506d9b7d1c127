pub mod lighting;
pub mod rotation;

pub use lighting::SceneLightState;
pub use rotation::ModelTransform;

use crate::scroll::ScrollSnapshot;
use glam::Vec3;
use lighting::rgb_from_hex;

/// Narrow mutation seam into whatever owns the real light and model handles.
/// Only [`SceneFrame::apply`] calls into it.
pub trait LightRig {
    fn apply_lighting(&mut self, lights: &SceneLightState);
    fn apply_model_rotation(&mut self, rotation_y: f32);
}

/// Everything computed for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrame {
    pub snapshot: ScrollSnapshot,
    pub lights: SceneLightState,
    pub model_rotation_y: f32,
}

impl SceneFrame {
    pub fn apply(&self, rig: &mut dyn LightRig) {
        rig.apply_lighting(&self.lights);
        rig.apply_model_rotation(self.model_rotation_y);
    }
}

/// Turns scroll snapshots into scene frames. Holds nothing but the rotation
/// memory the damping needs.
#[derive(Debug, Default)]
pub struct SceneDirector {
    transform: ModelTransform,
    last_section: Option<usize>,
}

impl SceneDirector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, snapshot: ScrollSnapshot) -> SceneFrame {
        let progress = snapshot.progress.get();
        if self.last_section != Some(snapshot.section) {
            log::info!(
                "Section {} (progress {:.3})",
                snapshot.section,
                progress
            );
            self.last_section = Some(snapshot.section);
        }

        self.transform.set_target(rotation::target_rotation(progress));
        let model_rotation_y = self.transform.step();

        SceneFrame {
            snapshot,
            lights: SceneLightState::from_progress(progress),
            model_rotation_y,
        }
    }

    /// Forget rotation memory, e.g. after the scene subtree is reloaded.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub range: f32,
    pub decay: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactShadow {
    pub height: f32,
    pub opacity: f32,
    pub radius: f32,
}

/// Lights and atmosphere that do not follow scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticRig {
    pub ambient_intensity: f32,
    pub ambient_color: Vec3,
    pub fill_position: Vec3,
    pub fill_color: Vec3,
    pub accent: PointLight,
    pub environment_intensity: f32,
    pub background: Vec3,
    pub fog_near: f32,
    pub fog_far: f32,
    pub shadow: ContactShadow,
}

impl Default for StaticRig {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.8,
            ambient_color: Vec3::ONE,
            fill_position: Vec3::new(-5.0, 5.0, -3.0),
            fill_color: rgb_from_hex(0xfff8dc),
            accent: PointLight {
                position: Vec3::new(0.0, 3.0, 4.0),
                color: rgb_from_hex(0xd4af37),
                intensity: 0.3,
                range: 12.0,
                decay: 2.0,
            },
            environment_intensity: 0.05,
            background: rgb_from_hex(0x0f0f0f),
            fog_near: 15.0,
            fog_far: 40.0,
            shadow: ContactShadow {
                height: -0.8,
                opacity: 0.5,
                radius: 6.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::ScrollProgress;
    use std::f32::consts::PI;

    #[derive(Default)]
    struct RecordingRig {
        lights: Vec<SceneLightState>,
        rotations: Vec<f32>,
    }

    impl LightRig for RecordingRig {
        fn apply_lighting(&mut self, lights: &SceneLightState) {
            self.lights.push(*lights);
        }

        fn apply_model_rotation(&mut self, rotation_y: f32) {
            self.rotations.push(rotation_y);
        }
    }

    fn snapshot(progress: f32, section: usize) -> ScrollSnapshot {
        ScrollSnapshot {
            progress: ScrollProgress::new(progress),
            section,
        }
    }

    #[test]
    fn frame_carries_lighting_for_its_progress() {
        let mut director = SceneDirector::new();
        let frame = director.advance(snapshot(0.5, 2));
        assert_eq!(frame.lights, SceneLightState::from_progress(0.5));
        assert_eq!(frame.snapshot.section, 2);
    }

    #[test]
    fn rotation_eases_toward_scroll_target() {
        let mut director = SceneDirector::new();
        let first = director.advance(snapshot(0.5, 2));
        assert!((first.model_rotation_y - PI * rotation::ROTATION_DAMPING).abs() < 1e-5);

        let mut last = first.model_rotation_y;
        for _ in 0..300 {
            last = director.advance(snapshot(0.5, 2)).model_rotation_y;
        }
        assert!((last - PI).abs() < 1e-3);
    }

    #[test]
    fn apply_pushes_one_update_per_handle() {
        let mut director = SceneDirector::new();
        let mut rig = RecordingRig::default();
        let frame = director.advance(snapshot(0.25, 1));
        frame.apply(&mut rig);

        assert_eq!(rig.lights, vec![frame.lights]);
        assert_eq!(rig.rotations, vec![frame.model_rotation_y]);
    }

    #[test]
    fn reset_forgets_rotation() {
        let mut director = SceneDirector::new();
        for _ in 0..10 {
            director.advance(snapshot(0.9, 3));
        }
        assert!(director.transform.current_rotation_y > 0.0);
        director.reset();
        assert_eq!(director.transform.current_rotation_y, 0.0);
        assert_eq!(director.last_section, None);

        // A reloaded scene eases in from rest again.
        let frame = director.advance(snapshot(0.25, 1));
        let expected = rotation::ROTATION_DAMPING * PI / 2.0;
        assert!((frame.model_rotation_y - expected).abs() < 1e-4);
    }
}
