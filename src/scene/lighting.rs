//! Sun lighting driven by scroll progress.
//!
//! The sun sweeps a half circle from the left horizon (progress 0) through
//! its apex (0.5) to the right horizon (1). Colour walks a sunrise to sunset
//! palette, intensity peaks at noon, and the fill light and exposure
//! compensate so overall brightness stays even.

use glam::Vec3;
use std::f32::consts::PI;

const SUN_ARC_RADIUS: f32 = 20.0;
const SUN_BASE_HEIGHT: f32 = 18.0;
const SUN_ARC_AMPLITUDE: f32 = 7.0;
const SUN_DEPTH: f32 = 8.0;

const SUN_BASE_INTENSITY: f32 = 1.8;
const SUN_PEAK_BOOST: f32 = 0.7;

const FILL_COMPENSATION: f32 = 0.3;
const EXPOSURE_BASE: f32 = 0.8;
const EXPOSURE_GAIN: f32 = 0.4;

/// Sunrise orange, morning yellow, noon white, afternoon amber, sunset red.
pub const SUN_PALETTE: [u32; 5] = [0xff8800, 0xffdd55, 0xffffff, 0xffaa33, 0xff6633];

/// Converts `0xRRGGBB` into a colour with channels in `[0, 1]`.
pub fn rgb_from_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

pub fn sun_position(progress: f32) -> Vec3 {
    let angle = progress * PI;
    Vec3::new(
        angle.cos() * SUN_ARC_RADIUS,
        SUN_BASE_HEIGHT + angle.sin() * SUN_ARC_AMPLITUDE,
        SUN_DEPTH,
    )
}

/// Piecewise-linear walk through `palette`, clamped at both ends.
pub fn interpolate_palette(palette: &[Vec3], progress: f32) -> Vec3 {
    let Some((&first, rest)) = palette.split_first() else {
        return Vec3::ONE;
    };
    let last = rest.last().copied().unwrap_or(first);
    if progress.is_nan() || progress <= 0.0 {
        return first;
    }
    if progress >= 1.0 {
        return last;
    }

    let scaled = progress * (palette.len() - 1) as f32;
    let index = scaled.floor() as usize;
    if index >= palette.len() - 1 {
        return last;
    }
    let t = scaled - index as f32;
    palette[index].lerp(palette[index + 1], t)
}

pub fn sun_color(progress: f32) -> Vec3 {
    let palette = SUN_PALETTE.map(rgb_from_hex);
    interpolate_palette(&palette, progress)
}

pub fn sun_intensity(progress: f32) -> f32 {
    SUN_BASE_INTENSITY + (progress * PI).sin() * SUN_PEAK_BOOST
}

/// Dims the fill light as the sun brightens.
pub fn fill_light_intensity(sun_intensity: f32) -> f32 {
    1.0 - (sun_intensity - 1.0) * FILL_COMPENSATION
}

pub fn exposure(sun_intensity: f32) -> f32 {
    EXPOSURE_BASE + (sun_intensity - 1.0) * EXPOSURE_GAIN
}

/// Everything the renderer's lights need for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLightState {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub fill_intensity: f32,
    pub exposure: f32,
}

impl SceneLightState {
    pub fn from_progress(progress: f32) -> Self {
        let intensity = sun_intensity(progress);
        Self {
            position: sun_position(progress),
            color: sun_color(progress),
            intensity,
            fill_intensity: fill_light_intensity(intensity),
            exposure: exposure(intensity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn sun_rises_left_peaks_overhead_sets_right() {
        let dawn = sun_position(0.0);
        let noon = sun_position(0.5);
        let dusk = sun_position(1.0);
        assert!((dawn - Vec3::new(20.0, 18.0, 8.0)).length() < EPS);
        assert!((noon - Vec3::new(0.0, 25.0, 8.0)).length() < 1e-4);
        assert!((dusk - Vec3::new(-20.0, 18.0, 8.0)).length() < 1e-4);
    }

    #[test]
    fn intensity_peaks_at_midpoint_and_edges_match() {
        let peak = sun_intensity(0.5);
        for step in 0..=100 {
            assert!(peak + EPS >= sun_intensity(step as f32 / 100.0));
        }
        assert!((sun_intensity(0.0) - sun_intensity(1.0)).abs() < EPS);
        assert!((peak - 2.5).abs() < EPS);
    }

    #[test]
    fn fill_and_exposure_compensate_sun() {
        let noon = SceneLightState::from_progress(0.5);
        let dawn = SceneLightState::from_progress(0.0);
        assert!(noon.fill_intensity < dawn.fill_intensity);
        assert!(noon.exposure > dawn.exposure);
        assert!((noon.fill_intensity - 0.55).abs() < EPS);
        assert!((noon.exposure - 1.4).abs() < EPS);
    }

    #[test]
    fn palette_endpoints_are_exact() {
        assert_eq!(sun_color(0.0), rgb_from_hex(0xff8800));
        assert_eq!(sun_color(1.0), rgb_from_hex(0xff6633));
        assert_eq!(sun_color(-0.5), rgb_from_hex(0xff8800));
        assert_eq!(sun_color(1.5), rgb_from_hex(0xff6633));
    }

    #[test]
    fn palette_hits_anchors_and_blends_between() {
        assert!((sun_color(0.5) - Vec3::ONE).length() < EPS);
        let quarter_way = sun_color(0.125);
        let expected = rgb_from_hex(0xff8800).lerp(rgb_from_hex(0xffdd55), 0.5);
        assert!((quarter_way - expected).length() < EPS);
    }

    #[test]
    fn palette_is_continuous_across_anchors() {
        for anchor in 1..4 {
            let at = anchor as f32 / 4.0;
            let before = sun_color(at - 1e-4);
            let after = sun_color(at + 1e-4);
            assert!((before - after).length() < 1e-2, "jump at anchor {anchor}");
        }
    }

    #[test]
    fn empty_or_single_palette_is_handled() {
        assert_eq!(interpolate_palette(&[], 0.4), Vec3::ONE);
        let solo = [Vec3::new(0.2, 0.3, 0.4)];
        assert_eq!(interpolate_palette(&solo, 0.4), solo[0]);
    }
}
