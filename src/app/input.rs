use crate::scroll::{NavKey, WheelDelta};
use winit::event::MouseScrollDelta;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixels scrolled per wheel notch, as browsers do.
pub const LINE_HEIGHT_PX: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Quit,
    Navigate(NavKey),
}

/// Routes a pressed key. Escape is left to a focused text field; arrow keys
/// are always routed so the scroll controller can apply its own focus guard.
pub fn key_command(key: PhysicalKey, text_input_focused: bool) -> Option<KeyCommand> {
    match key {
        PhysicalKey::Code(KeyCode::Escape) if !text_input_focused => Some(KeyCommand::Quit),
        PhysicalKey::Code(KeyCode::ArrowRight | KeyCode::ArrowDown) => Some(KeyCommand::Navigate(NavKey::Forward)),
        PhysicalKey::Code(KeyCode::ArrowLeft | KeyCode::ArrowUp) => Some(KeyCommand::Navigate(NavKey::Back)),
        _ => None,
    }
}

/// Converts winit wheel input to logical pixels with positive `y` meaning
/// "scroll forward". winit reports content movement, so both axes flip.
pub fn wheel_delta(delta: MouseScrollDelta, scale_factor: f64) -> WheelDelta {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => WheelDelta {
            x: -x * LINE_HEIGHT_PX,
            y: -y * LINE_HEIGHT_PX,
        },
        MouseScrollDelta::PixelDelta(position) => {
            let logical = position.to_logical::<f32>(scale_factor);
            WheelDelta {
                x: -logical.x,
                y: -logical.y,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::{ScrollAxis, ScrollContainer, ScrollController, SectionThresholds};
    use std::time::{Duration, Instant};
    use winit::dpi::PhysicalPosition;

    fn code(key: KeyCode) -> PhysicalKey {
        PhysicalKey::Code(key)
    }

    #[test]
    fn arrows_map_to_navigation() {
        let forward = Some(KeyCommand::Navigate(NavKey::Forward));
        let back = Some(KeyCommand::Navigate(NavKey::Back));
        assert_eq!(key_command(code(KeyCode::ArrowDown), false), forward);
        assert_eq!(key_command(code(KeyCode::ArrowRight), false), forward);
        assert_eq!(key_command(code(KeyCode::ArrowUp), false), back);
        assert_eq!(key_command(code(KeyCode::ArrowLeft), false), back);
        assert_eq!(key_command(code(KeyCode::KeyA), false), None);
    }

    #[test]
    fn escape_quits_unless_typing() {
        assert_eq!(key_command(code(KeyCode::Escape), false), Some(KeyCommand::Quit));
        assert_eq!(key_command(code(KeyCode::Escape), true), None);
    }

    #[test]
    fn focus_flag_reaches_the_controller_guard() {
        let mut controller = ScrollController::new(SectionThresholds::uniform(4).unwrap());
        let start = Instant::now();
        controller.schedule_attach(start);
        let container = ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0);
        assert!(controller.poll_attach(start + Duration::from_secs(1), Some(container)));

        let Some(KeyCommand::Navigate(key)) = key_command(code(KeyCode::ArrowRight), true) else {
            panic!("arrow keys are routed while a text field has focus");
        };
        assert!(!controller.handle_key(key, true));
        assert!(controller.handle_key(key, false));
    }

    #[test]
    fn wheel_notch_down_scrolls_forward() {
        let delta = wheel_delta(MouseScrollDelta::LineDelta(0.0, -1.0), 1.0);
        assert_eq!(delta.y, LINE_HEIGHT_PX);
        assert_eq!(delta.x, 0.0);
    }

    #[test]
    fn pixel_deltas_become_logical() {
        let delta = wheel_delta(MouseScrollDelta::PixelDelta(PhysicalPosition::new(20.0, -60.0)), 2.0);
        assert_eq!(delta.x, -10.0);
        assert_eq!(delta.y, 30.0);
    }
}
