//! Timed intro overlay shown before the portfolio becomes interactive.

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Vec2};
use std::time::{Duration, Instant};

const SILHOUETTE_AT: Duration = Duration::from_millis(300);
const PROGRESS_START: Duration = Duration::from_millis(500);
const PROGRESS_STEP: Duration = Duration::from_millis(25);
const PROGRESS_INCREMENT: f32 = 1.25;
const MESSAGE_SWITCH: Duration = Duration::from_millis(1500);
const FADE_START: Duration = Duration::from_millis(3000);
const FADE_DURATION: Duration = Duration::from_millis(1000);

pub const LOADING_MESSAGE: &str = "Loading experience...";
pub const PREPARING_MESSAGE: &str = "Preparing your journey...";

const BACKDROP: Color32 = Color32::from_rgb(15, 15, 15);
const GOLD: Color32 = Color32::from_rgb(212, 175, 55);
const MUD: Color32 = Color32::from_rgb(140, 92, 51);

/// What the overlay looks like at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntranceFrame {
    pub silhouette_visible: bool,
    /// Percent in `[0, 100]`.
    pub progress: f32,
    pub message: &'static str,
    pub opacity: f32,
    pub complete: bool,
}

impl EntranceFrame {
    pub fn at(elapsed: Duration) -> Self {
        let progress = match elapsed.checked_sub(PROGRESS_START) {
            Some(since) => {
                let steps = (since.as_millis() / PROGRESS_STEP.as_millis()) as f32;
                (steps * PROGRESS_INCREMENT).min(100.0)
            }
            None => 0.0,
        };
        let opacity = match elapsed.checked_sub(FADE_START) {
            Some(since) => 1.0 - (since.as_secs_f32() / FADE_DURATION.as_secs_f32()).min(1.0),
            None => 1.0,
        };
        Self {
            silhouette_visible: elapsed >= SILHOUETTE_AT,
            progress,
            message: if elapsed < MESSAGE_SWITCH {
                LOADING_MESSAGE
            } else {
                PREPARING_MESSAGE
            },
            opacity,
            complete: elapsed >= FADE_START + FADE_DURATION,
        }
    }
}

pub struct EntranceScreen {
    started: Instant,
    elapsed: Duration,
    cancelled: bool,
}

impl EntranceScreen {
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            elapsed: Duration::ZERO,
            cancelled: false,
        }
    }

    /// Advances the timeline to `now`. After [`cancel`](Self::cancel) the
    /// timeline stays frozen and never completes.
    pub fn frame_at(&mut self, now: Instant) -> EntranceFrame {
        if !self.cancelled {
            self.elapsed = now.saturating_duration_since(self.started);
        }
        let mut frame = EntranceFrame::at(self.elapsed);
        if self.cancelled {
            frame.complete = false;
        }
        frame
    }

    pub fn cancel(&mut self) {
        if !self.cancelled {
            log::debug!("Entrance screen cancelled at {:?}", self.elapsed);
        }
        self.cancelled = true;
    }
}

/// Paints the overlay over the whole screen and swallows pointer input
/// beneath it.
pub fn draw(ctx: &egui::Context, frame: &EntranceFrame) {
    let screen = ctx.screen_rect();
    egui::Area::new(egui::Id::new("entrance_screen"))
        .order(egui::Order::Tooltip)
        .fixed_pos(screen.min)
        .show(ctx, |ui| {
            ui.allocate_rect(screen, Sense::click_and_drag());
            let painter = ui.painter();
            let fade = frame.opacity;
            painter.rect_filled(screen, 0.0, BACKDROP.gamma_multiply(fade));

            let center = screen.center() - Vec2::new(0.0, 40.0);
            if frame.silhouette_visible {
                paint_hut(painter, center, fade);
            }

            let bar = Rect::from_center_size(center + Vec2::new(0.0, 90.0), Vec2::new(220.0, 4.0));
            painter.rect_filled(bar, 2.0, Color32::from_gray(40).gamma_multiply(fade));
            let mut filled = bar;
            filled.set_width(bar.width() * frame.progress / 100.0);
            painter.rect_filled(filled, 2.0, GOLD.gamma_multiply(fade));

            painter.text(
                bar.center_bottom() + Vec2::new(0.0, 18.0),
                Align2::CENTER_TOP,
                frame.message,
                FontId::proportional(15.0),
                Color32::from_gray(200).gamma_multiply(fade),
            );
            painter.text(
                bar.right_top() + Vec2::new(0.0, -8.0),
                Align2::RIGHT_BOTTOM,
                format!("{:.0}%", frame.progress),
                FontId::monospace(12.0),
                GOLD.gamma_multiply(fade),
            );
        });
}

fn paint_hut(painter: &egui::Painter, center: Pos2, fade: f32) {
    let body = Rect::from_center_size(center + Vec2::new(0.0, 20.0), Vec2::new(110.0, 60.0));
    painter.rect_filled(body, 4.0, MUD.gamma_multiply(fade));
    let roof = vec![
        Pos2::new(body.left() - 18.0, body.top() + 4.0),
        Pos2::new(center.x, body.top() - 52.0),
        Pos2::new(body.right() + 18.0, body.top() + 4.0),
    ];
    painter.add(Shape::convex_polygon(roof, GOLD.gamma_multiply(fade * 0.85), Stroke::NONE));
    let door = Rect::from_min_size(
        Pos2::new(center.x - 12.0, body.bottom() - 34.0),
        Vec2::new(24.0, 34.0),
    );
    painter.rect_filled(door, 2.0, BACKDROP.gamma_multiply(fade));
}
