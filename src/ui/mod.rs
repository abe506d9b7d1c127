pub mod contact;
pub mod entrance;
pub mod panels;

use crate::assets::AssetStatus;
use crate::content::{Panel, PortfolioContent};
use crate::scroll::controller::NestedScroll;
use crate::scroll::store::ScrollSnapshot;
use crate::scroll::{ScrollAxis, LAYOUT_BREAKPOINT};
use contact::ContactForm;
use egui::{Align2, Color32, Pos2, Rect, RichText, Sense, Vec2};
use entrance::EntranceScreen;
use panels::{PanelAnimator, PanelEnv, PanelOutput, PanelWidgets};
use std::time::Instant;

pub(crate) const GOLD: Color32 = Color32::from_rgb(212, 175, 55);
pub(crate) const TEXT: Color32 = Color32::from_gray(230);
pub(crate) const MUTED: Color32 = Color32::from_gray(150);

const CONTENT_MAX_WIDTH: f32 = 960.0;
const PANEL_PADDING: f32 = 24.0;
const NAV_TOP_OFFSET: f32 = 64.0;

/// Requests the UI hands back to the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    ScrollToSection(usize),
    ReloadScene,
    SubmitContact,
}

/// Per-frame input to [`UiState::draw`].
pub struct UiFrame<'a> {
    pub snapshot: ScrollSnapshot,
    pub axis: ScrollAxis,
    pub offset: f32,
    pub asset_status: &'a AssetStatus,
    pub dt: f32,
    pub now: Instant,
}

pub struct UiState {
    content: PortfolioContent,
    panels: Vec<Panel>,
    animator: PanelAnimator,
    widgets: PanelWidgets,
    menu_open: bool,
    entrance: Option<EntranceScreen>,
    nested: Option<NestedScroll>,
}

impl UiState {
    pub fn new(content: PortfolioContent, show_entrance: bool, now: Instant) -> Self {
        let panels = content.panels();
        Self {
            animator: PanelAnimator::new(panels.len(), 0),
            panels,
            content,
            widgets: PanelWidgets::default(),
            menu_open: false,
            entrance: show_entrance.then(|| EntranceScreen::new(now)),
            nested: None,
        }
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn close_menu(&mut self) {
        self.menu_open = false;
    }

    /// Metrics of the nested scroll region under the pointer last frame.
    pub fn nested_scroll(&self) -> Option<NestedScroll> {
        self.nested
    }

    pub fn cancel_entrance(&mut self) {
        if let Some(entrance) = &mut self.entrance {
            entrance.cancel();
        }
    }

    pub fn contact_mut(&mut self) -> &mut ContactForm {
        &mut self.widgets.contact
    }

    pub fn draw(&mut self, ctx: &egui::Context, frame: &UiFrame<'_>) -> Vec<UiAction> {
        let entrance_frame = self.entrance.as_mut().map(|entrance| entrance.frame_at(frame.now));
        if entrance_frame.is_some_and(|state| state.complete) {
            log::info!("Entrance screen finished");
            self.entrance = None;
        }

        self.widgets.contact.poll();
        if self.animator.active() != frame.snapshot.section {
            self.animator.set_active(frame.snapshot.section);
        }
        self.animator.tick(frame.dt);

        let screen = ctx.screen_rect();
        let narrow = screen.width() < LAYOUT_BREAKPOINT;
        let mut out = PanelOutput::default();
        self.draw_panels(ctx, frame, screen, &mut out);
        self.nested = out.nested;

        if narrow {
            self.draw_menu(ctx, frame.snapshot.section, &mut out.actions);
        } else {
            self.draw_dots(ctx, frame.snapshot.section, &mut out.actions);
        }
        self.draw_progress(ctx, frame.snapshot, narrow);
        draw_scene_status(ctx, frame.asset_status, &mut out.actions);

        if let Some(state) = entrance_frame.filter(|state| !state.complete) {
            entrance::draw(ctx, &state);
        }
        out.actions
    }

    fn draw_panels(&mut self, ctx: &egui::Context, frame: &UiFrame<'_>, screen: Rect, out: &mut PanelOutput) {
        let size = screen.size();
        let pointer = ctx.input(|input| input.pointer.hover_pos());
        let env = PanelEnv {
            content: &self.content,
            pointer,
            size,
        };
        for (index, panel) in self.panels.iter().enumerate() {
            let rect = Rect::from_min_size(panel_origin(index, frame.axis, frame.offset, size), size);
            let visibility = self.animator.visibility(index);
            if !rect.intersects(screen) || visibility <= 0.0 {
                continue;
            }
            let pad_x = ((size.x - CONTENT_MAX_WIDTH) * 0.5).max(PANEL_PADDING);
            let origin = rect.min + Vec2::new(pad_x, NAV_TOP_OFFSET + self.animator.slide_offset(index));
            egui::Area::new(egui::Id::new(("panel", index)))
                .fixed_pos(origin)
                .constrain(false)
                .interactable(visibility > 0.05)
                .show(ctx, |ui| {
                    ui.set_opacity(visibility);
                    ui.set_width(size.x - 2.0 * pad_x);
                    panels::draw_body(ui, panel.kind, &env, &mut self.widgets, out);
                });
        }
    }

    fn draw_dots(&self, ctx: &egui::Context, section: usize, actions: &mut Vec<UiAction>) {
        egui::Area::new(egui::Id::new("nav_dots"))
            .order(egui::Order::Foreground)
            .anchor(Align2::CENTER_TOP, Vec2::new(0.0, 18.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for (index, panel) in self.panels.iter().enumerate() {
                        let (rect, response) = ui.allocate_exact_size(Vec2::splat(22.0), Sense::click());
                        let painter = ui.painter();
                        if index == section {
                            painter.circle_filled(rect.center(), 9.0, GOLD.gamma_multiply(0.25));
                            painter.circle_filled(rect.center(), 6.0, GOLD);
                        } else {
                            let color = if response.hovered() { TEXT } else { MUTED };
                            painter.circle_filled(rect.center(), 3.5, color);
                        }
                        if response.on_hover_text(&panel.label).clicked() {
                            actions.push(UiAction::ScrollToSection(index));
                        }
                    }
                });
            });
    }

    fn draw_menu(&mut self, ctx: &egui::Context, section: usize, actions: &mut Vec<UiAction>) {
        egui::Area::new(egui::Id::new("nav_menu"))
            .order(egui::Order::Foreground)
            .anchor(Align2::RIGHT_TOP, Vec2::new(-16.0, 16.0))
            .show(ctx, |ui| {
                let icon = if self.menu_open { "✕" } else { "☰" };
                if ui.button(RichText::new(icon).size(20.0).color(GOLD)).clicked() {
                    self.menu_open = !self.menu_open;
                }
                if !self.menu_open {
                    return;
                }
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    for (index, panel) in self.panels.iter().enumerate() {
                        if ui.selectable_label(index == section, &panel.label).clicked() {
                            actions.push(UiAction::ScrollToSection(index));
                        }
                    }
                });
            });
    }

    fn draw_progress(&self, ctx: &egui::Context, snapshot: ScrollSnapshot, narrow: bool) {
        let width = (ctx.screen_rect().width() * 0.6).min(480.0);
        egui::Area::new(egui::Id::new("scroll_progress"))
            .order(egui::Order::Foreground)
            .interactable(false)
            .anchor(Align2::CENTER_BOTTOM, Vec2::new(0.0, -16.0))
            .show(ctx, |ui| {
                ui.set_width(width);
                ui.vertical_centered(|ui| {
                    if narrow {
                        if let Some(panel) = self.panels.get(snapshot.section) {
                            let label = format!("{} · {}/{}", panel.label, snapshot.section + 1, self.panels.len());
                            ui.label(RichText::new(label).size(12.0).color(TEXT));
                        }
                    } else {
                        ui.horizontal(|ui| {
                            for (index, panel) in self.panels.iter().enumerate() {
                                let color = if index == snapshot.section { GOLD } else { MUTED };
                                ui.label(RichText::new(&panel.label).size(11.0).color(color));
                            }
                        });
                    }
                    let (track, _) = ui.allocate_exact_size(Vec2::new(width, 3.0), Sense::hover());
                    let painter = ui.painter();
                    painter.rect_filled(track, 1.5, Color32::from_gray(45));
                    let mut filled = track;
                    filled.set_width(track.width() * snapshot.progress.get());
                    painter.rect_filled(filled, 1.5, GOLD);
                });
            });
    }
}

/// Top-left corner of panel `index` on the strip, given the strip offset.
pub fn panel_origin(index: usize, axis: ScrollAxis, offset: f32, size: Vec2) -> Pos2 {
    let along = index as f32 * axis.extent_of([size.x, size.y]) - offset;
    match axis {
        ScrollAxis::Horizontal => Pos2::new(along, 0.0),
        ScrollAxis::Vertical => Pos2::new(0.0, along),
    }
}

fn draw_scene_status(ctx: &egui::Context, status: &AssetStatus, actions: &mut Vec<UiAction>) {
    match status {
        AssetStatus::Ready => {}
        AssetStatus::Loading => {
            egui::Area::new(egui::Id::new("scene_loading"))
                .order(egui::Order::Foreground)
                .interactable(false)
                .anchor(Align2::LEFT_BOTTOM, Vec2::new(16.0, -16.0))
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("Loading scene...").size(12.0).color(MUTED));
                    });
                });
        }
        AssetStatus::Failed(message) => {
            egui::Window::new("3D Scene Error")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::RIGHT_BOTTOM, Vec2::new(-16.0, -64.0))
                .show(ctx, |ui| {
                    ui.label(RichText::new("The 3D scene could not be loaded.").color(TEXT));
                    ui.label(RichText::new(message).size(12.0).color(MUTED));
                    ui.add_space(6.0);
                    if ui.button(RichText::new("Reload").color(GOLD)).clicked() {
                        actions.push(UiAction::ReloadScene);
                    }
                });
        }
    }
}
