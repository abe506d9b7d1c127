//! Panel enter/exit animation and the body of each portfolio panel.

use super::contact::{ContactForm, SubmitState};
use super::{UiAction, GOLD, MUTED, TEXT};
use crate::content::{parse_hex_color, Gallery, PanelKind, PortfolioContent, Project, ALL_CATEGORIES};
use crate::scroll::controller::NestedScroll;
use egui::{Color32, Pos2, RichText, Vec2};

pub const ENTER_DURATION: f32 = 0.8;
pub const EXIT_DURATION: f32 = 0.5;
/// Vertical slide applied to a fully hidden panel, in logical pixels.
pub const HIDDEN_OFFSET: f32 = 50.0;
const NESTED_HEIGHT_RATIO: f32 = 0.8;
const CARD_WIDTH: f32 = 280.0;
const VISIBLE_TECHS: usize = 3;

pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    value: f32,
    from: f32,
    target: f32,
    elapsed: f32,
    duration: f32,
}

impl Tween {
    fn settled(value: f32) -> Self {
        Self {
            value,
            from: value,
            target: value,
            elapsed: 0.0,
            duration: 0.0,
        }
    }

    fn retarget(&mut self, target: f32, duration: f32) {
        if self.target != target {
            self.from = self.value;
            self.target = target;
            self.elapsed = 0.0;
            self.duration = duration;
        }
    }

    fn step(&mut self, dt: f32) {
        if self.value == self.target {
            return;
        }
        self.elapsed += dt.max(0.0);
        let t = if self.duration > 0.0 {
            self.elapsed / self.duration
        } else {
            1.0
        };
        self.value = if t >= 1.0 {
            self.target
        } else {
            self.from + (self.target - self.from) * ease_out_cubic(t)
        };
    }
}

/// Per-panel visibility in `[0, 1]`. The active panel eases in, the rest
/// ease out; the first (hero) panel never hides.
pub struct PanelAnimator {
    tweens: Vec<Tween>,
    active: usize,
}

impl PanelAnimator {
    pub fn new(count: usize, active: usize) -> Self {
        let tweens = (0..count)
            .map(|index| Tween::settled(if index == 0 || index == active { 1.0 } else { 0.0 }))
            .collect();
        Self { tweens, active }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn set_active(&mut self, active: usize) {
        self.active = active;
        for (index, tween) in self.tweens.iter_mut().enumerate() {
            if index == 0 || index == active {
                tween.retarget(1.0, ENTER_DURATION);
            } else {
                tween.retarget(0.0, EXIT_DURATION);
            }
        }
    }

    pub fn tick(&mut self, dt: f32) {
        for tween in &mut self.tweens {
            tween.step(dt);
        }
    }

    pub fn visibility(&self, index: usize) -> f32 {
        self.tweens.get(index).map_or(0.0, |tween| tween.value)
    }

    pub fn slide_offset(&self, index: usize) -> f32 {
        (1.0 - self.visibility(index)) * HIDDEN_OFFSET
    }
}

/// Widget state that outlives a single frame.
#[derive(Default)]
pub struct PanelWidgets {
    pub gallery_filters: Vec<String>,
    pub contact: ContactForm,
}

impl PanelWidgets {
    fn filter_for(&mut self, gallery: usize) -> &mut String {
        if self.gallery_filters.len() <= gallery {
            self.gallery_filters.resize(gallery + 1, ALL_CATEGORIES.to_string());
        }
        &mut self.gallery_filters[gallery]
    }
}

pub struct PanelEnv<'a> {
    pub content: &'a PortfolioContent,
    pub pointer: Option<Pos2>,
    pub size: Vec2,
}

#[derive(Default)]
pub struct PanelOutput {
    pub nested: Option<NestedScroll>,
    pub actions: Vec<UiAction>,
}

pub fn draw_body(
    ui: &mut egui::Ui,
    kind: PanelKind,
    env: &PanelEnv<'_>,
    widgets: &mut PanelWidgets,
    out: &mut PanelOutput,
) {
    match kind {
        PanelKind::Hero => hero(ui, env),
        PanelKind::Foundation => {
            nested_region(ui, "foundation", env, out, |ui| foundation(ui, env.content));
        }
        PanelKind::Gallery(index) => {
            if let Some(gallery) = env.content.galleries.get(index) {
                let filter = widgets.filter_for(index);
                gallery_tabs(ui, gallery, filter);
                let filter = filter.clone();
                nested_region(ui, ("gallery", index), env, out, |ui| {
                    project_cards(ui, gallery, &filter);
                });
            }
        }
        PanelKind::Services => {
            nested_region(ui, "services", env, out, |ui| services(ui, env.content));
        }
        PanelKind::Contact => contact(ui, env.content, &mut widgets.contact, out),
    }
}

/// Vertical scroll area whose metrics are reported when the pointer is
/// over it, so wheel input can be left to it.
fn nested_region(
    ui: &mut egui::Ui,
    id: impl std::hash::Hash,
    env: &PanelEnv<'_>,
    out: &mut PanelOutput,
    add_contents: impl FnOnce(&mut egui::Ui),
) {
    let output = egui::ScrollArea::vertical()
        .id_salt(id)
        .max_height(env.size.y * NESTED_HEIGHT_RATIO)
        .auto_shrink([false, true])
        .show(ui, add_contents);
    if env.pointer.is_some_and(|pointer| output.inner_rect.contains(pointer)) {
        out.nested = Some(NestedScroll {
            offset: output.state.offset.y,
            content_extent: output.content_size.y,
            viewport_extent: output.inner_rect.height(),
        });
    }
}

fn hero(ui: &mut egui::Ui, env: &PanelEnv<'_>) {
    let personal = &env.content.personal;
    ui.add_space(env.size.y * 0.3);
    ui.vertical_centered(|ui| {
        ui.label(RichText::new(&personal.name).size(56.0).strong().color(TEXT));
        let subtitle = if personal.hero_subtitle.is_empty() {
            &personal.title
        } else {
            &personal.hero_subtitle
        };
        ui.label(RichText::new(subtitle).size(20.0).color(GOLD));
        ui.add_space(36.0);
        if !personal.scroll_hint.is_empty() {
            ui.label(RichText::new(format!("→ {} →", personal.scroll_hint)).color(MUTED));
        }
    });
}

fn heading(ui: &mut egui::Ui, title: &str) {
    ui.label(RichText::new(title).size(30.0).strong().color(TEXT));
    ui.add_space(8.0);
}

fn section_label(ui: &mut egui::Ui, title: &str) {
    ui.add_space(14.0);
    ui.label(RichText::new(title).size(17.0).strong().color(GOLD));
    ui.add_space(4.0);
}

fn chips<'a>(ui: &mut egui::Ui, items: impl IntoIterator<Item = &'a String>) {
    ui.horizontal_wrapped(|ui| {
        for item in items {
            card_frame(Color32::from_gray(34)).show(ui, |ui| {
                ui.label(RichText::new(item).size(12.0).color(TEXT));
            });
        }
    });
}

fn card_frame(fill: Color32) -> egui::Frame {
    egui::Frame::new()
        .fill(fill)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::same(10))
}

fn accent_color(accent: Option<&String>) -> Color32 {
    accent
        .and_then(|value| parse_hex_color(value))
        .map_or(GOLD, |[r, g, b]| Color32::from_rgb(r, g, b))
}

fn foundation(ui: &mut egui::Ui, content: &PortfolioContent) {
    heading(ui, "Foundation");
    ui.label(RichText::new(&content.introduction.tagline).size(18.0).color(GOLD));
    ui.add_space(6.0);
    ui.label(RichText::new(&content.introduction.paragraph).color(TEXT));

    if !content.stats.is_empty() {
        ui.add_space(12.0);
        ui.horizontal_wrapped(|ui| {
            for stat in &content.stats {
                card_frame(Color32::from_gray(26)).show(ui, |ui| {
                    ui.vertical(|ui| {
                        ui.label(RichText::new(&stat.value).size(26.0).strong().color(GOLD));
                        ui.label(RichText::new(&stat.label).color(MUTED));
                    });
                });
            }
        });
    }

    if !content.tech_stack.is_empty() {
        section_label(ui, "Tech Stack");
        chips(ui, &content.tech_stack);
    }

    for group in &content.skills {
        section_label(ui, &group.category);
        chips(ui, &group.items);
    }

    if !content.experience.is_empty() {
        section_label(ui, "Experience");
        for job in &content.experience {
            ui.label(RichText::new(format!("{} · {}", job.role, job.company)).strong().color(TEXT));
            ui.label(RichText::new(&job.period).size(12.0).color(MUTED));
            if let Some(description) = &job.description {
                ui.label(RichText::new(description).color(TEXT));
            }
            ui.add_space(6.0);
        }
    }

    if !content.education.is_empty() {
        section_label(ui, "Education");
        for entry in &content.education {
            ui.label(RichText::new(&entry.degree).strong().color(TEXT));
            ui.label(RichText::new(format!("{} · {}", entry.institution, entry.period)).color(MUTED));
        }
    }

    if !content.certifications.is_empty() {
        section_label(ui, "Certifications");
        for cert in &content.certifications {
            ui.label(RichText::new(format!("{} ({})", cert.name, cert.year)).color(TEXT));
        }
    }
}

fn gallery_tabs(ui: &mut egui::Ui, gallery: &Gallery, filter: &mut String) {
    heading(ui, &gallery.title);
    if !gallery.subtitle.is_empty() {
        ui.label(RichText::new(&gallery.subtitle).color(MUTED));
    }
    ui.add_space(6.0);
    ui.horizontal_wrapped(|ui| {
        for category in gallery.categories() {
            let selected = filter.as_str() == category;
            if ui.selectable_label(selected, category).clicked() && !selected {
                *filter = category.to_string();
            }
        }
    });
    ui.add_space(8.0);
}

fn project_cards(ui: &mut egui::Ui, gallery: &Gallery, filter: &str) {
    ui.horizontal_wrapped(|ui| {
        for project in gallery.filtered(filter) {
            ui.allocate_ui(Vec2::new(CARD_WIDTH, 0.0), |ui| project_card(ui, project));
        }
    });
}

fn project_card(ui: &mut egui::Ui, project: &Project) {
    let accent = accent_color(project.accent.as_ref());
    card_frame(Color32::from_gray(24))
        .stroke(egui::Stroke::new(1.0, accent.gamma_multiply(0.6)))
        .show(ui, |ui| {
            ui.set_width(CARD_WIDTH - 20.0);
            ui.label(RichText::new(&project.category).size(11.0).color(accent));
            ui.label(RichText::new(&project.title).size(17.0).strong().color(TEXT));
            ui.label(RichText::new(&project.description).size(13.0).color(MUTED));
            ui.horizontal_wrapped(|ui| {
                for tech in project.tech.iter().take(VISIBLE_TECHS) {
                    ui.label(RichText::new(tech).size(11.0).color(GOLD));
                }
                let hidden = project.tech.len().saturating_sub(VISIBLE_TECHS);
                if hidden > 0 {
                    ui.label(RichText::new(format!("+{hidden}")).size(11.0).color(MUTED));
                }
            });
            if let Some(link) = &project.link {
                ui.hyperlink_to("View project", link);
            }
        });
}

fn services(ui: &mut egui::Ui, content: &PortfolioContent) {
    heading(ui, "Services");
    ui.horizontal_wrapped(|ui| {
        for service in &content.services {
            let accent = accent_color(service.accent.as_ref());
            ui.allocate_ui(Vec2::new(CARD_WIDTH, 0.0), |ui| {
                card_frame(Color32::from_gray(24))
                    .stroke(egui::Stroke::new(1.0, accent.gamma_multiply(0.6)))
                    .show(ui, |ui| {
                        ui.set_width(CARD_WIDTH - 20.0);
                        ui.label(RichText::new(&service.title).size(17.0).strong().color(accent));
                        ui.label(RichText::new(&service.description).size(13.0).color(TEXT));
                        for feature in &service.features {
                            ui.label(RichText::new(format!("• {feature}")).size(12.0).color(MUTED));
                        }
                    });
            });
        }
    });
}

fn contact(ui: &mut egui::Ui, content: &PortfolioContent, form: &mut ContactForm, out: &mut PanelOutput) {
    heading(ui, "Let's Work Together");
    ui.columns(2, |columns| {
        let profile = &mut columns[0];
        card_frame(Color32::from_gray(24)).show(profile, |ui| {
            ui.label(RichText::new(&content.personal.name).size(20.0).strong().color(TEXT));
            ui.label(RichText::new(&content.personal.title).color(GOLD));
            if !content.personal.location.is_empty() {
                ui.label(RichText::new(&content.personal.location).color(MUTED));
            }
            ui.add_space(8.0);
            ui.label(RichText::new(&content.contact.bio).color(TEXT));
            ui.add_space(8.0);
            ui.hyperlink_to(&content.personal.email, format!("mailto:{}", content.personal.email));
            for link in &content.social_links {
                ui.hyperlink_to(&link.name, &link.url);
            }
        });

        let placeholders = &content.contact.placeholders;
        let form_ui = &mut columns[1];
        let sending = form.state() == &SubmitState::Sending;
        form_ui.add_enabled_ui(!sending, |ui| {
            ui.label(RichText::new("Name").color(MUTED));
            ui.add(egui::TextEdit::singleline(&mut form.name).hint_text(&placeholders.name));
            ui.label(RichText::new("Email").color(MUTED));
            ui.add(egui::TextEdit::singleline(&mut form.email).hint_text(&placeholders.email));
            ui.label(RichText::new("Message").color(MUTED));
            ui.add(
                egui::TextEdit::multiline(&mut form.message)
                    .hint_text(&placeholders.message)
                    .desired_rows(5),
            );
            ui.add_space(6.0);
            if ui.button(RichText::new("Send Message").color(GOLD)).clicked() {
                out.actions.push(UiAction::SubmitContact);
            }
        });
        if let Some(err) = form.validation_error() {
            form_ui.colored_label(Color32::LIGHT_RED, err.to_string());
        }
        match form.state() {
            SubmitState::Idle => {}
            SubmitState::Sending => {
                form_ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Sending...");
                });
            }
            SubmitState::Sent => {
                form_ui.colored_label(Color32::LIGHT_GREEN, "Message sent! I'll get back to you soon.");
            }
            SubmitState::Failed(message) => {
                form_ui.colored_label(
                    Color32::LIGHT_RED,
                    format!("Failed to send: {message}. Please try again."),
                );
            }
        }
    });

    ui.add_space(24.0);
    ui.separator();
    ui.vertical_centered(|ui| {
        ui.label(RichText::new(&content.footer.copyright).size(12.0).color(MUTED));
        if !content.footer.built_with.is_empty() {
            ui.label(RichText::new(&content.footer.built_with).size(12.0).color(MUTED));
        }
    });
}
