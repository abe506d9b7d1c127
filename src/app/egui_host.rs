use egui_winit::winit::event::WindowEvent;
use std::sync::Arc;
use winit::window::Window;

pub struct EguiFrameOutput {
    pub clipped_primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
    pub screen_size_px: [u32; 2],
    pub wants_keyboard_input: bool,
}

/// egui context, winit input translation and the glow painter.
pub struct EguiHost {
    context: egui::Context,
    winit_state: egui_winit::State,
    painter: egui_glow::Painter,
}

impl EguiHost {
    pub fn new(window: &Window, gl: Arc<glow::Context>) -> Result<Self, egui_glow::PainterError> {
        let context = egui::Context::default();
        context.set_visuals(egui::Visuals::dark());
        let winit_state = egui_winit::State::new(
            context.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let painter = egui_glow::Painter::new(gl, "", None, false)?;

        Ok(Self {
            context,
            winit_state,
            painter,
        })
    }

    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    pub fn run_ui<F>(&mut self, window: &Window, run_ui: F) -> EguiFrameOutput
    where
        F: FnMut(&egui::Context),
    {
        let raw_input = self.winit_state.take_egui_input(window);
        let full_output = self.context.run(raw_input, run_ui);
        self.winit_state
            .handle_platform_output(window, full_output.platform_output);
        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self
            .context
            .tessellate(full_output.shapes, pixels_per_point);
        let size = window.inner_size();

        EguiFrameOutput {
            clipped_primitives,
            textures_delta: full_output.textures_delta,
            pixels_per_point,
            screen_size_px: [size.width.max(1), size.height.max(1)],
            wants_keyboard_input: self.context.wants_keyboard_input(),
        }
    }

    pub fn paint(&mut self, output: &EguiFrameOutput) {
        self.painter.paint_and_update_textures(
            output.screen_size_px,
            output.pixels_per_point,
            &output.clipped_primitives,
            &output.textures_delta,
        );
    }

    /// Releases the painter's GL objects. The context must still be current.
    pub fn destroy(&mut self) {
        self.painter.destroy();
    }
}
