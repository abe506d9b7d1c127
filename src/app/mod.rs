mod egui_host;
mod gl_window;
mod input;
mod timing;

use crate::assets::{AssetLoader, AssetStatus};
use crate::config::{AxisMode, ViewerConfig};
use crate::render::RenderContext;
use crate::scene::{SceneDirector, StaticRig};
use crate::scroll::{ScrollAxis, ScrollContainer, ScrollController, ScrollSnapshot, WheelOutcome};
use crate::ui::contact::MailRelay;
use crate::ui::{UiAction, UiFrame, UiState};
use egui_host::EguiHost;
use gl_window::GlWindow;
use glow::HasContext;
use input::KeyCommand;
use timing::FrameTiming;

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

pub struct App {
    axis_mode: AxisMode,
    window_size: [u32; 2],
    title: String,
    relay: Option<Arc<dyn MailRelay>>,
    gl_window: Option<GlWindow>,
    egui: Option<EguiHost>,
    render: Option<RenderContext>,
    render_error: Option<String>,
    loader: AssetLoader,
    controller: ScrollController,
    director: SceneDirector,
    ui: UiState,
    section_changed: Rc<Cell<bool>>,
    timing: FrameTiming,
    wants_keyboard_input: bool,
    target_frame_duration: Duration,
    next_frame_time: Instant,
    close_requested: bool,
}

impl App {
    pub fn new(config: ViewerConfig) -> Self {
        let now = Instant::now();
        let title = format!("{} - Portfolio", config.content.personal.name);
        let relay = config
            .relay
            .map(|relay| Arc::new(relay) as Arc<dyn MailRelay>);
        Self {
            axis_mode: config.axis,
            window_size: config.window_size,
            title,
            relay,
            gl_window: None,
            egui: None,
            render: None,
            render_error: None,
            loader: AssetLoader::spawn(config.assets),
            controller: ScrollController::new(config.thresholds),
            director: SceneDirector::new(),
            ui: UiState::new(config.content, config.show_entrance, now),
            section_changed: Rc::new(Cell::new(false)),
            timing: FrameTiming::new(now),
            wants_keyboard_input: false,
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: now,
            close_requested: false,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.window_size[0], self.window_size[1]))
            .with_resizable(true);
        let gl_window = GlWindow::create(event_loop, attributes)?;
        log::info!("Window created");

        let egui = EguiHost::new(&gl_window.window, gl_window.gl.clone())
            .map_err(|err| anyhow::anyhow!("creating egui painter: {err}"))?;

        let size = gl_window.window.inner_size();
        match RenderContext::new(gl_window.gl.clone(), StaticRig::default(), size.width, size.height) {
            Ok(render) => self.render = Some(render),
            Err(err) => {
                log::warn!("3D renderer unavailable: {err}");
                self.render_error = Some(err.to_string());
            }
        }

        self.update_target_frame_duration(&gl_window.window);
        self.gl_window = Some(gl_window);
        self.egui = Some(egui);
        Ok(())
    }

    /// Subscribes the menu-close flag and arms the deferred attach.
    fn attach_scroll(&mut self, now: Instant) {
        let flag = Rc::clone(&self.section_changed);
        let mut last_section = self.controller.current_section();
        self.controller.subscribe(move |snapshot: &ScrollSnapshot| {
            if snapshot.section != last_section {
                last_section = snapshot.section;
                flag.set(true);
            }
        });
        self.controller.schedule_attach(now);
    }

    fn logical_size(&self) -> Option<[f32; 2]> {
        let window = &self.gl_window.as_ref()?.window;
        let size = window.inner_size().to_logical::<f32>(window.scale_factor());
        Some([size.width.max(1.0), size.height.max(1.0)])
    }

    fn current_axis(&self) -> ScrollAxis {
        let width = self.logical_size().map_or(self.window_size[0] as f32, |size| size[0]);
        self.axis_mode.resolve(width)
    }

    /// The panel strip as it would be measured right now.
    fn strip_container(&self) -> Option<ScrollContainer> {
        let size = self.logical_size()?;
        Some(ScrollContainer::from_panels(
            self.current_axis(),
            self.ui.panels().len(),
            size,
        ))
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(gl_window) = &self.gl_window {
            gl_window.resize(new_size);
        }
        if let Some(render) = &mut self.render {
            render.resize(new_size.width, new_size.height);
        }
        if let Some(size) = self.logical_size() {
            let axis = self.current_axis();
            self.controller.relayout(axis, size);
        }
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(millihz) = window
            .current_monitor()
            .and_then(|monitor| monitor.refresh_rate_millihertz())
        {
            let hz = millihz as f32 / 1000.0;
            if hz > 1.0 {
                target = Duration::from_secs_f32(1.0 / hz);
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    fn scene_status(&self) -> AssetStatus {
        match &self.render_error {
            Some(message) => AssetStatus::Failed(message.clone()),
            None => self.loader.status().clone(),
        }
    }

    fn render(&mut self) {
        let now = Instant::now();
        let dt = self.timing.tick(now);

        let container = self.strip_container();
        self.controller.poll_attach(now, container);
        self.controller.tick(dt);
        if self.section_changed.replace(false) {
            self.ui.close_menu();
        }
        let snapshot = self.controller.snapshot();
        let frame = self.director.advance(snapshot);

        if let Some(assets) = self.loader.poll() {
            if let Some(render) = &mut self.render {
                if let Err(err) = render.set_assets(&assets) {
                    log::warn!("Failed to upload model: {err}");
                    self.render_error = Some(err.to_string());
                }
            }
        }

        let Some(gl_window) = &self.gl_window else {
            return;
        };
        match &mut self.render {
            Some(render) => {
                frame.apply(render);
                render.advance_placeholder(dt);
                render.render();
            }
            None => {
                let size = gl_window.window.inner_size();
                // SAFETY: the context created with the window is current.
                unsafe {
                    gl_window.gl.viewport(0, 0, size.width as i32, size.height as i32);
                    gl_window.gl.clear_color(0.06, 0.06, 0.06, 1.0);
                    gl_window.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
                }
            }
        }

        let status = self.scene_status();
        let ui_frame = UiFrame {
            snapshot,
            axis: self.controller.container().map_or_else(|| self.current_axis(), |c| c.axis()),
            offset: self.controller.container().map_or(0.0, |c| c.offset()),
            asset_status: &status,
            dt,
            now,
        };
        let mut actions = Vec::new();
        let ui = &mut self.ui;
        if let Some(egui) = &mut self.egui {
            let output = egui.run_ui(&gl_window.window, |ctx| actions = ui.draw(ctx, &ui_frame));
            self.wants_keyboard_input = output.wants_keyboard_input;
            egui.paint(&output);
        }
        if let Err(err) = gl_window.swap_buffers() {
            log::warn!("Failed to present frame: {err}");
        }

        for action in actions {
            self.apply_action(action);
        }
    }

    fn handle_wheel(&mut self, delta: MouseScrollDelta) -> WheelOutcome {
        let scale_factor = self
            .gl_window
            .as_ref()
            .map_or(1.0, |gl_window| gl_window.window.scale_factor());
        let wheel = input::wheel_delta(delta, scale_factor);
        let outcome = self.controller.handle_wheel(wheel, self.ui.nested_scroll());
        if outcome != WheelOutcome::Ignored {
            log::trace!("Wheel {:?} -> {:?}", wheel, outcome);
        }
        outcome
    }

    fn apply_action(&mut self, action: UiAction) {
        match action {
            UiAction::ScrollToSection(index) => {
                self.controller.scroll_to_section(index);
            }
            UiAction::ReloadScene => {
                if let Some(render) = &mut self.render {
                    render.clear_model();
                    self.render_error = None;
                }
                self.director.reset();
                self.loader.reload();
            }
            UiAction::SubmitContact => {
                let relay = self.relay.clone();
                self.ui.contact_mut().submit(relay);
            }
        }
    }

    /// Detaches scroll tracking, stops the entrance timeline and frees GL
    /// objects while the context is still current. Safe to call twice.
    fn shutdown(&mut self) {
        if self.controller.is_attached() {
            log::debug!(
                "Leaving at section {} (progress {:.3})",
                self.controller.current_section(),
                self.controller.scroll_progress().get()
            );
        }
        self.controller.detach();
        self.ui.cancel_entrance();
        if let Some(mut render) = self.render.take() {
            render.destroy();
        }
        if let Some(mut egui) = self.egui.take() {
            egui.destroy();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gl_window.is_some() {
            return;
        }
        if let Err(err) = self.init_graphics(event_loop) {
            log::error!("Failed to initialise graphics: {err:#}");
            self.close_requested = true;
            event_loop.exit();
            return;
        }
        self.attach_scroll(Instant::now());
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        // A wheel turned into strip movement must not also scroll the UI.
        let forward_to_egui = match event {
            WindowEvent::MouseWheel { delta, .. } => !self.handle_wheel(delta).suppresses_native(),
            _ => true,
        };
        if forward_to_egui {
            if let (Some(gl_window), Some(egui)) = (&self.gl_window, &mut self.egui) {
                egui.on_window_event(&gl_window.window, &event);
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                match input::key_command(event.physical_key, self.wants_keyboard_input) {
                    Some(KeyCommand::Quit) => {
                        self.close_requested = true;
                        self.shutdown();
                        event_loop.exit();
                    }
                    Some(KeyCommand::Navigate(key)) => {
                        self.controller.handle_key(key, self.wants_keyboard_input);
                    }
                    None => {}
                }
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.gl_window.as_ref().map(|gl_window| gl_window.window.inner_size()) {
                    self.handle_resize(size);
                }
            }
            WindowEvent::Moved(_) => {
                if let Some(window) = self.gl_window.as_ref().map(|gl_window| Arc::clone(&gl_window.window)) {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::RedrawRequested => {
                if !self.close_requested {
                    self.render();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(gl_window) = &self.gl_window {
                gl_window.window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
