use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use std::num::NonZeroU32;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

#[derive(Debug, thiserror::Error)]
pub enum GlWindowError {
    #[error("failed to create window and GL config: {0}")]
    Display(String),
    #[error("display builder returned no window")]
    NoWindow,
    #[error("window handle unavailable: {0}")]
    Handle(#[from] raw_window_handle::HandleError),
    #[error(transparent)]
    Glutin(#[from] glutin::error::Error),
}

/// Window plus a current OpenGL ES 3.0 context and surface.
pub struct GlWindow {
    pub window: Arc<Window>,
    pub gl: Arc<glow::Context>,
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
}

impl GlWindow {
    pub fn create(event_loop: &ActiveEventLoop, attributes: WindowAttributes) -> Result<Self, GlWindowError> {
        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24)
            .with_transparency(false);
        let (window, config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, |configs| {
                configs
                    .reduce(|best, config| {
                        if config.num_samples() > best.num_samples() {
                            config
                        } else {
                            best
                        }
                    })
                    .expect("glutin hands the picker at least one config")
            })
            .map_err(|err| GlWindowError::Display(err.to_string()))?;
        let window = window.ok_or(GlWindowError::NoWindow)?;

        let raw_handle = window.window_handle()?.as_raw();
        let display = config.display();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(Some(Version::new(3, 0))))
            .build(Some(raw_handle));
        // SAFETY: the raw handle belongs to `window`, which outlives the context.
        let not_current = unsafe { display.create_context(&config, &context_attributes)? };

        let size = window.inner_size();
        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_handle,
            non_zero(size.width),
            non_zero(size.height),
        );
        // SAFETY: as above.
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes)? };
        let context = not_current.make_current(&surface)?;

        // SAFETY: the context was just made current on this thread.
        let gl = unsafe { glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name)) };
        log::info!(
            "GL context ready ({} samples, {}x{})",
            config.num_samples(),
            size.width,
            size.height
        );

        Ok(Self {
            window: Arc::new(window),
            gl: Arc::new(gl),
            context,
            surface,
        })
    }

    pub fn resize(&self, size: PhysicalSize<u32>) {
        self.surface
            .resize(&self.context, non_zero(size.width), non_zero(size.height));
    }

    pub fn swap_buffers(&self) -> Result<(), GlWindowError> {
        self.surface.swap_buffers(&self.context)?;
        Ok(())
    }
}

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}
