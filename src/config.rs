use crate::assets::AssetRequest;
use crate::content::{ContentError, PortfolioContent};
use crate::scroll::{ScrollAxis, SectionThresholds, ThresholdError};
use crate::ui::contact::{EmailJsRelay, DEFAULT_EMAILJS_ENDPOINT};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

const DEFAULT_MODEL: &str = "assets/models/mud_hut.gltf";

#[derive(Parser, Debug)]
#[command(about = "Scroll-driven portfolio with a sun-lit rotating 3D model", version)]
pub struct Args {
    /// Portfolio content JSON (defaults to the built-in content)
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// glTF/GLB model shown in the scene
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Optional HDR/EXR environment used as an ambient tint
    #[arg(long)]
    pub hdri: Option<PathBuf>,

    /// Ignore --hdri and light the scene without an environment
    #[arg(long)]
    pub no_environment: bool,

    /// Panel strip axis; auto switches on the window width
    #[arg(long, value_enum, default_value_t = AxisMode::Auto)]
    pub axis: AxisMode,

    /// Comma separated section cut points, one fewer than the panel count.
    /// Overrides --threshold-preset.
    #[arg(long, value_delimiter = ',')]
    pub thresholds: Option<Vec<f32>>,

    /// Generated section table used when --thresholds is absent
    #[arg(long, value_enum, default_value_t = ThresholdPreset::Uniform)]
    pub threshold_preset: ThresholdPreset,

    /// Start without the entrance screen
    #[arg(long)]
    pub skip_entrance: bool,

    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    #[arg(long, default_value_t = 800)]
    pub height: u32,

    #[arg(long, default_value = DEFAULT_EMAILJS_ENDPOINT)]
    pub emailjs_endpoint: String,

    #[arg(long, env = "EMAILJS_SERVICE_ID")]
    pub emailjs_service: Option<String>,

    #[arg(long, env = "EMAILJS_TEMPLATE_ID")]
    pub emailjs_template: Option<String>,

    #[arg(long, env = "EMAILJS_USER_ID")]
    pub emailjs_user: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AxisMode {
    Auto,
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThresholdPreset {
    /// Cut `i` at `i / panels`.
    Uniform,
    /// Cuts halfway between panel resting offsets.
    Midpoints,
}

impl ThresholdPreset {
    pub fn table(self, sections: usize) -> Result<SectionThresholds, ThresholdError> {
        match self {
            ThresholdPreset::Uniform => SectionThresholds::uniform(sections),
            ThresholdPreset::Midpoints => SectionThresholds::midpoints(sections),
        }
    }
}

impl AxisMode {
    pub fn resolve(self, logical_width: f32) -> ScrollAxis {
        match self {
            AxisMode::Auto => ScrollAxis::for_viewport_width(logical_width),
            AxisMode::Horizontal => ScrollAxis::Horizontal,
            AxisMode::Vertical => ScrollAxis::Vertical,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("invalid --thresholds: {0}")]
    Thresholds(#[from] ThresholdError),
    #[error("window size {width}x{height} must be non-zero")]
    WindowSize { width: u32, height: u32 },
}

/// Fully resolved startup configuration.
pub struct ViewerConfig {
    pub content: PortfolioContent,
    pub thresholds: SectionThresholds,
    pub assets: AssetRequest,
    pub axis: AxisMode,
    pub show_entrance: bool,
    pub window_size: [u32; 2],
    pub relay: Option<EmailJsRelay>,
}

impl ViewerConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if args.width == 0 || args.height == 0 {
            return Err(ConfigError::WindowSize {
                width: args.width,
                height: args.height,
            });
        }

        let content = match &args.content {
            Some(path) => PortfolioContent::load(path)?,
            None => PortfolioContent::embedded()?,
        };
        let sections = content.panels().len();
        let thresholds = match &args.thresholds {
            Some(cuts) => SectionThresholds::for_sections(cuts.clone(), sections)?,
            None => args.threshold_preset.table(sections)?,
        };

        let model_path = args.model.clone().unwrap_or_else(default_model_path);
        let hdri_path = if args.no_environment { None } else { args.hdri.clone() };

        Ok(Self {
            content,
            thresholds,
            assets: AssetRequest {
                model_path,
                hdri_path,
            },
            axis: args.axis,
            show_entrance: !args.skip_entrance,
            window_size: [args.width, args.height],
            relay: relay_from_args(args),
        })
    }
}

fn default_model_path() -> PathBuf {
    let relative = PathBuf::from(DEFAULT_MODEL);
    if relative.exists() {
        return relative;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_MODEL)
}

fn relay_from_args(args: &Args) -> Option<EmailJsRelay> {
    let present = |value: &Option<String>| value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
    match (
        present(&args.emailjs_service),
        present(&args.emailjs_template),
        present(&args.emailjs_user),
    ) {
        (Some(service), Some(template), Some(user)) => Some(EmailJsRelay::new(
            args.emailjs_endpoint.clone(),
            service,
            template,
            user,
        )),
        _ => {
            log::warn!("EmailJS credentials missing; the contact form will not send");
            None
        }
    }
}
