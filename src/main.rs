//! Scrollfolio: a portfolio viewer whose scroll position drives a sun-lit,
//! rotating 3D model.

mod app;
mod assets;
mod config;
mod content;
mod render;
mod scene;
mod scroll;
mod ui;

use anyhow::Context;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = config::Args::parse();
    let config = config::ViewerConfig::from_args(&args).context("resolving configuration")?;
    log::info!(
        "Starting portfolio for {} ({} panels, model {})",
        config.content.personal.name,
        config.thresholds.section_count(),
        config.assets.model_path.display()
    );
    log::debug!("Section cuts {:?}", config.thresholds.cuts());

    app::run(config).context("running viewer")?;
    log::info!("Goodbye");
    Ok(())
}
