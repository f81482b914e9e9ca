//! # SpiralBand
//!
//! Toolpath generator for wristbands printed as a single continuous spiral
//! meander wall, with front and back text embossed into the wiggle.
//!
//! ## Architecture
//!
//! SpiralBand is organized as a workspace with multiple crates:
//!
//! 1. **spiralband-core** - Shared data model, instruction stream, errors
//! 2. **spiralband-designer** - Glyph masks, spiral sampling, shaping, grid assembly, G-code
//! 3. **spiralband-settings** - Job configuration files, presets, validation
//! 4. **spiralband** - Command-line binary that integrates all crates

pub use spiralband_designer as designer;
pub use spiralband_settings as settings;

pub use spiralband_core::{
    BandParameters, BandSlotConfig, ConfigError, Error, GridLayout, Instruction, JobMetadata,
    Point3, ProgressFn, ResourceError, Result, BAND_VERSION,
};
pub use spiralband_designer::{
    estimate_footprint, generate_gcode, BandAssembler, OutlineSource, StaticOutlineSource,
    SystemFontSource,
};
pub use spiralband_settings::{Config, QualityPreset, SettingsError, SizePreset};

use anyhow::Context;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Assemble the instruction stream for `config` using `outlines` for text.
///
/// `progress` receives `(completed, total)` after every band.
pub fn assemble_job(
    config: &Config,
    outlines: &dyn OutlineSource,
    progress: ProgressFn<'_>,
) -> anyhow::Result<Vec<Instruction>> {
    config.validate().context("Invalid job configuration")?;

    let assembler = BandAssembler::new(outlines, config.band_parameters())
        .with_build_volume(config.build_area());
    let program = assembler
        .assemble(&config.grid_layout(), &config.slots(), progress)
        .context("Band generation failed")?;
    Ok(program)
}

/// Assemble `config` and render it as G-code.
pub fn generate_job_gcode(
    config: &Config,
    outlines: &dyn OutlineSource,
    progress: ProgressFn<'_>,
) -> anyhow::Result<String> {
    let program = assemble_job(config, outlines, progress)?;
    Ok(generate_gcode(&program, &config.metadata()))
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr so G-code can be piped from stdout
/// - RUST_LOG environment variable support (default `info`)
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
