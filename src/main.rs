//! SpiralBand CLI
//!
//! Usage:
//!   spiralband generate --front ANNA --back 7 --size M -o band.gcode
//!   spiralband generate --config job.toml -o plate.gcode
//!   spiralband defaults --format json
//!   spiralband footprint --config job.toml

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use spiralband::{
    estimate_footprint, generate_job_gcode, init_logging, Config, OutlineSource, QualityPreset,
    SizePreset, StaticOutlineSource, SystemFontSource, BUILD_DATE, VERSION,
};
use spiralband::settings::BandEntry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Spiral-meander wristband toolpath generator
#[derive(Parser, Debug)]
#[command(name = "spiralband")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate G-code for one band or a grid of bands
    Generate {
        /// Job configuration file (.toml or .json)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Output G-code file (stdout if omitted)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Front text of the default band
        #[arg(long)]
        front: Option<String>,

        /// Back text of the default band
        #[arg(long)]
        back: Option<String>,

        /// Inner circumference in mm
        #[arg(long, value_name = "MM", conflicts_with = "size")]
        circumference: Option<f64>,

        /// Size preset (XS, S, M, L, XL)
        #[arg(long)]
        size: Option<SizePreset>,

        /// Sampling quality (fast, standard, high)
        #[arg(long)]
        quality: Option<QualityPreset>,

        /// Grid columns; every cell gets the default band
        #[arg(long)]
        columns: Option<usize>,

        /// Grid rows; every cell gets the default band
        #[arg(long)]
        rows: Option<usize>,

        /// Use the built-in block letters instead of system fonts
        #[arg(long)]
        block_font: bool,
    },

    /// Print the default configuration
    Defaults {
        #[arg(long, value_enum, default_value_t = Format::Toml)]
        format: Format,
    },

    /// Estimate the grid footprint against the printer build area
    Footprint {
        /// Job configuration file (.toml or .json)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Toml,
    Json,
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            output,
            front,
            back,
            circumference,
            size,
            quality,
            columns,
            rows,
            block_font,
        } => {
            let mut job = load_config(config.as_deref())?;
            apply_overrides(
                &mut job,
                Overrides {
                    front,
                    back,
                    circumference: circumference.or(size.map(SizePreset::circumference)),
                    quality,
                    columns,
                    rows,
                },
            );
            generate(&job, output.as_deref(), block_font)
        }
        Commands::Defaults { format } => {
            let config = Config::default();
            let text = match format {
                Format::Toml => config.to_toml()?,
                Format::Json => config.to_json()?,
            };
            println!("{text}");
            Ok(())
        }
        Commands::Footprint { config } => {
            let job = load_config(config.as_deref())?;
            let [x, y] = estimate_footprint(
                &job.grid_layout(),
                &job.slots(),
                job.geometry.wiggle_amplitude,
            );
            let [vol_x, vol_y] = job.build_area();
            println!("Grid footprint: ~{x:.0} x {y:.0} mm");
            println!("Build area:     {vol_x:.0} x {vol_y:.0} mm");
            if x > vol_x || y > vol_y {
                println!("Bands may be clipped or fail to print.");
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

struct Overrides {
    front: Option<String>,
    back: Option<String>,
    circumference: Option<f64>,
    quality: Option<QualityPreset>,
    columns: Option<usize>,
    rows: Option<usize>,
}

fn apply_overrides(config: &mut Config, overrides: Overrides) {
    if let Some(front) = overrides.front {
        config.defaults.front_text = front;
    }
    if let Some(back) = overrides.back {
        config.defaults.back_text = back;
    }
    if let Some(circumference) = overrides.circumference {
        config.defaults.circumference = circumference;
        for band in &mut config.bands {
            band.circumference = circumference;
        }
    }
    if let Some(quality) = overrides.quality {
        config.geometry.num_points = quality.num_points();
    }
    if overrides.columns.is_some() || overrides.rows.is_some() {
        config.grid.columns = overrides.columns.unwrap_or(config.grid.columns);
        config.grid.rows = overrides.rows.unwrap_or(config.grid.rows);
        let cells = config.grid.columns * config.grid.rows;
        config.bands = vec![BandEntry::clone(&config.defaults); cells];
    }
}

fn generate(job: &Config, output: Option<&Path>, block_font: bool) -> Result<()> {
    info!(version = VERSION, build_date = BUILD_DATE, "SpiralBand");

    let outlines: Box<dyn OutlineSource> = if block_font {
        Box::new(StaticOutlineSource::block_letters())
    } else {
        Box::new(SystemFontSource::new())
    };

    let progress = ProgressBar::new(job.configured_count() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} bands {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );
    progress.set_message("Generating...");

    let gcode = generate_job_gcode(job, outlines.as_ref(), &mut |done, total| {
        progress.set_length(total as u64);
        progress.set_position(done as u64);
    })?;
    progress.finish_with_message("Done!");

    match output {
        Some(path) => {
            fs::write(path, &gcode)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = gcode.len(), "wrote G-code");
        }
        None => print!("{gcode}"),
    }
    Ok(())
}
