//! Job configuration
//!
//! A [`Config`] describes one generation run: printer pass-through values,
//! kinematics, band geometry, text style, grid layout and the per-slot band
//! entries. Every section is optional in the file and falls back to its
//! defaults.

use crate::error::{Result, SettingsError};
use serde::{Deserialize, Serialize};
use spiralband_core::{BandParameters, BandSlotConfig, GridLayout, JobMetadata, TextStyle};
use std::f64::consts::PI;
use std::path::Path;
use tracing::debug;

pub const MIN_CIRCUMFERENCE: f64 = 120.0;
pub const MAX_CIRCUMFERENCE: f64 = 250.0;
pub const MAX_TEXT_LENGTH: usize = 20;
pub const MAX_BANDS: usize = 9;
/// Maximum number of columns or rows
pub const MAX_GRID_SIDE: usize = 5;

/// Centre used for a lone band, middle of a typical 255 mm bed
const SINGLE_BAND_CENTER: [f64; 2] = [127.5, 127.5];
const GRID_FIRST_CENTER: [f64; 2] = [40.0, 48.0];

/// Printer identity and temperatures, passed through to the emitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterSettings {
    /// Printer profile name
    pub name: String,
    /// Nozzle temperature in °C
    pub nozzle_temp: u16,
    /// Bed temperature in °C
    pub bed_temp: u16,
    /// Build volume (x, y, z) in mm
    pub build_volume: [f64; 3],
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            name: "prusa_mk4".to_string(),
            nozzle_temp: 220,
            bed_temp: 60,
            build_volume: [250.0, 250.0, 250.0],
        }
    }
}

/// Speed and cooling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsSettings {
    /// Print speed in mm/min
    pub print_speed: f64,
    pub fan_percent: u8,
    /// Speed multiplier during the startup regime
    pub reduced_print_speed_factor: f64,
    /// Fan duty during the startup regime
    pub reduced_fan_percent: u8,
}

impl Default for KinematicsSettings {
    fn default() -> Self {
        Self {
            print_speed: 1100.0,
            fan_percent: 30,
            reduced_print_speed_factor: 0.5,
            reduced_fan_percent: 10,
        }
    }
}

/// Band geometry shared by every slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometrySettings {
    pub extrusion_width: f64,
    /// Also the vertical advance per wrap
    pub extrusion_height: f64,
    /// First-layer lift as a fraction of the extrusion height
    pub initial_z_factor: f64,
    pub total_height: f64,
    pub wiggle_amplitude: f64,
    /// Wiggle cycles per wrap
    pub wiggle_frequency: f64,
    /// Phase modulation bound in radians
    pub phase_limit: f64,
    /// Seam shift in wraps
    pub start_shift_turns: f64,
    /// Samples per band
    pub num_points: usize,
    pub ease_in_height: f64,
    pub ease_out_height: f64,
    pub ease_strength: f64,
    pub startup_height: f64,
    /// Travel height above the band top
    pub safe_z_clearance: f64,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            extrusion_width: 0.5,
            extrusion_height: 0.2,
            initial_z_factor: 0.7,
            total_height: 18.0,
            wiggle_amplitude: 50.0,
            wiggle_frequency: 80.0,
            phase_limit: PI * 0.59,
            start_shift_turns: 1.0,
            num_points: 100_000,
            ease_in_height: 0.8,
            ease_out_height: 0.8,
            ease_strength: 0.95,
            startup_height: 1.0,
            safe_z_clearance: 10.0,
        }
    }
}

/// Emboss text style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    pub font_family: String,
    pub size: f64,
    pub bold: bool,
    /// Text block centre (y, z); defaults to half the band height
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<[f64; 2]>,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            font_family: "DejaVu Sans".to_string(),
            size: 10.0,
            bold: true,
            anchor: None,
        }
    }
}

/// Band grid on the build plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub columns: usize,
    pub rows: usize,
    /// Cell spacing (x, y) in mm
    pub spacing: [f64; 2],
    /// Centre of the first cell; defaults depend on the grid size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_center: Option<[f64; 2]>,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            columns: 1,
            rows: 1,
            spacing: [90.0, 86.0],
            first_center: None,
        }
    }
}

/// One band slot. An entry with blank front text is an empty slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandEntry {
    pub front_text: String,
    pub back_text: String,
    /// Inner circumference in mm
    pub circumference: f64,
}

impl Default for BandEntry {
    fn default() -> Self {
        Self {
            front_text: "TEST".to_string(),
            back_text: "123".to_string(),
            circumference: 165.0,
        }
    }
}

impl BandEntry {
    pub fn new(front_text: impl Into<String>, back_text: impl Into<String>, circumference: f64) -> Self {
        Self {
            front_text: front_text.into(),
            back_text: back_text.into(),
            circumference,
        }
    }

    /// An entry with no front text
    pub fn empty() -> Self {
        Self::new("", "", 165.0)
    }

    pub fn is_empty(&self) -> bool {
        self.front_text.trim().is_empty()
    }

    fn to_slot(&self) -> Option<BandSlotConfig> {
        (!self.is_empty()).then(|| {
            BandSlotConfig::new(
                self.front_text.trim(),
                self.back_text.trim(),
                self.circumference,
            )
        })
    }
}

/// Complete job configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub printer: PrinterSettings,
    #[serde(default)]
    pub kinematics: KinematicsSettings,
    #[serde(default)]
    pub geometry: GeometrySettings,
    #[serde(default)]
    pub text: TextSettings,
    #[serde(default)]
    pub grid: GridSettings,
    /// Band used when `bands` is empty
    #[serde(default)]
    pub defaults: BandEntry,
    /// One entry per grid cell in row-major order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<BandEntry>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(SettingsError::UnsupportedFormat(path.display().to_string()));
        };

        config.validate()?;
        debug!(path = %path.display(), bands = config.configured_count(), "loaded config");
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            self.to_toml()?
        } else {
            return Err(SettingsError::UnsupportedFormat(path.display().to_string()));
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let g = &self.geometry;
        for (key, value) in [
            ("geometry.extrusion_width", g.extrusion_width),
            ("geometry.extrusion_height", g.extrusion_height),
            ("geometry.total_height", g.total_height),
            ("geometry.safe_z_clearance", g.safe_z_clearance),
            ("text.size", self.text.size),
            ("kinematics.print_speed", self.kinematics.print_speed),
            (
                "kinematics.reduced_print_speed_factor",
                self.kinematics.reduced_print_speed_factor,
            ),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::invalid(key, format!("must be > 0, got {value}")));
            }
        }

        if g.num_points == 0 {
            return Err(SettingsError::invalid("geometry.num_points", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&g.ease_strength) {
            return Err(SettingsError::invalid(
                "geometry.ease_strength",
                format!("must be within 0..=1, got {}", g.ease_strength),
            ));
        }
        for (key, value) in [
            ("kinematics.fan_percent", self.kinematics.fan_percent),
            ("kinematics.reduced_fan_percent", self.kinematics.reduced_fan_percent),
        ] {
            if value > 100 {
                return Err(SettingsError::invalid(key, format!("{value} exceeds 100%")));
            }
        }

        let grid = &self.grid;
        for (key, side) in [("grid.columns", grid.columns), ("grid.rows", grid.rows)] {
            if !(1..=MAX_GRID_SIDE).contains(&side) {
                return Err(SettingsError::invalid(
                    key,
                    format!("must be within 1..={MAX_GRID_SIDE}, got {side}"),
                ));
            }
        }
        let cells = grid.columns * grid.rows;
        if !self.bands.is_empty() && self.bands.len() != cells {
            return Err(SettingsError::invalid(
                "bands",
                format!("expected {cells} entries for a {}x{} grid, got {}", grid.columns, grid.rows, self.bands.len()),
            ));
        }

        let entries: Vec<&BandEntry> = if self.bands.is_empty() {
            vec![&self.defaults]
        } else {
            self.bands.iter().collect()
        };
        let configured: Vec<&BandEntry> = entries.into_iter().filter(|b| !b.is_empty()).collect();
        if configured.is_empty() {
            return Err(SettingsError::invalid("bands", "no band has front text"));
        }
        if configured.len() > MAX_BANDS {
            return Err(SettingsError::invalid(
                "bands",
                format!("at most {MAX_BANDS} bands per plate, got {}", configured.len()),
            ));
        }
        for band in configured {
            validate_band(band)?;
        }

        self.band_parameters().validate()?;
        Ok(())
    }

    /// First-layer lift height
    pub fn initial_lift(&self) -> f64 {
        self.geometry.extrusion_height * self.geometry.initial_z_factor
    }

    /// Travel height between bands
    pub fn safe_z(&self) -> f64 {
        self.geometry.total_height + self.geometry.safe_z_clearance
    }

    pub fn text_anchor(&self) -> [f64; 2] {
        self.text
            .anchor
            .unwrap_or([0.0, 0.5 * self.geometry.total_height])
    }

    pub fn first_center(&self) -> [f64; 2] {
        self.grid.first_center.unwrap_or(
            if self.grid.columns * self.grid.rows == 1 {
                SINGLE_BAND_CENTER
            } else {
                GRID_FIRST_CENTER
            },
        )
    }

    pub fn grid_layout(&self) -> GridLayout {
        GridLayout::new(
            self.grid.columns,
            self.grid.rows,
            self.grid.spacing,
            self.first_center(),
        )
    }

    /// One entry per grid cell; `None` for empty cells. Without explicit
    /// bands the default band occupies the first cell.
    pub fn slots(&self) -> Vec<Option<BandSlotConfig>> {
        let cells = self.grid.columns * self.grid.rows;
        if self.bands.is_empty() {
            let mut slots = vec![None; cells.max(1)];
            slots[0] = self.defaults.to_slot();
            return slots;
        }
        self.bands.iter().map(BandEntry::to_slot).collect()
    }

    pub fn configured_count(&self) -> usize {
        self.slots().iter().flatten().count()
    }

    pub fn band_parameters(&self) -> BandParameters {
        let g = &self.geometry;
        let k = &self.kinematics;
        BandParameters {
            total_height: g.total_height,
            wiggle_amplitude: g.wiggle_amplitude,
            wiggle_frequency: g.wiggle_frequency,
            layer_thickness: g.extrusion_height,
            phase_limit: g.phase_limit,
            num_points: g.num_points,
            turn_phase_shift: g.start_shift_turns,
            initial_lift: self.initial_lift(),
            extrusion_width: g.extrusion_width,
            extrusion_height: g.extrusion_height,
            ease_in_height: g.ease_in_height,
            ease_out_height: g.ease_out_height,
            ease_strength: g.ease_strength,
            startup_height: g.startup_height,
            print_speed: k.print_speed,
            fan_percent: k.fan_percent,
            reduced_speed_factor: k.reduced_print_speed_factor,
            reduced_fan_percent: k.reduced_fan_percent,
            safe_z: self.safe_z(),
            text: TextStyle {
                font_family: self.text.font_family.clone(),
                size: self.text.size,
                bold: self.text.bold,
                anchor: self.text_anchor(),
            },
        }
    }

    pub fn metadata(&self) -> JobMetadata {
        JobMetadata {
            printer_name: self.printer.name.clone(),
            nozzle_temp: self.printer.nozzle_temp,
            bed_temp: self.printer.bed_temp,
            print_speed: self.kinematics.print_speed,
            fan_percent: self.kinematics.fan_percent,
            extrusion_width: self.geometry.extrusion_width,
            extrusion_height: self.geometry.extrusion_height,
        }
    }

    /// Bed area (x, y) used for the footprint check
    pub fn build_area(&self) -> [f64; 2] {
        [self.printer.build_volume[0], self.printer.build_volume[1]]
    }
}

fn validate_band(band: &BandEntry) -> Result<()> {
    if !(MIN_CIRCUMFERENCE..=MAX_CIRCUMFERENCE).contains(&band.circumference) {
        return Err(SettingsError::invalid(
            "circumference",
            format!(
                "{} mm is outside {MIN_CIRCUMFERENCE}..={MAX_CIRCUMFERENCE} mm",
                band.circumference
            ),
        ));
    }
    for (key, text) in [("front_text", &band.front_text), ("back_text", &band.back_text)] {
        let len = text.trim().chars().count();
        if len > MAX_TEXT_LENGTH {
            return Err(SettingsError::invalid(
                key,
                format!("{len} characters exceeds the limit of {MAX_TEXT_LENGTH}"),
            ));
        }
    }
    Ok(())
}
