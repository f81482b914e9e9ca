//! SpiralBand Settings Crate
//!
//! Handles job configuration files, presets, and their conversion into the
//! parameter types consumed by the designer.

pub mod config;
pub mod error;
pub mod presets;

pub use config::{
    BandEntry, Config, GeometrySettings, GridSettings, KinematicsSettings, PrinterSettings,
    TextSettings, MAX_BANDS, MAX_CIRCUMFERENCE, MAX_GRID_SIDE, MAX_TEXT_LENGTH, MIN_CIRCUMFERENCE,
};
pub use error::{Result, SettingsError};
pub use presets::{QualityPreset, SizePreset};
