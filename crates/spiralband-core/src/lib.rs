//! # SpiralBand Core
//!
//! Core types, errors, and the instruction model shared by the SpiralBand crates.
//!
//! Every generation run is a pure function of the parameters defined here:
//! the designer crate turns [`BandParameters`], a [`GridLayout`] and a list of
//! [`BandSlotConfig`] slots into an ordered [`Instruction`] stream, which an
//! external emitter turns into machine text using [`JobMetadata`].

pub mod data;
pub mod error;
pub mod types;

pub use data::{
    BandParameters, BandSlotConfig, GridLayout, Instruction, JobMetadata, Point3,
    ShapingParameters, SpiralParameters, TextStyle,
};

pub use error::{ConfigError, Error, ResourceError, Result};

pub use types::ProgressFn;

/// Generator revision embedded in every emitted program so prints can be
/// traced back to the geometry code that produced them.
pub const BAND_VERSION: &str = "1.0.0";
