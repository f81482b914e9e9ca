//! # SpiralBand Designer
//!
//! Toolpath generation for wristbands printed as one continuous spiral
//! meander wall with embossed text.
//!
//! ## Pipeline
//!
//! ```text
//! GridLayout + slots
//!   └── BandAssembler (one band per configured slot, row-major)
//!         ├── SpiralSampler       (calibrated wiggling helix)
//!         ├── GlyphPolygonBuilder (front / mirrored back text masks)
//!         │     └── OutlineSource (system fonts or static glyphs)
//!         ├── EmbossClassifier    (amplify deviation inside text)
//!         └── StepBuilder         (width easing, fan/speed regime)
//!   └── Vec<Instruction>
//!         ├── gcode_gen  (Marlin G-code)
//!         └── preview    (extrusion polylines, bounds)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spiralband_designer::{BandAssembler, SystemFontSource};
//! use spiralband_core::{BandParameters, BandSlotConfig, GridLayout};
//!
//! let fonts = SystemFontSource::new();
//! let assembler = BandAssembler::new(&fonts, BandParameters::default());
//! let slots = vec![Some(BandSlotConfig::new("TEST", "123", 165.0))];
//! let program = assembler.assemble(&GridLayout::single([127.5, 127.5]), &slots, &mut |_, _| {})?;
//! ```

pub mod emboss;
pub mod font_manager;
pub mod gcode_gen;
pub mod glyphs;
pub mod grid;
pub mod preview;
pub mod shaping;
pub mod spiral;

pub use emboss::{EmbossClassification, EmbossClassifier, EMBOSS_FACTOR};
pub use font_manager::{Contour, FontSpec, OutlineSource, StaticOutlineSource, SystemFontSource};
pub use gcode_gen::{generate_gcode, write_program, GcodeWriter, InstructionSink};
pub use glyphs::{GlyphPolygonBuilder, GlyphPolygonSet};
pub use grid::{estimate_footprint, BandAssembler};
pub use preview::{extrusion_paths, stream_bounds, StreamBounds};
pub use shaping::{ease_width, StepBuilder};
pub use spiral::{calibration_factor, reference_integral, SpiralPath, SpiralSampler};
