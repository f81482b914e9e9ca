//! Multi-band grid assembly.
//!
//! Bands are generated one slot at a time in row-major order and stitched into
//! a single instruction stream. After each band the assembler restores the
//! nominal speed and fan, lifts to the safe height above the band centre and,
//! unless it was the last configured band, travels at safe height to the next
//! band's start point.

use crate::emboss::EmbossClassifier;
use crate::font_manager::OutlineSource;
use crate::glyphs::GlyphPolygonBuilder;
use crate::shaping::StepBuilder;
use crate::spiral::SpiralSampler;
use spiralband_core::{
    BandParameters, BandSlotConfig, ConfigError, GridLayout, Instruction, Point3, ProgressFn,
    Result,
};
use tracing::{debug, info, warn};

/// Extra radius per mm of wiggle amplitude used by the footprint estimate.
const WIGGLE_FOOTPRINT_FACTOR: f64 = 0.02;

/// A configured slot with its resolved grid position.
struct PlacedBand<'s> {
    slot: usize,
    center: [f64; 2],
    config: &'s BandSlotConfig,
}

pub struct BandAssembler<'a> {
    outlines: &'a dyn OutlineSource,
    params: BandParameters,
    build_volume: Option<[f64; 2]>,
}

impl<'a> BandAssembler<'a> {
    pub fn new(outlines: &'a dyn OutlineSource, params: BandParameters) -> Self {
        Self {
            outlines,
            params,
            build_volume: None,
        }
    }

    /// Bed size (x, y) checked against the footprint estimate before assembly.
    pub fn with_build_volume(mut self, build_volume: [f64; 2]) -> Self {
        self.build_volume = Some(build_volume);
        self
    }

    pub fn params(&self) -> &BandParameters {
        &self.params
    }

    /// Final (embossed) spiral points of one band centred on `center`.
    pub fn band_points(&self, config: &BandSlotConfig, center: [f64; 2]) -> Result<Vec<Point3>> {
        config.validate()?;

        let spiral = SpiralSampler::sample(&self.params.spiral(config.base_radius(), center))?;

        let glyphs = GlyphPolygonBuilder::new(self.outlines);
        let front = glyphs.build(&config.front_text, &self.params.text, false)?;
        let back = glyphs.build(&config.back_text, &self.params.text, true)?;

        Ok(EmbossClassifier::new(Some(&front), Some(&back)).apply(&spiral))
    }

    /// Instruction list of one band, without the inter-band travel.
    pub fn generate_band(&self, config: &BandSlotConfig, center: [f64; 2]) -> Result<Vec<Instruction>> {
        let points = self.band_points(config, center)?;
        StepBuilder::new(self.params.shaping()).build(&points)
    }

    /// Full program for `layout`. `slots` holds one entry per grid cell in
    /// row-major order; `None` skips the cell. `progress` receives
    /// `(completed, total)` after each band.
    pub fn assemble(
        &self,
        layout: &GridLayout,
        slots: &[Option<BandSlotConfig>],
        progress: ProgressFn<'_>,
    ) -> Result<Vec<Instruction>> {
        self.params.validate()?;
        layout.validate()?;
        if slots.len() != layout.slot_count() {
            return Err(ConfigError::SlotCountMismatch {
                expected: layout.slot_count(),
                actual: slots.len(),
            }
            .into());
        }

        let placed: Vec<PlacedBand<'_>> = layout
            .cells()
            .filter_map(|(slot, column, row)| {
                slots[slot].as_ref().map(|config| PlacedBand {
                    slot,
                    center: layout.cell_center(column, row),
                    config,
                })
            })
            .collect();
        if placed.is_empty() {
            return Err(ConfigError::MissingParameter {
                param: "bands".to_string(),
            }
            .into());
        }

        if let Some([vol_x, vol_y]) = self.build_volume {
            let [fx, fy] = estimate_footprint(layout, slots, self.params.wiggle_amplitude);
            if fx > vol_x || fy > vol_y {
                warn!(
                    footprint_x = fx,
                    footprint_y = fy,
                    volume_x = vol_x,
                    volume_y = vol_y,
                    "Grid footprint may exceed the printer build area"
                );
            }
        }

        let total = placed.len();
        let safe_z = self.params.safe_z;
        let mut program = Vec::new();

        for (n, band) in placed.iter().enumerate() {
            debug!(slot = band.slot, center = ?band.center, "generating band");
            let steps = self
                .generate_band(band.config, band.center)
                .map_err(|e| e.in_slot(band.slot))?;
            program.extend(steps);

            program.push(Instruction::Speed {
                mm_per_min: self.params.print_speed,
            });
            program.push(Instruction::Fan {
                percent: self.params.fan_percent,
            });
            program.push(Instruction::extruder(false));
            program.push(Instruction::move_to(Point3::new(
                band.center[0],
                band.center[1],
                safe_z,
            )));

            if let Some(next) = placed.get(n + 1) {
                program.push(Instruction::move_to(Point3::new(
                    next.center[0] + next.config.base_radius(),
                    next.center[1],
                    safe_z,
                )));
            }

            progress(n + 1, total);
        }

        info!(
            bands = total,
            instructions = program.len(),
            "assembled band grid"
        );
        Ok(program)
    }
}

/// Rough (x, y) extent of the printed grid measured from the bed origin,
/// sized by the widest configured band.
pub fn estimate_footprint(
    layout: &GridLayout,
    slots: &[Option<BandSlotConfig>],
    wiggle_amplitude: f64,
) -> [f64; 2] {
    let configured: Vec<&BandSlotConfig> = slots.iter().flatten().collect();
    let max_radius = configured
        .iter()
        .map(|c| c.base_radius())
        .fold(0.0, f64::max);
    let diameter = 2.0 * (max_radius + wiggle_amplitude * WIGGLE_FOOTPRINT_FACTOR);

    if configured.len() <= 1 {
        return [diameter, diameter];
    }
    [
        layout.first_center[0] + (layout.columns.saturating_sub(1)) as f64 * layout.spacing[0] + diameter / 2.0,
        layout.first_center[1] + (layout.rows.saturating_sub(1)) as f64 * layout.spacing[1] + diameter / 2.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_footprint_single_band_is_diameter() {
        let layout = GridLayout::single([127.5, 127.5]);
        let slots = vec![Some(BandSlotConfig::new("A", "", 2.0 * PI * 25.0))];
        let [x, y] = estimate_footprint(&layout, &slots, 50.0);
        assert!((x - 52.0).abs() < 1e-9);
        assert_eq!(x, y);
    }

    #[test]
    fn test_footprint_grid_uses_widest_band() {
        let layout = GridLayout::new(3, 2, [90.0, 86.0], [40.0, 48.0]);
        let mut slots = vec![None; 6];
        slots[0] = Some(BandSlotConfig::new("A", "", 2.0 * PI * 20.0));
        slots[4] = Some(BandSlotConfig::new("B", "", 2.0 * PI * 30.0));
        let [x, y] = estimate_footprint(&layout, &slots, 50.0);
        // diameter = 2 * (30 + 1) = 62
        assert!((x - (40.0 + 180.0 + 31.0)).abs() < 1e-9);
        assert!((y - (48.0 + 86.0 + 31.0)).abs() < 1e-9);
    }

    #[test]
    fn test_footprint_no_bands() {
        let layout = GridLayout::single([0.0, 0.0]);
        assert_eq!(estimate_footprint(&layout, &[None], 0.0), [0.0, 0.0]);
    }
}
