//! Parameter sets for the generation pipeline.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

fn require_positive(param: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            param,
            format!("must be a positive finite number, got {value}"),
        ))
    }
}

fn require_non_negative(param: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            param,
            format!("must be zero or positive, got {value}"),
        ))
    }
}

fn require_finite(param: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(param, "must be finite"))
    }
}

/// Inputs for one band slot of the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSlotConfig {
    /// Text embossed on the +X side; empty for none
    pub front_text: String,
    /// Text embossed (mirrored) on the -X side; empty for none
    pub back_text: String,
    /// Inner circumference in mm
    pub circumference: f64,
}

impl BandSlotConfig {
    pub fn new(front_text: impl Into<String>, back_text: impl Into<String>, circumference: f64) -> Self {
        Self {
            front_text: front_text.into(),
            back_text: back_text.into(),
            circumference,
        }
    }

    /// Base radius of the band, `circumference / 2π`
    pub fn base_radius(&self) -> f64 {
        self.circumference / (2.0 * PI)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("circumference", self.circumference)
    }
}

/// Arrangement of band slots on the build plate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub columns: usize,
    pub rows: usize,
    /// Distance between neighbouring cell centres along X and Y
    pub spacing: [f64; 2],
    /// Centre of the cell at column 0, row 0
    pub first_center: [f64; 2],
}

impl GridLayout {
    pub fn new(columns: usize, rows: usize, spacing: [f64; 2], first_center: [f64; 2]) -> Self {
        Self {
            columns,
            rows,
            spacing,
            first_center,
        }
    }

    /// A 1×1 layout centred on `center`
    pub fn single(center: [f64; 2]) -> Self {
        Self::new(1, 1, [0.0, 0.0], center)
    }

    pub fn slot_count(&self) -> usize {
        self.columns * self.rows
    }

    /// Centre of the cell at (`column`, `row`)
    pub fn cell_center(&self, column: usize, row: usize) -> [f64; 2] {
        [
            self.first_center[0] + column as f64 * self.spacing[0],
            self.first_center[1] + row as f64 * self.spacing[1],
        ]
    }

    /// Cells in row-major order as `(slot_index, column, row)`
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns).map(move |column| (row * self.columns + column, column, row))
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::invalid(
                "grid",
                format!("needs at least one column and row, got {}x{}", self.columns, self.rows),
            ));
        }
        require_finite("grid.spacing", self.spacing[0])?;
        require_finite("grid.spacing", self.spacing[1])?;
        require_finite("grid.first_center", self.first_center[0])?;
        require_finite("grid.first_center", self.first_center[1])
    }
}

/// Font and placement of embossed text in the band's local (Y, Z) plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: String,
    /// Em height in mm
    pub size: f64,
    pub bold: bool,
    /// Centre of the text block as (y, z)
    pub anchor: [f64; 2],
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "DejaVu Sans".to_string(),
            size: 10.0,
            bold: true,
            anchor: [0.0, 9.0],
        }
    }
}

/// Inputs of the spiral sampler for one band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiralParameters {
    pub total_height: f64,
    pub base_radius: f64,
    pub wiggle_amplitude: f64,
    pub wiggle_frequency: f64,
    /// Vertical advance per wrap
    pub layer_thickness: f64,
    pub center: [f64; 2],
    /// Bound of the phase modulation `phase_limit * sin(wiggle_frequency * t)`
    pub phase_limit: f64,
    pub num_points: usize,
    /// Downward seam shift in wraps
    pub turn_phase_shift: f64,
    /// Lowest permitted Z
    pub initial_lift: f64,
}

impl SpiralParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("total_height", self.total_height)?;
        require_positive("base_radius", self.base_radius)?;
        require_positive("layer_thickness", self.layer_thickness)?;
        require_finite("wiggle_amplitude", self.wiggle_amplitude)?;
        require_finite("wiggle_frequency", self.wiggle_frequency)?;
        require_finite("phase_limit", self.phase_limit)?;
        require_non_negative("turn_phase_shift", self.turn_phase_shift)?;
        require_non_negative("initial_lift", self.initial_lift)?;
        require_finite("center", self.center[0])?;
        require_finite("center", self.center[1])?;
        if self.num_points == 0 {
            return Err(ConfigError::invalid("num_points", "must be at least 1"));
        }
        Ok(())
    }
}

/// Inputs of the shaping/step builder for one band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapingParameters {
    pub nominal_width: f64,
    pub layer_height: f64,
    pub initial_lift: f64,
    pub reduced_fan_percent: u8,
    pub reduced_speed_factor: f64,
    /// mm/min
    pub nominal_speed: f64,
    pub nominal_fan_percent: u8,
    pub ease_in_height: f64,
    pub ease_out_height: f64,
    /// 0 disables easing, 1 ramps the width all the way to zero at the edges
    pub ease_strength: f64,
    /// Height above the lift where the startup regime ends
    pub startup_height: f64,
}

impl ShapingParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("extrusion_width", self.nominal_width)?;
        require_positive("extrusion_height", self.layer_height)?;
        require_positive("print_speed", self.nominal_speed)?;
        require_positive("reduced_print_speed_factor", self.reduced_speed_factor)?;
        require_non_negative("initial_lift", self.initial_lift)?;
        require_non_negative("ease_in_height", self.ease_in_height)?;
        require_non_negative("ease_out_height", self.ease_out_height)?;
        require_non_negative("startup_height", self.startup_height)?;
        if !(0.0..=1.0).contains(&self.ease_strength) {
            return Err(ConfigError::invalid(
                "ease_strength",
                format!("must be within 0..=1, got {}", self.ease_strength),
            ));
        }
        for (param, value) in [
            ("fan_percent", self.nominal_fan_percent),
            ("reduced_fan_percent", self.reduced_fan_percent),
        ] {
            if value > 100 {
                return Err(ConfigError::invalid(param, format!("{value} exceeds 100%")));
            }
        }
        Ok(())
    }
}

/// Parameters shared by every band of a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandParameters {
    pub total_height: f64,
    pub wiggle_amplitude: f64,
    pub wiggle_frequency: f64,
    pub layer_thickness: f64,
    pub phase_limit: f64,
    pub num_points: usize,
    pub turn_phase_shift: f64,
    pub initial_lift: f64,
    pub extrusion_width: f64,
    pub extrusion_height: f64,
    pub ease_in_height: f64,
    pub ease_out_height: f64,
    pub ease_strength: f64,
    pub startup_height: f64,
    pub print_speed: f64,
    pub fan_percent: u8,
    pub reduced_speed_factor: f64,
    pub reduced_fan_percent: u8,
    /// Z used for travel moves between bands
    pub safe_z: f64,
    pub text: TextStyle,
}

impl Default for BandParameters {
    fn default() -> Self {
        let extrusion_height = 0.2;
        let total_height = 18.0;
        Self {
            total_height,
            wiggle_amplitude: 50.0,
            wiggle_frequency: 80.0,
            layer_thickness: extrusion_height,
            phase_limit: PI * 0.59,
            num_points: 100_000,
            turn_phase_shift: 1.0,
            initial_lift: extrusion_height * 0.7,
            extrusion_width: 0.5,
            extrusion_height,
            ease_in_height: 4.0 * extrusion_height,
            ease_out_height: 4.0 * extrusion_height,
            ease_strength: 0.95,
            startup_height: 1.0,
            print_speed: 1100.0,
            fan_percent: 30,
            reduced_speed_factor: 0.5,
            reduced_fan_percent: 10,
            safe_z: total_height + 10.0,
            text: TextStyle {
                anchor: [0.0, 0.5 * total_height],
                ..TextStyle::default()
            },
        }
    }
}

impl BandParameters {
    /// Sampler inputs for a band of `base_radius` centred on `center`
    pub fn spiral(&self, base_radius: f64, center: [f64; 2]) -> SpiralParameters {
        SpiralParameters {
            total_height: self.total_height,
            base_radius,
            wiggle_amplitude: self.wiggle_amplitude,
            wiggle_frequency: self.wiggle_frequency,
            layer_thickness: self.layer_thickness,
            center,
            phase_limit: self.phase_limit,
            num_points: self.num_points,
            turn_phase_shift: self.turn_phase_shift,
            initial_lift: self.initial_lift,
        }
    }

    pub fn shaping(&self) -> ShapingParameters {
        ShapingParameters {
            nominal_width: self.extrusion_width,
            layer_height: self.extrusion_height,
            initial_lift: self.initial_lift,
            reduced_fan_percent: self.reduced_fan_percent,
            reduced_speed_factor: self.reduced_speed_factor,
            nominal_speed: self.print_speed,
            nominal_fan_percent: self.fan_percent,
            ease_in_height: self.ease_in_height,
            ease_out_height: self.ease_out_height,
            ease_strength: self.ease_strength,
            startup_height: self.startup_height,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_finite("safe_z", self.safe_z)?;
        require_positive("text.size", self.text.size)?;
        if self.safe_z <= self.total_height {
            return Err(ConfigError::invalid(
                "safe_z",
                format!("{} must clear the band height {}", self.safe_z, self.total_height),
            ));
        }
        self.spiral(1.0, [0.0, 0.0]).validate()?;
        self.shaping().validate()
    }
}

/// Pass-through values for the external instruction emitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub printer_name: String,
    pub nozzle_temp: u16,
    pub bed_temp: u16,
    pub print_speed: f64,
    pub fan_percent: u8,
    pub extrusion_width: f64,
    pub extrusion_height: f64,
}

impl Default for JobMetadata {
    fn default() -> Self {
        Self {
            printer_name: "prusa_mk4".to_string(),
            nozzle_temp: 220,
            bed_temp: 60,
            print_speed: 1100.0,
            fan_percent: 30,
            extrusion_width: 0.5,
            extrusion_height: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_cells_row_major() {
        let grid = GridLayout::new(3, 2, [90.0, 86.0], [40.0, 48.0]);
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(
            cells,
            vec![(0, 0, 0), (1, 1, 0), (2, 2, 0), (3, 0, 1), (4, 1, 1), (5, 2, 1)]
        );
        assert_eq!(grid.cell_center(2, 1), [220.0, 134.0]);
        assert_eq!(grid.slot_count(), 6);
    }

    #[test]
    fn test_grid_validation() {
        assert!(GridLayout::single([127.5, 127.5]).validate().is_ok());
        assert!(GridLayout::new(0, 2, [90.0, 86.0], [0.0, 0.0]).validate().is_err());
    }

    #[test]
    fn test_default_band_parameters_derivations() {
        let p = BandParameters::default();
        assert!((p.initial_lift - 0.14).abs() < 1e-12);
        assert_eq!(p.safe_z, 28.0);
        assert_eq!(p.text.anchor, [0.0, 9.0]);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_base_radius() {
        let slot = BandSlotConfig::new("A", "1", 2.0 * PI * 25.0);
        assert!((slot.base_radius() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_slot_rejects_non_positive_circumference() {
        let err = BandSlotConfig::new("A", "", 0.0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { ref param, .. } if param == "circumference"));
    }

    #[test]
    fn test_shaping_rejects_out_of_range_strength() {
        let mut p = BandParameters::default();
        p.ease_strength = 1.5;
        assert!(p.shaping().validate().is_err());

        let mut p = BandParameters::default();
        p.fan_percent = 120;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_spiral_rejects_zero_points() {
        let mut s = BandParameters::default().spiral(26.0, [0.0, 0.0]);
        s.num_points = 0;
        assert!(s.validate().is_err());
    }
}
