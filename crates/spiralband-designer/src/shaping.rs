//! Extrusion-width easing and kinematic state for one band.

use spiralband_core::{ConfigError, Instruction, Point3, Result, ShapingParameters};
use std::f64::consts::PI;

/// Retract volume (mm³) applied before travelling to and after leaving a band.
pub const DEPRIME_VOLUME: f64 = -1.5;
/// Speed of the stationary de-prime.
pub const DEPRIME_SPEED: f64 = 250.0;

/// Raised-cosine eased width. `t` is 0 at the band edge and 1 at the inner
/// boundary of the ease zone.
pub fn ease_width(nominal: f64, strength: f64, t: f64) -> f64 {
    let ease = 0.5 * (1.0 - (PI * t).cos());
    nominal * (1.0 - strength + strength * ease)
}

fn round_width(width: f64) -> f64 {
    (width * 1e4).round() / 1e4
}

pub struct StepBuilder {
    params: ShapingParameters,
}

impl StepBuilder {
    pub fn new(params: ShapingParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ShapingParameters {
        &self.params
    }

    /// Shaped width at height `rel_z` above the lift, for a path whose
    /// usable height (top above the lift) is `usable`.
    pub fn width_at(&self, rel_z: f64, usable: f64) -> f64 {
        let p = &self.params;
        if p.ease_in_height > 0.0 && rel_z < p.ease_in_height {
            ease_width(p.nominal_width, p.ease_strength, rel_z / p.ease_in_height)
        } else if p.ease_out_height > 0.0 && rel_z > usable - p.ease_out_height {
            ease_width(
                p.nominal_width,
                p.ease_strength,
                (usable - rel_z) / p.ease_out_height,
            )
        } else {
            p.nominal_width
        }
    }

    /// Instruction list printing `points` in order.
    ///
    /// Starts with a de-prime, a travel to the first point at the lift height
    /// and the reduced startup fan/speed; switches to nominal fan/speed once
    /// the startup height is reached and emits a width change only when the
    /// rounded width differs from the active one.
    pub fn build(&self, points: &[Point3]) -> Result<Vec<Instruction>> {
        self.params.validate()?;
        let first = points.first().ok_or(ConfigError::EmptyPath)?;
        if let Some(bad) = points.iter().find(|pt| !pt.is_finite()) {
            return Err(ConfigError::invalid("points", format!("non-finite position {bad}")).into());
        }
        let p = &self.params;

        let reduced_speed = p.nominal_speed * p.reduced_speed_factor;
        let mut steps = Vec::with_capacity(points.len() + 16);
        steps.push(Instruction::StationaryExtrusion {
            volume: DEPRIME_VOLUME,
            speed: DEPRIME_SPEED,
        });
        steps.push(Instruction::extruder(false));
        steps.push(Instruction::move_to(Point3::new(first.x, first.y, p.initial_lift)));
        steps.push(Instruction::extruder(true));
        steps.push(Instruction::Fan {
            percent: p.reduced_fan_percent,
        });
        steps.push(Instruction::Speed {
            mm_per_min: reduced_speed,
        });

        let max_z = points.iter().map(|pt| pt.z).fold(f64::NEG_INFINITY, f64::max);
        let usable = (max_z - p.initial_lift).max(0.0);

        let mut nominal_regime = false;
        let mut current_width: Option<f64> = None;
        for pt in points {
            let z = pt.z.max(p.initial_lift);
            let rel_z = (z - p.initial_lift).clamp(0.0, usable);

            if !nominal_regime && rel_z >= p.startup_height {
                nominal_regime = true;
                if p.nominal_fan_percent != p.reduced_fan_percent {
                    steps.push(Instruction::Fan {
                        percent: p.nominal_fan_percent,
                    });
                }
                if p.nominal_speed != reduced_speed {
                    steps.push(Instruction::Speed {
                        mm_per_min: p.nominal_speed,
                    });
                }
            }

            let width = round_width(self.width_at(rel_z, usable)).min(p.nominal_width);
            if current_width != Some(width) {
                steps.push(Instruction::ExtrusionGeometry {
                    width,
                    height: p.layer_height,
                });
                current_width = Some(width);
            }

            steps.push(Instruction::move_to(Point3::new(pt.x, pt.y, z)));
        }

        steps.push(Instruction::extruder(false));
        steps.push(Instruction::StationaryExtrusion {
            volume: DEPRIME_VOLUME,
            speed: DEPRIME_SPEED,
        });
        Ok(steps)
    }
}
