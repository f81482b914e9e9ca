//! Spiral meander sampling.
//!
//! The path parameter `t` runs over `0..=turns·2π` with `turns = height /
//! layer_thickness`. A bounded phase modulation `φ(t) = phase_limit ·
//! sin(wiggle_frequency · t)` drives the angular rate `cos φ` and the radial
//! deviation rate `sin φ`; both are integrated cumulatively (trapezoid rule)
//! in path order. The angle is rescaled by [`calibration_factor`] so that each
//! `2π` of `t` still advances one full wrap.

use spiralband_core::{Point3, Result, SpiralParameters};
use std::f64::consts::TAU;
use tracing::debug;

/// Samples used for the one-cycle reference integral.
pub const CALIBRATION_SAMPLES: usize = 10_000;

/// Reference integrals smaller than this fall back to an identity factor.
const DEGENERATE_INTEGRAL: f64 = 1e-12;

/// `∫₀^{2π} cos(phase_limit · sin(wiggle_frequency · t)) dt`, trapezoid rule
/// over [`CALIBRATION_SAMPLES`] points.
pub fn reference_integral(phase_limit: f64, wiggle_frequency: f64) -> f64 {
    let dt = TAU / (CALIBRATION_SAMPLES - 1) as f64;
    let rate = |i: usize| (phase_limit * (wiggle_frequency * i as f64 * dt).sin()).cos();

    (1..CALIBRATION_SAMPLES)
        .map(|i| 0.5 * (rate(i - 1) + rate(i)) * dt)
        .sum()
}

/// Angular rescale `2π / reference_integral`, or `1.0` when the integral is
/// too close to zero to divide by.
pub fn calibration_factor(phase_limit: f64, wiggle_frequency: f64) -> f64 {
    factor_from_integral(reference_integral(phase_limit, wiggle_frequency))
}

fn factor_from_integral(integral: f64) -> f64 {
    if !integral.is_finite() || integral.abs() < DEGENERATE_INTEGRAL {
        debug!(integral, "degenerate calibration integral, using identity factor");
        1.0
    } else {
        TAU / integral
    }
}

/// Running trapezoid integral of `values` sampled at spacing `dt`, starting at
/// zero.
fn cumulative_trapezoid(values: &[f64], dt: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut acc = 0.0;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            acc += 0.5 * (values[i - 1] + v) * dt;
        }
        out.push(acc);
    }
    out
}

/// Pre-emboss spiral buffers, one entry per sample in print order.
#[derive(Debug, Clone, PartialEq)]
pub struct SpiralPath {
    pub params: SpiralParameters,
    pub t: Vec<f64>,
    /// Calibrated running angle
    pub theta: Vec<f64>,
    /// Radial deviation from the base radius
    pub deviation: Vec<f64>,
    /// Clamped height
    pub z: Vec<f64>,
    pub scale_factor: f64,
}

impl SpiralPath {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Position of sample `i` relative to the band centre for a given
    /// deviation.
    pub fn local_xy(&self, i: usize, deviation: f64) -> (f64, f64) {
        let r = self.params.base_radius + deviation;
        let (sin, cos) = self.theta[i].sin_cos();
        (r * cos, r * sin)
    }

    /// World positions with the sampled deviation.
    pub fn positions(&self) -> Vec<Point3> {
        self.positions_with(&self.deviation)
    }

    /// World positions with a substitute deviation array.
    pub fn positions_with(&self, deviation: &[f64]) -> Vec<Point3> {
        let [cx, cy] = self.params.center;
        deviation
            .iter()
            .zip(&self.z)
            .enumerate()
            .map(|(i, (d, z))| {
                let (x, y) = self.local_xy(i, *d);
                Point3::new(cx + x, cy + y, *z)
            })
            .collect()
    }
}

pub struct SpiralSampler;

impl SpiralSampler {
    pub fn sample(params: &SpiralParameters) -> Result<SpiralPath> {
        params.validate()?;

        let n = params.num_points;
        let turns = params.total_height / params.layer_thickness;
        let t_end = turns * TAU;
        let dt = if n > 1 { t_end / (n - 1) as f64 } else { 0.0 };

        let t: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();
        let phase: Vec<f64> = t
            .iter()
            .map(|t| params.phase_limit * (params.wiggle_frequency * t).sin())
            .collect();
        let angular_rate: Vec<f64> = phase.iter().map(|p| p.cos()).collect();
        let deviation_rate: Vec<f64> = phase.iter().map(|p| p.sin()).collect();

        let scale_factor = calibration_factor(params.phase_limit, params.wiggle_frequency);
        let theta: Vec<f64> = cumulative_trapezoid(&angular_rate, dt)
            .into_iter()
            .map(|a| a * scale_factor)
            .collect();
        let deviation: Vec<f64> = cumulative_trapezoid(&deviation_rate, dt)
            .into_iter()
            .map(|d| d * params.wiggle_amplitude)
            .collect();

        let seam_shift = params.turn_phase_shift * params.layer_thickness;
        let z: Vec<f64> = t
            .iter()
            .map(|t| {
                let z = t / TAU * params.layer_thickness + params.initial_lift - seam_shift;
                z.max(params.initial_lift)
            })
            .collect();

        debug!(
            points = n,
            turns,
            scale_factor,
            "sampled spiral"
        );
        Ok(SpiralPath {
            params: *params,
            t,
            theta,
            deviation,
            z,
            scale_factor,
        })
    }
}
