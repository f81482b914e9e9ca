//! The tagged printer action consumed by instruction emitters.

use super::Point3;
use serde::{Deserialize, Serialize};

/// One printer action.
///
/// A program is an ordered `Vec<Instruction>`. Settings (extrusion state,
/// width/height, speed, fan) stay in effect until the next instruction of the
/// same kind changes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instruction {
    /// Linear move to an absolute position; extrudes only while the extruder is on
    MoveTo { x: f64, y: f64, z: f64 },
    /// Enable or disable extrusion for subsequent moves
    Extruder { on: bool },
    /// Extrusion cross-section used for subsequent extruding moves
    ExtrusionGeometry { width: f64, height: f64 },
    /// Print speed in mm/min
    Speed { mm_per_min: f64 },
    /// Part-cooling fan duty in percent
    Fan { percent: u8 },
    /// Extrude (or retract, when negative) a volume in mm³ without moving
    StationaryExtrusion { volume: f64, speed: f64 },
}

impl Instruction {
    pub fn move_to(p: Point3) -> Self {
        Instruction::MoveTo {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }

    pub fn extruder(on: bool) -> Self {
        Instruction::Extruder { on }
    }

    /// Target position of a move, `None` for every other instruction
    pub fn position(&self) -> Option<Point3> {
        match *self {
            Instruction::MoveTo { x, y, z } => Some(Point3::new(x, y, z)),
            _ => None,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Instruction::MoveTo { .. })
    }

    /// True for `Extruder { on: false }`
    pub fn is_extruder_off(&self) -> bool {
        matches!(self, Instruction::Extruder { on: false })
    }
}
