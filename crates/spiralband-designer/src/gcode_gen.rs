//! G-code generation from instruction streams.

use spiralband_core::{Instruction, JobMetadata, Point3, BAND_VERSION};
use std::f64::consts::PI;

/// Filament diameter assumed when converting extruded volume to E length.
pub const FILAMENT_DIAMETER: f64 = 1.75;

fn filament_area() -> f64 {
    let r = FILAMENT_DIAMETER / 2.0;
    PI * r * r
}

/// Consumer of an ordered instruction stream.
pub trait InstructionSink {
    /// Called once before the first instruction.
    fn begin(&mut self, metadata: &JobMetadata);
    fn emit(&mut self, instruction: &Instruction);
    /// Called once after the last instruction; returns the finished program.
    fn finish(&mut self) -> String;
}

/// Marlin-flavoured G-code writer with relative extrusion.
#[derive(Debug, Default)]
pub struct GcodeWriter {
    gcode: String,
    position: Option<Point3>,
    extruding: bool,
    width: f64,
    height: f64,
    feed_rate: Option<f64>,
    feed_pending: bool,
}

impl GcodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates the G-code header.
    fn generate_header(&mut self, metadata: &JobMetadata) {
        let gcode = &mut self.gcode;
        gcode.push_str(&format!("; SpiralBand {}\n", BAND_VERSION));
        gcode.push_str(&format!("; Printer: {}\n", metadata.printer_name));
        gcode.push_str(&format!(
            "; Extrusion: {:.3}mm x {:.3}mm\n",
            metadata.extrusion_width, metadata.extrusion_height
        ));
        gcode.push_str(&format!("; Print speed: {:.0} mm/min\n", metadata.print_speed));
        gcode.push('\n');
        gcode.push_str(&format!("M140 S{}      ; Bed temperature\n", metadata.bed_temp));
        gcode.push_str(&format!("M104 S{}     ; Nozzle temperature\n", metadata.nozzle_temp));
        gcode.push_str(&format!("M190 S{}      ; Wait for bed\n", metadata.bed_temp));
        gcode.push_str(&format!("M109 S{}     ; Wait for nozzle\n", metadata.nozzle_temp));
        gcode.push_str("G21           ; Millimeter units\n");
        gcode.push_str("G90           ; Absolute positioning\n");
        gcode.push_str("M83           ; Relative extrusion\n");
        gcode.push_str(&format!(
            "M106 S{}     ; Fan\n",
            fan_pwm(metadata.fan_percent)
        ));
        gcode.push('\n');
    }

    /// Generates the G-code footer.
    fn generate_footer(&mut self) {
        let gcode = &mut self.gcode;
        gcode.push('\n');
        gcode.push_str("M106 S0       ; Fan off\n");
        gcode.push_str("M104 S0       ; Nozzle heater off\n");
        gcode.push_str("M140 S0       ; Bed heater off\n");
        gcode.push_str("M84           ; Motors off\n");
    }

    fn feed_word(&mut self) -> String {
        match (self.feed_pending, self.feed_rate) {
            (true, Some(f)) => {
                self.feed_pending = false;
                format!(" F{:.0}", f)
            }
            _ => String::new(),
        }
    }

    fn move_to(&mut self, target: Point3) {
        let extrude = self.extruding && self.width > 0.0 && self.height > 0.0;
        match (extrude, self.position) {
            (true, Some(from)) => {
                let e = from.distance_to(&target) * self.width * self.height / filament_area();
                let feed = self.feed_word();
                self.gcode.push_str(&format!(
                    "G1 X{:.3} Y{:.3} Z{:.3} E{:.5}{}\n",
                    target.x, target.y, target.z, e, feed
                ));
            }
            _ => {
                self.gcode.push_str(&format!(
                    "G0 X{:.3} Y{:.3} Z{:.3}\n",
                    target.x, target.y, target.z
                ));
            }
        }
        self.position = Some(target);
    }
}

impl InstructionSink for GcodeWriter {
    fn begin(&mut self, metadata: &JobMetadata) {
        self.generate_header(metadata);
    }

    fn emit(&mut self, instruction: &Instruction) {
        match *instruction {
            Instruction::MoveTo { x, y, z } => self.move_to(Point3::new(x, y, z)),
            Instruction::Extruder { on } => self.extruding = on,
            Instruction::ExtrusionGeometry { width, height } => {
                self.width = width;
                self.height = height;
            }
            Instruction::Speed { mm_per_min } => {
                self.feed_rate = Some(mm_per_min);
                self.feed_pending = true;
            }
            Instruction::Fan { percent } => {
                self.gcode.push_str(&format!("M106 S{}\n", fan_pwm(percent)));
            }
            Instruction::StationaryExtrusion { volume, speed } => {
                self.gcode.push_str(&format!(
                    "G1 E{:.5} F{:.0}\n",
                    volume / filament_area(),
                    speed
                ));
                // The next print move must restore its own feed rate
                self.feed_pending = self.feed_rate.is_some();
            }
        }
    }

    fn finish(&mut self) -> String {
        self.generate_footer();
        std::mem::take(&mut self.gcode)
    }
}

fn fan_pwm(percent: u8) -> u32 {
    (u32::from(percent.min(100)) * 255 + 50) / 100
}

/// Drives `sink` over a complete program.
pub fn write_program<S: InstructionSink>(
    sink: &mut S,
    instructions: &[Instruction],
    metadata: &JobMetadata,
) -> String {
    sink.begin(metadata);
    for instruction in instructions {
        sink.emit(instruction);
    }
    sink.finish()
}

/// Marlin G-code for `instructions`.
pub fn generate_gcode(instructions: &[Instruction], metadata: &JobMetadata) -> String {
    write_program(&mut GcodeWriter::new(), instructions, metadata)
}
