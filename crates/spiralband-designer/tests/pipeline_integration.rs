use proptest::prelude::*;
use spiralband_core::{
    BandParameters, BandSlotConfig, ConfigError, Error, GridLayout, Instruction, JobMetadata,
    ResourceError, Result, SpiralParameters, TextStyle,
};
use spiralband_designer::font_manager::Contour;
use spiralband_designer::{
    calibration_factor, extrusion_paths, generate_gcode, reference_integral, BandAssembler,
    EmbossClassifier, FontSpec, GlyphPolygonBuilder, OutlineSource, SpiralSampler,
    StaticOutlineSource,
};
use std::f64::consts::{PI, TAU};

fn small_params() -> BandParameters {
    BandParameters {
        num_points: 3_000,
        ..BandParameters::default()
    }
}

fn grid_2x2() -> GridLayout {
    GridLayout::new(2, 2, [90.0, 86.0], [40.0, 48.0])
}

fn slot(front: &str, back: &str) -> Option<BandSlotConfig> {
    Some(BandSlotConfig::new(front, back, 165.0))
}

fn is_safe_move(i: &Instruction, safe_z: f64) -> bool {
    matches!(i, Instruction::MoveTo { z, .. } if *z == safe_z)
}

/// Outline source that reports the font as missing for one specific text.
struct FailingOn {
    text: &'static str,
    inner: StaticOutlineSource,
}

impl OutlineSource for FailingOn {
    fn outline(&self, text: &str, font: &FontSpec, size: f64) -> Result<Vec<Contour>> {
        if text == self.text {
            return Err(ResourceError::FontUnavailable {
                family: font.family.clone(),
                bold: font.bold,
            }
            .into());
        }
        self.inner.outline(text, font, size)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sample_count_and_lift_clamp(
        num_points in 1usize..3_000,
        total_height in 1.0f64..20.0,
        layer_thickness in 0.1f64..0.4,
        initial_lift in 0.0f64..0.5,
        turn_phase_shift in 0.0f64..2.0,
    ) {
        let params = SpiralParameters {
            total_height,
            base_radius: 26.0,
            wiggle_amplitude: 50.0,
            wiggle_frequency: 80.0,
            layer_thickness,
            center: [127.5, 127.5],
            phase_limit: 0.59 * PI,
            num_points,
            turn_phase_shift,
            initial_lift,
        };
        let path = SpiralSampler::sample(&params).unwrap();
        let points = path.positions();

        prop_assert_eq!(points.len(), num_points);
        let min_z = points.iter().map(|p| p.z).fold(f64::INFINITY, f64::min);
        prop_assert_eq!(min_z, initial_lift);
    }

    #[test]
    fn shaped_width_never_exceeds_nominal(
        ease_strength in 0.0f64..=1.0,
        ease in 0.0f64..3.0,
        width in 0.3f64..0.8,
    ) {
        let params = BandParameters {
            num_points: 1_500,
            ease_strength,
            ease_in_height: ease,
            ease_out_height: ease,
            extrusion_width: width,
            ..BandParameters::default()
        };
        let outlines = StaticOutlineSource::block_letters();
        let steps = BandAssembler::new(&outlines, params)
            .generate_band(&BandSlotConfig::new("AB", "1", 150.0), [100.0, 100.0])
            .unwrap();

        for step in &steps {
            if let Instruction::ExtrusionGeometry { width: w, .. } = step {
                prop_assert!(*w <= width);
            }
        }
    }
}

#[test]
fn test_no_easing_gives_constant_width() {
    let params = BandParameters {
        ease_strength: 0.0,
        ..small_params()
    };
    let outlines = StaticOutlineSource::block_letters();
    let steps = BandAssembler::new(&outlines, params)
        .generate_band(&BandSlotConfig::new("TEST", "123", 165.0), [0.0, 0.0])
        .unwrap();

    let widths: Vec<_> = steps
        .iter()
        .filter(|s| matches!(s, Instruction::ExtrusionGeometry { .. }))
        .collect();
    assert_eq!(
        widths,
        vec![&Instruction::ExtrusionGeometry {
            width: 0.5,
            height: 0.2
        }]
    );
}

#[test]
fn test_pipeline_is_deterministic() {
    let outlines = StaticOutlineSource::block_letters();
    let assembler = BandAssembler::new(&outlines, small_params());
    let slots = vec![slot("TEST", "123"), None, slot("OB8", ""), slot("", "xyz")];

    let first = assembler.assemble(&grid_2x2(), &slots, &mut |_, _| {}).unwrap();
    let second = assembler.assemble(&grid_2x2(), &slots, &mut |_, _| {}).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(
        generate_gcode(&first, &JobMetadata::default()),
        generate_gcode(&second, &JobMetadata::default())
    );
}

#[test]
fn test_full_grid_travel_structure() {
    let outlines = StaticOutlineSource::block_letters();
    let params = small_params();
    let safe_z = params.safe_z;
    let assembler = BandAssembler::new(&outlines, params);
    let slots = vec![slot("A", "1"), slot("B", "2"), slot("C", "3"), slot("D", "4")];

    let mut calls = Vec::new();
    let program = assembler
        .assemble(&grid_2x2(), &slots, &mut |done, total| calls.push((done, total)))
        .unwrap();

    let lift_pairs = program
        .windows(2)
        .filter(|w| w[0].is_extruder_off() && is_safe_move(&w[1], safe_z))
        .count();
    assert_eq!(lift_pairs, 4);

    let approaches: Vec<_> = program
        .windows(2)
        .filter(|w| is_safe_move(&w[0], safe_z) && is_safe_move(&w[1], safe_z))
        .map(|w| w[1])
        .collect();
    assert_eq!(approaches.len(), 3);

    let r = 165.0 / TAU;
    assert_eq!(
        approaches[0],
        Instruction::MoveTo {
            x: 130.0 + r,
            y: 48.0,
            z: safe_z
        }
    );
    assert_eq!(
        approaches[1],
        Instruction::MoveTo {
            x: 40.0 + r,
            y: 134.0,
            z: safe_z
        }
    );
    // Nothing follows the last band's lift
    assert!(is_safe_move(&program[program.len() - 1], safe_z));
    assert!(program[program.len() - 2].is_extruder_off());

    assert_eq!(calls, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
}

#[test]
fn test_empty_slots_are_skipped() {
    let outlines = StaticOutlineSource::block_letters();
    let assembler = BandAssembler::new(&outlines, small_params());
    let slots = vec![slot("A", "1"), None, None, slot("D", "4")];

    let mut calls = Vec::new();
    let program = assembler
        .assemble(&grid_2x2(), &slots, &mut |done, total| calls.push((done, total)))
        .unwrap();

    assert_eq!(calls, vec![(1, 2), (2, 2)]);
    let band_starts = program
        .iter()
        .filter(|i| **i == Instruction::Extruder { on: true })
        .count();
    assert_eq!(band_starts, 2);
    assert_eq!(extrusion_paths(&program).len(), 2);

    // The approach targets the next configured slot, (1, 1)
    let approach = program
        .iter()
        .filter(|i| is_safe_move(i, 28.0))
        .nth(1)
        .copied();
    assert_eq!(
        approach,
        Some(Instruction::MoveTo {
            x: 130.0 + 165.0 / TAU,
            y: 134.0,
            z: 28.0
        })
    );
}

#[test]
fn test_slot_count_mismatch() {
    let outlines = StaticOutlineSource::block_letters();
    let assembler = BandAssembler::new(&outlines, small_params());
    let err = assembler
        .assemble(&grid_2x2(), &[slot("A", ""), None, None], &mut |_, _| {})
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::SlotCountMismatch {
            expected: 4,
            actual: 3
        })
    ));
}

#[test]
fn test_all_empty_grid_is_rejected() {
    let outlines = StaticOutlineSource::block_letters();
    let assembler = BandAssembler::new(&outlines, small_params());
    let err = assembler
        .assemble(&grid_2x2(), &[None, None, None, None], &mut |_, _| {})
        .unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_font_failure_names_slot() {
    let outlines = FailingOn {
        text: "BAD",
        inner: StaticOutlineSource::block_letters(),
    };
    let assembler = BandAssembler::new(&outlines, small_params());
    let slots = vec![slot("OK", ""), None, slot("BAD", ""), None];

    let mut calls = 0;
    let err = assembler
        .assemble(&grid_2x2(), &slots, &mut |_, _| calls += 1)
        .unwrap_err();

    assert!(err.is_resource_error());
    assert_eq!(err.slot(), Some(2));
    assert!(err.to_string().starts_with("Band slot 2: Font not available"));
    assert_eq!(calls, 1);
}

#[test]
fn test_bad_circumference_names_slot() {
    let outlines = StaticOutlineSource::block_letters();
    let assembler = BandAssembler::new(&outlines, small_params());
    let slots = vec![
        slot("A", ""),
        Some(BandSlotConfig::new("B", "", -5.0)),
        None,
        None,
    ];

    let err = assembler
        .assemble(&grid_2x2(), &slots, &mut |_, _| {})
        .unwrap_err();
    assert!(err.is_configuration_error());
    assert_eq!(err.slot(), Some(1));
}

#[test]
fn test_calibration_times_integral_is_full_turn() {
    for (phase_limit, frequency) in [(0.59 * PI, 80.0), (0.3 * PI, 12.0), (1.0, 3.0)] {
        let integral = reference_integral(phase_limit, frequency);
        let factor = calibration_factor(phase_limit, frequency);
        assert!((factor * integral - TAU).abs() < 1e-9);
    }
}

#[test]
fn test_glyph_containment_respects_holes() {
    let outlines = StaticOutlineSource::block_letters();
    let style = TextStyle {
        size: 10.0,
        anchor: [0.0, 0.0],
        ..TextStyle::default()
    };
    let set = GlyphPolygonBuilder::new(&outlines)
        .build("O", &style, false)
        .unwrap();

    // Ring of the "O": outer 6 x 7, counter 3 x 4, centred on the origin
    assert!(set.contains(-2.5, 0.0));
    assert!(set.contains(0.0, 3.0));
    assert!(!set.contains(0.0, 0.0));
    assert!(!set.contains(1.0, 1.5));
    assert!(!set.contains(4.0, 0.0));
    assert!(!set.contains(0.0, -4.0));
}

#[test]
fn test_overlapping_sides_at_x_zero() {
    let outlines = StaticOutlineSource::block_letters();
    let style = TextStyle {
        size: 10.0,
        anchor: [0.0, 0.0],
        ..TextStyle::default()
    };
    let glyphs = GlyphPolygonBuilder::new(&outlines);
    // Solid blocks: front covers the whole cell, back is mirrored onto itself
    let front = glyphs.build("A", &style, false).unwrap();
    let back = glyphs.build("A", &style, true).unwrap();

    let both = EmbossClassifier::new(Some(&front), Some(&back));
    let front_only = EmbossClassifier::new(Some(&front), None);
    let back_only = EmbossClassifier::new(None, Some(&back));

    assert!(front_only.is_in_text(0.0, 1.0, 1.0));
    assert!(back_only.is_in_text(0.0, 1.0, 1.0));
    assert!(both.is_in_text(0.0, 1.0, 1.0));

    assert!(!front_only.is_in_text(-0.1, 1.0, 1.0));
    assert!(!back_only.is_in_text(0.1, 1.0, 1.0));
}

#[test]
fn test_emboss_raises_text_region_only() {
    let outlines = StaticOutlineSource::block_letters();
    let params = small_params();
    let assembler = BandAssembler::new(&outlines, params.clone());
    let center = [127.5, 127.5];

    let plain = assembler
        .band_points(&BandSlotConfig::new("", "", 165.0), center)
        .unwrap();
    let embossed = assembler
        .band_points(&BandSlotConfig::new("TEST", "", 165.0), center)
        .unwrap();
    let spiral = SpiralSampler::sample(&params.spiral(165.0 / TAU, center)).unwrap();

    assert_eq!(plain, spiral.positions());
    assert_eq!(plain.len(), embossed.len());
    let changed = plain
        .iter()
        .zip(&embossed)
        .filter(|(a, b)| a != b)
        .count();
    assert!(changed > 0);
    assert!(changed < plain.len());
    // Front text never reaches the back half
    for (a, b) in plain.iter().zip(&embossed) {
        if a.x < center[0] {
            assert_eq!(a, b);
        }
    }
}

#[test]
fn test_gcode_emits_one_extruding_move_per_point() {
    let outlines = StaticOutlineSource::block_letters();
    let params = BandParameters {
        num_points: 500,
        ..BandParameters::default()
    };
    let assembler = BandAssembler::new(&outlines, params);
    let program = assembler
        .assemble(
            &GridLayout::single([127.5, 127.5]),
            &[slot("A", "1")],
            &mut |_, _| {},
        )
        .unwrap();

    let gcode = generate_gcode(&program, &JobMetadata::default());
    let extruding = gcode
        .lines()
        .filter(|l| l.starts_with("G1 X") && l.contains(" E"))
        .count();
    assert_eq!(extruding, 500);
    assert!(gcode.contains("M106 S26\n"));
    assert!(gcode.contains("M106 S77\n"));
}
