use spiralband_core::{
    BandParameters, BandSlotConfig, ConfigError, Error, GridLayout, Instruction, Point3,
    ResourceError,
};

#[test]
fn test_instruction_stream_json_round_trip() {
    let program = vec![
        Instruction::StationaryExtrusion {
            volume: -1.5,
            speed: 250.0,
        },
        Instruction::extruder(false),
        Instruction::move_to(Point3::new(70.0, 127.5, 0.14)),
        Instruction::extruder(true),
        Instruction::Fan { percent: 10 },
        Instruction::Speed { mm_per_min: 550.0 },
        Instruction::ExtrusionGeometry {
            width: 0.025,
            height: 0.2,
        },
        Instruction::move_to(Point3::new(70.5, 127.0, 0.15)),
    ];

    let json = serde_json::to_string(&program).unwrap();
    assert!(json.contains(r#""type":"stationary_extrusion""#));
    assert!(json.contains(r#""type":"extrusion_geometry""#));

    let decoded: Vec<Instruction> = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, program);
    assert_eq!(decoded.iter().filter(|i| i.is_move()).count(), 2);
}

#[test]
fn test_grid_cells_match_slot_count() {
    let layout = GridLayout::new(3, 2, [60.0, 70.0], [40.0, 48.0]);
    let cells: Vec<_> = layout.cells().collect();

    assert_eq!(cells.len(), layout.slot_count());
    assert_eq!(cells[4], (4, 1, 1));
    assert_eq!(layout.cell_center(2, 1), [160.0, 118.0]);
    assert_eq!(GridLayout::single([127.5, 127.5]).cells().count(), 1);
}

#[test]
fn test_parameters_feed_spiral_and_shaping() {
    let params = BandParameters::default();
    let slot = BandSlotConfig::new("ANNA", "7", 160.0);

    let spiral = params.spiral(slot.base_radius(), [10.0, 20.0]);
    assert_eq!(spiral.center, [10.0, 20.0]);
    assert!((spiral.base_radius * 2.0 * std::f64::consts::PI - 160.0).abs() < 1e-9);
    assert!(spiral.validate().is_ok());
    assert!(params.shaping().validate().is_ok());
}

#[test]
fn test_error_keeps_slot_through_conversion() {
    let err: Error = ConfigError::EmptyPath.into();
    let err = err.in_slot(3);
    assert_eq!(err.slot(), Some(3));
    assert!(err.is_configuration_error());
    assert!(err.to_string().contains('3'));

    let err: Error = ResourceError::FontUnavailable {
        family: "Nope".to_string(),
        bold: false,
    }
    .into();
    assert!(err.is_resource_error());
    assert_eq!(err.slot(), None);
}
