use spiralband_settings::{BandEntry, Config, QualityPreset, SettingsError, SizePreset};
use std::fs;
use tempfile::TempDir;

fn grid_config() -> Config {
    let mut config = Config::default();
    config.printer.name = "anycubic_kobra3".to_string();
    config.grid.columns = 2;
    config.grid.rows = 2;
    config.geometry.num_points = QualityPreset::Fast.num_points();
    config.bands = vec![
        BandEntry::new("ANNA", "7", SizePreset::Small.circumference()),
        BandEntry::empty(),
        BandEntry::new("OLE", "12", SizePreset::Large.circumference()),
        BandEntry::new("MIA", "", 165.0),
    ];
    config
}

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job.toml");

    let config = grid_config();
    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();

    assert_eq!(loaded, config);
    assert_eq!(loaded.configured_count(), 3);
    assert_eq!(loaded.slots()[1], None);
}

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job.json");

    let config = grid_config();
    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();

    assert_eq!(loaded, config);
    assert_eq!(loaded.metadata().printer_name, "anycubic_kobra3");
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job.yaml");

    let err = Config::default().save_to_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::UnsupportedFormat(_)));
    assert!(!path.exists());
}

#[test]
fn test_invalid_file_contents_are_reported() {
    let dir = TempDir::new().unwrap();

    let path = dir.path().join("broken.toml");
    fs::write(&path, "[geometry\nnum_points = ").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::TomlError(_))
    ));

    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"geometry\": ").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::JsonError(_))
    ));

    let missing = dir.path().join("missing.toml");
    assert!(matches!(
        Config::load_from_file(&missing),
        Err(SettingsError::IoError(_))
    ));
}

#[test]
fn test_loaded_values_are_validated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("small.toml");
    fs::write(
        &path,
        "[defaults]\nfront_text = \"TINY\"\ncircumference = 100.0\n",
    )
    .unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("circumference"));
}

#[test]
fn test_conversions_for_grid() {
    let config = grid_config();
    let layout = config.grid_layout();
    let params = config.band_parameters();

    assert_eq!(layout.slot_count(), config.slots().len());
    assert_eq!(layout.first_center, [40.0, 48.0]);
    assert_eq!(params.num_points, 50_000);
    assert_eq!(params.safe_z, 28.0);
    assert!(params.validate().is_ok());
}
