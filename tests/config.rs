use std::fs;
use std::path::PathBuf;

use head_loss_explorer::config::{self, Config, ConfigError, Preset};
use head_loss_explorer::sampling::MAX_SAMPLE_COUNT;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hle_{name}_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn empty_file_uses_defaults() {
    let cfg = Config::from_toml_str("").expect("defaults");
    assert_eq!(cfg.language, "auto");
    assert_eq!(cfg.preset, Preset::Standard);
    assert_eq!(cfg.dashboard(), Preset::Standard.dashboard());
}

#[test]
fn preset_is_read_by_code() {
    let cfg = Config::from_toml_str("language = \"de-de\"\npreset = \"wide-diameter\"\n").unwrap();
    assert_eq!(cfg.language, "de-de");
    assert_eq!(cfg.dashboard().head_loss_max, 20.0);
}

#[test]
fn custom_dashboard_overrides_preset() {
    let src = r#"
preset = "standard"

[dashboard]
flow_max = 0.3
sample_count = 50
head_loss_max = 30.0
show_formula = false

[dashboard.friction]
min = 0.01
max = 0.05
step = 0.005
default = 0.02
decimals = 3

[dashboard.length]
min = 10.0
max = 100.0
step = 5.0
default = 50.0
decimals = 0

[dashboard.diameter]
min = 0.1
max = 0.5
step = 0.01
default = 0.2
decimals = 2

[dashboard.flow_point]
min = 0.0
max = 0.3
step = 0.01
default = 0.1
decimals = 2

[dashboard.reference]
friction_coefficient = 0.03
pipe_length_m = 30.0
pipe_diameter_m = 0.3

[dashboard.label]
flow_decimals = 2
head_loss_decimals = 2
"#;
    let cfg = Config::from_toml_str(src).expect("custom dashboard");
    let dashboard = cfg.dashboard();
    assert_eq!(dashboard.sample_count, 50);
    assert_eq!(dashboard.default_parameters().pipe_diameter_m, 0.2);
    assert_eq!(dashboard.reference.pipe_length_m, 30.0);
}

#[test]
fn inconsistent_dashboard_is_rejected() {
    let mut dashboard = Preset::Standard.dashboard();
    dashboard.diameter.default = 0.5;
    let mut cfg = Config::default();
    cfg.dashboard = Some(dashboard);
    let text = cfg.to_toml_string().unwrap();
    match Config::from_toml_str(&text) {
        Err(ConfigError::Invalid(e)) => assert_eq!(e.setting, "diameter"),
        other => panic!("expected invalid diameter slider, got {other:?}"),
    }
}

#[test]
fn zero_reference_diameter_is_rejected() {
    let mut dashboard = Preset::WideDiameter.dashboard();
    dashboard.reference.pipe_diameter_m = 0.0;
    let err = dashboard.validate().unwrap_err();
    assert_eq!(err.setting, "reference");
}

#[test]
fn malformed_toml_is_a_parse_error() {
    assert!(matches!(
        Config::from_toml_str("preset = [1, 2"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn sample_count_is_capped() {
    let mut dashboard = Preset::Standard.dashboard();
    dashboard.sample_count = MAX_SAMPLE_COUNT;
    dashboard.validate().expect("cap itself is allowed");
    dashboard.sample_count = 1_000_000_000;
    assert_eq!(dashboard.validate().unwrap_err().setting, "sample_count");
}

#[test]
fn reference_that_cannot_be_evaluated_is_rejected() {
    let mut dashboard = Preset::Standard.dashboard();
    dashboard.reference.pipe_diameter_m = 1e-200;
    assert_eq!(dashboard.validate().unwrap_err().setting, "reference");
}

#[test]
fn missing_file_is_created_at_the_requested_path() {
    let dir = scratch_dir("create");
    let path = dir.join("settings.toml");
    let cfg = config::load_from(&path).expect("defaults written");
    assert_eq!(cfg.path(), path);
    assert!(path.exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn save_does_not_clobber_an_unreadable_file() {
    let dir = scratch_dir("clobber");
    let path = dir.join("config.toml");
    let broken = "preset = \"standard\"\n[dashboard]\nflow_max = \n";
    fs::write(&path, broken).unwrap();

    assert!(config::load_from(&path).is_err());
    let fallback = Config::with_path(&path);
    match fallback.save() {
        Err(ConfigError::Unreadable { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected Unreadable, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), broken);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn save_round_trips_through_the_same_file() {
    let dir = scratch_dir("roundtrip");
    let path = dir.join("config.toml");
    let mut cfg = config::load_from(&path).unwrap();
    cfg.language = "ko-kr".into();
    cfg.preset = Preset::WideDiameter;
    cfg.save().unwrap();

    let reloaded = config::load_from(&path).unwrap();
    assert_eq!(reloaded.language, "ko-kr");
    assert_eq!(reloaded.preset, Preset::WideDiameter);
    let _ = fs::remove_dir_all(&dir);
}
