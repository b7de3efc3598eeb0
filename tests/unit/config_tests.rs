// Configuration unit tests

use pdfstamp::config::{Config, Overrides};
use pdfstamp::watermark::{Placement, Rgb, WatermarkError, WatermarkSpec};
use std::path::PathBuf;

#[test]
fn test_defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.text, "WATERMARK");
    assert_eq!(config.font_size, 100.0);
    assert_eq!(config.rotation, 45.0);
    assert_eq!(config.color, "red");
    assert_eq!(config.placement, Placement::Below);
    assert!(config.log_dir.is_none());

    let spec = config.watermark_spec().unwrap();
    let default_spec = WatermarkSpec::default();
    assert_eq!(spec.text(), default_spec.text());
    assert_eq!(spec.color(), default_spec.color());
}

#[test]
fn test_full_yaml_config() {
    let yaml = r#"
text: "INTERNAL USE"
font_size: 72
rotation: -30
color: "0.5, 0.5, 0.5"
placement: above
log_dir: /tmp/stamp-logs
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.text, "INTERNAL USE");
    assert_eq!(config.font_size, 72.0);
    assert_eq!(config.rotation, -30.0);
    assert_eq!(config.placement, Placement::Above);
    assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/stamp-logs")));

    let spec = config.watermark_spec().unwrap();
    assert_eq!(spec.color(), Rgb::new(0.5, 0.5, 0.5));
    assert_eq!(spec.rotation_degrees(), -30.0);
}

#[test]
fn test_partial_yaml_keeps_defaults() {
    let config = Config::from_yaml_with_env("text: COPY\n").unwrap();
    assert_eq!(config.text, "COPY");
    assert_eq!(config.font_size, 100.0);
    assert_eq!(config.color, "red");
}

#[test]
fn test_unknown_key_rejected() {
    let err = Config::from_yaml_with_env("txt: typo\n").unwrap_err();
    assert!(matches!(err, WatermarkError::Config(_)));
}

#[test]
fn test_env_substitution() {
    std::env::set_var("PDFSTAMP_UNIT_DEPT", "LEGAL");
    let config = Config::from_yaml_with_env("text: \"${PDFSTAMP_UNIT_DEPT} ONLY\"\n").unwrap();
    assert_eq!(config.text, "LEGAL ONLY");
}

#[test]
fn test_missing_env_var_is_an_error() {
    let err = Config::from_yaml_with_env("text: ${PDFSTAMP_UNIT_NOT_SET_ANYWHERE}\n").unwrap_err();
    assert!(err.to_string().contains("PDFSTAMP_UNIT_NOT_SET_ANYWHERE"));
}

#[test]
fn test_missing_file_is_config_error() {
    let err = Config::from_file("/nonexistent/pdfstamp.yaml").unwrap_err();
    assert!(matches!(err, WatermarkError::Config(_)));
}

#[test]
fn test_overrides_take_precedence() {
    let config = Config::from_yaml_with_env("text: FILE\ncolor: blue\n")
        .unwrap()
        .with_overrides(Overrides {
            text: Some("FLAG".to_string()),
            color: Some("0 1 0".to_string()),
            placement: Some(Placement::Above),
            ..Default::default()
        });

    assert_eq!(config.text, "FLAG");
    assert_eq!(config.placement, Placement::Above);
    assert_eq!(config.font_size, 100.0);
    assert_eq!(config.watermark_spec().unwrap().color(), Rgb::new(0.0, 1.0, 0.0));
}

#[test]
fn test_invalid_values_surface_when_building_spec() {
    let config = Config::default().with_overrides(Overrides {
        font_size: Some(0.0),
        ..Default::default()
    });
    assert!(matches!(
        config.watermark_spec(),
        Err(WatermarkError::InvalidSpec(_))
    ));

    let config = Config::default().with_overrides(Overrides {
        color: Some("purple".to_string()),
        ..Default::default()
    });
    assert!(matches!(
        config.watermark_spec(),
        Err(WatermarkError::InvalidColorFormat { .. })
    ));
}
