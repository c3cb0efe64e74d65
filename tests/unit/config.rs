use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "logoforge-config-{name}-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn defaults_are_valid() {
    let cfg = EngineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.max_image_bytes, 200 * 1024 * 1024);
    assert_eq!(cfg.render_timeout_ms, 10_000);
    assert_eq!(cfg.default_color, Rgba8::WHITE);
    assert_eq!(cfg.default_font, FontId::builtin());
    assert!(!cfg.reject_when_busy);
}

#[test]
fn partial_json_fills_defaults() {
    let dir = temp_dir("partial");
    let path = dir.join("cfg.json");
    std::fs::write(
        &path,
        r#"{ "max_text_chars": 12, "fit": { "max_size": 60 }, "export": { "format": "jpeg" } }"#,
    )
    .unwrap();
    let cfg = EngineConfig::from_path(&path).unwrap();
    assert_eq!(cfg.max_text_chars, 12);
    assert_eq!(cfg.fit.max_size, 60);
    assert_eq!(cfg.fit.min_size, FitPolicy::default().min_size);
    assert_eq!(cfg.export.format, crate::render::export::ExportFormat::Jpeg);
    assert_eq!(cfg.export.jpeg_quality, ExportOpts::default().jpeg_quality);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn invalid_values_are_reported() {
    let bad = [
        EngineConfig {
            render_threads: Some(0),
            ..EngineConfig::default()
        },
        EngineConfig {
            min_scale: 0.0,
            ..EngineConfig::default()
        },
        EngineConfig {
            max_blur_radius: f32::NAN,
            ..EngineConfig::default()
        },
        EngineConfig {
            max_text_chars: 0,
            ..EngineConfig::default()
        },
    ];
    for cfg in bad {
        assert!(matches!(cfg.validate(), Err(LogoError::Validation(_))));
    }
}

#[test]
fn missing_file_is_an_error() {
    let err = EngineConfig::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(err.to_string().contains("read config"));
}

#[test]
fn derived_settings_mirror_fields() {
    let cfg = EngineConfig {
        fit_padding: 7,
        max_scale: 4.0,
        ..EngineConfig::default()
    };
    assert_eq!(cfg.render_settings().fit_padding, 7);
    assert_eq!(cfg.param_limits().max_scale, 4.0);
    assert_eq!(cfg.decode_limits().max_bytes, cfg.max_image_bytes);
}

#[test]
fn text_rules_follow_config() {
    let dir = temp_dir("text-rules");
    let path = dir.join("cfg.json");
    std::fs::write(&path, r#"{ "max_text_chars": 20, "alphanumeric_text": true }"#).unwrap();
    let cfg = EngineConfig::from_path(&path).unwrap();
    assert_eq!(
        cfg.text_rules(),
        TextRules {
            max_chars: 20,
            alphanumeric_only: true,
        }
    );
    assert!(!EngineConfig::default().text_rules().alphanumeric_only);
    let _ = std::fs::remove_dir_all(&dir);
}
