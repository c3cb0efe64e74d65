use super::*;

#[test]
fn builtin_face_is_always_present() {
    let reg = FontRegistry::with_builtin();
    assert!(reg.contains(&FontId::builtin()));
    assert_eq!(reg.ids().count(), 1);
    assert_eq!(FontId::default().as_str(), BUILTIN_FONT);
}

#[test]
fn register_adds_and_replaces() {
    let mut reg = FontRegistry::with_builtin();
    reg.register(FontId::new("block"), Arc::new(BitmapFace::new()));
    assert!(reg.contains(&FontId::new("block")));
    reg.register(FontId::new("block"), Arc::new(BitmapFace::new()));
    assert_eq!(reg.ids().count(), 2);
    assert!(reg.get(&FontId::new("missing")).is_none());
}

#[test]
fn load_dir_ignores_non_font_files() {
    let dir = std::env::temp_dir().join(format!("logoforge-fonts-empty-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("README.txt"), b"not a font").unwrap();

    let mut reg = FontRegistry::with_builtin();
    let added = reg.load_dir(&dir).unwrap();
    assert!(added.is_empty());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn load_dir_reports_corrupt_font_as_decode_error() {
    let dir = std::env::temp_dir().join(format!("logoforge-fonts-bad-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("Broken.ttf"), [0u8; 64]).unwrap();

    let mut reg = FontRegistry::with_builtin();
    let err = reg.load_dir(&dir).unwrap_err();
    assert!(matches!(err, LogoError::Decode(_)), "{err}");
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_dir_is_an_error() {
    let mut reg = FontRegistry::with_builtin();
    assert!(reg.load_dir(Path::new("/definitely/not/here")).is_err());
}

#[test]
fn font_id_serializes_as_plain_string() {
    let json = serde_json::to_string(&FontId::new("serif")).unwrap();
    assert_eq!(json, "\"serif\"");
}
