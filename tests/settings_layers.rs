use rowshape::settings::Settings;

#[test]
fn absent_file_gives_defaults() {
    let settings = Settings::load("rowshape_settings_that_do_not_exist.toml").expect("settings");
    assert_eq!(settings.pivot_year, 33);
    assert_eq!(settings.markup, "()[]{}<>");
    assert!(!settings.default_numeric);
}

#[test]
fn file_overrides_defaults() {
    let path = std::env::temp_dir().join("rowshape_settings_test.toml");
    std::fs::write(&path, "pivot_year = 50\ndefault_numeric = true\n").expect("write settings");
    let settings = Settings::load(path.to_str().expect("utf-8 path")).expect("settings");
    // Clean up
    let _ = std::fs::remove_file(&path);
    assert_eq!(settings.pivot_year, 50);
    assert!(settings.default_numeric);
    assert_eq!(settings.markup, "()[]{}<>", "unset keys keep their default");
}

#[test]
fn broken_file_is_a_config_error() {
    let path = std::env::temp_dir().join("rowshape_settings_broken.toml");
    std::fs::write(&path, "pivot_year = [unterminated\n").expect("write settings");
    let result = Settings::load(path.to_str().expect("utf-8 path"));
    let _ = std::fs::remove_file(&path);
    assert!(matches!(result, Err(rowshape::RowshapeError::Config(_))));
}
