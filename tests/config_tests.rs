//! Configuration discovery and context loading

mod common;

use std::env;

use serial_test::serial;
use tooltipgen::config::{load_config, ConfigError};
use tooltipgen::sprite::Registry;
use tooltipgen::{Context, GeneratorError};

use common::fixture;

#[test]
fn test_context_loads_fixture_data() {
    let fixture = fixture();
    let context = Context::from_config_path(Some(&fixture.config_path)).unwrap();

    assert_eq!(context.atlas().len(), 3);
    assert!(context.atlas().get("minecraft:diamond_sword").is_some());
    assert_eq!(context.atlas().search("SWORD"), vec!["diamond_sword"]);
    assert_eq!(context.overlays().len(), 1);
    assert!(context.overlays().overlay_for("potion").is_some());
    assert_eq!(context.glint_settings().frame_count(), common::GLINT_FRAMES);
    assert_eq!(context.config().render.workers, 2);
}

#[test]
#[serial]
fn test_config_discovered_from_working_directory() {
    let fixture = fixture();
    let nested = fixture.dir.path().join("renders").join("today");
    std::fs::create_dir_all(&nested).unwrap();

    let previous = env::current_dir().unwrap();
    env::set_current_dir(&nested).unwrap();
    let loaded = load_config(None);
    env::set_current_dir(previous).unwrap();

    let config = loaded.unwrap();
    assert_eq!(config.glint.duration_ms, 330);
    let atlas = config.data.atlas.unwrap();
    assert!(atlas.is_absolute() || atlas.starts_with(fixture.dir.path()));
    assert!(atlas.ends_with("items.png"));
}

#[test]
fn test_invalid_config_rejected() {
    let fixture = fixture();
    let path = fixture.dir.path().join("broken.toml");
    std::fs::write(&path, "[render]\nscale = 0\nframe_delay_ms = 5\n").unwrap();

    match load_config(Some(&path)) {
        Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("expected validation errors, got {:?}", other),
    }
    assert!(matches!(Context::from_config_path(Some(&path)), Err(GeneratorError::InvalidInput(_))));
}

#[test]
fn test_missing_data_file_is_not_found() {
    let fixture = fixture();
    std::fs::remove_file(fixture.dir.path().join("items.json")).unwrap();
    let result = Context::from_config_path(Some(&fixture.config_path));
    assert!(result.is_err());
}
