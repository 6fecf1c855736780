use std::fs;

use deck_app::platform::{EditorSettings, LogDestination, SettingsError, SettingsStore};
use pretty_assertions::assert_eq;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("deck.ron"));
    assert!(!store.exists());
    assert_eq!(store.load().unwrap(), EditorSettings::default());
}

#[test]
fn settings_round_trip_through_ron() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("config").join("deck.ron"));
    let settings = EditorSettings {
        grid_size: 10.0,
        constrain_to_slide: false,
        slide_width: 960.0,
        slide_height: 540.0,
        guide_threshold: 2.5,
        log_destination: LogDestination::Both,
    };

    store.save(&settings).unwrap();
    assert!(store.exists());
    assert_eq!(store.load().unwrap(), settings);

    let options = settings.editor_options();
    assert_eq!(options.grid_size, 10.0);
    assert!(!options.constrain_to_slide);
    assert_eq!(options.viewport.width, 960.0);
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.ron");
    fs::write(&path, "(grid_size: 16.0, log_destination: file)").unwrap();

    let settings = SettingsStore::new(&path).load().unwrap();
    assert_eq!(settings.grid_size, 16.0);
    assert_eq!(settings.log_destination, LogDestination::File);
    assert_eq!(settings.slide_width, EditorSettings::default().slide_width);
}

#[test]
fn bad_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.ron");

    fs::write(&path, "(grid_size: \"big\")").unwrap();
    let store = SettingsStore::new(&path);
    assert!(matches!(store.load(), Err(SettingsError::Parse { .. })));
    assert_eq!(store.load_or_default(), EditorSettings::default());

    fs::write(&path, "(grid_size: 0.0)").unwrap();
    assert!(matches!(store.load(), Err(SettingsError::Invalid(_))));
}
