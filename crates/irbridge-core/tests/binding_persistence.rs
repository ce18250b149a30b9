//! Integration tests for binding persistence.
//!
//! These tests drive the public API end to end: bindings are projected into a
//! config store, written to disk, read back, and rebuilt.

use std::fs;
use std::time::Duration;

use irbridge_core::{
    Action, BindingError, BindingStore, BoundAction, ClickButtons, ConfigError, ConfigStore,
};

fn sample_store() -> BindingStore {
    let mut store = BindingStore::new();
    store.add(BoundAction::new("FF30CF", Action::MouseMove { dx: 12, dy: -5 }));
    store.add(BoundAction::new(
        "FF18E7",
        Action::MouseClick {
            buttons: ClickButtons::Both,
        },
    ));
    store.add(
        BoundAction::new("FF7A85", Action::KeyPress { key: 0x0D })
            .with_min_refire_interval(Duration::from_millis(120)),
    );
    store.add(BoundAction::new(
        "FF10EF",
        Action::KeyCombo {
            keys: vec![0x11, 0x10, 0x1B],
        },
    ));
    store.add(BoundAction::new("FF5AA5", Action::WheelScroll { ticks: 2 }));
    store
}

fn config_of(store: &BindingStore) -> ConfigStore {
    let mut config = ConfigStore::new();
    for binding in store {
        config.update_section(binding.to_section());
    }
    config
}

#[test]
fn test_bindings_survive_file_round_trip() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bindings.ini");
    let store = sample_store();

    // Act
    config_of(&store).save_to_file(&path).unwrap();
    let loaded = ConfigStore::load_from_file(&path).unwrap();
    let (restored, skipped) = BindingStore::from_config(&loaded);

    // Assert
    assert!(skipped.is_empty());
    assert_eq!(restored, store);
}

#[test]
fn test_saved_file_uses_documented_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bindings.ini");
    let mut store = BindingStore::new();
    store.add(BoundAction::new("FF30CF", Action::MouseMove { dx: 12, dy: -5 }));

    config_of(&store).save_to_file(&path).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[FF30CF]\nactionId=3\nminPressInterval=0\nparamsCount=2\nparam_0=12\nparam_1=-5\n"
    );
}

#[test]
fn test_hand_edited_crlf_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bindings.ini");
    fs::write(
        &path,
        "[FF30CF]\r\nactionId = 2\r\nminPressInterval = 300\r\nparamsCount = 1\r\nparam_0 = 1\r\n",
    )
    .unwrap();

    let (store, skipped) = BindingStore::from_config(&ConfigStore::load_from_file(&path).unwrap());

    assert!(skipped.is_empty());
    let binding = store.find_by_code("FF30CF").unwrap();
    assert_eq!(
        binding.action(),
        &Action::MouseClick {
            buttons: ClickButtons::Left
        }
    );
    assert_eq!(binding.min_refire_interval(), Duration::from_millis(300));
}

#[test]
fn test_one_bad_section_does_not_hide_the_rest() {
    let text = "[GOOD]\nactionId=4\nminPressInterval=0\nparamsCount=1\nparam_0=1\n\
                [SHORT]\nactionId=3\nminPressInterval=0\nparamsCount=2\nparam_0=1\n";
    let config = ConfigStore::parse(text).unwrap();

    let (store, skipped) = BindingStore::from_config(&config);

    assert_eq!(store.len(), 1);
    assert!(matches!(
        skipped.as_slice(),
        [BindingError::MalformedBinding { code, .. }] if code == "SHORT"
    ));
}

#[test]
fn test_missing_file_is_persistence_failure() {
    let dir = tempfile::tempdir().unwrap();

    let result = ConfigStore::load_from_file(&dir.path().join("absent.ini"));

    assert!(matches!(result, Err(ConfigError::PersistenceFailure(_))));
}
