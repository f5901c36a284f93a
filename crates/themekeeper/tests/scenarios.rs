//! End-to-end behavior of the controller over in-memory and file ports.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use tempfile::TempDir;
use themekeeper::{
    AppearanceSurface, ClassList, ColorMode, FileStore, ManualSignal, MemoryStore, PreferenceStore,
    ThemeController, ThemePreference,
};

type Controller = ThemeController<MemoryStore, ClassList, ManualSignal>;

fn fixture(stored: Option<&str>, os_dark: bool) -> (Controller, MemoryStore, ManualSignal) {
    let store = match stored {
        Some(value) => MemoryStore::new().with_entry("theme", value),
        None => MemoryStore::new(),
    };
    let os = ManualSignal::new(os_dark);
    let controller = ThemeController::new(store.clone(), ClassList::new(), os.clone());
    (controller, store, os)
}

#[test]
fn apply_renders_expected_appearance_for_every_preference() {
    for os_dark in [false, true] {
        let expected = [
            (ThemePreference::Dark, ColorMode::Dark),
            (ThemePreference::Light, ColorMode::Light),
            (ThemePreference::System, ColorMode::from_prefers_dark(os_dark)),
        ];
        for (preference, mode) in expected {
            let (controller, _, _) = fixture(None, os_dark);
            controller.apply(preference).unwrap();
            assert_eq!(
                controller.appearance(),
                mode,
                "apply({}) with os_dark={}",
                preference,
                os_dark
            );
            assert_eq!(controller.surface().is_dark(), mode == ColorMode::Dark);
        }
    }
}

#[test]
fn invalid_stored_values_read_as_system() {
    for raw in ["blue", "", "null", "Dark", "system "] {
        for os_dark in [false, true] {
            let (controller, _, _) = fixture(Some(raw), os_dark);
            assert_eq!(controller.preference().unwrap(), ThemePreference::System);
            assert_eq!(controller.appearance(), ColorMode::from_prefers_dark(os_dark));
        }
    }
}

#[test]
fn missing_stored_value_reads_as_system() {
    let (controller, store, _) = fixture(None, true);
    assert_eq!(controller.preference().unwrap(), ThemePreference::System);
    assert_eq!(controller.appearance(), ColorMode::Dark);
    assert!(store.is_empty());
}

#[test]
fn persist_is_idempotent() {
    let (once, once_store, _) = fixture(None, false);
    once.persist(ThemePreference::Dark).unwrap();

    let (twice, twice_store, _) = fixture(None, false);
    twice.persist(ThemePreference::Dark).unwrap();
    twice.persist(ThemePreference::Dark).unwrap();

    assert_eq!(once_store.get("theme"), twice_store.get("theme"));
    assert_eq!(once_store.len(), twice_store.len());
}

#[test]
fn toggle_is_an_involution() {
    let (controller, _, _) = fixture(None, false);
    controller.apply(ThemePreference::Dark).unwrap();

    assert_eq!(controller.toggle().unwrap(), ColorMode::Light);
    assert_eq!(controller.appearance(), ColorMode::Light);
    assert_eq!(controller.toggle().unwrap(), ColorMode::Dark);
    assert_eq!(controller.appearance(), ColorMode::Dark);
}

#[test]
fn toggle_follows_rendered_state_not_storage() {
    // Storage says dark but the surface renders light: toggling goes to dark.
    let (controller, store, _) = fixture(Some("dark"), false);
    assert_eq!(controller.appearance(), ColorMode::Light);

    assert_eq!(controller.toggle().unwrap(), ColorMode::Dark);
    assert_eq!(store.get("theme").as_deref(), Some("dark"));
}

#[test]
fn toggle_persists_concrete_value() {
    let (controller, store, _) = fixture(Some("system"), true);
    controller.apply(ThemePreference::System).unwrap();

    assert_eq!(controller.toggle().unwrap(), ColorMode::Light);
    assert_eq!(store.get("theme").as_deref(), Some("light"));
}

#[test]
fn concrete_apply_persists_exactly_and_system_persists_nothing() {
    let (controller, store, _) = fixture(None, true);

    controller.apply(ThemePreference::Dark).unwrap();
    assert_eq!(store.get("theme").as_deref(), Some("dark"));

    controller.apply(ThemePreference::Light).unwrap();
    assert_eq!(store.get("theme").as_deref(), Some("light"));

    controller.apply(ThemePreference::System).unwrap();
    assert_eq!(store.get("theme").as_deref(), Some("light"));
    assert_eq!(controller.appearance(), ColorMode::Dark);
}

#[test]
fn initialize_with_empty_storage_follows_dark_os_without_writing() {
    let (mut controller, store, _) = fixture(None, true);

    assert_eq!(controller.initialize().unwrap(), ThemePreference::System);
    assert_eq!(controller.appearance(), ColorMode::Dark);
    assert!(store.is_empty());
}

#[test]
fn initialize_with_stored_light_ignores_os() {
    for os_dark in [false, true] {
        let (mut controller, _, _) = fixture(Some("light"), os_dark);
        assert_eq!(controller.initialize().unwrap(), ThemePreference::Light);
        assert_eq!(controller.appearance(), ColorMode::Light);
    }
}

#[test]
fn initialize_with_invalid_storage_follows_os_and_keeps_value() {
    let (mut controller, store, _) = fixture(Some("neon"), true);

    assert_eq!(controller.initialize().unwrap(), ThemePreference::System);
    assert_eq!(controller.appearance(), ColorMode::Dark);
    assert_eq!(store.get("theme").as_deref(), Some("neon"));

    // Only a concrete choice replaces it.
    controller.toggle().unwrap();
    assert_eq!(store.get("theme").as_deref(), Some("light"));
}

#[test]
fn os_change_after_initialize_marks_surface_without_storage() {
    let (mut controller, store, os) = fixture(None, false);
    controller.initialize().unwrap();
    assert_eq!(controller.appearance(), ColorMode::Light);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = controller.subscribe_to_system_changes(move |mode| sink.lock().unwrap().push(mode));

    os.set_prefers_dark(true);

    assert_eq!(*seen.lock().unwrap(), vec![ColorMode::Dark]);
    assert_eq!(controller.appearance(), ColorMode::Dark);
    assert!(store.is_empty());
}

#[test]
fn os_change_overrides_rendered_concrete_choice_but_not_storage() {
    let (mut controller, store, os) = fixture(Some("light"), false);
    controller.initialize().unwrap();

    os.set_prefers_dark(true);

    assert_eq!(controller.appearance(), ColorMode::Dark);
    assert_eq!(store.get("theme").as_deref(), Some("light"));
}

#[test]
fn file_store_survives_a_new_session() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");

    let first = ThemeController::new(FileStore::new(&path), ClassList::new(), ManualSignal::new(false));
    first.apply(ThemePreference::Dark).unwrap();

    let mut second =
        ThemeController::new(FileStore::new(&path), ClassList::new(), ManualSignal::new(false));
    assert_eq!(second.initialize().unwrap(), ThemePreference::Dark);
    assert_eq!(second.appearance(), ColorMode::Dark);

    second.select(ThemePreference::System).unwrap();
    assert_eq!(FileStore::new(&path).load("theme").unwrap(), None);
    assert_eq!(second.appearance(), ColorMode::Light);
}

#[test]
fn file_store_with_mixed_value_types_keeps_preference_and_siblings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, r#"{"theme":"light","count":3}"#).unwrap();

    let mut controller =
        ThemeController::new(FileStore::new(&path), ClassList::new(), ManualSignal::new(true));
    assert_eq!(controller.initialize().unwrap(), ThemePreference::Light);
    assert_eq!(controller.appearance(), ColorMode::Light);

    assert_eq!(controller.toggle().unwrap(), ColorMode::Dark);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["theme"], "dark");
    assert_eq!(written["count"], 3);
}

proptest! {
    #[test]
    fn toggle_never_yields_system(start_dark in any::<bool>(), os_dark in any::<bool>(), flips in 1usize..8) {
        let (controller, store, _) = fixture(None, os_dark);
        controller.surface().mark(ColorMode::from_prefers_dark(start_dark));

        let mut expected = ColorMode::from_prefers_dark(start_dark);
        for _ in 0..flips {
            expected = expected.flipped();
            prop_assert_eq!(controller.toggle().unwrap(), expected);
        }
        let stored = store.get("theme");
        prop_assert_eq!(stored.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn arbitrary_stored_strings_never_escape_the_enum(raw in ".*", os_dark in any::<bool>()) {
        let (controller, _, _) = fixture(Some(raw.as_str()), os_dark);
        let preference = controller.preference().unwrap();
        prop_assert!(ThemePreference::ALL.contains(&preference));
        if ThemePreference::parse(&raw).is_none() {
            prop_assert_eq!(preference, ThemePreference::System);
            prop_assert_eq!(controller.appearance(), ColorMode::from_prefers_dark(os_dark));
        }
    }
}
