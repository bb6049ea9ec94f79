/*!
 * Editor Shortcut Scenario
 * Save shortcut fires only while the editor is the visible foreground app
 */

use app_sandbox::keyboard::{ShortcutConfig, ShortcutRouter, ShortcutTable};
use app_sandbox::lifecycle::CleanupHookRegistry;
use app_sandbox::runtime::{EventBus, WindowState};
use app_sandbox::{AppId, DomEvent, KeyInput};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_editor_save_scenario() {
    let events = EventBus::new();
    let window = WindowState::new();
    let router = ShortcutRouter::install(
        &events,
        Arc::new(window.clone()),
        ShortcutConfig::default(),
        &CleanupHookRegistry::new(),
    )
    .unwrap();

    let editor = AppId::from("editor");
    let saves = Arc::new(AtomicUsize::new(0));
    let save = {
        let saves = saves.clone();
        move |_: &DomEvent| -> anyhow::Result<()> {
            saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    };
    router.register_app(&editor, ShortcutTable::new().bind("ctrl+s", save).unwrap(), None);

    window.set_active(Some(editor.clone()));
    let first = DomEvent::keydown(KeyInput::new("s").ctrl());
    events.dispatch(&first);
    assert_eq!(saves.load(Ordering::SeqCst), 1);
    assert!(first.default_prevented());

    window.minimize(&editor);
    let second = DomEvent::keydown(KeyInput::new("s").ctrl());
    events.dispatch(&second);
    assert_eq!(saves.load(Ordering::SeqCst), 1);
    assert!(!second.default_prevented());
}
