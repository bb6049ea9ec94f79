/*!
 * Shortcut Routing Tests
 * Foreground-only dispatch against a mocked window manager
 */

use app_sandbox::keyboard::{
    DispatchOutcome, KeyCombo, ShortcutConfig, ShortcutRouter, ShortcutTable,
};
use app_sandbox::lifecycle::CleanupHookRegistry;
use app_sandbox::runtime::{EventBus, ForegroundState, ListenerTarget};
use app_sandbox::{AppId, DomEvent, KeyInput, ListenerOptions};
use mockall::mock;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mock! {
    pub Foreground {}

    impl ForegroundState for Foreground {
        fn active_app(&self) -> Option<AppId>;
        fn is_minimized(&self, app: &AppId) -> bool;
    }
}

fn foreground(active: Option<&str>, minimized: bool) -> Arc<MockForeground> {
    let mut mock = MockForeground::new();
    mock.expect_active_app().return_const(active.map(AppId::from));
    mock.expect_is_minimized().return_const(minimized);
    Arc::new(mock)
}

fn counting_table(combo: &str, hits: &Arc<AtomicUsize>) -> ShortcutTable {
    let hits = Arc::clone(hits);
    ShortcutTable::new()
        .bind(combo, move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap()
}

fn install(fg: Arc<MockForeground>) -> (ShortcutRouter, EventBus) {
    let events = EventBus::new();
    let router =
        ShortcutRouter::install(&events, fg, ShortcutConfig::default(), &CleanupHookRegistry::new())
            .unwrap();
    (router, events)
}

#[test]
fn test_background_app_never_receives_keys() {
    let (router, events) = install(foreground(Some("a"), false));
    let a_hits = Arc::new(AtomicUsize::new(0));
    let b_hits = Arc::new(AtomicUsize::new(0));
    router.register_app(&AppId::from("a"), counting_table("ctrl+s", &a_hits), None);
    router.register_app(&AppId::from("b"), counting_table("ctrl+b", &b_hits), None);

    let event = DomEvent::keydown(KeyInput::new("b").ctrl());
    events.dispatch(&event);

    assert_eq!(b_hits.load(Ordering::SeqCst), 0);
    assert_eq!(a_hits.load(Ordering::SeqCst), 0);
    assert!(!event.default_prevented());
    assert_eq!(
        router.handle_keydown(&event),
        DispatchOutcome::Unmapped {
            app: AppId::from("a"),
            combo: "ctrl+b".parse().unwrap(),
        }
    );
}

#[test]
fn test_minimized_foreground_is_skipped() {
    let (router, events) = install(foreground(Some("a"), true));
    let hits = Arc::new(AtomicUsize::new(0));
    router.register_app(&AppId::from("a"), counting_table("ctrl+s", &hits), None);

    let event = DomEvent::keydown(KeyInput::new("s").ctrl());
    events.dispatch(&event);

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(!event.default_prevented());
    assert_eq!(
        router.handle_keydown(&event),
        DispatchOutcome::Minimized(AppId::from("a"))
    );
}

#[test]
fn test_no_foreground_is_skipped() {
    let (router, _) = install(foreground(None, false));
    router.register_app(&AppId::from("a"), ShortcutTable::new(), None);
    let outcome = router.handle_keydown(&DomEvent::keydown(KeyInput::new("s").ctrl()));
    assert_eq!(outcome, DispatchOutcome::NoForeground);
}

#[test]
fn test_unregistered_foreground_is_skipped() {
    let (router, _) = install(foreground(Some("c"), false));
    let outcome = router.handle_keydown(&DomEvent::keydown(KeyInput::new("s").ctrl()));
    assert_eq!(outcome, DispatchOutcome::NotRegistered(AppId::from("c")));
}

#[test]
fn test_modifier_order_is_irrelevant() {
    let (router, events) = install(foreground(Some("a"), false));
    let hits = Arc::new(AtomicUsize::new(0));
    router.register_app(&AppId::from("a"), counting_table("shift+ctrl+S", &hits), None);

    let pressed = KeyInput::new("S").shift().ctrl();
    assert_eq!(KeyCombo::from_input(&pressed).canonical(), "ctrl+shift+s");
    assert_eq!(
        KeyCombo::from_input(&KeyInput::new("s").ctrl().shift()),
        KeyCombo::from_input(&pressed)
    );

    events.dispatch(&DomEvent::keydown(pressed));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_routing_flags_per_app() {
    let (router, events) = install(foreground(Some("a"), false));
    let hits = Arc::new(AtomicUsize::new(0));
    router.register_app(
        &AppId::from("a"),
        counting_table("f5", &hits),
        Some(ShortcutConfig {
            prevent_default: false,
            stop_propagation: true,
        }),
    );

    // A window listener would normally see the keydown after the document
    let reached_window = Arc::new(AtomicUsize::new(0));
    let seen = reached_window.clone();
    events
        .add_listener(
            ListenerTarget::Window,
            "keydown",
            Arc::new(move |_: &DomEvent| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
            ListenerOptions::default(),
        )
        .unwrap();

    let event = DomEvent::keydown(KeyInput::new("F5"));
    events.dispatch(&event);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!event.default_prevented());
    assert!(event.propagation_stopped());
    assert_eq!(reached_window.load(Ordering::SeqCst), 0);
}

#[test]
fn test_stats_and_cleanup_hook() {
    let hooks = CleanupHookRegistry::new();
    let events = EventBus::new();
    let router = ShortcutRouter::install(
        &events,
        foreground(Some("a"), false),
        ShortcutConfig::default(),
        &hooks,
    )
    .unwrap();
    let table = ShortcutTable::new()
        .bind("ctrl+s", |_| Ok(()))
        .unwrap()
        .bind("ctrl+o", |_| Ok(()))
        .unwrap();
    router.register_app(&AppId::from("a"), table, None);
    let other = ShortcutTable::new().bind("alt+x", |_| Ok(())).unwrap();
    router.register_app(&AppId::from("b"), other, None);

    let stats = router.stats();
    assert_eq!(stats.registered_apps, 2);
    assert_eq!(stats.total_shortcuts, 3);
    assert_eq!(stats.active_app, Some(AppId::from("a")));

    let report = hooks.run(&AppId::from("a"));
    assert_eq!(report.freed("shortcuts"), 2);
    assert!(!router.is_registered(&AppId::from("a")));
    assert_eq!(router.stats().total_shortcuts, 1);
}
