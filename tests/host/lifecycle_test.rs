/*!
 * Host Lifecycle Tests
 * Launch, teardown and refresh through the AppHost facade
 */

use app_sandbox::resources::CleanupSummary;
use app_sandbox::{
    AccountingMode, AppDescriptor, AppHost, DomEvent, KeyInput, ListenerOptions, ListenerTarget,
    ShortcutTable, StaticDirectory, SystemReport,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn host() -> AppHost {
    let directory = StaticDirectory::new(vec![
        AppDescriptor::builtin("notes", "Notes"),
        AppDescriptor::user_app("x", "X"),
    ]);
    AppHost::builder().with_directory(directory).build().unwrap()
}

/// Three timers and two global listeners owned by a user app
fn busy_user_app(host: &AppHost, fired: &Arc<AtomicUsize>) -> app_sandbox::AppId {
    let app = host.launch_by_id("x").unwrap();
    let accountant = host.accountant(&app).unwrap();
    let tracked = accountant.as_tracked().unwrap();

    for period in [10, 20] {
        let fired = fired.clone();
        tracked.set_interval(
            Box::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            }),
            Duration::from_millis(period),
        );
    }
    let fired_once = fired.clone();
    tracked.set_timeout(
        Box::new(move || {
            fired_once.fetch_add(1, Ordering::SeqCst);
        }),
        Duration::from_millis(50),
    );

    for (target, event_type) in [
        (ListenerTarget::Window, "resize"),
        (ListenerTarget::Document, "visibilitychange"),
    ] {
        let handler = Arc::new(|_: &DomEvent| {});
        tracked
            .add_event_listener(target, event_type, handler, ListenerOptions::default())
            .unwrap();
    }
    app
}

#[test]
fn test_hook_order() {
    let host = host();
    assert_eq!(
        host.hooks().registered_names(),
        vec!["namespace", "resources", "shortcuts"]
    );
}

#[test]
fn test_launch_selects_accounting_mode() {
    let host = host();
    let notes = host.launch_by_id("notes").unwrap();
    let x = host.launch_by_id("x").unwrap();

    assert_eq!(host.resources().mode(&notes), Some(AccountingMode::Cooperative));
    assert_eq!(host.resources().mode(&x), Some(AccountingMode::Tracked));
    assert!(host.namespaces().is_tracked(&notes));
    assert!(host.runtime().render.app_root(&x).is_some());
    assert_eq!(host.running_apps().len(), 2);
    assert!(host.launch_by_id("missing").is_err());
}

#[test]
fn test_destroy_releases_everything() {
    let host = host();
    let fired = Arc::new(AtomicUsize::new(0));
    let app = busy_user_app(&host, &fired);

    let proxy = host.acquire_namespace(&app).unwrap();
    proxy.set("xState", json!({"open": true})).unwrap();
    host.register_shortcuts(
        &app,
        ShortcutTable::new().bind("ctrl+q", |_| Ok(())).unwrap(),
        None,
    );
    let global_before = host.runtime().events.global_listener_count();

    let report = host.destroy(&app);

    assert!(report.is_success());
    assert_eq!(report.freed("timers"), 3);
    assert_eq!(report.freed("listeners"), 2);
    assert_eq!(report.freed("properties"), 1);
    assert_eq!(report.freed("shortcuts"), 1);

    assert_eq!(host.resources().timer_count(&app), None);
    assert_eq!(host.resources().event_listener_count(&app), None);
    assert!(!host.runtime().namespace.contains("xState"));
    assert!(!host.shortcuts().is_registered(&app));
    assert!(!host.namespaces().is_tracked(&app));
    assert!(host.runtime().render.app_root(&app).is_none());
    assert_eq!(host.runtime().events.global_listener_count(), global_before - 2);

    assert_eq!(host.tick(Duration::from_secs(1)), 0);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn test_monitor_cleanup_summary() {
    let host = host();
    let fired = Arc::new(AtomicUsize::new(0));
    let app = busy_user_app(&host, &fired);

    assert_eq!(host.resources().timer_count(&app), Some(3));
    assert_eq!(host.resources().event_listener_count(&app), Some(2));

    let summary = host.resources().cleanup(&app).unwrap();
    assert_eq!(
        summary,
        CleanupSummary {
            timers: 3,
            listeners: 2,
            errors: 0,
        }
    );
    assert!(host.resources().cleanup(&app).is_none());
    assert_eq!(host.runtime().timers.pending(), 0);
}

#[test]
fn test_destroy_unknown_app_is_empty() {
    let host = host();
    let app = host.launch_by_id("notes").unwrap();
    host.destroy(&app);

    let again = host.destroy(&app);
    assert_eq!(again.stats.resources_freed, 0);
    assert!(again.stats.by_type.is_empty());
    assert!(again.is_success());
}

#[test]
fn test_destroyed_app_stops_receiving_shortcuts() {
    let host = host();
    let app = host.launch_by_id("notes").unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    host.register_shortcuts(
        &app,
        ShortcutTable::new()
            .bind("ctrl+s", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap(),
        None,
    );
    host.focus(&app);
    assert!(host.press_key(KeyInput::new("s").ctrl()).default_prevented());

    host.minimize(&app);
    assert!(!host.press_key(KeyInput::new("s").ctrl()).default_prevented());
    host.restore(&app);

    host.destroy(&app);
    let event = host.press_key(KeyInput::new("s").ctrl());
    assert!(!event.default_prevented());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(host.shortcut_stats().registered_apps, 0);
}

#[tokio::test]
async fn test_host_refresh_reports_running_apps() {
    let host = host();
    let notes = host.launch_by_id("notes").unwrap();
    let x = host.launch_by_id("x").unwrap();
    host.create_tracked_timer(&notes, Box::new(|| {}), 100, true).unwrap();
    host.create_tracked_timer(&x, Box::new(|| {}), 100, false).unwrap();

    let renders = AtomicUsize::new(0);
    let report = host
        .refresh(&|_: &SystemReport| {
            renders.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

    assert_eq!(renders.load(Ordering::SeqCst), 1);
    assert_eq!(report.aggregate.running_apps, 2);
    assert_eq!(report.aggregate.total_apps, 2);
    assert_eq!(report.aggregate.total_timers, 2);
    assert_eq!(report.apps.len(), 2);
    assert!(report.apps.iter().any(|row| row.name == "Notes"));
}
