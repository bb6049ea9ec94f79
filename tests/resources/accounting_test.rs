/*!
 * Resource Accounting Tests
 * Variant selection, listener scoping and derived metrics
 */

use app_sandbox::lifecycle::CleanupHookRegistry;
use app_sandbox::resources::{
    AccountingMode, CleanupSummary, ResourceAccounting, ResourceMonitor, SystemAggregate,
};
use app_sandbox::runtime::events::EventHandler;
use app_sandbox::runtime::{
    ConnectionState, HostRuntime, ListenerOptions, ListenerTarget, TimerKind,
};
use app_sandbox::{AppDescriptor, AppId, DomEvent};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn monitor() -> (ResourceMonitor, HostRuntime) {
    let runtime = HostRuntime::new();
    (ResourceMonitor::new(runtime.clone(), &CleanupHookRegistry::new()), runtime)
}

fn noop() -> EventHandler {
    Arc::new(|_: &DomEvent| {})
}

#[test]
fn test_clear_timer_ignores_kind() {
    let (monitor, _) = monitor();
    let app = AppId::from("weather-1");
    let acc = monitor.attach(&app, &AppDescriptor::user_app("weather", "Weather"));

    acc.track_timer(7, TimerKind::Interval);
    acc.track_timer(8, TimerKind::Timeout);
    assert!(acc.clear_timer(7));
    assert!(acc.clear_timer(8));
    assert!(!acc.clear_timer(8));
    assert_eq!(acc.timer_count(), 0);
}

#[test]
fn test_private_subtree_listeners_are_excluded() {
    let (monitor, runtime) = monitor();
    let app = AppId::from("chat-1");
    let acc = monitor.attach(&app, &AppDescriptor::user_app("chat", "Chat"));
    let root = runtime.render.mount_app_root(&app);
    let button = runtime.render.append(root, "button").unwrap();

    let tracked = acc.as_tracked().unwrap();
    tracked
        .add_event_listener(
            ListenerTarget::Element(button),
            "click",
            noop(),
            ListenerOptions::default(),
        )
        .unwrap();
    tracked
        .add_event_listener(
            ListenerTarget::Document,
            "visibilitychange",
            noop(),
            ListenerOptions::default(),
        )
        .unwrap();
    tracked
        .add_event_listener(ListenerTarget::Window, "resize", noop(), ListenerOptions::capture())
        .unwrap();

    assert_eq!(acc.event_listener_count(), 2);
    assert!(!acc.track_event_listener(
        ListenerTarget::Element(root),
        "input",
        999,
        ListenerOptions::default()
    ));
    assert_eq!(acc.event_listener_count(), 2);
}

#[test]
fn test_capture_flag_must_match_on_removal() {
    let (monitor, runtime) = monitor();
    let app = AppId::from("chat-1");
    let acc = monitor.attach(&app, &AppDescriptor::user_app("chat", "Chat"));
    let tracked = acc.as_tracked().unwrap();
    let id = tracked
        .add_event_listener(ListenerTarget::Window, "scroll", noop(), ListenerOptions::capture())
        .unwrap();

    assert!(tracked
        .remove_event_listener(ListenerTarget::Window, "scroll", id, ListenerOptions::default())
        .is_err());
    assert_eq!(acc.event_listener_count(), 1);

    tracked
        .remove_event_listener(ListenerTarget::Window, "scroll", id, ListenerOptions::capture())
        .unwrap();
    assert_eq!(acc.event_listener_count(), 0);
    assert_eq!(runtime.events.global_listener_count(), 0);
}

#[test]
fn test_cleanup_logs_failed_removal_and_continues() {
    let (monitor, runtime) = monitor();
    let app = AppId::from("chat-1");
    let acc = monitor.attach(&app, &AppDescriptor::user_app("chat", "Chat"));
    let tracked = acc.as_tracked().unwrap();
    let id = tracked
        .add_event_listener(ListenerTarget::Document, "keyup", noop(), ListenerOptions::default())
        .unwrap();
    tracked
        .add_event_listener(ListenerTarget::Window, "focus", noop(), ListenerOptions::default())
        .unwrap();

    // Removed behind the accountant's back
    runtime
        .events
        .remove_listener(ListenerTarget::Document, "keyup", id, ListenerOptions::default())
        .unwrap();

    let summary = monitor.cleanup(&app).unwrap();
    assert_eq!(summary, CleanupSummary { timers: 0, listeners: 2, errors: 1 });
    assert_eq!(runtime.events.global_listener_count(), 0);
}

#[test]
fn test_cooperative_metrics() {
    let (monitor, runtime) = monitor();
    let app = AppId::from("files-1");
    let acc = monitor.attach(&app, &AppDescriptor::builtin("files", "Files"));
    assert_eq!(acc.mode(), AccountingMode::Cooperative);

    let root = runtime.render.mount_app_root(&app);
    let toolbar = runtime.render.append(root, "div").unwrap();
    runtime.render.append(toolbar, "button").unwrap();
    runtime.render.append(toolbar, "a").unwrap();
    let row = runtime.render.append(root, "li").unwrap();
    runtime.render.set_attribute(row, "onDblClick", "open()");
    runtime.network.open(&app, "wss://sync.local");
    let live = runtime.network.open(&app, "wss://sync.local/2");
    runtime.network.set_state(live, ConnectionState::Open);

    let snapshot = monitor.snapshot(&app).unwrap();
    assert_eq!(snapshot.rendered_elements, 4);
    assert_eq!(snapshot.estimated_listeners, Some(3));
    assert_eq!(snapshot.global_event_listeners, 0);
    assert_eq!(snapshot.network.handles, 2);
    assert!(snapshot.network.connected);
    assert_eq!(monitor.aggregate().total_global_events, 3);
}

#[test]
fn test_aggregate_is_sum_of_live_apps() {
    let (monitor, runtime) = monitor();
    let a = AppId::from("a-1");
    let b = AppId::from("b-1");
    monitor.attach(&a, &AppDescriptor::user_app("a", "A"));
    monitor.attach(&b, &AppDescriptor::builtin("b", "B"));
    let root = runtime.render.mount_app_root(&a);
    runtime.render.append(root, "p").unwrap();

    monitor.create_tracked_timer(&a, Box::new(|| {}), 100, true).unwrap();
    monitor.create_tracked_timer(&b, Box::new(|| {}), 100, false).unwrap();
    monitor.create_tracked_timer(&b, Box::new(|| {}), 200, true).unwrap();
    monitor
        .accountant(&a)
        .unwrap()
        .as_tracked()
        .unwrap()
        .add_event_listener(
            ListenerTarget::Document,
            "paste",
            noop(),
            ListenerOptions::default(),
        )
        .unwrap();

    assert_eq!(
        monitor.aggregate(),
        SystemAggregate {
            running_apps: 2,
            total_apps: 2,
            total_rendered_elements: 1,
            total_timers: 3,
            total_global_events: 1,
        }
    );

    monitor.cleanup(&b);
    let aggregate = monitor.aggregate();
    assert_eq!(aggregate.running_apps, 1);
    assert_eq!(aggregate.total_timers, 1);
}
