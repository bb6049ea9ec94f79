/*!
 * Namespace Ownership Tests
 * Proxy identity, release semantics and receiver binding
 */

use app_sandbox::lifecycle::CleanupHookRegistry;
use app_sandbox::runtime::GlobalNamespace;
use app_sandbox::sandbox::{NamespaceTracker, Resolved};
use app_sandbox::{AppId, NamespaceError};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

fn tracker_with(bound: &[&str]) -> NamespaceTracker {
    let bound: Vec<String> = bound.iter().map(|s| s.to_string()).collect();
    NamespaceTracker::new(GlobalNamespace::new(), &bound, &CleanupHookRegistry::new())
}

#[test]
fn test_acquire_twice_returns_same_handle() {
    let tracker = tracker_with(&[]);
    let app = AppId::from("paint-1");

    let first = tracker.acquire(&app).unwrap();
    let second = tracker.acquire(&app).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    first.set_value("brush", json!("round")).unwrap();
    assert_eq!(second.get_value("brush"), Some(json!("round")));
    assert!(second.owns("brush"));
}

#[test]
fn test_release_twice_is_safe() {
    let tracker = tracker_with(&[]);
    let app = AppId::from("paint-1");
    let proxy = tracker.acquire(&app).unwrap();
    proxy.set_value("a", 1).unwrap();
    proxy.set_value("b", 2).unwrap();

    assert_eq!(tracker.release(&app).deleted, 2);
    assert_eq!(tracker.release(&app).deleted, 0);
    assert!(tracker.global().is_empty());
}

#[test]
fn test_release_without_acquire_is_noop() {
    let tracker = tracker_with(&[]);
    tracker.global().set("hostOnly", json!(true)).unwrap();

    let summary = tracker.release(&AppId::from("ghost-1"));
    assert_eq!(summary.deleted, 0);
    assert_eq!(summary.failed, 0);
    assert!(tracker.global().contains("hostOnly"));
}

#[test]
fn test_unrecorded_properties_survive_release() {
    let tracker = tracker_with(&[]);
    let global = tracker.global().clone();
    global.set("desktopTheme", json!("light")).unwrap();

    let app = AppId::from("music-1");
    let proxy = tracker.acquire(&app).unwrap();
    proxy.set_value("player", json!({"volume": 3})).unwrap();

    // Bypassing the proxy is invisible to tracking
    global.set("leaked", json!(1)).unwrap();

    tracker.release(&app);
    assert!(!global.contains("player"));
    assert!(global.contains("desktopTheme"));
    assert!(global.contains("leaked"));
}

#[test]
fn test_delete_through_proxy_drops_ownership() {
    let tracker = tracker_with(&[]);
    let app = AppId::from("music-1");
    let proxy = tracker.acquire(&app).unwrap();
    proxy.set_value("cache", json!([])).unwrap();
    proxy.delete("cache").unwrap();

    // Another writer re-creates the name directly; release must not touch it
    tracker.global().set("cache", json!("host")).unwrap();
    tracker.release(&app);
    assert_eq!(tracker.global().get_value("cache"), Some(json!("host")));
}

#[test]
fn test_failed_delete_does_not_stop_release() {
    let tracker = tracker_with(&[]);
    tracker.global().define_locked("frozen", json!(0)).unwrap();

    let app = AppId::from("calc-1");
    let proxy = tracker.acquire(&app).unwrap();
    for name in ["m1", "frozen", "m2", "m3"] {
        proxy.set_value(name, json!(null)).unwrap();
    }

    let summary = tracker.release(&app);
    assert_eq!(summary.deleted, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(tracker.global().keys(), vec!["frozen".to_string()]);
    assert!(!tracker.is_tracked(&app));
}

#[test]
fn test_bound_globals_keep_real_receiver() {
    let tracker = tracker_with(&["fetch"]);
    let global = tracker.global().clone();
    let real = global.clone();
    global
        .define_native("fetch", move |this, args| {
            if !this.ptr_eq(&real) {
                return Err(NamespaceError::CallFailed {
                    name: "fetch".into(),
                    reason: "Illegal invocation".into(),
                });
            }
            Ok(args.first().cloned().unwrap_or(Value::Null))
        })
        .unwrap();

    let proxy = tracker.acquire(&AppId::from("browser-1")).unwrap();
    let Some(Resolved::Bound(fetch)) = proxy.get("fetch") else {
        panic!("fetch should resolve pre-bound");
    };
    assert_eq!(fetch.call(&[json!("/api/apps")]).unwrap(), json!("/api/apps"));
    assert_eq!(proxy.call("fetch", &[json!(1)]).unwrap(), json!(1));
}

#[test]
fn test_invalid_property_name_is_not_recorded() {
    let tracker = tracker_with(&[]);
    let proxy = tracker.acquire(&AppId::from("x-1")).unwrap();
    assert!(matches!(
        proxy.set_value("", 1),
        Err(NamespaceError::InvalidProperty(_))
    ));
    assert_eq!(proxy.owned_count(), 0);
}
