/*!
 * Namespace Ownership Property Tests
 * Release removes exactly what an application wrote
 */

use app_sandbox::lifecycle::CleanupHookRegistry;
use app_sandbox::runtime::GlobalNamespace;
use app_sandbox::sandbox::NamespaceTracker;
use app_sandbox::AppId;
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;

const HOST_PROPERTIES: &[&str] = &["HOST_TITLE", "HOST_LOCALE", "HOST_USER"];

fn write_set() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[a-f]{1,3}", 0..24)
}

proptest! {
    #[test]
    fn test_release_is_disjoint(a_writes in write_set(), b_writes in write_set()) {
        let global = GlobalNamespace::new();
        for name in HOST_PROPERTIES {
            global.set(name, json!("host")).unwrap();
        }
        let tracker = NamespaceTracker::new(global.clone(), &[], &CleanupHookRegistry::new());

        let a = AppId::from("a-1");
        let b = AppId::from("b-1");
        let proxy_a = tracker.acquire(&a).unwrap();
        let proxy_b = tracker.acquire(&b).unwrap();
        for name in &a_writes {
            proxy_a.set_value(name, json!("a")).unwrap();
        }
        for name in &b_writes {
            proxy_b.set_value(name, json!("b")).unwrap();
        }

        tracker.release(&a);

        for name in &a_writes {
            prop_assert!(!global.contains(name), "{} written by a survived", name);
        }
        for name in b_writes.difference(&a_writes) {
            prop_assert!(global.contains(name), "{} written only by b was removed", name);
        }
        for name in HOST_PROPERTIES {
            prop_assert!(global.contains(name));
        }

        tracker.release(&b);
        let remaining: BTreeSet<String> = global.keys().into_iter().collect();
        let host: BTreeSet<String> = HOST_PROPERTIES.iter().map(|s| s.to_string()).collect();
        prop_assert_eq!(remaining, host);
    }
}
