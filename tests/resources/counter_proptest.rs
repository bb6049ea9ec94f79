/*!
 * Resource Counter Property Tests
 * Counts follow track and clear calls exactly
 */

use app_sandbox::resources::{AppAccountant, CleanupSummary, ResourceAccounting};
use app_sandbox::runtime::events::EventHandler;
use app_sandbox::runtime::{HostRuntime, ListenerOptions, ListenerTarget, TimerKind};
use app_sandbox::{AccountingMode, AppId, DomEvent};
use proptest::prelude::*;
use std::sync::Arc;

fn noop() -> EventHandler {
    Arc::new(|_: &DomEvent| {})
}

proptest! {
    #[test]
    fn test_counts_are_tracked_minus_cleared(
        timers in 0usize..40,
        cleared_timers in 0usize..40,
        listeners in 0usize..20,
        cleared_listeners in 0usize..20,
        stray_clears in 0usize..5,
        interval_mask in any::<u64>(),
    ) {
        let runtime = HostRuntime::new();
        let acc = AppAccountant::new(AppId::from("p-1"), AccountingMode::Tracked, runtime.clone());
        let tracked = acc.as_tracked().unwrap();

        for handle in 0..timers as u64 {
            let kind = TimerKind::from_interval_flag(interval_mask & (1 << (handle % 64)) != 0);
            acc.track_timer(handle + 1, kind);
        }
        let cleared_timers = cleared_timers.min(timers);
        for handle in 0..cleared_timers as u64 {
            prop_assert!(acc.clear_timer(handle + 1));
        }
        for stray in 0..stray_clears as u64 {
            prop_assert!(!acc.clear_timer(10_000 + stray));
        }

        let mut ids = Vec::new();
        for i in 0..listeners {
            let target = if i % 2 == 0 { ListenerTarget::Document } else { ListenerTarget::Window };
            let id = tracked
                .add_event_listener(target, "message", noop(), ListenerOptions::default())
                .unwrap();
            ids.push((target, id));
        }
        let cleared_listeners = cleared_listeners.min(listeners);
        for (target, id) in ids.iter().take(cleared_listeners) {
            tracked
                .remove_event_listener(*target, "message", *id, ListenerOptions::default())
                .unwrap();
        }

        prop_assert_eq!(acc.timer_count(), timers - cleared_timers);
        prop_assert_eq!(acc.event_listener_count(), listeners - cleared_listeners);

        let summary = acc.cleanup();
        prop_assert_eq!(summary, CleanupSummary {
            timers: timers - cleared_timers,
            listeners: listeners - cleared_listeners,
            errors: 0,
        });
        prop_assert_eq!(acc.timer_count(), 0);
        prop_assert_eq!(acc.event_listener_count(), 0);
        prop_assert_eq!(runtime.events.global_listener_count(), 0);
    }
}
