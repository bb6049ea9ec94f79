/*!
 * Cooperative Accountant
 * Manual accounting for trusted built-in applications
 */

use super::accountant::ResourceAccounting;
use super::ledger::Ledger;
use super::types::{AccountingMode, CleanupSummary, DerivedMetrics};
use crate::core::types::{AppId, ListenerId, TimerHandle};
use crate::runtime::events::{ListenerOptions, ListenerTarget};
use crate::runtime::timers::{TimerCallback, TimerKind};
use crate::runtime::HostRuntime;
use std::time::Duration;

/// Accountant for applications that create timers through explicit calls
///
/// Nothing is intercepted, so listener counts are approximated from the
/// interactive elements the application has rendered.
pub struct CooperativeAccountant {
    ledger: Ledger,
}

impl CooperativeAccountant {
    pub fn new(app: AppId, runtime: HostRuntime) -> Self {
        Self {
            ledger: Ledger::new(app, runtime),
        }
    }

    pub fn create_tracked_timer(
        &self,
        callback: TimerCallback,
        delay_ms: u64,
        is_interval: bool,
    ) -> TimerHandle {
        self.ledger.schedule_timer(
            TimerKind::from_interval_flag(is_interval),
            callback,
            Duration::from_millis(delay_ms),
        )
    }

    pub fn clear_tracked_timer(&self, handle: TimerHandle, is_interval: bool) -> bool {
        self.ledger
            .cancel_timer(handle, TimerKind::from_interval_flag(is_interval))
    }

    /// Best-effort listener estimate: interactive elements plus elements with
    /// inline `on*` handler attributes
    pub fn estimated_listeners(&self) -> usize {
        self.ledger
            .runtime()
            .render
            .count_interactive(self.ledger.app())
            .unwrap_or(0)
    }
}

impl ResourceAccounting for CooperativeAccountant {
    fn app_id(&self) -> &AppId {
        self.ledger.app()
    }

    fn mode(&self) -> AccountingMode {
        AccountingMode::Cooperative
    }

    fn track_timer(&self, handle: TimerHandle, kind: TimerKind) {
        self.ledger.track_timer(handle, kind)
    }

    fn clear_timer(&self, handle: TimerHandle) -> bool {
        self.ledger.clear_timer(handle)
    }

    fn track_event_listener(
        &self,
        target: ListenerTarget,
        event_type: &str,
        listener: ListenerId,
        options: ListenerOptions,
    ) -> bool {
        self.ledger
            .track_listener(target, event_type, listener, options)
    }

    fn timer_count(&self) -> usize {
        self.ledger.timer_count()
    }

    fn event_listener_count(&self) -> usize {
        self.ledger.listener_count()
    }

    fn derived_metrics(&self) -> DerivedMetrics {
        DerivedMetrics {
            interactive_estimate: Some(self.estimated_listeners()),
            ..self.ledger.base_metrics()
        }
    }

    fn cleanup(&self) -> CleanupSummary {
        self.ledger.cleanup()
    }
}
