/*!
 * Tracked Accountant
 * Full interception of timer and listener creation for untrusted applications
 */

use super::accountant::ResourceAccounting;
use super::ledger::Ledger;
use super::types::{AccountingMode, CleanupSummary, DerivedMetrics};
use crate::core::types::{AppId, ListenerId, SandboxResult, TimerHandle};
use crate::runtime::events::{EventHandler, ListenerOptions, ListenerTarget};
use crate::runtime::timers::{TimerCallback, TimerKind};
use crate::runtime::HostRuntime;
use std::time::Duration;

/// Accountant whose applications only reach timers and listeners through it
///
/// Every creation call is forwarded to the real runtime and recorded, so
/// counts are exact.
pub struct TrackedAccountant {
    ledger: Ledger,
}

impl TrackedAccountant {
    pub fn new(app: AppId, runtime: HostRuntime) -> Self {
        Self {
            ledger: Ledger::new(app, runtime),
        }
    }

    pub fn set_timeout(&self, callback: TimerCallback, delay: Duration) -> TimerHandle {
        self.ledger.schedule_timer(TimerKind::Timeout, callback, delay)
    }

    pub fn set_interval(&self, callback: TimerCallback, period: Duration) -> TimerHandle {
        self.ledger.schedule_timer(TimerKind::Interval, callback, period)
    }

    pub fn clear_timeout(&self, handle: TimerHandle) -> bool {
        self.ledger.cancel_timer(handle, TimerKind::Timeout)
    }

    pub fn clear_interval(&self, handle: TimerHandle) -> bool {
        self.ledger.cancel_timer(handle, TimerKind::Interval)
    }

    /// Attach a listener on the real target. Only document and window
    /// subscriptions are counted.
    pub fn add_event_listener(
        &self,
        target: ListenerTarget,
        event_type: &str,
        handler: EventHandler,
        options: ListenerOptions,
    ) -> SandboxResult<ListenerId> {
        self.ledger.attach_listener(target, event_type, handler, options)
    }

    pub fn remove_event_listener(
        &self,
        target: ListenerTarget,
        event_type: &str,
        listener: ListenerId,
        options: ListenerOptions,
    ) -> SandboxResult<()> {
        self.ledger
            .detach_listener(target, event_type, listener, options)
    }
}

impl ResourceAccounting for TrackedAccountant {
    fn app_id(&self) -> &AppId {
        self.ledger.app()
    }

    fn mode(&self) -> AccountingMode {
        AccountingMode::Tracked
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
        self.ledger.base_metrics()
    }

    fn cleanup(&self) -> CleanupSummary {
        self.ledger.cleanup()
    }
}
