/*!
 * Resource Accounting
 * One interface over the tracked and cooperative accounting variants
 */

use super::cooperative::CooperativeAccountant;
use super::tracked::TrackedAccountant;
use super::types::{AccountingMode, CleanupSummary, DerivedMetrics, ResourceSnapshot};
use crate::core::types::{AppId, ListenerId, TimerHandle};
use crate::runtime::events::{ListenerOptions, ListenerTarget};
use crate::runtime::timers::{TimerCallback, TimerKind};
use crate::runtime::HostRuntime;
use std::time::Duration;

/// Per-application resource bookkeeping
pub trait ResourceAccounting: Send + Sync {
    fn app_id(&self) -> &AppId;

    fn mode(&self) -> AccountingMode;

    /// Record a timer under its kind
    fn track_timer(&self, handle: TimerHandle, kind: TimerKind);

    /// Forget a timer whatever its kind. Unknown handles are ignored.
    fn clear_timer(&self, handle: TimerHandle) -> bool;

    /// Record a subscription. Returns false when the target is not the shared
    /// document or window; such listeners are not system-wide resources.
    fn track_event_listener(
        &self,
        target: ListenerTarget,
        event_type: &str,
        listener: ListenerId,
        options: ListenerOptions,
    ) -> bool;

    fn timer_count(&self) -> usize;

    fn event_listener_count(&self) -> usize;

    fn derived_metrics(&self) -> DerivedMetrics;

    /// Cancel every timer by its kind and remove every listener from its real
    /// target. Never fails; removal failures are logged and counted.
    fn cleanup(&self) -> CleanupSummary;

    fn snapshot(&self) -> ResourceSnapshot {
        let derived = self.derived_metrics();
        ResourceSnapshot {
            app: self.app_id().clone(),
            mode: self.mode(),
            timers: self.timer_count(),
            global_event_listeners: self.event_listener_count(),
            rendered_elements: derived.rendered_elements,
            estimated_listeners: derived.interactive_estimate,
            network: derived.network,
        }
    }
}

/// Accounting variant selected per application at launch
pub enum AppAccountant {
    Tracked(TrackedAccountant),
    Cooperative(CooperativeAccountant),
}

impl AppAccountant {
    pub fn new(app: AppId, mode: AccountingMode, runtime: HostRuntime) -> Self {
        match mode {
            AccountingMode::Tracked => Self::Tracked(TrackedAccountant::new(app, runtime)),
            AccountingMode::Cooperative => {
                Self::Cooperative(CooperativeAccountant::new(app, runtime))
            }
        }
    }

    pub fn as_tracked(&self) -> Option<&TrackedAccountant> {
        match self {
            Self::Tracked(t) => Some(t),
            Self::Cooperative(_) => None,
        }
    }

    pub fn as_cooperative(&self) -> Option<&CooperativeAccountant> {
        match self {
            Self::Cooperative(c) => Some(c),
            Self::Tracked(_) => None,
        }
    }

    /// Create a real timer on behalf of the application and record it
    pub fn create_timer(
        &self,
        callback: TimerCallback,
        delay_ms: u64,
        is_interval: bool,
    ) -> TimerHandle {
        let delay = Duration::from_millis(delay_ms);
        match self {
            Self::Tracked(t) if is_interval => t.set_interval(callback, delay),
            Self::Tracked(t) => t.set_timeout(callback, delay),
            Self::Cooperative(c) => c.create_tracked_timer(callback, delay_ms, is_interval),
        }
    }

    /// Cancel a real timer with the cancellation call matching `is_interval`
    pub fn cancel_timer(&self, handle: TimerHandle, is_interval: bool) -> bool {
        match self {
            Self::Tracked(t) if is_interval => t.clear_interval(handle),
            Self::Tracked(t) => t.clear_timeout(handle),
            Self::Cooperative(c) => c.clear_tracked_timer(handle, is_interval),
        }
    }

    fn inner(&self) -> &dyn ResourceAccounting {
        match self {
            Self::Tracked(t) => t,
            Self::Cooperative(c) => c,
        }
    }
}

impl ResourceAccounting for AppAccountant {
    fn app_id(&self) -> &AppId {
        self.inner().app_id()
    }

    fn mode(&self) -> AccountingMode {
        self.inner().mode()
    }

    fn track_timer(&self, handle: TimerHandle, kind: TimerKind) {
        self.inner().track_timer(handle, kind)
    }

    fn clear_timer(&self, handle: TimerHandle) -> bool {
        self.inner().clear_timer(handle)
    }

    fn track_event_listener(
        &self,
        target: ListenerTarget,
        event_type: &str,
        listener: ListenerId,
        options: ListenerOptions,
    ) -> bool {
        self.inner()
            .track_event_listener(target, event_type, listener, options)
    }

    fn timer_count(&self) -> usize {
        self.inner().timer_count()
    }

    fn event_listener_count(&self) -> usize {
        self.inner().event_listener_count()
    }

    fn derived_metrics(&self) -> DerivedMetrics {
        self.inner().derived_metrics()
    }

    fn cleanup(&self) -> CleanupSummary {
        self.inner().cleanup()
    }
}
