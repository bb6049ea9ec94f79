/*!
 * Resource Ledger
 * Per-application timer and listener records shared by both accounting variants
 */

use super::types::{CleanupSummary, DerivedMetrics};
use crate::core::types::{AppId, ListenerId, SandboxResult, TimerHandle};
use crate::core::InlineString;
use crate::runtime::events::{DomEvent, EventHandler, ListenerOptions, ListenerTarget};
use crate::runtime::timers::{TimerCallback, TimerKind};
use crate::runtime::HostRuntime;
use ahash::AHashMap;
use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A recorded subscription on a shared target
#[derive(Debug, Clone)]
struct Subscription {
    target: ListenerTarget,
    event_type: InlineString,
    options: ListenerOptions,
}

#[derive(Default)]
struct Records {
    timers: AHashMap<TimerHandle, TimerKind>,
    listeners: AHashMap<ListenerId, Subscription>,
}

/// Bookkeeping plus the real runtime the records refer to
pub(crate) struct Ledger {
    app: AppId,
    runtime: HostRuntime,
    records: Arc<Mutex<Records>>,
}

impl Ledger {
    pub(crate) fn new(app: AppId, runtime: HostRuntime) -> Self {
        Self {
            app,
            runtime,
            records: Arc::new(Mutex::new(Records::default())),
        }
    }

    pub(crate) fn app(&self) -> &AppId {
        &self.app
    }

    pub(crate) fn runtime(&self) -> &HostRuntime {
        &self.runtime
    }

    pub(crate) fn track_timer(&self, handle: TimerHandle, kind: TimerKind) {
        self.records.lock().timers.insert(handle, kind);
    }

    pub(crate) fn clear_timer(&self, handle: TimerHandle) -> bool {
        self.records.lock().timers.remove(&handle).is_some()
    }

    /// Record a subscription. Only the document and window count.
    pub(crate) fn track_listener(
        &self,
        target: ListenerTarget,
        event_type: &str,
        listener: ListenerId,
        options: ListenerOptions,
    ) -> bool {
        if !target.is_global() {
            return false;
        }
        self.records.lock().listeners.insert(
            listener,
            Subscription {
                target,
                event_type: event_type.into(),
                options,
            },
        );
        true
    }

    pub(crate) fn untrack_listener(&self, listener: ListenerId) -> bool {
        self.records.lock().listeners.remove(&listener).is_some()
    }

    pub(crate) fn timer_count(&self) -> usize {
        self.records.lock().timers.len()
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.records.lock().listeners.len()
    }

    /// Schedule a real timer and record it. One-shot timers drop their record
    /// once they have fired.
    pub(crate) fn schedule_timer(
        &self,
        kind: TimerKind,
        callback: TimerCallback,
        delay: Duration,
    ) -> TimerHandle {
        // Held across scheduling so a fired callback always finds its record
        let mut records = self.records.lock();
        let slot = Arc::new(AtomicU64::new(0));

        let callback: TimerCallback = match kind {
            TimerKind::Interval => callback,
            TimerKind::Timeout => {
                let weak = Arc::downgrade(&self.records);
                let slot = Arc::clone(&slot);
                let mut inner = callback;
                // A started timeout is finished even if its callback unwinds
                Box::new(move || {
                    if let Some(records) = weak.upgrade() {
                        records.lock().timers.remove(&slot.load(Ordering::Acquire));
                    }
                    inner();
                })
            }
        };

        let handle = self.runtime.timers.schedule(kind, callback, delay);
        slot.store(handle, Ordering::Release);
        records.timers.insert(handle, kind);
        handle
    }

    /// Cancel a real timer with the cancellation matching `kind`, dropping the
    /// record once the timer is gone
    pub(crate) fn cancel_timer(&self, handle: TimerHandle, kind: TimerKind) -> bool {
        let cancelled = self.runtime.timers.cancel(handle, kind);
        if !self.runtime.timers.is_active(handle) {
            self.clear_timer(handle);
        }
        cancelled
    }

    /// Attach a real listener and record it if its target is global.
    /// `once` listeners drop their record after firing.
    pub(crate) fn attach_listener(
        &self,
        target: ListenerTarget,
        event_type: &str,
        handler: EventHandler,
        options: ListenerOptions,
    ) -> SandboxResult<ListenerId> {
        let mut records = self.records.lock();
        let slot = Arc::new(AtomicU64::new(0));

        let handler: EventHandler = if options.once && target.is_global() {
            let weak = Arc::downgrade(&self.records);
            let slot = Arc::clone(&slot);
            // The bus has already dropped the entry before the handler runs
            Arc::new(move |event: &DomEvent| {
                if let Some(records) = weak.upgrade() {
                    records.lock().listeners.remove(&slot.load(Ordering::Acquire));
                }
                handler(event);
            })
        } else {
            handler
        };

        let id = self.runtime.events.add_listener(target, event_type, handler, options)?;
        slot.store(id, Ordering::Release);
        if target.is_global() {
            records.listeners.insert(
                id,
                Subscription {
                    target,
                    event_type: event_type.into(),
                    options,
                },
            );
        }
        Ok(id)
    }

    /// Detach a real listener and drop its record
    pub(crate) fn detach_listener(
        &self,
        target: ListenerTarget,
        event_type: &str,
        listener: ListenerId,
        options: ListenerOptions,
    ) -> SandboxResult<()> {
        self.runtime
            .events
            .remove_listener(target, event_type, listener, options)?;
        self.untrack_listener(listener);
        Ok(())
    }

    /// Cancel every recorded timer and remove every recorded listener
    pub(crate) fn cleanup(&self) -> CleanupSummary {
        let Records { timers, listeners } = std::mem::take(&mut *self.records.lock());
        let mut summary = CleanupSummary {
            timers: timers.len(),
            listeners: listeners.len(),
            errors: 0,
        };

        for (handle, kind) in timers {
            if !self.runtime.timers.cancel(handle, kind) {
                debug!("Timer {} of {} had already finished", handle, self.app);
            }
        }

        for (id, sub) in listeners {
            if let Err(e) = self
                .runtime
                .events
                .remove_listener(sub.target, &sub.event_type, id, sub.options)
            {
                warn!(
                    "Failed to remove '{}' listener {} of {} from {}: {}",
                    sub.event_type, id, self.app, sub.target, e
                );
                summary.errors += 1;
            }
        }

        summary
    }

    /// Rendered-element and network metrics common to both variants
    pub(crate) fn base_metrics(&self) -> DerivedMetrics {
        DerivedMetrics {
            rendered_elements: self.runtime.render.count_descendants(&self.app).unwrap_or(0),
            interactive_estimate: None,
            network: self.runtime.network.status(&self.app),
        }
    }
}
