/*!
 * Event Loop Timers
 * Virtual-time timer host with synchronous cancellation
 */

use crate::core::types::{TimerHandle, Timestamp};
use log::{error, trace};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// Timer callback
pub type TimerCallback = Box<dyn FnMut() + Send>;

/// Timer flavour; determines which cancellation call applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    Interval,
    Timeout,
}

impl TimerKind {
    #[inline]
    pub fn from_interval_flag(is_interval: bool) -> Self {
        if is_interval {
            TimerKind::Interval
        } else {
            TimerKind::Timeout
        }
    }
}

struct TimerEntry {
    kind: TimerKind,
    period: Timestamp,
    deadline: Timestamp,
    /// `None` while the callback is running
    callback: Option<TimerCallback>,
}

#[derive(Default)]
struct TimerState {
    now: Timestamp,
    next_handle: TimerHandle,
    timers: HashMap<TimerHandle, TimerEntry>,
    queue: BTreeSet<(Timestamp, TimerHandle)>,
}

/// Single-threaded event loop timers driven by [`EventLoopTimers::advance`]
///
/// No lock is held while a callback runs, so callbacks may schedule or clear
/// timers. Once `clear_*` returns, the cleared callback never runs again.
#[derive(Clone)]
pub struct EventLoopTimers {
    state: Arc<Mutex<TimerState>>,
}

impl EventLoopTimers {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState {
                next_handle: 1,
                ..TimerState::default()
            })),
        }
    }

    pub fn set_timeout(&self, callback: TimerCallback, delay: Duration) -> TimerHandle {
        self.schedule(TimerKind::Timeout, callback, delay)
    }

    /// Periods below one millisecond are clamped to one millisecond
    pub fn set_interval(&self, callback: TimerCallback, period: Duration) -> TimerHandle {
        self.schedule(TimerKind::Interval, callback, period)
    }

    pub fn schedule(
        &self,
        kind: TimerKind,
        callback: TimerCallback,
        delay: Duration,
    ) -> TimerHandle {
        let mut state = self.state.lock();
        let handle = state.next_handle;
        state.next_handle += 1;

        let mut period = delay.as_millis() as Timestamp;
        if kind == TimerKind::Interval {
            period = period.max(1);
        }
        let deadline = state.now + period;

        state.timers.insert(
            handle,
            TimerEntry {
                kind,
                period,
                deadline,
                callback: Some(callback),
            },
        );
        state.queue.insert((deadline, handle));
        trace!("Scheduled {:?} {} at t={}", kind, handle, deadline);
        handle
    }

    /// Cancel a one-shot timer. Returns false for unknown handles or intervals.
    pub fn clear_timeout(&self, handle: TimerHandle) -> bool {
        self.cancel(handle, TimerKind::Timeout)
    }

    /// Cancel an interval. Returns false for unknown handles or one-shot timers.
    pub fn clear_interval(&self, handle: TimerHandle) -> bool {
        self.cancel(handle, TimerKind::Interval)
    }

    /// Cancel using the cancellation call matching `kind`
    pub fn cancel(&self, handle: TimerHandle, kind: TimerKind) -> bool {
        let mut state = self.state.lock();
        match state.timers.get(&handle) {
            Some(entry) if entry.kind == kind => {
                let deadline = entry.deadline;
                state.timers.remove(&handle);
                state.queue.remove(&(deadline, handle));
                trace!("Cancelled {:?} {}", kind, handle);
                true
            }
            _ => false,
        }
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.state.lock().timers.contains_key(&handle)
    }

    pub fn pending(&self) -> usize {
        self.state.lock().timers.len()
    }

    pub fn now(&self) -> Timestamp {
        self.state.lock().now
    }

    /// Run every callback that is due now
    pub fn run_pending(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Move virtual time forward, firing due callbacks in deadline order.
    /// Returns the number of callbacks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().now + by.as_millis() as Timestamp;
        let mut fired = 0;

        loop {
            let (handle, mut callback) = {
                let mut state = self.state.lock();
                let next = state.queue.iter().next().copied();
                let due = match next {
                    Some((deadline, handle)) if deadline <= target => (deadline, handle),
                    _ => {
                        state.now = target;
                        break;
                    }
                };
                state.queue.remove(&due);
                state.now = due.0;

                let (deadline, handle) = due;
                let one_shot = match state.timers.get(&handle) {
                    Some(entry) => entry.kind == TimerKind::Timeout,
                    None => continue,
                };
                let callback = if one_shot {
                    state.timers.remove(&handle).and_then(|e| e.callback)
                } else {
                    state.timers.get_mut(&handle).and_then(|e| {
                        debug_assert_eq!(e.deadline, deadline);
                        e.callback.take()
                    })
                };
                match callback {
                    Some(cb) => (handle, cb),
                    None => continue,
                }
            };

            if catch_unwind(AssertUnwindSafe(&mut callback)).is_err() {
                error!("Timer {} callback panicked", handle);
            }
            fired += 1;

            // Re-arm intervals that were not cleared while running
            let mut state = self.state.lock();
            let now = state.now;
            if let Some(entry) = state.timers.get_mut(&handle) {
                entry.deadline = now + entry.period;
                entry.callback = Some(callback);
                let next = (entry.deadline, handle);
                state.queue.insert(next);
            }
        }

        fired
    }
}

impl Default for EventLoopTimers {
    fn default() -> Self {
        Self::new()
    }
}
