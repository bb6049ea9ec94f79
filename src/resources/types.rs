/*!
 * Resource Types
 * Snapshots, summaries and aggregates reported by the resource accountant
 */

use crate::core::types::AppId;
use crate::directory::AppKind;
use crate::runtime::network::NetworkStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accounting variant, chosen per application at launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountingMode {
    /// Timer and listener creation intercepted transparently
    Tracked,
    /// Trusted application that reports its own timers
    Cooperative,
}

impl fmt::Display for AccountingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountingMode::Tracked => write!(f, "tracked"),
            AccountingMode::Cooperative => write!(f, "cooperative"),
        }
    }
}

/// Items removed by an accountant's cleanup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupSummary {
    pub timers: usize,
    pub listeners: usize,
    /// Listener removals that failed against the real target
    pub errors: usize,
}

impl CleanupSummary {
    pub fn total(&self) -> usize {
        self.timers + self.listeners
    }
}

/// Metrics computed on demand rather than counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Elements under the application's root container
    pub rendered_elements: usize,
    /// Best-effort listener estimate from interactive elements.
    /// Only computed for cooperative applications.
    pub interactive_estimate: Option<usize>,
    pub network: NetworkStatus,
}

/// Point-in-time counters for one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub app: AppId,
    pub mode: AccountingMode,
    pub timers: usize,
    pub global_event_listeners: usize,
    pub rendered_elements: usize,
    pub estimated_listeners: Option<usize>,
    pub network: NetworkStatus,
}

impl ResourceSnapshot {
    /// Global listener footprint counted in the system aggregate. Cooperative
    /// applications do not report every listener, so the interactive-element
    /// estimate stands in when it is higher than the tracked count.
    pub fn listener_footprint(&self) -> usize {
        match self.mode {
            AccountingMode::Tracked => self.global_event_listeners,
            AccountingMode::Cooperative => self
                .global_event_listeners
                .max(self.estimated_listeners.unwrap_or(0)),
        }
    }
}

/// System-wide totals, always summed from live snapshots.
/// `total_global_events` includes the listener estimate of cooperative apps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemAggregate {
    pub running_apps: usize,
    pub total_apps: usize,
    pub total_rendered_elements: usize,
    pub total_timers: usize,
    pub total_global_events: usize,
}

impl SystemAggregate {
    /// Sum snapshots. `installed` is the last known directory size.
    pub fn from_snapshots(snapshots: &[ResourceSnapshot], installed: usize) -> Self {
        let mut aggregate = snapshots.iter().fold(Self::default(), |mut acc, s| {
            acc.total_rendered_elements += s.rendered_elements;
            acc.total_timers += s.timers;
            acc.total_global_events += s.listener_footprint();
            acc
        });
        aggregate.running_apps = snapshots.len();
        aggregate.total_apps = installed.max(snapshots.len());
        aggregate
    }
}

/// One dashboard row: a snapshot joined with registry metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppResourceRow {
    pub name: String,
    pub icon: String,
    pub kind: AppKind,
    pub snapshot: ResourceSnapshot,
}

/// Everything a dashboard renders after one refresh sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemReport {
    pub aggregate: SystemAggregate,
    pub apps: Vec<AppResourceRow>,
}

/// Consumer of refresh results
pub trait RefreshSink: Send + Sync {
    fn render(&self, report: &SystemReport);
}

impl<F> RefreshSink for F
where
    F: Fn(&SystemReport) + Send + Sync,
{
    fn render(&self, report: &SystemReport) {
        self(report)
    }
}
