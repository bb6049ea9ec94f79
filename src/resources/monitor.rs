/*!
 * Resource Monitor
 * Registry of per-application accountants, snapshots and the dashboard refresh
 */

use super::accountant::{AppAccountant, ResourceAccounting};
use super::types::{
    AccountingMode, AppResourceRow, CleanupSummary, RefreshSink, ResourceSnapshot,
    SystemAggregate, SystemReport,
};
use crate::core::types::{AppId, TimerHandle};
use crate::directory::{AppDescriptor, AppDirectory};
use crate::lifecycle::{CleanupHook, CleanupHookRegistry, CleanupStats};
use crate::runtime::timers::TimerCallback;
use crate::runtime::HostRuntime;
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

struct MonitoredApp {
    descriptor: AppDescriptor,
    accountant: Arc<AppAccountant>,
}

/// Clears the in-flight flag when a refresh finishes or is dropped
struct RefreshGuard<'a>(&'a AtomicBool);

impl<'a> RefreshGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Per-application resource accounting for every running application
///
/// The system aggregate is never stored; it is summed from live accountants
/// each time it is requested.
#[derive(Clone)]
pub struct ResourceMonitor {
    runtime: HostRuntime,
    apps: Arc<DashMap<AppId, MonitoredApp, RandomState>>,
    installed: Arc<AtomicUsize>,
    refreshing: Arc<AtomicBool>,
}

impl ResourceMonitor {
    /// Create the monitor and register its teardown with `hooks`
    pub fn new(runtime: HostRuntime, hooks: &CleanupHookRegistry) -> Self {
        let monitor = Self {
            runtime,
            apps: Arc::new(DashMap::with_hasher(RandomState::new())),
            installed: Arc::new(AtomicUsize::new(0)),
            refreshing: Arc::new(AtomicBool::new(false)),
        };
        hooks.register(monitor.clone());
        monitor
    }

    /// Start accounting for an application. The variant follows the
    /// descriptor's kind; attaching twice returns the existing accountant.
    pub fn attach(&self, app: &AppId, descriptor: &AppDescriptor) -> Arc<AppAccountant> {
        let mode = descriptor.kind.accounting_mode();
        let entry = self.apps.entry(app.clone()).or_insert_with(|| {
            info!("Accounting {} as {}", app, mode);
            MonitoredApp {
                descriptor: descriptor.clone(),
                accountant: Arc::new(AppAccountant::new(app.clone(), mode, self.runtime.clone())),
            }
        });
        Arc::clone(&entry.accountant)
    }

    pub fn accountant(&self, app: &AppId) -> Option<Arc<AppAccountant>> {
        self.apps.get(app).map(|e| Arc::clone(&e.accountant))
    }

    pub fn mode(&self, app: &AppId) -> Option<AccountingMode> {
        self.accountant(app).map(|a| a.mode())
    }

    pub fn is_attached(&self, app: &AppId) -> bool {
        self.apps.contains_key(app)
    }

    /// `None` once the application record has been purged
    pub fn timer_count(&self, app: &AppId) -> Option<usize> {
        self.accountant(app).map(|a| a.timer_count())
    }

    pub fn event_listener_count(&self, app: &AppId) -> Option<usize> {
        self.accountant(app).map(|a| a.event_listener_count())
    }

    /// Create a real timer for an application. Unknown or retired
    /// applications get no timer.
    pub fn create_tracked_timer(
        &self,
        app: &AppId,
        callback: TimerCallback,
        delay_ms: u64,
        is_interval: bool,
    ) -> Option<TimerHandle> {
        let Some(accountant) = self.accountant(app) else {
            debug!("Ignoring timer request from unknown application {}", app);
            return None;
        };
        Some(accountant.create_timer(callback, delay_ms, is_interval))
    }

    pub fn clear_tracked_timer(&self, app: &AppId, handle: TimerHandle, is_interval: bool) -> bool {
        self.accountant(app)
            .map_or(false, |a| a.cancel_timer(handle, is_interval))
    }

    pub fn snapshot(&self, app: &AppId) -> Option<ResourceSnapshot> {
        self.accountant(app).map(|a| a.snapshot())
    }

    /// Snapshots of every running application, ordered by id
    pub fn snapshots(&self) -> Vec<ResourceSnapshot> {
        let mut snapshots: Vec<ResourceSnapshot> =
            self.accountants().iter().map(|a| a.snapshot()).collect();
        snapshots.sort_by(|a, b| a.app.cmp(&b.app));
        snapshots
    }

    pub fn aggregate(&self) -> SystemAggregate {
        SystemAggregate::from_snapshots(&self.snapshots(), self.installed.load(Ordering::Acquire))
    }

    pub fn running_apps(&self) -> usize {
        self.apps.len()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Measure every application, then render once
    ///
    /// Requests arriving while a refresh is in flight are dropped and return
    /// `None`. All snapshots are taken before the sink runs, since rendering
    /// mutates the render tree.
    pub async fn refresh<D, S>(&self, directory: &D, sink: &S) -> Option<SystemReport>
    where
        D: AppDirectory + ?Sized,
        S: RefreshSink + ?Sized,
    {
        let Some(_guard) = RefreshGuard::try_acquire(&self.refreshing) else {
            debug!("Refresh already in flight, dropping request");
            return None;
        };

        match directory.fetch_installed().await {
            Ok(installed) => self.installed.store(installed.len(), Ordering::Release),
            Err(e) => warn!("Directory unavailable during refresh: {}", e),
        }

        let entries: Vec<(AppDescriptor, Arc<AppAccountant>)> = self
            .apps
            .iter()
            .map(|e| (e.descriptor.clone(), Arc::clone(&e.accountant)))
            .collect();

        let snapshots: Vec<(AppDescriptor, ResourceSnapshot)> = entries
            .into_iter()
            .map(|(descriptor, accountant)| (descriptor, accountant.snapshot()))
            .collect();

        let aggregate = SystemAggregate::from_snapshots(
            &snapshots.iter().map(|(_, s)| s.clone()).collect::<Vec<_>>(),
            self.installed.load(Ordering::Acquire),
        );

        let mut apps: Vec<AppResourceRow> = snapshots
            .into_iter()
            .map(|(launched, snapshot)| {
                let descriptor = directory.lookup(&launched.id).unwrap_or(launched);
                AppResourceRow {
                    name: descriptor.name,
                    icon: descriptor.icon,
                    kind: descriptor.kind,
                    snapshot,
                }
            })
            .collect();
        apps.sort_by(|a, b| a.snapshot.app.cmp(&b.snapshot.app));

        let report = SystemReport { aggregate, apps };
        sink.render(&report);
        Some(report)
    }

    /// Cancel everything the application owns and purge its record
    pub fn cleanup(&self, app: &AppId) -> Option<CleanupSummary> {
        let (_, entry) = self.apps.remove(app)?;
        let summary = entry.accountant.cleanup();
        info!(
            "Cleaned {} timers and {} listeners for {}",
            summary.timers, summary.listeners, app
        );
        Some(summary)
    }

    fn accountants(&self) -> Vec<Arc<AppAccountant>> {
        self.apps.iter().map(|e| Arc::clone(&e.accountant)).collect()
    }
}

impl CleanupHook for ResourceMonitor {
    fn cleanup(&self, app: &AppId) -> CleanupStats {
        let summary = ResourceMonitor::cleanup(self, app).unwrap_or_default();
        CleanupStats {
            resources_freed: summary.total(),
            errors_encountered: summary.errors,
            ..CleanupStats::default()
        }
        .with_type("timers", summary.timers)
        .with_type("listeners", summary.listeners)
    }

    fn hook_name(&self) -> &'static str {
        "resources"
    }

    fn has_resources(&self, app: &AppId) -> bool {
        self.is_attached(app)
    }
}
