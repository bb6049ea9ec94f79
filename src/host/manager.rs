/*!
 * Application Host
 * Launches applications into the sandbox and tears them down again
 */

use super::builder::AppHostBuilder;
use crate::core::config::HostConfig;
use crate::core::errors::SandboxError;
use crate::core::types::{AppId, SandboxResult, TimerHandle};
use crate::directory::{AppDescriptor, AppDirectory};
use crate::keyboard::{ShortcutConfig, ShortcutRouter, ShortcutStats, ShortcutTable};
use crate::lifecycle::{CleanupHookRegistry, CleanupReport};
use crate::monitoring::{span_app_operation, span_operation};
use crate::resources::{
    AppAccountant, RefreshSink, ResourceMonitor, ResourceSnapshot, SystemAggregate, SystemReport,
};
use crate::runtime::events::{DomEvent, KeyInput};
use crate::runtime::timers::TimerCallback;
use crate::runtime::HostRuntime;
use crate::sandbox::{NamespaceProxy, NamespaceTracker, ReleaseSummary};
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Shell-side facade over every sandbox subsystem
pub struct AppHost {
    pub(super) config: HostConfig,
    pub(super) runtime: HostRuntime,
    pub(super) hooks: CleanupHookRegistry,
    pub(super) directory: Arc<dyn AppDirectory>,
    pub(super) namespaces: NamespaceTracker,
    pub(super) resources: ResourceMonitor,
    pub(super) shortcuts: ShortcutRouter,
    pub(super) instances: Arc<DashMap<AppId, AppDescriptor, RandomState>>,
}

impl AppHost {
    pub fn builder() -> AppHostBuilder {
        AppHostBuilder::new()
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Start a new instance of an application
    ///
    /// Mounts its root container, attaches the accountant matching its kind
    /// and acquires its namespace proxy.
    pub fn launch(&self, descriptor: &AppDescriptor) -> SandboxResult<AppId> {
        if descriptor.id.is_empty() {
            return Err(SandboxError::Configuration(
                "cannot launch an application without an id".into(),
            ));
        }

        let app = AppId::generate(&descriptor.id);
        let _span = span_app_operation("launch", app.as_str());

        self.runtime.render.mount_app_root(&app);
        self.resources.attach(&app, descriptor);
        self.namespaces.acquire(&app)?;
        self.instances.insert(app.clone(), descriptor.clone());

        info!(
            "Launched {} ({}, {} accounting)",
            app,
            descriptor.name,
            descriptor.kind.accounting_mode()
        );
        Ok(app)
    }

    /// Launch by directory id
    pub fn launch_by_id(&self, id: &str) -> SandboxResult<AppId> {
        let descriptor = self.directory.lookup(id).ok_or_else(|| {
            SandboxError::Configuration(format!("unknown application '{}'", id).into())
        })?;
        self.launch(&descriptor)
    }

    /// Bring an application to the foreground
    pub fn focus(&self, app: &AppId) -> bool {
        if !self.is_running(app) {
            return false;
        }
        self.runtime.window.restore(app);
        self.runtime.window.set_active(Some(app.clone()));
        true
    }

    /// Minimize an application. It stays the foreground application but no
    /// longer receives shortcuts.
    pub fn minimize(&self, app: &AppId) -> bool {
        if !self.is_running(app) {
            return false;
        }
        self.runtime.window.minimize(app);
        true
    }

    pub fn restore(&self, app: &AppId) -> bool {
        self.focus(app)
    }

    /// Tear an application down completely
    ///
    /// Runs every cleanup hook in registration order, then unmounts its render
    /// tree, closes its network handles and forgets its window state. Runs to
    /// completion synchronously. Unknown or already destroyed ids return an
    /// empty report.
    pub fn destroy(&self, app: &AppId) -> CleanupReport {
        let Some((_, descriptor)) = self.instances.remove(app) else {
            debug!("Destroy requested for unknown application {}", app);
            return CleanupReport::empty(app);
        };

        let span = span_app_operation("destroy", app.as_str());
        let report = self.hooks.run(app);

        let elements = self.runtime.render.unmount_app(app);
        let sockets = self.runtime.network.close_app(app);
        self.runtime.window.forget(app);

        span.record_items(report.stats.resources_freed);
        info!(
            "Destroyed {} ({}): {} resources freed, {} elements removed, {} sockets closed",
            app, descriptor.name, report.stats.resources_freed, elements, sockets
        );
        report
    }

    pub fn is_running(&self, app: &AppId) -> bool {
        self.instances.contains_key(app)
    }

    /// Running instances, ordered by id
    pub fn running_apps(&self) -> Vec<AppId> {
        let mut apps: Vec<AppId> = self.instances.iter().map(|e| e.key().clone()).collect();
        apps.sort();
        apps
    }

    pub fn descriptor(&self, app: &AppId) -> Option<AppDescriptor> {
        self.instances.get(app).map(|e| e.value().clone())
    }

    // ---------------------------------------------------------------------
    // Namespace
    // ---------------------------------------------------------------------

    pub fn acquire_namespace(&self, app: &AppId) -> SandboxResult<Arc<NamespaceProxy>> {
        self.namespaces.acquire(app)
    }

    pub fn release_namespace(&self, app: &AppId) -> ReleaseSummary {
        self.namespaces.release(app)
    }

    // ---------------------------------------------------------------------
    // Shortcuts
    // ---------------------------------------------------------------------

    pub fn register_shortcuts(
        &self,
        app: &AppId,
        table: ShortcutTable,
        config: Option<ShortcutConfig>,
    ) -> bool {
        self.shortcuts.register_app(app, table, config)
    }

    pub fn unregister_shortcuts(&self, app: &AppId) -> usize {
        self.shortcuts.unregister_app(app)
    }

    pub fn shortcut_stats(&self) -> ShortcutStats {
        self.shortcuts.stats()
    }

    /// Deliver a keydown to the document, as the input layer would
    pub fn press_key(&self, input: KeyInput) -> DomEvent {
        let event = DomEvent::keydown(input);
        self.runtime.events.dispatch(&event);
        event
    }

    // ---------------------------------------------------------------------
    // Resources
    // ---------------------------------------------------------------------

    pub fn create_tracked_timer(
        &self,
        app: &AppId,
        callback: TimerCallback,
        delay_ms: u64,
        is_interval: bool,
    ) -> Option<TimerHandle> {
        self.resources
            .create_tracked_timer(app, callback, delay_ms, is_interval)
    }

    pub fn clear_tracked_timer(&self, app: &AppId, handle: TimerHandle, is_interval: bool) -> bool {
        self.resources.clear_tracked_timer(app, handle, is_interval)
    }

    pub fn accountant(&self, app: &AppId) -> Option<Arc<AppAccountant>> {
        self.resources.accountant(app)
    }

    pub fn resource_snapshot(&self, app: &AppId) -> Option<ResourceSnapshot> {
        self.resources.snapshot(app)
    }

    pub fn system_aggregate(&self) -> SystemAggregate {
        self.resources.aggregate()
    }

    /// One dashboard refresh; `None` when another refresh is in flight
    pub async fn refresh<S: RefreshSink + ?Sized>(&self, sink: &S) -> Option<SystemReport> {
        let span = span_operation("refresh");
        let report = self.resources.refresh(self.directory.as_ref(), sink).await;
        if let Some(report) = &report {
            span.record_items(report.apps.len());
        }
        report
    }

    /// Advance the event loop's virtual clock, firing due timers
    pub fn tick(&self, elapsed: Duration) -> usize {
        self.runtime.timers.advance(elapsed)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn runtime(&self) -> &HostRuntime {
        &self.runtime
    }

    pub fn hooks(&self) -> &CleanupHookRegistry {
        &self.hooks
    }

    pub fn directory(&self) -> &Arc<dyn AppDirectory> {
        &self.directory
    }

    pub fn namespaces(&self) -> &NamespaceTracker {
        &self.namespaces
    }

    pub fn resources(&self) -> &ResourceMonitor {
        &self.resources
    }

    pub fn shortcuts(&self) -> &ShortcutRouter {
        &self.shortcuts
    }
}
