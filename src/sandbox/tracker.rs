/*!
 * Namespace Ownership Tracker
 * Hands out per-application proxies and removes what each application wrote
 */

use super::proxy::{NamespaceProxy, ReleaseSummary};
use crate::core::errors::SandboxError;
use crate::core::types::{AppId, SandboxResult};
use crate::lifecycle::{CleanupHook, CleanupHookRegistry, CleanupStats};
use crate::runtime::namespace::GlobalNamespace;
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::Arc;

/// Tracks which shared-namespace properties each running application owns
///
/// Applications never see the real namespace directly; they receive a
/// [`NamespaceProxy`] that records every write.
#[derive(Clone)]
pub struct NamespaceTracker {
    global: GlobalNamespace,
    bound_globals: Arc<[String]>,
    proxies: Arc<DashMap<AppId, Arc<NamespaceProxy>, RandomState>>,
}

impl NamespaceTracker {
    /// Create the tracker and register its teardown with `hooks`
    pub fn new(
        global: GlobalNamespace,
        bound_globals: &[String],
        hooks: &CleanupHookRegistry,
    ) -> Self {
        let tracker = Self {
            global,
            bound_globals: bound_globals.to_vec().into(),
            proxies: Arc::new(DashMap::with_hasher(RandomState::new())),
        };
        hooks.register(tracker.clone());
        tracker
    }

    pub fn global(&self) -> &GlobalNamespace {
        &self.global
    }

    /// Obtain the application's proxy, creating it on first use
    pub fn acquire(&self, app: &AppId) -> SandboxResult<Arc<NamespaceProxy>> {
        if app.is_empty() {
            return Err(SandboxError::Configuration(
                "namespace acquisition requires an application identifier".into(),
            ));
        }

        let proxy = self
            .proxies
            .entry(app.clone())
            .or_insert_with(|| {
                debug!("Created namespace proxy for {}", app);
                Arc::new(NamespaceProxy::new(
                    app.clone(),
                    self.global.clone(),
                    Arc::clone(&self.bound_globals),
                ))
            })
            .clone();
        Ok(proxy)
    }

    /// Delete every property the application wrote and forget it
    ///
    /// Unknown applications are a no-op. Individual delete failures are logged
    /// and counted; the remaining properties are still removed.
    pub fn release(&self, app: &AppId) -> ReleaseSummary {
        let Some((_, proxy)) = self.proxies.remove(app) else {
            return ReleaseSummary::default();
        };

        let summary = proxy.release();
        if summary.failed > 0 {
            warn!(
                "Released namespace of {} with {} undeletable properties",
                app, summary.failed
            );
        }
        info!("Released {} namespace properties for {}", summary.deleted, app);
        summary
    }

    pub fn is_tracked(&self, app: &AppId) -> bool {
        self.proxies.contains_key(app)
    }

    /// Owned property names for an application, sorted
    pub fn owned_properties(&self, app: &AppId) -> Vec<String> {
        self.proxies
            .get(app)
            .map(|p| p.owned_properties())
            .unwrap_or_default()
    }

    pub fn tracked_count(&self) -> usize {
        self.proxies.len()
    }
}

impl CleanupHook for NamespaceTracker {
    fn cleanup(&self, app: &AppId) -> CleanupStats {
        let summary = self.release(app);
        CleanupStats {
            resources_freed: summary.deleted,
            errors_encountered: summary.failed,
            ..CleanupStats::default()
        }
        .with_type("properties", summary.deleted)
    }

    fn hook_name(&self) -> &'static str {
        "namespace"
    }

    fn has_resources(&self, app: &AppId) -> bool {
        self.is_tracked(app)
    }
}
