/*!
 * Cleanup Hook Registry
 * Process-wide, ordered teardown callbacks run whenever an application is destroyed
 */

use crate::core::types::AppId;
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Teardown statistics reported by one hook
#[derive(Debug, Clone, Default)]
pub struct CleanupStats {
    pub resources_freed: usize,
    pub errors_encountered: usize,
    pub cleanup_duration_micros: u64,
    pub by_type: HashMap<String, usize>,
}

impl CleanupStats {
    /// Stats for a hook that freed `count` items without errors
    pub fn freed(count: usize) -> Self {
        Self {
            resources_freed: count,
            ..Self::default()
        }
    }

    /// Record a per-type count
    pub fn with_type(mut self, type_name: &str, count: usize) -> Self {
        self.by_type.insert(type_name.to_string(), count);
        self
    }

    fn merge(&mut self, other: CleanupStats) {
        self.resources_freed += other.resources_freed;
        self.errors_encountered += other.errors_encountered;
        self.cleanup_duration_micros += other.cleanup_duration_micros;

        for (type_name, count) in other.by_type {
            *self.by_type.entry(type_name).or_insert(0) += count;
        }
    }
}

/// Teardown callback for per-application state
pub trait CleanupHook: Send + Sync {
    /// Release everything the application owns in this subsystem
    fn cleanup(&self, app: &AppId) -> CleanupStats;

    /// Hook name for logging and de-duplication
    fn hook_name(&self) -> &'static str;

    /// Whether the application has anything to release here
    fn has_resources(&self, app: &AppId) -> bool;
}

impl<T: CleanupHook + ?Sized> CleanupHook for Arc<T> {
    fn cleanup(&self, app: &AppId) -> CleanupStats {
        (**self).cleanup(app)
    }

    fn hook_name(&self) -> &'static str {
        (**self).hook_name()
    }

    fn has_resources(&self, app: &AppId) -> bool {
        (**self).has_resources(app)
    }
}

/// Ordered registry of cleanup hooks
///
/// Hooks run in registration order. A name can be registered only once, so a
/// subsystem initialized twice still tears down each application once.
#[derive(Clone, Default)]
pub struct CleanupHookRegistry {
    hooks: Arc<RwLock<Vec<Arc<dyn CleanupHook>>>>,
}

impl CleanupHookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook. Returns false if a hook with the same name exists.
    pub fn register<H: CleanupHook + 'static>(&self, hook: H) -> bool {
        let mut hooks = self.hooks.write();
        let name = hook.hook_name();
        if hooks.iter().any(|h| h.hook_name() == name) {
            debug!("Cleanup hook '{}' already registered", name);
            return false;
        }
        hooks.push(Arc::new(hook));
        info!("Registered cleanup hook '{}' (position {})", name, hooks.len());
        true
    }

    /// Run every hook for a destroyed application
    pub fn run(&self, app: &AppId) -> CleanupReport {
        let overall_start = Instant::now();
        let mut total_stats = CleanupStats::default();
        let mut errors = Vec::new();

        // Hooks may register further hooks; never hold the lock while running them
        let hooks: Vec<Arc<dyn CleanupHook>> = self.hooks.read().clone();

        for hook in hooks {
            let name = hook.hook_name();
            if !hook.has_resources(app) {
                continue;
            }

            let start = Instant::now();
            let outcome = catch_unwind(AssertUnwindSafe(|| hook.cleanup(app)));
            let mut stats = match outcome {
                Ok(stats) => stats,
                Err(_) => {
                    error!("Cleanup hook '{}' panicked for {}", name, app);
                    CleanupStats {
                        errors_encountered: 1,
                        ..CleanupStats::default()
                    }
                }
            };
            stats.cleanup_duration_micros = start.elapsed().as_micros() as u64;
            stats
                .by_type
                .entry(name.to_string())
                .or_insert(stats.resources_freed);

            if stats.errors_encountered > 0 {
                warn!(
                    "{} errors in cleanup hook '{}' for {}",
                    stats.errors_encountered, name, app
                );
                errors.push(format!(
                    "{}: {} errors during cleanup",
                    name, stats.errors_encountered
                ));
            }

            info!(
                "Cleaned {} resources for {} (hook: {}, took {}μs)",
                stats.resources_freed, app, name, stats.cleanup_duration_micros
            );
            total_stats.merge(stats);
        }

        total_stats.cleanup_duration_micros = overall_start.elapsed().as_micros() as u64;

        CleanupReport {
            app: app.clone(),
            stats: total_stats,
            errors,
        }
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.read().len()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.hooks.read().iter().any(|h| h.hook_name() == name)
    }

    /// Hook names in execution order
    pub fn registered_names(&self) -> Vec<&'static str> {
        self.hooks.read().iter().map(|h| h.hook_name()).collect()
    }
}

/// Result of tearing down one application
#[derive(Debug, Clone)]
pub struct CleanupReport {
    pub app: AppId,
    pub stats: CleanupStats,
    pub errors: Vec<String>,
}

impl CleanupReport {
    /// Report for an application that had nothing registered
    pub fn empty(app: &AppId) -> Self {
        Self {
            app: app.clone(),
            stats: CleanupStats::default(),
            errors: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_freed_resources(&self) -> bool {
        self.stats.resources_freed > 0
    }

    /// Items freed under a hook or type name
    pub fn freed(&self, name: &str) -> usize {
        self.stats.by_type.get(name).copied().unwrap_or(0)
    }
}

impl fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cleanup: {} resources freed, {} errors",
            self.app,
            self.stats.resources_freed,
            self.errors.len()
        )
    }
}
