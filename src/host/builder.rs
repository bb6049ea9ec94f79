/*!
 * Host Builder
 * Builder pattern for AppHost construction
 */

use super::manager::AppHost;
use crate::core::config::HostConfig;
use crate::core::types::SandboxResult;
use crate::directory::{AppDirectory, HttpAppDirectory, StaticDirectory};
use crate::keyboard::ShortcutRouter;
use crate::lifecycle::CleanupHookRegistry;
use crate::resources::ResourceMonitor;
use crate::runtime::window::ForegroundState;
use crate::runtime::HostRuntime;
use crate::sandbox::NamespaceTracker;
use ahash::RandomState;
use dashmap::DashMap;
use log::info;
use std::sync::Arc;

/// Builder for AppHost
pub struct AppHostBuilder {
    config: Option<HostConfig>,
    runtime: Option<HostRuntime>,
    directory: Option<Arc<dyn AppDirectory>>,
    foreground: Option<Arc<dyn ForegroundState>>,
}

impl AppHostBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            runtime: None,
            directory: None,
            foreground: None,
        }
    }

    pub fn with_config(mut self, config: HostConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Share an existing runtime instead of creating a fresh one
    pub fn with_runtime(mut self, runtime: HostRuntime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_directory<D: AppDirectory + 'static>(mut self, directory: D) -> Self {
        self.directory = Some(Arc::new(directory));
        self
    }

    /// Route shortcuts by an external foreground provider instead of the
    /// runtime's window state
    pub fn with_foreground(mut self, foreground: Arc<dyn ForegroundState>) -> Self {
        self.foreground = Some(foreground);
        self
    }

    /// Build the host. Teardown hooks are registered in the order
    /// namespace, resources, shortcuts.
    pub fn build(self) -> SandboxResult<AppHost> {
        let config = self.config.unwrap_or_default();
        let runtime = self.runtime.unwrap_or_default();
        let hooks = CleanupHookRegistry::new();

        let directory: Arc<dyn AppDirectory> = match (self.directory, &config.directory_url) {
            (Some(directory), _) => directory,
            (None, Some(url)) => Arc::new(HttpAppDirectory::new(url, config.directory_timeout)?),
            (None, None) => Arc::new(StaticDirectory::default()),
        };
        let foreground: Arc<dyn ForegroundState> = self
            .foreground
            .unwrap_or_else(|| Arc::new(runtime.window.clone()));

        let namespaces =
            NamespaceTracker::new(runtime.namespace.clone(), &config.bound_globals, &hooks);
        let resources = ResourceMonitor::new(runtime.clone(), &hooks);
        let shortcuts = ShortcutRouter::install(
            &runtime.events,
            foreground,
            config.default_shortcut_config,
            &hooks,
        )?;

        info!(
            "Application host initialized with hooks: {}",
            hooks.registered_names().join(", ")
        );

        Ok(AppHost {
            config,
            runtime,
            hooks,
            directory,
            namespaces,
            resources,
            shortcuts,
            instances: Arc::new(DashMap::with_hasher(RandomState::new())),
        })
    }
}

impl Default for AppHostBuilder {
    fn default() -> Self {
        Self::new()
    }
}
