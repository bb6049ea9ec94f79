/*!
 * Window State
 * Foreground pointer and minimized flags owned by the window-management layer
 */

use crate::core::types::AppId;
use ahash::RandomState;
use arc_swap::ArcSwapOption;
use dashmap::DashSet;
use log::debug;
use std::sync::Arc;

/// Read-only view of foreground state consumed by input routing
pub trait ForegroundState: Send + Sync {
    /// Currently active application, if any
    fn active_app(&self) -> Option<AppId>;

    /// Whether an application's window is minimized
    fn is_minimized(&self, app: &AppId) -> bool;
}

/// Window manager state
#[derive(Clone)]
pub struct WindowState {
    active: Arc<ArcSwapOption<AppId>>,
    minimized: Arc<DashSet<AppId, RandomState>>,
}

impl WindowState {
    pub fn new() -> Self {
        Self {
            active: Arc::new(ArcSwapOption::empty()),
            minimized: Arc::new(DashSet::with_hasher(RandomState::new())),
        }
    }

    pub fn set_active(&self, app: Option<AppId>) {
        debug!("Foreground application: {:?}", app);
        self.active.store(app.map(Arc::new));
    }

    pub fn minimize(&self, app: &AppId) {
        self.minimized.insert(app.clone());
    }

    pub fn restore(&self, app: &AppId) {
        self.minimized.remove(app);
    }

    /// Drop all state for a destroyed application
    pub fn forget(&self, app: &AppId) {
        self.minimized.remove(app);
        let is_active = self
            .active
            .load()
            .as_deref()
            .map_or(false, |active| active == app);
        if is_active {
            self.active.store(None);
        }
    }
}

impl Default for WindowState {
    fn default() -> Self {
        Self::new()
    }
}

impl ForegroundState for WindowState {
    fn active_app(&self) -> Option<AppId> {
        self.active.load_full().map(|app| (*app).clone())
    }

    fn is_minimized(&self, app: &AppId) -> bool {
        self.minimized.contains(app)
    }
}
