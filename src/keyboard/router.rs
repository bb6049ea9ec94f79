/*!
 * Keyboard Shortcut Router
 * One document-level keydown listener routing keystrokes to the foreground application
 */

use super::combo::KeyCombo;
use super::types::{
    DispatchOutcome, RouterState, ShortcutConfig, ShortcutHandler, ShortcutStats, ShortcutTable,
};
use crate::core::errors::{SandboxError, ShortcutError};
use crate::core::limits::SLOW_HANDLER_THRESHOLD;
use crate::core::types::{AppId, ListenerId, SandboxResult};
use crate::lifecycle::{CleanupHook, CleanupHookRegistry, CleanupStats};
use crate::runtime::events::{DomEvent, EventBus, ListenerOptions, ListenerTarget};
use crate::runtime::window::ForegroundState;
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, error, info, warn};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
struct Registration {
    table: Arc<ShortcutTable>,
    config: ShortcutConfig,
}

struct RouterInner {
    registrations: DashMap<AppId, Registration, RandomState>,
    foreground: Arc<dyn ForegroundState>,
    default_config: ShortcutConfig,
    dispatching: AtomicBool,
}

/// Clears the dispatching flag even if the handler unwinds
struct DispatchGuard<'a>(&'a AtomicBool);

impl<'a> DispatchGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Routes keystrokes to at most one handler: the foreground, non-minimized
/// application's binding for the pressed combination
///
/// Foreground state is read live on every keystroke and never modified here.
#[derive(Clone)]
pub struct ShortcutRouter {
    inner: Arc<RouterInner>,
    listener: ListenerId,
}

impl ShortcutRouter {
    /// Install the router's single keydown listener on the document and
    /// register its teardown with `hooks`
    pub fn install(
        events: &EventBus,
        foreground: Arc<dyn ForegroundState>,
        default_config: ShortcutConfig,
        hooks: &CleanupHookRegistry,
    ) -> SandboxResult<Self> {
        let inner = Arc::new(RouterInner {
            registrations: DashMap::with_hasher(RandomState::new()),
            foreground,
            default_config,
            dispatching: AtomicBool::new(false),
        });

        let routed = Arc::clone(&inner);
        let listener = events.add_listener(
            ListenerTarget::Document,
            "keydown",
            Arc::new(move |event: &DomEvent| {
                routed.dispatch(event);
            }),
            ListenerOptions::default(),
        )?;
        info!("Shortcut router listening on document (listener {})", listener);

        let router = Self { inner, listener };
        hooks.register(router.clone());
        Ok(router)
    }

    pub fn listener_id(&self) -> ListenerId {
        self.listener
    }

    /// Bind a table for an application, replacing any previous table.
    /// A missing identifier is logged and the call does nothing.
    pub fn register_app(
        &self,
        app: &AppId,
        table: ShortcutTable,
        config: Option<ShortcutConfig>,
    ) -> bool {
        if app.is_empty() {
            let err = SandboxError::from(ShortcutError::MissingAppId);
            error!("Ignoring shortcut registration: {}", err);
            return false;
        }

        let count = table.len();
        let previous = self.inner.registrations.insert(
            app.clone(),
            Registration {
                table: Arc::new(table),
                config: config.unwrap_or(self.inner.default_config),
            },
        );
        match previous {
            Some(old) => info!(
                "Replaced {} shortcuts of {} with {}",
                old.table.len(),
                app,
                count
            ),
            None => info!("Registered {} shortcuts for {}", count, app),
        }
        true
    }

    /// Remove an application's table, returning how many shortcuts it held
    pub fn unregister_app(&self, app: &AppId) -> usize {
        match self.inner.registrations.remove(app) {
            Some((_, registration)) => {
                debug!("Unregistered {} shortcuts of {}", registration.table.len(), app);
                registration.table.len()
            }
            None => 0,
        }
    }

    pub fn is_registered(&self, app: &AppId) -> bool {
        self.inner.registrations.contains_key(app)
    }

    pub fn config(&self, app: &AppId) -> Option<ShortcutConfig> {
        self.inner.registrations.get(app).map(|r| r.config)
    }

    pub fn stats(&self) -> ShortcutStats {
        ShortcutStats {
            registered_apps: self.inner.registrations.len(),
            total_shortcuts: self
                .inner
                .registrations
                .iter()
                .map(|r| r.table.len())
                .sum(),
            active_app: self.inner.foreground.active_app(),
        }
    }

    pub fn state(&self) -> RouterState {
        if self.inner.dispatching.load(Ordering::Acquire) {
            RouterState::Dispatching
        } else {
            RouterState::Idle
        }
    }

    /// Route one keydown. The installed listener calls this for every
    /// document keydown; it is public for hosts that feed input directly.
    pub fn handle_keydown(&self, event: &DomEvent) -> DispatchOutcome {
        self.inner.dispatch(event)
    }
}

impl RouterInner {
    fn dispatch(&self, event: &DomEvent) -> DispatchOutcome {
        let Some(input) = event.key() else {
            return DispatchOutcome::NotKeyboard;
        };

        let Some(_guard) = DispatchGuard::try_acquire(&self.dispatching) else {
            debug!("Dropping keystroke '{}' raised during shortcut dispatch", input.key);
            return DispatchOutcome::Busy;
        };

        let Some(app) = self.foreground.active_app() else {
            return DispatchOutcome::NoForeground;
        };
        if self.foreground.is_minimized(&app) {
            return DispatchOutcome::Minimized(app);
        }

        let Some(registration) = self.registrations.get(&app).map(|r| r.clone()) else {
            return DispatchOutcome::NotRegistered(app);
        };

        let combo = KeyCombo::from_input(input);
        let Some(handler) = registration.table.get(&combo).cloned() else {
            return DispatchOutcome::Unmapped { app, combo };
        };

        if registration.config.prevent_default {
            event.prevent_default();
        }
        if registration.config.stop_propagation {
            event.stop_propagation();
        }

        if run_handler(&handler, event, &app, &combo) {
            DispatchOutcome::Handled { app, combo }
        } else {
            DispatchOutcome::Failed { app, combo }
        }
    }
}

/// Invoke a handler inside a failure boundary. Returns false on error or panic.
fn run_handler(handler: &ShortcutHandler, event: &DomEvent, app: &AppId, combo: &KeyCombo) -> bool {
    let start = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(|| handler(event)));

    let elapsed = start.elapsed();
    if elapsed > SLOW_HANDLER_THRESHOLD {
        warn!("Shortcut '{}' of {} took {:?}", combo, app, elapsed);
    }

    let reason = match outcome {
        Ok(Ok(())) => return true,
        Ok(Err(e)) => format!("{:#}", e),
        Err(_) => "handler panicked".to_string(),
    };
    let err = ShortcutError::HandlerFailed {
        app: app.as_str().into(),
        key: combo.canonical().into(),
        reason: reason.into(),
    };
    error!("{}", err);
    false
}

impl CleanupHook for ShortcutRouter {
    fn cleanup(&self, app: &AppId) -> CleanupStats {
        let removed = self.unregister_app(app);
        CleanupStats::freed(removed).with_type("bindings", removed)
    }

    fn hook_name(&self) -> &'static str {
        "shortcuts"
    }

    fn has_resources(&self, app: &AppId) -> bool {
        self.is_registered(app)
    }
}
