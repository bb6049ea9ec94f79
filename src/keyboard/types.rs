/*!
 * Shortcut Types
 * Tables, routing flags and dispatch outcomes
 */

use super::combo::KeyCombo;
use crate::core::errors::ShortcutError;
use crate::core::types::AppId;
use crate::runtime::events::DomEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Shortcut callback; errors and panics are contained by the router
pub type ShortcutHandler = Arc<dyn Fn(&DomEvent) -> anyhow::Result<()> + Send + Sync>;

/// Per-application routing flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    /// Suppress the default action of a matched keystroke
    pub prevent_default: bool,
    /// Stop the matched keystroke from reaching further listeners
    pub stop_propagation: bool,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            prevent_default: true,
            stop_propagation: false,
        }
    }
}

/// Key combination to handler map for one application
#[derive(Clone, Default)]
pub struct ShortcutTable {
    entries: HashMap<KeyCombo, ShortcutHandler>,
}

impl ShortcutTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style binding of a combination string such as `"ctrl+s"`
    pub fn bind<F>(mut self, combo: &str, handler: F) -> Result<Self, ShortcutError>
    where
        F: Fn(&DomEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.insert(combo.parse()?, Arc::new(handler));
        Ok(self)
    }

    /// Returns the handler previously bound to the combination
    pub fn insert(&mut self, combo: KeyCombo, handler: ShortcutHandler) -> Option<ShortcutHandler> {
        self.entries.insert(combo, handler)
    }

    pub fn get(&self, combo: &KeyCombo) -> Option<&ShortcutHandler> {
        self.entries.get(combo)
    }

    pub fn contains(&self, combo: &KeyCombo) -> bool {
        self.entries.contains_key(combo)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bound combinations in canonical order
    pub fn combos(&self) -> Vec<KeyCombo> {
        let mut combos: Vec<KeyCombo> = self.entries.keys().cloned().collect();
        combos.sort();
        combos
    }
}

impl fmt::Debug for ShortcutTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.combos().iter().map(|c| c.to_string())).finish()
    }
}

/// Router summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutStats {
    pub registered_apps: usize,
    pub total_shortcuts: usize,
    pub active_app: Option<AppId>,
}

/// Router state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouterState {
    Idle,
    Dispatching,
}

/// What happened to one keystroke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Event carried no key information
    NotKeyboard,
    /// A handler was already running; the keystroke was dropped
    Busy,
    NoForeground,
    Minimized(AppId),
    NotRegistered(AppId),
    Unmapped { app: AppId, combo: KeyCombo },
    Handled { app: AppId, combo: KeyCombo },
    /// The handler returned an error or panicked
    Failed { app: AppId, combo: KeyCombo },
}

impl DispatchOutcome {
    /// Whether a handler ran for the keystroke
    pub fn invoked(&self) -> bool {
        matches!(self, Self::Handled { .. } | Self::Failed { .. })
    }
}
