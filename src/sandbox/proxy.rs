/*!
 * Namespace Proxy
 * Per-application view of the shared namespace that records every write
 */

use crate::core::errors::NamespaceError;
use crate::core::types::AppId;
use crate::core::InlineString;
use crate::runtime::namespace::{GlobalNamespace, NativeFunction, Slot};
use log::{debug, warn};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Native function pre-bound to the real shared namespace
#[derive(Debug, Clone)]
pub struct BoundFunction {
    func: NativeFunction,
    receiver: GlobalNamespace,
}

impl BoundFunction {
    pub fn name(&self) -> &str {
        self.func.name()
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, NamespaceError> {
        self.func.call(&self.receiver, args)
    }
}

/// Result of reading a property through a proxy
#[derive(Debug, Clone)]
pub enum Resolved {
    /// Plain data
    Value(Value),
    /// Native function the caller must invoke with a receiver
    Function(NativeFunction),
    /// Allow-listed native, already bound to the shared namespace
    Bound(BoundFunction),
}

impl Resolved {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Resolved::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Outcome of releasing a proxy's owned properties
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub deleted: usize,
    pub failed: usize,
}

/// Capability-scoped accessor to the shared namespace for one application
///
/// Reads pass through. Writes and deletes are recorded before being forwarded,
/// so teardown can remove exactly what the application introduced.
pub struct NamespaceProxy {
    app: AppId,
    global: GlobalNamespace,
    bound_globals: Arc<[String]>,
    owned: Mutex<BTreeSet<InlineString>>,
    retired: AtomicBool,
}

impl NamespaceProxy {
    pub(crate) fn new(app: AppId, global: GlobalNamespace, bound_globals: Arc<[String]>) -> Self {
        Self {
            app,
            global,
            bound_globals,
            owned: Mutex::new(BTreeSet::new()),
            retired: AtomicBool::new(false),
        }
    }

    pub fn app_id(&self) -> &AppId {
        &self.app
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    pub fn get(&self, name: &str) -> Option<Resolved> {
        match self.global.get(name)? {
            Slot::Data(value) => Some(Resolved::Value(value)),
            Slot::Native(func) if self.bound_globals.iter().any(|g| g == name) => {
                Some(Resolved::Bound(BoundFunction {
                    func,
                    receiver: self.global.clone(),
                }))
            }
            Slot::Native(func) => Some(Resolved::Function(func)),
        }
    }

    pub fn get_value(&self, name: &str) -> Option<Value> {
        self.global.get_value(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.global.contains(name)
    }

    /// Record ownership, then write through to the shared namespace
    pub fn set(&self, name: &str, slot: impl Into<Slot>) -> Result<(), NamespaceError> {
        if name.is_empty() {
            return Err(NamespaceError::InvalidProperty(name.into()));
        }
        if self.is_retired() {
            debug!("Ignoring write of '{}' through retired proxy of {}", name, self.app);
            return Ok(());
        }

        self.owned.lock().insert(name.into());
        self.global.set(name, slot)
    }

    /// Convenience for data writes
    pub fn set_value(&self, name: &str, value: impl Into<Value>) -> Result<(), NamespaceError> {
        self.set(name, Slot::Data(value.into()))
    }

    /// Drop ownership, then delete from the shared namespace
    pub fn delete(&self, name: &str) -> Result<bool, NamespaceError> {
        if self.is_retired() {
            debug!("Ignoring delete of '{}' through retired proxy of {}", name, self.app);
            return Ok(false);
        }

        self.owned.lock().remove(name);
        self.global.delete(name)
    }

    /// Invoke a native property with the shared namespace as receiver
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, NamespaceError> {
        match self.get(name) {
            Some(Resolved::Bound(bound)) => bound.call(args),
            Some(Resolved::Function(func)) => func.call(&self.global, args),
            _ => Err(NamespaceError::NotCallable(name.into())),
        }
    }

    pub fn owns(&self, name: &str) -> bool {
        self.owned.lock().contains(name)
    }

    pub fn owned_count(&self) -> usize {
        self.owned.lock().len()
    }

    /// Owned property names in sorted order
    pub fn owned_properties(&self) -> Vec<String> {
        self.owned.lock().iter().map(|p| p.to_string()).collect()
    }

    /// Retire the proxy and delete every owned property, best-effort
    pub(crate) fn release(&self) -> ReleaseSummary {
        self.retired.store(true, Ordering::Release);
        let owned = std::mem::take(&mut *self.owned.lock());

        let mut summary = ReleaseSummary::default();
        for name in owned {
            match self.global.delete(name.as_str()) {
                Ok(true) => summary.deleted += 1,
                Ok(false) => debug!("Property '{}' of {} already gone", name, self.app),
                Err(e) => {
                    warn!("Failed to delete property '{}' of {}: {}", name, self.app, e);
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

impl fmt::Debug for NamespaceProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceProxy")
            .field("app", &self.app)
            .field("owned", &self.owned_count())
            .field("retired", &self.is_retired())
            .finish()
    }
}
