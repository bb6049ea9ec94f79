/*!
 * Global Namespace
 * The single shared, mutable property store every application would otherwise write into
 */

use crate::core::errors::NamespaceError;
use crate::core::InlineString;
use ahash::RandomState;
use dashmap::DashMap;
use log::trace;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Native callable stored in the namespace. Receives the namespace it is invoked on.
pub type NativeFn =
    Arc<dyn Fn(&GlobalNamespace, &[Value]) -> Result<Value, NamespaceError> + Send + Sync>;

/// Named native function
#[derive(Clone)]
pub struct NativeFunction {
    name: InlineString,
    func: NativeFn,
}

impl NativeFunction {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&GlobalNamespace, &[Value]) -> Result<Value, NamespaceError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Invoke with an explicit receiver
    pub fn call(
        &self,
        receiver: &GlobalNamespace,
        args: &[Value],
    ) -> Result<Value, NamespaceError> {
        (self.func)(receiver, args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// Value held by one namespace property
#[derive(Debug, Clone)]
pub enum Slot {
    Data(Value),
    Native(NativeFunction),
}

impl Slot {
    pub fn as_data(&self) -> Option<&Value> {
        match self {
            Slot::Data(v) => Some(v),
            Slot::Native(_) => None,
        }
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Slot::Data(value)
    }
}

impl From<NativeFunction> for Slot {
    fn from(func: NativeFunction) -> Self {
        Slot::Native(func)
    }
}

#[derive(Debug, Clone)]
struct Property {
    slot: Slot,
    /// Non-configurable: cannot be deleted
    locked: bool,
}

/// Shared global namespace handle
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct GlobalNamespace {
    props: Arc<DashMap<InlineString, Property, RandomState>>,
}

impl GlobalNamespace {
    pub fn new() -> Self {
        Self {
            props: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    /// Whether two handles refer to the same store
    pub fn ptr_eq(&self, other: &GlobalNamespace) -> bool {
        Arc::ptr_eq(&self.props, &other.props)
    }

    pub fn get(&self, name: &str) -> Option<Slot> {
        self.props.get(name).map(|p| p.slot.clone())
    }

    pub fn get_value(&self, name: &str) -> Option<Value> {
        self.props.get(name).and_then(|p| p.slot.as_data().cloned())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    /// Write a property. Overwriting keeps an existing lock.
    pub fn set(&self, name: &str, slot: impl Into<Slot>) -> Result<(), NamespaceError> {
        if name.is_empty() {
            return Err(NamespaceError::InvalidProperty(name.into()));
        }
        let slot = slot.into();
        self.props
            .entry(name.into())
            .and_modify(|p| p.slot = slot.clone())
            .or_insert(Property {
                slot,
                locked: false,
            });
        trace!("namespace write: {}", name);
        Ok(())
    }

    /// Define a property that can never be deleted
    pub fn define_locked(&self, name: &str, slot: impl Into<Slot>) -> Result<(), NamespaceError> {
        if name.is_empty() {
            return Err(NamespaceError::InvalidProperty(name.into()));
        }
        self.props.insert(
            name.into(),
            Property {
                slot: slot.into(),
                locked: true,
            },
        );
        Ok(())
    }

    /// Define a native function property
    pub fn define_native<F>(&self, name: &str, func: F) -> Result<(), NamespaceError>
    where
        F: Fn(&GlobalNamespace, &[Value]) -> Result<Value, NamespaceError> + Send + Sync + 'static,
    {
        self.set(name, NativeFunction::new(name, func))
    }

    /// Delete a property. Returns whether it existed.
    pub fn delete(&self, name: &str) -> Result<bool, NamespaceError> {
        if let Some(prop) = self.props.get(name) {
            if prop.locked {
                return Err(NamespaceError::NonConfigurable(name.into()));
            }
        }
        Ok(self.props.remove(name).is_some())
    }

    /// Invoke a native property with this namespace as receiver
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, NamespaceError> {
        match self.get(name) {
            Some(Slot::Native(func)) => func.call(self, args),
            _ => Err(NamespaceError::NotCallable(name.into())),
        }
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Property names in sorted order
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.props.iter().map(|e| e.key().to_string()).collect();
        keys.sort();
        keys
    }
}

impl Default for GlobalNamespace {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GlobalNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalNamespace")
            .field("properties", &self.props.len())
            .finish()
    }
}
