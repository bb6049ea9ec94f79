/*!
 * Application Directory
 * Registry of installed applications consumed by the host and dashboard
 */

mod http;

pub use http::HttpAppDirectory;

use crate::core::types::SandboxResult;
use crate::resources::AccountingMode;
use futures::future::{self, BoxFuture};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where an application comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppKind {
    /// Shipped with the shell and trusted to instrument itself
    Builtin,
    /// Installed by the user; runs under full interception
    UserApp,
    #[default]
    #[serde(other)]
    Unknown,
}

impl AppKind {
    /// Accounting variant for applications of this kind
    pub fn accounting_mode(self) -> AccountingMode {
        match self {
            AppKind::Builtin => AccountingMode::Cooperative,
            AppKind::UserApp | AppKind::Unknown => AccountingMode::Tracked,
        }
    }
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// One installed application, as listed by `GET /api/apps`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: AppKind,
    #[serde(default = "default_version")]
    pub version: String,
}

impl AppDescriptor {
    pub fn new(id: &str, name: &str, kind: AppKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: String::new(),
            description: String::new(),
            kind,
            version: default_version(),
        }
    }

    pub fn builtin(id: &str, name: &str) -> Self {
        Self::new(id, name, AppKind::Builtin)
    }

    pub fn user_app(id: &str, name: &str) -> Self {
        Self::new(id, name, AppKind::UserApp)
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }
}

/// Registry lookup used by the host and the resource dashboard
pub trait AppDirectory: Send + Sync {
    /// Cached lookup by descriptor id
    fn lookup(&self, id: &str) -> Option<AppDescriptor>;

    /// Fetch the full installed list; may suspend on network I/O
    fn fetch_installed(&self) -> BoxFuture<'_, SandboxResult<Vec<AppDescriptor>>>;
}

/// In-memory directory
#[derive(Clone, Default)]
pub struct StaticDirectory {
    apps: Arc<RwLock<Vec<AppDescriptor>>>,
}

impl StaticDirectory {
    pub fn new(apps: Vec<AppDescriptor>) -> Self {
        Self {
            apps: Arc::new(RwLock::new(apps)),
        }
    }

    /// Add or replace a descriptor by id
    pub fn install(&self, descriptor: AppDescriptor) {
        let mut apps = self.apps.write();
        match apps.iter_mut().find(|a| a.id == descriptor.id) {
            Some(existing) => *existing = descriptor,
            None => apps.push(descriptor),
        }
    }

    pub fn len(&self) -> usize {
        self.apps.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.read().is_empty()
    }
}

impl AppDirectory for StaticDirectory {
    fn lookup(&self, id: &str) -> Option<AppDescriptor> {
        self.apps.read().iter().find(|a| a.id == id).cloned()
    }

    fn fetch_installed(&self) -> BoxFuture<'_, SandboxResult<Vec<AppDescriptor>>> {
        Box::pin(future::ready(Ok(self.apps.read().clone())))
    }
}
