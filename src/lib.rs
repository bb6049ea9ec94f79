/*!
 * Application Sandbox Kernel
 * Namespace ownership, resource accounting and shortcut routing for
 * applications sharing one host runtime
 */

pub mod core;
pub mod directory;
pub mod host;
pub mod keyboard;
pub mod lifecycle;
pub mod monitoring;
pub mod resources;
pub mod runtime;
pub mod sandbox;

// Re-exports
pub use crate::core::{
    AppId, HostConfig, InlineString, NamespaceError, SandboxError, SandboxResult, ShortcutError,
};
pub use directory::{AppDescriptor, AppDirectory, AppKind, HttpAppDirectory, StaticDirectory};
pub use host::{AppHost, AppHostBuilder};
pub use keyboard::{
    DispatchOutcome, KeyCombo, ShortcutConfig, ShortcutHandler, ShortcutRouter, ShortcutStats,
    ShortcutTable,
};
pub use lifecycle::{CleanupHook, CleanupHookRegistry, CleanupReport, CleanupStats};
pub use monitoring::{init_tracing, init_tracing_from_env, span_operation, FrameRateMeter};
pub use resources::{
    AccountingMode, AppAccountant, CleanupSummary, RefreshSink, ResourceAccounting,
    ResourceMonitor, ResourceSnapshot, SystemAggregate, SystemReport,
};
pub use runtime::{DomEvent, HostRuntime, KeyInput, ListenerOptions, ListenerTarget};
pub use sandbox::{NamespaceProxy, NamespaceTracker, Resolved};
