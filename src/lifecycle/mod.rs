/*!
 * Application Lifecycle
 * Teardown coordination shared by every sandbox subsystem
 */

mod hooks;

pub use hooks::{CleanupHook, CleanupHookRegistry, CleanupReport, CleanupStats};
