/*!
 * System Limits and Constants
 *
 * Centralized location for sandbox-wide limits, defaults and fixed tables.
 * Organized by domain.
 */

use std::time::Duration;

// =============================================================================
// NAMESPACE
// =============================================================================

/// Globals that must be invoked with the real shared namespace as receiver.
/// Reads of these names through an application proxy return pre-bound callables.
pub const BOUND_GLOBALS: &[&str] = &[
    "setTimeout",
    "setInterval",
    "clearTimeout",
    "clearInterval",
    "requestAnimationFrame",
    "cancelAnimationFrame",
    "queueMicrotask",
    "fetch",
    "alert",
    "confirm",
    "prompt",
    "addEventListener",
    "removeEventListener",
    "dispatchEvent",
    "getComputedStyle",
];

// =============================================================================
// RENDER TREE
// =============================================================================

/// Attribute marking the root container of an application's subtree
pub const APP_ROOT_ATTRIBUTE: &str = "data-app-id";

/// Element kinds counted as a listener estimate for cooperative applications
pub const INTERACTIVE_TAGS: &[&str] = &["button", "input", "select", "textarea", "a"];

/// Attribute prefix of inline event handlers (`onclick`, `oninput`, ...)
pub const INLINE_HANDLER_PREFIX: &str = "on";

// =============================================================================
// DASHBOARD / DIRECTORY
// =============================================================================

/// Default period of the resource dashboard refresh
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// Development refresh period
pub const DEV_REFRESH_INTERVAL: Duration = Duration::from_millis(500);

/// Timeout for application registry requests
pub const DEFAULT_DIRECTORY_TIMEOUT: Duration = Duration::from_secs(5);

/// Application registry listing path, relative to the backend base URL
pub const DIRECTORY_APPS_PATH: &str = "/api/apps";

// =============================================================================
// OBSERVABILITY
// =============================================================================

/// Operations slower than this are logged as warnings
pub const SLOW_OPERATION_THRESHOLD: Duration = Duration::from_millis(100);

/// Shortcut handlers slower than this are logged as warnings
pub const SLOW_HANDLER_THRESHOLD: Duration = Duration::from_millis(16);
