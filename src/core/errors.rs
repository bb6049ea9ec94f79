/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::data_structures::InlineString;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shared namespace errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum NamespaceError {
    #[error("Property '{0}' is non-configurable and cannot be deleted")]
    #[diagnostic(
        code(namespace::non_configurable),
        help("The property was defined locked by the host. Locked globals outlive applications.")
    )]
    NonConfigurable(InlineString),

    #[error("Property '{0}' is not callable")]
    #[diagnostic(
        code(namespace::not_callable),
        help("Only native functions stored in the namespace can be invoked.")
    )]
    NotCallable(InlineString),

    #[error("Invalid property name: {0}")]
    #[diagnostic(
        code(namespace::invalid_property),
        help("Property names must be non-empty.")
    )]
    InvalidProperty(InlineString),

    #[error("Native function '{name}' failed: {reason}")]
    #[diagnostic(code(namespace::call_failed))]
    CallFailed {
        name: InlineString,
        reason: InlineString,
    },
}

/// Shared event bus errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum EventError {
    #[error("Listener {id} for '{event_type}' not registered on {target}")]
    #[diagnostic(
        code(events::listener_not_found),
        help("The listener may already have been removed, or was registered with different options.")
    )]
    ListenerNotFound {
        target: InlineString,
        event_type: InlineString,
        id: u64,
    },

    #[error("Invalid event type: {0}")]
    #[diagnostic(code(events::invalid_type), help("Event types must be non-empty."))]
    InvalidEventType(InlineString),
}

/// Keyboard shortcut errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ShortcutError {
    #[error("Invalid key combination: {0}")]
    #[diagnostic(
        code(shortcut::invalid_combo),
        help("Use '+'-separated modifiers followed by one key, e.g. 'ctrl+shift+s'.")
    )]
    InvalidCombo(InlineString),

    #[error("Shortcut registration is missing an application identifier")]
    #[diagnostic(
        code(shortcut::missing_app_id),
        help("Pass the identifier of the running application that owns the shortcuts.")
    )]
    MissingAppId,

    #[error("Shortcut handler for '{key}' in {app} failed: {reason}")]
    #[diagnostic(code(shortcut::handler_failed))]
    HandlerFailed {
        app: InlineString,
        key: InlineString,
        reason: InlineString,
    },
}

/// Application registry errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum DirectoryError {
    #[error("Registry request failed: {0}")]
    #[diagnostic(
        code(directory::request_failed),
        help("The application registry backend is unreachable. Displays will use cached data.")
    )]
    RequestFailed(InlineString),

    #[error("Registry returned an unexpected payload: {0}")]
    #[diagnostic(code(directory::decode_failed))]
    DecodeFailed(InlineString),
}

/// Unified sandbox error type with miette diagnostics
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum SandboxError {
    #[error("Namespace error: {0}")]
    #[diagnostic(transparent)]
    Namespace(#[from] NamespaceError),

    #[error("Event error: {0}")]
    #[diagnostic(transparent)]
    Event(#[from] EventError),

    #[error("Shortcut error: {0}")]
    #[diagnostic(transparent)]
    Shortcut(#[from] ShortcutError),

    #[error("Directory error: {0}")]
    #[diagnostic(transparent)]
    Directory(#[from] DirectoryError),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(sandbox::configuration_error),
        help("Invalid configuration. Review configuration parameters.")
    )]
    Configuration(InlineString),

    #[error("Cleanup of {item} for {app} failed: {reason}")]
    #[diagnostic(
        code(sandbox::cleanup_failure),
        help("Remaining items were still cleaned up; this one may have leaked.")
    )]
    CleanupFailure {
        app: InlineString,
        item: InlineString,
        reason: InlineString,
    },

    #[error("Internal error: {0}")]
    #[diagnostic(
        code(sandbox::internal_error),
        help("An unexpected internal error occurred. Please report this issue.")
    )]
    Internal(InlineString),
}

impl From<String> for SandboxError {
    fn from(msg: String) -> Self {
        SandboxError::Internal(msg.into())
    }
}

impl From<&str> for SandboxError {
    fn from(msg: &str) -> Self {
        SandboxError::Internal(msg.into())
    }
}
