/*!
 * Core Types
 * Common types used across the sandbox layer
 */

use super::data_structures::InlineString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timer handle issued by the event loop
pub type TimerHandle = u64;

/// Listener handle issued by the event bus
pub type ListenerId = u64;

/// Render tree node identifier
pub type NodeId = u64;

/// Network handle identifier
pub type SocketId = u64;

/// Timestamp in milliseconds of event-loop time
pub type Timestamp = u64;

/// Common result type for sandbox operations
pub type SandboxResult<T> = Result<T, super::errors::SandboxError>;

/// Opaque identifier of one running application instance
///
/// Unique per launch; never reused while any component may still hold it.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(InlineString);

impl AppId {
    pub fn new(id: impl Into<InlineString>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh instance identifier for an application type
    pub fn generate(prefix: &str) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", prefix, &suffix[..8]).into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AppId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for AppId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
