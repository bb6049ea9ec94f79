/*!
 * Namespace Sandbox
 * Per-application ownership of shared-namespace properties
 */

mod proxy;
mod tracker;

pub use proxy::{BoundFunction, NamespaceProxy, ReleaseSummary, Resolved};
pub use tracker::NamespaceTracker;
