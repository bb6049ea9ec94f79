/*!
 * Resource Accountant
 * Per-application timer, listener and render accounting with system aggregates
 */

mod accountant;
mod cooperative;
mod ledger;
mod monitor;
mod tracked;
mod types;

pub use accountant::{AppAccountant, ResourceAccounting};
pub use cooperative::CooperativeAccountant;
pub use monitor::ResourceMonitor;
pub use tracked::TrackedAccountant;
pub use types::{
    AccountingMode, AppResourceRow, CleanupSummary, DerivedMetrics, RefreshSink,
    ResourceSnapshot, SystemAggregate, SystemReport,
};
