// Outbound work (clipboard writes, ticket submission) runs through here so
// every call gets the same timeout, cancellation and failure reporting.

pub mod handlers;
pub mod registry;
pub mod runner;

pub use registry::{TaskRecord, TaskRegistry};
pub use runner::{report, run_outbound, Liveness, TaskError};
