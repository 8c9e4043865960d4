//! Deadline (timeout) resiliency pattern for Tokio.
//!
//! Bound the wall-clock time of a unit of work by racing it against a timer,
//! handing the work a cooperative cancellation signal it may observe to stop
//! early.

pub mod deadline;
pub mod dispatch;
pub mod metrics;

pub use deadline::*;
pub use nexus_deadline_utils_rs::concurrent::{CancellationObserver, CancellationSignal};
