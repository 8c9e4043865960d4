mod cancellation_signal;
mod result_slot;

pub use self::{cancellation_signal::*, result_slot::*};
