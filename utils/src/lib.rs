//! Concurrency primitives shared by the deadline executor.

pub mod concurrent;
