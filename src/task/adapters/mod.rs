//! Adapter implementations of the task ports.

pub mod filesystem;
pub mod identity;
pub mod memory;
