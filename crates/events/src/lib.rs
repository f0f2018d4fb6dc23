//! Event system for quote runs
//!
//! This crate provides the event bus and the lifecycle events a quote run
//! publishes for subscribers that prefer a stream over a progress callback.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;
