//! Mock runtime implementations for testing and demos.
//!
//! These stand in for the kiosk host: tests inject notifications through a
//! handle and inspect what the application subscribed to and requested.

pub mod liveness;
pub mod runtime;

pub use liveness::{LivenessReply, MockLiveness};
pub use runtime::{Journal, JournalEntry, MockKiosk, MockKioskBuilder, MockKioskHandle};
