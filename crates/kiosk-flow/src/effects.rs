//! Side effects requested by the flow logic.
//!
//! The controller never talks to the runtime itself. Every transition returns
//! a list of [`Effect`]s which the driver applies in order.

use std::time::Duration;

use kiosk_core::constants::LIVENESS_NOT_FOUND;
use kiosk_peripherals::{PeripheralCommand, Subscription};

/// Something the driver must do on behalf of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Register a listener.
    Subscribe(Subscription),

    /// Remove a listener.
    Unsubscribe(Subscription),

    /// Issue a request operation.
    Execute(PeripheralCommand),

    /// Run the delivery liveness check for use-case run `run`.
    CheckLiveness { run: u64 },

    /// Report back with `token` once `after` has elapsed on the thanks page.
    ScheduleThanksReturn { token: u64, after: Duration },

    /// Restore the Ok application status once `after` has elapsed.
    ScheduleStatusRestore { after: Duration },
}

/// Result of a liveness check, as reported back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LivenessOutcome {
    /// The endpoint answered with this HTTP status.
    Status(u16),

    /// Transport failure or timeout.
    Failed(String),
}

impl LivenessOutcome {
    /// Returns `true` if the product can be considered delivered.
    ///
    /// A 404 answer and any transport failure both count as a failed delivery.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, LivenessOutcome::Status(status) if *status != LIVENESS_NOT_FOUND)
    }
}
