//! Host runtime boundary.
//!
//! [`KioskRuntime`] is everything the application needs from the kiosk host:
//! the declared services and their status, a few application properties,
//! listener registration, request operations and the event stream.
//! [`LivenessProbe`] abstracts the network check performed before a
//! dematerialized delivery.
//!
//! Methods use native `async fn` in traits (Edition 2024 RPITIT), so the traits
//! are used through generic parameters rather than trait objects.

#![allow(async_fn_in_trait)]

use std::future::Future;

use kiosk_core::{ServiceName, ServiceStatus};

use crate::commands::PeripheralCommand;
use crate::error::Result;
use crate::events::{RawEvent, Subscription};

/// The kiosk host runtime.
///
/// # Examples
///
/// ```no_run
/// use kiosk_peripherals::traits::KioskRuntime;
/// use kiosk_peripherals::Result;
///
/// async fn list_statuses<R: KioskRuntime>(runtime: &R) -> Result<Vec<String>> {
///     let mut lines = Vec::new();
///     for service in runtime.services().await? {
///         let status = runtime.service_status(&service).await?;
///         lines.push(format!("{service} ({status})"));
///     }
///     Ok(lines)
/// }
/// ```
pub trait KioskRuntime: Send {
    /// Services declared for the running application.
    async fn services(&self) -> Result<Vec<ServiceName>>;

    /// Current status of a declared service.
    async fn service_status(&self, service: &ServiceName) -> Result<ServiceStatus>;

    /// Free-text description from the application parameters.
    async fn app_description(&self) -> Result<String>;

    /// Whether the barcode reader scans without a manual trigger.
    async fn barcode_auto_trigger(&self) -> Result<bool>;

    /// Register a listener on an event stream.
    async fn subscribe(&mut self, subscription: &Subscription) -> Result<()>;

    /// Remove a listener. Removing an absent listener is not an error.
    async fn unsubscribe(&mut self, subscription: &Subscription) -> Result<()>;

    /// Issue a request operation. Results arrive later as events.
    async fn execute(&mut self, command: &PeripheralCommand) -> Result<()>;

    /// Wait for the next notification.
    ///
    /// Implementations must be cancel-safe: the driver polls this inside
    /// `tokio::select!` and drops the future when another branch wins.
    async fn next_event(&mut self) -> Result<RawEvent>;
}

/// Bounded-wait network check returning an HTTP status code.
///
/// The returned future is `Send` so probes can run on spawned tasks.
pub trait LivenessProbe: Send + Sync {
    fn probe(&self) -> impl Future<Output = Result<u16>> + Send;
}
