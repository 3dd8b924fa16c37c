//! Mock kiosk host runtime.
//!
//! [`MockKiosk`] implements [`KioskRuntime`] over an in-memory event channel.
//! The paired [`MockKioskHandle`] injects notifications and reads back the
//! [`Journal`] of everything the application subscribed to, unsubscribed from
//! and executed.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use kiosk_core::{ServiceName, ServiceStatus};
use tokio::sync::{Notify, mpsc};
use tracing::debug;

use crate::commands::PeripheralCommand;
use crate::error::{PeripheralError, Result};
use crate::events::{EventPayload, KioskEvent, RawEvent, Subscription};
use crate::traits::KioskRuntime;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Services a fully equipped kiosk declares.
pub const STANDARD_SERVICES: [ServiceName; 12] = [
    ServiceName::PanelPc,
    ServiceName::Network,
    ServiceName::Signaling,
    ServiceName::Session,
    ServiceName::OnscreenKbd,
    ServiceName::BarcodeReading,
    ServiceName::ReceiptPrinting,
    ServiceName::TicketPrinting,
    ServiceName::DocumentPrinting,
    ServiceName::CardPayment,
    ServiceName::CashPayment,
    ServiceName::VitaleCardReading,
];

/// One interaction recorded by the mock runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum JournalEntry {
    Subscribed(Subscription),
    Unsubscribed(Subscription),
    Executed(PeripheralCommand),
}

/// Timestamped record of the application's calls.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Vec<(DateTime<Utc>, JournalEntry)>,
    active: BTreeSet<Subscription>,
}

impl Journal {
    fn record(&mut self, entry: JournalEntry) {
        match &entry {
            JournalEntry::Subscribed(subscription) => {
                self.active.insert(subscription.clone());
            }
            JournalEntry::Unsubscribed(subscription) => {
                self.active.remove(subscription);
            }
            JournalEntry::Executed(_) => {}
        }
        self.entries.push((Utc::now(), entry));
    }

    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().map(|(_, entry)| entry)
    }

    pub fn timed_entries(&self) -> &[(DateTime<Utc>, JournalEntry)] {
        &self.entries
    }

    /// Executed commands, in call order.
    pub fn commands(&self) -> Vec<PeripheralCommand> {
        self.entries()
            .filter_map(|entry| match entry {
                JournalEntry::Executed(command) => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    /// Listeners currently registered.
    pub fn active_subscriptions(&self) -> Vec<Subscription> {
        self.active.iter().cloned().collect()
    }

    pub fn is_subscribed(&self, subscription: &Subscription) -> bool {
        self.active.contains(subscription)
    }

    /// How many times `subscription` was removed.
    pub fn unsubscribe_count(&self, subscription: &Subscription) -> usize {
        self.entries()
            .filter(|entry| matches!(entry, JournalEntry::Unsubscribed(s) if s == subscription))
            .count()
    }
}

#[derive(Debug, Default)]
struct Shared {
    journal: Mutex<Journal>,
    changed: Notify,
}

impl Shared {
    fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, entry: JournalEntry) {
        self.journal().record(entry);
        self.changed.notify_waiters();
    }
}

/// Mock kiosk host runtime.
///
/// # Examples
///
/// ```
/// use kiosk_core::ServiceName;
/// use kiosk_peripherals::events::{EventName, EventPayload, BarcodeEvent, Subscription};
/// use kiosk_peripherals::mock::MockKiosk;
/// use kiosk_peripherals::traits::KioskRuntime;
///
/// #[tokio::main]
/// async fn main() -> kiosk_peripherals::Result<()> {
///     let (mut kiosk, handle) = MockKiosk::new();
///
///     let read = Subscription::new(ServiceName::BarcodeReading, EventName::BarcodeRead);
///     kiosk.subscribe(&read).await?;
///     assert!(handle.is_subscribed(&read));
///
///     handle
///         .emit(
///             ServiceName::BarcodeReading,
///             EventPayload::BarcodeRead(BarcodeEvent::BarcodeRead {
///                 barcode: "3256220012345".to_string(),
///             }),
///         )
///         .await?;
///
///     let raw = kiosk.next_event().await?;
///     assert_eq!(raw.name, "barcodeRead");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKiosk {
    services: Vec<(ServiceName, ServiceStatus)>,
    description: String,
    barcode_auto_trigger: bool,
    rejected_operations: BTreeSet<String>,
    event_rx: mpsc::Receiver<RawEvent>,
    shared: Arc<Shared>,
}

impl MockKiosk {
    /// Kiosk declaring every standard service with status Ok.
    pub fn new() -> (Self, MockKioskHandle) {
        Self::builder()
            .services(STANDARD_SERVICES.iter().cloned())
            .build()
    }

    pub fn builder() -> MockKioskBuilder {
        MockKioskBuilder::default()
    }
}

impl KioskRuntime for MockKiosk {
    async fn services(&self) -> Result<Vec<ServiceName>> {
        Ok(self.services.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn service_status(&self, service: &ServiceName) -> Result<ServiceStatus> {
        self.services
            .iter()
            .find(|(name, _)| name == service)
            .map(|(_, status)| *status)
            .ok_or_else(|| PeripheralError::other(format!("service {service} is not declared")))
    }

    async fn app_description(&self) -> Result<String> {
        Ok(self.description.clone())
    }

    async fn barcode_auto_trigger(&self) -> Result<bool> {
        Ok(self.barcode_auto_trigger)
    }

    async fn subscribe(&mut self, subscription: &Subscription) -> Result<()> {
        debug!("mock subscribe {}", subscription);
        self.shared.record(JournalEntry::Subscribed(subscription.clone()));
        Ok(())
    }

    async fn unsubscribe(&mut self, subscription: &Subscription) -> Result<()> {
        debug!("mock unsubscribe {}", subscription);
        self.shared.record(JournalEntry::Unsubscribed(subscription.clone()));
        Ok(())
    }

    async fn execute(&mut self, command: &PeripheralCommand) -> Result<()> {
        if self.rejected_operations.contains(command.operation()) {
            return Err(PeripheralError::communication(format!(
                "{command} rejected by mock runtime"
            )));
        }
        debug!("mock execute {} {}", command, command.arguments());
        self.shared.record(JournalEntry::Executed(command.clone()));
        Ok(())
    }

    async fn next_event(&mut self) -> Result<RawEvent> {
        self.event_rx
            .recv()
            .await
            .ok_or_else(|| PeripheralError::disconnected("mock event channel closed"))
    }
}

/// Builder for [`MockKiosk`].
#[derive(Debug, Default)]
pub struct MockKioskBuilder {
    services: Vec<(ServiceName, ServiceStatus)>,
    description: String,
    barcode_auto_trigger: bool,
    rejected_operations: BTreeSet<String>,
}

impl MockKioskBuilder {
    /// Declare a service with the given initial status.
    #[must_use]
    pub fn service(mut self, name: ServiceName, status: ServiceStatus) -> Self {
        self.services.retain(|(existing, _)| existing != &name);
        self.services.push((name, status));
        self
    }

    /// Declare services with status Ok.
    #[must_use]
    pub fn services(self, names: impl IntoIterator<Item = ServiceName>) -> Self {
        names
            .into_iter()
            .fold(self, |builder, name| builder.service(name, ServiceStatus::Ok))
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn barcode_auto_trigger(mut self, enabled: bool) -> Self {
        self.barcode_auto_trigger = enabled;
        self
    }

    /// Make every call of `operation` fail with a communication error.
    #[must_use]
    pub fn reject_operation(mut self, operation: impl Into<String>) -> Self {
        self.rejected_operations.insert(operation.into());
        self
    }

    pub fn build(self) -> (MockKiosk, MockKioskHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let shared = Arc::new(Shared::default());

        let kiosk = MockKiosk {
            services: self.services,
            description: self.description,
            barcode_auto_trigger: self.barcode_auto_trigger,
            rejected_operations: self.rejected_operations,
            event_rx,
            shared: Arc::clone(&shared),
        };

        (kiosk, MockKioskHandle { event_tx, shared })
    }
}

/// Handle for driving a [`MockKiosk`] from tests. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MockKioskHandle {
    event_tx: mpsc::Sender<RawEvent>,
    shared: Arc<Shared>,
}

impl MockKioskHandle {
    /// Deliver a notification whose declared sender is `service`.
    ///
    /// # Errors
    /// Returns an error if the payload cannot be encoded or the kiosk was dropped.
    pub async fn emit(&self, service: ServiceName, payload: EventPayload) -> Result<()> {
        self.emit_event(KioskEvent::new(service, payload)).await
    }

    /// Deliver a typed notification.
    ///
    /// # Errors
    /// Returns an error if the payload cannot be encoded or the kiosk was dropped.
    pub async fn emit_event(&self, event: KioskEvent) -> Result<()> {
        self.emit_raw(event.to_raw()?).await
    }

    /// Deliver a notification exactly as given.
    ///
    /// # Errors
    /// Returns an error if the kiosk has been dropped.
    pub async fn emit_raw(&self, raw: RawEvent) -> Result<()> {
        self.event_tx
            .send(raw)
            .await
            .map_err(|_| PeripheralError::disconnected("mock event channel closed"))
    }

    /// Copy of the journal as it is now.
    pub fn journal(&self) -> Journal {
        self.shared.journal().clone()
    }

    pub fn commands(&self) -> Vec<PeripheralCommand> {
        self.shared.journal().commands()
    }

    pub fn is_subscribed(&self, subscription: &Subscription) -> bool {
        self.shared.journal().is_subscribed(subscription)
    }

    pub fn active_subscriptions(&self) -> Vec<Subscription> {
        self.shared.journal().active_subscriptions()
    }

    /// Wait until `check` holds on the journal.
    ///
    /// # Errors
    /// Returns `PeripheralError::Timeout` if it still does not hold after `timeout`.
    pub async fn wait_until<F>(&self, timeout: Duration, mut check: F) -> Result<()>
    where
        F: FnMut(&Journal) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let changed = self.shared.changed.notified();
            if check(&*self.shared.journal()) {
                return Ok(());
            }
            tokio::time::timeout_at(deadline, changed)
                .await
                .map_err(|_| PeripheralError::timeout(timeout.as_millis() as u64))?;
        }
    }

    /// Wait until a command matching `matches` has been executed and return it.
    ///
    /// # Errors
    /// Returns `PeripheralError::Timeout` if no such command shows up in time.
    pub async fn wait_for_command<F>(
        &self,
        timeout: Duration,
        matches: F,
    ) -> Result<PeripheralCommand>
    where
        F: Fn(&PeripheralCommand) -> bool,
    {
        let mut found = None;
        self.wait_until(timeout, |journal| {
            found = journal.commands().into_iter().find(|c| matches(c));
            found.is_some()
        })
        .await?;
        found.ok_or_else(|| PeripheralError::other("command vanished from journal"))
    }
}
