//! Event vocabulary of the host runtime.
//!
//! The runtime delivers every notification as a [`RawEvent`]: the service whose
//! stream fired, the sender the payload declares, an event name and a JSON
//! payload whose `dataType` field says which variant occurred. [`KioskEvent::decode`]
//! turns that into typed payloads so the flow logic can match exhaustively.
//!
//! Each payload enum carries a catch-all unit variant for discriminants this
//! application does not know about; those still decode, and the flow decides
//! what an unknown outcome means for the current step.

use std::fmt;
use std::str::FromStr;

use kiosk_core::{ServiceName, ServiceStatus};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PeripheralError, Result};

/// Name of an event stream exposed by a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventName {
    StatusChange,
    CardDebit,
    TransactionBank,
    TransactionConfirm,
    TransactionCancel,
    ReceiptPrint,
    RawHtmlPrint,
    BarcodeRead,
    CardRead,
    VitaleRead,
    InactivityChange,
}

impl EventName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::StatusChange => "statusChange",
            EventName::CardDebit => "cardDebit",
            EventName::TransactionBank => "transactionBank",
            EventName::TransactionConfirm => "transactionConfirm",
            EventName::TransactionCancel => "transactionCancel",
            EventName::ReceiptPrint => "receiptPrint",
            EventName::RawHtmlPrint => "rawHtmlPrint",
            EventName::BarcodeRead => "barcodeRead",
            EventName::CardRead => "cardRead",
            EventName::VitaleRead => "vitaleRead",
            EventName::InactivityChange => "inactivityChange",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = PeripheralError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "statusChange" => Ok(EventName::StatusChange),
            "cardDebit" => Ok(EventName::CardDebit),
            "transactionBank" => Ok(EventName::TransactionBank),
            "transactionConfirm" => Ok(EventName::TransactionConfirm),
            "transactionCancel" => Ok(EventName::TransactionCancel),
            "receiptPrint" => Ok(EventName::ReceiptPrint),
            "rawHtmlPrint" => Ok(EventName::RawHtmlPrint),
            "barcodeRead" => Ok(EventName::BarcodeRead),
            "cardRead" => Ok(EventName::CardRead),
            "vitaleRead" => Ok(EventName::VitaleRead),
            "inactivityChange" => Ok(EventName::InactivityChange),
            other => Err(PeripheralError::unknown_event(other)),
        }
    }
}

/// A listener registration: one event stream of one service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subscription {
    pub service: ServiceName,
    pub event: EventName,
}

impl Subscription {
    pub fn new(service: ServiceName, event: EventName) -> Self {
        Self { service, event }
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.service, self.event)
    }
}

/// Notification as delivered by the host runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Service whose event stream fired.
    pub service: String,

    /// Sender declared inside the notification.
    pub sender: String,

    pub name: String,

    #[serde(default)]
    pub data: Value,
}

/// Payload of a `cardDebit` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dataType")]
pub enum CardDebitEvent {
    #[serde(rename_all = "camelCase")]
    CardAcquired {
        #[serde(default)]
        card_type: String,
    },
    #[serde(rename_all = "camelCase")]
    TransactionAuthorized {
        #[serde(default)]
        ref_transaction: String,
    },
    #[serde(rename_all = "camelCase")]
    CardDebited {
        #[serde(default)]
        ref_transaction: String,
    },
    CardDebitError {
        #[serde(default)]
        code: String,
    },
    #[serde(other)]
    Unknown,
}

/// Payload of a cash `transactionBank` notification. Amounts are in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dataType")]
pub enum BankEvent {
    #[serde(rename_all = "camelCase")]
    CashAccepted {
        #[serde(default)]
        value: u64,
        #[serde(default)]
        total_inserted: u64,
    },
    CashRejected {
        #[serde(default)]
        source: String,
    },
    #[serde(rename_all = "camelCase")]
    TransactionAuthorized {
        #[serde(default)]
        ref_transaction: String,
    },
    #[serde(rename_all = "camelCase")]
    TransactionBanked {
        #[serde(default)]
        ref_transaction: String,
        #[serde(default)]
        confirmed_amount: u64,
        #[serde(default)]
        total_inserted: u64,
        #[serde(default)]
        total_returned: u64,
    },
    TransactionBankError {
        #[serde(default)]
        code: String,
    },
    #[serde(other)]
    Unknown,
}

/// Payload of a `transactionConfirm` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dataType")]
pub enum ConfirmEvent {
    TransactionConfirmed,
    TransactionConfirmError {
        #[serde(default)]
        code: String,
    },
    #[serde(other)]
    Unknown,
}

/// Payload of a `transactionCancel` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dataType")]
pub enum CancelEvent {
    TransactionCancelled,
    TransactionCancelError {
        #[serde(default)]
        code: String,
    },
    #[serde(other)]
    Unknown,
}

/// Outcome of a `rawHtmlPrint` or `receiptPrint` job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dataType")]
pub enum PrintEvent {
    RawHtmlPrinted,
    ReceiptPrinted,
    /// Any other discriminant is a failed job.
    #[serde(other)]
    Failed,
}

impl PrintEvent {
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, PrintEvent::RawHtmlPrinted | PrintEvent::ReceiptPrinted)
    }
}

/// Payload of a `barcodeRead` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dataType")]
pub enum BarcodeEvent {
    BarcodeRead {
        #[serde(default)]
        barcode: String,
    },
    #[serde(other)]
    Failed,
}

/// Payload of a smartcard `cardRead` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dataType")]
pub enum CardReadEvent {
    CardDetected,
    CardRemoved,
    #[serde(other)]
    Unknown,
}

/// Payload of a `vitaleRead` notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataType")]
pub enum VitaleEvent {
    VitaleRead {
        #[serde(rename = "beneficiaires", default)]
        beneficiaries: Vec<Value>,
    },
    VitaleReadError {
        #[serde(default)]
        code: String,
    },
    #[serde(other)]
    Unknown,
}

/// Payload of the session `inactivityChange` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dataType")]
pub enum InactivityEvent {
    MarkerReached,
    Timeout,
    WatchReset,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize, Deserialize)]
struct StatusChangeData {
    status: ServiceStatus,
}

/// Typed payload of a notification, one variant per event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    StatusChange(ServiceStatus),
    CardDebit(CardDebitEvent),
    TransactionBank(BankEvent),
    TransactionConfirm(ConfirmEvent),
    TransactionCancel(CancelEvent),
    ReceiptPrint(PrintEvent),
    RawHtmlPrint(PrintEvent),
    BarcodeRead(BarcodeEvent),
    CardRead(CardReadEvent),
    VitaleRead(VitaleEvent),
    InactivityChange(InactivityEvent),
}

impl EventPayload {
    /// Stream this payload belongs to.
    #[must_use]
    pub fn name(&self) -> EventName {
        match self {
            EventPayload::StatusChange(_) => EventName::StatusChange,
            EventPayload::CardDebit(_) => EventName::CardDebit,
            EventPayload::TransactionBank(_) => EventName::TransactionBank,
            EventPayload::TransactionConfirm(_) => EventName::TransactionConfirm,
            EventPayload::TransactionCancel(_) => EventName::TransactionCancel,
            EventPayload::ReceiptPrint(_) => EventName::ReceiptPrint,
            EventPayload::RawHtmlPrint(_) => EventName::RawHtmlPrint,
            EventPayload::BarcodeRead(_) => EventName::BarcodeRead,
            EventPayload::CardRead(_) => EventName::CardRead,
            EventPayload::VitaleRead(_) => EventName::VitaleRead,
            EventPayload::InactivityChange(_) => EventName::InactivityChange,
        }
    }

    /// Encode the payload as the JSON `data` object of a notification.
    ///
    /// # Errors
    /// Returns `PeripheralError::Json` if serialization fails.
    pub fn to_data(&self) -> Result<Value> {
        let data = match self {
            EventPayload::StatusChange(status) => {
                serde_json::to_value(StatusChangeData { status: *status })?
            }
            EventPayload::CardDebit(event) => serde_json::to_value(event)?,
            EventPayload::TransactionBank(event) => serde_json::to_value(event)?,
            EventPayload::TransactionConfirm(event) => serde_json::to_value(event)?,
            EventPayload::TransactionCancel(event) => serde_json::to_value(event)?,
            EventPayload::ReceiptPrint(event) | EventPayload::RawHtmlPrint(event) => {
                serde_json::to_value(event)?
            }
            EventPayload::BarcodeRead(event) => serde_json::to_value(event)?,
            EventPayload::CardRead(event) => serde_json::to_value(event)?,
            EventPayload::VitaleRead(event) => serde_json::to_value(event)?,
            EventPayload::InactivityChange(event) => serde_json::to_value(event)?,
        };
        Ok(data)
    }
}

/// Decoded notification.
#[derive(Debug, Clone, PartialEq)]
pub struct KioskEvent {
    pub service: ServiceName,
    pub sender: ServiceName,
    pub payload: EventPayload,
}

impl KioskEvent {
    /// Build an event whose declared sender is the emitting service.
    pub fn new(service: ServiceName, payload: EventPayload) -> Self {
        Self {
            sender: service.clone(),
            service,
            payload,
        }
    }

    /// Decode a raw runtime notification.
    ///
    /// # Errors
    /// Returns `PeripheralError::UnknownEvent` for names outside the vocabulary
    /// and `PeripheralError::InvalidData` when the payload lacks a `dataType` or
    /// has fields of the wrong type.
    pub fn decode(raw: RawEvent) -> Result<Self> {
        let name: EventName = raw.name.parse()?;
        let data = raw.data;
        let payload = match name {
            EventName::StatusChange => {
                let change: StatusChangeData = decode_payload(name, data)?;
                EventPayload::StatusChange(change.status)
            }
            EventName::CardDebit => EventPayload::CardDebit(decode_payload(name, data)?),
            EventName::TransactionBank => {
                EventPayload::TransactionBank(decode_payload(name, data)?)
            }
            EventName::TransactionConfirm => {
                EventPayload::TransactionConfirm(decode_payload(name, data)?)
            }
            EventName::TransactionCancel => {
                EventPayload::TransactionCancel(decode_payload(name, data)?)
            }
            EventName::ReceiptPrint => EventPayload::ReceiptPrint(decode_payload(name, data)?),
            EventName::RawHtmlPrint => EventPayload::RawHtmlPrint(decode_payload(name, data)?),
            EventName::BarcodeRead => EventPayload::BarcodeRead(decode_payload(name, data)?),
            EventName::CardRead => EventPayload::CardRead(decode_payload(name, data)?),
            EventName::VitaleRead => EventPayload::VitaleRead(decode_payload(name, data)?),
            EventName::InactivityChange => {
                EventPayload::InactivityChange(decode_payload(name, data)?)
            }
        };

        Ok(Self {
            service: ServiceName::from(raw.service),
            sender: ServiceName::from(raw.sender),
            payload,
        })
    }

    /// Encode back into the runtime wire shape.
    ///
    /// # Errors
    /// Returns `PeripheralError::Json` if the payload cannot be serialized.
    pub fn to_raw(&self) -> Result<RawEvent> {
        Ok(RawEvent {
            service: self.service.to_string(),
            sender: self.sender.to_string(),
            name: self.payload.name().to_string(),
            data: self.payload.to_data()?,
        })
    }

    /// Listener registration this event is delivered to.
    #[must_use]
    pub fn subscription(&self) -> Subscription {
        Subscription::new(self.service.clone(), self.payload.name())
    }
}

fn decode_payload<T: DeserializeOwned>(name: EventName, data: Value) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|err| PeripheralError::invalid_data(format!("{name} payload: {err}")))
}
