//! Peripheral boundary of the kiosk application.
//!
//! The kiosk host runtime exposes a fixed set of named services (payment
//! terminals, printers, readers, session management). Each service has a
//! status, request operations taking a key/value argument set, and named event
//! streams whose payloads carry a `dataType` discriminant. This crate models
//! that surface with strong types:
//!
//! - [`events`]: event names, subscriptions and typed payloads decoded from
//!   raw runtime notifications;
//! - [`commands`]: request operations and their wire arguments;
//! - [`traits`]: the [`KioskRuntime`] and [`LivenessProbe`] abstractions;
//! - [`liveness`]: the HTTP liveness probe used before dematerialized delivery;
//! - [`mock`]: in-memory runtime and probe for tests and demos.
//!
//! # Example
//!
//! ```
//! use kiosk_peripherals::events::{KioskEvent, RawEvent, EventPayload, CardDebitEvent};
//! use serde_json::json;
//!
//! let raw = RawEvent {
//!     service: "CardPayment".into(),
//!     sender: "CardPayment".into(),
//!     name: "cardDebit".into(),
//!     data: json!({"dataType": "CardDebitError", "code": "CardMute"}),
//! };
//!
//! let event = KioskEvent::decode(raw).unwrap();
//! assert_eq!(
//!     event.payload,
//!     EventPayload::CardDebit(CardDebitEvent::CardDebitError { code: "CardMute".into() })
//! );
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`][error::Result] with the
//! [`PeripheralError`] type. The orchestration layer logs these errors and
//! never lets them reach the host.

pub mod commands;
pub mod error;
pub mod events;
pub mod liveness;
pub mod mock;
pub mod traits;

pub use commands::PeripheralCommand;
pub use error::{PeripheralError, Result};
pub use events::{
    BankEvent, BarcodeEvent, CancelEvent, CardDebitEvent, CardReadEvent, ConfirmEvent, EventName,
    EventPayload, InactivityEvent, KioskEvent, PrintEvent, RawEvent, Subscription, VitaleEvent,
};
pub use liveness::HttpLivenessProbe;
pub use traits::{KioskRuntime, LivenessProbe};
