//! Use-case orchestration for the kiosk application.
//!
//! This crate holds the application logic between the UI and the host
//! runtime: which services are usable, which page is visible, what the user
//! typed, and how each guided transaction (card payment, cash payment, barcode
//! read, Vitale card read) reacts to peripheral events.
//!
//! The [`FlowController`] is synchronous and returns [`Effect`]s. The
//! [`KioskDriver`] owns a [`KioskRuntime`](kiosk_peripherals::KioskRuntime)
//! and a [`LivenessProbe`](kiosk_peripherals::LivenessProbe), feeds the
//! controller and applies what it returns.

pub mod controller;
pub mod display;
pub mod driver;
pub mod effects;
pub mod form;
pub mod navigator;
pub mod receipts;
pub mod registry;
pub mod subscriptions;
pub mod translator;
pub mod use_cases;

pub use controller::{FlowController, FlowState, RuntimeSnapshot, UiAction};
pub use display::Screen;
pub use driver::KioskDriver;
pub use effects::{Effect, LivenessOutcome};
pub use form::FormCollector;
pub use navigator::PageNavigator;
pub use registry::ServiceRegistry;
pub use subscriptions::SubscriptionSet;
pub use translator::{ErrorDomain, RecoveryAction, Translation, translate};
pub use use_cases::ActiveFlow;
