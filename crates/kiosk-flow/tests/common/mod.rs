//! Common test utilities for kiosk-flow integration tests.
//!
//! Helpers fall in three groups:
//!
//! 1. **Builders** (`controller_with`, `all_services`) set up an initialized
//!    controller against a chosen set of declared services.
//! 2. **Event helpers** (`event`, `print_ok`, ...) build typed notifications.
//! 3. **Effect finders** (`commands`, `subscribes`, ...) pick effects out of a
//!    step result.

#![allow(dead_code)]

use kiosk_core::{KioskConfig, ServiceName, ServiceStatus};
use kiosk_flow::{Effect, FlowController, RuntimeSnapshot};
use kiosk_peripherals::{
    EventName, EventPayload, KioskEvent, PeripheralCommand, PrintEvent, Subscription,
};

pub const DESCRIPTION: &str = "Borne de test";

/// Every service the use cases need, plus the keyboard and session.
pub fn all_services() -> Vec<ServiceName> {
    vec![
        ServiceName::CardPayment,
        ServiceName::CashPayment,
        ServiceName::ReceiptPrinting,
        ServiceName::TicketPrinting,
        ServiceName::DocumentPrinting,
        ServiceName::BarcodeReading,
        ServiceName::VitaleCardReading,
        ServiceName::OnscreenKbd,
    ]
}

/// Initialized controller with `services` declared Ok and a manual barcode reader.
pub fn controller_with(services: &[ServiceName]) -> FlowController {
    controller_with_config(services, KioskConfig::default())
}

pub fn controller_with_config(services: &[ServiceName], config: KioskConfig) -> FlowController {
    let mut controller = FlowController::new(config);
    controller.initialize(RuntimeSnapshot {
        services: services
            .iter()
            .map(|service| (service.clone(), ServiceStatus::Ok))
            .collect(),
        description: DESCRIPTION.to_string(),
        barcode_auto_trigger: Some(false),
    });
    controller
}

pub fn controller() -> FlowController {
    controller_with(&all_services())
}

pub fn event(service: ServiceName, payload: EventPayload) -> KioskEvent {
    KioskEvent::new(service, payload)
}

/// Successful `rawHtmlPrint` result.
pub fn html_printed() -> PrintEvent {
    PrintEvent::RawHtmlPrinted
}

/// Successful card `receiptPrint` result.
pub fn receipt_printed() -> PrintEvent {
    PrintEvent::ReceiptPrinted
}

pub fn print_failed() -> PrintEvent {
    PrintEvent::Failed
}

pub fn sub(service: ServiceName, event: EventName) -> Subscription {
    Subscription::new(service, event)
}

/// Commands executed by a step, in order.
pub fn commands(effects: &[Effect]) -> Vec<PeripheralCommand> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Execute(command) => Some(command.clone()),
            _ => None,
        })
        .collect()
}

pub fn subscribes(effects: &[Effect]) -> Vec<Subscription> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Subscribe(subscription) => Some(subscription.clone()),
            _ => None,
        })
        .collect()
}

pub fn unsubscribes(effects: &[Effect]) -> Vec<Subscription> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Unsubscribe(subscription) => Some(subscription.clone()),
            _ => None,
        })
        .collect()
}

/// Token of the thanks-page timer scheduled by a step, if any.
pub fn thanks_token(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|effect| match effect {
        Effect::ScheduleThanksReturn { token, .. } => Some(*token),
        _ => None,
    })
}
