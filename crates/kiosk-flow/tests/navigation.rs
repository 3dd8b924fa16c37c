//! Menu selection, page changes, teardown and application-level events.

mod common;

use kiosk_core::constants::ARG_AMOUNT_IN_CENTS;
use kiosk_core::{AppStatusReport, Page, ServiceName, ServiceStatus};
use kiosk_flow::{Effect, FlowState, UiAction};
use kiosk_peripherals::{
    CardDebitEvent, EventName, EventPayload, InactivityEvent, KioskEvent, PeripheralCommand,
};
use rstest::rstest;

fn status_change(service: ServiceName, status: ServiceStatus) -> KioskEvent {
    common::event(service, EventPayload::StatusChange(status))
}

fn inactivity(change: InactivityEvent) -> KioskEvent {
    common::event(ServiceName::Session, EventPayload::InactivityChange(change))
}

#[rstest]
#[case::card("pay", "CardPayment, TicketPrinting")]
#[case::cash("cash", "CashPayment")]
#[case::vitale("vitale", "VitaleCardReading, DocumentPrinting")]
fn test_missing_services_block_menu(#[case] menu: &str, #[case] missing: &str) {
    let mut controller =
        common::controller_with(&[ServiceName::ReceiptPrinting, ServiceName::BarcodeReading]);

    let effects = controller.select_menu(menu);

    assert!(effects.is_empty());
    assert_eq!(controller.page(), Page::Home);
    let notice = controller.screen().notice.clone().expect("notice shown");
    assert!(notice.starts_with("Impossible d'utiliser ce menu"));
    assert!(notice.ends_with(missing));

    controller.apply(UiAction::DismissNotice);
    assert!(controller.screen().notice.is_none());
}

#[test]
fn test_pay_form_is_prefilled_with_defaults() {
    let mut controller = common::controller();
    controller.apply(UiAction::SelectMenu("pay".to_string()));

    assert_eq!(controller.page(), Page::PayForm);
    assert_eq!(controller.screen().input(Page::PayForm, ARG_AMOUNT_IN_CENTS), "1000");
    assert_eq!(
        controller.screen().input(Page::PayForm, "refShoppingCart"),
        "mon-ticket-1234"
    );
}

#[test]
fn test_return_home_tears_down_once() {
    let mut controller = common::controller();
    controller.select_menu("pay");
    controller.submit_form();
    controller.handle_event(common::event(
        ServiceName::CardPayment,
        EventPayload::CardDebit(CardDebitEvent::TransactionAuthorized {
            ref_transaction: "test-0000".to_string(),
        }),
    ));
    assert_eq!(controller.subscriptions().len(), 2);

    let effects = controller.apply(UiAction::ReturnHome);
    let removed = common::unsubscribes(&effects);
    assert_eq!(removed.len(), 2);
    assert!(removed.contains(&common::sub(ServiceName::CardPayment, EventName::CardDebit)));
    assert!(removed.contains(&common::sub(
        ServiceName::TicketPrinting,
        EventName::RawHtmlPrint
    )));
    assert!(controller.subscriptions().is_empty());
    assert!(controller.form().is_empty());
    assert!(matches!(controller.flow(), FlowState::Idle));
    assert_eq!(controller.active_menu(), None);

    assert!(controller.apply(UiAction::ReturnHome).is_empty());
}

#[test]
fn test_late_payment_event_after_teardown_is_ignored() {
    let mut controller = common::controller();
    controller.select_menu("pay");
    controller.submit_form();
    controller.return_home();

    let effects = controller.handle_event(common::event(
        ServiceName::CardPayment,
        EventPayload::CardDebit(CardDebitEvent::CardDebited {
            ref_transaction: "test-0000".to_string(),
        }),
    ));
    assert!(effects.is_empty());
    assert_eq!(controller.page(), Page::Home);
    assert!(controller.screen().instruction(Page::Pay).starts_with("Veuillez"));
}

#[test]
fn test_status_change_updates_status_bar() {
    let mut controller = common::controller_with(&[ServiceName::CardPayment]);
    assert_eq!(controller.screen().status_bar, vec!["CardPayment (Ok)".to_string()]);

    controller.handle_event(status_change(
        ServiceName::CardPayment,
        ServiceStatus::Critical,
    ));
    assert_eq!(
        controller.screen().status_bar,
        vec!["CardPayment (Critical)".to_string()]
    );
    assert_eq!(
        controller.registry().status(&ServiceName::CardPayment),
        Some(ServiceStatus::Critical)
    );
}

#[test]
fn test_keyboard_auto_show_enabled_once() {
    let mut controller = kiosk_flow::FlowController::new(kiosk_core::KioskConfig::default());
    let effects = controller.initialize(kiosk_flow::RuntimeSnapshot {
        services: vec![(ServiceName::OnscreenKbd, ServiceStatus::Critical)],
        description: common::DESCRIPTION.to_string(),
        barcode_auto_trigger: None,
    });
    assert!(!common::commands(&effects).contains(&PeripheralCommand::SetAutoShow { enabled: true }));

    let effects = controller.handle_event(status_change(ServiceName::OnscreenKbd, ServiceStatus::Ok));
    assert_eq!(
        common::commands(&effects),
        vec![PeripheralCommand::SetAutoShow { enabled: true }]
    );
    assert!(
        controller
            .handle_event(status_change(ServiceName::OnscreenKbd, ServiceStatus::Ok))
            .is_empty()
    );
}

#[test]
fn test_inactivity_banner_and_timeout() {
    let mut controller = common::controller();
    controller.select_menu("barcode");

    controller.handle_event(inactivity(InactivityEvent::MarkerReached));
    assert!(controller.screen().timeout_banner);
    controller.handle_event(inactivity(InactivityEvent::WatchReset));
    assert!(!controller.screen().timeout_banner);

    controller.handle_event(inactivity(InactivityEvent::MarkerReached));
    let effects = controller.handle_event(inactivity(InactivityEvent::Timeout));
    assert_eq!(controller.page(), Page::Home);
    assert!(!controller.screen().timeout_banner);
    assert_eq!(
        common::unsubscribes(&effects),
        vec![common::sub(ServiceName::BarcodeReading, EventName::BarcodeRead)]
    );
}

#[test]
fn test_error_menu_reports_critical_then_ok() {
    let mut controller = common::controller();
    let effects = controller.apply(UiAction::SelectMenu("error".to_string()));

    assert_eq!(
        common::commands(&effects),
        vec![PeripheralCommand::SetApplicationStatus(
            AppStatusReport::critical_test()
        )]
    );
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::ScheduleStatusRestore { .. })));
    assert_eq!(
        common::commands(&controller.on_status_restore()),
        vec![PeripheralCommand::SetApplicationStatus(AppStatusReport::ok())]
    );
}

#[test]
fn test_stale_thanks_timer_is_ignored() {
    let mut controller = common::controller();
    controller.select_menu("barcode");
    controller.handle_event(common::event(
        ServiceName::BarcodeReading,
        EventPayload::BarcodeRead(kiosk_peripherals::BarcodeEvent::BarcodeRead {
            barcode: "1".to_string(),
        }),
    ));
    let effects = controller.handle_event(common::event(
        ServiceName::ReceiptPrinting,
        EventPayload::RawHtmlPrint(common::html_printed()),
    ));
    let token = common::thanks_token(&effects).expect("thanks timer scheduled");

    // The user left the thanks page before the timer fired.
    controller.return_home();
    controller.select_menu("barcode");
    assert!(controller.on_thanks_elapsed(token).is_empty());
    assert_eq!(controller.page(), Page::Barcode);
}

#[test]
fn test_menu_ignored_outside_home() {
    let mut controller = common::controller();
    controller.select_menu("barcode");
    assert!(controller.select_menu("vitale").is_empty());
    assert_eq!(controller.page(), Page::Barcode);
}
