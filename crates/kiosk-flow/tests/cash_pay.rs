//! Cash payment scenarios, including delivery liveness outcomes.

mod common;

use kiosk_core::constants::{MSG_CANCELLING, MSG_DELIVERED, MSG_RECEIPT_COLLECT};
use kiosk_core::{KioskConfig, ListenerLifetime, Page, ServiceName, UseCase};
use kiosk_flow::{Effect, FlowController, FlowState, LivenessOutcome};
use kiosk_peripherals::{BankEvent, EventName, EventPayload, KioskEvent, PeripheralCommand};
use rstest::rstest;

fn bank(payload: BankEvent) -> KioskEvent {
    common::event(
        ServiceName::CashPayment,
        EventPayload::TransactionBank(payload),
    )
}

fn authorized() -> KioskEvent {
    bank(BankEvent::TransactionAuthorized {
        ref_transaction: "test-0000".to_string(),
    })
}

fn start_cash(controller: &mut FlowController) -> Vec<Effect> {
    controller.select_menu("cash");
    controller.submit_form()
}

/// Run number carried by the liveness check a step requested.
fn liveness_run(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|effect| match effect {
        Effect::CheckLiveness { run } => Some(*run),
        _ => None,
    })
}

#[test]
fn test_cash_payment_starts_bank_transaction() {
    let mut controller = common::controller();
    let effects = start_cash(&mut controller);

    assert_eq!(controller.page(), Page::Cash);
    assert_eq!(
        common::subscribes(&effects),
        vec![common::sub(ServiceName::CashPayment, EventName::TransactionBank)]
    );
    assert!(matches!(
        &common::commands(&effects)[..],
        [
            PeripheralCommand::CloseSession { .. },
            PeripheralCommand::BankTransaction(args)
        ] if args.amount_in_cents == 1000
    ));
}

#[test]
fn test_coin_events_update_instruction() {
    let mut controller = common::controller();
    start_cash(&mut controller);

    controller.handle_event(bank(BankEvent::CashAccepted {
        value: 200,
        total_inserted: 700,
    }));
    assert_eq!(
        controller.screen().instruction(Page::Cash),
        "Montant inséré: 2.00 &euro; | Total inséré: 7.00 &euro;"
    );

    controller.handle_event(bank(BankEvent::CashRejected {
        source: "CoinAcceptor".to_string(),
    }));
    assert_eq!(
        controller.screen().instruction(Page::Cash),
        "Monnaie refusée par: CoinAcceptor"
    );
}

#[rstest]
#[case::ok(LivenessOutcome::Status(200))]
#[case::server_error(LivenessOutcome::Status(500))]
fn test_delivery_confirms_unless_not_found(#[case] outcome: LivenessOutcome) {
    let mut controller = common::controller();
    start_cash(&mut controller);

    let run = liveness_run(&controller.handle_event(authorized())).expect("liveness requested");
    let effects = controller.on_liveness_result(run, outcome);

    assert_eq!(
        common::commands(&effects),
        vec![PeripheralCommand::ConfirmTransaction {
            service: ServiceName::CashPayment,
            amount_in_cents: 1000,
        }]
    );
    assert_eq!(
        common::subscribes(&effects),
        vec![common::sub(ServiceName::CashPayment, EventName::TransactionConfirm)]
    );
    assert_eq!(controller.screen().instruction(Page::Cash), MSG_DELIVERED);
}

#[rstest]
#[case::not_found(LivenessOutcome::Status(404))]
#[case::timeout(LivenessOutcome::Failed("no answer after 5000ms".to_string()))]
fn test_delivery_failure_cancels_on_cash_service(#[case] outcome: LivenessOutcome) {
    let mut controller = common::controller();
    start_cash(&mut controller);

    let run = liveness_run(&controller.handle_event(authorized())).expect("liveness requested");
    let effects = controller.on_liveness_result(run, outcome);

    assert_eq!(
        common::commands(&effects),
        vec![PeripheralCommand::CancelTransaction {
            service: ServiceName::CashPayment
        }]
    );
    assert_eq!(
        common::subscribes(&effects),
        vec![common::sub(ServiceName::CashPayment, EventName::TransactionCancel)]
    );
    assert_eq!(controller.screen().instruction(Page::Cash), MSG_CANCELLING);
}

#[test]
fn test_stale_liveness_result_is_dropped() {
    let mut controller = common::controller();
    start_cash(&mut controller);
    let run = liveness_run(&controller.handle_event(authorized())).expect("liveness requested");

    controller.return_home();
    start_cash(&mut controller);

    assert!(
        controller
            .on_liveness_result(run, LivenessOutcome::Status(200))
            .is_empty()
    );
}

#[test]
fn test_banked_transaction_prints_vat_receipt_and_finishes() {
    let mut controller = common::controller();
    start_cash(&mut controller);

    let effects = controller.handle_event(bank(BankEvent::TransactionBanked {
        ref_transaction: "test-0000".to_string(),
        confirmed_amount: 1100,
        total_inserted: 1200,
        total_returned: 100,
    }));
    assert!(
        common::unsubscribes(&effects)
            .contains(&common::sub(ServiceName::CashPayment, EventName::TransactionBank))
    );
    let html = match &common::commands(&effects)[..] {
        [PeripheralCommand::PrintRawHtml {
            service: ServiceName::ReceiptPrinting,
            html,
        }] => html.clone(),
        other => panic!("unexpected commands: {other:?}"),
    };
    assert!(html.contains("<li>Total: 11.00 &euro;</li>"));
    assert!(html.contains("<li>Dont TVA: 1.00 &euro;</li>"));
    assert!(html.contains("<li>Total HT: 10.00 &euro;</li>"));

    controller.handle_event(common::event(
        ServiceName::ReceiptPrinting,
        EventPayload::RawHtmlPrint(common::html_printed()),
    ));
    assert_eq!(controller.page(), Page::Thanks);
    assert!(matches!(controller.flow(), FlowState::Finished(UseCase::CashPay)));
    assert_eq!(controller.screen().receipt_print, MSG_RECEIPT_COLLECT);
}

#[test]
fn test_bank_error_prints_failure_receipt() {
    let mut controller = common::controller();
    start_cash(&mut controller);

    let effects = controller.handle_event(bank(BankEvent::TransactionBankError {
        code: "Jam".to_string(),
    }));
    assert_eq!(
        controller.screen().instruction(Page::Cash),
        "Erreur: Périphérique en bourrage"
    );
    assert!(matches!(
        &common::commands(&effects)[..],
        [PeripheralCommand::PrintRawHtml { service: ServiceName::ReceiptPrinting, .. }]
    ));
}

#[test]
fn test_one_shot_bank_listener_misses_later_events() {
    let mut config = KioskConfig::default();
    config.flow.cash_listener = ListenerLifetime::OneShot;
    let mut controller = common::controller_with_config(&common::all_services(), config);
    start_cash(&mut controller);

    let effects = controller.handle_event(bank(BankEvent::CashAccepted {
        value: 500,
        total_inserted: 500,
    }));
    assert_eq!(
        common::unsubscribes(&effects),
        vec![common::sub(ServiceName::CashPayment, EventName::TransactionBank)]
    );

    assert!(controller.handle_event(authorized()).is_empty());
    assert_eq!(
        controller.screen().instruction(Page::Cash),
        "Montant inséré: 5.00 &euro; | Total inséré: 5.00 &euro;"
    );
}
