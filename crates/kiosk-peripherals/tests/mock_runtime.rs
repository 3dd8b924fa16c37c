//! Event delivery through the mock runtime, as the driver sees it.

use kiosk_core::{ServiceName, ServiceStatus};
use kiosk_peripherals::mock::MockKiosk;
use kiosk_peripherals::{
    BankEvent, EventName, EventPayload, KioskEvent, KioskRuntime, RawEvent, Subscription,
};
use rstest::rstest;
use serde_json::json;

#[tokio::test]
async fn test_events_arrive_in_emission_order() {
    let (mut kiosk, handle) = MockKiosk::new();

    let inserted = [500, 200, 300];
    let mut total = 0;
    for value in inserted {
        total += value;
        handle
            .emit(
                ServiceName::CashPayment,
                EventPayload::TransactionBank(BankEvent::CashAccepted {
                    value,
                    total_inserted: total,
                }),
            )
            .await
            .unwrap();
    }

    let mut totals = Vec::new();
    for _ in inserted {
        let event = KioskEvent::decode(kiosk.next_event().await.unwrap()).unwrap();
        match event.payload {
            EventPayload::TransactionBank(BankEvent::CashAccepted { total_inserted, .. }) => {
                totals.push(total_inserted);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }
    assert_eq!(totals, vec![500, 700, 1000]);
}

#[rstest]
#[case("statusChange", json!({"status": "TempUnavailable"}), EventName::StatusChange)]
#[case("receiptPrint", json!({"dataType": "ReceiptPrinted"}), EventName::ReceiptPrint)]
#[case("transactionCancel", json!({"dataType": "TransactionCancelError", "code": "StateError"}), EventName::TransactionCancel)]
#[case("cardRead", json!({"dataType": "CardRemoved"}), EventName::CardRead)]
#[tokio::test]
async fn test_raw_events_decode_to_their_stream(
    #[case] name: &str,
    #[case] data: serde_json::Value,
    #[case] expected: EventName,
) {
    let (mut kiosk, handle) = MockKiosk::new();
    handle
        .emit_raw(RawEvent {
            service: "CashPayment".to_string(),
            sender: "CashPayment".to_string(),
            name: name.to_string(),
            data,
        })
        .await
        .unwrap();

    let event = KioskEvent::decode(kiosk.next_event().await.unwrap()).unwrap();
    assert_eq!(event.payload.name(), expected);
    assert_eq!(
        event.subscription(),
        Subscription::new(ServiceName::CashPayment, expected)
    );
}

#[tokio::test]
async fn test_status_change_roundtrip_through_handle() {
    let (mut kiosk, handle) = MockKiosk::new();
    handle
        .emit(
            ServiceName::TicketPrinting,
            EventPayload::StatusChange(ServiceStatus::Critical),
        )
        .await
        .unwrap();

    let raw = kiosk.next_event().await.unwrap();
    assert_eq!(raw.data, json!({"status": "Critical"}));
}
