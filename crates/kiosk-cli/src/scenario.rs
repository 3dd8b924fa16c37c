//! Scripted demo scenarios.
//!
//! A scenario declares the services of the mock kiosk, the liveness answer and
//! a list of [`Step`]s mixing user actions, injected notifications and waits on
//! what the application did.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use kiosk_core::constants::ARG_AMOUNT_IN_CENTS;
use kiosk_core::{Page, ServiceName};
use kiosk_flow::{Screen, UiAction};
use kiosk_peripherals::mock::{MockKioskHandle, MockLiveness};
use kiosk_peripherals::{
    BankEvent, BarcodeEvent, CancelEvent, CardDebitEvent, CardReadEvent, ConfirmEvent,
    EventPayload, PrintEvent, VitaleEvent,
};
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tracing::debug;

const STEP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Card payment with ticket delivery and receipt.
    CardPay,
    /// Card payment with a mute card retried, then a server error.
    CardRetry,
    /// Cash payment with change and VAT receipt.
    CashPay,
    /// Cash payment whose delivery check answers 404.
    CashDeliveryFailure,
    /// Manual barcode read and receipt.
    Barcode,
    /// Vitale card read and beneficiaries document.
    Vitale,
    /// Card payment menu on a kiosk without payment terminal.
    MissingServices,
}

/// One scripted move.
#[derive(Debug)]
pub enum Step {
    Act(UiAction),
    Emit(ServiceName, EventPayload),
    /// Wait until `operation` has been called `count` times.
    AwaitCommand(&'static str, usize),
    AwaitPage(Page),
    AwaitNotice,
}

impl Scenario {
    /// Services declared by the mock kiosk.
    pub fn services(self) -> Vec<ServiceName> {
        let mut services = vec![
            ServiceName::PanelPc,
            ServiceName::Network,
            ServiceName::Session,
            ServiceName::OnscreenKbd,
            ServiceName::ReceiptPrinting,
        ];
        match self {
            Scenario::CardPay | Scenario::CardRetry => {
                services.extend([ServiceName::CardPayment, ServiceName::TicketPrinting]);
            }
            Scenario::CashPay | Scenario::CashDeliveryFailure => {
                services.push(ServiceName::CashPayment);
            }
            Scenario::Barcode | Scenario::MissingServices => {
                services.push(ServiceName::BarcodeReading);
            }
            Scenario::Vitale => {
                services.extend([ServiceName::VitaleCardReading, ServiceName::DocumentPrinting]);
            }
        }
        services
    }

    /// Mock delivery check answer.
    pub fn liveness(self) -> MockLiveness {
        match self {
            Scenario::CashDeliveryFailure => MockLiveness::status(404),
            _ => MockLiveness::healthy().with_delay(Duration::from_millis(300)),
        }
    }

    pub fn steps(self) -> Vec<Step> {
        match self {
            Scenario::CardPay => card_pay(),
            Scenario::CardRetry => card_retry(),
            Scenario::CashPay => cash_pay(),
            Scenario::CashDeliveryFailure => cash_delivery_failure(),
            Scenario::Barcode => barcode(),
            Scenario::Vitale => vitale(),
            Scenario::MissingServices => missing_services(),
        }
    }
}

fn select(menu: &str) -> Step {
    Step::Act(UiAction::SelectMenu(menu.to_string()))
}

fn card_debit(event: CardDebitEvent) -> Step {
    Step::Emit(ServiceName::CardPayment, EventPayload::CardDebit(event))
}

fn bank(event: BankEvent) -> Step {
    Step::Emit(ServiceName::CashPayment, EventPayload::TransactionBank(event))
}

fn html_printed(service: ServiceName) -> Step {
    Step::Emit(service, EventPayload::RawHtmlPrint(PrintEvent::RawHtmlPrinted))
}

/// Payment form: menu, amount, submit.
fn payment_form(menu: &str, amount: &str) -> Vec<Step> {
    vec![
        select(menu),
        Step::AwaitPage(Page::PayForm),
        Step::Act(UiAction::EditField {
            name: ARG_AMOUNT_IN_CENTS.to_string(),
            value: amount.to_string(),
        }),
        Step::Act(UiAction::SubmitForm),
    ]
}

fn card_pay() -> Vec<Step> {
    let mut steps = payment_form("pay", "2500");
    steps.extend([
        Step::AwaitCommand("debitCard", 1),
        card_debit(CardDebitEvent::CardAcquired {
            card_type: "CB".to_string(),
        }),
        card_debit(CardDebitEvent::TransactionAuthorized {
            ref_transaction: "test-0000".to_string(),
        }),
        Step::AwaitCommand("printRawHtml", 1),
        html_printed(ServiceName::TicketPrinting),
        Step::AwaitCommand("confirmTransaction", 1),
        Step::Emit(
            ServiceName::CardPayment,
            EventPayload::TransactionConfirm(ConfirmEvent::TransactionConfirmed),
        ),
        card_debit(CardDebitEvent::CardDebited {
            ref_transaction: "test-0000".to_string(),
        }),
        Step::AwaitCommand("printReceipt", 1),
        Step::Emit(
            ServiceName::CardPayment,
            EventPayload::ReceiptPrint(PrintEvent::ReceiptPrinted),
        ),
        Step::AwaitPage(Page::Thanks),
    ]);
    steps
}

fn card_retry() -> Vec<Step> {
    let mut steps = payment_form("pay", "1500");
    steps.extend([
        Step::AwaitCommand("debitCard", 1),
        card_debit(CardDebitEvent::CardDebitError {
            code: "CardMute".to_string(),
        }),
        Step::AwaitCommand("debitCard", 2),
        card_debit(CardDebitEvent::CardDebitError {
            code: "Server".to_string(),
        }),
        Step::AwaitCommand("printReceipt", 1),
        Step::Emit(
            ServiceName::CardPayment,
            EventPayload::ReceiptPrint(PrintEvent::Failed),
        ),
        Step::AwaitPage(Page::Thanks),
    ]);
    steps
}

fn cash_pay() -> Vec<Step> {
    let mut steps = payment_form("cash", "1000");
    steps.extend([
        Step::AwaitCommand("bankTransaction", 1),
        bank(BankEvent::CashAccepted {
            value: 200,
            total_inserted: 200,
        }),
        bank(BankEvent::CashRejected {
            source: "CoinAcceptor".to_string(),
        }),
        bank(BankEvent::CashAccepted {
            value: 1000,
            total_inserted: 1200,
        }),
        bank(BankEvent::TransactionAuthorized {
            ref_transaction: "test-0000".to_string(),
        }),
        Step::AwaitCommand("confirmTransaction", 1),
        Step::Emit(
            ServiceName::CashPayment,
            EventPayload::TransactionConfirm(ConfirmEvent::TransactionConfirmed),
        ),
        bank(BankEvent::TransactionBanked {
            ref_transaction: "test-0000".to_string(),
            confirmed_amount: 1000,
            total_inserted: 1200,
            total_returned: 200,
        }),
        Step::AwaitCommand("printRawHtml", 1),
        html_printed(ServiceName::ReceiptPrinting),
        Step::AwaitPage(Page::Thanks),
    ]);
    steps
}

fn cash_delivery_failure() -> Vec<Step> {
    let mut steps = payment_form("cash", "1000");
    steps.extend([
        Step::AwaitCommand("bankTransaction", 1),
        bank(BankEvent::CashAccepted {
            value: 1000,
            total_inserted: 1000,
        }),
        bank(BankEvent::TransactionAuthorized {
            ref_transaction: "test-0000".to_string(),
        }),
        Step::AwaitCommand("cancelTransaction", 1),
        Step::Emit(
            ServiceName::CashPayment,
            EventPayload::TransactionCancel(CancelEvent::TransactionCancelled),
        ),
        bank(BankEvent::TransactionBankError {
            code: "ApplicationCancelled".to_string(),
        }),
        Step::AwaitCommand("printRawHtml", 1),
        html_printed(ServiceName::ReceiptPrinting),
        Step::AwaitPage(Page::Thanks),
    ]);
    steps
}

fn barcode() -> Vec<Step> {
    vec![
        select("barcode"),
        Step::AwaitPage(Page::Barcode),
        Step::Act(UiAction::StartBarcodeRead),
        Step::AwaitCommand("readBarcode", 1),
        Step::Emit(
            ServiceName::BarcodeReading,
            EventPayload::BarcodeRead(BarcodeEvent::BarcodeRead {
                barcode: "3256220012345".to_string(),
            }),
        ),
        Step::AwaitCommand("printRawHtml", 1),
        html_printed(ServiceName::ReceiptPrinting),
        Step::AwaitPage(Page::Thanks),
    ]
}

fn vitale() -> Vec<Step> {
    vec![
        select("vitale"),
        Step::AwaitPage(Page::Vitale),
        Step::Emit(
            ServiceName::VitaleCardReading,
            EventPayload::CardRead(CardReadEvent::CardDetected),
        ),
        Step::AwaitCommand("readVitale", 1),
        Step::Emit(
            ServiceName::VitaleCardReading,
            EventPayload::VitaleRead(VitaleEvent::VitaleRead {
                beneficiaries: vec![
                    json!({"prenom": "Jeanne", "nom": "Martin"}),
                    json!({"prenom": "Louis", "nom": "Martin"}),
                ],
            }),
        ),
        Step::AwaitCommand("printRawHtml", 1),
        html_printed(ServiceName::DocumentPrinting),
        Step::AwaitPage(Page::Thanks),
        Step::Act(UiAction::ReturnHome),
        Step::AwaitPage(Page::Home),
    ]
}

fn missing_services() -> Vec<Step> {
    vec![
        select("pay"),
        Step::AwaitNotice,
        Step::Act(UiAction::DismissNotice),
        select("barcode"),
        Step::AwaitPage(Page::Barcode),
        Step::Act(UiAction::ReturnHome),
        Step::AwaitPage(Page::Home),
    ]
}

/// Play `steps` against a running driver.
pub async fn play(
    steps: Vec<Step>,
    handle: &MockKioskHandle,
    actions: &mpsc::Sender<UiAction>,
    mut screens: watch::Receiver<Screen>,
) -> Result<()> {
    for step in steps {
        debug!("step: {:?}", step);
        match step {
            Step::Act(action) => actions
                .send(action)
                .await
                .context("driver stopped before the scenario ended")?,
            Step::Emit(service, payload) => handle.emit(service, payload).await?,
            Step::AwaitCommand(operation, count) => {
                handle
                    .wait_until(STEP_TIMEOUT, |journal| {
                        journal
                            .commands()
                            .iter()
                            .filter(|command| command.operation() == operation)
                            .count()
                            >= count
                    })
                    .await
                    .with_context(|| format!("waiting for {operation} call #{count}"))?;
            }
            Step::AwaitPage(page) => {
                tokio::time::timeout(STEP_TIMEOUT, screens.wait_for(|s| s.page == page))
                    .await
                    .with_context(|| format!("waiting for page {page}"))??;
            }
            Step::AwaitNotice => {
                tokio::time::timeout(STEP_TIMEOUT, screens.wait_for(|s| s.notice.is_some()))
                    .await
                    .context("waiting for a notice")??;
            }
        }
    }
    Ok(())
}
