//! Requests issued to peripheral services.
//!
//! A [`PeripheralCommand`] names the target service, the runtime operation and
//! its argument set. Arguments are rendered as a JSON object, the shape the
//! host runtime expects for every request operation.

use std::fmt;

use kiosk_core::constants::{
    ARG_AMOUNT_IN_CENTS, ARG_CONFIRM_AMOUNT_IN_CENTS, ARG_REF_SHOPPING_CART, ARG_REF_TRANSACTION,
};
use kiosk_core::{AppStatusReport, ServiceName, TransactionArgs};
use serde_json::{Map, Value};

/// A request operation on a service, or on the running application itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeripheralCommand {
    /// Close the current user session, opening a fresh one.
    CloseSession { information: String },

    /// Start a card payment.
    DebitCard(TransactionArgs),

    /// Start a cash payment.
    BankTransaction(TransactionArgs),

    /// Confirm the pending transaction of a payment service.
    ConfirmTransaction {
        service: ServiceName,
        amount_in_cents: u64,
    },

    /// Cancel the pending transaction of a payment service.
    CancelTransaction { service: ServiceName },

    /// Print an HTML document on a printing service.
    PrintRawHtml { service: ServiceName, html: String },

    /// Print the payment terminal receipt framed by a header and a footer.
    PrintCardReceipt { header: String, footer: String },

    /// Trigger a barcode read in manual mode.
    ReadBarcode,

    /// Read the inserted vitale card.
    ReadVitale { timeout_secs: u64 },

    /// Toggle automatic display of the on-screen keyboard.
    SetAutoShow { enabled: bool },

    /// Report the application status to the host.
    SetApplicationStatus(AppStatusReport),
}

impl PeripheralCommand {
    /// Target service, `None` for the running application.
    #[must_use]
    pub fn service(&self) -> Option<ServiceName> {
        let service = match self {
            PeripheralCommand::CloseSession { .. } => ServiceName::Session,
            PeripheralCommand::DebitCard(_) | PeripheralCommand::PrintCardReceipt { .. } => {
                ServiceName::CardPayment
            }
            PeripheralCommand::BankTransaction(_) => ServiceName::CashPayment,
            PeripheralCommand::ConfirmTransaction { service, .. }
            | PeripheralCommand::CancelTransaction { service }
            | PeripheralCommand::PrintRawHtml { service, .. } => service.clone(),
            PeripheralCommand::ReadBarcode => ServiceName::BarcodeReading,
            PeripheralCommand::ReadVitale { .. } => ServiceName::VitaleCardReading,
            PeripheralCommand::SetAutoShow { .. } => ServiceName::OnscreenKbd,
            PeripheralCommand::SetApplicationStatus(_) => return None,
        };
        Some(service)
    }

    /// Runtime operation name.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            PeripheralCommand::CloseSession { .. } => "close",
            PeripheralCommand::DebitCard(_) => "debitCard",
            PeripheralCommand::BankTransaction(_) => "bankTransaction",
            PeripheralCommand::ConfirmTransaction { .. } => "confirmTransaction",
            PeripheralCommand::CancelTransaction { .. } => "cancelTransaction",
            PeripheralCommand::PrintRawHtml { .. } => "printRawHtml",
            PeripheralCommand::PrintCardReceipt { .. } => "printReceipt",
            PeripheralCommand::ReadBarcode => "readBarcode",
            PeripheralCommand::ReadVitale { .. } => "readVitale",
            PeripheralCommand::SetAutoShow { .. } => "setAutoShow",
            PeripheralCommand::SetApplicationStatus(_) => "setApplicationStatus",
        }
    }

    /// Argument set of the call.
    #[must_use]
    pub fn arguments(&self) -> Value {
        let mut args = Map::new();
        match self {
            PeripheralCommand::CloseSession { information } => {
                args.insert("information".into(), information.as_str().into());
            }
            PeripheralCommand::DebitCard(tx) | PeripheralCommand::BankTransaction(tx) => {
                args.insert(ARG_REF_TRANSACTION.into(), tx.ref_transaction.as_str().into());
                args.insert(
                    ARG_REF_SHOPPING_CART.into(),
                    tx.ref_shopping_cart.as_str().into(),
                );
                args.insert(ARG_AMOUNT_IN_CENTS.into(), tx.amount_in_cents.into());
            }
            PeripheralCommand::ConfirmTransaction {
                amount_in_cents, ..
            } => {
                args.insert(ARG_CONFIRM_AMOUNT_IN_CENTS.into(), (*amount_in_cents).into());
            }
            PeripheralCommand::CancelTransaction { .. } | PeripheralCommand::ReadBarcode => {}
            PeripheralCommand::PrintRawHtml { html, .. } => {
                args.insert("html".into(), html.as_str().into());
            }
            PeripheralCommand::PrintCardReceipt { header, footer } => {
                args.insert("htmlHeader".into(), header.as_str().into());
                args.insert("htmlFooter".into(), footer.as_str().into());
            }
            PeripheralCommand::ReadVitale { timeout_secs } => {
                args.insert("timeout".into(), (*timeout_secs).into());
            }
            PeripheralCommand::SetAutoShow { enabled } => {
                args.insert("autoShow".into(), (*enabled).into());
            }
            PeripheralCommand::SetApplicationStatus(report) => {
                args.insert("status".into(), report.status.as_str().into());
                args.insert("statusDetail".into(), report.status_detail.as_str().into());
                args.insert(
                    "statusDescription".into(),
                    report.status_description.as_str().into(),
                );
            }
        }
        Value::Object(args)
    }
}

impl fmt::Display for PeripheralCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.service() {
            Some(service) => write!(f, "{}.{}", service, self.operation()),
            None => write!(f, "application.{}", self.operation()),
        }
    }
}
