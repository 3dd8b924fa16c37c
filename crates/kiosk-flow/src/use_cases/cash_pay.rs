//! Cash payment.
//!
//! Inserted and rejected coins are informational. On authorization the
//! product is delivered: a liveness check runs outside the controller and its
//! outcome comes back through [`CashPayFlow::on_liveness`], which confirms or
//! cancels the transaction. A banked transaction or a bank error prints the
//! cash receipt, whose print result ends the use case.

use kiosk_core::constants::{
    MSG_DELIVERED, MSG_DELIVERY_ERROR, MSG_DELIVERY_IN_PROGRESS, SESSION_INFO_PAYMENT,
};
use kiosk_core::{Page, ServiceName, TransactionArgs, UseCase};
use kiosk_peripherals::{BankEvent, EventName, EventPayload, KioskEvent, PeripheralCommand};
use tracing::{debug, info, warn};

use super::{Step, StepContext};
use crate::effects::{Effect, LivenessOutcome};
use crate::receipts::{CashReceipt, cash_receipt, format_amount};
use crate::translator::{ErrorDomain, translate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashPayStage {
    AwaitingBank,
    Delivering,
    PrintingReceipt,
}

#[derive(Debug, Clone)]
pub struct CashPayFlow {
    args: TransactionArgs,
    run: u64,
    stage: CashPayStage,
}

impl CashPayFlow {
    /// `run` identifies this use-case run in liveness results.
    pub fn new(args: TransactionArgs, run: u64) -> Self {
        Self {
            args,
            run,
            stage: CashPayStage::AwaitingBank,
        }
    }

    pub fn args(&self) -> &TransactionArgs {
        &self.args
    }

    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn stage(&self) -> CashPayStage {
        self.stage
    }

    pub(crate) fn start(&mut self, ctx: &mut StepContext<'_>) {
        super::close_session(ctx, SESSION_INFO_PAYMENT);
        let lifetime = ctx.config.flow.cash_listener;
        ctx.subscribe(ServiceName::CashPayment, EventName::TransactionBank, lifetime);
        ctx.execute(PeripheralCommand::BankTransaction(self.args.clone()));
    }

    pub(crate) fn on_event(&mut self, event: &KioskEvent, ctx: &mut StepContext<'_>) -> Step {
        match (&event.service, &event.payload) {
            (ServiceName::CashPayment, EventPayload::TransactionBank(bank)) => {
                self.on_bank(bank, ctx);
                Step::Continue
            }
            (ServiceName::ReceiptPrinting, EventPayload::RawHtmlPrint(result)) => {
                super::on_final_print(result, ctx)
            }
            (ServiceName::CashPayment, EventPayload::TransactionConfirm(result)) => {
                super::on_confirm(UseCase::CashPay, result, ctx);
                Step::Continue
            }
            (ServiceName::CashPayment, EventPayload::TransactionCancel(result)) => {
                super::on_cancel(UseCase::CashPay, result, ctx);
                Step::Continue
            }
            _ => {
                debug!("cash payment ignores {}", event.subscription());
                Step::Continue
            }
        }
    }

    fn on_bank(&mut self, event: &BankEvent, ctx: &mut StepContext<'_>) {
        match event {
            BankEvent::CashAccepted {
                value,
                total_inserted,
            } => {
                ctx.instruction(
                    Page::Cash,
                    format!(
                        "Montant inséré: {} | Total inséré: {}",
                        format_amount(*value),
                        format_amount(*total_inserted)
                    ),
                );
            }
            BankEvent::CashRejected { source } => {
                ctx.instruction(Page::Cash, format!("Monnaie refusée par: {source}"));
            }
            BankEvent::TransactionAuthorized { ref_transaction } => {
                ctx.instruction(
                    Page::Cash,
                    format!("Transaction autorisée ({ref_transaction})"),
                );
                self.stage = CashPayStage::Delivering;
                ctx.instruction(Page::Cash, MSG_DELIVERY_IN_PROGRESS);
                ctx.push(Effect::CheckLiveness { run: self.run });
            }
            BankEvent::TransactionBanked {
                ref_transaction,
                confirmed_amount,
                total_inserted,
                total_returned,
            } => {
                ctx.instruction(Page::Cash, format!("Transaction terminée ({ref_transaction})"));
                ctx.end_stream(ServiceName::CashPayment, EventName::TransactionBank);
                self.print_receipt(
                    CashReceipt::Banked {
                        confirmed: *confirmed_amount,
                        inserted: *total_inserted,
                        returned: *total_returned,
                    },
                    ctx,
                );
            }
            BankEvent::TransactionBankError { code } => {
                warn!("cash transaction failed with {}", code);
                ctx.instruction(Page::Cash, translate(ErrorDomain::CashPay, code).message);
                ctx.end_stream(ServiceName::CashPayment, EventName::TransactionBank);
                self.print_receipt(CashReceipt::Failed, ctx);
            }
            BankEvent::Unknown => debug!("unknown bank event"),
        }
    }

    /// Outcome of the delivery liveness check.
    pub(crate) fn on_liveness(&mut self, outcome: &LivenessOutcome, ctx: &mut StepContext<'_>) {
        if self.stage != CashPayStage::Delivering {
            debug!("liveness result outside delivery ignored");
            return;
        }
        self.stage = CashPayStage::AwaitingBank;

        if outcome.is_delivered() {
            info!("product delivered ({:?})", outcome);
            super::confirm_payment(UseCase::CashPay, self.args.amount_in_cents, ctx);
            ctx.instruction(Page::Cash, MSG_DELIVERED);
        } else {
            warn!("product delivery failed ({:?})", outcome);
            ctx.instruction(Page::Cash, MSG_DELIVERY_ERROR);
            super::cancel_payment(UseCase::CashPay, ctx);
        }
    }

    fn print_receipt(&mut self, receipt: CashReceipt, ctx: &mut StepContext<'_>) {
        self.stage = CashPayStage::PrintingReceipt;
        let html = cash_receipt(receipt, ctx.config.receipt.vat_percent);
        ctx.print(
            ServiceName::ReceiptPrinting,
            EventName::RawHtmlPrint,
            PeripheralCommand::PrintRawHtml {
                service: ServiceName::ReceiptPrinting,
                html,
            },
        );
    }
}
