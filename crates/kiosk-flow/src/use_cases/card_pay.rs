//! Card payment.
//!
//! ```text
//! debitCard ─> CardAcquired ─> TransactionAuthorized ─> ticket print ─┬─ ok ──> confirm
//!                                                                     └─ err ─> cancel
//!           ─> CardDebited | CardDebitError ─> card receipt print ─> thanks
//! ```
//!
//! A retryable debit error issues the same debit again and keeps the debit
//! listener, up to `flow.max_payment_retries` times per run.

use kiosk_core::constants::{
    MSG_TICKET_COLLECT, MSG_TICKET_ERROR, MSG_TICKET_PRINTING, PAY_FIRST_INSTRUCTION,
    SESSION_INFO_PAYMENT,
};
use kiosk_core::{ListenerLifetime, Page, ServiceName, TransactionArgs, UseCase};
use kiosk_peripherals::{
    CardDebitEvent, EventName, EventPayload, KioskEvent, PeripheralCommand, PrintEvent,
};
use tracing::{debug, warn};

use super::{Step, StepContext};
use crate::receipts::{TICKET_HTML, card_receipt};
use crate::translator::{ErrorDomain, translate};

/// Progress of a card payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPayStage {
    AwaitingDebit,
    PrintingTicket,
    PrintingReceipt,
}

#[derive(Debug, Clone)]
pub struct CardPayFlow {
    args: TransactionArgs,
    retries: u32,
    stage: CardPayStage,
}

impl CardPayFlow {
    pub fn new(args: TransactionArgs) -> Self {
        Self {
            args,
            retries: 0,
            stage: CardPayStage::AwaitingDebit,
        }
    }

    pub fn args(&self) -> &TransactionArgs {
        &self.args
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn stage(&self) -> CardPayStage {
        self.stage
    }

    pub(crate) fn start(&mut self, ctx: &mut StepContext<'_>) {
        super::close_session(ctx, SESSION_INFO_PAYMENT);
        ctx.instruction(Page::Pay, PAY_FIRST_INSTRUCTION);
        ctx.subscribe(
            ServiceName::CardPayment,
            EventName::CardDebit,
            ListenerLifetime::UntilTerminal,
        );
        ctx.execute(PeripheralCommand::DebitCard(self.args.clone()));
    }

    pub(crate) fn on_event(&mut self, event: &KioskEvent, ctx: &mut StepContext<'_>) -> Step {
        match (&event.service, &event.payload) {
            (ServiceName::CardPayment, EventPayload::CardDebit(debit)) => {
                self.on_debit(debit, ctx);
                Step::Continue
            }
            (ServiceName::TicketPrinting, EventPayload::RawHtmlPrint(result)) => {
                self.on_ticket_print(result, ctx);
                Step::Continue
            }
            (ServiceName::CardPayment, EventPayload::ReceiptPrint(result)) => {
                super::on_final_print(result, ctx)
            }
            (ServiceName::CardPayment, EventPayload::TransactionConfirm(result)) => {
                super::on_confirm(UseCase::CardPay, result, ctx);
                Step::Continue
            }
            (ServiceName::CardPayment, EventPayload::TransactionCancel(result)) => {
                super::on_cancel(UseCase::CardPay, result, ctx);
                Step::Continue
            }
            _ => {
                debug!("card payment ignores {}", event.subscription());
                Step::Continue
            }
        }
    }

    fn on_debit(&mut self, event: &CardDebitEvent, ctx: &mut StepContext<'_>) {
        match event {
            CardDebitEvent::CardAcquired { card_type } => {
                ctx.instruction(
                    Page::Pay,
                    format!("Carte bancaire introduite (type {card_type})"),
                );
            }
            CardDebitEvent::TransactionAuthorized { ref_transaction } => {
                ctx.instruction(
                    Page::Pay,
                    format!("Transaction autorisée ({ref_transaction})"),
                );
                self.deliver_ticket(ctx);
            }
            CardDebitEvent::CardDebited { ref_transaction } => {
                ctx.instruction(Page::Pay, format!("Transaction terminée ({ref_transaction})"));
                ctx.end_stream(ServiceName::CardPayment, EventName::CardDebit);
                self.print_receipt(ctx);
            }
            CardDebitEvent::CardDebitError { code } => {
                let translation = translate(ErrorDomain::CardPay, code);
                ctx.instruction(Page::Pay, translation.message);

                let max_retries = ctx.config.flow.max_payment_retries;
                if translation.is_retry() && self.retries < max_retries {
                    self.retries += 1;
                    warn!(
                        "card debit failed with {}, retrying ({}/{})",
                        code, self.retries, max_retries
                    );
                    ctx.execute(PeripheralCommand::DebitCard(self.args.clone()));
                    return;
                }

                warn!("card debit failed with {}", code);
                ctx.end_stream(ServiceName::CardPayment, EventName::CardDebit);
                self.print_receipt(ctx);
            }
            CardDebitEvent::Unknown => debug!("unknown card debit event"),
        }
    }

    fn deliver_ticket(&mut self, ctx: &mut StepContext<'_>) {
        self.stage = CardPayStage::PrintingTicket;
        ctx.instruction(Page::Pay, MSG_TICKET_PRINTING);
        ctx.subscribe(
            ServiceName::TicketPrinting,
            EventName::RawHtmlPrint,
            ListenerLifetime::OneShot,
        );
        ctx.execute(PeripheralCommand::PrintRawHtml {
            service: ServiceName::TicketPrinting,
            html: TICKET_HTML.to_string(),
        });
    }

    fn on_ticket_print(&mut self, result: &PrintEvent, ctx: &mut StepContext<'_>) {
        if self.stage == CardPayStage::PrintingTicket {
            self.stage = CardPayStage::AwaitingDebit;
        }
        if result.is_success() {
            super::confirm_payment(UseCase::CardPay, self.args.amount_in_cents, ctx);
            ctx.instruction(Page::Pay, MSG_TICKET_COLLECT);
        } else {
            warn!("ticket printing failed");
            ctx.instruction(Page::Pay, MSG_TICKET_ERROR);
            super::cancel_payment(UseCase::CardPay, ctx);
        }
    }

    fn print_receipt(&mut self, ctx: &mut StepContext<'_>) {
        self.stage = CardPayStage::PrintingReceipt;
        let (header, footer) = card_receipt(&self.args.ref_shopping_cart);
        ctx.print(
            ServiceName::CardPayment,
            EventName::ReceiptPrint,
            PeripheralCommand::PrintCardReceipt { header, footer },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;
    use crate::display::Screen;
    use crate::subscriptions::SubscriptionSet;
    use kiosk_core::KioskConfig;
    use kiosk_peripherals::Subscription;

    fn debit_error(code: &str) -> KioskEvent {
        KioskEvent::new(
            ServiceName::CardPayment,
            EventPayload::CardDebit(CardDebitEvent::CardDebitError {
                code: code.to_string(),
            }),
        )
    }

    #[test]
    fn test_retry_cap() {
        let mut config = KioskConfig::default();
        config.flow.max_payment_retries = 1;
        let mut screen = Screen::new();
        let mut subscriptions = SubscriptionSet::new();
        let mut flow = CardPayFlow::new(TransactionArgs::default());

        let mut ctx = StepContext::new(&mut screen, &mut subscriptions, &config);
        flow.start(&mut ctx);
        flow.on_event(&debit_error("Refused"), &mut ctx);
        let effects = ctx.into_effects();
        assert_eq!(
            effects.last(),
            Some(&Effect::Execute(PeripheralCommand::DebitCard(
                TransactionArgs::default()
            )))
        );
        assert_eq!(flow.retries(), 1);

        let mut ctx = StepContext::new(&mut screen, &mut subscriptions, &config);
        flow.on_event(&debit_error("Refused"), &mut ctx);
        let effects = ctx.into_effects();
        assert!(effects.contains(&Effect::Unsubscribe(Subscription::new(
            ServiceName::CardPayment,
            EventName::CardDebit
        ))));
        assert_eq!(flow.stage(), CardPayStage::PrintingReceipt);
        assert_eq!(screen.instruction(Page::Pay), "Erreur: Transaction refusée");
    }

    #[test]
    fn test_display_only_error_prints_receipt() {
        let config = KioskConfig::default();
        let mut screen = Screen::new();
        let mut subscriptions = SubscriptionSet::new();
        let mut flow = CardPayFlow::new(TransactionArgs::default());

        let mut ctx = StepContext::new(&mut screen, &mut subscriptions, &config);
        flow.start(&mut ctx);
        flow.on_event(&debit_error("Server"), &mut ctx);
        let effects = ctx.into_effects();

        assert!(effects.iter().any(|effect| matches!(
            effect,
            Effect::Execute(PeripheralCommand::PrintCardReceipt { .. })
        )));
        assert_eq!(flow.retries(), 0);
        assert!(subscriptions.contains(&Subscription::new(
            ServiceName::CardPayment,
            EventName::ReceiptPrint
        )));
    }
}
