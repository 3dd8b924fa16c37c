//! Per-use-case transition logic.
//!
//! Each use case is a small state type consuming decoded events. Handlers never
//! touch the runtime: they edit the [`Screen`], update the active
//! [`SubscriptionSet`] and queue [`Effect`]s through a [`StepContext`].
//!
//! One-shot listeners are removed by the controller before an event is
//! dispatched, so a handler may register the same stream again. Listeners kept
//! until a terminal outcome are removed by the handler that sees that outcome.

pub mod barcode;
pub mod card_pay;
pub mod cash_pay;
pub mod vitale;

use kiosk_core::constants::{
    MSG_CANCEL_DESYNC, MSG_CANCELLING, MSG_CONFIRM_DESYNC, MSG_RECEIPT_COLLECT, MSG_RECEIPT_ERROR,
    MSG_RECEIPT_PRINTING,
};
use kiosk_core::{KioskConfig, ListenerLifetime, Page, ServiceName, UseCase};
use kiosk_peripherals::{
    CancelEvent, ConfirmEvent, EventName, KioskEvent, PeripheralCommand, PrintEvent, Subscription,
};
use tracing::{debug, info, warn};

use crate::display::Screen;
use crate::effects::Effect;
use crate::subscriptions::SubscriptionSet;

pub use barcode::BarcodeFlow;
pub use card_pay::CardPayFlow;
pub use cash_pay::CashPayFlow;
pub use vitale::VitaleFlow;

/// Whether a use case is still running after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,

    /// The use case reached its end and the thanks page should be shown.
    Finished,
}

/// Mutable state a step may act on.
pub struct StepContext<'a> {
    pub(crate) screen: &'a mut Screen,
    pub(crate) subscriptions: &'a mut SubscriptionSet,
    pub(crate) config: &'a KioskConfig,
    pub(crate) effects: Vec<Effect>,
}

impl<'a> StepContext<'a> {
    pub(crate) fn new(
        screen: &'a mut Screen,
        subscriptions: &'a mut SubscriptionSet,
        config: &'a KioskConfig,
    ) -> Self {
        Self {
            screen,
            subscriptions,
            config,
            effects: Vec::new(),
        }
    }

    pub(crate) fn subscribe(
        &mut self,
        service: ServiceName,
        event: EventName,
        lifetime: ListenerLifetime,
    ) {
        if let Some(effect) = self
            .subscriptions
            .add(Subscription::new(service, event), lifetime)
        {
            self.effects.push(effect);
        }
    }

    /// Terminal outcome seen on a stream: drop its listener.
    pub(crate) fn end_stream(&mut self, service: ServiceName, event: EventName) {
        if let Some(effect) = self
            .subscriptions
            .settle(&Subscription::new(service, event), true)
        {
            self.effects.push(effect);
        }
    }

    pub(crate) fn execute(&mut self, command: PeripheralCommand) {
        self.effects.push(Effect::Execute(command));
    }

    pub(crate) fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub(crate) fn instruction(&mut self, page: Page, text: impl Into<String>) {
        self.screen.set_instruction(page, text);
    }

    pub(crate) fn receipt_line(&mut self, text: &str) {
        self.screen.receipt_print = text.to_string();
    }

    /// Listen for the print result on `service`, then print.
    pub(crate) fn print(&mut self, service: ServiceName, event: EventName, command: PeripheralCommand) {
        self.receipt_line(MSG_RECEIPT_PRINTING);
        self.subscribe(service, event, ListenerLifetime::OneShot);
        self.execute(command);
    }

    pub(crate) fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}

/// Close the current host session, leaving `information` for the next one.
pub(crate) fn close_session(ctx: &mut StepContext<'_>, information: &str) {
    ctx.execute(PeripheralCommand::CloseSession {
        information: information.to_string(),
    });
}

/// Cancel the pending transaction of the payment service of `use_case`.
pub(crate) fn cancel_payment(use_case: UseCase, ctx: &mut StepContext<'_>) {
    let Some(service) = use_case.payment_service() else {
        warn!("{} has no payment to cancel", use_case);
        return;
    };
    info!("cancelling {} transaction on {}", use_case, service);
    ctx.instruction(use_case.page(), MSG_CANCELLING);
    ctx.subscribe(
        service.clone(),
        EventName::TransactionCancel,
        ListenerLifetime::OneShot,
    );
    ctx.execute(PeripheralCommand::CancelTransaction { service });
}

/// Confirm the pending transaction of the payment service of `use_case`.
pub(crate) fn confirm_payment(use_case: UseCase, amount_in_cents: u64, ctx: &mut StepContext<'_>) {
    let Some(service) = use_case.payment_service() else {
        return;
    };
    ctx.subscribe(
        service.clone(),
        EventName::TransactionConfirm,
        ListenerLifetime::OneShot,
    );
    ctx.execute(PeripheralCommand::ConfirmTransaction {
        service,
        amount_in_cents,
    });
}

pub(crate) fn on_confirm(use_case: UseCase, event: &ConfirmEvent, ctx: &mut StepContext<'_>) {
    match event {
        ConfirmEvent::TransactionConfirmed => info!("{} transaction confirmed", use_case),
        ConfirmEvent::TransactionConfirmError { code } => {
            warn!("{} confirmation failed: {}", use_case, code);
            ctx.instruction(use_case.page(), MSG_CONFIRM_DESYNC);
        }
        ConfirmEvent::Unknown => debug!("unknown confirmation result for {}", use_case),
    }
}

pub(crate) fn on_cancel(use_case: UseCase, event: &CancelEvent, ctx: &mut StepContext<'_>) {
    match event {
        CancelEvent::TransactionCancelled => info!("{} transaction cancelled", use_case),
        CancelEvent::TransactionCancelError { code } => {
            warn!("{} cancellation failed: {}", use_case, code);
            ctx.instruction(use_case.page(), MSG_CANCEL_DESYNC);
        }
        CancelEvent::Unknown => debug!("unknown cancellation result for {}", use_case),
    }
}

/// Final print of a use case. Success or not, the use case is over.
pub(crate) fn on_final_print(event: &PrintEvent, ctx: &mut StepContext<'_>) -> Step {
    if event.is_success() {
        ctx.receipt_line(MSG_RECEIPT_COLLECT);
    } else {
        warn!("final print failed");
        ctx.receipt_line(MSG_RECEIPT_ERROR);
    }
    Step::Finished
}

/// The use case currently running.
#[derive(Debug, Clone)]
pub enum ActiveFlow {
    CardPay(CardPayFlow),
    CashPay(CashPayFlow),
    Barcode(BarcodeFlow),
    Vitale(VitaleFlow),
}

impl ActiveFlow {
    pub fn use_case(&self) -> UseCase {
        match self {
            ActiveFlow::CardPay(_) => UseCase::CardPay,
            ActiveFlow::CashPay(_) => UseCase::CashPay,
            ActiveFlow::Barcode(_) => UseCase::Barcode,
            ActiveFlow::Vitale(_) => UseCase::Vitale,
        }
    }

    pub(crate) fn start(&mut self, ctx: &mut StepContext<'_>) {
        match self {
            ActiveFlow::CardPay(flow) => flow.start(ctx),
            ActiveFlow::CashPay(flow) => flow.start(ctx),
            ActiveFlow::Barcode(flow) => flow.start(ctx),
            ActiveFlow::Vitale(flow) => flow.start(ctx),
        }
    }

    pub(crate) fn on_event(&mut self, event: &KioskEvent, ctx: &mut StepContext<'_>) -> Step {
        match self {
            ActiveFlow::CardPay(flow) => flow.on_event(event, ctx),
            ActiveFlow::CashPay(flow) => flow.on_event(event, ctx),
            ActiveFlow::Barcode(flow) => flow.on_event(event, ctx),
            ActiveFlow::Vitale(flow) => flow.on_event(event, ctx),
        }
    }
}
