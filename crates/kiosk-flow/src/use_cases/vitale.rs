//! Vitale card read and document print.
//!
//! The reader reports card insertion and removal on `cardRead`; each inserted
//! card triggers a read whose result arrives on `vitaleRead`. A successful read
//! prints the beneficiaries on the document printer and the print result ends
//! the use case. A read error stays on the page so another card can be tried.

use kiosk_core::constants::{
    MSG_VITALE_DETECTED, MSG_VITALE_READ, MSG_VITALE_REMOVED, SESSION_INFO_VITALE,
};
use kiosk_core::{ListenerLifetime, Page, ServiceName};
use kiosk_peripherals::{
    CardReadEvent, EventName, EventPayload, KioskEvent, PeripheralCommand, VitaleEvent,
};
use tracing::{debug, info, warn};

use super::{Step, StepContext};
use crate::receipts::vitale_document;
use crate::translator::{ErrorDomain, translate};

#[derive(Debug, Clone, Default)]
pub struct VitaleFlow {
    beneficiaries: usize,
}

impl VitaleFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Beneficiaries found by the last successful read.
    pub fn beneficiaries(&self) -> usize {
        self.beneficiaries
    }

    pub(crate) fn start(&mut self, ctx: &mut StepContext<'_>) {
        ctx.subscribe(
            ServiceName::VitaleCardReading,
            EventName::CardRead,
            ListenerLifetime::UntilTerminal,
        );
        listen_for_read(ctx);
        super::close_session(ctx, SESSION_INFO_VITALE);
    }

    pub(crate) fn on_event(&mut self, event: &KioskEvent, ctx: &mut StepContext<'_>) -> Step {
        match (&event.service, &event.payload) {
            (ServiceName::VitaleCardReading, EventPayload::CardRead(card)) => {
                on_card(card, ctx);
                Step::Continue
            }
            (ServiceName::VitaleCardReading, EventPayload::VitaleRead(read)) => {
                self.on_read(read, ctx);
                Step::Continue
            }
            (ServiceName::DocumentPrinting, EventPayload::RawHtmlPrint(result)) => {
                super::on_final_print(result, ctx)
            }
            _ => {
                debug!("vitale read ignores {}", event.subscription());
                Step::Continue
            }
        }
    }

    fn on_read(&mut self, event: &VitaleEvent, ctx: &mut StepContext<'_>) {
        match event {
            VitaleEvent::VitaleRead { beneficiaries } => {
                info!("vitale card read, {} beneficiaries", beneficiaries.len());
                self.beneficiaries = beneficiaries.len();
                ctx.instruction(Page::Vitale, MSG_VITALE_READ);
                ctx.print(
                    ServiceName::DocumentPrinting,
                    EventName::RawHtmlPrint,
                    PeripheralCommand::PrintRawHtml {
                        service: ServiceName::DocumentPrinting,
                        html: vitale_document(beneficiaries),
                    },
                );
            }
            VitaleEvent::VitaleReadError { code } => {
                warn!("vitale read failed with {}", code);
                ctx.instruction(Page::Vitale, translate(ErrorDomain::Vitale, code).message);
            }
            VitaleEvent::Unknown => debug!("unknown vitale read event"),
        }
    }
}

fn on_card(event: &CardReadEvent, ctx: &mut StepContext<'_>) {
    match event {
        CardReadEvent::CardDetected => {
            ctx.instruction(Page::Vitale, MSG_VITALE_DETECTED);
            listen_for_read(ctx);
            let timeout_secs = ctx.config.vitale.read_timeout_secs;
            ctx.execute(PeripheralCommand::ReadVitale { timeout_secs });
        }
        CardReadEvent::CardRemoved => {
            ctx.instruction(Page::Vitale, MSG_VITALE_REMOVED);
            ctx.end_stream(ServiceName::VitaleCardReading, EventName::CardRead);
        }
        CardReadEvent::Unknown => debug!("unknown card read event"),
    }
}

fn listen_for_read(ctx: &mut StepContext<'_>) {
    ctx.subscribe(
        ServiceName::VitaleCardReading,
        EventName::VitaleRead,
        ListenerLifetime::OneShot,
    );
}
