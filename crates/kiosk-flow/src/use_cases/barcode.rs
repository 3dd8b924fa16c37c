//! Barcode read and receipt.

use kiosk_core::constants::{MSG_BARCODE_ERROR, MSG_RECEIPT_NONE, SESSION_INFO_BARCODE};
use kiosk_core::{ListenerLifetime, Page, ServiceName};
use kiosk_peripherals::{BarcodeEvent, EventName, EventPayload, KioskEvent, PeripheralCommand};
use tracing::{debug, info, warn};

use super::{Step, StepContext};
use crate::receipts::barcode_receipt;

#[derive(Debug, Clone, Default)]
pub struct BarcodeFlow {
    barcode: Option<String>,
}

impl BarcodeFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last barcode read in this run.
    pub fn barcode(&self) -> Option<&str> {
        self.barcode.as_deref()
    }

    pub(crate) fn start(&mut self, ctx: &mut StepContext<'_>) {
        super::close_session(ctx, SESSION_INFO_BARCODE);
        listen(ctx);
    }

    /// Manual trigger: listen again if a previous read consumed the listener,
    /// then ask the reader for a scan.
    pub(crate) fn start_read(&mut self, ctx: &mut StepContext<'_>) {
        listen(ctx);
        ctx.execute(PeripheralCommand::ReadBarcode);
    }

    pub(crate) fn on_event(&mut self, event: &KioskEvent, ctx: &mut StepContext<'_>) -> Step {
        match (&event.service, &event.payload) {
            (ServiceName::BarcodeReading, EventPayload::BarcodeRead(read)) => {
                self.on_read(read, ctx);
                Step::Continue
            }
            (ServiceName::ReceiptPrinting, EventPayload::RawHtmlPrint(result)) => {
                super::on_final_print(result, ctx)
            }
            _ => {
                debug!("barcode read ignores {}", event.subscription());
                Step::Continue
            }
        }
    }

    fn on_read(&mut self, event: &BarcodeEvent, ctx: &mut StepContext<'_>) {
        match event {
            BarcodeEvent::BarcodeRead { barcode } => {
                info!("barcode read: {}", barcode);
                ctx.instruction(Page::Barcode, format!("Code barre lu: {barcode}"));
                ctx.print(
                    ServiceName::ReceiptPrinting,
                    EventName::RawHtmlPrint,
                    PeripheralCommand::PrintRawHtml {
                        service: ServiceName::ReceiptPrinting,
                        html: barcode_receipt(barcode),
                    },
                );
                self.barcode = Some(barcode.clone());
            }
            BarcodeEvent::Failed => {
                warn!("barcode read failed");
                ctx.instruction(Page::Barcode, MSG_BARCODE_ERROR);
                ctx.receipt_line(MSG_RECEIPT_NONE);
            }
        }
    }
}

fn listen(ctx: &mut StepContext<'_>) {
    ctx.subscribe(
        ServiceName::BarcodeReading,
        EventName::BarcodeRead,
        ListenerLifetime::OneShot,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Screen;
    use crate::effects::Effect;
    use crate::subscriptions::SubscriptionSet;
    use kiosk_core::KioskConfig;
    use kiosk_peripherals::Subscription;

    fn read_sub() -> Subscription {
        Subscription::new(ServiceName::BarcodeReading, EventName::BarcodeRead)
    }

    #[test]
    fn test_start_read_listens_again_after_consumed_read() {
        let config = KioskConfig::default();
        let mut screen = Screen::new();
        let mut subscriptions = SubscriptionSet::new();
        let mut flow = BarcodeFlow::new();

        let mut ctx = StepContext::new(&mut screen, &mut subscriptions, &config);
        flow.start(&mut ctx);
        assert!(ctx.into_effects().contains(&Effect::Subscribe(read_sub())));

        // The controller settles the one-shot listener before dispatch.
        subscriptions.settle(&read_sub(), false);
        let mut ctx = StepContext::new(&mut screen, &mut subscriptions, &config);
        flow.on_event(
            &KioskEvent::new(
                ServiceName::BarcodeReading,
                EventPayload::BarcodeRead(BarcodeEvent::Failed),
            ),
            &mut ctx,
        );
        assert!(ctx.into_effects().is_empty());
        assert_eq!(screen.instruction(Page::Barcode), MSG_BARCODE_ERROR);
        assert_eq!(flow.barcode(), None);

        let mut ctx = StepContext::new(&mut screen, &mut subscriptions, &config);
        flow.start_read(&mut ctx);
        assert_eq!(
            ctx.into_effects(),
            vec![
                Effect::Subscribe(read_sub()),
                Effect::Execute(PeripheralCommand::ReadBarcode),
            ]
        );
    }

    #[test]
    fn test_read_prints_receipt() {
        let config = KioskConfig::default();
        let mut screen = Screen::new();
        let mut subscriptions = SubscriptionSet::new();
        let mut flow = BarcodeFlow::new();

        let mut ctx = StepContext::new(&mut screen, &mut subscriptions, &config);
        flow.on_event(
            &KioskEvent::new(
                ServiceName::BarcodeReading,
                EventPayload::BarcodeRead(BarcodeEvent::BarcodeRead {
                    barcode: "42".to_string(),
                }),
            ),
            &mut ctx,
        );
        let effects = ctx.into_effects();

        assert_eq!(flow.barcode(), Some("42"));
        assert_eq!(screen.instruction(Page::Barcode), "Code barre lu: 42");
        assert!(subscriptions.contains(&Subscription::new(
            ServiceName::ReceiptPrinting,
            EventName::RawHtmlPrint
        )));
        assert!(effects.iter().any(|effect| matches!(
            effect,
            Effect::Execute(PeripheralCommand::PrintRawHtml { .. })
        )));
    }
}
