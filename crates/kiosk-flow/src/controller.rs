//! Use-case flow controller.
//!
//! [`FlowController`] owns the whole session state: service registry, page
//! navigator, rendered screen, collected form data, active listeners and the
//! running use case. It is a pure transition function: each input (a user
//! action, a decoded runtime event, a timer or liveness result) mutates the
//! state and returns the [`Effect`]s to apply. Nothing here awaits or fails;
//! the driver applies effects and feeds results back.
//!
//! # Examples
//!
//! ```
//! use kiosk_core::{KioskConfig, Page, ServiceName, ServiceStatus};
//! use kiosk_flow::{FlowController, RuntimeSnapshot, UiAction};
//!
//! let mut controller = FlowController::new(KioskConfig::default());
//! controller.initialize(RuntimeSnapshot {
//!     services: vec![
//!         (ServiceName::BarcodeReading, ServiceStatus::Ok),
//!         (ServiceName::ReceiptPrinting, ServiceStatus::Ok),
//!     ],
//!     description: "Borne de démonstration".to_string(),
//!     barcode_auto_trigger: Some(true),
//! });
//!
//! controller.apply(UiAction::SelectMenu("barcode".to_string()));
//! assert_eq!(controller.page(), Page::Barcode);
//!
//! controller.apply(UiAction::SelectMenu("pay".to_string()));
//! controller.apply(UiAction::ReturnHome);
//! controller.apply(UiAction::SelectMenu("pay".to_string()));
//! assert!(controller.screen().notice.as_deref().unwrap().contains("CardPayment, TicketPrinting"));
//! ```

use std::collections::BTreeSet;

use kiosk_core::constants::{
    BARCODE_FIRST_INSTRUCTION_AUTO, BARCODE_FIRST_INSTRUCTION_MANUAL, BARCODE_MODE_AUTO,
    BARCODE_MODE_MANUAL, BARCODE_MODE_PREFIX, MSG_INVALID_AMOUNT, MSG_MISSING_SERVICES,
};
use kiosk_core::{
    AppStatusReport, ArgMap, KioskConfig, MenuSelection, Page, ServiceName, ServiceStatus,
    TransactionArgs, UseCase,
};
use kiosk_peripherals::{
    EventName, EventPayload, InactivityEvent, KioskEvent, PeripheralCommand, Subscription,
};
use tracing::{debug, info, warn};

use crate::display::Screen;
use crate::effects::{Effect, LivenessOutcome};
use crate::form::FormCollector;
use crate::navigator::PageNavigator;
use crate::registry::ServiceRegistry;
use crate::subscriptions::SubscriptionSet;
use crate::use_cases::{
    ActiveFlow, BarcodeFlow, CardPayFlow, CashPayFlow, Step, StepContext, VitaleFlow,
};

/// What the host runtime reports at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeSnapshot {
    /// Declared services with their current status.
    pub services: Vec<(ServiceName, ServiceStatus)>,

    /// Application description from the host parameters.
    pub description: String,

    /// Barcode reader trigger mode, `None` when no reader is declared.
    pub barcode_auto_trigger: Option<bool>,
}

/// User interaction with the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// Home menu entry clicked, by menu identifier.
    SelectMenu(String),

    /// Input field of the visible form edited.
    EditField { name: String, value: String },

    /// Visible form submitted.
    SubmitForm,

    /// Return-home area clicked.
    ReturnHome,

    /// Manual barcode read button clicked.
    StartBarcodeRead,

    /// Blocking notice acknowledged.
    DismissNotice,

    /// Stop the application.
    Shutdown,
}

/// Lifecycle of the use case attached to the current menu selection.
#[derive(Debug, Clone)]
pub enum FlowState {
    /// No use case running.
    Idle,

    Active(ActiveFlow),

    /// The use case reached the thanks page. Later events are dropped.
    Finished(UseCase),
}

impl FlowState {
    /// Use case running or just finished.
    pub fn use_case(&self) -> Option<UseCase> {
        match self {
            FlowState::Idle => None,
            FlowState::Active(flow) => Some(flow.use_case()),
            FlowState::Finished(use_case) => Some(*use_case),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, FlowState::Active(_))
    }
}

pub struct FlowController {
    config: KioskConfig,
    default_args: ArgMap,
    registry: ServiceRegistry,
    navigator: PageNavigator,
    screen: Screen,
    form: FormCollector,
    subscriptions: SubscriptionSet,
    app_subscriptions: BTreeSet<Subscription>,
    flow: FlowState,
    run: u64,
    thanks_token: u64,
    barcode_auto: bool,
}

impl FlowController {
    pub fn new(config: KioskConfig) -> Self {
        let default_args = config.defaults.to_args().to_arg_map();
        Self {
            navigator: PageNavigator::new(default_args.clone()),
            default_args,
            config,
            registry: ServiceRegistry::new(),
            screen: Screen::new(),
            form: FormCollector::new(),
            subscriptions: SubscriptionSet::new(),
            app_subscriptions: BTreeSet::new(),
            flow: FlowState::Idle,
            run: 0,
            thanks_token: 0,
            barcode_auto: false,
        }
    }

    /// Record the runtime snapshot, listen to status and inactivity changes
    /// and report the application as Ok.
    pub fn initialize(&mut self, snapshot: RuntimeSnapshot) -> Vec<Effect> {
        let mut effects = self.registry.initialize(snapshot.services);
        for effect in &effects {
            if let Effect::Subscribe(subscription) = effect {
                self.app_subscriptions.insert(subscription.clone());
            }
        }

        if self.registry.is_available(&ServiceName::BarcodeReading) {
            self.barcode_auto = snapshot.barcode_auto_trigger.unwrap_or(false);
            let (mode, first_instruction) = if self.barcode_auto {
                (BARCODE_MODE_AUTO, BARCODE_FIRST_INSTRUCTION_AUTO)
            } else {
                (BARCODE_MODE_MANUAL, BARCODE_FIRST_INSTRUCTION_MANUAL)
            };
            self.screen.barcode_mode = format!("{BARCODE_MODE_PREFIX}{mode}");
            self.screen
                .set_first_instruction(Page::Barcode, first_instruction);
        }
        self.screen.barcode_start_visible = !self.barcode_auto;

        let inactivity = Subscription::new(ServiceName::Session, EventName::InactivityChange);
        if self.app_subscriptions.insert(inactivity.clone()) {
            effects.push(Effect::Subscribe(inactivity));
        }

        self.screen.description = snapshot.description;
        self.refresh_status_bar();

        effects.push(Effect::Execute(PeripheralCommand::SetApplicationStatus(
            AppStatusReport::ok(),
        )));
        effects
    }

    /// Apply a user action.
    pub fn apply(&mut self, action: UiAction) -> Vec<Effect> {
        match action {
            UiAction::SelectMenu(menu_id) => self.select_menu(&menu_id),
            UiAction::EditField { name, value } => {
                self.edit_field(name, value);
                Vec::new()
            }
            UiAction::SubmitForm => self.submit_form(),
            UiAction::ReturnHome => self.return_home(),
            UiAction::StartBarcodeRead => self.start_barcode_read(),
            UiAction::DismissNotice => {
                self.dismiss_notice();
                Vec::new()
            }
            UiAction::Shutdown => self.shutdown(),
        }
    }

    /// Home menu entry selected.
    ///
    /// Use cases whose required services are not all declared stay on the
    /// home page and show a notice naming the missing services.
    pub fn select_menu(&mut self, menu_id: &str) -> Vec<Effect> {
        if self.navigator.current() != Page::Home {
            debug!("menu {} selected outside the home page", menu_id);
            return Vec::new();
        }
        let selection = match menu_id.parse::<MenuSelection>() {
            Ok(selection) => selection,
            Err(err) => {
                warn!("{}", err);
                return Vec::new();
            }
        };
        info!("menu selected: {}", selection);

        match selection {
            MenuSelection::ErrorPage => vec![
                Effect::Execute(PeripheralCommand::SetApplicationStatus(
                    AppStatusReport::critical_test(),
                )),
                Effect::ScheduleStatusRestore {
                    after: self.config.timing.error_page(),
                },
            ],
            MenuSelection::Page(page) => {
                self.navigator.select(selection);
                self.go_to(page)
            }
            MenuSelection::UseCase(use_case) => {
                let missing = self.registry.missing_for(use_case);
                if !missing.is_empty() {
                    let names = missing
                        .iter()
                        .map(ServiceName::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    warn!("menu {} blocked, missing services: {}", selection, names);
                    self.screen.notice = Some(format!("{MSG_MISSING_SERVICES}{names}"));
                    return Vec::new();
                }
                self.navigator.select(selection);
                self.go_to(use_case.entry_page())
            }
        }
    }

    /// Edit an input of the visible form.
    pub fn edit_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let page = self.navigator.current();
        if !page.has_form() {
            debug!("no form on page {}", page);
            return;
        }
        self.screen.set_input(page, name, value);
    }

    /// Collect the visible form and move on: to the use-case page for a
    /// payment form, home otherwise.
    pub fn submit_form(&mut self) -> Vec<Effect> {
        let page = self.navigator.current();
        if !page.has_form() {
            debug!("no form to submit on page {}", page);
            return Vec::new();
        }
        self.form.collect(&self.screen.inputs(page));

        match self.navigator.active() {
            Some(MenuSelection::UseCase(use_case)) => self.go_to(use_case.page()),
            _ => self.go_to(Page::Home),
        }
    }

    pub fn return_home(&mut self) -> Vec<Effect> {
        self.go_to(Page::Home)
    }

    /// Manual barcode read button.
    pub fn start_barcode_read(&mut self) -> Vec<Effect> {
        if self.barcode_auto {
            debug!("barcode reader triggers automatically");
            return Vec::new();
        }
        let FlowState::Active(ActiveFlow::Barcode(flow)) = &mut self.flow else {
            debug!("no barcode read running");
            return Vec::new();
        };
        let mut ctx = StepContext::new(&mut self.screen, &mut self.subscriptions, &self.config);
        flow.start_read(&mut ctx);
        ctx.into_effects()
    }

    pub fn dismiss_notice(&mut self) {
        self.screen.notice = None;
    }

    /// Decoded runtime notification.
    pub fn handle_event(&mut self, event: KioskEvent) -> Vec<Effect> {
        let subscription = event.subscription();
        match &event.payload {
            EventPayload::StatusChange(status) => {
                if !self.app_subscriptions.contains(&subscription) {
                    debug!("dropping {} event: no active listener", subscription);
                    return Vec::new();
                }
                let effects = self
                    .registry
                    .on_status_change(&event.service, &event.sender, *status);
                self.refresh_status_bar();
                effects
            }
            EventPayload::InactivityChange(change) => {
                if !self.app_subscriptions.contains(&subscription) {
                    debug!("dropping {} event: no active listener", subscription);
                    return Vec::new();
                }
                self.on_inactivity(*change)
            }
            _ => self.dispatch(&event, &subscription),
        }
    }

    fn dispatch(&mut self, event: &KioskEvent, subscription: &Subscription) -> Vec<Effect> {
        if !self.subscriptions.contains(subscription) {
            debug!("dropping {} event: no active listener", subscription);
            return Vec::new();
        }
        let FlowState::Active(flow) = &mut self.flow else {
            debug!("dropping {} event: no use case running", subscription);
            return Vec::new();
        };

        let mut effects: Vec<Effect> = self
            .subscriptions
            .settle(subscription, false)
            .into_iter()
            .collect();
        let mut ctx = StepContext::new(&mut self.screen, &mut self.subscriptions, &self.config);
        let step = flow.on_event(event, &mut ctx);
        effects.extend(ctx.into_effects());

        if step == Step::Finished {
            let use_case = flow.use_case();
            info!("{} finished", use_case);
            self.flow = FlowState::Finished(use_case);
            effects.extend(self.go_to(Page::Thanks));
        }
        effects
    }

    fn on_inactivity(&mut self, change: InactivityEvent) -> Vec<Effect> {
        match change {
            InactivityEvent::MarkerReached => {
                self.screen.timeout_banner = true;
                Vec::new()
            }
            InactivityEvent::Timeout => {
                info!("session timed out");
                let effects = self.go_to(Page::Home);
                self.screen.timeout_banner = false;
                effects
            }
            InactivityEvent::WatchReset => {
                self.screen.timeout_banner = false;
                Vec::new()
            }
            InactivityEvent::Unknown => {
                debug!("unknown inactivity event");
                Vec::new()
            }
        }
    }

    /// Liveness check result for use-case run `run`.
    pub fn on_liveness_result(&mut self, run: u64, outcome: LivenessOutcome) -> Vec<Effect> {
        match &mut self.flow {
            FlowState::Active(ActiveFlow::CashPay(flow)) if flow.run() == run => {
                let mut ctx =
                    StepContext::new(&mut self.screen, &mut self.subscriptions, &self.config);
                flow.on_liveness(&outcome, &mut ctx);
                ctx.into_effects()
            }
            _ => {
                debug!("dropping stale liveness result of run {}", run);
                Vec::new()
            }
        }
    }

    /// Thanks-page timer `token` elapsed.
    pub fn on_thanks_elapsed(&mut self, token: u64) -> Vec<Effect> {
        if token != self.thanks_token || self.navigator.current() != Page::Thanks {
            return Vec::new();
        }
        self.go_to(Page::Home)
    }

    /// Error-page timer elapsed: report the application as Ok again.
    pub fn on_status_restore(&mut self) -> Vec<Effect> {
        vec![Effect::Execute(PeripheralCommand::SetApplicationStatus(
            AppStatusReport::ok(),
        ))]
    }

    /// Tear everything down, application listeners included.
    pub fn shutdown(&mut self) -> Vec<Effect> {
        let mut effects = self.go_to(Page::Home);
        effects.extend(
            std::mem::take(&mut self.app_subscriptions)
                .into_iter()
                .map(Effect::Unsubscribe),
        );
        effects
    }

    fn go_to(&mut self, page: Page) -> Vec<Effect> {
        let mut effects = self.navigator.change_page(
            page,
            &mut self.screen,
            &mut self.form,
            &mut self.subscriptions,
        );

        match page {
            Page::Home => self.flow = FlowState::Idle,
            Page::Thanks => {
                self.thanks_token += 1;
                effects.push(Effect::ScheduleThanksReturn {
                    token: self.thanks_token,
                    after: self.config.timing.thanks_return(),
                });
            }
            _ => {
                if let Some(MenuSelection::UseCase(use_case)) = self.navigator.active() {
                    if use_case.page() == page && matches!(self.flow, FlowState::Idle) {
                        effects.extend(self.start_use_case(use_case));
                    }
                }
            }
        }
        effects
    }

    fn start_use_case(&mut self, use_case: UseCase) -> Vec<Effect> {
        self.run += 1;
        let mut flow = match use_case {
            UseCase::CardPay | UseCase::CashPay => {
                let raw = self.form.build_args(&self.default_args);
                let args = match TransactionArgs::try_from(&raw) {
                    Ok(args) => args,
                    Err(err) => {
                        warn!("{} not started: {}", use_case, err);
                        self.screen
                            .set_instruction(use_case.page(), MSG_INVALID_AMOUNT);
                        return Vec::new();
                    }
                };
                if use_case == UseCase::CardPay {
                    ActiveFlow::CardPay(CardPayFlow::new(args))
                } else {
                    ActiveFlow::CashPay(CashPayFlow::new(args, self.run))
                }
            }
            UseCase::Barcode => ActiveFlow::Barcode(BarcodeFlow::new()),
            UseCase::Vitale => ActiveFlow::Vitale(VitaleFlow::new()),
        };

        info!("{} started (run {})", use_case, self.run);
        let mut ctx = StepContext::new(&mut self.screen, &mut self.subscriptions, &self.config);
        flow.start(&mut ctx);
        let effects = ctx.into_effects();
        self.flow = FlowState::Active(flow);
        effects
    }

    fn refresh_status_bar(&mut self) {
        self.screen.status_bar = self.registry.status_bar();
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn page(&self) -> Page {
        self.navigator.current()
    }

    pub fn flow(&self) -> &FlowState {
        &self.flow
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn subscriptions(&self) -> &SubscriptionSet {
        &self.subscriptions
    }

    pub fn form(&self) -> &FormCollector {
        &self.form
    }

    pub fn active_menu(&self) -> Option<MenuSelection> {
        self.navigator.active()
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_peripherals::{BarcodeEvent, ConfirmEvent};

    fn controller(services: &[ServiceName]) -> FlowController {
        let mut controller = FlowController::new(KioskConfig::default());
        controller.initialize(RuntimeSnapshot {
            services: services
                .iter()
                .map(|service| (service.clone(), ServiceStatus::Ok))
                .collect(),
            description: "Borne de test".to_string(),
            barcode_auto_trigger: Some(false),
        });
        controller
    }

    #[test]
    fn test_initialize_reports_ok_and_barcode_mode() {
        let mut controller = FlowController::new(KioskConfig::default());
        let effects = controller.initialize(RuntimeSnapshot {
            services: vec![(ServiceName::BarcodeReading, ServiceStatus::Ok)],
            description: "Borne".to_string(),
            barcode_auto_trigger: Some(false),
        });

        assert_eq!(
            effects.last(),
            Some(&Effect::Execute(PeripheralCommand::SetApplicationStatus(
                AppStatusReport::ok()
            )))
        );
        assert!(effects.contains(&Effect::Subscribe(Subscription::new(
            ServiceName::Session,
            EventName::InactivityChange
        ))));
        let screen = controller.screen();
        assert_eq!(
            screen.barcode_mode,
            "Le lecteur de code barre est configuré en mode manuel"
        );
        assert_eq!(
            screen.instruction(Page::Barcode),
            BARCODE_FIRST_INSTRUCTION_MANUAL
        );
        assert!(screen.barcode_start_visible);
        assert_eq!(screen.description, "Borne");
    }

    #[test]
    fn test_error_menu_schedules_restore() {
        let mut controller = controller(&[]);
        let effects = controller.select_menu("error");
        assert_eq!(
            effects,
            vec![
                Effect::Execute(PeripheralCommand::SetApplicationStatus(
                    AppStatusReport::critical_test()
                )),
                Effect::ScheduleStatusRestore {
                    after: std::time::Duration::from_secs(10)
                },
            ]
        );
        assert_eq!(controller.page(), Page::Home);
        assert_eq!(
            controller.on_status_restore(),
            vec![Effect::Execute(PeripheralCommand::SetApplicationStatus(
                AppStatusReport::ok()
            ))]
        );
    }

    #[test]
    fn test_unknown_menu_is_ignored() {
        let mut controller = controller(&[]);
        assert!(controller.select_menu("lottery").is_empty());
        assert_eq!(controller.page(), Page::Home);
    }

    #[test]
    fn test_plain_form_returns_home() {
        let mut controller = controller(&[]);
        controller.select_menu("form");
        assert_eq!(controller.page(), Page::Form);

        controller.edit_field("name", "Dupont");
        let effects = controller.submit_form();
        assert!(effects.is_empty());
        assert_eq!(controller.page(), Page::Home);
        assert!(controller.form().is_empty());
    }

    #[test]
    fn test_late_event_after_home_is_dropped() {
        let mut controller = controller(&[ServiceName::BarcodeReading, ServiceName::ReceiptPrinting]);
        controller.select_menu("barcode");
        controller.return_home();

        let effects = controller.handle_event(KioskEvent::new(
            ServiceName::BarcodeReading,
            EventPayload::BarcodeRead(BarcodeEvent::BarcodeRead {
                barcode: "123".to_string(),
            }),
        ));
        assert!(effects.is_empty());
        assert_eq!(controller.page(), Page::Home);
        assert!(controller.screen().receipt_print.is_empty());
    }

    #[test]
    fn test_unsolicited_confirm_is_dropped() {
        let mut controller = controller(&[]);
        let effects = controller.handle_event(KioskEvent::new(
            ServiceName::CardPayment,
            EventPayload::TransactionConfirm(ConfirmEvent::TransactionConfirmed),
        ));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_manual_barcode_read_relistens() {
        let mut controller = controller(&[ServiceName::BarcodeReading, ServiceName::ReceiptPrinting]);
        controller.select_menu("barcode");
        controller.handle_event(KioskEvent::new(
            ServiceName::BarcodeReading,
            EventPayload::BarcodeRead(BarcodeEvent::Failed),
        ));
        let read = Subscription::new(ServiceName::BarcodeReading, EventName::BarcodeRead);
        assert!(!controller.subscriptions().contains(&read));

        let effects = controller.start_barcode_read();
        assert_eq!(
            effects,
            vec![
                Effect::Subscribe(read),
                Effect::Execute(PeripheralCommand::ReadBarcode)
            ]
        );
    }

    #[test]
    fn test_shutdown_removes_application_listeners() {
        let mut controller = controller(&[ServiceName::CardPayment]);
        let effects = controller.shutdown();
        assert!(effects.contains(&Effect::Unsubscribe(Subscription::new(
            ServiceName::CardPayment,
            EventName::StatusChange
        ))));
        assert!(effects.contains(&Effect::Unsubscribe(Subscription::new(
            ServiceName::Session,
            EventName::InactivityChange
        ))));
        assert!(controller.shutdown().is_empty());
    }
}
