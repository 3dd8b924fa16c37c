//! Page navigation and use-case teardown.
//!
//! Every page switch goes through [`PageNavigator::change_page`]. Going home
//! tears down the active menu selection: its listeners are removed, forms are
//! emptied and instruction texts return to their first-instruction defaults.
//! Teardown is keyed on the active selection rather than on the page, so a
//! second call in a row removes nothing.

use kiosk_core::{ArgMap, MenuSelection, Page};
use tracing::{debug, info};

use crate::display::Screen;
use crate::effects::Effect;
use crate::form::FormCollector;
use crate::subscriptions::SubscriptionSet;

#[derive(Debug, Clone)]
pub struct PageNavigator {
    current: Page,
    active: Option<MenuSelection>,
    default_args: ArgMap,
}

impl PageNavigator {
    /// Navigator starting on the home page. `default_args` pre-fill the
    /// payment form.
    pub fn new(default_args: ArgMap) -> Self {
        Self {
            current: Page::Home,
            active: None,
            default_args,
        }
    }

    pub fn current(&self) -> Page {
        self.current
    }

    /// Menu selection being served, cleared on return home.
    pub fn active(&self) -> Option<MenuSelection> {
        self.active
    }

    pub fn select(&mut self, selection: MenuSelection) {
        self.active = Some(selection);
    }

    /// Switch the visible page to `target`.
    pub fn change_page(
        &mut self,
        target: Page,
        screen: &mut Screen,
        form: &mut FormCollector,
        subscriptions: &mut SubscriptionSet,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();

        match target {
            Page::Home => {
                if let Some(selection) = self.active.take() {
                    effects = subscriptions.drain();
                    debug!(
                        "teardown of {}: {} listener(s) removed",
                        selection,
                        effects.len()
                    );
                }
                screen.clear_inputs();
                screen.reset_instructions();
                screen.receipt_print.clear();
                form.clear();
            }
            Page::PayForm => screen.fill_inputs(Page::PayForm, &self.default_args),
            _ => {}
        }

        info!("page change: {} -> {}", self.current, target);
        screen.page = target;
        self.current = target;
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_core::{ListenerLifetime, ServiceName, TransactionArgs, UseCase};
    use kiosk_peripherals::{EventName, Subscription};

    struct Fixture {
        navigator: PageNavigator,
        screen: Screen,
        form: FormCollector,
        subscriptions: SubscriptionSet,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                navigator: PageNavigator::new(TransactionArgs::default().to_arg_map()),
                screen: Screen::new(),
                form: FormCollector::new(),
                subscriptions: SubscriptionSet::new(),
            }
        }

        fn go(&mut self, page: Page) -> Vec<Effect> {
            self.navigator.change_page(
                page,
                &mut self.screen,
                &mut self.form,
                &mut self.subscriptions,
            )
        }
    }

    fn debit() -> Subscription {
        Subscription::new(ServiceName::CardPayment, EventName::CardDebit)
    }

    #[test]
    fn test_pay_form_is_prefilled() {
        let mut fixture = Fixture::new();
        fixture.go(Page::PayForm);

        assert_eq!(fixture.screen.page, Page::PayForm);
        assert_eq!(
            fixture.screen.input(Page::PayForm, "refTransaction"),
            "test-0000"
        );
        assert_eq!(
            fixture.screen.input(Page::PayForm, "amountInCents"),
            "1000"
        );
    }

    #[test]
    fn test_home_teardown_runs_once() {
        let mut fixture = Fixture::new();
        fixture
            .navigator
            .select(MenuSelection::UseCase(UseCase::CardPay));
        fixture.go(Page::Pay);
        fixture
            .subscriptions
            .add(debit(), ListenerLifetime::UntilTerminal);
        fixture
            .form
            .collect(&TransactionArgs::default().to_arg_map());
        fixture.screen.set_instruction(Page::Pay, "Erreur: Carte muette");
        fixture.screen.receipt_print = "Impression de votre reçu en cours...".to_string();

        assert_eq!(fixture.go(Page::Home), vec![Effect::Unsubscribe(debit())]);
        assert!(fixture.form.is_empty());
        assert!(fixture.navigator.active().is_none());
        assert_eq!(
            fixture.screen.instruction(Page::Pay),
            "Veuillez introduire votre carte bancaire"
        );
        assert!(fixture.screen.receipt_print.is_empty());

        assert!(fixture.go(Page::Home).is_empty());
        assert!(fixture.form.is_empty());
        assert_eq!(fixture.navigator.current(), Page::Home);
    }

    #[test]
    fn test_other_pages_keep_state() {
        let mut fixture = Fixture::new();
        fixture
            .subscriptions
            .add(debit(), ListenerLifetime::UntilTerminal);
        assert!(fixture.go(Page::Thanks).is_empty());
        assert!(fixture.subscriptions.contains(&debit()));
    }
}
