//! Service registry.
//!
//! Tracks the status of every service the host declares. Availability of a
//! use case is decided on presence alone: a declared service counts as
//! available whatever its status, the status only feeds the status bar and the
//! logs.

use std::collections::BTreeMap;

use kiosk_core::{ServiceName, ServiceStatus, UseCase};
use kiosk_peripherals::{EventName, PeripheralCommand, Subscription};
use tracing::{debug, error, info, warn};

use crate::effects::Effect;

#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    statuses: BTreeMap<ServiceName, ServiceStatus>,
    keyboard_auto_show: bool,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the initial status of each declared service and subscribe to its
    /// status changes.
    pub fn initialize(&mut self, services: Vec<(ServiceName, ServiceStatus)>) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(services.len() + 1);
        for (service, status) in services {
            effects.push(Effect::Subscribe(Subscription::new(
                service.clone(),
                EventName::StatusChange,
            )));
            self.statuses.insert(service.clone(), status);
            effects.extend(self.check(&service, status));
        }
        effects
    }

    /// Status-change notification for `service`, declared as sent by `sender`.
    ///
    /// A mismatched sender is ignored.
    pub fn on_status_change(
        &mut self,
        service: &ServiceName,
        sender: &ServiceName,
        status: ServiceStatus,
    ) -> Vec<Effect> {
        if service != sender {
            debug!(
                "ignoring status change for {} declared by {}",
                service, sender
            );
            return Vec::new();
        }
        self.statuses.insert(service.clone(), status);
        self.check(service, status).into_iter().collect()
    }

    fn check(&mut self, service: &ServiceName, status: ServiceStatus) -> Option<Effect> {
        match status {
            ServiceStatus::Ok => info!("service {} is available", service),
            ServiceStatus::Warning => warn!("service {} is partially available", service),
            ServiceStatus::TempUnavailable => {
                error!("service {} is temporarily unavailable", service)
            }
            ServiceStatus::Critical | ServiceStatus::Unknown => {
                error!("service {} is unavailable", service)
            }
        }

        if status == ServiceStatus::Ok
            && *service == ServiceName::OnscreenKbd
            && !self.keyboard_auto_show
        {
            self.keyboard_auto_show = true;
            return Some(Effect::Execute(PeripheralCommand::SetAutoShow { enabled: true }));
        }
        None
    }

    /// Returns `true` if the host declared `service`.
    pub fn is_available(&self, service: &ServiceName) -> bool {
        self.statuses.contains_key(service)
    }

    pub fn status(&self, service: &ServiceName) -> Option<ServiceStatus> {
        self.statuses.get(service).copied()
    }

    /// Required services of `use_case` the host did not declare, in
    /// requirement order.
    pub fn missing_for(&self, use_case: UseCase) -> Vec<ServiceName> {
        use_case
            .required_services()
            .into_iter()
            .filter(|service| !self.is_available(service))
            .collect()
    }

    /// Status indicator text, `"Service (Status)"`.
    pub fn status_line(&self, service: &ServiceName) -> Option<String> {
        self.status(service)
            .map(|status| format!("{} ({})", service, status))
    }

    /// One indicator per declared service.
    pub fn status_bar(&self) -> Vec<String> {
        self.services()
            .filter_map(|service| self.status_line(service))
            .collect()
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceName> {
        self.statuses.keys()
    }

    pub fn keyboard_auto_show(&self) -> bool {
        self.keyboard_auto_show
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(services: &[(ServiceName, ServiceStatus)]) -> ServiceRegistry {
        let mut registry = ServiceRegistry::new();
        registry.initialize(services.to_vec());
        registry
    }

    #[test]
    fn test_initialize_subscribes_each_service() {
        let mut registry = ServiceRegistry::new();
        let effects = registry.initialize(vec![
            (ServiceName::CardPayment, ServiceStatus::Ok),
            (ServiceName::ReceiptPrinting, ServiceStatus::Critical),
        ]);

        assert_eq!(
            effects,
            vec![
                Effect::Subscribe(Subscription::new(
                    ServiceName::CardPayment,
                    EventName::StatusChange
                )),
                Effect::Subscribe(Subscription::new(
                    ServiceName::ReceiptPrinting,
                    EventName::StatusChange
                )),
            ]
        );
        assert_eq!(
            registry.status(&ServiceName::ReceiptPrinting),
            Some(ServiceStatus::Critical)
        );
    }

    #[test]
    fn test_status_change_requires_matching_sender() {
        let mut registry = registry(&[(ServiceName::CardPayment, ServiceStatus::Ok)]);

        registry.on_status_change(
            &ServiceName::CardPayment,
            &ServiceName::CashPayment,
            ServiceStatus::Critical,
        );
        assert_eq!(
            registry.status(&ServiceName::CardPayment),
            Some(ServiceStatus::Ok)
        );

        registry.on_status_change(
            &ServiceName::CardPayment,
            &ServiceName::CardPayment,
            ServiceStatus::TempUnavailable,
        );
        assert_eq!(
            registry.status_line(&ServiceName::CardPayment).as_deref(),
            Some("CardPayment (TempUnavailable)")
        );
        assert!(registry.is_available(&ServiceName::CardPayment));
    }

    #[test]
    fn test_keyboard_auto_show_once() {
        let mut registry = ServiceRegistry::new();
        let effects = registry.initialize(vec![(ServiceName::OnscreenKbd, ServiceStatus::Warning)]);
        assert_eq!(effects.len(), 1);
        assert!(!registry.keyboard_auto_show());

        let kbd = ServiceName::OnscreenKbd;
        assert_eq!(
            registry.on_status_change(&kbd, &kbd, ServiceStatus::Ok),
            vec![Effect::Execute(PeripheralCommand::SetAutoShow {
                enabled: true
            })]
        );
        assert!(
            registry
                .on_status_change(&kbd, &kbd, ServiceStatus::Ok)
                .is_empty()
        );
    }

    #[test]
    fn test_missing_for_is_presence_based() {
        let registry = registry(&[
            (ServiceName::CardPayment, ServiceStatus::Critical),
            (ServiceName::ReceiptPrinting, ServiceStatus::Ok),
        ]);

        assert_eq!(
            registry.missing_for(UseCase::CardPay),
            vec![ServiceName::TicketPrinting]
        );
        assert!(registry.missing_for(UseCase::CashPay).contains(&ServiceName::CashPayment));
        assert_eq!(
            registry.missing_for(UseCase::Vitale),
            vec![ServiceName::VitaleCardReading, ServiceName::DocumentPrinting]
        );
    }

    #[test]
    fn test_status_bar_lists_every_service() {
        let registry = registry(&[
            (ServiceName::Session, ServiceStatus::Ok),
            (ServiceName::Other("Scale".to_string()), ServiceStatus::Unknown),
        ]);
        let bar = registry.status_bar();
        assert_eq!(bar.len(), 2);
        assert!(bar.contains(&"Session (Ok)".to_string()));
        assert!(bar.contains(&"Scale (Unknown)".to_string()));
    }
}
