//! Listeners registered for the active use case.
//!
//! Every registration carries an explicit [`ListenerLifetime`]: one-shot
//! listeners go away after the first event they receive, the others stay until
//! the flow reports a terminal outcome on their stream. Adding and removing are
//! idempotent, so a listener is never registered or removed twice on the
//! runtime side.

use std::collections::BTreeMap;

use kiosk_core::ListenerLifetime;
use kiosk_peripherals::Subscription;

use crate::effects::Effect;

#[derive(Debug, Clone, Default)]
pub struct SubscriptionSet {
    active: BTreeMap<Subscription, ListenerLifetime>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `subscription`. Returns the effect to apply, or `None` if it
    /// was already active (its lifetime is then updated).
    pub fn add(&mut self, subscription: Subscription, lifetime: ListenerLifetime) -> Option<Effect> {
        match self.active.insert(subscription.clone(), lifetime) {
            Some(_) => None,
            None => Some(Effect::Subscribe(subscription)),
        }
    }

    /// Remove `subscription`. Returns `None` if it was not active.
    pub fn remove(&mut self, subscription: &Subscription) -> Option<Effect> {
        self.active
            .remove(subscription)
            .map(|_| Effect::Unsubscribe(subscription.clone()))
    }

    /// Apply the lifetime rule after an event was dispatched on `subscription`.
    pub fn settle(&mut self, subscription: &Subscription, terminal: bool) -> Option<Effect> {
        match self.active.get(subscription) {
            Some(ListenerLifetime::OneShot) => self.remove(subscription),
            Some(ListenerLifetime::UntilTerminal) if terminal => self.remove(subscription),
            _ => None,
        }
    }

    /// Remove every listener, returning the matching effects.
    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.active)
            .into_keys()
            .map(Effect::Unsubscribe)
            .collect()
    }

    pub fn contains(&self, subscription: &Subscription) -> bool {
        self.active.contains_key(subscription)
    }

    pub fn lifetime(&self, subscription: &Subscription) -> Option<ListenerLifetime> {
        self.active.get(subscription).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.active.keys()
    }
}
