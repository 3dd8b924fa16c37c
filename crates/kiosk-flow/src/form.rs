//! Form data collection.
//!
//! Values typed on a form page are collected on submit and merged over
//! default arguments when a transaction call is built. No validation happens
//! here: values pass through untouched.

use kiosk_core::ArgMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormCollector {
    data: ArgMap,
}

impl FormCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store every field of `inputs`, overwriting previous values.
    pub fn collect(&mut self, inputs: &ArgMap) {
        for (name, value) in inputs {
            self.data.insert(name.clone(), value.clone());
        }
    }

    /// For each key of `defaults`, the collected value if present and
    /// non-empty, otherwise the default. Collected keys absent from
    /// `defaults` are ignored.
    #[must_use]
    pub fn build_args(&self, defaults: &ArgMap) -> ArgMap {
        defaults
            .iter()
            .map(|(key, default)| {
                let value = self
                    .data
                    .get(key)
                    .filter(|value| !value.is_empty())
                    .unwrap_or(default);
                (key.clone(), value.clone())
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &ArgMap {
        &self.data
    }
}
