//! Application configuration.
//!
//! Every value has a default so the application runs without a file. A TOML
//! file may override any subset of the sections, and a few `KIOSK__*`
//! environment variables override the file for per-terminal tuning.
//!
//! ```toml
//! [defaults]
//! ref_shopping_cart = "borne-12"
//! amount_in_cents = 250
//!
//! [liveness]
//! url = "https://delivery.example/health"
//! timeout_ms = 2000
//!
//! [flow]
//! cash_listener = "one_shot"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AMOUNT_IN_CENTS, DEFAULT_ERROR_PAGE_SECS, DEFAULT_LIVENESS_TIMEOUT_MS,
    DEFAULT_LIVENESS_URL, DEFAULT_MAX_PAYMENT_RETRIES, DEFAULT_REF_SHOPPING_CART,
    DEFAULT_REF_TRANSACTION, DEFAULT_THANKS_RETURN_SECS, DEFAULT_VAT_PERCENT,
    DEFAULT_VITALE_READ_TIMEOUT_SECS,
};
use crate::{Error, ListenerLifetime, Result, TransactionArgs};

/// Environment override for the liveness endpoint.
pub const ENV_LIVENESS_URL: &str = "KIOSK__LIVENESS_URL";

/// Environment override for the liveness timeout, in milliseconds.
pub const ENV_LIVENESS_TIMEOUT_MS: &str = "KIOSK__LIVENESS_TIMEOUT_MS";

/// Environment override for the default amount, in cents.
pub const ENV_DEFAULT_AMOUNT_IN_CENTS: &str = "KIOSK__DEFAULT_AMOUNT_IN_CENTS";

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub defaults: TransactionDefaults,
    pub liveness: LivenessConfig,
    pub timing: TimingConfig,
    pub vitale: VitaleConfig,
    pub receipt: ReceiptConfig,
    pub flow: FlowConfig,
}

/// Arguments used when the payment form leaves a field empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionDefaults {
    pub ref_transaction: String,
    pub ref_shopping_cart: String,
    pub amount_in_cents: u64,
}

impl Default for TransactionDefaults {
    fn default() -> Self {
        Self {
            ref_transaction: DEFAULT_REF_TRANSACTION.to_string(),
            ref_shopping_cart: DEFAULT_REF_SHOPPING_CART.to_string(),
            amount_in_cents: DEFAULT_AMOUNT_IN_CENTS,
        }
    }
}

impl TransactionDefaults {
    #[must_use]
    pub fn to_args(&self) -> TransactionArgs {
        TransactionArgs {
            ref_transaction: self.ref_transaction.clone(),
            ref_shopping_cart: self.ref_shopping_cart.clone(),
            amount_in_cents: self.amount_in_cents,
        }
    }
}

/// Delivery liveness check settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LIVENESS_URL.to_string(),
            timeout_ms: DEFAULT_LIVENESS_TIMEOUT_MS,
        }
    }
}

impl LivenessConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Page timers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub thanks_return_secs: u64,
    pub error_page_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            thanks_return_secs: DEFAULT_THANKS_RETURN_SECS,
            error_page_secs: DEFAULT_ERROR_PAGE_SECS,
        }
    }
}

impl TimingConfig {
    #[must_use]
    pub fn thanks_return(&self) -> Duration {
        Duration::from_secs(self.thanks_return_secs)
    }

    #[must_use]
    pub fn error_page(&self) -> Duration {
        Duration::from_secs(self.error_page_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitaleConfig {
    pub read_timeout_secs: u64,
}

impl Default for VitaleConfig {
    fn default() -> Self {
        Self {
            read_timeout_secs: DEFAULT_VITALE_READ_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptConfig {
    pub vat_percent: u32,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            vat_percent: DEFAULT_VAT_PERCENT,
        }
    }
}

/// Behaviour switches of the use-case flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Lifetime of the cash `transactionBank` listener.
    pub cash_listener: ListenerLifetime,

    /// Automatic retries allowed for a retryable card error, per transaction.
    pub max_payment_retries: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            cash_listener: ListenerLifetime::default(),
            max_payment_retries: DEFAULT_MAX_PAYMENT_RETRIES,
        }
    }
}

impl KioskConfig {
    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns `Error::Config` if the text is not valid TOML for this schema.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load the configuration from an optional file, then apply environment
    /// overrides.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// its content or an override is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `KIOSK__*` overrides obtained through `lookup`.
    ///
    /// # Errors
    /// Returns `Error::Config` if a numeric override does not parse.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_LIVENESS_URL) {
            self.liveness.url = url;
        }
        if let Some(raw) = lookup(ENV_LIVENESS_TIMEOUT_MS) {
            self.liveness.timeout_ms = parse_override(ENV_LIVENESS_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DEFAULT_AMOUNT_IN_CENTS) {
            self.defaults.amount_in_cents = parse_override(ENV_DEFAULT_AMOUNT_IN_CENTS, &raw)?;
        }
        Ok(())
    }
}

fn parse_override(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be an integer, got '{raw}'")))
}
