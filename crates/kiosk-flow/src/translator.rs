//! Vendor error code translation.
//!
//! Each payment domain has its own error vocabulary. [`translate`] maps a raw
//! code to the French message shown on the use-case page and to the recovery
//! action the flow should take. Codes outside a domain's vocabulary map to a
//! generic "unhandled error" message and are never retried.
//!
//! # Examples
//!
//! ```
//! use kiosk_flow::translator::{translate, ErrorDomain, RecoveryAction};
//!
//! let translation = translate(ErrorDomain::CardPay, "CardMute");
//! assert_eq!(translation.message, "Erreur: Carte muette");
//! assert_eq!(translation.action, RecoveryAction::RetrySamePayment);
//!
//! let translation = translate(ErrorDomain::CashPay, "Jam");
//! assert_eq!(translation.action, RecoveryAction::DisplayOnly);
//! ```

use std::fmt;

const MSG_STATUS_ERROR: &str = "Erreur: Opération interdite dans le status actuel";
const MSG_STATE_ERROR: &str = "Erreur: Opération interdite dans le state actuel";
const MSG_HARDWARE: &str = "Erreur: Problème matériel";
const MSG_APPLICATION_CANCELLED: &str = "Erreur: Transaction annulée par l'application";
const MSG_UNHANDLED: &str = "Erreur: Erreur non traitée";

/// Error vocabulary a code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorDomain {
    CardPay,
    CashPay,
    Vitale,
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDomain::CardPay => write!(f, "card payment"),
            ErrorDomain::CashPay => write!(f, "cash payment"),
            ErrorDomain::Vitale => write!(f, "vitale reading"),
        }
    }
}

/// What the flow does after displaying the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Issue the same payment request again.
    RetrySamePayment,

    /// Show the message, nothing else.
    DisplayOnly,
}

/// Message and action for one error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub message: &'static str,
    pub action: RecoveryAction,
}

impl Translation {
    const fn display(message: &'static str) -> Self {
        Self {
            message,
            action: RecoveryAction::DisplayOnly,
        }
    }

    const fn retry(message: &'static str) -> Self {
        Self {
            message,
            action: RecoveryAction::RetrySamePayment,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_retry(&self) -> bool {
        self.action == RecoveryAction::RetrySamePayment
    }
}

/// Error codes of a `CardDebitError` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardDebitErrorCode {
    StatusError,
    StateError,
    CardMute,
    CardOutdated,
    Refused,
    UserCancelled,
    ApplicationCancelled,
    Server,
    DeviceUnavailable,
    Hardware,
    Unknown(String),
}

impl From<&str> for CardDebitErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "StatusError" => CardDebitErrorCode::StatusError,
            "StateError" => CardDebitErrorCode::StateError,
            "CardMute" => CardDebitErrorCode::CardMute,
            "CardOutdated" => CardDebitErrorCode::CardOutdated,
            "Refused" => CardDebitErrorCode::Refused,
            "UserCancelled" => CardDebitErrorCode::UserCancelled,
            "ApplicationCancelled" => CardDebitErrorCode::ApplicationCancelled,
            "Server" => CardDebitErrorCode::Server,
            "DeviceUnavailable" => CardDebitErrorCode::DeviceUnavailable,
            "Hardware" => CardDebitErrorCode::Hardware,
            other => CardDebitErrorCode::Unknown(other.to_string()),
        }
    }
}

impl CardDebitErrorCode {
    #[must_use]
    pub fn translation(&self) -> Translation {
        match self {
            CardDebitErrorCode::StatusError => Translation::display(MSG_STATUS_ERROR),
            CardDebitErrorCode::StateError => Translation::display(MSG_STATE_ERROR),
            CardDebitErrorCode::CardMute => Translation::retry("Erreur: Carte muette"),
            CardDebitErrorCode::CardOutdated => Translation::retry("Erreur: Carte périmée"),
            CardDebitErrorCode::Refused => Translation::retry("Erreur: Transaction refusée"),
            CardDebitErrorCode::UserCancelled => Translation::retry(
                "Erreur: Transaction annulée par l'utilisateur depuis le terminal",
            ),
            CardDebitErrorCode::ApplicationCancelled => {
                Translation::display(MSG_APPLICATION_CANCELLED)
            }
            CardDebitErrorCode::Server => {
                Translation::display("Erreur: Serveur monétique injoignable")
            }
            CardDebitErrorCode::DeviceUnavailable => {
                Translation::display("Erreur: Terminal indisponible")
            }
            CardDebitErrorCode::Hardware => Translation::display(MSG_HARDWARE),
            CardDebitErrorCode::Unknown(_) => Translation::display(MSG_UNHANDLED),
        }
    }
}

/// Error codes of a `TransactionBankError` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CashErrorCode {
    StatusError,
    StateError,
    Timeout,
    ApplicationTimeout,
    Hardware,
    FraudAttempt,
    Jam,
    CashUndefined,
    ApplicationCancelled,
    PayoutImpossible,
    Unknown(String),
}

impl From<&str> for CashErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "StatusError" => CashErrorCode::StatusError,
            "StateError" => CashErrorCode::StateError,
            "Timeout" => CashErrorCode::Timeout,
            "ApplicationTimeout" => CashErrorCode::ApplicationTimeout,
            "Hardware" => CashErrorCode::Hardware,
            "FraudAttempt" => CashErrorCode::FraudAttempt,
            "Jam" => CashErrorCode::Jam,
            "CashUndefined" => CashErrorCode::CashUndefined,
            "ApplicationCancelled" => CashErrorCode::ApplicationCancelled,
            "PayoutImpossible" => CashErrorCode::PayoutImpossible,
            other => CashErrorCode::Unknown(other.to_string()),
        }
    }
}

impl CashErrorCode {
    #[must_use]
    pub fn translation(&self) -> Translation {
        let message = match self {
            CashErrorCode::StatusError => MSG_STATUS_ERROR,
            CashErrorCode::StateError => MSG_STATE_ERROR,
            CashErrorCode::Timeout => {
                "Erreur: Temps d'insertion monnaie écoulé lors de la transaction"
            }
            CashErrorCode::ApplicationTimeout => {
                "Erreur: Inactivité applicative lors de la machine d'état de transaction"
            }
            CashErrorCode::Hardware => MSG_HARDWARE,
            CashErrorCode::FraudAttempt => "Erreur: Tentative de fraude de l'utilisateur",
            CashErrorCode::Jam => "Erreur: Périphérique en bourrage",
            CashErrorCode::CashUndefined => "Erreur: Type de monnaie inconnue",
            CashErrorCode::ApplicationCancelled => MSG_APPLICATION_CANCELLED,
            CashErrorCode::PayoutImpossible => "Erreur: Impossible de rendre la monnaie",
            CashErrorCode::Unknown(_) => MSG_UNHANDLED,
        };
        Translation::display(message)
    }
}

/// Error codes of a `VitaleReadError` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VitaleErrorCode {
    NoCardInserted,
    CardMute,
    CardInvalid,
    StatusError,
    StateError,
    BadFormat,
    HttpTimeout,
    AuthenticationError,
    ConnectionError,
    Unknown(String),
}

impl From<&str> for VitaleErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "NoCardInserted" => VitaleErrorCode::NoCardInserted,
            "CardMute" => VitaleErrorCode::CardMute,
            "CardInvalid" => VitaleErrorCode::CardInvalid,
            "StatusError" => VitaleErrorCode::StatusError,
            "StateError" => VitaleErrorCode::StateError,
            "BadFormat" => VitaleErrorCode::BadFormat,
            "HttpTimeout" => VitaleErrorCode::HttpTimeout,
            "AuthenticationError" => VitaleErrorCode::AuthenticationError,
            "ConnectionError" => VitaleErrorCode::ConnectionError,
            other => VitaleErrorCode::Unknown(other.to_string()),
        }
    }
}

impl VitaleErrorCode {
    #[must_use]
    pub fn translation(&self) -> Translation {
        let message = match self {
            VitaleErrorCode::NoCardInserted => {
                "Erreur: La carte n’a pas été insérée ou elle a été arrachée"
            }
            VitaleErrorCode::CardMute => "Erreur: La carte est muette",
            VitaleErrorCode::CardInvalid => "Erreur: La carte Vitale est invalide",
            VitaleErrorCode::StatusError => MSG_STATUS_ERROR,
            VitaleErrorCode::StateError => MSG_STATE_ERROR,
            VitaleErrorCode::BadFormat => "Erreur: Problème dans le format de la requête envoyée",
            VitaleErrorCode::HttpTimeout => {
                "Erreur: Temps de traitement de la commande expiré (timeout http)"
            }
            VitaleErrorCode::AuthenticationError => {
                "Erreur: Erreur d'authentification lors de l'execution de la commande"
            }
            VitaleErrorCode::ConnectionError => "Erreur: Erreur de connexion au device Helio",
            VitaleErrorCode::Unknown(_) => MSG_UNHANDLED,
        };
        Translation::display(message)
    }
}

/// Translate a vendor error `code` of `domain`.
#[must_use]
pub fn translate(domain: ErrorDomain, code: &str) -> Translation {
    match domain {
        ErrorDomain::CardPay => CardDebitErrorCode::from(code).translation(),
        ErrorDomain::CashPay => CashErrorCode::from(code).translation(),
        ErrorDomain::Vitale => VitaleErrorCode::from(code).translation(),
    }
}
