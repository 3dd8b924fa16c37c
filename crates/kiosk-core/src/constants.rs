//! Core constants for the kiosk application front-end.
//!
//! This module centralizes the values shared by the orchestration layer and
//! the peripheral boundary: default transaction arguments, argument keys used
//! on the host wire, first-instruction texts and timing defaults.
//!
//! # Usage
//!
//! ```
//! use kiosk_core::constants::*;
//!
//! assert_eq!(DEFAULT_REF_TRANSACTION, "test-0000");
//! assert_eq!(DEFAULT_AMOUNT_IN_CENTS, 1000);
//! ```
//!
//! Runtime-tunable values (delays, liveness URL, VAT rate) are only defaults
//! here; the effective values come from [`KioskConfig`](crate::KioskConfig).

// ============================================================================
// Transaction Arguments
// ============================================================================

/// Host argument key for the transaction reference.
pub const ARG_REF_TRANSACTION: &str = "refTransaction";

/// Host argument key for the shopping cart reference.
pub const ARG_REF_SHOPPING_CART: &str = "refShoppingCart";

/// Host argument key for the amount, in cents.
pub const ARG_AMOUNT_IN_CENTS: &str = "amountInCents";

/// Host argument key for the confirmed amount of a transaction, in cents.
pub const ARG_CONFIRM_AMOUNT_IN_CENTS: &str = "confirmAmountInCents";

/// Default transaction reference used when the form leaves it empty.
pub const DEFAULT_REF_TRANSACTION: &str = "test-0000";

/// Default shopping cart reference used when the form leaves it empty.
pub const DEFAULT_REF_SHOPPING_CART: &str = "mon-ticket-1234";

/// Default amount in cents (10.00 EUR).
pub const DEFAULT_AMOUNT_IN_CENTS: u64 = 1000;

// ============================================================================
// Instruction Texts
// ============================================================================

/// First instruction shown on the payment pages.
pub const PAY_FIRST_INSTRUCTION: &str = "Veuillez introduire votre carte bancaire";

/// First barcode instruction when the reader triggers automatically.
pub const BARCODE_FIRST_INSTRUCTION_AUTO: &str = "En attente de scan d'un code barre...";

/// First barcode instruction when the reader must be started by the user.
pub const BARCODE_FIRST_INSTRUCTION_MANUAL: &str =
    "Appuyer sur le bouton 'Lancer la lecture' et scanner un code barre";

/// Prefix of the barcode reader mode line.
pub const BARCODE_MODE_PREFIX: &str = "Le lecteur de code barre est configuré en mode ";

/// Mode name when the barcode reader triggers automatically.
pub const BARCODE_MODE_AUTO: &str = "automatique";

/// Mode name when the barcode reader waits for the start button.
pub const BARCODE_MODE_MANUAL: &str = "manuel";

/// Session close information sent when a payment scenario starts.
pub const SESSION_INFO_PAYMENT: &str =
    "Nouvelle session utilisateur / Démarrage du scénario de paiement";

/// Session close information sent when the barcode scenario starts.
pub const SESSION_INFO_BARCODE: &str =
    "Nouvelle session utilisateur / Démarrage du scénario de lecture code barre";

/// Session close information sent when the vitale scenario starts.
pub const SESSION_INFO_VITALE: &str =
    "Nouvelle session utilisateur / Démarrage du scénario de lecture carte vitale";

// ============================================================================
// Screen Messages
// ============================================================================

/// Ticket delivery started after a card authorization.
pub const MSG_TICKET_PRINTING: &str = "Impression de votre ticket en cours...";

/// Ticket printed, transaction being confirmed.
pub const MSG_TICKET_COLLECT: &str = "Veuillez récupérer votre ticket";

/// Ticket printing failed, transaction being cancelled.
pub const MSG_TICKET_ERROR: &str = "Erreur lors de l'impression du ticket";

/// Cancellation of the pending payment requested.
pub const MSG_CANCELLING: &str = "Annulation du paiement en cours...";

/// Dematerialized delivery started after a cash authorization.
pub const MSG_DELIVERY_IN_PROGRESS: &str = "Délivrance de votre produit en cours...";

/// Dematerialized delivery failed.
pub const MSG_DELIVERY_ERROR: &str = "Erreur lors de la délivrance du produit";

/// Dematerialized delivery succeeded.
pub const MSG_DELIVERED: &str = "Produit délivré";

/// Barcode read failed.
pub const MSG_BARCODE_ERROR: &str = "Erreur de lecture code barre";

/// Receipt-print line while a receipt or document prints.
pub const MSG_RECEIPT_PRINTING: &str = "Impression de votre reçu en cours...";

/// Receipt-print line when nothing will be printed.
pub const MSG_RECEIPT_NONE: &str = "Pas d'impression de reçu";

/// Receipt-print line after a successful print.
pub const MSG_RECEIPT_COLLECT: &str = "Veuillez récupérer votre reçu";

/// Receipt-print line after a failed print.
pub const MSG_RECEIPT_ERROR: &str = "Erreur lors de l'impression du reçu";

pub const MSG_VITALE_DETECTED: &str = "Carte Vitale détectée";
pub const MSG_VITALE_REMOVED: &str = "Carte Vitale retirée";
pub const MSG_VITALE_READ: &str = "Carte Vitale lue";

/// Confirmation result arrived for a transaction the payment service no longer tracks.
pub const MSG_CONFIRM_DESYNC: &str =
    "Erreur: désynchro applicative lors de la confirmation de la transaction";

/// Cancellation result arrived for a transaction the payment service no longer tracks.
pub const MSG_CANCEL_DESYNC: &str =
    "Erreur: désynchro applicative lors de l'annulation de la transaction";

/// Amount entered on the payment form is not a number of cents.
pub const MSG_INVALID_AMOUNT: &str = "Erreur: Montant invalide";

/// Head of the notice shown when a menu lacks required services.
pub const MSG_MISSING_SERVICES: &str =
    "Impossible d'utiliser ce menu\nLes services suivants sont absents: ";

// ============================================================================
// Timing
// ============================================================================

/// Seconds spent on the thanks page before returning home.
pub const DEFAULT_THANKS_RETURN_SECS: u64 = 10;

/// Seconds the application stays in Critical status after the error menu.
pub const DEFAULT_ERROR_PAGE_SECS: u64 = 10;

/// Timeout, in seconds, passed to the vitale read call.
pub const DEFAULT_VITALE_READ_TIMEOUT_SECS: u64 = 1;

// ============================================================================
// Delivery Liveness Check
// ============================================================================

/// Endpoint queried before confirming a dematerialized delivery.
pub const DEFAULT_LIVENESS_URL: &str = "https://api.ipify.org";

/// Upper bound on the liveness check, in milliseconds.
pub const DEFAULT_LIVENESS_TIMEOUT_MS: u64 = 5000;

/// HTTP status treated as a failed delivery.
pub const LIVENESS_NOT_FOUND: u16 = 404;

// ============================================================================
// Receipts
// ============================================================================

/// VAT rate applied when splitting cash receipt totals.
pub const DEFAULT_VAT_PERCENT: u32 = 10;

/// Default number of automatic retries for a retryable card error.
pub const DEFAULT_MAX_PAYMENT_RETRIES: u32 = 3;
