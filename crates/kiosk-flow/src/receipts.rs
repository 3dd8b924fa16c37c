//! HTML documents sent to the printers.
//!
//! Amounts are integer cents throughout and are rendered with
//! [`format_amount`].

use serde_json::Value;

const RECEIPT_OPEN: &str = r#"<html><meta charset="utf-8"><body style="font-size:80%; font-family:sans-serif; margin: 0px 20px;">"#;
const RECEIPT_CLOSE: &str = "</body></html>";

/// Ticket printed on the ticket printer after a card authorization.
pub const TICKET_HTML: &str = "<html><body><h1>Exemple de ticket</h1></body></html>";

/// Render `cents` as euros with two decimals, e.g. `"10.00 &euro;"`.
#[must_use]
pub fn format_amount(cents: u64) -> String {
    format!("{}.{:02} &euro;", cents / 100, cents % 100)
}

/// Receipt printed after a successful barcode read.
#[must_use]
pub fn barcode_receipt(barcode: &str) -> String {
    format!(
        "{RECEIPT_OPEN}<h1>Exemple de reçu</h1><h2>Votre commande</h2><hr /><ul><li>Lecture de code barre</li></ul><p>Votre code barre</p><p>{barcode}</p><hr />{RECEIPT_CLOSE}"
    )
}

/// Outcome of a cash transaction, as printed on its receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashReceipt {
    Banked {
        confirmed: u64,
        inserted: u64,
        returned: u64,
    },
    Failed,
}

/// Split `total` into (excluding tax, tax) for a VAT rate in percent.
///
/// The excluding-tax part is rounded to the nearest cent and the tax is the
/// remainder, so both always add up to `total`. Computed in `u128` so any
/// amount the runtime reports fits.
#[must_use]
pub fn vat_split(total: u64, vat_percent: u32) -> (u64, u64) {
    let divisor = 100 + u128::from(vat_percent);
    let scaled = (u128::from(total) * 100 + divisor / 2) / divisor;
    // divisor >= 100, so scaled never exceeds total
    let excluding = u64::try_from(scaled).unwrap_or(total);
    (excluding, total - excluding)
}

/// Receipt printed at the end of a cash transaction.
#[must_use]
pub fn cash_receipt(receipt: CashReceipt, vat_percent: u32) -> String {
    let body = match receipt {
        CashReceipt::Failed => "<h4>Erreur de paiement</h4>".to_string(),
        CashReceipt::Banked {
            confirmed,
            inserted,
            returned,
        } => {
            let (excluding, vat) = vat_split(confirmed, vat_percent);
            format!(
                "<h4>Détail de la transaction:</h4><ul><li>Total: {}</li><li>Montant inséré: {}</li><li>Rendu: {}</li></ul>\n\n<ul><li>Dont TVA: {}</li><li>Total HT: {}</li></ul>",
                format_amount(confirmed),
                format_amount(inserted),
                format_amount(returned),
                format_amount(vat),
                format_amount(excluding),
            )
        }
    };
    format!("{RECEIPT_OPEN}{body}{RECEIPT_CLOSE}")
}

/// Header and footer framing the payment terminal receipt.
#[must_use]
pub fn card_receipt(ref_shopping_cart: &str) -> (String, String) {
    let header = format!(
        "<h1 style='font-size: 20px; font-weight:bold; font-family: Verdana, sans-serif; text-align: center;'>Votre reçu</h1><h2  style='font-size: 15px; font-weight:bold; font-family: Verdana, sans-serif; text-align: center;'>Panier {ref_shopping_cart}</h2><div><pre style='font-size: 14px; font-family: Verdana, sans-serif;'>"
    );
    let footer = "</pre></div><hr><p style='font-family: Verdana, sans-serif; text-align: center;'>Au revoir</p>".to_string();
    (header, footer)
}

/// Document listing the beneficiaries read from a vitale card.
#[must_use]
pub fn vitale_document(beneficiaries: &[Value]) -> String {
    let items: String = beneficiaries
        .iter()
        .map(|beneficiary| format!("<li>{}</li>", beneficiary_name(beneficiary)))
        .collect();
    format!(
        "{RECEIPT_OPEN}<h1>Carte Vitale</h1><h2>Bénéficiaires</h2><hr /><ul>{items}</ul><hr />{RECEIPT_CLOSE}"
    )
}

fn beneficiary_name(beneficiary: &Value) -> String {
    let field = |key: &str| beneficiary.get(key).and_then(Value::as_str);
    match (field("prenom"), field("nom")) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        (None, Some(last)) => last.to_string(),
        _ => match beneficiary {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        },
    }
}
