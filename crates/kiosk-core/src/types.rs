use crate::{
    Result,
    constants::{
        ARG_AMOUNT_IN_CENTS, ARG_REF_SHOPPING_CART, ARG_REF_TRANSACTION, DEFAULT_AMOUNT_IN_CENTS,
        DEFAULT_REF_SHOPPING_CART, DEFAULT_REF_TRANSACTION,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key/value argument set passed to a peripheral call.
pub type ArgMap = BTreeMap<String, String>;

/// Name of a service exposed by the host kiosk runtime.
///
/// Known services get their own variant; anything else the host declares is
/// kept verbatim in [`ServiceName::Other`] so it can still be tracked and
/// displayed in the status bar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceName {
    PanelPc,
    Network,
    Signaling,
    Session,
    OnscreenKbd,
    BarcodeReading,
    ReceiptPrinting,
    TicketPrinting,
    DocumentPrinting,
    CardPayment,
    CashPayment,
    VitaleCardReading,
    Other(String),
}

impl ServiceName {
    /// Host-side name of the service.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ServiceName::PanelPc => "PanelPC",
            ServiceName::Network => "Network",
            ServiceName::Signaling => "Signaling",
            ServiceName::Session => "Session",
            ServiceName::OnscreenKbd => "OnscreenKbd",
            ServiceName::BarcodeReading => "BarcodeReading",
            ServiceName::ReceiptPrinting => "ReceiptPrinting",
            ServiceName::TicketPrinting => "TicketPrinting",
            ServiceName::DocumentPrinting => "DocumentPrinting",
            ServiceName::CardPayment => "CardPayment",
            ServiceName::CashPayment => "CashPayment",
            ServiceName::VitaleCardReading => "VitaleCardReading",
            ServiceName::Other(name) => name,
        }
    }
}

impl From<&str> for ServiceName {
    fn from(name: &str) -> Self {
        match name {
            "PanelPC" => ServiceName::PanelPc,
            "Network" => ServiceName::Network,
            "Signaling" => ServiceName::Signaling,
            "Session" => ServiceName::Session,
            "OnscreenKbd" => ServiceName::OnscreenKbd,
            "BarcodeReading" => ServiceName::BarcodeReading,
            "ReceiptPrinting" => ServiceName::ReceiptPrinting,
            "TicketPrinting" => ServiceName::TicketPrinting,
            "DocumentPrinting" => ServiceName::DocumentPrinting,
            "CardPayment" => ServiceName::CardPayment,
            "CashPayment" => ServiceName::CashPayment,
            "VitaleCardReading" => ServiceName::VitaleCardReading,
            other => ServiceName::Other(other.to_string()),
        }
    }
}

impl From<String> for ServiceName {
    fn from(name: String) -> Self {
        ServiceName::from(name.as_str())
    }
}

impl From<ServiceName> for String {
    fn from(name: ServiceName) -> Self {
        name.as_str().to_string()
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Availability status reported by a service.
///
/// Hosts may report statuses this application does not know about; those are
/// mapped to [`ServiceStatus::Unknown`] rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceStatus {
    Ok,
    Warning,
    Critical,
    TempUnavailable,
    Unknown,
}

impl ServiceStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Ok => "Ok",
            ServiceStatus::Warning => "Warning",
            ServiceStatus::Critical => "Critical",
            ServiceStatus::TempUnavailable => "TempUnavailable",
            ServiceStatus::Unknown => "Unknown",
        }
    }
}

impl From<&str> for ServiceStatus {
    fn from(status: &str) -> Self {
        match status {
            "Ok" => ServiceStatus::Ok,
            "Warning" => ServiceStatus::Warning,
            "Critical" => ServiceStatus::Critical,
            "TempUnavailable" => ServiceStatus::TempUnavailable,
            _ => ServiceStatus::Unknown,
        }
    }
}

impl From<String> for ServiceStatus {
    fn from(status: String) -> Self {
        ServiceStatus::from(status.as_str())
    }
}

impl From<ServiceStatus> for String {
    fn from(status: ServiceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the guided transactions offered on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCase {
    CardPay,
    CashPay,
    Barcode,
    Vitale,
}

impl UseCase {
    pub const ALL: [UseCase; 4] = [
        UseCase::CardPay,
        UseCase::CashPay,
        UseCase::Barcode,
        UseCase::Vitale,
    ];

    /// Identifier of the home menu entry starting this use case.
    #[must_use]
    pub fn menu_id(self) -> &'static str {
        match self {
            UseCase::CardPay => "pay",
            UseCase::CashPay => "cash",
            UseCase::Barcode => "barcode",
            UseCase::Vitale => "vitale",
        }
    }

    /// Services that must be declared by the host before the use case can run.
    #[must_use]
    pub fn required_services(self) -> Vec<ServiceName> {
        match self {
            UseCase::CardPay => vec![
                ServiceName::CardPayment,
                ServiceName::ReceiptPrinting,
                ServiceName::TicketPrinting,
            ],
            UseCase::Barcode => vec![ServiceName::BarcodeReading, ServiceName::ReceiptPrinting],
            UseCase::CashPay => vec![ServiceName::CashPayment, ServiceName::ReceiptPrinting],
            UseCase::Vitale => vec![
                ServiceName::VitaleCardReading,
                ServiceName::DocumentPrinting,
            ],
        }
    }

    /// Page on which the use case runs.
    #[must_use]
    pub fn page(self) -> Page {
        match self {
            UseCase::CardPay => Page::Pay,
            UseCase::CashPay => Page::Cash,
            UseCase::Barcode => Page::Barcode,
            UseCase::Vitale => Page::Vitale,
        }
    }

    /// Page shown right after the menu is selected.
    ///
    /// Payments collect their arguments first on the payment form.
    #[must_use]
    pub fn entry_page(self) -> Page {
        match self {
            UseCase::CardPay | UseCase::CashPay => Page::PayForm,
            other => other.page(),
        }
    }

    /// Payment service driving this use case, if it is a payment.
    #[must_use]
    pub fn payment_service(self) -> Option<ServiceName> {
        match self {
            UseCase::CardPay => Some(ServiceName::CardPayment),
            UseCase::CashPay => Some(ServiceName::CashPayment),
            UseCase::Barcode | UseCase::Vitale => None,
        }
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UseCase::CardPay => write!(f, "CardPay"),
            UseCase::CashPay => write!(f, "CashPay"),
            UseCase::Barcode => write!(f, "Barcode"),
            UseCase::Vitale => write!(f, "Vitale"),
        }
    }
}

/// Pages of the single-page UI. Exactly one is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Home,
    Form,
    PayForm,
    Pay,
    Cash,
    Barcode,
    Vitale,
    Thanks,
}

impl Page {
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Form => "form",
            Page::PayForm => "pay-form",
            Page::Pay => "pay",
            Page::Cash => "cash",
            Page::Barcode => "barcode",
            Page::Vitale => "vitale",
            Page::Thanks => "thanks",
        }
    }

    /// Returns `true` for pages holding a form with input fields.
    #[inline]
    #[must_use]
    pub fn has_form(self) -> bool {
        matches!(self, Page::Form | Page::PayForm)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Page {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "home" => Ok(Page::Home),
            "form" => Ok(Page::Form),
            "pay-form" => Ok(Page::PayForm),
            "pay" => Ok(Page::Pay),
            "cash" => Ok(Page::Cash),
            "barcode" => Ok(Page::Barcode),
            "vitale" => Ok(Page::Vitale),
            "thanks" => Ok(Page::Thanks),
            other => Err(Error::UnknownPage(other.to_string())),
        }
    }
}

/// Entry selected on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSelection {
    /// Starts one of the guided transactions.
    UseCase(UseCase),

    /// Simulates an application failure through the host error page.
    ErrorPage,

    /// Plain page that needs no peripheral service.
    Page(Page),
}

impl std::str::FromStr for MenuSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "error" {
            return Ok(MenuSelection::ErrorPage);
        }
        if let Some(use_case) = UseCase::ALL.iter().find(|u| u.menu_id() == s) {
            return Ok(MenuSelection::UseCase(*use_case));
        }
        match s.parse::<Page>() {
            Ok(page) => Ok(MenuSelection::Page(page)),
            Err(_) => Err(Error::UnknownMenu(s.to_string())),
        }
    }
}

impl fmt::Display for MenuSelection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MenuSelection::UseCase(use_case) => f.write_str(use_case.menu_id()),
            MenuSelection::ErrorPage => f.write_str("error"),
            MenuSelection::Page(page) => f.write_str(page.id()),
        }
    }
}

/// Arguments of a payment transaction call.
///
/// Immutable once the call is issued; the flow keeps it to confirm the
/// transaction and to title the card receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionArgs {
    pub ref_transaction: String,
    pub ref_shopping_cart: String,
    pub amount_in_cents: u64,
}

impl TransactionArgs {
    /// Render the arguments as a host argument set.
    #[must_use]
    pub fn to_arg_map(&self) -> ArgMap {
        let mut args = ArgMap::new();
        args.insert(ARG_REF_TRANSACTION.to_string(), self.ref_transaction.clone());
        args.insert(
            ARG_REF_SHOPPING_CART.to_string(),
            self.ref_shopping_cart.clone(),
        );
        args.insert(
            ARG_AMOUNT_IN_CENTS.to_string(),
            self.amount_in_cents.to_string(),
        );
        args
    }
}

impl Default for TransactionArgs {
    fn default() -> Self {
        Self {
            ref_transaction: DEFAULT_REF_TRANSACTION.to_string(),
            ref_shopping_cart: DEFAULT_REF_SHOPPING_CART.to_string(),
            amount_in_cents: DEFAULT_AMOUNT_IN_CENTS,
        }
    }
}

impl TryFrom<&ArgMap> for TransactionArgs {
    type Error = Error;

    /// Build typed arguments from a collected argument set.
    ///
    /// # Errors
    /// Returns `Error::MissingArgument` if a key is absent and
    /// `Error::InvalidArgument` if the amount is not a non-negative integer.
    fn try_from(args: &ArgMap) -> Result<Self> {
        let get = |key: &str| {
            args.get(key)
                .cloned()
                .ok_or_else(|| Error::MissingArgument(key.to_string()))
        };

        let raw_amount = get(ARG_AMOUNT_IN_CENTS)?;
        let amount_in_cents =
            raw_amount
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::InvalidArgument {
                    name: ARG_AMOUNT_IN_CENTS.to_string(),
                    reason: format!("expected an amount in cents, got '{raw_amount}'"),
                })?;

        Ok(Self {
            ref_transaction: get(ARG_REF_TRANSACTION)?,
            ref_shopping_cart: get(ARG_REF_SHOPPING_CART)?,
            amount_in_cents,
        })
    }
}

/// Lifetime of the listener on the cash `transactionBank` stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerLifetime {
    /// Removed after the first event of the stream, whatever its kind.
    OneShot,

    /// Kept across informational events, removed on a terminal outcome.
    #[default]
    UntilTerminal,
}

/// Application status reported back to the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppStatus {
    Ok,
    Critical,
}

impl AppStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AppStatus::Ok => "Ok",
            AppStatus::Critical => "Critical",
        }
    }
}

/// Status object sent with `setApplicationStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStatusReport {
    pub status: AppStatus,
    pub status_detail: String,
    pub status_description: String,
}

impl AppStatusReport {
    /// Report that brings the application back in front of the user.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: AppStatus::Ok,
            status_detail: "Ok".to_string(),
            status_description: "Retour à l'application".to_string(),
        }
    }

    /// Report that makes the host switch to its error page.
    #[must_use]
    pub fn critical_test() -> Self {
        Self {
            status: AppStatus::Critical,
            status_detail: "Test".to_string(),
            status_description: "Basculement vers la page d'erreur".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("CardPayment", ServiceName::CardPayment)]
    #[case("PanelPC", ServiceName::PanelPc)]
    #[case("VitaleCardReading", ServiceName::VitaleCardReading)]
    #[case("Scale", ServiceName::Other("Scale".to_string()))]
    fn test_service_name_roundtrip(#[case] raw: &str, #[case] expected: ServiceName) {
        let name = ServiceName::from(raw);
        assert_eq!(name, expected);
        assert_eq!(name.to_string(), raw);
    }

    #[rstest]
    #[case("Ok", ServiceStatus::Ok)]
    #[case("Warning", ServiceStatus::Warning)]
    #[case("Critical", ServiceStatus::Critical)]
    #[case("TempUnavailable", ServiceStatus::TempUnavailable)]
    #[case("Maintenance", ServiceStatus::Unknown)]
    fn test_service_status_parse(#[case] raw: &str, #[case] expected: ServiceStatus) {
        assert_eq!(ServiceStatus::from(raw), expected);
    }

    #[test]
    fn test_required_services() {
        assert_eq!(
            UseCase::CardPay.required_services(),
            vec![
                ServiceName::CardPayment,
                ServiceName::ReceiptPrinting,
                ServiceName::TicketPrinting
            ]
        );
        assert_eq!(
            UseCase::Vitale.required_services(),
            vec![ServiceName::VitaleCardReading, ServiceName::DocumentPrinting]
        );
    }

    #[rstest]
    #[case("pay", MenuSelection::UseCase(UseCase::CardPay))]
    #[case("cash", MenuSelection::UseCase(UseCase::CashPay))]
    #[case("barcode", MenuSelection::UseCase(UseCase::Barcode))]
    #[case("vitale", MenuSelection::UseCase(UseCase::Vitale))]
    #[case("error", MenuSelection::ErrorPage)]
    #[case("form", MenuSelection::Page(Page::Form))]
    fn test_menu_selection_parse(#[case] raw: &str, #[case] expected: MenuSelection) {
        assert_eq!(raw.parse::<MenuSelection>().unwrap(), expected);
    }

    #[test]
    fn test_menu_selection_unknown() {
        assert!(matches!(
            "lottery".parse::<MenuSelection>(),
            Err(Error::UnknownMenu(_))
        ));
    }

    #[test]
    fn test_menu_selection_display_roundtrip() {
        for raw in ["pay", "cash", "barcode", "vitale", "error", "form"] {
            assert_eq!(raw.parse::<MenuSelection>().unwrap().to_string(), raw);
        }
    }

    #[test]
    fn test_payment_entry_goes_through_form() {
        assert_eq!(UseCase::CardPay.entry_page(), Page::PayForm);
        assert_eq!(UseCase::CashPay.entry_page(), Page::PayForm);
        assert_eq!(UseCase::Barcode.entry_page(), Page::Barcode);
    }

    #[test]
    fn test_page_parse() {
        assert_eq!("pay-form".parse::<Page>().unwrap(), Page::PayForm);
        assert!("settings".parse::<Page>().is_err());
    }

    #[test]
    fn test_transaction_args_from_defaults() {
        let defaults = TransactionArgs::default();
        let args = TransactionArgs::try_from(&defaults.to_arg_map()).unwrap();
        assert_eq!(args, defaults);
        assert_eq!(args.amount_in_cents, 1000);
    }

    #[rstest]
    #[case("12,50")]
    #[case("-5")]
    #[case("")]
    fn test_transaction_args_invalid_amount(#[case] amount: &str) {
        let mut map = TransactionArgs::default().to_arg_map();
        map.insert(ARG_AMOUNT_IN_CENTS.to_string(), amount.to_string());
        assert!(matches!(
            TransactionArgs::try_from(&map),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_transaction_args_missing_key() {
        let mut map = TransactionArgs::default().to_arg_map();
        map.remove(ARG_REF_SHOPPING_CART);
        assert!(matches!(
            TransactionArgs::try_from(&map),
            Err(Error::MissingArgument(_))
        ));
    }

    #[test]
    fn test_app_status_report_field_names() {
        let rendered = toml::to_string(&AppStatusReport::critical_test()).unwrap();
        assert!(rendered.contains("status = \"Critical\""));
        assert!(rendered.contains("statusDetail = \"Test\""));
        assert!(rendered.contains("statusDescription"));
    }
}
