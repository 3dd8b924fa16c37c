//! Rendered state of the single-page UI.
//!
//! [`Screen`] holds every text the UI shows: the visible page, the instruction
//! line of each use-case page, the receipt-print line, form inputs, the status
//! and description bars, the inactivity banner and the blocking notice. The
//! controller mutates it; the driver publishes a clone after each step.
//!
//! # Examples
//!
//! ```
//! use kiosk_core::Page;
//! use kiosk_flow::Screen;
//!
//! let mut screen = Screen::new();
//! assert_eq!(screen.instruction(Page::Pay), "Veuillez introduire votre carte bancaire");
//!
//! screen.set_instruction(Page::Pay, "Carte bancaire introduite (type Visa)");
//! screen.reset_instructions();
//! assert_eq!(screen.instruction(Page::Pay), "Veuillez introduire votre carte bancaire");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use kiosk_core::constants::PAY_FIRST_INSTRUCTION;
use kiosk_core::{ArgMap, Page};
use serde::Serialize;

/// Pages carrying an instruction line.
const INSTRUCTION_PAGES: [Page; 4] = [Page::Pay, Page::Cash, Page::Barcode, Page::Vitale];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screen {
    /// Visible page.
    pub page: Page,

    instructions: BTreeMap<Page, String>,

    first_instructions: BTreeMap<Page, String>,

    /// Receipt-print status line shared by the use-case pages.
    pub receipt_print: String,

    inputs: BTreeMap<Page, ArgMap>,

    /// One `"Service (Status)"` indicator per declared service.
    pub status_bar: Vec<String>,

    /// Inactivity warning banner.
    pub timeout_banner: bool,

    /// Blocking notice awaiting dismissal.
    pub notice: Option<String>,

    /// Description bar text.
    pub description: String,

    /// Barcode reader mode line.
    pub barcode_mode: String,

    /// Whether the manual barcode start button is shown.
    pub barcode_start_visible: bool,
}

impl Default for Screen {
    fn default() -> Self {
        let mut first_instructions: BTreeMap<Page, String> = INSTRUCTION_PAGES
            .iter()
            .map(|page| (*page, String::new()))
            .collect();
        first_instructions.insert(Page::Pay, PAY_FIRST_INSTRUCTION.to_string());

        Self {
            page: Page::Home,
            instructions: first_instructions.clone(),
            first_instructions,
            receipt_print: String::new(),
            inputs: BTreeMap::new(),
            status_bar: Vec::new(),
            timeout_banner: false,
            notice: None,
            description: String::new(),
            barcode_mode: String::new(),
            barcode_start_visible: true,
        }
    }
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instruction line of `page`, empty for pages without one.
    pub fn instruction(&self, page: Page) -> &str {
        self.instructions.get(&page).map_or("", String::as_str)
    }

    pub fn set_instruction(&mut self, page: Page, text: impl Into<String>) {
        self.instructions.insert(page, text.into());
    }

    /// Set the text `page` shows on entry and after every reset.
    pub fn set_first_instruction(&mut self, page: Page, text: impl Into<String>) {
        let text = text.into();
        self.instructions.insert(page, text.clone());
        self.first_instructions.insert(page, text);
    }

    pub fn reset_instructions(&mut self) {
        self.instructions = self.first_instructions.clone();
    }

    /// Current value of an input field, empty if never typed.
    pub fn input(&self, page: Page, name: &str) -> &str {
        self.inputs
            .get(&page)
            .and_then(|fields| fields.get(name))
            .map_or("", String::as_str)
    }

    pub fn set_input(&mut self, page: Page, name: impl Into<String>, value: impl Into<String>) {
        self.inputs
            .entry(page)
            .or_default()
            .insert(name.into(), value.into());
    }

    /// Every input of `page` by field name.
    pub fn inputs(&self, page: Page) -> ArgMap {
        self.inputs.get(&page).cloned().unwrap_or_default()
    }

    /// Replace the inputs of `page` with `values`.
    pub fn fill_inputs(&mut self, page: Page, values: &ArgMap) {
        self.inputs.insert(page, values.clone());
    }

    /// Empty every input of every form.
    pub fn clear_inputs(&mut self) {
        for fields in self.inputs.values_mut() {
            for value in fields.values_mut() {
                value.clear();
            }
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.page, self.description)?;
        if self.timeout_banner {
            writeln!(f, "  !! session about to expire")?;
        }
        if let Some(notice) = &self.notice {
            for line in notice.lines() {
                writeln!(f, "  ** {}", line)?;
            }
        }
        if self.page == Page::Barcode && !self.barcode_mode.is_empty() {
            writeln!(f, "  {}", self.barcode_mode)?;
        }
        let instruction = self.instruction(self.page);
        if !instruction.is_empty() {
            writeln!(f, "  > {}", instruction)?;
        }
        if !self.receipt_print.is_empty() {
            writeln!(f, "  > {}", self.receipt_print)?;
        }
        for (name, value) in self.inputs.get(&self.page).into_iter().flatten() {
            writeln!(f, "  {} = {}", name, value)?;
        }
        write!(f, "  | {}", self.status_bar.join(" | "))
    }
}
