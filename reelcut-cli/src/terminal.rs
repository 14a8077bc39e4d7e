// ============================================================================
// reelcut-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: UI Components and Styling
//
// Consistent building blocks for what the CLI shows a person: section
// headers, key-value status lines, processing steps, success and error
// messages. Everything is emitted through `log::info!`, so the per-run log
// file records the same lines the user saw (minus the styling).
//
// Styling uses `console`, which drops colors when stderr is not a terminal.
//
// AI-ASSISTANT-INFO: Terminal UI components and styling for the CLI

// ---- External crate imports ----
use console::style;
use log::info;

// ============================================================================
// STYLING CONSTANTS
// ============================================================================

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const PROCESSING_SYMBOL: &str = "»";
    pub const ERROR_SYMBOL: &str = "✗";

    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";

    pub const STATUS_INDENT: &str = "  ";
    pub const SUB_ITEM_INDENT: &str = "    ";

    /// Labels are padded to this width so values line up
    pub const STATUS_LABEL_WIDTH: usize = 15;
}

// ============================================================================
// TERMINAL COMPONENTS
// ============================================================================
//
// Visual hierarchy:
//
// 1. Sections (===== SECTION =====)
// 2. Processing steps (» Step description)
// 3. Status items (  Label:     Value)
// 4. Sub-items (    detail)
//
// Spacing between components is handled here; callers never print blank
// lines themselves.

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    info!(
        "{}{}{}",
        styling::SECTION_PREFIX,
        style(title.to_uppercase()).cyan().bold().for_stderr(),
        styling::SECTION_SUFFIX
    );
    info!("");
}

/// Formats a status line (key-value pair) without printing it.
pub fn format_status(label: &str, value: &str) -> String {
    let label = format!("{label}:");
    format!(
        "{}{:<width$} {}",
        styling::STATUS_INDENT,
        label,
        value,
        width = styling::STATUS_LABEL_WIDTH
    )
}

/// Print a status line, with the value in bold when `highlight` is set
pub fn print_status(label: &str, value: &str, highlight: bool) {
    if highlight {
        let value = style(value).bold().for_stderr().to_string();
        info!("{}", format_status(label, &value));
    } else {
        info!("{}", format_status(label, value));
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    info!(
        "{}{} {}",
        styling::STATUS_INDENT,
        style(styling::SUCCESS_SYMBOL).green().for_stderr(),
        message
    );
}

/// Print a processing step message
pub fn print_processing(message: &str) {
    info!(
        "{}{} {}",
        styling::STATUS_INDENT,
        styling::PROCESSING_SYMBOL,
        style(message).bold().for_stderr()
    );
}

/// Print a detail line under a processing step
pub fn print_sub_item(message: &str) {
    info!("{}{}", styling::SUB_ITEM_INDENT, message);
}

/// Print an error message with context
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    info!(
        "{} {}",
        styling::ERROR_SYMBOL,
        style(title).red().bold().for_stderr()
    );
    info!("");
    info!("  Message:  {}", message);
    if let Some(suggestion_text) = suggestion {
        info!("");
        info!("  Suggestion: {}", suggestion_text);
    }
    info!("");
}
