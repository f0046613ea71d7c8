//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use cadence_core::DomainError;
use rust_decimal::Decimal;

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a provider failure, with its code when there is one
pub fn domain_error(err: &DomainError) {
    match err.error_code.as_deref() {
        Some(code) => error(&format!("Error: {} ({})", err.error_message, code)),
        None => error(&format!("Error: {}", err.error_message)),
    }
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format an amount with two decimal places
///
/// Plaid reports money leaving the account as positive, so no sign is added.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}
