//! Exchange command - turn a link public token into an access token

use anyhow::Result;
use colored::Colorize;

use super::{fail, get_context};

pub fn run(public_token: &str, json: bool) -> Result<()> {
    if public_token.trim().is_empty() {
        anyhow::bail!("Public token cannot be empty");
    }

    let ctx = get_context()?;
    let exchange = match ctx.transaction_service.exchange_public_token(public_token) {
        Ok(exchange) => exchange,
        Err(e) => fail(e, json),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&exchange)?);
        return Ok(());
    }

    println!("{} Public token exchanged", "Success!".green());
    println!("  Item ID:      {}", exchange.item_id);
    println!("  Access token: {}", exchange.access_token.as_str());
    println!();
    println!(
        "{}",
        "Export it as PLAID_ACCESS_TOKEN to run 'cadence transactions'.".dimmed()
    );

    Ok(())
}
