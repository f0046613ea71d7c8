//! Remove command - remove the linked item behind an access token

use anyhow::Result;
use cadence_core::AccessToken;
use colored::Colorize;
use dialoguer::Confirm;

use super::{fail, get_context};

pub fn run(access_token: &str, force: bool, json: bool) -> Result<()> {
    let token = AccessToken::new(access_token);
    if token.is_empty() {
        anyhow::bail!("Access token cannot be empty");
    }

    let ctx = get_context()?;

    // Confirm removal unless --force
    if !force {
        println!("\n{}", "This will remove the linked item.".yellow());
        println!("{}\n", "The access token stops working immediately.".dimmed());

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let removal = match ctx.transaction_service.remove_item(&token) {
        Ok(removal) => removal,
        Err(e) => fail(e, json),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&removal)?);
        return Ok(());
    }

    if removal.removed {
        println!("\n{} Item removed\n", "✓".green());
    } else {
        println!("\n{}\n", "Provider did not confirm the removal".yellow());
    }

    Ok(())
}
