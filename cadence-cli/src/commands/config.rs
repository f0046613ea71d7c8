//! Config command - show the effective configuration

use anyhow::Result;
use cadence_core::config::Config;
use colored::Colorize;
use serde_json::json;

use super::get_cadence_dir;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let cadence_dir = get_cadence_dir()?;
    let config = Config::load(&cadence_dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config_summary(&config))?);
        return Ok(());
    }

    println!("{}", "Cadence Configuration".bold());
    println!("{}", format!("Directory: {}", cadence_dir.display()).dimmed());
    println!();

    let mut table = output::create_table();
    for (key, value) in config_rows(&config) {
        table.add_row(vec![key.to_string(), value]);
    }
    println!("{}", table);

    Ok(())
}

/// Secret shown as "***" when set
pub fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        Some(s) if !s.is_empty() => "***".to_string(),
        _ => "(not set)".to_string(),
    }
}

pub fn config_rows(config: &Config) -> Vec<(&'static str, String)> {
    vec![
        ("Plaid environment", config.plaid_environment.to_string()),
        (
            "Plaid client id",
            config
                .plaid_client_id
                .clone()
                .unwrap_or_else(|| "(not set)".to_string()),
        ),
        ("Plaid secret", mask_secret(config.plaid_secret.as_deref())),
        (
            "Plaid base URL",
            config
                .plaid_base_url
                .clone()
                .unwrap_or_else(|| config.plaid_environment.base_url()),
        ),
        ("Request timeout", format!("{}s", config.timeout_secs)),
        (
            "Recurring gap",
            format!(
                "more than {} and less than {} days",
                config.recurring.min_gap_days, config.recurring.max_gap_days
            ),
        ),
        ("Look-back window", format!("{} days", config.lookback_days)),
    ]
}

fn config_summary(config: &Config) -> serde_json::Value {
    json!({
        "plaid": {
            "environment": config.plaid_environment,
            "clientId": config.plaid_client_id,
            "secret": mask_secret(config.plaid_secret.as_deref()),
            "baseUrl": config.plaid_base_url,
            "timeoutSecs": config.timeout_secs,
        },
        "recurring": config.recurring,
        "lookbackDays": config.lookback_days,
    })
}
