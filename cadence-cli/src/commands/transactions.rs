//! Transactions command - fetch a date range and flag recurring charges

use anyhow::Result;
use cadence_core::{AccessToken, Transaction};
use chrono::{NaiveDate, Utc};
use colored::Colorize;
use comfy_table::Cell;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{fail, get_context};
use crate::output;

#[derive(Serialize)]
struct TransactionsOutput<'a> {
    transactions: &'a [Transaction],
}

/// One row of the recurring charges summary
#[derive(Debug, PartialEq)]
pub struct RecurringCharge<'a> {
    pub name: &'a str,
    pub amount: Decimal,
    pub occurrences: usize,
    pub last_date: NaiveDate,
}

pub fn run(
    access_token: &str,
    range: Option<(NaiveDate, NaiveDate)>,
    recurring_only: bool,
    json: bool,
) -> Result<()> {
    let token = AccessToken::new(access_token);
    if token.is_empty() {
        anyhow::bail!("Access token cannot be empty");
    }

    let ctx = get_context()?;
    let service = &ctx.transaction_service;

    let (start_date, end_date) = match range {
        Some(range) => range,
        None => match service.lookback_window(Utc::now().date_naive()) {
            Ok(window) => window,
            Err(e) => fail(e, json),
        },
    };
    if start_date > end_date {
        anyhow::bail!("Start date {} is after end date {}", start_date, end_date);
    }

    let mut transactions = match service.transactions(&token, start_date, end_date) {
        Ok(transactions) => transactions,
        Err(e) => fail(e, json),
    };
    if recurring_only {
        transactions.retain(|t| t.is_recurring());
    }

    if json {
        let body = TransactionsOutput {
            transactions: &transactions,
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Transactions {} to {}", start_date, end_date).bold()
    );
    println!();

    if transactions.is_empty() {
        output::warning("No transactions in this range.");
        return Ok(());
    }

    println!("{}", transactions_table(&transactions));
    println!();

    let charges = recurring_charges(&transactions);
    if charges.is_empty() {
        output::info("No recurring charges found.");
        return Ok(());
    }

    println!("{}", "Recurring Charges".bold());
    for charge in &charges {
        println!(
            "  • {} - {} x{} (last {})",
            charge.name,
            output::format_amount(charge.amount),
            charge.occurrences,
            charge.last_date
        );
    }

    Ok(())
}

/// Table of date, name, amount and recurring flag
pub fn transactions_table(transactions: &[Transaction]) -> comfy_table::Table {
    let mut table = output::create_table();
    table.set_header(vec!["Date", "Name", "Amount", "Recurring"]);

    for tx in transactions {
        let recurring = if tx.is_recurring() {
            Cell::new("yes").fg(comfy_table::Color::Green)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(tx.date()),
            Cell::new(tx.name()),
            Cell::new(output::format_amount(tx.amount())),
            recurring,
        ]);
    }

    table
}

/// Recurring merchants in first-seen order
pub fn recurring_charges(transactions: &[Transaction]) -> Vec<RecurringCharge<'_>> {
    let mut charges: Vec<RecurringCharge<'_>> = Vec::new();

    for tx in transactions.iter().filter(|t| t.is_recurring()) {
        match charges.iter_mut().find(|c| c.name == tx.name()) {
            Some(charge) => {
                charge.occurrences += 1;
                charge.last_date = charge.last_date.max(tx.date());
            }
            None => charges.push(RecurringCharge {
                name: tx.name(),
                amount: tx.amount(),
                occurrences: 1,
                last_date: tx.date(),
            }),
        }
    }

    charges
}
