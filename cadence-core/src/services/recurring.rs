//! Recurring charge detection
//!
//! A merchant's charges are recurring when they arrive roughly monthly and all
//! for the same amount. Classification is per merchant: one bad gap or one
//! different amount disqualifies every transaction with that name.
//!
//! Gaps are measured in the order the provider delivered the transactions
//! (most recent first), without sorting by date. A merchant delivered oldest
//! first produces negative gaps and is never flagged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::Transaction;

/// Bounds for "about a month apart", both exclusive
///
/// The slack around 30 days absorbs charges that land on business days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRules {
    pub min_gap_days: i64,
    pub max_gap_days: i64,
}

impl Default for RecurringRules {
    fn default() -> Self {
        Self {
            min_gap_days: 25,
            max_gap_days: 35,
        }
    }
}

/// Annotates transactions with the `recurring` flag
#[derive(Debug, Clone, Copy, Default)]
pub struct RecurringClassifier {
    rules: RecurringRules,
}

impl RecurringClassifier {
    pub fn new(rules: RecurringRules) -> Self {
        Self { rules }
    }

    /// Set `recurring` on every transaction
    ///
    /// Never drops or reorders input. Any flag already present is overwritten,
    /// so annotating twice gives the same result as annotating once.
    pub fn annotate(&self, mut transactions: Vec<Transaction>) -> Vec<Transaction> {
        let groups = group_by_merchant(&transactions);

        let mut flags = vec![false; transactions.len()];
        for members in groups.iter().filter(|members| members.len() > 1) {
            let group: Vec<&Transaction> = members.iter().map(|&i| &transactions[i]).collect();
            if self.about_a_month_apart(&group) && all_same_amount(&group) {
                for &i in members {
                    flags[i] = true;
                }
            }
        }

        for (tx, recurring) in transactions.iter_mut().zip(flags) {
            tx.recurring = Some(recurring);
        }
        transactions
    }

    fn about_a_month_apart(&self, group: &[&Transaction]) -> bool {
        group.windows(2).all(|pair| {
            let days = (pair[0].date() - pair[1].date()).num_days();
            days > self.rules.min_gap_days && days < self.rules.max_gap_days
        })
    }
}

/// Indices of each merchant's transactions, groups in first-seen order
fn group_by_merchant(transactions: &[Transaction]) -> Vec<Vec<usize>> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (i, tx) in transactions.iter().enumerate() {
        let slot = *slots.entry(tx.name()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(i);
    }

    groups
}

fn all_same_amount(group: &[&Transaction]) -> bool {
    group.windows(2).all(|pair| pair[0].amount() == pair[1].amount())
}
