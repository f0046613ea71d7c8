//! Transaction service - fetch, then classify
//!
//! Composition root for the core: callers get back fully annotated transactions
//! or a single `DomainError`.

use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta};
use tracing::info;

use crate::domain::{AccessToken, DomainError, ItemRemoval, TokenExchange, Transaction};
use crate::ports::{ItemProvider, TransactionProvider};
use crate::services::errors::translate;
use crate::services::fetcher::PaginatedFetcher;
use crate::services::recurring::RecurringClassifier;

/// Default look-back window for `recent_transactions`
pub const DEFAULT_LOOKBACK_DAYS: i64 = 90;

/// Longest accepted look-back window (ten years)
pub const MAX_LOOKBACK_DAYS: i64 = 3650;

/// Transaction retrieval and item management over one provider
pub struct TransactionService {
    transactions: Arc<dyn TransactionProvider>,
    items: Arc<dyn ItemProvider>,
    classifier: RecurringClassifier,
    lookback_days: i64,
}

impl TransactionService {
    pub fn new(
        transactions: Arc<dyn TransactionProvider>,
        items: Arc<dyn ItemProvider>,
        classifier: RecurringClassifier,
    ) -> Self {
        Self {
            transactions,
            items,
            classifier,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }

    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn lookback_days(&self) -> i64 {
        self.lookback_days
    }

    /// All transactions in `[start_date, end_date]` with `recurring` populated
    pub fn transactions(
        &self,
        access_token: &AccessToken,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Transaction>, DomainError> {
        let fetched = PaginatedFetcher::new(self.transactions.as_ref())
            .fetch_all(access_token, start_date, end_date)?;

        let annotated = self.classifier.annotate(fetched);
        let recurring = annotated.iter().filter(|t| t.is_recurring()).count();
        info!(
            transactions = annotated.len(),
            recurring,
            "Classified recurring transactions"
        );

        Ok(annotated)
    }

    /// Transactions for the look-back window ending on `today`
    pub fn recent_transactions(
        &self,
        access_token: &AccessToken,
        today: NaiveDate,
    ) -> Result<Vec<Transaction>, DomainError> {
        let (start_date, end_date) = self.lookback_window(today)?;
        self.transactions(access_token, start_date, end_date)
    }

    /// `(today - lookback_days, today)`
    ///
    /// Fails instead of wrapping when the window reaches past the calendar range.
    pub fn lookback_window(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), DomainError> {
        TimeDelta::try_days(self.lookback_days)
            .and_then(|window| today.checked_sub_signed(window))
            .map(|start| (start, today))
            .ok_or_else(|| {
                DomainError::transport(format!(
                    "Look-back window of {} days before {} is out of range",
                    self.lookback_days, today
                ))
            })
    }

    /// Exchange a link-flow public token for an access token
    pub fn exchange_public_token(&self, public_token: &str) -> Result<TokenExchange, DomainError> {
        self.items
            .exchange_public_token(public_token)
            .map_err(|e| translate(self.items.name(), e))
    }

    /// Remove the item behind `access_token`
    pub fn remove_item(&self, access_token: &AccessToken) -> Result<ItemRemoval, DomainError> {
        self.items
            .remove_item(access_token)
            .map_err(|e| translate(self.items.name(), e))
    }
}
