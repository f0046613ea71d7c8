//! Paginated transaction fetch
//!
//! Reassembles a full date range from the provider's pages. Each follow-up
//! request asks for `offset = transactions collected so far`, so pages are
//! requested strictly one after another.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::{AccessToken, DomainError, Transaction};
use crate::ports::{ProviderError, TransactionProvider, TransactionQuery};
use crate::services::errors::translate;

/// Drives a `TransactionProvider` until the declared total has been retrieved
pub struct PaginatedFetcher<'a> {
    provider: &'a dyn TransactionProvider,
}

impl<'a> PaginatedFetcher<'a> {
    pub fn new(provider: &'a dyn TransactionProvider) -> Self {
        Self { provider }
    }

    /// Fetch every transaction between `start_date` and `end_date` (inclusive)
    ///
    /// Dates are passed through as given. The result has exactly the
    /// `total_transactions` reported by the last page, in page order.
    pub fn fetch_all(
        &self,
        access_token: &AccessToken,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Transaction>, DomainError> {
        self.fetch_pages(access_token, start_date, end_date)
            .map_err(|e| {
                let err = translate(self.provider.name(), e);
                warn!(
                    provider = self.provider.name(),
                    error_code = err.error_code.as_deref().unwrap_or("none"),
                    "Transaction fetch failed"
                );
                err
            })
    }

    fn fetch_pages(
        &self,
        access_token: &AccessToken,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Transaction>, ProviderError> {
        let mut query = TransactionQuery {
            access_token,
            start_date,
            end_date,
            offset: None,
        };

        let page = self.provider.get_transactions(&query)?;
        let mut total = page.total_transactions;
        let mut transactions = page.transactions;
        let mut requests = 1usize;
        debug!(offset = 0, received = transactions.len(), total, "Fetched transaction page");

        while transactions.len() < total {
            let offset = transactions.len();
            query.offset = Some(offset);

            let page = self.provider.get_transactions(&query)?;
            requests += 1;
            debug!(offset, received = page.transactions.len(), total = page.total_transactions, "Fetched transaction page");

            if page.transactions.is_empty() {
                return Err(ProviderError::transport(format!(
                    "empty page at offset {} with {} of {} transactions retrieved",
                    offset, offset, page.total_transactions
                )));
            }

            total = page.total_transactions;
            transactions.extend(page.transactions);
        }

        if transactions.len() > total {
            warn!(
                received = transactions.len(),
                total,
                "Provider returned more transactions than declared, truncating"
            );
            transactions.truncate(total);
        }

        info!(
            provider = self.provider.name(),
            transactions = transactions.len(),
            requests,
            "Fetched transactions"
        );

        Ok(transactions)
    }
}
