//! Data aggregation provider port
//!
//! Defines the interface for querying transactions from an external aggregation
//! provider and for managing the linked item behind an access token.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{AccessToken, ItemRemoval, TokenExchange, TransactionsPage};

/// Failure raised by a provider adapter
///
/// Stays on the adapter side of the boundary: services translate it into a
/// `DomainError` before returning to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider rejected the request or reported a business error
    #[error("{error_message}")]
    Api {
        error_type: Option<String>,
        error_code: String,
        error_message: String,
        display_message: Option<String>,
        request_id: Option<String>,
    },

    /// Network failure, timeout, or a response that could not be understood
    #[error("{0}")]
    Transport(String),
}

impl ProviderError {
    /// Structured API error with just a code and message
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            error_type: None,
            error_code: code.into(),
            error_message: message.into(),
            display_message: None,
            request_id: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// One transaction query against the provider
///
/// `offset` is `None` for the first page of a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery<'a> {
    pub access_token: &'a AccessToken,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub offset: Option<usize>,
}

/// Transaction query provider trait
///
/// Implementations issue one blocking request per call. Pagination is driven by
/// the caller through `TransactionQuery::offset`.
pub trait TransactionProvider: Send + Sync {
    /// Display name used in error messages (e.g., "Plaid")
    fn name(&self) -> &str;

    /// Fetch one page of transactions for the query's date range
    fn get_transactions(&self, query: &TransactionQuery<'_>) -> ProviderResult<TransactionsPage>;
}

/// Item management provider trait
///
/// Credential exchange and removal for the link flow.
pub trait ItemProvider: Send + Sync {
    /// Display name used in error messages
    fn name(&self) -> &str;

    /// Exchange a short-lived public token for a long-lived access token
    fn exchange_public_token(&self, public_token: &str) -> ProviderResult<TokenExchange>;

    /// Remove the item behind an access token, invalidating the token
    fn remove_item(&self, access_token: &AccessToken) -> ProviderResult<ItemRemoval>;
}
