//! Plaid API client
//!
//! Handles communication with the Plaid API for transaction queries and item
//! management. Every endpoint is a JSON `POST` authenticated with the client id
//! and secret in the body.
//!
//! API Documentation: https://plaid.com/docs/api/

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::domain::result::Error as CoreError;
use crate::domain::{AccessToken, ItemRemoval, TokenExchange, TransactionsPage};
use crate::ports::{ItemProvider, ProviderError, ProviderResult, TransactionProvider, TransactionQuery};

/// Display name used in translated error messages
pub const PLAID_PROVIDER_NAME: &str = "Plaid";

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Environments
// =============================================================================

/// Plaid deployment to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaidEnvironment {
    #[default]
    Sandbox,
    Development,
    Production,
}

impl PlaidEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "sandbox",
            PlaidEnvironment::Development => "development",
            PlaidEnvironment::Production => "production",
        }
    }

    /// API host for this environment
    pub fn base_url(&self) -> String {
        format!("https://{}.plaid.com", self.as_str())
    }
}

impl fmt::Display for PlaidEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaidEnvironment {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sandbox" => Ok(PlaidEnvironment::Sandbox),
            "development" => Ok(PlaidEnvironment::Development),
            "production" => Ok(PlaidEnvironment::Production),
            other => Err(CoreError::config(format!(
                "Unknown Plaid environment '{}' (expected sandbox, development or production)",
                other
            ))),
        }
    }
}

// =============================================================================
// API Request/Response Models
// =============================================================================

#[derive(Debug, Serialize)]
struct TransactionsGetRequest<'a> {
    client_id: &'a str,
    secret: &'a str,
    access_token: &'a str,
    start_date: String,
    end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<TransactionsGetOptions>,
}

#[derive(Debug, Serialize)]
struct TransactionsGetOptions {
    offset: usize,
}

#[derive(Debug, Serialize)]
struct PublicTokenExchangeRequest<'a> {
    client_id: &'a str,
    secret: &'a str,
    public_token: &'a str,
}

#[derive(Debug, Serialize)]
struct ItemRemoveRequest<'a> {
    client_id: &'a str,
    secret: &'a str,
    access_token: &'a str,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, Deserialize)]
struct PlaidApiError {
    #[serde(default)]
    error_type: Option<String>,
    error_code: String,
    error_message: String,
    #[serde(default)]
    display_message: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
}

impl From<PlaidApiError> for ProviderError {
    fn from(e: PlaidApiError) -> Self {
        ProviderError::Api {
            error_type: e.error_type,
            error_code: e.error_code,
            error_message: e.error_message,
            display_message: e.display_message,
            request_id: e.request_id,
        }
    }
}

// =============================================================================
// Plaid HTTP Client
// =============================================================================

/// Plaid API client
///
/// Construct once at startup and share; it holds a connection pool.
pub struct PlaidClient {
    client: reqwest::blocking::Client,
    client_id: String,
    secret: String,
    base_url: String,
    timeout_secs: u64,
}

impl fmt::Debug for PlaidClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaidClient")
            .field("client_id", &self.client_id)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl PlaidClient {
    /// Create a client for one of the hosted Plaid environments
    pub fn new(environment: PlaidEnvironment, client_id: &str, secret: &str) -> Result<Self> {
        Self::new_with_base_url(client_id, secret, &environment.base_url(), DEFAULT_TIMEOUT_SECS)
    }

    /// Create a client against a custom base URL (mock servers, proxies)
    pub fn new_with_base_url(
        client_id: &str,
        secret: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self> {
        if client_id.trim().is_empty() {
            anyhow::bail!("Plaid client id cannot be empty");
        }
        if secret.trim().is_empty() {
            anyhow::bail!("Plaid secret cannot be empty");
        }

        let parsed = Url::parse(base_url).context("Invalid Plaid base URL")?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Plaid base URL must use http or https");
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            client_id: client_id.to_string(),
            secret: secret.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and decode the JSON response
    fn post<B, T>(&self, path: &str, body: &B) -> ProviderResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| ProviderError::transport(format!("Failed to read {} response: {}", path, e)))?;
        debug!(path, status = status.as_u16(), bytes = text.len(), "Plaid response");

        if !status.is_success() {
            return Err(Self::map_error_response(status.as_u16(), &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| ProviderError::transport(format!("Malformed {} response: {}", path, e)))
    }

    /// Decode an error body, falling back to a transport error for anything else
    fn map_error_response(status: u16, body: &str) -> ProviderError {
        match serde_json::from_str::<PlaidApiError>(body) {
            Ok(api_error) => api_error.into(),
            Err(_) => ProviderError::transport(format!("Plaid API error: HTTP {}", status)),
        }
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::transport(format!(
                "Connection timed out after {} seconds: {}",
                self.timeout_secs, error
            ))
        } else if error.is_connect() {
            ProviderError::transport(format!("Unable to connect to Plaid servers: {}", error))
        } else {
            ProviderError::transport(format!("Plaid request failed: {}", error))
        }
    }
}

impl TransactionProvider for PlaidClient {
    fn name(&self) -> &str {
        PLAID_PROVIDER_NAME
    }

    fn get_transactions(&self, query: &TransactionQuery<'_>) -> ProviderResult<TransactionsPage> {
        let request = TransactionsGetRequest {
            client_id: &self.client_id,
            secret: &self.secret,
            access_token: query.access_token.as_str(),
            start_date: query.start_date.format("%Y-%m-%d").to_string(),
            end_date: query.end_date.format("%Y-%m-%d").to_string(),
            options: query.offset.map(|offset| TransactionsGetOptions { offset }),
        };

        self.post("/transactions/get", &request)
    }
}

impl ItemProvider for PlaidClient {
    fn name(&self) -> &str {
        PLAID_PROVIDER_NAME
    }

    fn exchange_public_token(&self, public_token: &str) -> ProviderResult<TokenExchange> {
        let request = PublicTokenExchangeRequest {
            client_id: &self.client_id,
            secret: &self.secret,
            public_token,
        };

        self.post("/item/public_token/exchange", &request)
    }

    fn remove_item(&self, access_token: &AccessToken) -> ProviderResult<ItemRemoval> {
        let request = ItemRemoveRequest {
            client_id: &self.client_id,
            secret: &self.secret,
            access_token: access_token.as_str(),
        };

        self.post("/item/remove", &request)
    }
}

// =============================================================================
// Tests
// =============================================================================
