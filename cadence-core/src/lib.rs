//! Cadence Core - transaction history with recurring charge detection
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Transaction, AccessToken, DomainError)
//! - **ports**: Trait definitions for external dependencies (TransactionProvider, ItemProvider)
//! - **services**: Paginated fetch, recurring classification, orchestration
//! - **adapters**: Concrete implementations (Plaid HTTP client)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use config::Config;
use services::{RecurringClassifier, TransactionService};

// Re-export commonly used types at crate root
pub use domain::{AccessToken, DomainError, ErrorResponse, Transaction};
pub use domain::result::Error;

/// Main context for Cadence operations
///
/// Built once at startup. Holds the configuration and the service wired to the
/// Plaid client; nothing is initialized lazily.
pub struct CadenceContext {
    pub config: Config,
    pub transaction_service: TransactionService,
}

impl CadenceContext {
    /// Create a new Cadence context from the settings in `cadence_dir`
    pub fn new(cadence_dir: &Path) -> Result<Self> {
        let config = Config::load(cadence_dir)?;
        Self::from_config(config)
    }

    /// Create a context from an already resolved configuration
    pub fn from_config(config: Config) -> Result<Self> {
        let plaid = Arc::new(config.plaid_client()?);

        let transaction_service = TransactionService::new(
            plaid.clone(),
            plaid,
            RecurringClassifier::new(config.recurring),
        )
        .with_lookback_days(config.lookback_days);

        Ok(Self {
            config,
            transaction_service,
        })
    }
}
