//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod errors;
mod fetcher;
pub mod recurring;
mod transactions;

pub use errors::translate;
pub use fetcher::PaginatedFetcher;
pub use recurring::{RecurringClassifier, RecurringRules};
pub use transactions::{TransactionService, DEFAULT_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS};
