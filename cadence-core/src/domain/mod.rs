//! Core domain entities
//!
//! Pure data structures with parsing and validation logic - no I/O or external
//! dependencies.

mod credential;
mod transaction;
pub mod result;

pub use credential::{AccessToken, ItemRemoval, TokenExchange};
pub use result::{DomainError, ErrorResponse};
pub use transaction::{Transaction, TransactionsPage, RECURRING_KEY};
