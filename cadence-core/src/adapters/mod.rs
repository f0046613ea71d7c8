//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Plaid HTTP client for TransactionProvider and ItemProvider
//! - Mock Plaid server and scripted in-memory provider for testing

pub mod plaid;

#[cfg(test)]
pub mod plaid_mock;
