//! Provider error translation
//!
//! Every provider failure is normalized here before leaving the service layer.

use crate::domain::DomainError;
use crate::ports::ProviderError;

/// Translate a provider failure into the stable `DomainError` shape
///
/// API errors keep their code verbatim. Everything else has no code but still
/// names the provider and carries the original message.
pub fn translate(provider: &str, failure: ProviderError) -> DomainError {
    match failure {
        ProviderError::Api {
            error_code,
            error_message,
            ..
        } => DomainError::api(error_code, received_from(provider, &error_message)),
        ProviderError::Transport(message) => {
            DomainError::transport(received_from(provider, &message))
        }
    }
}

fn received_from(provider: &str, message: &str) -> String {
    format!("Received error from {}: {}", provider, message)
}
