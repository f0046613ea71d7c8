//! Provider credentials

use std::fmt;

use serde::{Deserialize, Serialize};

/// Long-lived access token for a linked item
///
/// Opaque to this crate. `Debug` never prints the token so it cannot leak into logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Result of exchanging a public token from the link flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenExchange {
    pub access_token: AccessToken,
    pub item_id: String,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Result of removing a linked item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRemoval {
    #[serde(default = "default_removed")]
    pub removed: bool,
    #[serde(default)]
    pub request_id: Option<String>,
}

// Newer API versions drop `removed`; a 2xx response means the item is gone.
fn default_removed() -> bool {
    true
}
