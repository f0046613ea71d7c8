//! Configuration management
//!
//! Settings live in `settings.json` inside the Cadence directory:
//! ```json
//! {
//!   "plaid": { "environment": "sandbox", "clientId": "...", "secret": "...", "timeoutSecs": 30 },
//!   "recurring": { "minGapDays": 25, "maxGapDays": 35 },
//!   "lookbackDays": 90
//! }
//! ```
//! Every key is optional. `PLAID_ENV`, `PLAID_CLIENT_ID`, `PLAID_SECRET` and
//! `PLAID_BASE_URL` override the file.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::plaid::{PlaidClient, PlaidEnvironment, DEFAULT_TIMEOUT_SECS};
use crate::domain::result::Error as CoreError;
use crate::services::{RecurringRules, DEFAULT_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS};

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    plaid: PlaidSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recurring: Option<RecurringRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lookback_days: Option<i64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaidSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    environment: Option<PlaidEnvironment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Cadence configuration (resolved view of settings + environment)
#[derive(Clone)]
pub struct Config {
    pub plaid_environment: PlaidEnvironment,
    pub plaid_client_id: Option<String>,
    pub plaid_secret: Option<String>,
    /// Overrides the environment's host when set
    pub plaid_base_url: Option<String>,
    pub timeout_secs: u64,
    pub recurring: RecurringRules,
    pub lookback_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plaid_environment: PlaidEnvironment::default(),
            plaid_client_id: None,
            plaid_secret: None,
            plaid_base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            recurring: RecurringRules::default(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("plaid_environment", &self.plaid_environment)
            .field("plaid_client_id", &self.plaid_client_id)
            .field("plaid_secret", &self.plaid_secret.as_ref().map(|_| "***"))
            .field("plaid_base_url", &self.plaid_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("recurring", &self.recurring)
            .field("lookback_days", &self.lookback_days)
            .finish()
    }
}

impl Config {
    /// Load config from the Cadence directory, applying environment overrides
    pub fn load(cadence_dir: &Path) -> Result<Self> {
        Self::load_with_env(cadence_dir, |key| std::env::var(key).ok())
    }

    /// Load config with a custom environment lookup
    pub fn load_with_env<F>(cadence_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = read_settings(cadence_dir)?;
        let defaults = Config::default();

        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let plaid_environment = match env("PLAID_ENV") {
            Some(value) => value.parse::<PlaidEnvironment>()?,
            None => raw.plaid.environment.unwrap_or(defaults.plaid_environment),
        };

        let recurring = raw.recurring.unwrap_or(defaults.recurring);
        if recurring.min_gap_days >= recurring.max_gap_days {
            return Err(CoreError::config(format!(
                "recurring.minGapDays ({}) must be less than recurring.maxGapDays ({})",
                recurring.min_gap_days, recurring.max_gap_days
            ))
            .into());
        }

        let lookback_days = raw.lookback_days.unwrap_or(defaults.lookback_days);
        if !(0..=MAX_LOOKBACK_DAYS).contains(&lookback_days) {
            return Err(CoreError::config(format!(
                "lookbackDays must be between 0 and {} (got {})",
                MAX_LOOKBACK_DAYS, lookback_days
            ))
            .into());
        }

        Ok(Self {
            plaid_environment,
            plaid_client_id: env("PLAID_CLIENT_ID").or(raw.plaid.client_id),
            plaid_secret: env("PLAID_SECRET").or(raw.plaid.secret),
            plaid_base_url: env("PLAID_BASE_URL").or(raw.plaid.base_url),
            timeout_secs: raw.plaid.timeout_secs.unwrap_or(defaults.timeout_secs),
            recurring,
            lookback_days,
        })
    }

    /// Save config to the Cadence directory
    /// Preserves other settings that Cadence doesn't manage
    pub fn save(&self, cadence_dir: &Path) -> Result<()> {
        let mut settings = read_settings(cadence_dir)?;

        settings.plaid.environment = Some(self.plaid_environment);
        settings.plaid.client_id = self.plaid_client_id.clone();
        settings.plaid.secret = self.plaid_secret.clone();
        settings.plaid.base_url = self.plaid_base_url.clone();
        settings.plaid.timeout_secs = Some(self.timeout_secs);
        settings.recurring = Some(self.recurring);
        settings.lookback_days = Some(self.lookback_days);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(cadence_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Build the Plaid client described by this config
    pub fn plaid_client(&self) -> Result<PlaidClient> {
        let client_id = self.plaid_client_id.as_deref().ok_or_else(|| {
            CoreError::config("Plaid client id not configured (set PLAID_CLIENT_ID)")
        })?;
        let secret = self
            .plaid_secret
            .as_deref()
            .ok_or_else(|| CoreError::config("Plaid secret not configured (set PLAID_SECRET)"))?;

        let base_url = self
            .plaid_base_url
            .clone()
            .unwrap_or_else(|| self.plaid_environment.base_url());

        PlaidClient::new_with_base_url(client_id, secret, &base_url, self.timeout_secs)
    }
}

fn read_settings(cadence_dir: &Path) -> Result<SettingsFile> {
    let settings_path = cadence_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }

    let content = std::fs::read_to_string(&settings_path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", settings_path.display()))
}
