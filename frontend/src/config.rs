use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::format::DEFAULT_CURRENCY;

const SETTINGS_KEY: &str = "smartspend.settings";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Where the dashboard balance comes from. Only one source is ever used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceSource {
    /// deposits minus expenses, computed from the transaction listing
    Computed,
    /// the `balance` field of the transaction listing, used verbatim
    Server,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    pub currency_code: String,
    pub balance_source: BalanceSource,
    pub show_balance_trend: bool,
    pub identity_api_key: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: option_env!("SMARTSPEND_API_BASE_URL")
                .unwrap_or(DEFAULT_API_BASE_URL)
                .to_string(),
            currency_code: option_env!("SMARTSPEND_CURRENCY")
                .unwrap_or(DEFAULT_CURRENCY)
                .to_string(),
            balance_source: BalanceSource::Computed,
            show_balance_trend: true,
            identity_api_key: option_env!("SMARTSPEND_FIREBASE_API_KEY")
                .unwrap_or_default()
                .to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Partial settings as stored in local storage; anything missing keeps the default.
#[derive(Debug, Default, Deserialize)]
struct SettingsOverride {
    api_base_url: Option<String>,
    currency_code: Option<String>,
    balance_source: Option<BalanceSource>,
    show_balance_trend: Option<bool>,
    identity_api_key: Option<String>,
    log_level: Option<String>,
}

impl AppConfig {
    pub fn load() -> Self {
        let config = Self::default();
        let raw = web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .and_then(|storage| storage.get_item(SETTINGS_KEY).ok().flatten());

        match raw {
            Some(raw) => config.merged_with(&raw),
            None => config,
        }
    }

    /// Applies a JSON settings override. Unparseable input leaves `self` untouched.
    pub fn merged_with(mut self, raw: &str) -> Self {
        let overrides = match serde_json::from_str::<SettingsOverride>(raw) {
            Ok(overrides) => overrides,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable stored settings");
                return self;
            }
        };

        if let Some(url) = overrides.api_base_url {
            self.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(code) = overrides.currency_code.filter(|code| !code.trim().is_empty()) {
            self.currency_code = code.trim().to_uppercase();
        }
        if let Some(source) = overrides.balance_source {
            self.balance_source = source;
        }
        if let Some(show) = overrides.show_balance_trend {
            self.show_balance_trend = show;
        }
        if let Some(key) = overrides.identity_api_key {
            self.identity_api_key = key;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        self
    }
}
