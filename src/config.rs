use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RankingError;
use crate::identity::Credentials;
use crate::storage::paths;

/// Client settings. Unspecified fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RankingConfig {
    /// Collection path the records live under.
    pub collection: String,
    /// Silence the diagnostic logger.
    pub disable_log: bool,
    /// Sign in anonymously before reads/queries when no identity is present.
    pub lazy_sign_in: bool,
    /// Window size used by `RankingBuilder::list_data`.
    pub default_top_n: usize,
    /// Credentials for the sign-in performed at connect time.
    pub credentials: Option<Credentials>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            collection: "users".to_string(),
            disable_log: false,
            lazy_sign_in: true,
            default_top_n: 20,
            credentials: None,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl RankingConfig {
    /// Defaults overlaid with `RANKING_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().overlay(|k| std::env::var(k).ok())
    }

    /// Apply overrides from a key lookup (env-style names). Unparsable values are skipped.
    pub fn overlay<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("RANKING_COLLECTION") { self.collection = v; }
        if let Some(v) = lookup("RANKING_DISABLE_LOG") {
            match parse_bool(&v) {
                Some(b) => self.disable_log = b,
                None => warn!(target: "ranking_builder::config", "ignoring RANKING_DISABLE_LOG='{}'", v),
            }
        }
        if let Some(v) = lookup("RANKING_LAZY_SIGN_IN") {
            match parse_bool(&v) {
                Some(b) => self.lazy_sign_in = b,
                None => warn!(target: "ranking_builder::config", "ignoring RANKING_LAZY_SIGN_IN='{}'", v),
            }
        }
        if let Some(v) = lookup("RANKING_TOP_N") {
            match v.trim().parse::<usize>() {
                Ok(n) => self.default_top_n = n,
                Err(_) => warn!(target: "ranking_builder::config", "ignoring RANKING_TOP_N='{}'", v),
            }
        }
        if let (Some(email), Some(password)) = (lookup("RANKING_EMAIL"), lookup("RANKING_PASSWORD")) {
            self.credentials = Some(Credentials::new(email, password));
        }
        self
    }

    /// Load from a JSON file, e.g. `{"collection": "scores", "disableLog": true}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let cfg: RankingConfig = serde_json::from_slice(&bytes)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), RankingError> {
        if !paths::is_valid_path(&self.collection) {
            return Err(RankingError::Config(format!("invalid collection path '{}'", self.collection)));
        }
        if let Some(c) = &self.credentials {
            if c.email_address.trim().is_empty() {
                return Err(RankingError::Config("credentials need an email address".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
