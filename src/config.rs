//! Layered settings: defaults, optional config file, then environment

use crate::error::{MarketError, Result};
use crate::negotiation::ThreadSettings;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Environment variable prefix, e.g. `LOOP_MARKET__CURRENCY_SYMBOL`
pub const ENV_PREFIX: &str = "LOOP_MARKET";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            max_message_chars: default_max_message_chars(),
            log_filter: default_log_filter(),
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

impl Settings {
    /// Load from `loop-market.*` in the working directory (if any) or `path`,
    /// with environment overrides on top
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("loop-market").required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.currency_symbol.trim().is_empty() {
            return Err(MarketError::Configuration(
                "currency_symbol must not be empty".to_string(),
            ));
        }
        if self.max_message_chars == 0 {
            return Err(MarketError::Configuration(
                "max_message_chars must be at least 1".to_string(),
            ));
        }
        if self.max_line_bytes == 0 {
            return Err(MarketError::Configuration(
                "max_line_bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn thread_settings(&self) -> ThreadSettings {
        ThreadSettings {
            currency_symbol: self.currency_symbol.clone(),
            max_message_chars: self.max_message_chars,
        }
    }
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_max_message_chars() -> usize {
    1000
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_max_line_bytes() -> usize {
    8192
}
