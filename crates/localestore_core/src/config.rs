//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe the knobs a host application sets when opening a store.
//! - Parse host-provided JSON into validated values.
//!
//! # Invariants
//! - A parsed `CoreConfig` always carries a valid default locale.
//! - Unknown JSON keys are rejected so typos do not silently fall back.

use crate::locale::Locale;
use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const DEFAULT_LOCALE: &str = "en";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Configuration load errors.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid core config: {err}"),
            Self::InvalidLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::InvalidLogLevel(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Settings for opening a locale-aware store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Locale base rows are written in. Queries resolved to this locale skip
    /// the translation rewrite.
    pub default_locale: Locale,
    /// When `true`, a missing translation hydrates the base value instead of
    /// `NULL`.
    pub translation_fallback: bool,
    /// SQLite busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
    /// Log level handed to `init_logging`.
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_locale: Locale::parse(DEFAULT_LOCALE).expect("built-in default locale is valid"),
            translation_fallback: true,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            log_level: default_log_level().to_string(),
        }
    }
}

impl CoreConfig {
    /// Parses a JSON document; omitted keys take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot express as types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.trim().to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "warning" | "error" => Ok(()),
            _ => Err(ConfigError::InvalidLogLevel(self.log_level.clone())),
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.default_locale.as_str(), "en");
        assert!(config.translation_fallback);
    }

    #[test]
    fn overrides_are_applied() {
        let config = CoreConfig::from_json_str(
            r#"{"default_locale":"fr_FR","translation_fallback":false,"busy_timeout_ms":250}"#,
        )
        .unwrap();
        assert_eq!(config.default_locale.as_str(), "fr_FR");
        assert!(!config.translation_fallback);
        assert_eq!(config.busy_timeout().as_millis(), 250);
    }

    #[test]
    fn rejects_invalid_locale_and_unknown_keys() {
        assert!(matches!(
            CoreConfig::from_json_str(r#"{"default_locale":"not a locale"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            CoreConfig::from_json_str(r#"{"defaultLocale":"fr"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = CoreConfig::from_json_str(r#"{"log_level":"verbose"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(level) if level == "verbose"));
    }
}
