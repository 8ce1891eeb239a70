//! Configuration with validation at startup.

use std::path::PathBuf;

use clap::Parser;

use crate::locale::{LocaleConfig, LocaleConfigError};

/// Locale gateway configuration.
///
/// All values can be set via environment variables or CLI arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "locale-gateway",
    about = "Locale negotiation gateway for a multilingual static site"
)]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "HTTP_ADDRESS", default_value = "0.0.0.0:8080")]
    pub http_address: String,

    /// Supported locale tags in priority order (comma-separated)
    #[arg(long, env = "SUPPORTED_LOCALES", default_value = "fr,nl,en")]
    pub supported_locales: String,

    /// Default locale when no preference can be determined
    #[arg(long, env = "DEFAULT_LOCALE", default_value = "fr")]
    pub default_locale: String,

    /// Name of the cookie carrying a previously chosen locale
    #[arg(long, env = "LOCALE_COOKIE", default_value = "NEXT_LOCALE")]
    pub locale_cookie: String,

    /// Directory holding one <locale>.json dictionary per supported locale
    #[arg(long, env = "DICTIONARIES_DIR", default_value = "dictionaries")]
    pub dictionaries_dir: PathBuf,

    /// Directory holding the static site export
    #[arg(long, env = "SITE_DIR", default_value = "site")]
    pub site_dir: PathBuf,

    /// CORS allowed origins (comma-separated, or "*" for any)
    #[arg(long, env = "CORS_ALLOW_ORIGINS")]
    pub cors_allow_origins: Option<String>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO")]
    pub log_level: String,

    /// Use JSON log format
    #[arg(long, env = "JSON_LOGS", default_value = "true")]
    pub json_logs: bool,
}

impl Config {
    /// Parse and validate configuration.
    pub fn init() -> anyhow::Result<Self> {
        let config = Self::parse();
        config.locale_config()?;
        Ok(config)
    }

    /// Supported locale tags parsed from the comma-separated list.
    #[must_use]
    pub fn locale_tags(&self) -> Vec<String> {
        self.supported_locales
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Build the validated locale configuration.
    ///
    /// # Errors
    /// Fails when the locale list, default locale, or cookie name violate
    /// the [`LocaleConfig`] invariants.
    pub fn locale_config(&self) -> Result<LocaleConfig, LocaleConfigError> {
        LocaleConfig::new(
            self.locale_tags(),
            self.default_locale.trim(),
            self.locale_cookie.trim(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            http_address: "0.0.0.0:8080".to_string(),
            supported_locales: "fr,nl,en".to_string(),
            default_locale: "fr".to_string(),
            locale_cookie: "NEXT_LOCALE".to_string(),
            dictionaries_dir: PathBuf::from("dictionaries"),
            site_dir: PathBuf::from("site"),
            cors_allow_origins: None,
            log_level: "INFO".to_string(),
            json_logs: false,
        }
    }

    #[test]
    fn valid_config_builds_locale_config() {
        let locales = test_config().locale_config().expect("valid");
        assert_eq!(locales.locales(), ["fr", "nl", "en"]);
        assert_eq!(locales.default_locale(), "fr");
        assert_eq!(locales.cookie_name(), "NEXT_LOCALE");
    }

    #[test]
    fn locale_tags_trim_whitespace_and_drop_empty_segments() {
        let mut config = test_config();
        config.supported_locales = " fr , nl ,,en, ".to_string();
        assert_eq!(config.locale_tags(), ["fr", "nl", "en"]);
    }

    #[test]
    fn default_outside_list_fails() {
        let mut config = test_config();
        config.default_locale = "de".to_string();
        assert!(config.locale_config().is_err());
    }

    #[test]
    fn empty_locale_list_fails() {
        let mut config = test_config();
        config.supported_locales = " , ".to_string();
        assert!(config.locale_config().is_err());
    }
}
