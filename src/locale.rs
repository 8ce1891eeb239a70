//! Locale negotiation for inbound request paths.
//!
//! The resolver is a pure classify-and-branch over the request path, the
//! locale cookie and the `Accept-Language` header. It performs no I/O and
//! holds no mutable state; one [`LocaleConfig`] is built at startup and
//! shared across all requests.

use thiserror::Error;

/// Path prefixes that bypass locale handling entirely.
///
/// Checked in order: build internals, the API surface, static images.
const EXCLUDED_PREFIXES: &[&str] = &["/_next", "/api", "/images"];

/// Outcome of resolving a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Path is excluded or already locale-prefixed; serve unchanged.
    Continue,
    /// Redirect to the locale-prefixed form of the path.
    Redirect(String),
}

/// Validation errors for [`LocaleConfig`].
#[derive(Debug, Error)]
pub enum LocaleConfigError {
    #[error("Supported locale list must not be empty")]
    EmptyLocales,
    #[error("Locale tag must not be empty")]
    EmptyTag,
    #[error("Duplicate locale tag: {0}")]
    DuplicateTag(String),
    #[error("Default locale '{0}' is not in the supported set")]
    DefaultNotSupported(String),
    #[error("Locale cookie name must not be empty")]
    EmptyCookieName,
}

/// Immutable locale configuration: the supported tags in priority order, the
/// default tag, and the name of the cookie carrying a previously chosen
/// locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    locales: Vec<String>,
    default_locale: String,
    cookie_name: String,
}

impl LocaleConfig {
    /// Build a validated configuration.
    ///
    /// # Errors
    /// Fails when the list is empty, contains an empty or duplicate tag,
    /// the default is not a member, or the cookie name is empty.
    pub fn new(
        locales: Vec<String>,
        default_locale: impl Into<String>,
        cookie_name: impl Into<String>,
    ) -> Result<Self, LocaleConfigError> {
        if locales.is_empty() {
            return Err(LocaleConfigError::EmptyLocales);
        }
        for (i, tag) in locales.iter().enumerate() {
            if tag.is_empty() {
                return Err(LocaleConfigError::EmptyTag);
            }
            if locales[..i].contains(tag) {
                return Err(LocaleConfigError::DuplicateTag(tag.clone()));
            }
        }
        let default_locale = default_locale.into();
        if !locales.contains(&default_locale) {
            return Err(LocaleConfigError::DefaultNotSupported(default_locale));
        }
        let cookie_name = cookie_name.into();
        if cookie_name.is_empty() {
            return Err(LocaleConfigError::EmptyCookieName);
        }
        Ok(Self {
            locales,
            default_locale,
            cookie_name,
        })
    }

    /// Supported tags in priority order.
    #[must_use]
    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    /// The locale used when no preference can be determined.
    #[must_use]
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Name of the locale cookie.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Whether `tag` is a member of the supported set.
    #[must_use]
    pub fn is_supported(&self, tag: &str) -> bool {
        self.locales.iter().any(|l| l == tag)
    }

    /// The supported tag the path is prefixed with, if any.
    ///
    /// Matches `/<tag>` exactly or `/<tag>/...`; `/frites` is not a `fr`
    /// prefix.
    #[must_use]
    pub fn locale_prefix(&self, path: &str) -> Option<&str> {
        self.locales.iter().map(String::as_str).find(|tag| {
            path.strip_prefix('/')
                .and_then(|rest| rest.strip_prefix(tag))
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    /// Resolve a request path against the locale configuration.
    ///
    /// Excluded and already-prefixed paths pass through unchanged. Otherwise
    /// the locale comes from the cookie when it names a supported tag, else
    /// from the first supported tag found in the `Accept-Language` value,
    /// else the default. Missing or malformed inputs express no preference;
    /// there are no error outcomes.
    #[must_use]
    pub fn resolve(
        &self,
        path: &str,
        cookie: Option<&str>,
        accept_language: Option<&str>,
    ) -> Resolution {
        if is_excluded(path) {
            return Resolution::Continue;
        }
        if self.locale_prefix(path).is_some() {
            return Resolution::Continue;
        }

        let locale = cookie
            .filter(|value| self.is_supported(value))
            .or_else(|| accept_language.and_then(|header| self.accept_language_match(header)))
            .unwrap_or(self.default_locale());

        Resolution::Redirect(format!("/{locale}{path}"))
    }

    /// First supported tag (declared order) contained in the header value.
    ///
    /// Substring matching: `en` matches `en-US,en;q=0.9`. Loose on purpose;
    /// a tag that is a substring of another supported tag shadows it.
    fn accept_language_match(&self, header: &str) -> Option<&str> {
        self.locales
            .iter()
            .map(String::as_str)
            .find(|&tag| header.contains(tag))
    }
}

/// Whether the path is excluded from locale handling.
///
/// A `.` anywhere in the path is treated as a static file reference
/// (`favicon.ico` and friends).
fn is_excluded(path: &str) -> bool {
    EXCLUDED_PREFIXES.iter().any(|p| path.starts_with(p)) || path.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LocaleConfig {
        LocaleConfig::new(
            vec!["fr".to_string(), "nl".to_string(), "en".to_string()],
            "fr",
            "NEXT_LOCALE",
        )
        .expect("valid config")
    }

    #[test]
    fn excluded_paths_pass_through_regardless_of_preferences() {
        let config = config();
        assert_eq!(
            config.resolve("/favicon.ico", Some("nl"), Some("en-US,en;q=0.9")),
            Resolution::Continue
        );
        assert_eq!(
            config.resolve("/_next/static/chunks/main.js", Some("nl"), None),
            Resolution::Continue
        );
        assert_eq!(config.resolve("/api/contact", None, None), Resolution::Continue);
        assert_eq!(
            config.resolve("/images/hero.webp", None, Some("nl")),
            Resolution::Continue
        );
    }

    #[test]
    fn locale_prefixed_paths_pass_through() {
        let config = config();
        for path in ["/fr", "/fr/", "/fr/anything", "/en/services", "/nl"] {
            assert_eq!(config.resolve(path, None, None), Resolution::Continue, "{path}");
        }
    }

    #[test]
    fn similar_prefix_is_not_a_locale() {
        let config = config();
        assert_eq!(config.locale_prefix("/free-quote"), None);
        assert_eq!(
            config.resolve("/free-quote", None, None),
            Resolution::Redirect("/fr/free-quote".to_string())
        );
    }

    #[test]
    fn valid_cookie_wins_over_header() {
        let config = config();
        assert_eq!(
            config.resolve("/contact", Some("nl"), Some("en-US,en;q=0.9")),
            Resolution::Redirect("/nl/contact".to_string())
        );
    }

    #[test]
    fn invalid_cookie_falls_through_to_header() {
        let config = config();
        assert_eq!(
            config.resolve("/contact", Some("de"), Some("en-US,en;q=0.9")),
            Resolution::Redirect("/en/contact".to_string())
        );
    }

    #[test]
    fn header_scan_uses_declared_order() {
        let config = config();
        // Both nl and en appear; nl is declared earlier.
        assert_eq!(
            config.resolve("/", None, Some("en;q=0.9,nl;q=0.8")),
            Resolution::Redirect("/nl/".to_string())
        );
    }

    #[test]
    fn default_locale_when_no_preference() {
        let config = config();
        assert_eq!(
            config.resolve("/contact", None, None),
            Resolution::Redirect("/fr/contact".to_string())
        );
        assert_eq!(
            config.resolve("/contact", None, Some("de-DE,de;q=0.9")),
            Resolution::Redirect("/fr/contact".to_string())
        );
    }

    #[test]
    fn redirect_target_resolves_to_continue() {
        let config = config();
        for path in ["/", "/contact", "/services/web"] {
            let Resolution::Redirect(to) = config.resolve(path, None, Some("nl")) else {
                panic!("expected redirect for {path}");
            };
            assert_eq!(config.resolve(&to, None, Some("nl")), Resolution::Continue);
        }
    }

    #[test]
    fn substring_match_prefers_declared_order_over_specificity() {
        // A tag that is a substring of another supported tag shadows it.
        let config = LocaleConfig::new(
            vec!["en".to_string(), "en-GB".to_string()],
            "en",
            "NEXT_LOCALE",
        )
        .expect("valid config");
        assert_eq!(
            config.resolve("/pricing", None, Some("en-GB,en;q=0.5")),
            Resolution::Redirect("/en/pricing".to_string())
        );
    }

    #[test]
    fn empty_locale_list_rejected() {
        assert!(matches!(
            LocaleConfig::new(vec![], "fr", "NEXT_LOCALE"),
            Err(LocaleConfigError::EmptyLocales)
        ));
    }

    #[test]
    fn duplicate_tag_rejected() {
        assert!(matches!(
            LocaleConfig::new(
                vec!["fr".to_string(), "nl".to_string(), "fr".to_string()],
                "fr",
                "NEXT_LOCALE",
            ),
            Err(LocaleConfigError::DuplicateTag(tag)) if tag == "fr"
        ));
    }

    #[test]
    fn default_must_be_supported() {
        assert!(matches!(
            LocaleConfig::new(vec!["fr".to_string(), "nl".to_string()], "en", "NEXT_LOCALE"),
            Err(LocaleConfigError::DefaultNotSupported(tag)) if tag == "en"
        ));
    }

    #[test]
    fn empty_cookie_name_rejected() {
        assert!(matches!(
            LocaleConfig::new(vec!["fr".to_string()], "fr", ""),
            Err(LocaleConfigError::EmptyCookieName)
        ));
    }
}
