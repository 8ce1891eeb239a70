//! Locale dictionary store.
//!
//! Loads one JSON bundle per supported locale at startup. A missing or
//! malformed bundle is a startup failure, so a serving gateway always has
//! full locale coverage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Dictionary loading errors.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Failed to read dictionary for '{locale}' at {path}: {source}")]
    Read {
        locale: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse dictionary for '{locale}': {source}")]
    Parse {
        locale: String,
        source: serde_json::Error,
    },

    #[error("Dictionary for '{locale}' is not a JSON object")]
    NotAnObject { locale: String },
}

/// In-memory map of locale tag to translation bundle.
#[derive(Debug, Clone)]
pub struct DictionaryStore {
    bundles: HashMap<String, Value>,
}

impl DictionaryStore {
    /// Load `<dir>/<tag>.json` for every supported tag.
    ///
    /// # Errors
    /// Fails on the first missing file, parse failure, or non-object bundle.
    pub fn load(dir: &Path, locales: &[String]) -> Result<Self, DictionaryError> {
        let mut bundles = HashMap::with_capacity(locales.len());
        for locale in locales {
            let path = dir.join(format!("{locale}.json"));
            let raw = std::fs::read_to_string(&path).map_err(|source| DictionaryError::Read {
                locale: locale.clone(),
                path: path.clone(),
                source,
            })?;
            let bundle: Value =
                serde_json::from_str(&raw).map_err(|source| DictionaryError::Parse {
                    locale: locale.clone(),
                    source,
                })?;
            if !bundle.is_object() {
                return Err(DictionaryError::NotAnObject {
                    locale: locale.clone(),
                });
            }
            bundles.insert(locale.clone(), bundle);
        }
        Ok(Self { bundles })
    }

    /// Bundle for the given locale tag.
    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&Value> {
        self.bundles.get(locale)
    }

    /// Whether a bundle is loaded for the given tag.
    #[must_use]
    pub fn contains(&self, locale: &str) -> bool {
        self.bundles.contains_key(locale)
    }

    /// Number of loaded bundles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
