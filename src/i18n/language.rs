//! Language type: validated language representation.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use std::fmt;

/// A validated language.
///
/// Only codes present in the registry can be turned into a `Language`, so
/// holders never need to re-check support. Ordering follows the code string,
/// which is what the metadata descriptor's sorted `language` list expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Language {
    code: &'static str,
}

impl Language {
    /// French, the language the shared core dictionary is authored in.
    pub const FR_FR: Language = Language { code: "fr-FR" };

    pub const EN_US: Language = Language { code: "en-US" };

    pub const ES_ES: Language = Language { code: "es-ES" };

    pub const DE_DE: Language = Language { code: "de-DE" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is registered
    /// * `Err` if the code is unknown
    pub fn from_code(code: &str) -> Result<Language> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) => Ok(Language { code: config.code }),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The only source language for which the core dictionary can be used.
    pub fn core_dictionary() -> Language {
        Self::FR_FR
    }

    /// Get the plugin-side language code (e.g., "fr-FR").
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is not in the registry, which cannot happen for a
    /// `Language` built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Code expected by the DeepL translate endpoint.
    pub fn deepl_code(&self) -> &'static str {
        self.config().deepl_code
    }

    /// Code expected by the DeepL glossary endpoints.
    pub fn glossary_code(&self) -> &'static str {
        self.config().glossary_code
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}
