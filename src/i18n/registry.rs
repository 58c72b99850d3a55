//! Language registry: Single source of truth for all supported languages.
//!
//! Every language a plugin can be translated to is listed here together with
//! the codes the DeepL API expects for it. The registry is built once on first
//! access and never changes afterwards.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Plugin-side language code (e.g., "fr-FR", "en-US")
    pub code: &'static str,

    /// English name of the language (e.g., "French")
    pub name: &'static str,

    /// Code used by the DeepL translate endpoint (e.g., "FR", "EN-US")
    pub deepl_code: &'static str,

    /// Code used by the DeepL glossary endpoints (e.g., "fr", "en")
    ///
    /// Glossaries are keyed by language only, so regional variants share one.
    pub glossary_code: &'static str,
}

/// Global language registry.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All supported plugin-side codes, used in configuration error messages.
    pub fn codes(&self) -> Vec<&'static str> {
        self.languages.iter().map(|lang| lang.code).collect()
    }

}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "fr-FR",
            name: "French",
            deepl_code: "FR",
            glossary_code: "fr",
        },
        LanguageConfig {
            code: "en-US",
            name: "English",
            deepl_code: "EN-US",
            glossary_code: "en",
        },
        LanguageConfig {
            code: "es-ES",
            name: "Spanish",
            deepl_code: "ES",
            glossary_code: "es",
        },
        LanguageConfig {
            code: "de-DE",
            name: "German",
            deepl_code: "DE",
            glossary_code: "de",
        },
        LanguageConfig {
            code: "it-IT",
            name: "Italian",
            deepl_code: "IT",
            glossary_code: "it",
        },
        LanguageConfig {
            code: "pt-PT",
            name: "Portuguese",
            deepl_code: "PT-PT",
            glossary_code: "pt",
        },
        LanguageConfig {
            code: "pt-BR",
            name: "Brazilian Portuguese",
            deepl_code: "PT-BR",
            glossary_code: "pt",
        },
        LanguageConfig {
            code: "ja-JP",
            name: "Japanese",
            deepl_code: "JA",
            glossary_code: "ja",
        },
        LanguageConfig {
            code: "ru-RU",
            name: "Russian",
            deepl_code: "RU",
            glossary_code: "ru",
        },
        LanguageConfig {
            code: "id-ID",
            name: "Indonesian",
            deepl_code: "ID",
            glossary_code: "id",
        },
        LanguageConfig {
            code: "zh-CN",
            name: "Chinese",
            deepl_code: "ZH",
            glossary_code: "zh",
        },
    ]
}
