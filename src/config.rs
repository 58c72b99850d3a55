use crate::i18n::{Language, LanguageRegistry};
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const INPUT_SOURCE_LANGUAGE: &str = "INPUT_SOURCE_LANGUAGE";
pub const INPUT_TARGET_LANGUAGES: &str = "INPUT_TARGET_LANGUAGES";
pub const INPUT_DEEPL_API_KEY: &str = "INPUT_DEEPL_API_KEY";
pub const INPUT_INCLUDE_EMPTY_TRANSLATION: &str = "INPUT_INCLUDE_EMPTY_TRANSLATION";
pub const INPUT_USE_CORE_TRANSLATIONS: &str = "INPUT_USE_CORE_TRANSLATIONS";
pub const INPUT_GENERATE_SOURCE_LANGUAGE_TRANSLATIONS: &str =
    "INPUT_GENERATE_SOURCE_LANGUAGE_TRANSLATIONS";
pub const INPUT_DEBUG: &str = "INPUT_DEBUG";

const TRUE_VALUES: [&str; 3] = ["true", "True", "TRUE"];
const FALSE_VALUES: [&str; 3] = ["false", "False", "FALSE"];

/// Fatal configuration problems. Any of these aborts the run before output.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Input does not meet specifications: {0}. {0} is required")]
    Missing(&'static str),

    #[error(
        "Input does not meet specifications: {name}. Supported boolean inputs: \"true | True | TRUE | false | False | FALSE\", got '{value}'"
    )]
    InvalidBoolean { name: &'static str, value: String },

    #[error("Input does not meet specifications: {name}. '{value}' not in list: {allowed}")]
    UnsupportedLanguage {
        name: &'static str,
        value: String,
        allowed: String,
    },

    #[error("Invalid value for {name}: '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    // Languages
    pub source_language: Language,
    /// Target languages in input order, duplicates removed
    pub target_languages: Vec<Language>,

    // DeepL
    /// Absent key disables every remote call
    pub deepl_api_key: Option<String>,
    /// Overrides the endpoint derived from the key (used by tests)
    pub deepl_api_url: Option<String>,
    /// Minimum spacing between two translate calls
    pub min_call_interval: Duration,

    // Output
    pub include_empty_translation: bool,
    pub use_core_translations: bool,
    pub generate_source_language_translations: bool,
    pub debug: bool,

    // Layout, relative to the working directory
    pub plugin_path: PathBuf,
    pub core_path: PathBuf,
    pub glossary_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from any key/value source.
    ///
    /// Values are trimmed and an empty value counts as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let source_language = language_input(INPUT_SOURCE_LANGUAGE, input(INPUT_SOURCE_LANGUAGE))?;
        let target_languages =
            language_list_input(INPUT_TARGET_LANGUAGES, input(INPUT_TARGET_LANGUAGES))?;
        let deepl_api_key = input(INPUT_DEEPL_API_KEY);
        let include_empty_translation = boolean_input(
            INPUT_INCLUDE_EMPTY_TRANSLATION,
            input(INPUT_INCLUDE_EMPTY_TRANSLATION),
        )?;

        // The core dictionary only exists in French, the flag is not even read otherwise
        let use_core_translations = if source_language == Language::core_dictionary() {
            boolean_input(
                INPUT_USE_CORE_TRANSLATIONS,
                input(INPUT_USE_CORE_TRANSLATIONS),
            )?
        } else {
            false
        };

        let generate_source_language_translations = boolean_input(
            INPUT_GENERATE_SOURCE_LANGUAGE_TRANSLATIONS,
            input(INPUT_GENERATE_SOURCE_LANGUAGE_TRANSLATIONS),
        )?;
        let debug = boolean_input(INPUT_DEBUG, input(INPUT_DEBUG))?;

        let min_call_interval = match input("DEEPL_MIN_INTERVAL_MS") {
            Some(value) => value
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "DEEPL_MIN_INTERVAL_MS",
                    value,
                })?,
            None => Duration::from_millis(100),
        };

        Ok(Self {
            source_language,
            target_languages,
            deepl_api_key,
            deepl_api_url: input("DEEPL_API_URL"),
            min_call_interval,
            include_empty_translation,
            use_core_translations,
            generate_source_language_translations,
            debug,
            plugin_path: input("PLUGIN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("plugin")),
            core_path: input("CORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("jeedom")),
            glossary_dir: input("GLOSSARY_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("glossaries")),
        })
    }

    /// Sorted, deduplicated union of source and target languages.
    pub fn all_languages(&self) -> Vec<Language> {
        let mut languages = self.target_languages.clone();
        languages.push(self.source_language);
        languages.sort();
        languages.dedup();
        languages
    }
}

fn boolean_input(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref() {
        Some(v) if TRUE_VALUES.contains(&v) => Ok(true),
        Some(v) if FALSE_VALUES.contains(&v) => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            name,
            value: value.unwrap_or_default(),
        }),
    }
}

fn language_input(name: &'static str, value: Option<String>) -> Result<Language, ConfigError> {
    let value = value.unwrap_or_default();
    Language::from_code(&value).map_err(|_| unsupported(name, value))
}

fn language_list_input(
    name: &'static str,
    value: Option<String>,
) -> Result<Vec<Language>, ConfigError> {
    let value = value.ok_or(ConfigError::Missing(name))?;

    let mut languages = Vec::new();
    for code in value.split(',').map(str::trim) {
        let language = Language::from_code(code).map_err(|_| unsupported(name, code.to_string()))?;
        if !languages.contains(&language) {
            languages.push(language);
        }
    }
    Ok(languages)
}

fn unsupported(name: &'static str, value: String) -> ConfigError {
    ConfigError::UnsupportedLanguage {
        name,
        value,
        allowed: LanguageRegistry::get().codes().join(", "),
    }
}
