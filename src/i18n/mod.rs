//! Languages supported by the translator and per-run translation metrics.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their DeepL codes
//! - `language`: Type-safe Language type validated against the registry
//! - `metrics`: Cache and API counters for one run
//!
//! # Example
//!
//! ```rust,ignore
//! use plugin_translations::i18n::Language;
//!
//! let english = Language::from_code("en-US")?;
//! assert_eq!(english.deepl_code(), "EN-US");
//! ```

mod language;
mod metrics;
mod registry;

pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
