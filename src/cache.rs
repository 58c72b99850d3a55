//! Previously stored translations, keyed by source text.
//!
//! Translation files are shaped `{ groupKey: { text: translation } }`. The
//! group key only structures the output, so the cache flattens it away: the
//! same text translated in two files is one cache entry.

use crate::i18n::Language;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{error, info, warn};

/// How entries read from disk combine with what the cache already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Every entry read replaces the current one
    Overwrite,
    /// Entries only fill (text, language) cells that have no non-empty value
    FillGaps,
}

#[derive(Debug, Default, Clone)]
pub struct TranslationCache {
    entries: HashMap<String, BTreeMap<Language, String>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `<dir>/<lang>.json` for every language, replacing existing cells.
    ///
    /// Returns the number of translations read. Missing or malformed files
    /// are logged and skipped.
    pub fn load(&mut self, dir: &Path, languages: &[Language]) -> usize {
        self.load_with(dir, languages, MergePolicy::Overwrite)
    }

    /// Same as [`load`](Self::load) but never replaces a non-empty cell.
    pub fn load_fallback(&mut self, dir: &Path, languages: &[Language]) -> usize {
        self.load_with(dir, languages, MergePolicy::FillGaps)
    }

    pub fn load_with(&mut self, dir: &Path, languages: &[Language], policy: MergePolicy) -> usize {
        let mut count = 0;
        for &language in languages {
            let file = dir.join(format!("{}.json", language.code()));
            if !file.is_file() {
                info!("file {} not found, skipping", file.display());
                continue;
            }

            match read_translation_file(&file) {
                Ok(document) => {
                    count += self.merge_document(language, document, policy, &file);
                }
                Err(e) => {
                    error!("Error while reading {}: {:#}", file.display(), e);
                }
            }
        }
        count
    }

    fn merge_document(
        &mut self,
        language: Language,
        document: Map<String, Value>,
        policy: MergePolicy,
        file: &Path,
    ) -> usize {
        let mut count = 0;
        for (group, prompts) in document {
            let Value::Object(prompts) = prompts else {
                warn!("{}: group '{}' is not an object, skipping", file.display(), group);
                continue;
            };

            for (text, translation) in prompts {
                let Value::String(translation) = translation else {
                    warn!(
                        "{}: translation of '{}' in '{}' is not a string, skipping",
                        file.display(),
                        text,
                        group
                    );
                    continue;
                };

                if policy == MergePolicy::FillGaps && self.has_translation(&text, language) {
                    continue;
                }
                self.add(language, text, translation);
                count += 1;
            }
        }
        count
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    /// All stored translations of `text`, empty if none.
    pub fn get(&self, text: &str) -> BTreeMap<Language, String> {
        self.entries.get(text).cloned().unwrap_or_default()
    }

    /// Whether a non-empty translation of `text` exists for `language`.
    pub fn has_translation(&self, text: &str, language: Language) -> bool {
        self.entries
            .get(text)
            .and_then(|translations| translations.get(&language))
            .is_some_and(|translation| !translation.is_empty())
    }

    pub fn add(&mut self, language: Language, text: impl Into<String>, translation: impl Into<String>) {
        self.entries
            .entry(text.into())
            .or_default()
            .insert(language, translation.into());
    }

    /// Number of distinct texts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn read_translation_file(file: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let document = serde_json::from_str(&content).context("Invalid translation JSON")?;
    Ok(document)
}
