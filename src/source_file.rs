use crate::extract::{extract_prompts, FileKind};
use crate::i18n::Language;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// A translatable text and everything known about its translations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    text: String,
    translations: BTreeMap<Language, String>,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translations: BTreeMap::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn translations(&self) -> &BTreeMap<Language, String> {
        &self.translations
    }

    pub fn translation(&self, language: Language) -> Option<&str> {
        self.translations.get(&language).map(String::as_str)
    }

    /// A translation counts only when it is not empty.
    pub fn has_translation(&self, language: Language) -> bool {
        self.translation(language).is_some_and(|t| !t.is_empty())
    }

    pub fn set_translation(&mut self, language: Language, translation: impl Into<String>) {
        self.translations.insert(language, translation.into());
    }

    /// Copy every given translation onto the prompt.
    pub fn set_translations(&mut self, translations: BTreeMap<Language, String>) {
        self.translations.extend(translations);
    }
}

/// One scanned file and the prompts found in it.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    group_key: String,
    prompts: BTreeMap<String, Prompt>,
}

impl SourceFile {
    /// `group_key` is the key the file's prompts are written under.
    pub fn new(path: impl Into<PathBuf>, group_key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            group_key: group_key.into(),
            prompts: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    /// Read the file and collect its prompts.
    ///
    /// An unreadable file or one of an unsupported type yields no prompts;
    /// the problem is logged and the caller carries on.
    pub fn search_prompts(&mut self) -> usize {
        let Some(kind) = FileKind::from_path(&self.path) else {
            debug!("{} is not a scanned file type", self.path.display());
            return 0;
        };

        match std::fs::read_to_string(&self.path) {
            Ok(content) => self.add_prompts_from(&content, kind),
            Err(e) => {
                warn!("Unable to read {}: {}", self.path.display(), e);
                0
            }
        }
    }

    /// Collect the prompts of already loaded content, returns how many are new.
    pub fn add_prompts_from(&mut self, content: &str, kind: FileKind) -> usize {
        let before = self.prompts.len();
        for text in extract_prompts(content, kind) {
            self.prompts
                .entry(text.clone())
                .or_insert_with(|| Prompt::new(text));
        }
        self.prompts.len() - before
    }

    pub fn prompts(&self) -> impl Iterator<Item = &Prompt> {
        self.prompts.values()
    }

    pub fn prompts_mut(&mut self) -> impl Iterator<Item = &mut Prompt> {
        self.prompts.values_mut()
    }

    pub fn prompt(&self, text: &str) -> Option<&Prompt> {
        self.prompts.get(text)
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// The text → translation pairs to write for `language`.
    ///
    /// Without `include_empty`, prompts lacking a non-empty translation are
    /// left out. With it, every prompt is kept and a missing translation is
    /// written as an empty string.
    pub fn prompts_and_translation(
        &self,
        language: Language,
        include_empty: bool,
    ) -> BTreeMap<String, String> {
        self.prompts
            .values()
            .filter_map(|prompt| {
                let translation = prompt.translation(language).unwrap_or_default();
                if translation.is_empty() && !include_empty {
                    None
                } else {
                    Some((prompt.text().to_string(), translation.to_string()))
                }
            })
            .collect()
    }
}

/// Output group key of a plugin file: `plugins/<pluginId>/<relative path>`.
///
/// Always uses forward slashes, whatever the host platform.
pub fn group_key(plugin_id: &str, relative_path: &Path) -> String {
    let mut key = format!("plugins/{}", plugin_id);
    for component in relative_path.components() {
        if let Component::Normal(part) = component {
            key.push('/');
            key.push_str(&part.to_string_lossy());
        }
    }
    key
}
