//! The plugin metadata descriptor, `plugin_info/info.json`.
//!
//! Only `id`, `language` and `description` are interpreted; every other field
//! is kept untouched and in its original order.

use crate::i18n::Language;
use crate::output::render_info_json;
use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const INFO_JSON_PATH: &str = "plugin_info/info.json";

#[derive(Debug, Clone)]
pub struct InfoJson {
    path: PathBuf,
    content: Map<String, Value>,
}

impl InfoJson {
    /// Read the descriptor of the plugin rooted at `plugin_root`.
    pub fn read(plugin_root: &Path) -> Result<Self> {
        let path = plugin_root.join(INFO_JSON_PATH);
        if !path.is_file() {
            bail!("Missing info.json file: {}", path.display());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let content = serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;

        Ok(Self { path, content })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Plugin id, `unknown` when absent.
    pub fn id(&self) -> &str {
        self.content
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.content.get(key)
    }

    /// The description as a language → text mapping.
    ///
    /// A plain string description is taken to be written in `source`.
    /// Returns `None` when there is no description or it has another shape.
    pub fn descriptions(&self, source: Language) -> Option<Map<String, Value>> {
        match self.content.get("description")? {
            Value::String(text) => {
                let mut map = Map::new();
                map.insert(source.code().to_string(), Value::String(text.clone()));
                Some(map)
            }
            Value::Object(map) => Some(map.clone()),
            _ => None,
        }
    }

    pub fn set_descriptions(&mut self, descriptions: Map<String, Value>) {
        self.content
            .insert("description".to_string(), Value::Object(descriptions));
    }

    /// Replace the language list with the sorted, deduplicated `languages`.
    pub fn set_languages(&mut self, languages: &[Language]) {
        let mut codes: Vec<&str> = languages.iter().map(Language::code).collect();
        codes.sort_unstable();
        codes.dedup();
        self.content.insert(
            "language".to_string(),
            Value::Array(codes.into_iter().map(|c| Value::String(c.to_string())).collect()),
        );
    }

    pub fn languages(&self) -> Vec<&str> {
        self.content
            .get("language")
            .and_then(Value::as_array)
            .map(|codes| codes.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn write(&self) -> Result<()> {
        let text = render_info_json(&self.content)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}
