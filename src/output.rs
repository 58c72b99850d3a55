//! Serialization of the files the consuming system reads.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::collections::BTreeMap;

/// `{ groupKey: { text: translation } }`, sorted at both levels.
pub type TranslationDocument = BTreeMap<String, BTreeMap<String, String>>;

fn to_pretty_json<T: Serialize>(value: &T, indent: &[u8]) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent));
    value
        .serialize(&mut serializer)
        .context("Failed to serialize JSON")?;
    String::from_utf8(buffer).context("Serialized JSON is not UTF-8")
}

/// Render a translation file: 4-space indentation and `/` escaped as `\/`.
///
/// The consuming system expects the escaped slashes even though JSON does
/// not require them.
pub fn render_translation_document(document: &TranslationDocument) -> Result<String> {
    Ok(to_pretty_json(document, b"    ")?.replace('/', "\\/"))
}

/// Render the metadata descriptor, tab-indented, non-ASCII kept as is.
pub fn render_info_json(content: &serde_json::Map<String, serde_json::Value>) -> Result<String> {
    to_pretty_json(content, b"\t")
}
