//! Keeping remote glossaries in sync with the local term lists.
//!
//! A term list `<source>_glossary.json` maps each target language to its
//! `term -> translation` pairs. Remote glossaries are named after the SHA-256
//! of the term list file, so a glossary whose name differs from the current
//! hash is stale. Synchronization is split into a pure [`plan`] comparing the
//! desired glossaries with the observed ones, and [`apply`] executing it.

use crate::deepl::TranslationProvider;
use crate::i18n::Language;
use anyhow::{Context, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A glossary as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GlossaryInfo {
    pub glossary_id: String,
    pub name: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// The parsed local term list for one source language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermList {
    pub hash: String,
    pub entries: BTreeMap<Language, BTreeMap<String, String>>,
}

impl TermList {
    /// Parse a term list, ignoring languages that are not supported.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, String>> =
            serde_json::from_str(content).context("Invalid glossary JSON")?;

        let mut entries = BTreeMap::new();
        for (code, terms) in raw {
            match Language::from_code(&code) {
                Ok(language) => {
                    entries.insert(language, terms);
                }
                Err(_) => warn!("Glossary entries for unknown language '{}' ignored", code),
            }
        }

        Ok(Self {
            hash: content_hash(content),
            entries,
        })
    }

    /// Read the term list if the file exists.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).map(Some)
    }
}

/// Location of the term list for `source` inside `dir`.
pub fn term_list_path(dir: &Path, source: Language) -> PathBuf {
    dir.join(format!("{}_glossary.json", source.code()))
}

/// Hex SHA-256 of the term list text, used as the remote glossary name.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// A glossary that should exist remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredGlossary {
    pub source: Language,
    pub target: Language,
    pub name: String,
    pub entries: BTreeMap<String, String>,
}

impl DesiredGlossary {
    fn matches(&self, glossary: &GlossaryInfo) -> bool {
        glossary
            .source_lang
            .eq_ignore_ascii_case(self.source.glossary_code())
            && glossary
                .target_lang
                .eq_ignore_ascii_case(self.target.glossary_code())
    }
}

/// One glossary per target language that has terms, never for the source.
pub fn desired_glossaries(
    terms: &TermList,
    source: Language,
    targets: &[Language],
) -> Vec<DesiredGlossary> {
    targets
        .iter()
        .filter(|&&target| target != source)
        .filter_map(|&target| {
            let entries = terms.entries.get(&target)?;
            if entries.is_empty() {
                return None;
            }
            Some(DesiredGlossary {
                source,
                target,
                name: terms.hash.clone(),
                entries: entries.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlossaryAction {
    /// An up-to-date glossary already exists
    Reuse {
        targets: Vec<Language>,
        glossary_id: String,
    },
    /// A stale or duplicate glossary must go
    Delete { glossary_id: String, name: String },
    /// No usable glossary exists for the language pair
    Create {
        targets: Vec<Language>,
        glossary: DesiredGlossary,
    },
}

/// Compute the actions turning `observed` into `desired`.
///
/// Target languages sharing a provider glossary pair (regional variants) are
/// handled together; the first one's entries are used. For each pair, stale
/// glossaries are deleted before anything is reused or created.
pub fn plan(desired: &[DesiredGlossary], observed: &[GlossaryInfo]) -> Vec<GlossaryAction> {
    // Group by provider language pair, keeping input order
    let mut groups: Vec<(&DesiredGlossary, Vec<Language>)> = Vec::new();
    for glossary in desired {
        let pair = (glossary.source.glossary_code(), glossary.target.glossary_code());
        match groups.iter_mut().find(|(first, _)| {
            (first.source.glossary_code(), first.target.glossary_code()) == pair
        }) {
            Some((_, targets)) => targets.push(glossary.target),
            None => groups.push((glossary, vec![glossary.target])),
        }
    }

    let mut actions = Vec::new();
    let mut deleted = HashSet::new();
    for (glossary, targets) in groups {
        let matching: Vec<&GlossaryInfo> =
            observed.iter().filter(|g| glossary.matches(g)).collect();
        let reused = matching.iter().find(|g| g.name == glossary.name).copied();

        for candidate in &matching {
            let is_reused = reused.is_some_and(|r| r.glossary_id == candidate.glossary_id);
            if !is_reused && deleted.insert(candidate.glossary_id.clone()) {
                actions.push(GlossaryAction::Delete {
                    glossary_id: candidate.glossary_id.clone(),
                    name: candidate.name.clone(),
                });
            }
        }

        actions.push(match reused {
            Some(existing) => GlossaryAction::Reuse {
                targets,
                glossary_id: existing.glossary_id.clone(),
            },
            None => GlossaryAction::Create {
                targets,
                glossary: glossary.clone(),
            },
        });
    }
    actions
}

/// Execute `actions`, returning the glossary id to use per target language.
///
/// A failing action is logged and skipped; affected languages translate
/// without a glossary.
pub async fn apply(
    provider: &dyn TranslationProvider,
    actions: Vec<GlossaryAction>,
) -> HashMap<Language, String> {
    let mut ids = HashMap::new();
    for action in actions {
        match action {
            GlossaryAction::Reuse {
                targets,
                glossary_id,
            } => {
                info!("Glossary {} already exists", glossary_id);
                for target in targets {
                    ids.insert(target, glossary_id.clone());
                }
            }
            GlossaryAction::Delete { glossary_id, name } => {
                info!("Delete existing old glossary {}", name);
                if let Err(e) = provider.delete_glossary(&glossary_id).await {
                    warn!("Failed to delete glossary {}: {:#}", glossary_id, e);
                }
            }
            GlossaryAction::Create { targets, glossary } => {
                info!(
                    "Create new glossary {} ({} => {})",
                    glossary.name, glossary.source, glossary.target
                );
                match provider
                    .create_glossary(
                        &glossary.name,
                        glossary.source,
                        glossary.target,
                        &glossary.entries,
                    )
                    .await
                {
                    Ok(created) => {
                        for target in targets {
                            ids.insert(target, created.glossary_id.clone());
                        }
                    }
                    Err(e) => warn!("Failed to create glossary {}: {:#}", glossary.name, e),
                }
            }
        }
    }
    ids
}

/// Load the term list of `source` from `dir` and reconcile the remote side.
pub async fn synchronize(
    provider: &dyn TranslationProvider,
    dir: &Path,
    source: Language,
    targets: &[Language],
) -> HashMap<Language, String> {
    let path = term_list_path(dir, source);
    let terms = match TermList::load(&path) {
        Ok(Some(terms)) => terms,
        Ok(None) => return HashMap::new(),
        Err(e) => {
            warn!("Ignoring glossary {}: {:#}", path.display(), e);
            return HashMap::new();
        }
    };

    let desired = desired_glossaries(&terms, source, targets);
    if desired.is_empty() {
        return HashMap::new();
    }
    for glossary in &desired {
        info!("Check glossary {} => {}", glossary.source, glossary.target);
    }

    let observed = match provider.list_glossaries().await {
        Ok(observed) => observed,
        Err(e) => {
            warn!("Failed to list glossaries, continuing without: {:#}", e);
            return HashMap::new();
        }
    };

    apply(provider, plan(&desired, &observed)).await
}
