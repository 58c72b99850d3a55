//! The translation run: cache loading, prompt discovery, resolution and output.

use crate::cache::TranslationCache;
use crate::config::Config;
use crate::deepl::{DeepLClient, TranslationProvider};
use crate::extract::{FileKind, INFO_JSON};
use crate::glossary;
use crate::i18n::{Language, TranslationMetrics};
use crate::info_json::InfoJson;
use crate::output::{render_translation_document, TranslationDocument};
use crate::rate_limit::RateLimiter;
use crate::source_file::{group_key, SourceFile};
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Plugin directories scanned for prompts.
pub const PLUGIN_DIRS: [&str; 3] = ["core", "desktop", "plugin_info"];

/// Where translation files live, relative to a plugin or core root.
pub const TRANSLATIONS_DIR: &str = "core/i18n";

/// Remote side of the run: the provider, its pacing and glossaries.
pub struct RemoteTranslator {
    provider: Box<dyn TranslationProvider>,
    limiter: RateLimiter,
    glossary_dir: PathBuf,
    /// `None` until the first call synchronizes them
    glossaries: Option<HashMap<Language, String>>,
}

impl RemoteTranslator {
    pub fn new(
        provider: Box<dyn TranslationProvider>,
        limiter: RateLimiter,
        glossary_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            limiter,
            glossary_dir: glossary_dir.into(),
            glossaries: None,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    async fn glossary_for(
        &mut self,
        source: Language,
        targets: &[Language],
        target: Language,
    ) -> Option<String> {
        if self.glossaries.is_none() {
            let synced = glossary::synchronize(
                self.provider.as_ref(),
                &self.glossary_dir,
                source,
                targets,
            )
            .await;
            self.glossaries = Some(synced);
        }
        self.glossaries
            .as_ref()
            .and_then(|ids| ids.get(&target).cloned())
    }

    /// Translate one text. Failures are logged and yield an empty string.
    pub async fn translate(
        &mut self,
        text: &str,
        source: Language,
        targets: &[Language],
        target: Language,
        metrics: &mut TranslationMetrics,
    ) -> String {
        let glossary_id = self.glossary_for(source, targets, target).await;

        debug!("call {} to translate {:?} in {}", self.provider_name(), text, target);
        metrics.record_api_call();

        self.limiter.acquire().await;
        match self
            .provider
            .translate_text(text, source, target, glossary_id.as_deref())
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                error!("Translation of {:?} in {} failed: {:#}", text, target, e);
                metrics.record_api_failure();
                String::new()
            }
        }
    }
}

pub struct PluginTranslator {
    config: Config,
    plugin_root: PathBuf,
    core_root: PathBuf,
    info_json: InfoJson,
    files: BTreeMap<String, SourceFile>,
    cache: TranslationCache,
    remote: Option<RemoteTranslator>,
    /// (text, target) pairs already sent to the provider in this run
    attempted: HashSet<(String, Language)>,
    metrics: TranslationMetrics,
}

impl PluginTranslator {
    /// Prepare a run for the plugin found under `cwd`.
    ///
    /// The DeepL client is only created when an API key is configured.
    pub fn new(cwd: &Path, config: Config) -> Result<Self> {
        let remote = match &config.deepl_api_key {
            Some(key) => {
                let client = DeepLClient::new(key.clone(), config.deepl_api_url.clone())?;
                Some(RemoteTranslator::new(
                    Box::new(client),
                    RateLimiter::new(config.min_call_interval),
                    cwd.join(&config.glossary_dir),
                ))
            }
            None => None,
        };
        Self::with_remote(cwd, config, remote)
    }

    /// Prepare a run with an explicit remote side (or none).
    pub fn with_remote(
        cwd: &Path,
        config: Config,
        remote: Option<RemoteTranslator>,
    ) -> Result<Self> {
        let plugin_root = cwd.join(&config.plugin_path);
        let core_root = cwd.join(&config.core_path);
        let info_json = InfoJson::read(&plugin_root)?;

        info!("=== Run plugin translation with following options ===");
        info!(
            "source language: {} ({})",
            config.source_language,
            config.source_language.name()
        );
        info!(
            "target languages: {}",
            config
                .target_languages
                .iter()
                .map(Language::code)
                .collect::<Vec<_>>()
                .join(", ")
        );
        info!("include empty translation: {}", config.include_empty_translation);
        info!("use core translations: {}", config.use_core_translations);
        info!(
            "generate source language translations: {}",
            config.generate_source_language_translations
        );
        info!("debug: {}", config.debug);
        info!("translation provider present: {}", remote.is_some());
        info!("=====================================================");

        Ok(Self {
            config,
            plugin_root,
            core_root,
            info_json,
            files: BTreeMap::new(),
            cache: TranslationCache::new(),
            remote,
            attempted: HashSet::new(),
            metrics: TranslationMetrics::new(),
        })
    }

    pub fn plugin_id(&self) -> &str {
        self.info_json.id()
    }

    pub fn files(&self) -> &BTreeMap<String, SourceFile> {
        &self.files
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    pub fn info_json(&self) -> &InfoJson {
        &self.info_json
    }

    /// Run every phase in order.
    pub async fn start(&mut self) -> Result<()> {
        self.get_plugin_translations();

        if self.config.use_core_translations {
            self.get_core_translations()?;
        }

        self.find_prompts_in_all_files();

        self.do_translate().await;
        self.translate_info_json().await;

        self.write_plugin_translations()?;
        self.write_info_json()?;

        info!("Translation metrics: {}", self.metrics.report());
        Ok(())
    }

    pub fn get_plugin_translations(&mut self) {
        info!("Read plugin translations files...");
        let dir = self.plugin_root.join(TRANSLATIONS_DIR);
        let count = self.cache.load(&dir, &self.config.target_languages);
        debug!("{} plugin translations loaded", count);
    }

    /// Core entries only fill gaps: a plugin translation always wins.
    pub fn get_core_translations(&mut self) -> Result<()> {
        if !self.core_root.exists() {
            bail!("Path {} does not exist", self.core_root.display());
        }

        info!("Read core translations files...");
        let dir = self.core_root.join(TRANSLATIONS_DIR);
        let count = self.cache.load_fallback(&dir, &self.config.target_languages);
        debug!("{} core translations loaded", count);
        Ok(())
    }

    pub fn find_prompts_in_all_files(&mut self) {
        info!("Find prompts in all plugin files");
        let plugin_id = self.plugin_id().to_string();

        for dir in PLUGIN_DIRS {
            let plugin_dir = self.plugin_root.join(dir);
            if !plugin_dir.is_dir() {
                debug!("{} not found, skipping", plugin_dir.display());
                continue;
            }

            let walker = WalkDir::new(&plugin_dir)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| !is_translations_dir(entry));

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Error walking {}: {}", plugin_dir.display(), e);
                        continue;
                    }
                };

                let path = entry.path();
                if !entry.file_type().is_file() || entry.file_name() == INFO_JSON {
                    continue;
                }
                if FileKind::from_path(path).is_none() {
                    continue;
                }

                let relative = path.strip_prefix(&self.plugin_root).unwrap_or(path);
                let key = group_key(&plugin_id, relative);
                info!("    {}...", key);

                let mut file = SourceFile::new(path, key);
                let count = file.search_prompts();
                debug!("{} prompts in {}", count, file.path().display());
                self.files.insert(file.group_key().to_string(), file);
            }
        }
    }

    pub async fn do_translate(&mut self) {
        info!("Find existing translations...");
        let source = self.config.source_language;
        let targets = self.config.target_languages.clone();

        for file in self.files.values_mut() {
            for prompt in file.prompts_mut() {
                let text = prompt.text().to_string();

                if self.cache.contains(&text) {
                    prompt.set_translations(self.cache.get(&text));
                }

                // The source text is the ground truth for the source language
                prompt.set_translation(source, text.clone());

                for &target in targets.iter().filter(|&&t| t != source) {
                    if prompt.has_translation(target) {
                        self.metrics.record_cache_hit();
                    } else {
                        self.metrics.record_cache_miss();
                    }
                }

                let Some(remote) = self.remote.as_mut() else {
                    continue;
                };

                for &target in &targets {
                    if target == source || prompt.has_translation(target) {
                        continue;
                    }
                    // A failed pair yields an empty result; it is not retried in this run
                    if !self.attempted.insert((text.clone(), target)) {
                        continue;
                    }

                    let translated = remote
                        .translate(&text, source, &targets, target, &mut self.metrics)
                        .await;
                    prompt.set_translation(target, translated.clone());
                    self.cache.add(target, text.clone(), translated);
                }
            }
        }

        info!("Number of api call done: {}", self.metrics.api_calls());
    }

    pub async fn translate_info_json(&mut self) {
        let source = self.config.source_language;
        let targets = self.config.target_languages.clone();
        let Some(remote) = self.remote.as_mut() else {
            return;
        };

        if self.info_json.get("description").is_none() {
            warn!("You should add a 'description' in info.json");
            return;
        }
        let Some(mut descriptions) = self.info_json.descriptions(source) else {
            warn!("Unsupported 'description' in info.json, expected a string or an object");
            return;
        };

        let Some(source_description) = descriptions
            .get(source.code())
            .and_then(Value::as_str)
            .map(str::to_string)
        else {
            warn!(
                "You should have a 'description' in info.json that matches your source language: {}",
                source
            );
            return;
        };
        if source_description.trim().is_empty() {
            warn!("The 'description' in info.json for {} is empty, nothing to translate", source);
            return;
        }

        for &target in &targets {
            if target == source {
                continue;
            }
            let existing = descriptions.get(target.code()).and_then(Value::as_str);
            if existing.is_some_and(|d| !d.is_empty()) {
                debug!("Translation of description for {} already exists, skipping...", target);
                continue;
            }

            let translated = remote
                .translate(&source_description, source, &targets, target, &mut self.metrics)
                .await;
            descriptions.insert(target.code().to_string(), Value::String(translated));
        }

        self.info_json.set_descriptions(descriptions);
    }

    /// The output document for one language, possibly empty.
    pub fn language_document(&self, language: Language) -> TranslationDocument {
        self.files
            .iter()
            .filter_map(|(key, file)| {
                let prompts =
                    file.prompts_and_translation(language, self.config.include_empty_translation);
                (!prompts.is_empty()).then(|| (key.clone(), prompts))
            })
            .collect()
    }

    /// Write one file per emitted language, returns the paths written.
    pub fn write_plugin_translations(&self) -> Result<Vec<PathBuf>> {
        info!("Write translations files...");
        let translation_path = self.plugin_root.join(TRANSLATIONS_DIR);
        std::fs::create_dir_all(&translation_path)
            .with_context(|| format!("Failed to create {}", translation_path.display()))?;

        let mut written = Vec::new();
        for &target in &self.config.target_languages {
            if target == self.config.source_language
                && !self.config.generate_source_language_translations
            {
                continue;
            }

            let document = self.language_document(target);
            if document.is_empty() {
                debug!("Nothing to write for {}", target);
                continue;
            }

            let translation_file = translation_path.join(format!("{}.json", target.code()));
            let text = render_translation_document(&document)?;
            info!("Will dump {}", translation_file.display());
            std::fs::write(&translation_file, text)
                .with_context(|| format!("Failed to write {}", translation_file.display()))?;
            written.push(translation_file);
        }
        Ok(written)
    }

    pub fn write_info_json(&mut self) -> Result<()> {
        self.info_json.set_languages(&self.config.all_languages());
        info!("Update {}", self.info_json.path().display());
        self.info_json.write()
    }
}

/// `i18n` directly under a `core` directory holds generated files.
fn is_translations_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry.file_name() == "i18n"
        && entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|parent| parent == "core")
}
