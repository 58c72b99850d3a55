//! DeepL REST API v2 client.
//!
//! The coordinator only talks to [`TranslationProvider`]; `DeepLClient` is the
//! production implementation, tests substitute their own.

use crate::glossary::GlossaryInfo;
use crate::i18n::Language;
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Domain hint sent with every translation.
pub const TRANSLATION_CONTEXT: &str = "home automation";

/// Favor quality over latency.
pub const MODEL_TYPE: &str = "prefer_quality_optimized";

const FREE_API_URL: &str = "https://api-free.deepl.com";
const PRO_API_URL: &str = "https://api.deepl.com";

/// A remote translation service, optionally backed by glossaries.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate `text`, keeping its formatting.
    ///
    /// An `Err` means no usable translation came back (transport failure,
    /// HTTP error or a response of an unexpected shape).
    async fn translate_text(
        &self,
        text: &str,
        source: Language,
        target: Language,
        glossary_id: Option<&str>,
    ) -> Result<String>;

    async fn list_glossaries(&self) -> Result<Vec<GlossaryInfo>>;

    async fn create_glossary(
        &self,
        name: &str,
        source: Language,
        target: Language,
        entries: &BTreeMap<String, String>,
    ) -> Result<GlossaryInfo>;

    async fn delete_glossary(&self, glossary_id: &str) -> Result<()>;

    /// Used for logging.
    fn provider_name(&self) -> &str;
}

/// Non-success HTTP answer from the API.
#[derive(Debug, Error)]
#[error("DeepL API error ({status}): {body}")]
pub struct ApiError {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: [&'a str; 1],
    source_lang: &'a str,
    target_lang: &'a str,
    preserve_formatting: bool,
    context: &'a str,
    model_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    glossary_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TextResult>,
}

#[derive(Debug, Deserialize)]
struct TextResult {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GlossaryListResponse {
    glossaries: Vec<GlossaryInfo>,
}

#[derive(Debug, Serialize)]
struct CreateGlossaryRequest<'a> {
    name: &'a str,
    source_lang: &'a str,
    target_lang: &'a str,
    entries: String,
    entries_format: &'a str,
}

#[derive(Clone)]
pub struct DeepLClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    retry: RetryConfig,
}

impl DeepLClient {
    /// Create a client for `api_key`.
    ///
    /// Free-plan keys (ending in `:fx`) are sent to the free endpoint unless
    /// `base_url` overrides it.
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            anyhow::bail!("DeepL API key cannot be empty");
        }

        let base_url = base_url
            .unwrap_or_else(|| default_base_url(&api_key).to_string())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key,
            base_url,
            client,
            retry: RetryConfig::api_call(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }
}

fn default_base_url(api_key: &str) -> &'static str {
    if api_key.ends_with(":fx") {
        FREE_API_URL
    } else {
        PRO_API_URL
    }
}

/// Turn a non-success response into an [`ApiError`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
    Err(ApiError {
        status: status.as_u16(),
        body,
    }
    .into())
}

/// Retry 429 (too many requests) and 5xx errors, plus transport failures.
/// Other 4xx errors, including 456 (quota exceeded), are final.
pub fn is_retryable_error(error: &anyhow::Error) -> bool {
    match error.downcast_ref::<ApiError>() {
        Some(api_error) => api_error.status == 429 || api_error.status >= 500,
        None => true,
    }
}

/// DeepL rejects glossary terms containing tabs or line breaks.
fn entries_to_tsv(entries: &BTreeMap<String, String>) -> String {
    entries
        .iter()
        .filter(|(source, target)| {
            let valid = |s: &str| !s.trim().is_empty() && !s.contains(['\t', '\n', '\r']);
            valid(source.as_str()) && valid(target.as_str())
        })
        .map(|(source, target)| format!("{}\t{}\n", source, target))
        .collect()
}

#[async_trait]
impl TranslationProvider for DeepLClient {
    async fn translate_text(
        &self,
        text: &str,
        source: Language,
        target: Language,
        glossary_id: Option<&str>,
    ) -> Result<String> {
        let request = TranslateRequest {
            text: [text],
            source_lang: source.deepl_code(),
            target_lang: target.deepl_code(),
            preserve_formatting: true,
            context: TRANSLATION_CONTEXT,
            model_type: MODEL_TYPE,
            glossary_id,
        };

        let response: TranslateResponse = with_retry_if(
            &self.retry,
            &format!("DeepL translation to {}", target),
            || async {
                let response = self
                    .client
                    .post(self.url("/v2/translate"))
                    .header("Authorization", self.auth_header())
                    .json(&request)
                    .send()
                    .await
                    .context("Failed to send translation request to DeepL API")?;

                check_status(response)
                    .await?
                    .json::<TranslateResponse>()
                    .await
                    .context("Failed to parse DeepL translation response")
            },
            is_retryable_error,
        )
        .await?;

        response
            .translations
            .into_iter()
            .next()
            .map(|result| result.text)
            .context("DeepL translation response contained no translations")
    }

    async fn list_glossaries(&self) -> Result<Vec<GlossaryInfo>> {
        let response: GlossaryListResponse = with_retry_if(
            &self.retry,
            "DeepL glossary listing",
            || async {
                let response = self
                    .client
                    .get(self.url("/v2/glossaries"))
                    .header("Authorization", self.auth_header())
                    .send()
                    .await
                    .context("Failed to send glossary list request to DeepL API")?;

                check_status(response)
                    .await?
                    .json::<GlossaryListResponse>()
                    .await
                    .context("Failed to parse DeepL glossary list")
            },
            is_retryable_error,
        )
        .await?;

        Ok(response.glossaries)
    }

    async fn create_glossary(
        &self,
        name: &str,
        source: Language,
        target: Language,
        entries: &BTreeMap<String, String>,
    ) -> Result<GlossaryInfo> {
        let request = CreateGlossaryRequest {
            name,
            source_lang: source.glossary_code(),
            target_lang: target.glossary_code(),
            entries: entries_to_tsv(entries),
            entries_format: "tsv",
        };

        let response = self
            .client
            .post(self.url("/v2/glossaries"))
            .header("Authorization", self.auth_header())
            .json(&request)
            .send()
            .await
            .context("Failed to send glossary creation request to DeepL API")?;

        check_status(response)
            .await?
            .json()
            .await
            .context("Failed to parse DeepL glossary creation response")
    }

    async fn delete_glossary(&self, glossary_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/v2/glossaries/{}", glossary_id)))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .context("Failed to send glossary deletion request to DeepL API")?;

        check_status(response).await?;
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "DeepL"
    }
}
