pub mod cache;
pub mod config;
pub mod deepl;
pub mod extract;
pub mod glossary;
pub mod i18n;
pub mod info_json;
pub mod output;
pub mod rate_limit;
pub mod retry;
pub mod source_file;
pub mod translator;
