//! Finding translatable strings in plugin source files.
//!
//! Two markers are recognized:
//! - the template syntax `{{text}}`, in every supported file type
//! - the display-text function `__('text', __FILE__)`, in PHP files

use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

/// Name of the metadata descriptor, which never contains prompts.
pub const INFO_JSON: &str = "info.json";

/// Source file types that can carry prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Php,
    Html,
    Js,
}

impl FileKind {
    /// Determine the kind from the file extension, `None` if not scanned.
    pub fn from_path(path: &Path) -> Option<FileKind> {
        if path.file_name().is_some_and(|name| name == INFO_JSON) {
            return None;
        }

        match path.extension()?.to_str()? {
            "php" => Some(FileKind::Php),
            "html" => Some(FileKind::Html),
            "js" => Some(FileKind::Js),
            _ => None,
        }
    }
}

fn template_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{\{(.*?)\}\}").expect("valid template regex"))
}

fn php_call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?s)\b__\(\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")\s*,\s*__FILE__\s*\)"#,
        )
        .expect("valid php call regex")
    })
}

/// Every distinct translatable string in `content`.
pub fn extract_prompts(content: &str, kind: FileKind) -> BTreeSet<String> {
    let mut prompts = BTreeSet::new();

    for capture in template_regex().captures_iter(content) {
        push_if_eligible(&mut prompts, capture[1].to_string());
    }

    if kind == FileKind::Php {
        for capture in php_call_regex().captures_iter(content) {
            let text = match (capture.get(1), capture.get(2)) {
                (Some(single), _) => unescape_single_quoted(single.as_str()),
                (None, Some(double)) => unescape_double_quoted(double.as_str()),
                (None, None) => continue,
            };
            push_if_eligible(&mut prompts, text);
        }
    }

    prompts
}

/// Empty strings and strings without any letter (numbers, punctuation,
/// placeholders) are not worth translating.
fn is_eligible(text: &str) -> bool {
    !text.trim().is_empty() && text.chars().any(char::is_alphabetic)
}

fn push_if_eligible(prompts: &mut BTreeSet<String>, text: String) {
    if is_eligible(&text) {
        prompts.insert(text);
    }
}

/// PHP single quotes only know `\'` and `\\`.
fn unescape_single_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('\'' | '\\')) => out.push(next),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn unescape_double_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(next @ ('"' | '\\' | '$')) => out.push(next),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_file_kind_from_extension() {
        assert_eq!(FileKind::from_path(&PathBuf::from("a/b.php")), Some(FileKind::Php));
        assert_eq!(FileKind::from_path(&PathBuf::from("b.html")), Some(FileKind::Html));
        assert_eq!(FileKind::from_path(&PathBuf::from("b.js")), Some(FileKind::Js));
        assert_eq!(FileKind::from_path(&PathBuf::from("b.json")), None);
        assert_eq!(FileKind::from_path(&PathBuf::from("Makefile")), None);
    }

    #[test]
    fn test_info_json_is_never_scanned() {
        assert_eq!(FileKind::from_path(&PathBuf::from("plugin_info/info.json")), None);
    }

    #[test]
    fn test_template_markers() {
        let html = r#"<label>{{Nom de l'équipement}}</label>
            <a title="{{Sauvegarder}}">{{Sauvegarder}}</a>"#;

        assert_eq!(
            extract_prompts(html, FileKind::Html),
            set(&["Nom de l'équipement", "Sauvegarder"])
        );
    }

    #[test]
    fn test_template_marker_spanning_lines() {
        let js = "alert('{{Une erreur\nest survenue}}')";
        assert_eq!(
            extract_prompts(js, FileKind::Js),
            set(&["Une erreur\nest survenue"])
        );
    }

    #[test]
    fn test_template_keeps_surrounding_whitespace() {
        assert_eq!(
            extract_prompts("{{ Oui }}", FileKind::Html),
            set(&[" Oui "])
        );
    }

    #[test]
    fn test_php_display_function() {
        let php = r#"<?php
            throw new Exception(__('Commande introuvable', __FILE__));
            echo __("Valeur : ", __FILE__) . $value;
            $a = __( 'Deux espaces' ,  __FILE__ );
        "#;

        assert_eq!(
            extract_prompts(php, FileKind::Php),
            set(&["Commande introuvable", "Valeur : ", "Deux espaces"])
        );
    }

    #[test]
    fn test_php_escapes_are_decoded() {
        let php = r#"__('L\'équipement', __FILE__); __("Dire \"oui\"", __FILE__);"#;

        assert_eq!(
            extract_prompts(php, FileKind::Php),
            set(&["L'équipement", "Dire \"oui\""])
        );
    }

    #[test]
    fn test_php_function_ignored_outside_php() {
        let js = "__('Pas en JS', __FILE__)";
        assert!(extract_prompts(js, FileKind::Js).is_empty());
    }

    #[test]
    fn test_php_function_without_file_marker_ignored() {
        let php = "__('Sans fichier'); my__('Autre', __FILE__);";
        assert!(extract_prompts(php, FileKind::Php).is_empty());
    }

    #[test]
    fn test_php_file_can_mix_markers() {
        let php = r#"<?php echo __('Bonjour', __FILE__); ?><span>{{Bonjour}}</span><b>{{Au revoir}}</b>"#;

        assert_eq!(
            extract_prompts(php, FileKind::Php),
            set(&["Au revoir", "Bonjour"])
        );
    }

    #[test]
    fn test_technical_and_empty_strings_skipped() {
        let html = "{{}} {{   }} {{42}} {{-.-}} {{ok}}";
        assert_eq!(extract_prompts(html, FileKind::Html), set(&["ok"]));
    }

    #[test]
    fn test_unescape_keeps_unknown_sequences() {
        assert_eq!(unescape_single_quoted(r"a\nb"), r"a\nb");
        assert_eq!(unescape_double_quoted(r"a\nb"), "a\nb");
        assert_eq!(unescape_double_quoted(r"\$x \d"), r"$x \d");
        assert_eq!(unescape_single_quoted("trailing\\"), "trailing\\");
    }

    proptest! {
        #[test]
        fn prop_repeated_prompt_extracted_once(text in "[a-zA-Z][a-zA-Z ]{0,20}", times in 1usize..5) {
            let html = format!("{{{{{}}}}}", text).repeat(times);
            let prompts = extract_prompts(&html, FileKind::Html);
            prop_assert_eq!(prompts.len(), 1);
            prop_assert!(prompts.contains(&text));
        }

        #[test]
        fn prop_extracted_prompts_are_eligible(content in "\\PC{0,200}") {
            for prompt in extract_prompts(&content, FileKind::Php) {
                prop_assert!(is_eligible(&prompt));
            }
        }
    }
}
