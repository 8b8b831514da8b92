// src/domain/locale/languages.rs
//
// Language tables and process-locale detection
//
// RULES:
// - UI languages are the closed set the interface ships strings for
// - Content languages are whatever the catalog accepts (ISO 639-1)
// - Detection never fails; it falls back to en/US

use serde::{Deserialize, Serialize};

/// A language the interface is translated into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UiLanguage {
    /// Full tag, e.g. "ja-JP"
    pub tag: &'static str,
    /// Stored system language and route segment, one spelling per language
    pub value: &'static str,
    /// ISO 639-1 code
    pub code: &'static str,
    pub name: &'static str,
    pub region: &'static str,
}

pub const UI_LANGUAGES: [UiLanguage; 4] = [
    UiLanguage { tag: "zh-TW", value: "zh-TW", code: "zh", name: "繁體中文", region: "TW" },
    UiLanguage { tag: "en-US", value: "en", code: "en", name: "English", region: "US" },
    UiLanguage { tag: "ja-JP", value: "ja", code: "ja", name: "日本語", region: "JP" },
    UiLanguage { tag: "ko-KR", value: "ko", code: "ko", name: "한국어", region: "KR" },
];

pub const DEFAULT_REGION: &str = "US";
pub const DEFAULT_CONTENT_LANGUAGE: &str = "en";

/// ISO 639-1 codes the catalog serves localized content for
pub const CONTENT_LANGUAGES: &[&str] = &[
    "ar", "az", "be", "bg", "bn", "bs", "ca", "cs", "da", "de", "el", "en", "eo", "es", "et",
    "eu", "fa", "fi", "fr", "ga", "gl", "he", "hi", "hr", "hu", "id", "it", "ja", "ka", "kk",
    "kn", "ko", "ky", "lt", "lv", "mk", "ml", "mn", "ms", "nb", "nl", "no", "pa", "pl", "pt",
    "ro", "ru", "si", "sk", "sl", "sq", "sr", "sv", "ta", "te", "th", "tl", "tr", "uk", "ur",
    "uz", "vi", "zh",
];

/// Look up a UI language by tag ("ja-JP") or bare code ("ja"), case-insensitive
pub fn find_ui_language(value: &str) -> Option<&'static UiLanguage> {
    UI_LANGUAGES
        .iter()
        .find(|l| l.tag.eq_ignore_ascii_case(value) || l.code.eq_ignore_ascii_case(value))
}

/// The one stored spelling of a UI language, whichever spelling it was given in.
/// Chinese keeps its region since the interface ships Traditional Chinese only.
pub fn canonical_ui_language(value: &str) -> Option<&'static str> {
    find_ui_language(value).map(|l| l.value)
}

/// Accepts bare codes ("ja") and region-qualified ones ("zh-TW")
pub fn is_content_language(code: &str) -> bool {
    let primary = code.split(['-', '_']).next().unwrap_or_default();
    if primary != code && !(code.len() == 5 && primary.len() == 2) {
        return false;
    }
    CONTENT_LANGUAGES.contains(&primary)
}

/// Language and region sent to the catalog when a caller supplies none
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedLocale {
    pub language: String,
    pub region: String,
}

impl Default for DetectedLocale {
    fn default() -> Self {
        Self {
            language: DEFAULT_CONTENT_LANGUAGE.to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl DetectedLocale {
    /// Detect from the process environment (LC_ALL, then LANG)
    pub fn from_env() -> Self {
        std::env::var("LC_ALL")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| std::env::var("LANG").ok())
            .map(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }

    /// Parse a POSIX or BCP-47 locale such as `ja_JP.UTF-8` or `pt-BR`
    pub fn parse(raw: &str) -> Self {
        let base = raw.split(['.', '@']).next().unwrap_or_default();
        let mut parts = base.split(['_', '-']);

        let primary = parts.next().unwrap_or_default().to_lowercase();
        let language = if is_content_language(&primary) {
            primary
        } else {
            DEFAULT_CONTENT_LANGUAGE.to_string()
        };

        let region = parts
            .next()
            .filter(|r| !r.is_empty())
            .map(|r| r.to_uppercase())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Self { language, region }
    }
}
