pub mod languages;
pub mod routing;

pub use languages::{
    canonical_ui_language, find_ui_language, is_content_language, DetectedLocale, UiLanguage, CONTENT_LANGUAGES,
    DEFAULT_CONTENT_LANGUAGE, DEFAULT_REGION, UI_LANGUAGES,
};
pub use routing::{ensure_locale_prefix, locale_from_path, localized_route, Route};

use serde::{Deserialize, Serialize};

/// The two independent language settings a user controls.
/// `system_language` picks interface strings, `movie_language` the catalog content language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalePreference {
    pub system_language: String,
    pub movie_language: String,
}

impl Default for LocalePreference {
    fn default() -> Self {
        Self::with_fallback(DEFAULT_CONTENT_LANGUAGE)
    }
}

impl LocalePreference {
    pub fn with_fallback(fallback: &str) -> Self {
        Self {
            system_language: fallback.to_string(),
            movie_language: fallback.to_string(),
        }
    }
}
