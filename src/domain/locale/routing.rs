// src/domain/locale/routing.rs
//
// Locale-prefixed route contract
//
// Every application path starts with a locale segment ("/ja/...", "/zh-TW/...").
// The segment is the source of truth for the system language on navigation.

use super::languages::canonical_ui_language;

/// Application pages that carry a locale prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Watchlist,
    Search,
    Movie(i64),
}

/// Canonical locale segment at the start of `path`, if it names a UI language.
/// Both the full tag ("ja-JP") and the bare code ("ja") are accepted.
pub fn locale_from_path(path: &str) -> Option<&'static str> {
    let segment = path.trim_start_matches('/').split(['/', '?', '#']).next()?;
    if !(segment.len() == 2 || segment.len() == 5) {
        return None;
    }
    canonical_ui_language(segment)
}

/// Path for `route` under locale `lng`
pub fn localized_route(lng: &str, route: Route) -> String {
    match route {
        Route::Home => format!("/{}", lng),
        Route::Watchlist => format!("/{}/watchlist", lng),
        Route::Search => format!("/{}/search", lng),
        Route::Movie(id) => format!("/{}/movie/{}", lng, id),
    }
}

/// Redirect target for a path lacking a locale prefix, `None` when already prefixed
pub fn ensure_locale_prefix(path: &str, lng: &str) -> Option<String> {
    if locale_from_path(path).is_some() {
        return None;
    }
    if path.is_empty() || path == "/" {
        return Some(format!("/{}", lng));
    }
    if path.starts_with('/') {
        Some(format!("/{}{}", lng, path))
    } else {
        Some(format!("/{}/{}", lng, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_path() {
        assert_eq!(locale_from_path("/ja/movie/42"), Some("ja"));
        assert_eq!(locale_from_path("/zh-TW"), Some("zh-TW"));
        assert_eq!(locale_from_path("/en-us/watchlist"), Some("en"));
        assert_eq!(locale_from_path("/ko?q=x"), Some("ko"));
        assert_eq!(locale_from_path("/fr/watchlist"), None);
        assert_eq!(locale_from_path("/watchlist"), None);
        assert_eq!(locale_from_path("/"), None);
    }

    #[test]
    fn test_localized_route() {
        assert_eq!(localized_route("ja", Route::Home), "/ja");
        assert_eq!(localized_route("ja", Route::Watchlist), "/ja/watchlist");
        assert_eq!(localized_route("zh-TW", Route::Movie(550)), "/zh-TW/movie/550");
        assert_eq!(localized_route("en", Route::Search), "/en/search");
    }

    #[test]
    fn test_ensure_locale_prefix() {
        assert_eq!(ensure_locale_prefix("/", "en").as_deref(), Some("/en"));
        assert_eq!(ensure_locale_prefix("", "en").as_deref(), Some("/en"));
        assert_eq!(
            ensure_locale_prefix("/watchlist", "ko").as_deref(),
            Some("/ko/watchlist")
        );
        assert_eq!(ensure_locale_prefix("/ja/watchlist", "en"), None);
    }
}
