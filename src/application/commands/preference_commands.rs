// src/application/commands/preference_commands.rs
//
// Preference Command Handlers
//
// RULES:
// - Parse and validate input, then call the stores
// - Language changes evict stale cache entries inside the store, not here

use crate::application::{dto::*, error_handling::ErrorResponse, state::AppState};
use crate::domain::{ensure_locale_prefix, SortContext, SortField, SortOption, UI_LANGUAGES};

pub fn get_preferences(state: &AppState) -> PreferencesDto {
    PreferencesDto::new(&state.locale.state(), &state.sort.state())
}

pub fn list_ui_languages() -> Vec<UiLanguageDto> {
    UI_LANGUAGES.iter().map(UiLanguageDto::from).collect()
}

/// Returns false when the language was already active
pub fn set_system_language(state: &AppState, language: &str) -> Result<bool, ErrorResponse> {
    Ok(state.locale.set_system_language(language)?)
}

/// Returns false when the language was already active
pub fn set_movie_language(state: &AppState, language: &str) -> Result<bool, ErrorResponse> {
    Ok(state.locale.set_movie_language(language)?)
}

/// Store a sort given as "field.direction" for "search" or "watchlist"
pub fn set_sort(state: &AppState, context: &str, sort: &str) -> Result<PreferencesDto, ErrorResponse> {
    let context: SortContext = context.parse()?;
    let option: SortOption = sort.parse()?;
    state.sort.set_option(context, option);
    Ok(get_preferences(state))
}

/// Pick a sort field: the active field flips direction, another starts at its default
pub fn select_sort_field(
    state: &AppState,
    context: &str,
    field: &str,
) -> Result<String, ErrorResponse> {
    let context: SortContext = context.parse()?;
    let field: SortField = field.parse()?;
    Ok(state.sort.select_field(context, field).to_string())
}

/// Reconcile the system language with an entered path.
/// An unprefixed path gets a redirect under the current system language.
pub fn navigate(state: &AppState, path: &str) -> NavigationDto {
    if let Some(adopted) = state.locale.reconcile_with_path(path) {
        log::debug!("[LOCALE] path {} switched system language to {}", path, adopted);
    }
    let system_language = state.locale.get_system_language();
    NavigationDto {
        redirect: ensure_locale_prefix(path, &system_language),
        system_language,
    }
}
