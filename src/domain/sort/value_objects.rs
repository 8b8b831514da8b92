// src/domain/sort/value_objects.rs
//
// Sort preference value objects
//
// RULES:
// - A SortOption is always a (field, direction) pair
// - String form is "field.direction" (persisted and broadcast as-is)
// - Toggle logic is a pure function; stores never apply it themselves

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Popularity,
    VoteAverage,
    ReleaseDate,
    OriginalTitle,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::Popularity,
        SortField::VoteAverage,
        SortField::ReleaseDate,
        SortField::OriginalTitle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Popularity => "popularity",
            SortField::VoteAverage => "vote_average",
            SortField::ReleaseDate => "release_date",
            SortField::OriginalTitle => "original_title",
        }
    }

    /// Direction applied when the user switches to this field
    pub fn default_direction(&self) -> SortDirection {
        match self {
            SortField::OriginalTitle => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popularity" => Ok(SortField::Popularity),
            "vote_average" => Ok(SortField::VoteAverage),
            "release_date" => Ok(SortField::ReleaseDate),
            "original_title" => Ok(SortField::OriginalTitle),
            other => Err(DomainError::InvariantViolation(format!(
                "Unknown sort field: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn flipped(&self) -> SortDirection {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(DomainError::InvariantViolation(format!(
                "Unknown sort direction: {}",
                other
            ))),
        }
    }
}

/// The two independent places a sort preference applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortContext {
    Search,
    Watchlist,
}

impl FromStr for SortContext {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(SortContext::Search),
            "watchlist" => Ok(SortContext::Watchlist),
            other => Err(DomainError::InvariantViolation(format!(
                "Unknown sort context: {}",
                other
            ))),
        }
    }
}

impl SortContext {
    pub fn default_sort(&self) -> SortOption {
        match self {
            SortContext::Search => SortOption::new(SortField::Popularity, SortDirection::Desc),
            SortContext::Watchlist => SortOption::new(SortField::ReleaseDate, SortDirection::Desc),
        }
    }
}

/// A sort field plus direction, e.g. `release_date.desc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SortOption {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOption {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Next option after the user picks `field`:
    /// the active field flips direction, any other field starts at its default.
    pub fn select(&self, field: SortField) -> SortOption {
        if field == self.field {
            SortOption::new(field, self.direction.flipped())
        } else {
            SortOption::new(field, field.default_direction())
        }
    }
}

/// Sort choice of every context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortPreferences {
    pub search_sort: SortOption,
    pub watchlist_sort: SortOption,
}

impl Default for SortPreferences {
    fn default() -> Self {
        Self {
            search_sort: SortContext::Search.default_sort(),
            watchlist_sort: SortContext::Watchlist.default_sort(),
        }
    }
}

impl SortPreferences {
    pub fn get(&self, context: SortContext) -> SortOption {
        match context {
            SortContext::Search => self.search_sort,
            SortContext::Watchlist => self.watchlist_sort,
        }
    }

    /// Returns false when `option` was already set
    pub fn set(&mut self, context: SortContext, option: SortOption) -> bool {
        let slot = match context {
            SortContext::Search => &mut self.search_sort,
            SortContext::Watchlist => &mut self.watchlist_sort,
        };
        if *slot == option {
            return false;
        }
        *slot = option;
        true
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.field.as_str(), self.direction.as_str())
    }
}

impl FromStr for SortOption {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = s.split_once('.').ok_or_else(|| {
            DomainError::InvariantViolation(format!("Malformed sort option: {}", s))
        })?;
        Ok(SortOption::new(field.parse()?, direction.parse()?))
    }
}

impl TryFrom<String> for SortOption {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortOption> for String {
    fn from(option: SortOption) -> Self {
        option.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_string_form() {
        let option: SortOption = "original_title.asc".parse().unwrap();
        assert_eq!(option.field, SortField::OriginalTitle);
        assert_eq!(option.direction, SortDirection::Asc);
        assert_eq!(option.to_string(), "original_title.asc");
    }

    #[test]
    fn test_preferences_are_independent_per_context() {
        let mut prefs = SortPreferences::default();
        let by_title = SortOption::new(SortField::OriginalTitle, SortDirection::Asc);

        assert!(prefs.set(SortContext::Search, by_title));
        assert!(!prefs.set(SortContext::Search, by_title));
        assert_eq!(prefs.get(SortContext::Search), by_title);
        assert_eq!(prefs.get(SortContext::Watchlist), SortContext::Watchlist.default_sort());
        assert_eq!(
            serde_json::to_string(&prefs).unwrap(),
            r#"{"search_sort":"original_title.asc","watchlist_sort":"release_date.desc"}"#
        );
    }

    #[test]
    fn test_malformed_option_rejected() {
        assert!("popularity".parse::<SortOption>().is_err());
        assert!("title.asc".parse::<SortOption>().is_err());
        assert!("popularity.up".parse::<SortOption>().is_err());
    }

    #[test]
    fn test_select_same_field_flips_direction() {
        let current = SortContext::Watchlist.default_sort();
        let next = current.select(SortField::ReleaseDate);
        assert_eq!(next, SortOption::new(SortField::ReleaseDate, SortDirection::Asc));
    }

    #[test]
    fn test_select_other_field_uses_its_default() {
        let current = SortOption::new(SortField::Popularity, SortDirection::Asc);
        assert_eq!(
            current.select(SortField::OriginalTitle),
            SortOption::new(SortField::OriginalTitle, SortDirection::Asc)
        );
        assert_eq!(
            current.select(SortField::VoteAverage),
            SortOption::new(SortField::VoteAverage, SortDirection::Desc)
        );
    }

    #[test]
    fn test_context_defaults() {
        assert_eq!(SortContext::Search.default_sort().to_string(), "popularity.desc");
        assert_eq!(SortContext::Watchlist.default_sort().to_string(), "release_date.desc");
    }

    #[test]
    fn test_serde_uses_string_form() {
        let option = SortOption::new(SortField::VoteAverage, SortDirection::Desc);
        let json = serde_json::to_string(&option).unwrap();
        assert_eq!(json, "\"vote_average.desc\"");
        let back: SortOption = serde_json::from_str(&json).unwrap();
        assert_eq!(back, option);
    }
}
