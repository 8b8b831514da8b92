use chrono::NaiveDate;
use std::cmp::Ordering;

use super::value_objects::{SortDirection, SortField, SortOption};
use crate::domain::movie::{Movie, MovieDetail};

/// Fields a record must expose to be ordered by a SortOption
pub trait Sortable {
    fn popularity(&self) -> f64;
    fn vote_average(&self) -> f64;
    fn release_date(&self) -> &str;
    fn title(&self) -> &str;
}

impl Sortable for Movie {
    fn popularity(&self) -> f64 {
        self.popularity
    }
    fn vote_average(&self) -> f64 {
        self.vote_average
    }
    fn release_date(&self) -> &str {
        &self.release_date
    }
    fn title(&self) -> &str {
        &self.title
    }
}

impl Sortable for MovieDetail {
    fn popularity(&self) -> f64 {
        self.popularity
    }
    fn vote_average(&self) -> f64 {
        self.vote_average
    }
    fn release_date(&self) -> &str {
        &self.release_date
    }
    fn title(&self) -> &str {
        &self.title
    }
}

/// Stable in-place sort; ties keep their incoming order
pub fn sort_movies<T: Sortable>(movies: &mut [T], option: SortOption) {
    movies.sort_by(|a, b| {
        let ordering = compare_by_field(a, b, option.field);
        match option.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_by_field<T: Sortable>(a: &T, b: &T, field: SortField) -> Ordering {
    match field {
        SortField::Popularity => a.popularity().total_cmp(&b.popularity()),
        SortField::VoteAverage => a.vote_average().total_cmp(&b.vote_average()),
        // Missing or unparseable dates order before every real date
        SortField::ReleaseDate => parse_date(a.release_date()).cmp(&parse_date(b.release_date())),
        SortField::OriginalTitle => a
            .title()
            .to_lowercase()
            .cmp(&b.title().to_lowercase())
            .then_with(|| a.title().cmp(b.title())),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64, title: &str, release_date: &str, popularity: f64) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: release_date.to_string(),
            vote_average: 5.0,
            vote_count: 10,
            popularity,
            original_language: "en".to_string(),
            genre_ids: Vec::new(),
            adult: false,
            video: false,
        }
    }

    fn titles(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn test_title_sort_both_directions() {
        let mut movies = vec![
            movie(5, "Zeta", "2020-01-01", 1.0),
            movie(2, "Alpha", "2021-01-01", 2.0),
            movie(9, "Mango", "2019-01-01", 3.0),
        ];

        sort_movies(&mut movies, "original_title.asc".parse().unwrap());
        assert_eq!(titles(&movies), vec!["Alpha", "Mango", "Zeta"]);

        sort_movies(&mut movies, "original_title.desc".parse().unwrap());
        assert_eq!(titles(&movies), vec!["Zeta", "Mango", "Alpha"]);
    }

    #[test]
    fn test_title_sort_ignores_case() {
        let mut movies = vec![movie(1, "beta", "", 0.0), movie(2, "Alpha", "", 0.0)];
        sort_movies(&mut movies, "original_title.asc".parse().unwrap());
        assert_eq!(titles(&movies), vec!["Alpha", "beta"]);
    }

    #[test]
    fn test_release_date_sort_puts_missing_dates_first() {
        let mut movies = vec![
            movie(1, "New", "2024-05-01", 0.0),
            movie(2, "Unknown", "", 0.0),
            movie(3, "Old", "1999-12-31", 0.0),
        ];
        sort_movies(&mut movies, "release_date.asc".parse().unwrap());
        assert_eq!(titles(&movies), vec!["Unknown", "Old", "New"]);

        sort_movies(&mut movies, "release_date.desc".parse().unwrap());
        assert_eq!(titles(&movies), vec!["New", "Old", "Unknown"]);
    }

    #[test]
    fn test_popularity_sort_desc() {
        let mut movies = vec![
            movie(1, "A", "", 10.5),
            movie(2, "B", "", 99.0),
            movie(3, "C", "", 0.1),
        ];
        sort_movies(&mut movies, "popularity.desc".parse().unwrap());
        assert_eq!(titles(&movies), vec!["B", "A", "C"]);
    }
}
