use serde::{Deserialize, Serialize};

/// Maximum number of movies the catalog returns per listing page
pub const PAGE_SIZE: usize = 20;

/// A movie as it appears in catalog listings.
/// Immutable once fetched; `id` is the stable catalog identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// ISO date (YYYY-MM-DD), may be empty for unreleased titles
    pub release_date: String,
    pub vote_average: f64,
    pub vote_count: u64,
    pub popularity: f64,
    pub original_language: String,
    pub genre_ids: Vec<i64>,
    pub adult: bool,
    pub video: bool,
}

/// One page of a paginated movie listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    /// 1-based page number
    pub page: u32,
    pub results: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u64,
}

impl MoviePage {
    /// True when the catalog reports more pages after this one
    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieCollection {
    pub id: i64,
    pub name: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCompany {
    pub id: i64,
    pub logo_path: Option<String>,
    pub name: String,
    pub origin_country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCountry {
    pub iso_3166_1: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpokenLanguage {
    pub english_name: String,
    pub iso_639_1: String,
    pub name: String,
}

/// Full movie record from the detail endpoint.
/// Carries resolved `genres` instead of `genre_ids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: String,
    pub vote_average: f64,
    pub vote_count: u64,
    pub popularity: f64,
    pub original_language: String,
    pub adult: bool,
    pub video: bool,
    pub belongs_to_collection: Option<MovieCollection>,
    pub budget: u64,
    pub genres: Vec<Genre>,
    pub homepage: Option<String>,
    pub imdb_id: Option<String>,
    pub production_companies: Vec<ProductionCompany>,
    pub production_countries: Vec<ProductionCountry>,
    pub revenue: u64,
    pub runtime: Option<u32>,
    pub spoken_languages: Vec<SpokenLanguage>,
    pub status: String,
    pub tagline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    pub character: String,
    pub profile_path: Option<String>,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: i64,
    pub name: String,
    pub job: String,
    pub department: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieCredits {
    pub id: i64,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieVideo {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String,
    pub size: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub official: bool,
    pub published_at: String,
}

impl MovieVideo {
    /// YouTube trailers are the only videos the player can embed
    pub fn is_youtube_trailer(&self) -> bool {
        self.site == "YouTube" && self.kind == "Trailer"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieVideos {
    pub id: i64,
    pub results: Vec<MovieVideo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAuthor {
    pub name: String,
    pub username: String,
    pub avatar_path: Option<String>,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieReview {
    pub id: String,
    pub author: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub url: String,
    pub author_details: ReviewAuthor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieReviews {
    pub id: i64,
    pub page: u32,
    pub results: Vec<MovieReview>,
    pub total_pages: u32,
    pub total_results: u64,
}

/// Image sizes the UI requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSize {
    #[default]
    W500,
    Original,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W500 => "w500",
            ImageSize::Original => "original",
        }
    }
}

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Build a full image URL from a catalog path fragment
pub fn image_url(path: Option<&str>, size: ImageSize) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;
    Some(format!("{}/{}{}", IMAGE_BASE_URL, size.as_str(), path))
}
