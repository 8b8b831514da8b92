// src/integrations/tmdb/mod.rs

pub mod catalog;
pub mod client;
pub mod schema;

pub use catalog::{CatalogResult, MovieCatalog, MovieListKind};
pub use client::TmdbClient;
