// src/integrations/mod.rs
//
// External Integrations Module

pub mod tmdb;

pub use tmdb::{CatalogResult, MovieCatalog, MovieListKind, TmdbClient};
