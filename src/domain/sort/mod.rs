pub mod ordering;
pub mod value_objects;

pub use ordering::{sort_movies, Sortable};
pub use value_objects::{SortContext, SortDirection, SortField, SortOption, SortPreferences};
