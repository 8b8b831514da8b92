pub mod entity;
pub mod invariants;

pub use entity::{
    image_url, CastMember, CrewMember, Genre, ImageSize, Movie, MovieCollection, MovieCredits,
    MovieDetail, MoviePage, MovieReview, MovieReviews, MovieVideo, MovieVideos,
    ProductionCompany, ProductionCountry, ReviewAuthor, SpokenLanguage, IMAGE_BASE_URL,
    PAGE_SIZE,
};
pub use invariants::validate_movie_page;
