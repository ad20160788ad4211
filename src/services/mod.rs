mod movies;
mod ratings;

pub use movies::MovieService;
pub use ratings::RatingService;
