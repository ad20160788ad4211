use tracing::info;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::MovieRating,
    repositories::{MovieRepository, RatingRepository},
    validation,
};

#[derive(Clone)]
pub struct RatingService {
    ratings: RatingRepository,
    movies: MovieRepository,
}

impl RatingService {
    pub fn new(ratings: RatingRepository, movies: MovieRepository) -> Self {
        Self { ratings, movies }
    }

    /// Returns `false` when the movie does not exist.
    pub async fn rate_movie(&self, movie_id: Uuid, rating: i32, user_id: Uuid) -> AppResult<bool> {
        validation::rating_rules(rating).into_result()?;

        if !self.movies.exists_by_id(movie_id).await? {
            return Ok(false);
        }

        let rated = self.ratings.rate_movie(movie_id, rating, user_id).await?;
        info!(%movie_id, %user_id, rating, "movie rated");
        Ok(rated)
    }

    pub async fn delete_rating(&self, movie_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        self.ratings.delete_rating(movie_id, user_id).await
    }

    pub async fn get_ratings_for_user(&self, user_id: Uuid) -> AppResult<Vec<MovieRating>> {
        self.ratings.get_ratings_for_user(user_id).await
    }
}
