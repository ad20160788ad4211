use tracing::info;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{GetAllMoviesOptions, Movie},
    repositories::{MovieRepository, RatingRepository},
    validation::{self, MovieValidator},
};

#[derive(Clone)]
pub struct MovieService {
    movies: MovieRepository,
    ratings: RatingRepository,
    validator: MovieValidator,
}

impl MovieService {
    pub fn new(movies: MovieRepository, ratings: RatingRepository) -> Self {
        let validator = MovieValidator::new(movies.clone());
        Self { movies, ratings, validator }
    }

    pub async fn create(&self, movie: &Movie) -> AppResult<bool> {
        self.validator.validate(movie).await?;
        let created = self.movies.create(movie).await?;
        if created {
            info!(movie_id = %movie.id, slug = %movie.slug(), "movie created");
        }
        Ok(created)
    }

    pub async fn get_by_id(&self, id: Uuid, user_id: Option<Uuid>) -> AppResult<Option<Movie>> {
        self.movies.get_by_id(id, user_id).await
    }

    pub async fn get_by_slug(&self, slug: &str, user_id: Option<Uuid>) -> AppResult<Option<Movie>> {
        self.movies.get_by_slug(slug, user_id).await
    }

    pub async fn get_all(&self, options: &GetAllMoviesOptions) -> AppResult<Vec<Movie>> {
        validation::options_rules(options, validation::current_year()).into_result()?;
        self.movies.get_all(options).await
    }

    pub async fn get_count(
        &self,
        title: Option<&str>,
        year_of_release: Option<i32>,
    ) -> AppResult<u64> {
        self.movies.count(title, year_of_release).await
    }

    /// Returns `None` when no movie has the given id.
    pub async fn update(
        &self,
        mut movie: Movie,
        user_id: Option<Uuid>,
    ) -> AppResult<Option<Movie>> {
        self.validator.validate(&movie).await?;
        if !self.movies.update(&movie).await? {
            return Ok(None);
        }
        info!(movie_id = %movie.id, "movie updated");

        match user_id {
            Some(user_id) => {
                let (rating, user_rating) =
                    self.ratings.get_rating_for_user(movie.id, user_id).await?;
                movie.rating = rating;
                movie.user_rating = user_rating;
            },
            None => movie.rating = self.ratings.get_rating(movie.id).await?,
        }
        Ok(Some(movie))
    }

    pub async fn delete_by_id(&self, id: Uuid) -> AppResult<bool> {
        let deleted = self.movies.delete_by_id(id).await?;
        if deleted {
            info!(movie_id = %id, "movie deleted");
        }
        Ok(deleted)
    }
}
