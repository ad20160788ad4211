//! Request and response bodies of the HTTP API, shared with the SDK client.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::{GetAllMoviesOptions, Movie, MovieRating, SortOrder};

#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieRequest {
    pub title: String,
    pub year_of_release: i32,
    pub genres: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovieRequest {
    pub title: String,
    pub year_of_release: i32,
    pub genres: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct RateMovieRequest {
    pub rating: i32,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GetAllMoviesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// `title` or `year-of-release`, optionally prefixed with `+` or `-`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_rating: Option<i32>,
    pub year_of_release: i32,
    pub genres: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoviesResponse {
    pub items: Vec<MovieResponse>,
    pub page: i64,
    pub page_size: i64,
    pub total: u64,
    pub has_next_page: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieRatingResponse {
    pub movie_id: Uuid,
    pub slug: String,
    pub rating: i32,
}

impl CreateMovieRequest {
    pub fn into_movie(self) -> Movie {
        Movie::new(Uuid::new_v4(), self.title, self.year_of_release, self.genres)
    }
}

impl UpdateMovieRequest {
    pub fn into_movie(self, id: Uuid) -> Movie {
        Movie::new(id, self.title, self.year_of_release, self.genres)
    }
}

impl GetAllMoviesRequest {
    /// `sortBy` takes an optional `+`/`-` direction prefix; hyphens in the field name
    /// become underscores.
    pub fn into_options(self, user_id: Option<Uuid>) -> GetAllMoviesOptions {
        let sort_order = match self.sort_by.as_deref() {
            None => SortOrder::Unsorted,
            Some(s) if s.starts_with('-') => SortOrder::Descending,
            Some(_) => SortOrder::Ascending,
        };
        let sort_field =
            self.sort_by.map(|s| s.trim_matches(|c| c == '+' || c == '-').replace('-', "_"));

        GetAllMoviesOptions {
            title: self.title,
            year_of_release: self.year,
            sort_field,
            sort_order,
            page: self.page.unwrap_or(GetAllMoviesOptions::DEFAULT_PAGE),
            page_size: self.page_size.unwrap_or(GetAllMoviesOptions::DEFAULT_PAGE_SIZE),
            user_id,
        }
    }
}

impl From<Movie> for MovieResponse {
    fn from(movie: Movie) -> Self {
        Self {
            slug: movie.slug(),
            id: movie.id,
            title: movie.title,
            rating: movie.rating,
            user_rating: movie.user_rating,
            year_of_release: movie.year_of_release,
            genres: movie.genres,
        }
    }
}

impl From<MovieRating> for MovieRatingResponse {
    fn from(rating: MovieRating) -> Self {
        Self { movie_id: rating.movie_id, slug: rating.slug, rating: rating.rating }
    }
}

impl MoviesResponse {
    pub fn new(movies: Vec<Movie>, page: i64, page_size: i64, total: u64) -> Self {
        let seen = (page.max(0) as u64).saturating_mul(page_size.max(0) as u64);
        Self {
            items: movies.into_iter().map(MovieResponse::from).collect(),
            page,
            page_size,
            total,
            has_next_page: total > seen,
        }
    }
}
