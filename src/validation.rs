use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    error::AppResult,
    models::{GetAllMoviesOptions, Movie, SortField},
    repositories::MovieRepository,
};

pub const MAX_PAGE_SIZE: i64 = 25;
pub const MAX_PAGE: i64 = i32::MAX as i64;

/// Field name to error messages, serialized as the `errors` member of a validation problem.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub fn current_year() -> i32 {
    jiff::Timestamp::now().to_zoned(jiff::tz::TimeZone::UTC).year() as i32
}

#[derive(Clone)]
pub struct MovieValidator {
    movies: MovieRepository,
}

impl MovieValidator {
    pub fn new(movies: MovieRepository) -> Self {
        Self { movies }
    }

    pub async fn validate(&self, movie: &Movie) -> AppResult<()> {
        let mut errors = movie_rules(movie, current_year());

        if !movie.title.trim().is_empty() && !self.is_slug_unique(movie).await? {
            errors.add("slug", "This movie already exists in the system");
        }

        errors.into_result()?;
        Ok(())
    }

    async fn is_slug_unique(&self, movie: &Movie) -> AppResult<bool> {
        let existing = self.movies.get_by_slug(&movie.slug(), None).await?;
        Ok(existing.is_none_or(|m| m.id == movie.id))
    }
}

pub fn movie_rules(movie: &Movie, current_year: i32) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if movie.id.is_nil() {
        errors.add("id", "'Id' must not be empty.");
    }
    if movie.genres.is_empty() {
        errors.add("genres", "'Genres' must not be empty.");
    }
    if movie.genres.iter().any(|g| g.trim().is_empty()) {
        errors.add("genres", "Genre names must not be empty.");
    }
    if movie.title.trim().is_empty() {
        errors.add("title", "'Title' must not be empty.");
    }
    if movie.year_of_release > current_year {
        errors.add(
            "yearOfRelease",
            format!("'Year Of Release' must be less than or equal to '{current_year}'."),
        );
    }

    errors
}

pub fn options_rules(options: &GetAllMoviesOptions, current_year: i32) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if options.year_of_release.is_some_and(|y| y > current_year) {
        errors.add("year", format!("'Year' must be less than or equal to '{current_year}'."));
    }
    if let Some(field) = options.sort_field.as_deref() {
        if SortField::from_name(field).is_none() {
            errors.add("sortBy", "You can only sort by 'title' or 'year-of-release'");
        }
    }
    if options.page < 1 {
        errors.add("page", "'Page' must be greater than or equal to '1'.");
    } else if options.page > MAX_PAGE {
        errors.add("page", format!("'Page' must be less than or equal to '{MAX_PAGE}'."));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&options.page_size) {
        errors.add("pageSize", "You can get between 1 and 25 movies per page");
    }

    errors
}

pub fn rating_rules(rating: i32) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    if !(1..=5).contains(&rating) {
        errors.add("rating", "Rating must be between 1 and 5");
    }
    errors
}
