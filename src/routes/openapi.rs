use axum::Json;
use utoipa::{OpenApi, openapi::OpenApi as Document};

use super::{health, movies, ratings};
use crate::{
    contracts::{
        CreateMovieRequest, MovieRatingResponse, MovieResponse, MoviesResponse, RateMovieRequest,
        UpdateMovieRequest,
    },
    error::{AppError, AppResult},
    extract::PathParam,
    versioning::ApiVersion,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Movies API"),
    paths(
        movies::create,
        movies::get,
        movies::get_all,
        movies::update,
        movies::delete,
        ratings::rate_movie,
        ratings::delete_rating,
        ratings::get_user_ratings,
        health::health,
    ),
    components(schemas(
        CreateMovieRequest,
        UpdateMovieRequest,
        RateMovieRequest,
        MovieResponse,
        MoviesResponse,
        MovieRatingResponse,
    )),
    tags((name = "movies"), (name = "ratings"), (name = "health"))
)]
struct ApiDoc;

/// One document per API version, addressed as `v1` or `v2`.
pub async fn document(PathParam(version): PathParam<String>) -> AppResult<Json<Document>> {
    let version = version
        .strip_prefix('v')
        .and_then(ApiVersion::parse)
        .ok_or(AppError::NotFound("api version"))?;
    Ok(Json(versioned(version)))
}

fn versioned(version: ApiVersion) -> Document {
    let mut doc = ApiDoc::openapi();
    doc.info.version = version.as_str().to_string();
    doc
}
