use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthenticatedUser,
    cache::MOVIES_TAG,
    contracts::{MovieRatingResponse, RateMovieRequest},
    error::{AppError, AppResult},
    extract::{JsonBody, PathParam},
};

#[utoipa::path(
    put,
    path = "/api/movies/{id}/ratings",
    tag = "ratings",
    params(("id" = Uuid, Path)),
    request_body = RateMovieRequest,
    responses((status = 200), (status = 400), (status = 401), (status = 404))
)]
pub async fn rate_movie(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<RateMovieRequest>,
) -> AppResult<StatusCode> {
    if !state.ratings.rate_movie(id, req.rating, user.user_id).await? {
        return Err(AppError::NotFound("movie"));
    }
    state.cache.evict_by_tag(MOVIES_TAG).await;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/api/movies/{id}/ratings",
    tag = "ratings",
    params(("id" = Uuid, Path)),
    responses((status = 200), (status = 401), (status = 404))
)]
pub async fn delete_rating(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<StatusCode> {
    if !state.ratings.delete_rating(id, user.user_id).await? {
        return Err(AppError::NotFound("rating"));
    }
    state.cache.evict_by_tag(MOVIES_TAG).await;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/ratings/me",
    tag = "ratings",
    responses((status = 200, body = Vec<MovieRatingResponse>), (status = 401))
)]
pub async fn get_user_ratings(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<MovieRatingResponse>>> {
    let ratings = state.ratings.get_ratings_for_user(user.user_id).await?;
    Ok(Json(ratings.into_iter().map(MovieRatingResponse::from).collect()))
}
