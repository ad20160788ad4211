use std::{fmt::Display, sync::Arc};

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::{cache_key, cached, respond_json};
use crate::{
    AppState,
    auth::{Admin, MaybeUser, TrustedMember},
    cache::MOVIES_TAG,
    contracts::{
        CreateMovieRequest, GetAllMoviesRequest, MovieResponse, MoviesResponse, UpdateMovieRequest,
    },
    error::{AppError, AppResult},
    extract::{JsonBody, PathParam, QueryParams},
    versioning::ApiVersion,
};

#[utoipa::path(
    post,
    path = "/api/movies",
    tag = "movies",
    request_body = CreateMovieRequest,
    responses(
        (status = 201, description = "Movie created", body = MovieResponse),
        (status = 400, description = "Validation failed"),
        (status = 401), (status = 403),
    )
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    TrustedMember(_): TrustedMember,
    JsonBody(req): JsonBody<CreateMovieRequest>,
) -> AppResult<impl IntoResponse> {
    let movie = req.into_movie();
    state.movies.create(&movie).await?;
    state.cache.evict_by_tag(MOVIES_TAG).await;

    let location = format!("/api/movies/{}", movie.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(MovieResponse::from(movie))))
}

#[utoipa::path(
    get,
    path = "/api/movies/{id}",
    tag = "movies",
    params(("id" = String, Path, description = "Movie id or slug")),
    responses(
        (status = 200, body = MovieResponse),
        (status = 404, description = "No movie with that id or slug"),
    )
)]
pub async fn get(
    State(state): State<Arc<AppState>>,
    version: ApiVersion,
    user: MaybeUser,
    PathParam(id_or_slug): PathParam<String>,
) -> AppResult<Response> {
    let key = cache_key(version, &user, || format!("movies:item:{id_or_slug}"));
    if let Some(hit) = cached(&state, key.as_deref()).await {
        return Ok(hit);
    }

    let movie = match Uuid::parse_str(&id_or_slug) {
        Ok(id) => state.movies.get_by_id(id, user.user_id()).await?,
        Err(_) => state.movies.get_by_slug(&id_or_slug, user.user_id()).await?,
    };
    let movie = movie.ok_or(AppError::NotFound("movie"))?;

    respond_json(&state, key, &MovieResponse::from(movie)).await
}

#[utoipa::path(
    get,
    path = "/api/movies",
    tag = "movies",
    params(GetAllMoviesRequest),
    responses(
        (status = 200, body = MoviesResponse),
        (status = 400, description = "Invalid filter, sort or paging options"),
    )
)]
pub async fn get_all(
    State(state): State<Arc<AppState>>,
    version: ApiVersion,
    user: MaybeUser,
    QueryParams(req): QueryParams<GetAllMoviesRequest>,
) -> AppResult<Response> {
    let key = cache_key(version, &user, || list_key(&req));
    if let Some(hit) = cached(&state, key.as_deref()).await {
        return Ok(hit);
    }

    let options = req.into_options(user.user_id());
    let movies = state.movies.get_all(&options).await?;
    let total =
        state.movies.get_count(options.title.as_deref(), options.year_of_release).await?;

    let body = MoviesResponse::new(movies, options.page, options.page_size, total);
    respond_json(&state, key, &body).await
}

#[utoipa::path(
    put,
    path = "/api/movies/{id}",
    tag = "movies",
    params(("id" = Uuid, Path)),
    request_body = UpdateMovieRequest,
    responses(
        (status = 200, body = MovieResponse),
        (status = 400), (status = 401), (status = 403), (status = 404),
    )
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    TrustedMember(principal): TrustedMember,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateMovieRequest>,
) -> AppResult<Json<MovieResponse>> {
    let movie = state
        .movies
        .update(req.into_movie(id), principal.user_id)
        .await?
        .ok_or(AppError::NotFound("movie"))?;
    state.cache.evict_by_tag(MOVIES_TAG).await;

    Ok(Json(movie.into()))
}

#[utoipa::path(
    delete,
    path = "/api/movies/{id}",
    tag = "movies",
    params(("id" = Uuid, Path)),
    responses((status = 200), (status = 401), (status = 403), (status = 404))
)]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Admin(_): Admin,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<StatusCode> {
    if !state.movies.delete_by_id(id).await? {
        return Err(AppError::NotFound("movie"));
    }
    state.cache.evict_by_tag(MOVIES_TAG).await;
    Ok(StatusCode::OK)
}

/// Varies by every query parameter the list honors.
fn list_key(req: &GetAllMoviesRequest) -> String {
    fn part<T: Display>(value: &Option<T>) -> String {
        value.as_ref().map(ToString::to_string).unwrap_or_default()
    }
    format!(
        "movies:list:title={}&year={}&sortBy={}&page={}&pageSize={}",
        part(&req.title),
        part(&req.year),
        part(&req.sort_by),
        part(&req.page),
        part(&req.page_size),
    )
}
