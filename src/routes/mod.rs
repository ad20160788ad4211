mod health;
mod movies;
mod openapi;
mod ratings;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    auth::MaybeUser,
    cache::MOVIES_TAG,
    error::{AppError, AppResult},
    versioning::{self, ApiVersion},
};

pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/api/movies", get(movies::get_all).post(movies::create))
        .route(
            "/api/movies/{id}",
            get(movies::get).put(movies::update).delete(movies::delete),
        )
        .route(
            "/api/movies/{id}/ratings",
            put(ratings::rate_movie).delete(ratings::delete_rating),
        )
        .route("/api/ratings/me", get(ratings::get_user_ratings))
        .route("/_health", get(health::health));

    if state.config.is_development() {
        router = router.route("/swagger/{version}/swagger.json", get(openapi::document));
    }

    router
        .with_state(state)
        .layer(versioning::report_versions_layer())
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
}

/// Responses for signed-in callers carry their own rating, so only anonymous ones are shared.
fn cache_key(
    version: ApiVersion,
    user: &MaybeUser,
    key: impl FnOnce() -> String,
) -> Option<String> {
    (version.uses_output_cache() && user.0.is_none()).then(key)
}

async fn cached(state: &AppState, key: Option<&str>) -> Option<Response> {
    let body = state.cache.get(key?).await?;
    Some(json_bytes(body))
}

async fn respond_json<T: Serialize>(
    state: &AppState,
    key: Option<String>,
    value: &T,
) -> AppResult<Response> {
    let body = serde_json::to_vec(value).map_err(|err| AppError::Internal(err.into()))?;
    if let Some(key) = key {
        state.cache.set(&key, &[MOVIES_TAG], body.clone()).await;
    }
    Ok(json_bytes(body))
}

fn json_bytes(body: Vec<u8>) -> Response {
    let mut resp = body.into_response();
    resp.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}
