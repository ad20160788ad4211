pub mod auth;
pub mod cache;
pub mod config;
pub mod contracts;
pub mod db;
pub mod entities;
pub mod error;
pub mod extract;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod sdk;
pub mod services;
pub mod validation;
pub mod versioning;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;

use crate::{
    auth::JwtAuth,
    cache::OutputCache,
    config::Config,
    repositories::{MovieRepository, RatingRepository},
    services::{MovieService, RatingService},
};

pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
    pub cache: OutputCache,
    pub auth: JwtAuth,
    pub movies: MovieService,
    pub ratings: RatingService,
}

impl AppState {
    pub fn new(config: Arc<Config>, db: DatabaseConnection, cache: OutputCache) -> Self {
        let movie_repo = MovieRepository::new(db.clone());
        let rating_repo = RatingRepository::new(db.clone());

        Self {
            auth: JwtAuth::new(&config.jwt, config.api_key),
            movies: MovieService::new(movie_repo.clone(), rating_repo.clone()),
            ratings: RatingService::new(rating_repo, movie_repo),
            config,
            db,
            cache,
        }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    routes::router(state)
}
