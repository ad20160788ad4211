use std::sync::Arc;

use reqwest::{Method, RequestBuilder, header::ACCEPT};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::token::{AuthTokenProvider, HttpTokenFetcher, TokenFetcher};
use crate::{
    contracts::{
        CreateMovieRequest, GetAllMoviesRequest, MovieRatingResponse, MovieResponse, MoviesResponse,
        RateMovieRequest, UpdateMovieRequest,
    },
    versioning::{ApiVersion, VERSION_PARAM},
};

pub struct MoviesApiClient<F = HttpTokenFetcher> {
    http: reqwest::Client,
    base_url: String,
    version: ApiVersion,
    tokens: Arc<AuthTokenProvider<F>>,
}

impl<F: TokenFetcher> MoviesApiClient<F> {
    pub fn new(http: reqwest::Client, base_url: &str, tokens: Arc<AuthTokenProvider<F>>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            version: ApiVersion::default(),
            tokens,
        }
    }

    pub fn with_version(mut self, version: ApiVersion) -> Self {
        self.version = version;
        self
    }

    pub async fn get_movie(&self, id_or_slug: &str) -> anyhow::Result<MovieResponse> {
        let req = self.request(Method::GET, &format!("/api/movies/{id_or_slug}")).await?;
        read_json(req).await
    }

    pub async fn get_movies(
        &self,
        request: &GetAllMoviesRequest,
    ) -> anyhow::Result<MoviesResponse> {
        let req = self.request(Method::GET, "/api/movies").await?.query(request);
        read_json(req).await
    }

    pub async fn create_movie(
        &self,
        request: &CreateMovieRequest,
    ) -> anyhow::Result<MovieResponse> {
        let req = self.request(Method::POST, "/api/movies").await?.json(request);
        read_json(req).await
    }

    pub async fn update_movie(
        &self,
        id: Uuid,
        request: &UpdateMovieRequest,
    ) -> anyhow::Result<MovieResponse> {
        let req = self.request(Method::PUT, &format!("/api/movies/{id}")).await?.json(request);
        read_json(req).await
    }

    pub async fn delete_movie(&self, id: Uuid) -> anyhow::Result<()> {
        let req = self.request(Method::DELETE, &format!("/api/movies/{id}")).await?;
        req.send().await?.error_for_status()?;
        Ok(())
    }

    pub async fn get_user_ratings(&self) -> anyhow::Result<Vec<MovieRatingResponse>> {
        let req = self.request(Method::GET, "/api/ratings/me").await?;
        read_json(req).await
    }

    pub async fn rate_movie(&self, id: Uuid, rating: i32) -> anyhow::Result<()> {
        let req = self
            .request(Method::PUT, &format!("/api/movies/{id}/ratings"))
            .await?
            .json(&RateMovieRequest { rating });
        req.send().await?.error_for_status()?;
        Ok(())
    }

    pub async fn delete_rating(&self, id: Uuid) -> anyhow::Result<()> {
        let req = self.request(Method::DELETE, &format!("/api/movies/{id}/ratings")).await?;
        req.send().await?.error_for_status()?;
        Ok(())
    }

    async fn request(&self, method: Method, path: &str) -> anyhow::Result<RequestBuilder> {
        let token = self.tokens.token().await?;
        let accept = format!("application/json;{VERSION_PARAM}={}", self.version.as_str());
        Ok(self
            .http
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .header(ACCEPT, accept))
    }
}

async fn read_json<T: DeserializeOwned>(req: RequestBuilder) -> anyhow::Result<T> {
    Ok(req.send().await?.error_for_status()?.json().await?)
}
