#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use movies_api::{AppState, cache::OutputCache, config::Config, db};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_KEY: &str = "integration-tests-signing-key";
pub const ISSUER: &str = "https://id.movies.test";
pub const AUDIENCE: &str = "https://movies.test";
pub const API_KEY: &str = "d8566de3-b1a6-4a9b-b842-8e3887a82e42";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    _dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_in("development").await
}

pub async fn spawn_app_in(environment: &str) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let database_url = format!("sqlite://{}?mode=rwc", dir.path().join("movies.db").display());

    let vars = HashMap::from([
        ("DATABASE_URL", database_url),
        ("JWT_KEY", JWT_KEY.to_string()),
        ("JWT_ISSUER", ISSUER.to_string()),
        ("JWT_AUDIENCE", AUDIENCE.to_string()),
        ("API_KEY", API_KEY.to_string()),
        ("APP_ENV", environment.to_string()),
    ]);
    let config = Arc::new(Config::from_lookup(|key| vars.get(key).cloned()).unwrap());

    let db = db::connect_and_migrate(&config.database_url).await.unwrap();
    let cache = OutputCache::memory(Duration::from_secs(60));
    let state = Arc::new(AppState::new(config, db, cache));

    TestApp { router: movies_api::app(state.clone()), state, _dir: dir }
}

pub fn token(mut claims: Value) -> String {
    claims["exp"] = json!(jiff::Timestamp::now().as_second() + 3600);
    claims["iss"] = json!(ISSUER);
    claims["aud"] = json!(AUDIENCE);
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_KEY.as_bytes())).unwrap()
}

pub fn user_token(user: Uuid) -> String {
    token(json!({ "userid": user.to_string() }))
}

pub fn member_token(user: Uuid) -> String {
    token(json!({ "userid": user.to_string(), "trusted_member": "true" }))
}

pub fn admin_token(user: Uuid) -> String {
    token(json!({ "userid": user.to_string(), "admin": true }))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct Call {
    builder: axum::http::request::Builder,
    body: Option<Value>,
}

impl Call {
    pub fn new(method: Method, uri: &str) -> Self {
        Self { builder: Request::builder().method(method).uri(uri), body: None }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.builder = self.builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    pub fn version(self, version: &str) -> Self {
        self.header("accept", &format!("application/json;api-version={version}"))
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub async fn send(self, app: &TestApp) -> TestResponse {
        let request = match self.body {
            Some(body) => self
                .builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => self.builder.body(Body::empty()).unwrap(),
        };

        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, headers, body }
    }
}

pub fn movie(title: &str, year: i32, genres: &[&str]) -> Value {
    json!({ "title": title, "yearOfRelease": year, "genres": genres })
}

/// Creates a movie through the API and returns its id.
pub async fn create_movie(app: &TestApp, body: Value) -> Uuid {
    let response = Call::new(Method::POST, "/api/movies")
        .bearer(&member_token(Uuid::new_v4()))
        .json(body)
        .send(app)
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["id"].as_str().unwrap().parse().unwrap()
}
