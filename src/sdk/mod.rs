//! Typed client for the movies API, for consumers written in Rust.

mod client;
mod token;

pub use client::MoviesApiClient;
pub use token::{AuthTokenProvider, HttpTokenFetcher, TokenFetcher, TokenRequest};
