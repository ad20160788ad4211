use axum::{
    extract::FromRequestParts,
    http::{HeaderName, HeaderValue, header::ACCEPT, request::Parts},
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::AppError;

pub const VERSION_PARAM: &str = "api-version";
pub const SUPPORTED_VERSIONS_HEADER: &str = "api-supported-versions";

/// API version requested through the `api-version` media type parameter of `Accept`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ApiVersion {
    #[default]
    V1,
    V2,
}

impl ApiVersion {
    pub const SUPPORTED: &'static str = "1.0, 2.0";

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().trim_matches('"') {
            "1" | "1.0" => Some(ApiVersion::V1),
            "2" | "2.0" => Some(ApiVersion::V2),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V1 => "1.0",
            ApiVersion::V2 => "2.0",
        }
    }

    /// Version 2.0 of the read endpoints is served through the output cache.
    pub fn uses_output_cache(self) -> bool {
        self == ApiVersion::V2
    }

    pub fn from_accept(accept: Option<&str>) -> Result<Self, AppError> {
        let Some(requested) = accept.and_then(requested_version) else {
            return Ok(ApiVersion::default());
        };
        Self::parse(requested).ok_or_else(|| AppError::UnsupportedApiVersion(requested.to_string()))
    }
}

fn requested_version(accept: &str) -> Option<&str> {
    accept
        .split(',')
        .flat_map(|media_type| media_type.split(';').skip(1))
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case(VERSION_PARAM))
        .map(|(_, value)| value.trim())
}

impl<S: Send + Sync> FromRequestParts<S> for ApiVersion {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts.headers.get(ACCEPT).and_then(|v| v.to_str().ok());
        Self::from_accept(accept)
    }
}

pub fn report_versions_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static(SUPPORTED_VERSIONS_HEADER),
        HeaderValue::from_static(ApiVersion::SUPPORTED),
    )
}
