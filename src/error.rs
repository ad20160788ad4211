use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use sea_orm::SqlErr;
use serde::Serialize;

use crate::validation::ValidationErrors;

static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Include internal error messages in 500 responses. Set once at startup for development.
pub fn expose_details(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("one or more validation errors occurred")]
    Validation(ValidationErrors),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("not allowed to perform this action")]
    Forbidden,

    #[error("unsupported api version '{0}'")]
    UnsupportedApiVersion(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnsupportedApiVersion(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        let field = rejected_field(&text).unwrap_or("body").to_string();
        Self::Validation(ValidationErrors::single(&field, text))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        let text = rejection.body_text();
        let field = rejected_field(&text).unwrap_or("query").to_string();
        Self::Validation(ValidationErrors::single(&field, text))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(ValidationErrors::single("id", rejection.body_text()))
    }
}

/// Field named by a deserialization message such as
/// `...target type: rating: invalid type` or `...: missing field `title``.
fn rejected_field(text: &str) -> Option<&str> {
    let (_, detail) = text.split_once(": ")?;
    if let Some((_, rest)) = detail.split_once("missing field `") {
        return rest.split('`').next();
    }
    let (path, _) = detail.split_once(": ")?;
    (!path.is_empty() && path != "." && !path.contains(' ')).then_some(path)
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::Conflict("This movie already exists in the system".to_string())
            },
            _ => Self::Internal(anyhow::Error::new(err)),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProblemDetails<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    title: &'a str,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a ValidationErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (kind, title) = match &self {
            AppError::Validation(_) => (
                "https://tools.ietf.org/html/rfc9110#section-15.5.1",
                "One or more validation errors occurred.",
            ),
            AppError::UnsupportedApiVersion(_) => {
                ("https://tools.ietf.org/html/rfc9110#section-15.5.1", "Unsupported API version")
            },
            AppError::NotFound(_) => {
                ("https://tools.ietf.org/html/rfc9110#section-15.5.5", "Not Found")
            },
            AppError::Conflict(_) => {
                ("https://tools.ietf.org/html/rfc9110#section-15.5.10", "Conflict")
            },
            AppError::Unauthorized => {
                ("https://tools.ietf.org/html/rfc9110#section-15.5.2", "Unauthorized")
            },
            AppError::Forbidden => {
                ("https://tools.ietf.org/html/rfc9110#section-15.5.4", "Forbidden")
            },
            AppError::Internal(_) => (
                "https://tools.ietf.org/html/rfc9110#section-15.6.1",
                "An error occurred while processing your request.",
            ),
        };

        let detail = match &self {
            AppError::Validation(_) | AppError::Unauthorized | AppError::Forbidden => None,
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "request failed");
                EXPOSE_DETAILS.load(Ordering::Relaxed).then(|| format!("{err:#}"))
            },
            other => Some(other.to_string()),
        };

        let errors = match &self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        };

        let body = ProblemDetails { kind, title, status: status.as_u16(), detail, errors };
        let mut resp = (status, Json(body)).into_response();
        resp.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/problem+json"));
        resp
    }
}

pub type AppResult<T> = Result<T, AppError>;
