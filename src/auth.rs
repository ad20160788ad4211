//! Bearer-token authentication and the authorization policies routes ask for.
//!
//! Each policy is an extractor: adding `TrustedMember` or `Admin` to a handler's
//! arguments is what protects the route. Missing or invalid credentials reject
//! with 401, a valid identity that lacks the claim rejects with 403.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::{AppState, config::JwtConfig, error::AppError};

pub const ADMIN_CLAIM: &str = "admin";
pub const TRUSTED_MEMBER_CLAIM: &str = "trusted_member";
pub const USER_ID_CLAIM: &str = "userid";
pub const API_KEY_HEADER: &str = "x-api-key";

/// Identity used for requests authorized through the API key.
pub const API_KEY_USER_ID: Uuid = Uuid::from_u128(0x750e8fd0_39a3_4a5f_8e0c_2819c49ff849);

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    userid: Option<String>,
    #[serde(default)]
    admin: Option<Value>,
    #[serde(default)]
    trusted_member: Option<Value>,
}

/// The authenticated caller.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Principal {
    pub user_id: Option<Uuid>,
    pub admin: bool,
    pub trusted_member: bool,
}

impl Principal {
    pub fn is_trusted_member(&self) -> bool {
        self.admin || self.trusted_member
    }
}

pub struct JwtAuth {
    key: DecodingKey,
    validation: Validation,
    api_key: Uuid,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig, api_key: Uuid) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Self { key: DecodingKey::from_secret(config.key.as_bytes()), validation, api_key }
    }

    pub fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|err| {
            debug!(error = %err, "rejected bearer token");
            AppError::Unauthorized
        })?;
        let claims = data.claims;

        Ok(Principal {
            user_id: claims.userid.as_deref().and_then(|id| Uuid::parse_str(id).ok()),
            admin: is_true(claims.admin.as_ref()),
            trusted_member: is_true(claims.trusted_member.as_ref()),
        })
    }

    fn api_key_matches(&self, headers: &HeaderMap) -> bool {
        headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .is_some_and(|key| key == self.api_key)
    }

    /// `Ok(None)` when no bearer token was sent, `Err` when one was sent but is invalid.
    fn principal(&self, headers: &HeaderMap) -> Result<Option<Principal>, AppError> {
        let Some(header) = headers.get(AUTHORIZATION) else {
            return Ok(None);
        };
        let token = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
            .ok_or(AppError::Unauthorized)?;
        self.authenticate(token.trim()).map(Some)
    }
}

fn is_true(claim: Option<&Value>) -> bool {
    match claim {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Caller identity on public routes; invalid tokens are treated as anonymous.
#[derive(Clone, Debug, Default)]
pub struct MaybeUser(pub Option<Principal>);

impl MaybeUser {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().and_then(|p| p.user_id)
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(state.auth.principal(&parts.headers).unwrap_or(None)))
    }
}

/// Any authenticated caller carrying a `userid` claim.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub principal: Principal,
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let principal = state.auth.principal(&parts.headers)?.ok_or(AppError::Unauthorized)?;
        let user_id = principal.user_id.ok_or(AppError::Unauthorized)?;
        Ok(Self { user_id, principal })
    }
}

/// Requires the `admin` or `trusted_member` claim.
#[derive(Clone, Debug)]
pub struct TrustedMember(pub Principal);

impl FromRequestParts<Arc<AppState>> for TrustedMember {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let principal = state.auth.principal(&parts.headers)?.ok_or(AppError::Unauthorized)?;
        if !principal.is_trusted_member() {
            return Err(AppError::Forbidden);
        }
        Ok(Self(principal))
    }
}

/// Requires the `admin` claim, or a matching `x-api-key` header.
#[derive(Clone, Debug)]
pub struct Admin(pub Principal);

impl FromRequestParts<Arc<AppState>> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let principal = match state.auth.principal(&parts.headers) {
            Ok(Some(principal)) if principal.admin => return Ok(Self(principal)),
            Ok(principal) => principal,
            Err(_) => None,
        };

        if state.auth.api_key_matches(&parts.headers) {
            return Ok(Self(Principal {
                user_id: Some(API_KEY_USER_ID),
                admin: true,
                trusted_member: false,
            }));
        }

        Err(if principal.is_some() { AppError::Forbidden } else { AppError::Unauthorized })
    }
}
