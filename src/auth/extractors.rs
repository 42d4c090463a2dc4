use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use tracing::warn;
use uuid::Uuid;

use super::{claims::Role, jwt::JwtKeys};
use crate::error::ApiError;

/// Caller identity decoded from a valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("Missing Authorization header")]
    MissingCredential,
    #[error("Invalid token")]
    InvalidCredential,
    #[error("Forbidden: requires role {required}")]
    Forbidden { required: Role, actual: Role },
}

impl From<GateError> for ApiError {
    fn from(e: GateError) -> Self {
        match e {
            GateError::MissingCredential | GateError::InvalidCredential => {
                ApiError::Unauthenticated(e.to_string())
            }
            GateError::Forbidden { .. } => ApiError::Forbidden(e.to_string()),
        }
    }
}

/// Validates the bearer token in `headers` and, if given, enforces `required`.
pub fn authorize(
    headers: &HeaderMap,
    keys: &JwtKeys,
    required: Option<Role>,
) -> Result<Identity, GateError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(GateError::MissingCredential)?;
    let value = header.to_str().map_err(|_| GateError::InvalidCredential)?;

    // Expect "Bearer <token>", scheme case-insensitive
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(GateError::InvalidCredential)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(GateError::InvalidCredential);
    }

    let claims = keys.validate(token.trim()).map_err(|e| {
        warn!(error = %e, "rejected bearer token");
        GateError::InvalidCredential
    })?;

    if let Some(required) = required {
        if claims.role != required {
            warn!(user_id = %claims.user_id, role = %claims.role, %required, "role check failed");
            return Err(GateError::Forbidden {
                required,
                actual: claims.role,
            });
        }
    }

    Ok(Identity {
        user_id: claims.user_id,
        role: claims.role,
    })
}

/// Any authenticated caller.
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        Ok(AuthUser(authorize(&parts.headers, &keys, None)?))
    }
}

/// A caller whose token carries `TEAM_LEADER`.
pub struct TeamLeader(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for TeamLeader
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        Ok(TeamLeader(authorize(
            &parts.headers,
            &keys,
            Some(Role::TeamLeader),
        )?))
    }
}
