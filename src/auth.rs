//! Authentication: password digests, signed bearer tokens and the
//! `AuthUser` extractor that resolves the acting principal of a request.

mod password;
mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKind, decode_token, issue_token};

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use model::entities::user;
use sea_orm::EntityTrait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::schemas::AppState;

/// Error types for credential and token handling
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication credentials were not provided")]
    MissingCredentials,

    #[error("Authorization header must use the Bearer scheme")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Expected a {expected:?} token but got a {found:?} token")]
    WrongTokenKind { expected: TokenKind, found: TokenKind },

    #[error("Token refers to a user that no longer exists")]
    UnknownUser,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Signing(msg) => AppError::Internal(msg),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

/// The authenticated principal of a request.
///
/// Handlers that mutate state take this as an argument; requests without a
/// valid access token are rejected with 401 before the handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
}

impl From<&user::Model> for AuthUser {
    fn from(model: &user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username.clone(),
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = decode_token(&state.auth, token, TokenKind::Access).map_err(|e| {
            warn!("Rejected access token: {}", e);
            e
        })?;

        // The account may have been deleted after the token was issued
        let user = user::Entity::find_by_id(claims.sub)
            .one(&state.db)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        debug!("Authenticated request as user {} ({})", user.id, user.username);
        Ok(AuthUser::from(&user))
    }
}

/// Extract the bearer token from the `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::MalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Err(AuthError::MissingCredentials)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert!(matches!(bearer_token(&headers), Err(AuthError::MalformedHeader)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(bearer_token(&headers), Err(AuthError::MalformedHeader)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_signing_failure_is_internal() {
        let error: AppError = AuthError::Signing("no key".into()).into();
        assert!(matches!(error, AppError::Internal(_)));

        let error: AppError = AuthError::InvalidCredentials.into();
        assert!(matches!(error, AppError::Unauthorized(_)));
    }
}
