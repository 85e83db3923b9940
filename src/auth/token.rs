use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::config::AuthSettings;

/// Access tokens authenticate requests; refresh tokens can only be exchanged
/// for a new access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    pub username: String,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

/// Sign a token of the given kind for a user.
pub fn issue_token(
    settings: &AuthSettings,
    user_id: i32,
    username: &str,
    kind: TokenKind,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let ttl = match kind {
        TokenKind::Access => Duration::minutes(settings.access_token_ttl_minutes),
        TokenKind::Refresh => Duration::hours(settings.refresh_token_ttl_hours),
    };
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        kind,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    let key = EncodingKey::from_secret(settings.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| AuthError::Signing(e.to_string()))
}

/// Verify signature and expiry of `token` and check it is of the `expected` kind.
pub fn decode_token(settings: &AuthSettings, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(settings.jwt_secret.as_bytes());
    let claims = decode::<Claims>(token, &key, &Validation::default())?.claims;

    if claims.kind != expected {
        return Err(AuthError::WrongTokenKind {
            expected,
            found: claims.kind,
        });
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AuthSettings {
        AuthSettings {
            jwt_secret: "test-secret".to_string(),
            ..AuthSettings::default()
        }
    }

    #[test]
    fn test_access_token_is_accepted() {
        let settings = settings();
        let token = issue_token(&settings, 42, "alice", TokenKind::Access).unwrap();
        let claims = decode_token(&settings, &token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let settings = settings();
        let refresh = issue_token(&settings, 1, "alice", TokenKind::Refresh).unwrap();
        let result = decode_token(&settings, &refresh, TokenKind::Access);
        assert!(matches!(
            result,
            Err(AuthError::WrongTokenKind {
                expected: TokenKind::Access,
                found: TokenKind::Refresh
            })
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token(&settings(), 1, "alice", TokenKind::Access).unwrap();
        let other = AuthSettings {
            jwt_secret: "another-secret".to_string(),
            ..AuthSettings::default()
        };
        assert!(matches!(
            decode_token(&other, &token, TokenKind::Access),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let expired = AuthSettings {
            access_token_ttl_minutes: -10,
            ..settings()
        };
        let token = issue_token(&expired, 1, "alice", TokenKind::Access).unwrap();
        assert!(matches!(
            decode_token(&expired, &token, TokenKind::Access),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
