//! Authentication middleware
//!
//! Verifies bearer tokens issued by the identity provider. The token subject
//! is the farmer id; nothing else in the token is trusted.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shared::FarmerId;

use crate::config::AuthConfig;
use crate::error::ErrorResponse;
use crate::AppState;

/// Authenticated farmer extracted from the access token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub farmer_id: FarmerId,
    pub email: Option<String>,
}

/// Access token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub aud: String,
    pub exp: i64,
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if !token.trim().is_empty() => token.trim(),
        _ => return unauthorized_response("Missing or invalid Authorization header"),
    };

    let auth_user = match verify_token(token, &state.config.auth) {
        Ok(user) => user,
        Err(msg) => {
            tracing::debug!("Rejected access token: {}", msg);
            return unauthorized_response(&msg);
        }
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// Decode and validate an access token
pub fn verify_token(token: &str, config: &AuthConfig) -> Result<AuthUser, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.audience.as_str()]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))?;

    if claims.sub.trim().is_empty() {
        return Err("Token has no subject".to_string());
    }

    Ok(AuthUser {
        farmer_id: FarmerId::new(claims.sub),
        email: claims.email,
    })
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse::new("UNAUTHORIZED", message, None);
    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current farmer
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

impl CurrentUser {
    pub fn farmer_id(&self) -> &FarmerId {
        &self.0.farmer_id
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse::new(
                        "UNAUTHORIZED",
                        "Authentication required",
                        None,
                    )),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            audience: "authenticated".to_string(),
        }
    }

    fn token(sub: &str, aud: &str, secret: &str, exp_offset: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            email: Some("farmer@example.com".to_string()),
            aud: aud.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_farmer() {
        let user = verify_token(
            &token("farmer-123", "authenticated", "test-secret", 3600),
            &auth_config(),
        )
        .unwrap();
        assert_eq!(user.farmer_id.as_str(), "farmer-123");
        assert_eq!(user.email.as_deref(), Some("farmer@example.com"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let result = verify_token(
            &token("farmer-123", "authenticated", "other-secret", 3600),
            &auth_config(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let result = verify_token(
            &token("farmer-123", "anon", "test-secret", 3600),
            &auth_config(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let result = verify_token(
            &token("farmer-123", "authenticated", "test-secret", -3600),
            &auth_config(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_subject_rejected() {
        let result = verify_token(&token("", "authenticated", "test-secret", 3600), &auth_config());
        assert!(result.is_err());
    }
}
