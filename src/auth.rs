use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;
use crate::user::model::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub exp: i64,
}

/// Identity decoded from a valid token. Inserted into the request extensions
/// by [`require_auth`] and read by protected handlers; it lives only for the
/// duration of the request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
            email: claims.email,
        }
    }
}

/// Signs and verifies identity tokens. HS256 only: tokens presenting any
/// other algorithm are rejected to rule out algorithm substitution.
#[derive(Clone)]
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: Duration,
}

impl TokenManager {
    pub fn new(secret: &str, expiry: std::time::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::from_std(expiry).unwrap_or_else(|_| Duration::hours(24)),
        }
    }

    pub fn sign(&self, user: &User) -> Result<String, AppError> {
        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            exp: (Utc::now() + self.expiry).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized("invalid or expired token".into()))
    }
}

/// Accepts both `Bearer <token>` and a bare token.
fn extract_token(header: &str) -> &str {
    match header.split_once(' ') {
        Some(("Bearer", token)) => token,
        _ => header,
    }
}

/// Gate for protected routes: verifies the bearer credential and attaches the
/// decoded identity to the request, or short-circuits with 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".into()))?;

    let claims = state.tokens.verify(extract_token(header))?;
    req.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(req).await)
}
