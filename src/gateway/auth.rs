//! Bearer-token identity
//!
//! Tokens are HS256 JWTs whose `sub` is the owner UUID. The middleware only
//! establishes who is calling; the funds core trusts the injected
//! [`AuthenticatedOwner`].

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::AppState;
use super::types::{ApiError, error_codes};
use crate::core_types::OwnerId;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (owner id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

/// Caller identity injected into request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedOwner(pub OwnerId);

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("invalid or expired token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("token subject is not an owner id")]
    BadSubject,
}

pub fn verify_token(secret: &str, token: &str) -> Result<OwnerId, TokenError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    data.claims
        .sub
        .parse()
        .map_err(|_| TokenError::BadSubject)
}

/// Sign a token for `owner`. Only the mock endpoint and tests issue tokens.
#[cfg(any(test, feature = "mock-api"))]
pub fn issue_token(
    secret: &str,
    owner: OwnerId,
    ttl: chrono::Duration,
) -> Result<String, TokenError> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let now = chrono::Utc::now();
    let claims = Claims {
        sub: owner.to_string(),
        exp: (now + ttl).timestamp().max(0) as usize,
        iat: now.timestamp().max(0) as usize,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract Authorization header
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            ApiError::unauthorized(error_codes::MISSING_AUTH, "Missing Authorization header")
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized(error_codes::AUTH_FAILED, "Invalid token format"))?;

    // 2. Verify token
    match verify_token(&state.jwt_secret, token) {
        Ok(owner) => {
            // 3. Inject owner id
            request.extensions_mut().insert(AuthenticatedOwner(owner));
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            Err(ApiError::unauthorized(
                error_codes::AUTH_FAILED,
                "Invalid or expired token",
            ))
        }
    }
}
