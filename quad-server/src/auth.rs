//! Session tokens and request extractors.
//!
//! Tokens are HMAC-SHA256 signed JSON claims: `base64url(claims).base64url(mac)`.
//! Verification is constant time via the mac comparison in the `hmac` crate.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use quad_store::models::Role;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{error::ApiError, state::AppState};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub role: Role,
    /// Expiry as epoch seconds.
    pub exp: i64,
}

pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, ApiError> {
    let payload = serde_json::to_vec(claims).map_err(|err| {
        ApiError::Store(quad_store::StoreError::Other {
            message: format!("failed to encode claims: {err}").into(),
        })
    })?;
    let encoded = URL_SAFE_NO_PAD.encode(&payload);
    let mac = sign(encoded.as_bytes(), secret);
    Ok(format!("{encoded}.{mac}"))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let (encoded, mac) = token.split_once('.').ok_or(ApiError::Unauthorized)?;

    let mut verifier = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| ApiError::Unauthorized)?;
    verifier.update(encoded.as_bytes());
    let given = URL_SAFE_NO_PAD.decode(mac).map_err(|_| ApiError::Unauthorized)?;
    verifier.verify_slice(&given).map_err(|_| ApiError::Unauthorized)?;

    let payload = URL_SAFE_NO_PAD.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| ApiError::Unauthorized)?;
    if claims.exp <= Utc::now().timestamp() {
        return Err(ApiError::Unauthorized);
    }
    Ok(claims)
}

fn sign(data: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(data);
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

fn bearer_claims(parts: &Parts, state: &AppState) -> Result<Claims, ApiError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;
    verify_token(token, &state.config.token_secret)
}

/// Extractor for routes requiring a signed-in user.
pub struct AuthSession(pub Claims);

impl FromRequestParts<Arc<AppState>> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer_claims(parts, state)?))
    }
}

/// Name of the cookie that additionally gates back-office routes. Its value
/// is a session token for the same admin user.
pub const ADMIN_COOKIE: &str = "quad_admin";

fn cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    let header = parts.headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Extractor for back-office routes. The bearer token must carry the admin
/// role, and the admin cookie must hold a matching admin token.
pub struct AdminSession(pub Claims);

impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)?;
        if claims.role != Role::Admin {
            return Err(ApiError::Forbidden);
        }

        let cookie = cookie_value(parts, ADMIN_COOKIE).ok_or(ApiError::Forbidden)?;
        let cookie_claims = verify_token(cookie, &state.config.token_secret).map_err(|_| ApiError::Forbidden)?;
        if cookie_claims.role != Role::Admin || cookie_claims.user_id != claims.user_id {
            return Err(ApiError::Forbidden);
        }
        Ok(Self(claims))
    }
}
