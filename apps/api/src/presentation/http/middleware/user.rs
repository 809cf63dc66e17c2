use crate::domain::comment::permissions::{Actor, ActorUser};
use axum::http::{HeaderMap, header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
    #[serde(default)]
    pub name: String,
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

pub fn decode_optional_user_claims(headers: &HeaderMap, secret: &str) -> Option<UserClaims> {
    let token = extract_bearer_token(headers)?;
    decode::<UserClaims>(
        &token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|d| d.claims)
}

/// First address of `x-forwarded-for`, else `x-real-ip`.
pub fn extract_client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .and_then(|s| s.parse().ok())
}

/// The request's actor. Missing, invalid or expired tokens yield an
/// anonymous actor.
pub fn resolve_actor(headers: &HeaderMap, secret: &str) -> Actor {
    let ip = extract_client_ip(headers);
    let Some(claims) = decode_optional_user_claims(headers, secret) else {
        return Actor::anonymous(ip);
    };
    let Ok(id) = Uuid::parse_str(&claims.sub) else {
        tracing::warn!(subject = %claims.sub, "token subject is not a user id");
        return Actor::anonymous(ip);
    };
    let display_name = if claims.name.trim().is_empty() {
        claims.email.split('@').next().unwrap_or_default().to_string()
    } else {
        claims.name
    };
    Actor::authenticated(
        ActorUser {
            id,
            display_name,
            email: claims.email,
            role: claims.role,
        },
        ip,
    )
}
