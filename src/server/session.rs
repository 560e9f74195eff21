use super::error::ApiError;
use super::state::ServerState;
use crate::user::auth::AuthTokenValue;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::debug;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
pub const AUTH_HEADER: &str = "Authorization";

/// An authenticated request: the acting user and the access token it used.
#[derive(Debug)]
pub struct Session {
    pub user_id: usize,
    pub token: AuthTokenValue,
}

async fn token_from_cookies(parts: &mut Parts, ctx: &ServerState) -> Option<String> {
    CookieJar::from_request_parts(parts, ctx)
        .await
        .ok()?
        .get(ACCESS_TOKEN_COOKIE)
        .map(Cookie::value)
        .map(|s| s.to_string())
}

fn token_from_headers(parts: &mut Parts) -> Option<String> {
    let value = parts.headers.get(AUTH_HEADER)?.to_str().ok()?;
    // Both bare tokens and the Bearer scheme are accepted.
    Some(
        value
            .strip_prefix("Bearer ")
            .unwrap_or(value)
            .trim()
            .to_string(),
    )
}

async fn extract_session(parts: &mut Parts, ctx: &ServerState) -> Option<Session> {
    let token = match token_from_cookies(parts, ctx)
        .await
        .or_else(|| token_from_headers(parts))
    {
        Some(token) if !token.is_empty() => token,
        _ => {
            debug!("No access token in cookies nor headers");
            return None;
        }
    };

    let value = AuthTokenValue(token);
    match ctx.store.get_auth_token(&value) {
        Ok(Some(auth_token)) => {
            debug!("Resolved session for user_id={}", auth_token.user_id);
            Some(Session {
                user_id: auth_token.user_id,
                token: auth_token.value,
            })
        }
        Ok(None) => {
            debug!("Unknown or expired access token");
            None
        }
        Err(err) => {
            debug!("Failed to look up access token: {}", err);
            None
        }
    }
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session(parts, ctx)
            .await
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

impl FromRequestParts<ServerState> for Option<Session> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        Ok(extract_session(parts, ctx).await)
    }
}
