//! Account lifecycle: register, login, logout, token refresh, password change
//! and the per-user watch history.

use axum::{
    extract::{Multipart, Query, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{ApiError, ApiResult};
use super::metrics::record_login_attempt;
use super::pagination::PageQuery;
use super::response::ApiResponse;
use super::session::{Session, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use super::state::{GuardedStore, ServerState};
use crate::blob::BlobKind;
use crate::store::models::{NewUser, UserProfile, Video};
use crate::user::auth::{
    AuthToken, AuthTokenValue, PasswordCredentials, ACCESS_TOKEN_TTL_SECS,
    REFRESH_TOKEN_TTL_SECS,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    username: Option<String>,
    email: Option<String>,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody {
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordBody {
    old_password: String,
    new_password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionData {
    user: UserProfile,
    access_token: String,
    refresh_token: String,
}

fn auth_cookie(name: &'static str, value: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1))
        .build()
}

/// Mints a fresh access token row and rotates the single-slot refresh token.
fn mint_session(store: &GuardedStore, user_id: usize) -> anyhow::Result<(AuthToken, String)> {
    let now = chrono::Utc::now().timestamp();
    let access = AuthToken {
        user_id,
        value: AuthTokenValue::generate(),
        created: now,
        expires: now + ACCESS_TOKEN_TTL_SECS,
    };
    store.add_auth_token(&access)?;

    let refresh = AuthTokenValue::generate().0;
    store.set_refresh_token(user_id, Some(&refresh))?;

    Ok((access, refresh))
}

fn session_cookies(jar: CookieJar, access: &AuthToken, refresh: &str) -> CookieJar {
    jar.add(auth_cookie(
        ACCESS_TOKEN_COOKIE,
        access.value.0.clone(),
        ACCESS_TOKEN_TTL_SECS,
    ))
    .add(auth_cookie(
        REFRESH_TOKEN_COOKIE,
        refresh.to_string(),
        REFRESH_TOKEN_TTL_SECS,
    ))
}

async fn register(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> ApiResult<ApiResponse<UserProfile>> {
    let mut username: Option<String> = None;
    let mut email: Option<String> = None;
    let mut fullname: Option<String> = None;
    let mut password: Option<String> = None;
    let mut avatar: Option<Vec<u8>> = None;
    let mut cover_image: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::Validation("Failed to read multipart field".to_string()))?;

        match field_name.as_str() {
            "username" => username = Some(String::from_utf8_lossy(&bytes).trim().to_lowercase()),
            "email" => email = Some(String::from_utf8_lossy(&bytes).trim().to_string()),
            "fullName" => fullname = Some(String::from_utf8_lossy(&bytes).trim().to_string()),
            "password" => password = Some(String::from_utf8_lossy(&bytes).to_string()),
            "avatar" => avatar = Some(bytes.to_vec()),
            "coverImage" => cover_image = Some(bytes.to_vec()),
            _ => {}
        }
    }

    let username = match username {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ApiError::Validation("username is required".to_string())),
    };
    let email = match email {
        Some(v) if v.contains('@') => v,
        _ => return Err(ApiError::Validation("a valid email is required".to_string())),
    };
    let fullname = match fullname {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ApiError::Validation("fullName is required".to_string())),
    };
    let password = match password {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ApiError::Validation("password is required".to_string())),
    };
    let avatar = match avatar {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ApiError::Validation("avatar image is required".to_string())),
    };

    if state.store.username_exists(&username)? {
        return Err(ApiError::Conflict("username is already taken".to_string()));
    }
    if state.store.email_exists(&email)? {
        return Err(ApiError::Conflict("email is already registered".to_string()));
    }

    // Blobs are stored before the user row so a failed upload creates nothing.
    let avatar_blob = state
        .blobs
        .store(BlobKind::Image, &avatar)
        .map_err(|err| ApiError::Validation(err.to_string()))?;
    let cover_image_url = match cover_image {
        Some(bytes) if !bytes.is_empty() => {
            let blob = state.blobs.store(BlobKind::Image, &bytes).map_err(|err| {
                let _ = state.blobs.delete(&avatar_blob.url);
                ApiError::Validation(err.to_string())
            })?;
            Some(blob.url)
        }
        _ => None,
    };

    // A duplicate can still slip in between the pre-checks and the insert;
    // the unique constraint catches it, and the stored blobs must not leak.
    let discard_blobs = |state: &ServerState| {
        let _ = state.blobs.delete(&avatar_blob.url);
        if let Some(url) = &cover_image_url {
            let _ = state.blobs.delete(url);
        }
    };
    let user_id = match state.store.create_user(&NewUser {
        username: username.clone(),
        email,
        fullname,
        avatar_url: avatar_blob.url.clone(),
        cover_image_url: cover_image_url.clone(),
    }) {
        Ok(Some(id)) => id,
        Ok(None) => {
            discard_blobs(&state);
            return Err(ApiError::Conflict(
                "username or email is already taken".to_string(),
            ));
        }
        Err(err) => {
            discard_blobs(&state);
            return Err(err.into());
        }
    };
    let credentials = PasswordCredentials::from_plain(user_id, &password)?;
    state.store.set_password_credentials(&credentials)?;

    info!("Registered user {} (id={})", username, user_id);
    let user = state
        .store
        .get_user(user_id)?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user vanished after insert")))?;
    Ok(ApiResponse::created(
        "User registered",
        UserProfile::from(&user),
    ))
}

async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> ApiResult<(CookieJar, ApiResponse<SessionData>)> {
    let login = body
        .username
        .or(body.email)
        .ok_or_else(|| ApiError::Validation("username or email is required".to_string()))?;

    let unauthorized = || {
        record_login_attempt("failure");
        ApiError::Unauthorized("Invalid credentials".to_string())
    };

    let user = state
        .store
        .find_user_by_login(&login)?
        .ok_or_else(unauthorized)?;
    let credentials = state
        .store
        .get_password_credentials(user.id)?
        .ok_or_else(unauthorized)?;
    if !credentials.verify(&body.password) {
        return Err(unauthorized());
    }

    let (access, refresh) = mint_session(&state.store, user.id)?;
    record_login_attempt("success");
    debug!("User {} logged in", user.id);

    let jar = session_cookies(jar, &access, &refresh);
    Ok((
        jar,
        ApiResponse::ok(
            "Logged in",
            SessionData {
                user: UserProfile::from(&user),
                access_token: access.value.0,
                refresh_token: refresh,
            },
        ),
    ))
}

async fn logout(
    State(store): State<GuardedStore>,
    jar: CookieJar,
    session: Session,
) -> ApiResult<(CookieJar, ApiResponse<()>)> {
    store.delete_auth_token(&session.token)?;
    store.set_refresh_token(session.user_id, None)?;

    let jar = jar
        .add(expired_cookie(ACCESS_TOKEN_COOKIE))
        .add(expired_cookie(REFRESH_TOKEN_COOKIE));
    Ok((jar, ApiResponse::ok("Logged out", ())))
}

async fn refresh_token(
    State(state): State<ServerState>,
    jar: CookieJar,
    body: Option<Json<RefreshBody>>,
) -> ApiResult<(CookieJar, ApiResponse<SessionData>)> {
    let incoming = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .or(body.map(|Json(b)| b.refresh_token))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Refresh token is required".to_string()))?;

    let user = state
        .store
        .find_user_by_refresh_token(&incoming)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

    // Rotation: old access tokens and the old refresh token all die here.
    state.store.delete_user_auth_tokens(user.id)?;
    let (access, refresh) = mint_session(&state.store, user.id)?;
    debug!("Refreshed session for user {}", user.id);

    let jar = session_cookies(jar, &access, &refresh);
    Ok((
        jar,
        ApiResponse::ok(
            "Session refreshed",
            SessionData {
                user: UserProfile::from(&user),
                access_token: access.value.0,
                refresh_token: refresh,
            },
        ),
    ))
}

async fn me(
    State(store): State<GuardedStore>,
    session: Session,
) -> ApiResult<ApiResponse<UserProfile>> {
    let user = store
        .get_user(session.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(ApiResponse::ok("Current user", UserProfile::from(&user)))
}

async fn change_password(
    State(store): State<GuardedStore>,
    session: Session,
    Json(body): Json<ChangePasswordBody>,
) -> ApiResult<ApiResponse<()>> {
    if body.new_password.is_empty() {
        return Err(ApiError::Validation("newPassword is required".to_string()));
    }
    let credentials = store
        .get_password_credentials(session.user_id)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;
    if !credentials.verify(&body.old_password) {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let new_credentials = PasswordCredentials::from_plain(session.user_id, &body.new_password)?;
    store.set_password_credentials(&new_credentials)?;
    Ok(ApiResponse::ok("Password changed", ()))
}

async fn watch_history(
    State(store): State<GuardedStore>,
    session: Session,
    Query(page): Query<PageQuery>,
) -> ApiResult<ApiResponse<Vec<Video>>> {
    let (page, limit) = page.clamped();
    let history = store.get_watch_history(session.user_id, page, limit)?;
    Ok(ApiResponse::ok("Watch history", history))
}

pub fn user_routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh-token", post(refresh_token))
        .route("/me", get(me))
        .route("/change-password", post(change_password))
        .route("/history", get(watch_history))
}
