use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, LogoutResponse, SessionResponse},
        jwt::{clear_token_cookie, JwtKeys},
        services::{authenticate, restore_user},
    },
    error::Result,
    extract::JsonOrForm,
    state::AppState,
    users::dto::UserResponse,
};

pub fn session_routes() -> Router<AppState> {
    Router::new().route(
        "/session",
        post(login).get(current_session).delete(logout),
    )
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonOrForm(payload): JsonOrForm<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>)> {
    let user = authenticate(state.users.as_ref(), payload).await?;
    let safe_user = user.to_safe_user();

    let keys = JwtKeys::from_ref(&state);
    let jar = keys.set_token_cookie(jar, &safe_user)?;

    Ok((jar, Json(UserResponse { user: safe_user })))
}

#[instrument(skip(state, jar))]
pub async fn current_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let keys = JwtKeys::from_ref(&state);
    let (jar, user) = restore_user(state.users.as_ref(), &keys, jar).await?;
    Ok((
        jar,
        Json(SessionResponse {
            user: user.map(|u| u.to_safe_user()),
        }),
    ))
}

#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    info!("session cleared");
    (
        clear_token_cookie(jar),
        Json(LogoutResponse { message: "success" }),
    )
}
