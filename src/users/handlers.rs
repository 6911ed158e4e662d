use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use crate::{
    auth::jwt::JwtKeys,
    error::Result,
    extract::JsonOrForm,
    state::AppState,
    users::{dto::{SignupRequest, UserResponse}, services::register_user},
};

pub fn signup_routes() -> Router<AppState> {
    Router::new().route("/users", post(sign_up))
}

/// POST /users: create the account and sign the new user in.
#[instrument(skip(state, jar, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonOrForm(payload): JsonOrForm<SignupRequest>,
) -> Result<(CookieJar, Json<UserResponse>)> {
    let user = register_user(state.users.as_ref(), payload).await?;
    let safe_user = user.to_safe_user();

    let keys = JwtKeys::from_ref(&state);
    let jar = keys.set_token_cookie(jar, &safe_user)?;

    Ok((jar, Json(UserResponse { user: safe_user })))
}
