use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LOGIN_CHECKS},
        jwt::{clear_token_cookie, JwtKeys, SESSION_COOKIE},
        password::verify_password_blocking,
    },
    error::{AppError, Result},
    users::{
        repo::{UserLookup, UserStore},
        repo_types::User,
        validation::validate,
    },
};

/// Checks a username-or-email plus password against the stored hash.
pub async fn authenticate(users: &dyn UserStore, payload: LoginRequest) -> Result<User> {
    validate(LOGIN_CHECKS, &payload).map_err(|errors| {
        warn!(%errors, "login rejected by validation");
        AppError::Validation(errors)
    })?;

    let credential = payload.credential.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let Some(user) = users
        .find_one(UserLookup::EmailOrUsername {
            email: &credential,
            username: &credential,
        })
        .await?
    else {
        warn!("login for unknown credential");
        return Err(AppError::InvalidCredentials);
    };

    let login_view = user.to_auth_view();
    if !verify_password_blocking(password, login_view.hashed_password).await? {
        warn!(user_id = user.id, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = user.id, "user logged in");
    Ok(user)
}

/// Resolves the session cookie to a live user.
///
/// A cookie that fails verification or names a vanished user is cleared from
/// the returned jar.
pub async fn restore_user(
    users: &dyn UserStore,
    keys: &JwtKeys,
    jar: CookieJar,
) -> Result<(CookieJar, Option<User>)> {
    let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
        return Ok((jar, None));
    };

    let claims = match keys.verify(&token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(error = %e, "invalid or expired session token");
            return Ok((clear_token_cookie(jar), None));
        }
    };

    match users.find_one(UserLookup::Id(claims.data.id)).await? {
        Some(user) => Ok((jar, Some(user))),
        None => {
            warn!(user_id = claims.data.id, "session for missing user");
            Ok((clear_token_cookie(jar), None))
        }
    }
}
