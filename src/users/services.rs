use tracing::{info, warn};

use crate::{
    auth::password::hash_password_blocking,
    error::{AppError, Result},
    users::{
        dto::SignupRequest,
        repo::{UserLookup, UserStore},
        repo_types::{NewUser, User},
        validation::{validate, FieldErrors, SIGNUP_CHECKS},
    },
};

pub const CONFLICT_MESSAGE: &str = "Email or username is already in use.";

/// Validates the request, rejects taken identifiers, hashes the password and
/// stores the new account.
///
/// The duplicate check and the insert are not one transaction; a concurrent
/// signup with the same identifiers fails at insert time with
/// `StoreError::Uniqueness`.
pub async fn register_user(users: &dyn UserStore, payload: SignupRequest) -> Result<User> {
    validate(SIGNUP_CHECKS, &payload).map_err(|errors| {
        warn!(%errors, "signup rejected by validation");
        AppError::Validation(errors)
    })?;

    let SignupRequest {
        email,
        username,
        password,
        first_name,
        last_name,
    } = payload;
    let email = email.unwrap_or_default();
    let username = username.unwrap_or_default();
    let password = password.unwrap_or_default();

    let existing = users
        .find_one(UserLookup::EmailOrUsername {
            email: &email,
            username: &username,
        })
        .await?;
    if let Some(existing) = existing {
        warn!(existing_id = existing.id, "email or username already registered");
        return Err(AppError::Conflict(FieldErrors::single(
            "email",
            CONFLICT_MESSAGE,
        )));
    }

    let hashed_password = hash_password_blocking(password).await?;

    let user = users
        .create(NewUser {
            username,
            email,
            hashed_password,
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
        })
        .await?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}
