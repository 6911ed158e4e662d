use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::users::validation::{
    chars_between, is_valid_email, not_email, validate, Check, FieldErrors, FieldSource,
};

/// User record in the database.
///
/// Deliberately not `Serialize`: callers pick one of the views below.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub hashed_password: String, // argon2 PHC string
    pub first_name: String,
    pub last_name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields supplied when creating a user; id and timestamps come from the store.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub first_name: String,
    pub last_name: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("hashed_password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

fn is_password_hash(value: &str) -> bool {
    value.starts_with("$argon2")
}

const USER_CHECKS: &[Check] = &[
    Check::required(
        "username",
        &[chars_between::<4, 30>],
        "Username must be between 4 and 30 characters.",
    ),
    Check::optional("username", &[not_email], "Cannot be an email."),
    Check::required(
        "email",
        &[chars_between::<3, 256>],
        "Email must be between 3 and 256 characters.",
    ),
    Check::optional("email", &[is_valid_email], "Email must be a valid email address."),
    Check::required(
        "hashedPassword",
        &[is_password_hash],
        "Hashed password must be an argon2 hash.",
    ),
    Check::required("firstName", &[], "First name is required."),
    Check::required("lastName", &[], "Last name is required."),
];

impl FieldSource for NewUser {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "username" => Some(&self.username),
            "email" => Some(&self.email),
            "hashedPassword" => Some(&self.hashed_password),
            "firstName" => Some(&self.first_name),
            "lastName" => Some(&self.last_name),
            _ => None,
        }
    }
}

impl NewUser {
    /// Model-level rules, enforced by every store before insert.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        validate(USER_CHECKS, self)
    }
}

/// Default view: no hash, no email, no timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Everything except the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithoutPassword {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Every column, hash included. Only for credential checks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The projection handed to clients and embedded in session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    /// Default view for read endpoints that show other users.
    pub fn to_public_view(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }

    /// Profile view for the account owner; no endpoint serves it yet.
    pub fn without_password(&self) -> UserWithoutPassword {
        UserWithoutPassword {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn to_auth_view(&self) -> LoginUser {
        LoginUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            hashed_password: self.hashed_password.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn to_safe_user(&self) -> SafeUser {
        SafeUser {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}
