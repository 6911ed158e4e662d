use serde::{Deserialize, Serialize};

use crate::users::{
    repo_types::SafeUser,
    validation::{Check, FieldSource},
};

/// Body of `POST /api/session`; `credential` is a username or an email.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub credential: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("credential", &self.credential)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl FieldSource for LoginRequest {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "credential" => self.credential.as_deref(),
            "password" => self.password.as_deref(),
            _ => None,
        }
    }
}

pub const LOGIN_CHECKS: &[Check] = &[
    Check::required("credential", &[], "Please provide a valid email or username."),
    Check::required("password", &[], "Please provide a password."),
];

/// Current session; `user` is `null` when nobody is signed in.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<SafeUser>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}
