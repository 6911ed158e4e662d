use serde::{Deserialize, Serialize};

use crate::users::{repo_types::SafeUser, validation::FieldSource};

/// Body of `POST /api/users`. Every field is optional on the wire so that
/// missing values surface as validation messages instead of a parse error.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

impl FieldSource for SignupRequest {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "email" => self.email.as_deref(),
            "username" => self.username.as_deref(),
            "password" => self.password.as_deref(),
            "firstName" => self.first_name.as_deref(),
            "lastName" => self.last_name.as_deref(),
            _ => None,
        }
    }
}

/// `{ "user": ... }` returned after signup and login.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: SafeUser,
}
