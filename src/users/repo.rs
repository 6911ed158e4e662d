use axum::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::users::repo_types::{NewUser, User};
use crate::users::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("unique constraint violated: {constraint}")]
    Uniqueness { constraint: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Which record `find_one` should return.
#[derive(Debug, Clone, Copy)]
pub enum UserLookup<'a> {
    Id(i64),
    /// Matches when either column equals the given value.
    EmailOrUsername { email: &'a str, username: &'a str },
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_one(&self, lookup: UserLookup<'_>) -> Result<Option<User>, StoreError>;

    /// Validates `new_user`, inserts it and returns the stored row.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;
}

const USER_COLUMNS: &str =
    "id, username, email, hashed_password, first_name, last_name, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("users").to_string();
            warn!(%constraint, "insert hit unique constraint");
            return StoreError::Uniqueness { constraint };
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_one(&self, lookup: UserLookup<'_>) -> Result<Option<User>, StoreError> {
        let user = match lookup {
            UserLookup::Id(id) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
                ))
                .bind(id)
                .fetch_optional(&self.db)
                .await?
            }
            UserLookup::EmailOrUsername { email, username } => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users \
                     WHERE email = $1 OR username = $2 \
                     ORDER BY id LIMIT 1"
                ))
                .bind(email)
                .bind(username)
                .fetch_optional(&self.db)
                .await?
            }
        };
        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        new_user.validate().map_err(StoreError::Validation)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, hashed_password, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.hashed_password)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)?;

        debug!(user_id = user.id, "user row inserted");
        Ok(user)
    }
}

/// Process-local store with the same validation and uniqueness rules as
/// [`PgUserStore`]. Backs `AppState::fake` for tests.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_one(&self, lookup: UserLookup<'_>) -> Result<Option<User>, StoreError> {
        let rows = self.rows.lock().await;
        let found = rows.iter().find(|u| match lookup {
            UserLookup::Id(id) => u.id == id,
            UserLookup::EmailOrUsername { email, username } => {
                u.email == email || u.username == username
            }
        });
        Ok(found.cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        new_user.validate().map_err(StoreError::Validation)?;

        let mut rows = self.rows.lock().await;
        if rows.iter().any(|u| u.username == new_user.username) {
            return Err(StoreError::Uniqueness {
                constraint: "users_username_key".into(),
            });
        }
        if rows.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::Uniqueness {
                constraint: "users_email_key".into(),
            });
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: rows.last().map_or(1, |u| u.id + 1),
            username: new_user.username,
            email: new_user.email,
            hashed_password: new_user.hashed_password,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            created_at: now,
            updated_at: now,
        };
        rows.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            hashed_password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
            first_name: "A".into(),
            last_name: "B".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryUserStore::default();
        let a = store.create(new_user("alice1", "a@b.com")).await.unwrap();
        let b = store.create(new_user("bobby", "b@b.com")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[tokio::test]
    async fn find_one_matches_either_column() {
        let store = MemoryUserStore::default();
        let created = store.create(new_user("alice1", "a@b.com")).await.unwrap();

        let by_email = store
            .find_one(UserLookup::EmailOrUsername { email: "a@b.com", username: "nobody" })
            .await
            .unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(created.id));

        let by_username = store
            .find_one(UserLookup::EmailOrUsername { email: "x@y.com", username: "alice1" })
            .await
            .unwrap();
        assert_eq!(by_username.map(|u| u.id), Some(created.id));

        let by_id = store.find_one(UserLookup::Id(created.id)).await.unwrap();
        assert!(by_id.is_some());

        let none = store
            .find_one(UserLookup::EmailOrUsername { email: "x@y.com", username: "nobody" })
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn create_enforces_unique_username_and_email() {
        let store = MemoryUserStore::default();
        store.create(new_user("alice1", "a@b.com")).await.unwrap();

        let err = store.create(new_user("alice1", "c@d.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Uniqueness { ref constraint } if constraint == "users_username_key"));

        let err = store.create(new_user("carol", "a@b.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Uniqueness { ref constraint } if constraint == "users_email_key"));

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn create_runs_model_validation() {
        let store = MemoryUserStore::default();
        let err = store
            .create(new_user(&"x".repeat(31), "a@b.com"))
            .await
            .unwrap_err();
        match err {
            StoreError::Validation(errors) => assert!(errors.contains("username")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.is_empty().await);
    }
}
