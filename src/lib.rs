//! User accounts service: signup, login and cookie-based sessions over axum
//! and Postgres.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod state;
pub mod users;

pub use app::build_app;
pub use state::AppState;
