pub mod app;
pub mod auth;
pub mod config;
pub mod crud;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod todo;

pub use app::{app, AppState};
pub use config::AppConfig;
pub use error::ApiError;

#[cfg(test)]
pub mod testing;
