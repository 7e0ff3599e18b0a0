pub mod app;
pub mod auth;
pub mod config;
pub mod entity;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod permission;
pub mod session;
pub mod store;

pub use app::{app, AppState};
pub use config::AppConfig;
pub use error::ApiError;
