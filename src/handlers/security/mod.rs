// handlers/security/mod.rs - session lifecycle for the built-in User type

mod login;
mod logout;

pub use login::login;
pub use logout::logout;

use axum::{routing::post, Router};

use crate::app::AppState;
use crate::handlers::not_found;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login).fallback(not_found))
        .route("/login/", post(login).fallback(not_found))
        .route("/logout", post(logout).fallback(not_found))
        .route("/logout/", post(logout).fallback(not_found))
}
