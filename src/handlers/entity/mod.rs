// handlers/entity/mod.rs - generic CRUD over registered entity types
//
// Every route is served with and without a trailing slash. A known path with
// an unrouted method answers like an unknown URL.

mod create;
mod delete;
mod find;
mod get;
mod update;
pub mod utils;

pub use create::create;
pub use delete::delete;
pub use find::find;
pub use get::get;
pub use update::update;

use axum::{routing, Router};

use crate::app::AppState;
use crate::handlers::not_found;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Collection
        .route("/:entity", routing::get(find).post(create).fallback(not_found))
        .route("/:entity/", routing::get(find).post(create).fallback(not_found))
        // Instance
        .route("/:entity/:id", routing::get(get).put(update).delete(delete).fallback(not_found))
        .route("/:entity/:id/", routing::get(get).put(update).delete(delete).fallback(not_found))
}
