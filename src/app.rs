// app.rs - router assembly and shared state

use std::sync::Arc;

use axum::{http::HeaderValue, middleware::from_fn_with_state, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::entity::EntityRegistry;
use crate::handlers;
use crate::middleware::{access_token_middleware, panic_response, session_middleware};
use crate::session::SessionStore;
use crate::store::EntityStore;

/// Everything a handler can reach. Cheap to clone; all members are shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<EntityRegistry>,
    pub store: Arc<dyn EntityStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        registry: Arc<EntityRegistry>,
        store: Arc<dyn EntityStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self { config: Arc::new(config), registry, store, sessions }
    }
}

/// Build the complete HTTP surface:
///
/// - `/entities/:entity[/:id]` entity CRUD
/// - `/login`, `/logout` session lifecycle
/// - `/health` liveness (no access token required)
///
/// Everything except `/health`, unmatched URLs included, sits behind the
/// access-token check, which runs before the session lookup.
pub fn app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    let guarded = Router::new()
        .nest("/entities", handlers::entity::routes())
        .merge(handlers::security::routes())
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(from_fn_with_state(state.clone(), access_token_middleware));

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .merge(guarded);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes)),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
