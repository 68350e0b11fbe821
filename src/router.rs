use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
};
use serde_json::{Value, json};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use zendriver_config::CorsConfig;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::{metrics_middleware, metrics_router};
use crate::middleware::auth::jwt_middleware;
use crate::middleware::error_handler::{error_handler, handle_panic, not_found_fallback};
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

/// Builds the application.
///
/// Layers, outermost first: logging, metrics, CORS, error handler, panic
/// catcher, JWT middleware.
pub fn init_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1/users", init_users_router());

    if state.config.server.swagger_enabled {
        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    if let Some(handle) = state.metrics.clone() {
        router = router.merge(metrics_router(handle));
    }

    router
        .fallback(not_found_fallback)
        .layer(middleware::from_fn_with_state(state.clone(), jwt_middleware))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(state.clone(), error_handler))
        .layer(cors_layer(&state.config.cors))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
