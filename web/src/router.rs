use crate::{
    controller::{health_check_controller, home_controller, record_controller},
    ws::handler::ws_handler,
    AppState,
};
use axum::{
    http::HeaderValue,
    routing::{any, get, post},
    Router,
};
use log::*;
use service::config::Config;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(home_routes())
        .merge(health_routes())
        .merge(record_routes(app_state.clone()))
        .merge(ws_routes(app_state.clone()))
        .layer(cors_layer(&app_state.config))
}

fn home_routes() -> Router {
    Router::new().route("/", get(home_controller::index))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn record_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/req", post(record_controller::create))
        .with_state(app_state)
}

fn ws_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/ws", any(ws_handler))
        .with_state(app_state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid allowed origin {origin:?}: {e}");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
