use crate::config::ServerConfig;
use crate::logger::{self, LogTag};
use crate::webserver::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub mod system;
pub mod tickets;
pub mod ws;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server);
    Router::new()
        .merge(ws::routes())
        .nest("/api", api_routes().layer(cors))
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(system::routes())
        .merge(tickets::routes())
}

/// CORS for the JSON API, driven by the same allow-list as WebSocket origins
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins = if config.allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    logger::warning(
                        LogTag::Webserver,
                        &format!("Ignoring invalid allowed origin '{}'", origin),
                    );
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
