use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::handlers::{protected, public};
use crate::middleware::access_gate;
use crate::state::AppState;

/// Full application router with the global middleware stack.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/health", get(public::health))
        .route(&config.security.login_path, get(public::login))
        .merge(content_routes())
        .merge(page_routes())
        .route("/api/revalidate", post(public::revalidate))
        .merge(studio_routes(&config.security.protected_prefixes))
        .fallback(public::fallback)
        // Global middleware
        .layer(from_fn_with_state(state.clone(), access_gate))
        .layer(cors_layer(&config.server.cors_origins, config.server.enable_cors))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.http_timeout() * 2))
        .with_state(state)
}

fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user", get(public::user))
        .route("/api/about", get(public::about))
        .route("/api/asset", get(public::asset))
        .route("/api/pages/:slug", get(public::page))
        .route("/api/projects", get(public::projects))
        .route("/api/projects/:slug", get(public::project))
        .route("/api/documents", get(public::documents))
        .route("/api/github/repos", get(public::github_repos))
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::home_page))
        .route("/about", get(public::about_page))
        .route("/projects", get(public::project_index_page))
        .route("/projects/:slug", get(public::project_page))
        .route("/pages/:slug", get(public::content_page))
}

fn studio_routes(prefixes: &[String]) -> Router<AppState> {
    prefixes.iter().fold(Router::new(), |router, prefix| {
        router
            .route(prefix, get(protected::studio))
            .route(&format!("{}/*rest", prefix), get(protected::studio))
    })
}

fn cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        return CorsLayer::new();
    }
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
