use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use axum::{
    Router,
    extract::Extension,
    http::{HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
};

use app_config::{AppConfig, CorsConfig};
use app_error::middleware_handling::error_handling_middleware;
use app_middleware::{
    api_middleware::{logging_middleware, security_headers_middleware},
    require_auth,
};

use crate::{
    handlers::{
        auth::{login, register},
        health::health_check,
        portfolio::{add_favorite, list_favorites, remove_favorite},
        stocks::{stock_details, stock_prices},
    },
    service::AuthServiceTrait,
    state::AppServices,
};

fn cors_layer(cors_config: &CorsConfig) -> CorsLayer {
    CorsLayer::new()
        // If allowed_origins contains "*", use Any, otherwise use exact list
        .allow_origin(if cors_config.allowed_origins.iter().any(|o| o == "*") {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(
                cors_config
                    .allowed_origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect::<Vec<HeaderValue>>(),
            )
        })
        .allow_methods(
            cors_config
                .allowed_methods
                .iter()
                .filter_map(|method| method.parse().ok())
                .collect::<Vec<Method>>(),
        )
        .allow_headers(
            cors_config
                .allowed_headers
                .iter()
                .filter_map(|header| header.parse().ok())
                .collect::<Vec<HeaderName>>(),
        )
        .allow_credentials(cors_config.allow_credentials)
}

pub fn create_routes(services: AppServices, config: &AppConfig) -> Router {
    let jwt_service = services.auth.get_jwt_service();

    // Every route here sits behind the bearer token check
    let protected = Router::new()
        .route("/add-favorite", post(add_favorite))
        .route("/favorites", get(list_favorites))
        .route("/favorites/{symbol}", delete(remove_favorite))
        .route_layer(from_fn_with_state(jwt_service, require_auth));

    let public = Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/api/stocks", get(stock_prices))
        .route("/api/stock/{symbol}", get(stock_details));

    let app = public
        .merge(protected)
        .layer(Extension(Arc::clone(&services.auth)))
        .layer(Extension(Arc::clone(&services.portfolio)))
        .layer(Extension(Arc::clone(&services.quotes)));

    // Body limit inside the error handler so its 413 is rewritten as JSON
    let app = app
        .layer(RequestBodyLimitLayer::new(config.server.body_limit))
        .layer(from_fn(error_handling_middleware));

    let app = app
        .layer(from_fn(logging_middleware))
        .layer(from_fn(security_headers_middleware));

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config.security.cors));

    app.layer(middleware_stack)
}
