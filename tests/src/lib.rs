//! End-to-end harness: the full router over a real datastore, driven
//! in-process with `oneshot`.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use app_config::{AppConfig, Argon2Config};
use app_database::Database;
use app_error::AppResult;
use app_middleware::SigningKey;
use micro_stocktracker::{routes::create_routes, state::AppServices};


/// Default configuration with a cheap password work factor
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.security.password.argon2 = Argon2Config {
        memory: 1024,
        iterations: 1,
        parallelism: 1,
    };
    config
}

/// One server "process": its own signing key over a given datastore
#[derive(Clone)]
pub struct TestServer {
    pub router: Router,
    pub services: AppServices,
}

impl TestServer {
    pub fn start(config: &AppConfig, db: Arc<Database>) -> AppResult<Self> {
        let signing_key = SigningKey::generate()?;
        let services = AppServices::new(config, db, &signing_key)?;

        Ok(Self {
            router: create_routes(services.clone(), config),
            services,
        })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("valid request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }
}
