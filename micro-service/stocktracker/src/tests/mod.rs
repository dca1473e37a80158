use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{routes::create_routes, service::AuthServiceTrait, state::AppServices};
use app_config::{AppConfig, Argon2Config};
use app_database::db_connect::initialize_memory_db;
use app_middleware::SigningKey;

struct TestApp {
    router: Router,
    services: AppServices,
    quote_server: MockServer,
}

impl TestApp {
    async fn new() -> Self {
        let quotes = MockServer::start().await;

        let mut config = AppConfig::default();
        // Cheap work factor keeps the suite fast
        config.security.password.argon2 = Argon2Config {
            memory: 1024,
            iterations: 1,
            parallelism: 1,
        };
        config.server.body_limit = 1024;
        config.quotes.base_url = quotes.uri();
        config.quotes.api_key = "test-key".to_string();
        config.quotes.symbols = vec!["AAPL".to_string(), "FB".to_string()];

        let db = initialize_memory_db().await.expect("in-memory database");
        let signing_key = SigningKey::generate().expect("signing key");
        let services = AppServices::new(&config, db, &signing_key).expect("services");

        Self {
            router: create_routes(services.clone(), &config),
            services,
            quote_server: quotes,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let body = body.to_string();
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len());
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    async fn get(&self, uri: &str, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("DELETE")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Register and log in, returning the session token
    async fn login_as(&self, username: &str, password: &str) -> String {
        let credentials = json!({ "username": username, "password": password });

        let (status, _) = self.post_json("/register", credentials.clone(), None).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self.post_json("/login", credentials, None).await;
        assert_eq!(status, StatusCode::OK);
        body["login-token"].as_str().unwrap().to_string()
    }

    fn quotes(&self) -> &MockServer {
        &self.quote_server
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_and_login_scenario() {
    let app = TestApp::new().await;
    let credentials = json!({ "username": "alice", "password": "pw1" });

    let (status, body) = app.post_json("/register", credentials.clone(), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "message": "User registered successfully" }));

    let (status, body) = app.post_json("/login", credentials, None).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["login-token"].as_str().unwrap();

    let claims = app
        .services
        .auth
        .get_jwt_service()
        .verify_token(token)
        .unwrap();
    assert_eq!(claims.sub, "alice");

    let (status, body) = app
        .get("/favorites", Some(format!("Bearer {}", token).as_str()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = app.get("/favorites", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, body) = app.get("/favorites", Some("Bearer garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let app = TestApp::new().await;
    let credentials = json!({ "username": "alice", "password": "pw1" });

    app.post_json("/register", credentials.clone(), None).await;
    let (status, body) = app
        .post_json("/register", json!({ "username": "alice", "password": "other" }), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");

    // The original password still works
    let (status, _) = app.post_json("/login", credentials, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_registration_input() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json("/register", json!({ "username": "a b", "password": "pw1" }), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .post_json("/register", json!({ "username": "alice", "password": "" }), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::new().await;

    for body in [json!({ "username": "alice" }), json!("alice"), json!({ "password": 5 })] {
        let (status, response) = app.post_json("/register", body, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Invalid request");
    }

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new().await;
    app.login_as("alice", "pw1").await;

    let (wrong_status, wrong_body) = app
        .post_json("/login", json!({ "username": "alice", "password": "nope" }), None)
        .await;
    let (unknown_status, unknown_body) = app
        .post_json("/login", json!({ "username": "mallory", "password": "pw1" }), None)
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_favorites_lifecycle() {
    let app = TestApp::new().await;
    let token = app.login_as("alice", "pw1").await;
    let bearer = format!("Bearer {}", token);

    for symbol in ["aapl", "MSFT", "AAPL"] {
        let (status, body) = app
            .post_json("/add-favorite", json!({ "symbol": symbol }), Some(token.as_str()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Stock added to portfolio" }));
    }

    let (status, body) = app.get("/favorites", Some(bearer.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    let symbols: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["symbol"].as_str().unwrap())
        .collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT"]);

    let (status, body) = app.delete("/favorites/aapl", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Stock removed from portfolio" }));

    let (status, body) = app.delete("/favorites/AAPL", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, body) = app.get("/favorites", Some(bearer.as_str())).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_favorites_are_per_user() {
    let app = TestApp::new().await;
    let alice = app.login_as("alice", "pw1").await;
    let bob = app.login_as("bob", "pw2").await;

    app.post_json("/add-favorite", json!({ "symbol": "TSLA" }), Some(alice.as_str()))
        .await;

    let (_, body) = app.get("/favorites", Some(format!("Bearer {}", bob).as_str())).await;
    assert_eq!(body, json!([]));

    let (status, _) = app.delete("/favorites/TSLA", &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_favorite_validation() {
    let app = TestApp::new().await;
    let token = app.login_as("alice", "pw1").await;

    let (status, _) = app
        .post_json("/add-favorite", json!({ "symbol": "NOT A SYMBOL" }), Some(token.as_str()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post_json("/add-favorite", json!({ "ticker": "AAPL" }), Some(token.as_str()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request");
}

#[tokio::test]
async fn test_add_favorite_for_unknown_user() {
    let app = TestApp::new().await;
    // Validly signed, but no such identity was ever registered
    let token = app
        .services
        .auth
        .get_jwt_service()
        .issue_token("ghost")
        .unwrap();

    let (status, body) = app
        .post_json("/add-favorite", json!({ "symbol": "AAPL" }), Some(token.as_str()))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_protected_route_without_token_skips_body_parsing() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json("/add-favorite", json!({ "symbol": "AAPL" }), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_stock_prices_board() {
    let app = TestApp::new().await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .and(query_param("symbol", "AAPL"))
        .and(query_param("token", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "c": 189.987, "pc": 188.5, "h": 190.0, "l": 187.1, "o": 188.0, "v": 1200
        })))
        .mount(app.quotes())
        .await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .and(query_param("symbol", "FB"))
        .respond_with(ResponseTemplate::new(404))
        .mount(app.quotes())
        .await;

    let (status, body) = app.get("/api/stocks", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "AAPL": { "current": "189.99", "previous": "188.50" },
            "FB": { "error": "Unable to fetch data" }
        })
    );
}

#[tokio::test]
async fn test_stock_details() {
    let app = TestApp::new().await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .and(query_param("symbol", "NVDA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "c": 120.0, "pc": 118.0, "h": 121.5, "l": 117.25, "o": 118.5
        })))
        .mount(app.quotes())
        .await;

    let (status, body) = app.get("/api/stock/nvda", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "h": 121.5, "l": 117.25, "o": 118.5, "v": 0 }));
}

#[tokio::test]
async fn test_stock_details_failures() {
    let app = TestApp::new().await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .respond_with(ResponseTemplate::new(500))
        .mount(app.quotes())
        .await;

    let (status, body) = app.get("/api/stock/AAPL", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Unable to fetch stock details");

    let (status, _) = app.get("/api/stock/BAD$SYM", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_framework_errors_are_json() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/no-such-route", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = app.get("/register", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], "METHOD_NOT_ALLOWED");

    let oversized = json!({ "username": "alice", "password": "x".repeat(4096) });
    let (status, body) = app.post_json("/register", oversized, None).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.headers()["X-Content-Type-Options"], "nosniff");
    assert_eq!(response.headers()["X-Frame-Options"], "DENY");
}
