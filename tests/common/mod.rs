#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use zendriver::repository::{InMemoryUserRepository, UserRepository};
use zendriver::router::init_router;
use zendriver::state::AppState;
use zendriver_config::{
    AppConfig, CorsConfig, DatabaseConfig, JwtConfig, LoggingConfig, ServerConfig,
};
use zendriver_models::{RegisterRequest, Role, User};

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-characters-long";
pub const TEST_PASSWORD: &str = "P@ss1";

pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: None,
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            token_lifetime: 3600,
            issuer: None,
        },
        cors: CorsConfig::permissive(),
        logging: LoggingConfig::default(),
        // bcrypt's minimum cost keeps the tests fast
        bcrypt_cost: 4,
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_repository(Arc::new(InMemoryUserRepository::new()))
    }

    pub fn with_repository(users: Arc<dyn UserRepository>) -> Self {
        let state = AppState::new(test_config(), users);
        Self {
            router: init_router(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    pub async fn sign_up(&self, username: &str, password: &str) -> Value {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/users/sign-up",
                None,
                Some(json!({
                    "username": username,
                    "password": password,
                    "first_name": "Test",
                    "last_name": "User"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "sign-up failed: {}", body);
        body
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/users/sign-in",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "sign-in failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Registers `username` and returns its id and a fresh token.
    pub async fn user_with_token(&self, username: &str) -> (String, String) {
        let body = self.sign_up(username, TEST_PASSWORD).await;
        let token = self.sign_in(username, TEST_PASSWORD).await;
        (body["id"].as_str().unwrap().to_string(), token)
    }

    /// Admins cannot self-register, so they are created through the service.
    pub async fn admin_with_token(&self, username: &str) -> (User, String) {
        let admin = self
            .state
            .user_service
            .create(
                RegisterRequest {
                    username: username.to_string(),
                    password: TEST_PASSWORD.to_string(),
                    first_name: "Ada".to_string(),
                    last_name: "Admin".to_string(),
                },
                Role::Admin,
            )
            .await
            .unwrap();
        let token = self.sign_in(username, TEST_PASSWORD).await;
        (admin, token)
    }
}
