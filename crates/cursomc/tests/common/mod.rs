//! Test utilities and common setup.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use cursomc::api::{self, AppState, MediaState};
use cursomc::auth::AuthConfig;
use cursomc::db::{self, Database};

pub use cursomc::db::SEED_PASSWORD;

pub const MARIA: &str = "maria@example.com";
pub const MARIA_ID: i64 = 1;
pub const ANA: &str = "ana@example.com";
pub const ANA_ID: i64 = 2;

/// Router over a seeded in-memory database with media in a temp directory.
pub struct TestApp {
    pub router: Router,
    pub media: TempDir,
}

/// Create a test AuthConfig with a JWT secret for testing.
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Some("test-secret-for-integration-tests-minimum-32-chars".to_string()),
        ..AuthConfig::default()
    }
}

/// Create a test application with sample data loaded.
pub async fn test_app() -> TestApp {
    let db = Database::in_memory().await.unwrap();
    db::instantiate_test_database(db.pool()).await.unwrap();

    let media = tempfile::tempdir().unwrap();
    let state = AppState::from_pool(
        db.pool().clone(),
        test_auth_config(),
        MediaState::new(media.path()),
    )
    .unwrap();

    TestApp {
        router: api::create_router(state),
        media,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(request(Method::GET, uri, token, Body::empty()))
            .await
    }

    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Response<Body> {
        let mut req = request(method, uri, token, Body::from(body.to_string()));
        req.headers_mut().insert(
            header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );
        self.send(req).await
    }

    /// Log in and return the raw `Authorization` header value.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .send_json(
                Method::POST,
                "/login",
                None,
                &json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "login as {email}");
        response
            .headers()
            .get(header::AUTHORIZATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(body).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

/// A valid registration body for an individual living in Campinas.
pub fn new_client_body(email: &str) -> Value {
    json!({
        "name": "Joana Pereira",
        "email": email,
        "document": "52998224725",
        "kind": 1,
        "password": "s3cret",
        "street": "Rua das Palmeiras",
        "number": "42",
        "complement": "Casa 2",
        "district": "Centro",
        "zip_code": "13010000",
        "phone1": "19999990000",
        "city_id": 3
    })
}
