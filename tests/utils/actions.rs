#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{header::SET_COOKIE, Request},
    response::Response,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::{TestSetup, PASSWORD};

// ============================================================================
// Action Helpers
// ============================================================================

/// What came back from one request, with the body already read
pub struct TestResponse {
    pub status: u16,
    pub set_cookies: Vec<String>,
    pub body: Value,
}

impl TestResponse {
    async fn from_response(response: Response) -> Self {
        let status = response.status().as_u16();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Self {
            status,
            set_cookies,
            body,
        }
    }

    pub fn access_token(&self) -> String {
        self.body["data"]["accessToken"].as_str().unwrap().to_string()
    }

    pub fn refresh_token(&self) -> String {
        self.body["data"]["refreshToken"].as_str().unwrap().to_string()
    }
}

impl TestSetup {
    /// Send a request through the full router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        TestResponse::from_response(response).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/api/v1/users/register",
            json!({
                "username": username,
                "email": email,
                "password": password,
                "fullName": "Test User",
            }),
        )
        .await
    }

    pub async fn login(&self, username: &str) -> TestResponse {
        self.login_with(json!({ "username": username, "password": PASSWORD }))
            .await
    }

    pub async fn login_with(&self, body: Value) -> TestResponse {
        self.post_json("/api/v1/users/login", body).await
    }

    /// Refresh using the `refreshToken` cookie, the way a browser would
    pub async fn refresh_with_cookie(&self, refresh_token: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/users/refresh-token")
            .header("cookie", format!("refreshToken={}", refresh_token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn refresh_with_body(&self, refresh_token: &str) -> TestResponse {
        self.post_json(
            "/api/v1/users/refresh-token",
            json!({ "refreshToken": refresh_token }),
        )
        .await
    }

    pub async fn current_user(&self, access_token: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri("/api/v1/users/current-user")
            .header("authorization", format!("Bearer {}", access_token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn logout(&self, access_token: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/users/logout")
            .header("cookie", format!("accessToken={}", access_token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }
}
