// Test helpers are intentionally partially used
#![allow(dead_code)]

use graphpass::domain::{GraphicalPassword, Point, RepositoryPtr, Role, User};
use graphpass::{create_memory_repository, create_noop_metrics, create_router_with, AuthConfig};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

/// Signing secret shared by every test server.
pub const TEST_SECRET: &str = "integration-test-secret";

/// Template points used by the standard test fixtures.
pub fn template_points() -> Vec<Value> {
    // ---
    vec![
        json!({"x": 10, "y": 10}),
        json!({"x": 50, "y": 50}),
        json!({"x": 90, "y": 90}),
        json!({"x": 130, "y": 130}),
    ]
}

fn test_auth_config() -> AuthConfig {
    // ---
    AuthConfig {
        signing_secret: TEST_SECRET.to_string(),
        token_expiry: chrono::Duration::days(30),
        // Minimum bcrypt cost; the test suite needs speed, not strength.
        hash_cost: 4,
        graphical_tolerance_px: 15,
    }
}

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
    pub repository: RepositoryPtr,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        // --

        let repository = create_memory_repository();
        let metrics = create_noop_metrics().expect("noop metrics");
        let app = create_router_with(repository.clone(), metrics, &test_auth_config());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self {
            addr,
            client,
            repository,
        }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }

    /// Register a user through the API and return the response JSON.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Value {
        // ---
        let body = json!({
            "name": name,
            "email": email,
            "password": password,
            "colorPreference": "blue",
            "sportPreference": "tennis",
            "graphicalPassword": {
                "imageId": "img-1",
                "points": template_points(),
            },
        });

        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&body)
            .send()
            .await
            .expect("register request failed");

        assert_eq!(response.status(), 200, "registration should succeed");
        response.json().await.expect("register response not JSON")
    }

    /// Seed an admin user directly in the store and return a bearer token
    /// obtained through the login endpoint.
    pub async fn seed_admin(&self, email: &str, password: &str) -> String {
        // ---
        let hash = bcrypt::hash(password, 4).expect("bcrypt hash");
        let mut user = User::new(
            "Admin".into(),
            email.into(),
            hash,
            "red".into(),
            "golf".into(),
            GraphicalPassword {
                image_id: "img-admin".into(),
                points: vec![
                    Point { x: 10, y: 10 },
                    Point { x: 50, y: 50 },
                    Point { x: 90, y: 90 },
                    Point { x: 130, y: 130 },
                ],
            },
        );
        user.role = Role::Admin;

        self.repository
            .insert_user(user)
            .await
            .expect("admin seed insert failed");

        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({
                "email": email,
                "password": password,
                "graphicalPassword": { "points": template_points() },
            }))
            .send()
            .await
            .expect("admin login failed");

        assert_eq!(response.status(), 200, "admin login should succeed");
        let body: Value = response.json().await.expect("login response not JSON");
        body["token"].as_str().expect("token in response").to_string()
    }
}
