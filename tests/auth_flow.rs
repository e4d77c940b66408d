//! End-to-end coverage for the registration, login, and staged
//! verification flows over HTTP.

mod common;

use common::{template_points, TestServer};
use serde_json::{json, Value};

async fn post_json(server: &TestServer, path: &str, body: Value) -> (u16, Value) {
    // ---
    let response = server
        .client
        .post(server.url(path))
        .json(&body)
        .send()
        .await
        .expect("request failed");

    let status = response.status().as_u16();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn register_returns_a_usable_session_token() {
    // ---
    let server = TestServer::new().await;
    let body = server.register("Alice", "alice@example.com", "secret-pass").await;

    assert_eq!(body["success"], true);
    let token = body["token"].as_str().expect("token present");

    // Auto-login after registration: the token works immediately.
    let me = server
        .client
        .get(server.url("/api/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .expect("me request failed");

    assert_eq!(me.status(), 200);
    let me_body: Value = me.json().await.unwrap();
    assert_eq!(me_body["data"]["email"], "alice@example.com");
    // The password hash must never appear on the wire.
    assert!(me_body["data"].get("passwordHash").is_none());
    assert!(me_body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    // ---
    let server = TestServer::new().await;
    server.register("Alice", "alice@example.com", "secret-pass").await;

    let (status, body) = post_json(
        &server,
        "/api/auth/register",
        json!({
            "name": "Other Alice",
            "email": "ALICE@example.com",
            "password": "other-pass",
            "colorPreference": "green",
            "sportPreference": "golf",
            "graphicalPassword": { "imageId": "img-2", "points": template_points() },
        }),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "email already exists");
}

#[tokio::test]
async fn registration_rejects_wrong_point_count() {
    // ---
    let server = TestServer::new().await;

    for count in [3, 5] {
        let points: Vec<Value> = (0..count)
            .map(|i| json!({"x": i * 40, "y": i * 40}))
            .collect();

        let (status, body) = post_json(
            &server,
            "/api/auth/register",
            json!({
                "name": "Bob",
                "email": "bob@example.com",
                "password": "secret-pass",
                "colorPreference": "blue",
                "sportPreference": "tennis",
                "graphicalPassword": { "imageId": "img-1", "points": points },
            }),
        )
        .await;

        assert_eq!(status, 400, "count {count} must be rejected");
        assert_eq!(
            body["error"],
            "please select exactly 4 points for the graphical password"
        );
    }
}

#[tokio::test]
async fn login_succeeds_with_all_factors() {
    // ---
    let server = TestServer::new().await;
    server.register("Alice", "alice@example.com", "secret-pass").await;

    let (status, body) = post_json(
        &server,
        "/api/auth/login",
        json!({
            "email": "alice@example.com",
            "password": "secret-pass",
            "graphicalPassword": { "points": template_points() },
        }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn wrong_email_and_wrong_password_are_indistinguishable() {
    // ---
    let server = TestServer::new().await;
    server.register("Alice", "alice@example.com", "secret-pass").await;

    let (status_a, body_a) = post_json(
        &server,
        "/api/auth/login",
        json!({
            "email": "nobody@example.com",
            "password": "secret-pass",
            "graphicalPassword": { "points": template_points() },
        }),
    )
    .await;

    let (status_b, body_b) = post_json(
        &server,
        "/api/auth/login",
        json!({
            "email": "alice@example.com",
            "password": "wrong-pass",
            "graphicalPassword": { "points": template_points() },
        }),
    )
    .await;

    assert_eq!(status_a, 401);
    assert_eq!(status_b, 401);
    assert_eq!(body_a, body_b, "responses must be byte-identical");
}

#[tokio::test]
async fn login_with_far_points_is_rejected() {
    // ---
    let server = TestServer::new().await;
    server.register("Alice", "alice@example.com", "secret-pass").await;

    let (status, body) = post_json(
        &server,
        "/api/auth/login",
        json!({
            "email": "alice@example.com",
            "password": "secret-pass",
            "graphicalPassword": { "points": [
                {"x": 500, "y": 500}, {"x": 510, "y": 510},
                {"x": 520, "y": 520}, {"x": 530, "y": 530},
            ]},
        }),
    )
    .await;

    assert_eq!(status, 401);
    assert_eq!(body["error"], "invalid graphical password");
}

#[tokio::test]
async fn staged_flow_end_to_end() {
    // ---
    let server = TestServer::new().await;
    server.register("Alice", "alice@example.com", "secret-pass").await;

    // Step 1: color pre-check.
    let (status, body) = post_json(
        &server,
        "/api/auth/verify-color",
        json!({ "email": "alice@example.com", "colorPreference": "blue" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["email"], "alice@example.com");

    // Step 2: sport + password reveals the challenge image.
    let (status, body) = post_json(
        &server,
        "/api/auth/verify-sport",
        json!({
            "email": "alice@example.com",
            "sportPreference": "tennis",
            "password": "secret-pass",
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["imageId"], "img-1");

    // Step 3: graphical points, slightly nudged but within tolerance.
    let (status, body) = post_json(
        &server,
        "/api/auth/verify-graphical",
        json!({
            "email": "alice@example.com",
            "points": [
                {"x": 12, "y": 8}, {"x": 48, "y": 53},
                {"x": 88, "y": 92}, {"x": 135, "y": 125},
            ],
        }),
    )
    .await;
    assert_eq!(status, 200);
    let token = body["token"].as_str().expect("token issued");

    let me = server
        .client
        .get(server.url("/api/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .expect("me request failed");
    assert_eq!(me.status(), 200);
}

#[tokio::test]
async fn stages_are_independently_callable() {
    // ---
    let server = TestServer::new().await;
    server.register("Alice", "alice@example.com", "secret-pass").await;

    // Graphical step with no prior color or sport call still issues a
    // session; there is no server-side binding between stages.
    let (status, body) = post_json(
        &server,
        "/api/auth/verify-graphical",
        json!({ "email": "alice@example.com", "points": template_points() }),
    )
    .await;

    assert_eq!(status, 200);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn staged_checks_reject_unknown_emails_uniformly() {
    // ---
    let server = TestServer::new().await;
    server.register("Alice", "alice@example.com", "secret-pass").await;

    let (status, body) = post_json(
        &server,
        "/api/auth/verify-color",
        json!({ "email": "nobody@example.com", "colorPreference": "blue" }),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "invalid credentials");

    let (status, body) = post_json(
        &server,
        "/api/auth/verify-color",
        json!({ "email": "alice@example.com", "colorPreference": "red" }),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "invalid credentials");
}

#[tokio::test]
async fn sport_check_needs_both_factors() {
    // ---
    let server = TestServer::new().await;
    server.register("Alice", "alice@example.com", "secret-pass").await;

    let (status, _) = post_json(
        &server,
        "/api/auth/verify-sport",
        json!({
            "email": "alice@example.com",
            "sportPreference": "golf",
            "password": "secret-pass",
        }),
    )
    .await;
    assert_eq!(status, 401);

    let (status, _) = post_json(
        &server,
        "/api/auth/verify-sport",
        json!({
            "email": "alice@example.com",
            "sportPreference": "tennis",
            "password": "wrong-pass",
        }),
    )
    .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn protected_routes_reject_bad_tokens() {
    // ---
    let server = TestServer::new().await;

    // No token at all.
    let response = server
        .client
        .get(server.url("/api/auth/me"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 401);

    // A token signed with a different secret.
    let forged = graphpass::SessionIssuer::new(
        b"some-other-secret".to_vec(),
        chrono::Duration::days(30),
    )
    .issue(uuid::Uuid::new_v4(), chrono::Utc::now())
    .expect("issue");

    let response = server
        .client
        .get(server.url("/api/auth/me"))
        .bearer_auth(forged)
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn logout_acknowledges() {
    // ---
    let server = TestServer::new().await;
    let body = server.register("Alice", "alice@example.com", "secret-pass").await;
    let token = body["token"].as_str().unwrap();

    let response = server
        .client
        .get(server.url("/api/auth/logout"))
        .bearer_auth(token)
        .send()
        .await
        .expect("logout failed");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
}
