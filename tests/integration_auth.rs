mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::{Duration, Utc};
use common::{TEST_PASSWORD, TestApp};
use serde_json::json;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_sign_up_sign_in_and_me() {
    let app = TestApp::new();

    let created = app.sign_up("alice", "P@ss1").await;
    assert_eq!(created["username"], "alice");
    assert_eq!(created["role"], "user");
    assert!(created.get("password_hash").is_none());
    assert!(created.get("password").is_none());

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/users/sign-in",
            None,
            Some(json!({ "username": "alice", "password": "P@ss1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["username"], "alice");
    assert!(body["expires_at"].is_string());
    let token = body["token"].as_str().unwrap();

    let (status, me) = app
        .request(Method::GET, "/api/v1/users/me", Some(token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], created["id"]);
    assert_eq!(me["first_name"], "Test");
}

#[tokio::test]
async fn test_sign_in_wrong_password() {
    let app = TestApp::new();
    app.sign_up("alice", TEST_PASSWORD).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/users/sign-in",
            None,
            Some(json!({ "username": "alice", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["message"], "Username or password is incorrect");
}

#[tokio::test]
async fn test_sign_in_unknown_user_matches_wrong_password() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/users/sign-in",
            None,
            Some(json!({ "username": "nobody", "password": "whatever" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Username or password is incorrect");
}

#[tokio::test]
async fn test_sign_up_duplicate_username() {
    let app = TestApp::new();
    app.sign_up("alice", TEST_PASSWORD).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/users/sign-up",
            None,
            Some(json!({
                "username": "alice",
                "password": "another",
                "first_name": "Other",
                "last_name": "Alice"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_concurrent_sign_ups_create_one_account() {
    let app = TestApp::new();
    let mut tasks = JoinSet::new();

    for i in 0..8 {
        let router = app.router.clone();
        tasks.spawn(async move {
            let request = Request::builder()
                .method(Method::POST)
                .uri("/api/v1/users/sign-up")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "username": "alice",
                        "password": format!("P@ss{}", i),
                        "first_name": "Alice",
                        "last_name": "Liddell"
                    })
                    .to_string(),
                ))
                .unwrap();
            tower::ServiceExt::oneshot(router, request)
                .await
                .unwrap()
                .status()
        });
    }

    let mut created = 0;
    let mut conflicts = 0;
    while let Some(status) = tasks.join_next().await {
        match status.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(app.state.users.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sign_up_cannot_choose_role() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/users/sign-up",
            None,
            Some(json!({
                "username": "mallory",
                "password": "P@ss1",
                "first_name": "Mal",
                "last_name": "Lory",
                "role": "admin"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn test_sign_up_validation_errors() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/users/sign-up",
            None,
            Some(json!({
                "username": "al",
                "password": "P@ss1",
                "first_name": "Al",
                "last_name": "Short"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/users/sign-up",
            None,
            Some(json!({ "username": "alice" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "password is required");
}

#[tokio::test]
async fn test_sign_up_rejects_password_over_72_bytes() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/users/sign-up",
            None,
            Some(json!({
                "username": "alice",
                "password": "é".repeat(72),
                "first_name": "Alice",
                "last_name": "Liddell"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains("72 bytes"));

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/users/sign-in",
            None,
            Some(json!({ "username": "alice", "password": "é".repeat(72) })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/users/sign-in")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/api/v1/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing authorization header");
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let app = TestApp::new();

    let request = Request::builder()
        .uri("/api/v1/users/me")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid authorization header format");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::new();
    app.sign_up("alice", TEST_PASSWORD).await;
    let alice = app
        .state
        .users
        .find_by_username("alice")
        .await
        .unwrap()
        .unwrap();

    let expired = app
        .state
        .jwt
        .issue_at(&alice, Utc::now() - Duration::hours(2))
        .unwrap()
        .token;

    let (status, body) = app
        .request(Method::GET, "/api/v1/users/me", Some(&expired), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has expired");
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.user_with_token("alice").await;

    let (head, signature) = token.rsplit_once('.').unwrap();
    let replacement = if signature.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{}.{}{}", head, replacement, &signature[1..]);

    let (status, body) = app
        .request(Method::GET, "/api/v1/users/me", Some(&tampered), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn test_public_routes_ignore_bad_tokens() {
    let app = TestApp::new();

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/users/sign-up",
            Some("garbage"),
            Some(json!({
                "username": "alice",
                "password": "P@ss1",
                "first_name": "Alice",
                "last_name": "Liddell"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_deleted_user_token_still_validates_but_is_rejected() {
    let app = TestApp::new();
    let (id, token) = app.user_with_token("alice").await;

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/v1/users/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // No revocation: the token itself is still well-formed and unexpired.
    assert!(app.state.jwt.validate(&token).is_ok());

    let (status, body) = app
        .request(Method::GET, "/api/v1/users/me", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User no longer exists");
}
