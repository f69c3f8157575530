#[path = "../common/mod.rs"]
mod common;
use common::*;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

fn register_body(email: &str, code: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": TEST_PASSWORD,
        "full_name": "Ana Garcia",
        "company": "Acme",
        "invitation_code": code,
    })
}

#[tokio::test]
async fn test_health() {
    let ctx = create_test_app_state();
    let (status, body) = send_json(test_app(ctx.state.clone()), "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_returns_created_with_token() {
    let ctx = create_test_app_state();
    let code = {
        let conn = ctx.state.db.get().unwrap();
        create_test_code(&conn, 1, None)
    };

    let (status, body) = send_json(
        test_app(ctx.state.clone()),
        "POST",
        "/api/register",
        None,
        Some(register_body("ana@example.com", &code.code)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "body: {}", body);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], "ana@example.com");
    assert!(
        body["user"].get("password_hash").is_none(),
        "password hash must never be serialized"
    );
}

#[tokio::test]
async fn test_register_failures_map_to_statuses() {
    let ctx = create_test_app_state();
    let code = {
        let conn = ctx.state.db.get().unwrap();
        create_test_code(&conn, 1, None)
    };

    let (status, _) = send_json(
        test_app(ctx.state.clone()),
        "POST",
        "/api/register",
        None,
        Some(register_body("ana@example.com", &code.code)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        test_app(ctx.state.clone()),
        "POST",
        "/api/register",
        None,
        Some(register_body("bob@example.com", &code.code)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Invitation code exhausted");

    let (status, body) = send_json(
        test_app(ctx.state.clone()),
        "POST",
        "/api/register",
        None,
        Some(register_body("bob@example.com", "no-such-code")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Invalid invitation code");

    let fresh = {
        let conn = ctx.state.db.get().unwrap();
        create_test_code(&conn, 1, None)
    };
    let (status, body) = send_json(
        test_app(ctx.state.clone()),
        "POST",
        "/api/register",
        None,
        Some(register_body("ana@example.com", &fresh.code)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"], "Email already registered");
}

#[tokio::test]
async fn test_login_and_profile() {
    let ctx = create_test_app_state();
    {
        let conn = ctx.state.db.get().unwrap();
        create_test_user(&conn, "ana@example.com", false);
    }

    let (status, body) = send_json(
        test_app(ctx.state.clone()),
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, profile) =
        send_json(test_app(ctx.state.clone()), "GET", "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "ana@example.com");
    assert_eq!(profile["is_admin"], false);
}

#[tokio::test]
async fn test_login_does_not_stall_the_runtime() {
    use std::sync::atomic::{AtomicBool, Ordering};

    let ctx = create_test_app_state();
    {
        let conn = ctx.state.db.get().unwrap();
        create_test_user(&conn, "ana@example.com", false);
    }

    // Single-threaded runtime: the sibling future only runs if login yields
    // while the password check is in flight.
    let sibling_ran = AtomicBool::new(false);
    let login = async {
        let result = send_json(
            test_app(ctx.state.clone()),
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": TEST_PASSWORD })),
        )
        .await;
        (result, sibling_ran.load(Ordering::SeqCst))
    };
    let sibling = async { sibling_ran.store(true, Ordering::SeqCst) };

    let (((status, body), ran_during_login), ()) = tokio::join!(login, sibling);
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert!(ran_during_login, "password check should run on the blocking pool");
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let ctx = create_test_app_state();
    {
        let conn = ctx.state.db.get().unwrap();
        create_test_user(&conn, "ana@example.com", false);
    }

    let (unknown_status, unknown) = send_json(
        test_app(ctx.state.clone()),
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": TEST_PASSWORD })),
    )
    .await;
    let (wrong_status, wrong) = send_json(
        test_app(ctx.state.clone()),
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "not-the-password" })),
    )
    .await;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, wrong, "responses must not reveal which part was wrong");
}

#[tokio::test]
async fn test_disabled_account_gets_forbidden() {
    let ctx = create_test_app_state();
    {
        let conn = ctx.state.db.get().unwrap();
        let user = create_test_user(&conn, "ana@example.com", false);
        queries::set_user_active(&conn, &user.id, false).unwrap();
    }

    let (status, body) = send_json(
        test_app(ctx.state.clone()),
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["details"], "Account disabled");
}

#[tokio::test]
async fn test_profile_requires_valid_token() {
    let ctx = create_test_app_state();

    let (status, body) = send_json(test_app(ctx.state.clone()), "GET", "/api/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send_json(
        test_app(ctx.state.clone()),
        "GET",
        "/api/profile",
        Some("not-a-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_of_disabled_account_is_refused() {
    let ctx = create_test_app_state();
    let token = {
        let conn = ctx.state.db.get().unwrap();
        let user = create_test_user(&conn, "ana@example.com", false);
        let token = token_for(&user);
        queries::set_user_active(&conn, &user.id, false).unwrap();
        token
    };

    let (status, _) = send_json(test_app(ctx.state.clone()), "GET", "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "disabled accounts lose access immediately");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = create_test_app_state();

    let response = test_app(ctx.state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/login")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Bad request");
}
