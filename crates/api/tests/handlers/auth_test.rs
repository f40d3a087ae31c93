use axum::http::StatusCode;
use fake::{Fake, faker::internet::en::SafeEmail};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use smokecheck_core::store::IdentityProvider;

use crate::test_utils::{ADMIN_EMAIL, PASSWORD, TestContext, authed};

#[tokio::test]
async fn register_returns_created_user() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": "Driver@Example.com", "password": PASSWORD, "displayName": "Juan" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["user"]["email"], "driver@example.com");
    assert_eq!(body["user"]["displayName"], "Juan");
    assert_eq!(body["user"]["isAdmin"], false);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let ctx = TestContext::new().await;
    let email: String = SafeEmail().fake();
    ctx.customer(&email).await;

    let response = ctx
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": email.to_uppercase(), "password": PASSWORD }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn short_password_is_rejected() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": "driver@example.com", "password": "abc" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": "not-the-password" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>()["error"],
        "Authentication error: Invalid email or password"
    );
}

#[tokio::test]
async fn verify_echoes_the_caller() {
    let ctx = TestContext::new().await;
    let token = ctx.admin().await;

    let response = authed(ctx.server.post("/api/auth/verify"), &token).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["user"]["isAdmin"], true);
}

#[tokio::test]
async fn verify_without_token_is_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx.server.post("/api/auth/verify").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>()["error"],
        "Authentication error: No token provided"
    );
}

#[tokio::test]
async fn verify_with_unknown_token_is_unauthorized() {
    let ctx = TestContext::new().await;

    let response = authed(ctx.server.post("/api/auth/verify"), "not-a-session").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_reset_flow() {
    let ctx = TestContext::new().await;
    ctx.customer("driver@example.com").await;

    ctx.server
        .post("/api/auth/send-otp")
        .json(&json!({ "email": "driver@example.com" }))
        .await
        .assert_status_ok();
    let email = ctx.mailer.last_to("driver@example.com").unwrap();
    assert_eq!(email.subject, "Your OTP Code - SET CAM");
    let code = email
        .html
        .split(|c: char| !c.is_ascii_digit())
        .find(|run| run.len() == 6)
        .unwrap()
        .to_string();

    ctx.server
        .post("/api/auth/verify-otp")
        .json(&json!({ "email": "driver@example.com", "otp": code }))
        .await
        .assert_status_ok();

    ctx.server
        .post("/api/auth/reset-password")
        .json(&json!({ "email": "driver@example.com", "otp": code, "newPassword": "brand-new-secret" }))
        .await
        .assert_status_ok();

    ctx.server
        .post("/api/auth/login")
        .json(&json!({ "email": "driver@example.com", "password": "brand-new-secret" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn wrong_code_is_bad_request() {
    let ctx = TestContext::new().await;
    ctx.customer("driver@example.com").await;
    ctx.store.issue_otp("driver@example.com").await.unwrap();

    let response = ctx
        .server
        .post("/api/auth/verify-otp")
        .json(&json!({ "email": "driver@example.com", "otp": "000000x" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn otp_for_unknown_email_is_not_found() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/auth/send-otp")
        .json(&json!({ "email": "nobody@example.com" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(ctx.mailer.subjects().is_empty());
}
