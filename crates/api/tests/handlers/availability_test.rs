use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{MONDAY, SUNDAY, TestContext, authed};

async fn slots(ctx: &TestContext, date: &str, service_id: &str) -> axum_test::TestResponse {
    ctx.server
        .get("/api/settings/available-slots")
        .add_query_param("date", date)
        .add_query_param("serviceId", service_id)
        .await
}

#[tokio::test]
async fn default_hours_when_none_saved() {
    let ctx = TestContext::new().await;

    let body = ctx
        .server
        .get("/api/settings/working-hours")
        .await
        .json::<Value>();

    assert_eq!(body["monday"], json!({ "enabled": true, "start": "08:00", "end": "17:00" }));
    assert_eq!(body["sunday"]["enabled"], false);
}

#[tokio::test]
async fn half_hour_slots_on_open_day() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;

    let response = slots(&ctx, MONDAY, &service.id.to_string()).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    let available = body["availableSlots"].as_array().unwrap();
    assert_eq!(available.len(), 18);
    assert_eq!(available[0], "08:00");
    assert_eq!(available[17], "16:30");
    assert_eq!(body["bookedSlots"], json!([]));
}

#[tokio::test]
async fn closed_day_has_no_slots() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;

    let body = slots(&ctx, SUNDAY, &service.id.to_string())
        .await
        .json::<Value>();

    assert_eq!(body, json!({ "availableSlots": [], "bookedSlots": [] }));
}

#[tokio::test]
async fn booked_slot_is_excluded() {
    let ctx = TestContext::new().await;
    ctx.short_monday().await;
    let service = ctx.service("Standard Smoke Test", 60, 500.0).await;
    let token = ctx.customer("driver@example.com").await;
    ctx.book(&token, &service, MONDAY, "09:00")
        .await
        .assert_status(StatusCode::CREATED);

    let body = slots(&ctx, MONDAY, &service.id.to_string())
        .await
        .json::<Value>();

    assert_eq!(
        body,
        json!({ "availableSlots": ["08:00"], "bookedSlots": ["09:00"] })
    );
}

#[tokio::test]
async fn malformed_date_is_bad_request() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;

    let response = slots(&ctx, "06/03/2024", &service.id.to_string()).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_parameters_are_bad_request() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/api/settings/available-slots")
        .add_query_param("date", MONDAY)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_parameters_are_bad_request() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;

    let response = slots(&ctx, MONDAY, "").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Validation error: Date and serviceId are required"
    );

    slots(&ctx, "", &service.id.to_string())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repeated_queries_agree() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;
    let token = ctx.customer("driver@example.com").await;
    ctx.book(&token, &service, MONDAY, "10:30")
        .await
        .assert_status(StatusCode::CREATED);

    let first = slots(&ctx, MONDAY, &service.id.to_string())
        .await
        .json::<Value>();
    let second = slots(&ctx, MONDAY, &service.id.to_string())
        .await
        .json::<Value>();

    assert_eq!(first, second);
    assert_eq!(first["bookedSlots"], json!(["10:30"]));
}

#[tokio::test]
async fn unknown_or_malformed_service_is_not_found() {
    let ctx = TestContext::new().await;

    slots(&ctx, MONDAY, &Uuid::new_v4().to_string())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    slots(&ctx, MONDAY, "standard-test")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_replaces_working_hours() {
    let ctx = TestContext::new().await;
    let token = ctx.admin().await;
    let hours = json!({
        "monday": { "enabled": true, "start": "09:00", "end": "11:00" },
        "sunday": { "enabled": false, "start": "08:00", "end": "17:00" }
    });

    authed(ctx.server.put("/api/settings/working-hours"), &token)
        .json(&hours)
        .await
        .assert_status_ok();

    let stored = ctx
        .server
        .get("/api/settings/working-hours")
        .await
        .json::<Value>();
    assert_eq!(stored["monday"]["start"], "09:00");
    assert!(stored.get("tuesday").is_none());

    let audit = authed(ctx.server.get("/api/admin/audit-logs"), &token)
        .await
        .json::<Value>();
    assert_eq!(audit[0]["action"], "updated_working_hours");
    assert_eq!(audit[0]["targetId"], "working_hours");
}

#[tokio::test]
async fn inverted_window_is_rejected() {
    let ctx = TestContext::new().await;
    let token = ctx.admin().await;

    let response = authed(ctx.server.put("/api/settings/working-hours"), &token)
        .json(&json!({ "monday": { "enabled": true, "start": "17:00", "end": "08:00" } }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_cannot_change_working_hours() {
    let ctx = TestContext::new().await;
    let token = ctx.customer("driver@example.com").await;

    let response = authed(ctx.server.put("/api/settings/working-hours"), &token)
        .json(&json!({ "monday": { "enabled": false, "start": "08:00", "end": "17:00" } }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}
