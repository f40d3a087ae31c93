use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use smokecheck_core::{
    models::service::{Discount, DiscountAmount},
    store::ServiceStore,
};
use uuid::Uuid;

use crate::test_utils::{MONDAY, SUNDAY, TestContext, authed, booking_body};

#[tokio::test]
async fn booking_is_created_pending() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;
    let token = ctx.customer("driver@example.com").await;

    let response = ctx.book(&token, &service, MONDAY, "09:00").await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["amount"], 500.0);
    assert_eq!(
        ctx.mailer.subjects(),
        vec!["Appointment Booking Confirmation - SET CAM".to_string()]
    );
}

#[tokio::test]
async fn discounted_service_is_charged_effective_price() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;
    ServiceStore::set_discount(
        ctx.store.as_ref(),
        service.id,
        Some(Discount {
            amount: DiscountAmount::Percentage { value: 20.0 },
            active: true,
            expires_at: None,
            updated_at: None,
        }),
    )
    .await
    .unwrap();
    let token = ctx.customer("driver@example.com").await;

    let created = ctx.book(&token, &service, MONDAY, "10:00").await.json::<Value>();
    assert_eq!(created["amount"], 400.0);

    let id = created["appointmentId"].as_str().unwrap().to_string();
    let stored = authed(ctx.server.get(&format!("/api/appointments/{}", id)), &token)
        .await
        .json::<Value>();
    assert_eq!(stored["paymentDetails"]["originalAmount"], 500.0);
    assert_eq!(stored["paymentDetails"]["discount"]["savings"], 100.0);
}

#[tokio::test]
async fn taken_slot_conflicts() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;
    let first = ctx.customer("first@example.com").await;
    let second = ctx.customer("second@example.com").await;

    ctx.book(&first, &service, MONDAY, "09:00")
        .await
        .assert_status(StatusCode::CREATED);
    let response = ctx.book(&second, &service, MONDAY, "09:00").await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn closed_day_and_off_grid_times_conflict() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 60, 500.0).await;
    let token = ctx.customer("driver@example.com").await;

    ctx.book(&token, &service, SUNDAY, "09:00")
        .await
        .assert_status(StatusCode::CONFLICT);
    ctx.book(&token, &service, MONDAY, "09:15")
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn bare_hour_is_normalised() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 60, 500.0).await;
    let token = ctx.customer("driver@example.com").await;

    let created = ctx.book(&token, &service, MONDAY, "9:00").await;
    created.assert_status(StatusCode::CREATED);

    let mine = authed(ctx.server.get("/api/appointments/user"), &token)
        .await
        .json::<Value>();
    assert_eq!(mine[0]["appointmentTime"], "09:00");
}

#[tokio::test]
async fn booking_requires_login() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;

    let response = ctx
        .server
        .post("/api/appointments")
        .json(&booking_body(&service, MONDAY, "09:00"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_plate_number_is_bad_request() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;
    let token = ctx.customer("driver@example.com").await;
    let mut body = booking_body(&service, MONDAY, "09:00");
    body["vehicleInfo"]["plateNumber"] = json!("  ");

    let response = authed(ctx.server.post("/api/appointments"), &token)
        .json(&body)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn others_cannot_view_or_upload() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;
    let owner = ctx.customer("owner@example.com").await;
    let stranger = ctx.customer("stranger@example.com").await;
    let id = ctx.book(&owner, &service, MONDAY, "09:00").await.json::<Value>()["appointmentId"]
        .as_str()
        .unwrap()
        .to_string();

    authed(ctx.server.get(&format!("/api/appointments/{}", id)), &stranger)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    authed(ctx.server.patch(&format!("/api/appointments/{}/receipt", id)), &stranger)
        .json(&json!({ "receiptBase64": "data:image/png;base64,AAAA" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // administrators see every booking
    let admin = ctx.admin().await;
    authed(ctx.server.get(&format!("/api/appointments/{}", id)), &admin)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn unknown_appointment_is_not_found() {
    let ctx = TestContext::new().await;
    let token = ctx.customer("driver@example.com").await;

    let response = authed(
        ctx.server.get(&format!("/api/appointments/{}", Uuid::new_v4())),
        &token,
    )
    .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn receipt_moves_booking_to_verification() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;
    let token = ctx.customer("driver@example.com").await;
    let id = ctx.book(&token, &service, MONDAY, "09:00").await.json::<Value>()["appointmentId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = authed(ctx.server.patch(&format!("/api/appointments/{}/receipt", id)), &token)
        .json(&json!({ "receiptBase64": "data:image/png;base64,AAAA" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "pending_verification");
    assert_eq!(body["message"], "Receipt uploaded successfully");

    // a booking awaiting verification no longer holds its slot
    let slots = ctx
        .server
        .get("/api/settings/available-slots")
        .add_query_param("date", MONDAY)
        .add_query_param("serviceId", service.id.to_string())
        .await
        .json::<Value>();
    assert!(slots["availableSlots"].as_array().unwrap().contains(&json!("09:00")));
}

#[tokio::test]
async fn empty_receipt_is_bad_request() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;
    let token = ctx.customer("driver@example.com").await;
    let id = ctx.book(&token, &service, MONDAY, "09:00").await.json::<Value>()["appointmentId"]
        .as_str()
        .unwrap()
        .to_string();

    authed(ctx.server.patch(&format!("/api/appointments/{}/receipt", id)), &token)
        .json(&json!({ "receiptBase64": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
