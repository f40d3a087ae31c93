use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use smokecheck_core::models::service::Service;

use crate::test_utils::{MONDAY, TestContext, authed};

/// Books 09:00 on Monday and uploads a receipt, returning the appointment id.
async fn verified_booking(ctx: &TestContext, token: &str) -> (Service, String) {
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;
    let id = ctx.book(token, &service, MONDAY, "09:00").await.json::<Value>()["appointmentId"]
        .as_str()
        .unwrap()
        .to_string();
    authed(ctx.server.patch(&format!("/api/appointments/{}/receipt", id)), token)
        .json(&json!({ "receiptBase64": "data:image/png;base64,AAAA" }))
        .await
        .assert_status_ok();
    (service, id)
}

fn test_result(outcome: &str) -> Value {
    json!({
        "emissionTestResult": {
            "co2Level": 1.2,
            "smokeOpacity": 0.4,
            "result": outcome,
            "remarks": "within limits"
        }
    })
}

#[test_log::test(tokio::test)]
async fn receipt_approve_and_complete() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("driver@example.com").await;
    let admin = ctx.admin().await;
    let (_, id) = verified_booking(&ctx, &customer).await;

    let approved = authed(ctx.server.patch(&format!("/api/admin/appointments/{}/approve", id)), &admin).await;
    approved.assert_status_ok();
    assert_eq!(approved.json::<Value>()["status"], "approved");

    let completed = authed(ctx.server.patch(&format!("/api/admin/appointments/{}/result", id)), &admin)
        .json(&test_result("passed"))
        .await;
    completed.assert_status_ok();
    assert_eq!(completed.json::<Value>()["status"], "completed");

    let stored = authed(ctx.server.get(&format!("/api/appointments/{}", id)), &customer)
        .await
        .json::<Value>();
    assert_eq!(stored["emissionTestResult"]["result"], "passed");

    let notifications = authed(ctx.server.get("/api/notifications"), &customer)
        .await
        .json::<Value>();
    assert_eq!(notifications.as_array().unwrap().len(), 1);
    assert_eq!(notifications[0]["type"], "approved");

    let audit = authed(ctx.server.get("/api/admin/audit-logs"), &admin)
        .await
        .json::<Value>();
    let actions: Vec<&str> = audit
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["entered_results", "approved_appointment"]);

    assert_eq!(
        ctx.mailer.subjects(),
        vec![
            "Appointment Booking Confirmation - SET CAM".to_string(),
            "Appointment Approved - SET CAM".to_string(),
            "Emission Test Results Available - SET CAM".to_string(),
        ]
    );
}

#[tokio::test]
async fn approve_with_result_stores_it() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("driver@example.com").await;
    let admin = ctx.admin().await;
    let (_, id) = verified_booking(&ctx, &customer).await;

    authed(ctx.server.patch(&format!("/api/admin/appointments/{}/approve", id)), &admin)
        .json(&test_result("failed"))
        .await
        .assert_status_ok();

    let stored = authed(ctx.server.get(&format!("/api/appointments/{}", id)), &admin)
        .await
        .json::<Value>();
    assert_eq!(stored["status"], "approved");
    assert_eq!(stored["emissionTestResult"]["result"], "failed");
}

#[tokio::test]
async fn approve_refuses_a_malformed_body() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("driver@example.com").await;
    let admin = ctx.admin().await;
    let (_, id) = verified_booking(&ctx, &customer).await;
    let path = format!("/api/admin/appointments/{}/approve", id);

    let wrong_type = authed(ctx.server.patch(&path), &admin)
        .json(&json!({
            "emissionTestResult": {
                "co2Level": "high",
                "smokeOpacity": 0.4,
                "result": "passed"
            }
        }))
        .await;
    wrong_type.assert_status(StatusCode::BAD_REQUEST);
    assert!(wrong_type.json::<Value>()["error"].is_string());

    let truncated = authed(ctx.server.patch(&path), &admin)
        .text("{\"emissionTestResult\":")
        .content_type("application/json")
        .await;
    truncated.assert_status(StatusCode::BAD_REQUEST);

    let stored = authed(ctx.server.get(&format!("/api/appointments/{}", id)), &admin)
        .await
        .json::<Value>();
    assert_eq!(stored["status"], "pending_verification");
    assert_eq!(stored["emissionTestResult"], Value::Null);
}

#[tokio::test]
async fn reject_records_reason_and_notifies() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("driver@example.com").await;
    let admin = ctx.admin().await;
    let (_, id) = verified_booking(&ctx, &customer).await;

    let response = authed(ctx.server.patch(&format!("/api/admin/appointments/{}/reject", id)), &admin)
        .json(&json!({ "reason": "Receipt is unreadable" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "rejected");

    let notifications = authed(ctx.server.get("/api/notifications"), &customer)
        .await
        .json::<Value>();
    assert_eq!(notifications[0]["type"], "rejected");
    assert!(
        notifications[0]["message"]
            .as_str()
            .unwrap()
            .contains("Receipt is unreadable")
    );

    let email = ctx.mailer.last_to("driver@example.com").unwrap();
    assert_eq!(email.subject, "Appointment Payment Issue - SET CAM");
}

#[tokio::test]
async fn blank_reason_is_rejected() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("driver@example.com").await;
    let admin = ctx.admin().await;
    let (_, id) = verified_booking(&ctx, &customer).await;

    authed(ctx.server.patch(&format!("/api/admin/appointments/{}/reject", id)), &admin)
        .json(&json!({ "reason": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn approving_without_receipt_is_illegal() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;
    let customer = ctx.customer("driver@example.com").await;
    let admin = ctx.admin().await;
    let id = ctx.book(&customer, &service, MONDAY, "09:00").await.json::<Value>()["appointmentId"]
        .as_str()
        .unwrap()
        .to_string();

    authed(ctx.server.patch(&format!("/api/admin/appointments/{}/approve", id)), &admin)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    authed(ctx.server.patch(&format!("/api/admin/appointments/{}/result", id)), &admin)
        .json(&test_result("passed"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn approving_after_slot_was_retaken_conflicts() {
    let ctx = TestContext::new().await;
    let first = ctx.customer("first@example.com").await;
    let second = ctx.customer("second@example.com").await;
    let admin = ctx.admin().await;
    let (service, id) = verified_booking(&ctx, &first).await;

    // the receipt released 09:00, so a second customer can take it
    ctx.book(&second, &service, MONDAY, "09:00")
        .await
        .assert_status(StatusCode::CREATED);

    authed(ctx.server.patch(&format!("/api/admin/appointments/{}/approve", id)), &admin)
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn customers_are_forbidden() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("driver@example.com").await;

    for path in [
        "/api/admin/appointments",
        "/api/admin/dashboard/stats",
        "/api/admin/audit-logs",
    ] {
        let response = authed(ctx.server.get(path), &customer).await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(
            response.json::<Value>()["error"],
            "Authorization error: Admin access required"
        );
    }
}

#[tokio::test]
async fn list_filters_by_status() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;
    let customer = ctx.customer("driver@example.com").await;
    let admin = ctx.admin().await;
    ctx.book(&customer, &service, MONDAY, "08:00").await;
    let id = ctx.book(&customer, &service, MONDAY, "08:30").await.json::<Value>()["appointmentId"]
        .as_str()
        .unwrap()
        .to_string();
    authed(ctx.server.patch(&format!("/api/appointments/{}/receipt", id)), &customer)
        .json(&json!({ "receiptBase64": "data:image/png;base64,AAAA" }))
        .await
        .assert_status_ok();

    let all = authed(ctx.server.get("/api/admin/appointments"), &admin)
        .await
        .json::<Value>();
    assert_eq!(all.as_array().unwrap().len(), 2);

    let verifying = authed(ctx.server.get("/api/admin/appointments"), &admin)
        .add_query_param("status", "pending_verification")
        .await
        .json::<Value>();
    assert_eq!(verifying.as_array().unwrap().len(), 1);
    assert_eq!(verifying[0]["id"], id);

    authed(ctx.server.get("/api/admin/appointments"), &admin)
        .add_query_param("status", "cancelled")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_counts_both_pending_stages() {
    let ctx = TestContext::new().await;
    let service = ctx.service("Standard Smoke Test", 30, 500.0).await;
    let customer = ctx.customer("driver@example.com").await;
    let admin = ctx.admin().await;
    ctx.book(&customer, &service, MONDAY, "08:00").await;
    let id = ctx.book(&customer, &service, MONDAY, "08:30").await.json::<Value>()["appointmentId"]
        .as_str()
        .unwrap()
        .to_string();
    authed(ctx.server.patch(&format!("/api/appointments/{}/receipt", id)), &customer)
        .json(&json!({ "receiptBase64": "data:image/png;base64,AAAA" }))
        .await;

    let stats = authed(ctx.server.get("/api/admin/dashboard/stats"), &admin)
        .await
        .json::<Value>();

    assert_eq!(
        stats,
        json!({ "total": 2, "pending": 2, "approved": 0, "rejected": 0, "completed": 0 })
    );
}

#[tokio::test]
async fn audit_log_limit_is_respected() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    for minutes in [30, 45, 60] {
        authed(ctx.server.post("/api/services"), &admin)
            .json(&json!({ "name": format!("Test {}", minutes), "durationMinutes": minutes, "price": 500.0 }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let entries = authed(ctx.server.get("/api/admin/audit-logs"), &admin)
        .add_query_param("limit", 2)
        .await
        .json::<Value>();

    assert_eq!(entries.as_array().unwrap().len(), 2);
}
