use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use smokecheck_core::{
    models::notification::{NewNotification, NotificationKind},
    store::NotificationStore,
};
use uuid::Uuid;

use crate::test_utils::{TestContext, authed};

async fn seeded(ctx: &TestContext, email: &str) -> (String, Uuid) {
    let token = ctx.customer(email).await;
    let caller = authed(ctx.server.post("/api/auth/verify"), &token)
        .await
        .json::<Value>();
    let user_id: Uuid = caller["user"]["userId"].as_str().unwrap().parse().unwrap();

    let notification = NotificationStore::create(
        ctx.store.as_ref(),
        NewNotification {
            user_id,
            kind: NotificationKind::Reminder,
            message: "Your test is tomorrow at 09:00".to_string(),
            appointment_id: None,
        },
    )
    .await
    .unwrap();
    (token, notification.id)
}

#[tokio::test]
async fn inbox_lists_own_notifications() {
    let ctx = TestContext::new().await;
    let (token, id) = seeded(&ctx, "driver@example.com").await;

    let inbox = authed(ctx.server.get("/api/notifications"), &token)
        .await
        .json::<Value>();

    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["id"], id.to_string());
    assert_eq!(inbox[0]["type"], "reminder");
    assert_eq!(inbox[0]["read"], false);
}

#[tokio::test]
async fn mark_read_then_soft_delete() {
    let ctx = TestContext::new().await;
    let (token, id) = seeded(&ctx, "driver@example.com").await;

    authed(ctx.server.patch(&format!("/api/notifications/{}/read", id)), &token)
        .await
        .assert_status_ok();
    let inbox = authed(ctx.server.get("/api/notifications"), &token)
        .await
        .json::<Value>();
    assert_eq!(inbox[0]["read"], true);

    authed(ctx.server.delete(&format!("/api/notifications/{}", id)), &token)
        .await
        .assert_status_ok();

    let inbox = authed(ctx.server.get("/api/notifications"), &token)
        .await
        .json::<Value>();
    assert_eq!(inbox, json!([]));

    let trash = authed(ctx.server.get("/api/notifications"), &token)
        .add_query_param("deleted", true)
        .await
        .json::<Value>();
    assert_eq!(trash[0]["id"], id.to_string());
    assert_eq!(trash[0]["deleted"], true);
}

#[tokio::test]
async fn another_users_notification_is_not_found() {
    let ctx = TestContext::new().await;
    let (_, id) = seeded(&ctx, "owner@example.com").await;
    let stranger = ctx.customer("stranger@example.com").await;

    authed(ctx.server.patch(&format!("/api/notifications/{}/read", id)), &stranger)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    authed(ctx.server.delete(&format!("/api/notifications/{}", id)), &stranger)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notifications_require_login() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/api/notifications")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
