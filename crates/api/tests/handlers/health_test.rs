use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::test_utils::TestContext;

#[tokio::test]
async fn health_reports_ok() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn version_reports_crate_version() {
    let ctx = TestContext::new().await;

    let body = ctx.server.get("/version").await.json::<Value>();

    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
