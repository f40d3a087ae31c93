use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{HeaderValue, header};
use axum_test::{TestRequest, TestServer};
use serde_json::{Value, json};
use smokecheck_api::{
    ApiState, app,
    config::ApiConfig,
    mailer::{EmailMessage, Mailer},
};
use smokecheck_core::{
    models::{
        service::{NewService, Service},
        working_hours::{DayOfWeek, DaySchedule, WorkingHoursConfig},
    },
    store::{ServiceStore, WorkingHoursStore},
};
use smokecheck_db::{IdentityConfig, MemoryStore};

pub const ADMIN_EMAIL: &str = "admin@setcam.test";
pub const PASSWORD: &str = "secret-password";

// 2024-06-03 is a Monday, 2024-06-02 a Sunday
pub const MONDAY: &str = "2024-06-03";
pub const SUNDAY: &str = "2024-06-02";

/// Captures every message instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, EmailMessage)>>,
}

impl RecordingMailer {
    pub fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.subject.clone())
            .collect()
    }

    pub fn last_to(&self, to: &str) -> Option<EmailMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(recipient, _)| recipient == to)
            .map(|(_, message)| message.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, message: EmailMessage) -> eyre::Result<()> {
        self.sent.lock().unwrap().push((to.to_string(), message));
        Ok(())
    }
}

/// Always fails to deliver.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _to: &str, _message: EmailMessage) -> eyre::Result<()> {
        Err(eyre::eyre!("smtp relay unreachable"))
    }
}

pub struct TestContext {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(ApiConfig::default()).await
    }

    pub async fn with_config(config: ApiConfig) -> Self {
        let store = Arc::new(MemoryStore::new(IdentityConfig::default()));
        let mailer = Arc::new(RecordingMailer::default());

        let mut state = ApiState::in_memory(store.clone(), &config);
        state.mailer = mailer.clone();

        store
            .create_admin(ADMIN_EMAIL, PASSWORD, "Station Admin")
            .await
            .unwrap();

        Self {
            server: TestServer::new(app(Arc::new(state))).unwrap(),
            store,
            mailer,
        }
    }

    /// Registers a customer and returns their session token.
    pub async fn customer(&self, email: &str) -> String {
        self.server
            .post("/api/auth/register")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        self.login(email).await
    }

    pub async fn admin(&self) -> String {
        self.login(ADMIN_EMAIL).await
    }

    pub async fn login(&self, email: &str) -> String {
        let response = self
            .server
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Adds a service directly to the store.
    pub async fn service(&self, name: &str, duration_minutes: i32, price: f64) -> Service {
        ServiceStore::create(
            self.store.as_ref(),
            NewService {
                name: name.to_string(),
                description: None,
                category: Some("standard".to_string()),
                duration_minutes,
                price,
            },
        )
        .await
        .unwrap()
    }

    /// Monday 08:00-10:00, every other day closed.
    pub async fn short_monday(&self) {
        let config = WorkingHoursConfig::empty()
            .with_day(DayOfWeek::Monday, DaySchedule::open("08:00", "10:00"))
            .with_day(DayOfWeek::Sunday, DaySchedule::closed());
        WorkingHoursStore::put(self.store.as_ref(), &config)
            .await
            .unwrap();
    }

    pub async fn book(&self, token: &str, service: &Service, date: &str, time: &str) -> axum_test::TestResponse {
        authed(self.server.post("/api/appointments"), token)
            .json(&booking_body(service, date, time))
            .await
    }
}

pub fn authed(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

pub fn booking_body(service: &Service, date: &str, time: &str) -> Value {
    json!({
        "serviceId": service.id,
        "vehicleInfo": {
            "make": "Toyota",
            "model": "Vios",
            "year": "2019",
            "plateNumber": "ABC 1234"
        },
        "appointmentDate": date,
        "appointmentTime": time,
        "paymentMethod": "gcash"
    })
}
