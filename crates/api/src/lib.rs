//! # SmokeCheck API
//!
//! The web server for the smoke-emission test booking service: customer
//! booking, receipt upload, administrator review, pricing and working-hours
//! management, and the slot availability query the booking form relies on.
//!
//! ## Architecture
//!
//! - **Routes**: API endpoints and URL structure
//! - **Handlers**: request processing on top of `smokecheck-core`
//! - **Middleware**: authentication extractors and error mapping
//! - **Config**: environment configuration
//! - **Mailer**: outbound transactional email
//!
//! Storage is reached only through the store traits, so the same router
//! runs on Postgres or on the in-memory store.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Outbound email
pub mod mailer;
/// Authentication extractors and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    http::{HeaderValue, Method, StatusCode, header},
};
use eyre::Result;
use smokecheck_core::{Stores, store::IdentityProvider};
use smokecheck_db::{DbPool, MemoryStore, PgStore};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::config::ApiConfig;
use crate::mailer::{LogMailer, Mailer};

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub stores: Stores,
    pub identity: Arc<dyn IdentityProvider>,
    pub mailer: Arc<dyn Mailer>,
    /// Attach the cause of 5xx errors to responses
    pub expose_errors: bool,
    pub otp_ttl_minutes: i64,
}

impl ApiState {
    /// State whose every store is backed by one Postgres pool.
    pub fn postgres(pool: DbPool, config: &ApiConfig) -> Self {
        let store = Arc::new(PgStore::new(pool, config.identity()));
        Self::with_store(store, config)
    }

    /// State backed by a single in-process store.
    pub fn in_memory(store: Arc<MemoryStore>, config: &ApiConfig) -> Self {
        Self::with_store(store, config)
    }

    fn with_store<S>(store: Arc<S>, config: &ApiConfig) -> Self
    where
        S: smokecheck_core::store::WorkingHoursStore
            + smokecheck_core::store::ServiceStore
            + smokecheck_core::store::AppointmentStore
            + smokecheck_core::store::NotificationStore
            + smokecheck_core::store::AuditStore
            + IdentityProvider
            + 'static,
    {
        Self {
            stores: Stores {
                working_hours: store.clone(),
                services: store.clone(),
                appointments: store.clone(),
                notifications: store.clone(),
                audit: store.clone(),
            },
            identity: store,
            mailer: Arc::new(LogMailer::new(config.mail_from.clone(), config.mail_enabled)),
            expose_errors: !config.is_production(),
            otp_ttl_minutes: config.otp_ttl_minutes,
        }
    }
}

/// Builds the router with every route and the error redaction layer.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::auth::routes())
        .merge(routes::appointment::routes())
        .merge(routes::admin::routes())
        .merge(routes::service::routes())
        .merge(routes::availability::routes())
        .merge(routes::notification::routes())
        .layer(axum::middleware::map_response_with_state(
            state.clone(),
            middleware::error_handling::redact_server_errors,
        ))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(origins)
        .allow_credentials(true)
}

/// Starts the API server
///
/// Connects to Postgres when `DATABASE_URL` is configured and falls back to
/// the in-memory store otherwise.
pub async fn start_server(config: ApiConfig) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = match &config.database_url {
        Some(database_url) => {
            let pool = smokecheck_db::create_pool(database_url).await?;
            smokecheck_db::schema::initialize_database(&pool).await?;
            ApiState::postgres(pool, &config)
        }
        None => {
            warn!("DATABASE_URL not set, using the in-memory store");
            ApiState::in_memory(Arc::new(MemoryStore::new(config.identity())), &config)
        }
    };
    let state = Arc::new(state);

    let app = app(state).layer(TraceLayer::new_for_http());

    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|_: BoxError| async {
                StatusCode::REQUEST_TIMEOUT
            }))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
