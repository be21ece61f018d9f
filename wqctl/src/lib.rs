//! # wqctl: water quality control layer
//!
//! `wqctl` is the back office service a water utility uses to track where water is sampled
//! and what was measured there. It manages three kinds of records, each owned by an
//! organization:
//!
//! - **Testing points**: physical sampling places (reservoirs, distribution network taps,
//!   households), with coordinates and an active/inactive status.
//! - **Quality tests**: laboratory analyses over one or more testing points, with a list of
//!   measured parameters.
//! - **Daily records**: routine field readings such as residual chlorine levels.
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum). Handlers in
//! [`api::handlers`] extract the caller's organization ([`auth::OrganizationContext`]) and
//! delegate to the services in [`services`], which own the business rules: sequential code
//! generation, record lifecycles (activation, soft delete, restore, physical delete) and
//! enrichment.
//!
//! Organizations and users are not stored here. They live in an external identity service,
//! reached through the [`identity::AdminDirectory`] seam. Lookups against it fail open: when
//! the service is slow or down, responses still succeed with the organization left `null` and
//! users replaced by an all-null placeholder.
//!
//! Records are persisted through the [`db::RecordStore`] trait, backed either by an in-memory
//! map (the default, for development and tests) or by PostgreSQL.
//!
//! ## Configuration
//!
//! Configuration is read from a YAML file (`config.yaml` by default) and `WQCTL_`-prefixed
//! environment variables; see [`config`] for the layering rules.
//!
//! ## Testing
//!
//! Tests run against the in-memory store and an in-process identity directory, see the
//! `test_utils` module (available with the `test-utils` feature). Identity client tests stand up
//! a `wiremock` server.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod identity;
mod openapi;
pub mod services;
pub mod telemetry;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::{HeaderValue, Uri},
    routing::{get, patch},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;

use crate::{
    api::handlers::{daily_records, quality_tests, testing_points},
    config::{CorsOrigin, StorageConfig},
    db::{InMemoryStore, PgRecordStore, RecordStore},
    errors::Error,
    identity::{AdminDirectory, client::IdentityClient},
    openapi::QualityApiDoc,
    services::{DailyRecordService, QualityTestService, TestingPointService},
};

/// Shared state handed to every handler.
///
/// Services are cheap to build, so handlers construct the one they need per request from the
/// shared store and identity directory.
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    pub directory: Arc<dyn AdminDirectory>,
}

impl AppState {
    pub fn testing_points(&self) -> TestingPointService {
        TestingPointService::new(self.store.clone(), self.directory.clone())
    }

    pub fn quality_tests(&self) -> QualityTestService {
        QualityTestService::new(self.store.clone(), self.directory.clone())
    }

    pub fn daily_records(&self) -> DailyRecordService {
        DailyRecordService::new(self.store.clone(), self.directory.clone())
    }
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            // Browsers send the bare origin, without the trailing slash `Url` adds
            CorsOrigin::Url(url) => url.origin().ascii_serialization().parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Routes of the quality API, relative to `/api/admin/quality`.
fn quality_routes() -> Router<AppState> {
    Router::new()
        // Testing points
        .route(
            "/sampling-points",
            get(testing_points::list_testing_points).post(testing_points::create_testing_point),
        )
        .route("/sampling-points/active", get(testing_points::list_active_testing_points))
        .route("/sampling-points/inactive", get(testing_points::list_inactive_testing_points))
        .route(
            "/sampling-points/{id}",
            get(testing_points::get_testing_point)
                .put(testing_points::update_testing_point)
                .delete(testing_points::delete_testing_point),
        )
        .route("/sampling-points/activate/{id}", patch(testing_points::activate_testing_point))
        .route("/sampling-points/deactivate/{id}", patch(testing_points::deactivate_testing_point))
        // Quality tests
        .route(
            "/tests",
            get(quality_tests::list_quality_tests).post(quality_tests::create_quality_test),
        )
        .route(
            "/tests/{id}",
            get(quality_tests::get_quality_test)
                .put(quality_tests::update_quality_test)
                .delete(quality_tests::delete_quality_test),
        )
        .route(
            "/tests/physical/{id}",
            axum::routing::delete(quality_tests::physically_delete_quality_test),
        )
        .route("/tests/restore/{id}", patch(quality_tests::restore_quality_test))
        // Daily records
        .route(
            "/daily-records",
            get(daily_records::list_daily_records).post(daily_records::create_daily_record),
        )
        .route(
            "/daily-records/{id}",
            get(daily_records::get_daily_record)
                .put(daily_records::update_daily_record)
                .delete(daily_records::delete_daily_record),
        )
        .route(
            "/daily-records/physical/{id}",
            axum::routing::delete(daily_records::physically_delete_daily_record),
        )
        .route("/daily-records/restore/{id}", patch(daily_records::restore_daily_record))
}

async fn route_not_found(uri: Uri) -> Error {
    Error::NotFound {
        resource: "Route".to_string(),
        id: uri.path().to_string(),
    }
}

/// Build the application router.
///
/// Mounts the quality API under `/api/admin/quality`, the health check at `/healthz`, API
/// documentation at `/admin/docs` (OpenAPI document at `/api-docs/openapi.json`) and, when enabled,
/// Prometheus metrics at `/internal/metrics`. CORS and request tracing wrap everything.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors_layer = create_cors_layer(&state.config)?;
    let enable_metrics = state.config.enable_metrics;

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api/admin/quality", quality_routes())
        .route("/api-docs/openapi.json", get(|| async { Json(QualityApiDoc::openapi()) }))
        .fallback(route_not_found)
        .with_state(state)
        .merge(Scalar::with_url("/admin/docs", QualityApiDoc::openapi()))
        .layer(cors_layer);

    if enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Open the configured record store.
///
/// The PostgreSQL handle is returned separately so its pool can be closed on shutdown.
#[instrument(skip_all)]
async fn setup_store(config: &Config) -> anyhow::Result<(Arc<dyn RecordStore>, Option<PgRecordStore>)> {
    match &config.storage {
        StorageConfig::Memory => {
            info!("Using in-memory record store; records are lost on restart");
            Ok((Arc::new(InMemoryStore::new()), None))
        }
        StorageConfig::Postgres { url, pool } => {
            let store = PgRecordStore::connect(url, pool).await?;
            info!("Connected to PostgreSQL record store");
            Ok((Arc::new(store.clone()), Some(store)))
        }
    }
}

/// The assembled service: router plus the resources to release on shutdown.
pub struct Application {
    router: Router,
    config: Config,
    pg_store: Option<PgRecordStore>,
}

impl Application {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting water quality control layer with configuration: {:#?}", config);

        let (store, pg_store) = setup_store(&config).await?;
        let directory = Arc::new(IdentityClient::new(&config.identity)?);
        info!(base_url = %config.identity.base_url, "Identity service client configured");

        let app_state = AppState::builder()
            .config(config.clone())
            .store(store)
            .directory(directory)
            .build();
        let router = build_router(app_state)?;

        Ok(Self {
            router,
            config,
            pg_store,
        })
    }

    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Water quality control layer listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(store) = self.pg_store {
            info!("Closing database connections...");
            store.close().await;
        }

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
