//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build shared state (limiters, origin allow-list, clients, stores)
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit, CORS,
//!   security headers, metrics)
//! - Serve until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api;
use crate::config::AppConfig;
use crate::http::middleware::cors;
use crate::observability::metrics;
use crate::security::{apply_security_headers, OriginValidator, RateLimiterSet};
use crate::store::{
    postgres::lazy_pool, PostgresPremisesStore, PostgresSubmissionStore, PremisesStore,
    StoreError, SubmissionStore,
};
use crate::upstream::{
    self, AddressResolver, BanClient, GeoplateformeClient, InseeClient, ParisWorksClient,
};

pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to prepare database pool: {0}")]
    Database(#[from] StoreError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub origins: Arc<OriginValidator>,
    pub limiters: Arc<RateLimiterSet>,
    pub resolver: AddressResolver,
    pub geoplateforme: GeoplateformeClient,
    pub insee: InseeClient,
    pub paris: ParisWorksClient,
    /// `None` when no submissions database is configured.
    pub submissions: Option<Arc<dyn SubmissionStore>>,
    /// `None` when no analytics database is configured.
    pub premises: Option<Arc<dyn PremisesStore>>,
}

impl AppState {
    /// Construct every shared component. No network I/O happens here; database
    /// pools connect on first use.
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let http = upstream::build_client(&config.upstream)?;
        let up = &config.upstream;

        let submissions = match &config.database.submissions_url {
            Some(url) => {
                let pool = lazy_pool(url, &config.database)?;
                Some(Arc::new(PostgresSubmissionStore::new(pool)) as Arc<dyn SubmissionStore>)
            }
            None => {
                tracing::warn!("No submissions database configured");
                None
            }
        };

        let premises = match &config.database.analytics_url {
            Some(url) => {
                let pool = lazy_pool(url, &config.database)?;
                Some(Arc::new(PostgresPremisesStore::new(
                    pool,
                    &config.database.bduk_table,
                    &config.database.os_identifiers_table,
                )) as Arc<dyn PremisesStore>)
            }
            None => {
                tracing::warn!("No analytics database configured");
                None
            }
        };

        if up.insee_api_key.is_none() {
            tracing::warn!("INSEE API key not configured; company lookups return no results");
        }

        Ok(Self {
            origins: Arc::new(OriginValidator::from_config(&config.cors)),
            limiters: Arc::new(RateLimiterSet::from_config(
                &config.rate_limit,
                &api::GATED_ROUTES,
            )),
            resolver: AddressResolver::new(Arc::new(BanClient::new(http.clone(), &up.ban_url))),
            geoplateforme: GeoplateformeClient::new(http.clone(), &up.geoplateforme_url),
            insee: InseeClient::new(http.clone(), &up.insee_url, up.insee_api_key.clone()),
            paris: ParisWorksClient::new(http, &up.paris_works_url),
            submissions,
            premises,
            config: Arc::new(config),
        })
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let api = api::routes(&state)
        .layer(middleware::from_fn_with_state(state.origins.clone(), cors))
        .layer(DefaultBodyLimit::max(config.limits.max_body_bytes));

    let router = Router::new()
        .route("/healthz", get(healthz))
        .merge(api)
        .with_state(state)
        .layer(middleware::from_fn(metrics::track_metrics));

    apply_security_headers(router, &config.security)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.limits.request_timeout_secs,
        )))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id,
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// HTTP server for the API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        Self {
            router: build_router(state),
        }
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
