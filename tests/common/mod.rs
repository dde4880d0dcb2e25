//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use chrono::Utc;
use datawatchman::config::AppConfig;
use datawatchman::domain::{NewSubmission, PremiseRow, PremisesPage};
use datawatchman::http::{build_router, AppState};
use datawatchman::store::{PremisesStore, StoreError, SubmissionReceipt, SubmissionStore};
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;
use uuid::Uuid;

pub const ORIGIN: &str = "https://datawatchman.dev";

/// Serve `router` on an ephemeral port, returning its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

/// Defaults with every upstream pointed at a closed port.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    let dead = "http://127.0.0.1:9".to_string();
    config.upstream.ban_url = dead.clone();
    config.upstream.geoplateforme_url = dead.clone();
    config.upstream.insee_url = dead.clone();
    config.upstream.paris_works_url = format!("{dead}/records");
    config.upstream.timeout_secs = 2;
    config.usrn.require_password = false;
    config
}

pub fn state(config: AppConfig) -> AppState {
    AppState::from_config(config).unwrap()
}

/// Send one request through a freshly built router.
pub async fn call(state: &AppState, request: Request<Body>) -> Response<Body> {
    build_router(state.clone()).oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("origin", ORIGIN)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("origin", ORIGIN)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Submission store that keeps rows in memory.
#[derive(Default)]
pub struct MemorySubmissions {
    pub rows: Mutex<Vec<NewSubmission>>,
}

impl MemorySubmissions {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissions {
    async fn insert(&self, submission: NewSubmission) -> Result<SubmissionReceipt, StoreError> {
        self.rows.lock().unwrap().push(submission);
        Ok(SubmissionReceipt {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        })
    }
}

/// Premises keyed by USRN, returned ordered by UPRN like the SQL store.
#[derive(Default)]
pub struct MemoryPremises {
    pub by_usrn: HashMap<i64, Vec<PremiseRow>>,
}

#[async_trait]
impl PremisesStore for MemoryPremises {
    async fn premises_for_usrn(&self, usrn: i64) -> Result<PremisesPage, StoreError> {
        let mut rows = self.by_usrn.get(&usrn).cloned().unwrap_or_default();
        rows.sort_by(|a, b| a.uprn.cmp(&b.uprn));
        Ok(PremisesPage {
            total_count: rows.len() as i64,
            rows,
        })
    }
}

/// Store whose every call fails.
pub struct BrokenStore;

#[async_trait]
impl SubmissionStore for BrokenStore {
    async fn insert(&self, _: NewSubmission) -> Result<SubmissionReceipt, StoreError> {
        Err(StoreError::Database("connection refused".into()))
    }
}

pub fn premise(uprn: &str, postcode: Option<&str>, current: bool, future: bool) -> PremiseRow {
    PremiseRow {
        uprn: Some(uprn.to_string()),
        postcode: postcode.map(str::to_string),
        country: Some("England".into()),
        local_authority: Some("E09000033".into()),
        region: Some("E12000007".into()),
        current_gigabit: current,
        future_gigabit: future,
        lot_name: Some("Lot 29".into()),
        subsidy_control_status: Some("Under review".into()),
    }
}
