//! Persistence behind traits.
//!
//! # Data Flow
//! ```text
//! submissions handler → SubmissionStore::insert → submissions table
//! usrn-lookup handler → PremisesStore::premises_for_usrn → BDUK ⋈ OS identifiers
//! ```
//!
//! Handlers hold `Arc<dyn ...>` so tests can substitute in-memory stores.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{NewSubmission, PremisesPage};

pub use postgres::{PostgresPremisesStore, PostgresSubmissionStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// Identity the database assigned to a new report.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Append-only report storage.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert(&self, submission: NewSubmission) -> Result<SubmissionReceipt, StoreError>;
}

/// Read-only premises lookup. Rows are ordered by UPRN.
#[async_trait]
pub trait PremisesStore: Send + Sync {
    async fn premises_for_usrn(&self, usrn: i64) -> Result<PremisesPage, StoreError>;
}
