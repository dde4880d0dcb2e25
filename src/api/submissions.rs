//! `POST /api/submissions`: record a dataset missing UK identifiers.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::SubmissionRequest;
use crate::error::ApiError;
use crate::http::{extract::ApiJson, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionCreated {
    pub success: bool,
    pub message: &'static str,
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SubmissionRequest>,
) -> Result<Json<SubmissionCreated>, ApiError> {
    let submission = body.validate().map_err(ApiError::ValidationFailed)?;

    let store = state
        .submissions
        .as_ref()
        .ok_or(ApiError::ConfigurationMissing("submissions database"))?;

    let receipt = store.insert(submission).await?;
    tracing::info!(id = %receipt.id, "Submission recorded");

    Ok(Json(SubmissionCreated {
        success: true,
        message: "Report submitted successfully!",
        id: receipt.id,
        created_at: receipt.created_at,
    }))
}
