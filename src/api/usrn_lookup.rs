//! `POST /api/usrn-lookup`: gigabit availability for the premises on a street.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::UsrnConfig;
use crate::domain::{parse_usrn, UsrnReport, UsrnRequest};
use crate::error::ApiError;
use crate::http::{extract::ApiJson, AppState};

#[derive(Debug, Serialize)]
pub struct UsrnLookupResponse {
    pub success: bool,
    pub data: UsrnReport,
}

pub async fn lookup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UsrnRequest>,
) -> Result<Json<UsrnLookupResponse>, ApiError> {
    let raw = body.usrn.unwrap_or_default();
    let usrn = parse_usrn(&raw).map_err(ApiError::ValidationFailed)?;

    check_password(&state.config.usrn, body.password.as_deref())?;

    let store = state
        .premises
        .as_ref()
        .ok_or(ApiError::ConfigurationMissing("analytics database"))?;

    let page = store.premises_for_usrn(usrn).await?;
    if page.rows.is_empty() {
        return Err(ApiError::NoDataFound("No data found for this USRN"));
    }

    tracing::debug!(usrn, rows = page.rows.len(), "USRN lookup");
    Ok(Json(UsrnLookupResponse {
        success: true,
        data: UsrnReport::build(raw, page),
    }))
}

fn check_password(config: &UsrnConfig, supplied: Option<&str>) -> Result<(), ApiError> {
    if !config.require_password {
        return Ok(());
    }
    let expected = config
        .access_password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::ConfigurationMissing("USRN access password"))?;

    if supplied == Some(expected) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}
