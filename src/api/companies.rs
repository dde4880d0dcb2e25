//! `GET /api/companies?address=..`: active employers registered on a street.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{required_address, resolve_address};
use crate::error::ApiError;
use crate::http::{extract::ApiQuery, AppState};
use crate::upstream::address::compact_id;
use crate::upstream::insee::Company;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompaniesParams {
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompaniesResponse {
    pub success: bool,
    pub total: u64,
    pub companies: Vec<Company>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searched_address_id: Option<String>,
}

impl CompaniesResponse {
    fn empty(message: &'static str, searched_address_id: Option<String>) -> Self {
        Self {
            success: true,
            total: 0,
            companies: Vec::new(),
            message: Some(message),
            searched_address_id,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CompaniesParams>,
) -> Result<Json<CompaniesResponse>, ApiError> {
    let address = required_address(params.address)?;

    if !state.insee.is_configured() {
        return Ok(Json(CompaniesResponse::empty(
            "INSEE API key not configured - returning empty results",
            None,
        )));
    }

    let address_id = compact_id(&resolve_address(&state, &address).await?);

    let Some(found) = state.insee.establishments_at(&address_id).await? else {
        return Ok(Json(CompaniesResponse::empty(
            "No companies found on this street",
            Some(address_id),
        )));
    };

    let companies: Vec<Company> = found.etablissements.into_iter().map(Company::from).collect();
    tracing::debug!(address_id = %address_id, count = companies.len(), "Companies found");

    Ok(Json(CompaniesResponse {
        success: true,
        total: found.header.total,
        companies,
        message: None,
        searched_address_id: Some(address_id),
    }))
}
