//! `GET /api/bdtopo?address=..[&side=gauche|droite]`: road sections of a street.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{required_address, resolve_address};
use crate::error::ApiError;
use crate::http::{extract::ApiQuery, AppState};
use crate::upstream::address::street_level_id;
use crate::upstream::geoplateforme::is_street_id;
use crate::upstream::RoadSide;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BdTopoParams {
    pub address: Option<String>,
    pub side: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BdTopoResponse {
    pub success: bool,
    pub ban_id: String,
    pub total_features: u64,
    pub features: Vec<Value>,
}

pub async fn road_sections(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<BdTopoParams>,
) -> Result<Json<BdTopoResponse>, ApiError> {
    let address = required_address(params.address)?;
    let side = match params.side.as_deref().filter(|s| !s.is_empty()) {
        Some(side) => side.parse::<RoadSide>().map_err(ApiError::ValidationFailed)?,
        None => RoadSide::default(),
    };

    let ban_id = street_level_id(&resolve_address(&state, &address).await?);
    if !is_street_id(&ban_id) {
        tracing::warn!(ban_id = %ban_id, "Unexpected BAN identifier format");
        return Err(ApiError::NoDataFound("No BD TOPO data found"));
    }

    let sections = state.geoplateforme.road_sections(&ban_id, side).await?;

    Ok(Json(BdTopoResponse {
        success: true,
        ban_id,
        total_features: sections.number_returned.unwrap_or(0),
        features: sections.features,
    }))
}
