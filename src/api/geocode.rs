//! `GET /api/geocode?lat=..&lon=..`: reverse geocoding.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::{extract::ApiQuery, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GeocodeParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub success: bool,
    pub address: String,
}

pub async fn reverse(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<GeocodeParams>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let (lat, lon) = coordinates(&params).map_err(ApiError::ValidationFailed)?;

    match state.geoplateforme.reverse(lat, lon).await? {
        Some(address) => Ok(Json(GeocodeResponse {
            success: true,
            address,
        })),
        None => Err(ApiError::NoDataFound("No address found for these coordinates")),
    }
}

fn coordinates(params: &GeocodeParams) -> Result<(f64, f64), String> {
    let (Some(lat), Some(lon)) = (
        params.lat.as_deref().filter(|s| !s.is_empty()),
        params.lon.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err("Missing latitude or longitude parameters".to_string());
    };

    let invalid = || "Invalid latitude or longitude values".to_string();
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;

    // Range checks also reject NaN and infinities.
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(invalid());
    }
    Ok((lat, lon))
}
