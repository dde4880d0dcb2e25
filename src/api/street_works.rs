//! `GET /api/french-street-works`: Paris street-works records.

use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::{extract::ApiQuery, AppState};
use crate::upstream::paris::{WorkSite, WorksFilter};

const MAX_LIMIT: u32 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorksParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub arrondissement: Option<String>,
    pub date_debut: Option<String>,
    pub date_fin: Option<String>,
    pub active_only: Option<String>,
}

impl WorksParams {
    pub fn into_filter(self, today: NaiveDate) -> Result<WorksFilter, String> {
        let limit = match non_empty(self.limit) {
            None => MAX_LIMIT,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if (1..=MAX_LIMIT).contains(&n) => n,
                _ => return Err(format!("limit must be between 1 and {MAX_LIMIT}")),
            },
        };

        let offset = non_empty(self.offset)
            .map(|raw| {
                raw.parse::<u32>()
                    .map_err(|_| "offset must be a non-negative integer".to_string())
            })
            .transpose()?;

        let arrondissement = non_empty(self.arrondissement)
            .map(|raw| {
                if raw.len() == 5 && raw.bytes().all(|b| b.is_ascii_digit()) {
                    Ok(raw)
                } else {
                    Err("arrondissement must be a 5-digit postcode".to_string())
                }
            })
            .transpose()?;

        let starts_on_or_after = date_param(self.date_debut, "dateDebut")?;
        let ends_on_or_before = date_param(self.date_fin, "dateFin")?;
        let active_on = (self.active_only.as_deref() == Some("true")).then_some(today);

        Ok(WorksFilter {
            limit,
            offset,
            arrondissement,
            starts_on_or_after,
            ends_on_or_before,
            active_on,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn date_param(value: Option<String>, name: &str) -> Result<Option<NaiveDate>, String> {
    non_empty(value)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| format!("{name} must be a date in YYYY-MM-DD format"))
        })
        .transpose()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorksResponse {
    pub success: bool,
    pub total_count: u64,
    pub count: usize,
    pub data: Vec<WorkSite>,
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<WorksParams>,
) -> Result<Json<WorksResponse>, ApiError> {
    let filter = params
        .into_filter(Utc::now().date_naive())
        .map_err(ApiError::ValidationFailed)?;

    let records = state.paris.records(&filter).await?;
    let data: Vec<WorkSite> = records.results.into_iter().map(WorkSite::from).collect();

    Ok(Json(WorksResponse {
        success: true,
        total_count: records.total_count,
        count: data.len(),
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn defaults() {
        let filter = WorksParams::default().into_filter(today()).unwrap();
        assert_eq!(filter.limit, 100);
        assert_eq!(filter.offset, None);
        assert_eq!(filter.active_on, None);
        assert_eq!(filter.where_clause(), None);
    }

    #[test]
    fn full_filter() {
        let params = WorksParams {
            limit: Some("20".into()),
            offset: Some("40".into()),
            arrondissement: Some("75011".into()),
            date_debut: Some("2025-01-01".into()),
            date_fin: Some("".into()),
            active_only: Some("true".into()),
        };
        let filter = params.into_filter(today()).unwrap();
        assert_eq!(filter.limit, 20);
        assert_eq!(filter.offset, Some(40));
        assert_eq!(filter.ends_on_or_before, None);
        assert_eq!(filter.active_on, Some(today()));
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            WorksParams { limit: Some("0".into()), ..Default::default() },
            WorksParams { limit: Some("101".into()), ..Default::default() },
            WorksParams { offset: Some("-1".into()), ..Default::default() },
            WorksParams { arrondissement: Some("75\" OR 1=1".into()), ..Default::default() },
            WorksParams { date_debut: Some("15/06/2025".into()), ..Default::default() },
            WorksParams { date_fin: Some("2025-02-30".into()), ..Default::default() },
        ];
        for params in bad {
            assert!(params.into_filter(today()).is_err());
        }
    }

    #[test]
    fn active_only_needs_literal_true() {
        let params = WorksParams {
            active_only: Some("1".into()),
            ..Default::default()
        };
        assert_eq!(params.into_filter(today()).unwrap().active_on, None);
    }
}
