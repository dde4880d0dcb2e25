//! Paris open data: `chantiers-a-paris` street-works records.

use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{get_json, UpstreamError};

const UPSTREAM: &str = "paris_open_data";

/// Filters accepted by the records endpoint, already validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorksFilter {
    pub limit: u32,
    pub offset: Option<u32>,
    pub arrondissement: Option<String>,
    pub starts_on_or_after: Option<NaiveDate>,
    pub ends_on_or_before: Option<NaiveDate>,
    pub active_on: Option<NaiveDate>,
}

impl WorksFilter {
    /// ODSQL `where` clause, `None` without conditions.
    pub fn where_clause(&self) -> Option<String> {
        let mut conditions = Vec::new();

        if let Some(arrondissement) = &self.arrondissement {
            conditions.push(format!("cp_arrondissement=\"{arrondissement}\""));
        }
        if let Some(date) = self.starts_on_or_after {
            conditions.push(format!("date_debut>=\"{date}\""));
        }
        if let Some(date) = self.ends_on_or_before {
            conditions.push(format!("date_fin<=\"{date}\""));
        }
        if let Some(today) = self.active_on {
            conditions.push(format!("date_debut<=\"{today}\" AND date_fin>=\"{today}\""));
        }

        if conditions.is_empty() {
            None
        } else {
            Some(conditions.join(" AND "))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordsResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub results: Vec<WorkRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkRecord {
    pub num_emprise: Option<String>,
    pub cp_arrondissement: Option<String>,
    pub date_debut: Option<String>,
    pub date_fin: Option<String>,
    pub chantier_categorie: Option<String>,
    pub moa_principal: Option<String>,
    pub surface: Option<f64>,
    pub chantier_synthese: Option<String>,
    pub localisation_detail: Option<Vec<String>>,
    pub localisation_stationnement: Option<Vec<String>>,
    pub demande_cite_id: Option<String>,
    pub chantier_cite_id: Option<String>,
    pub geo_shape: Option<Value>,
    pub geo_point_2d: Option<Value>,
}

/// A work site as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSite {
    pub id: Option<String>,
    pub arrondissement: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub contractor: Option<String>,
    pub area: Option<f64>,
    pub description: Option<String>,
    pub location_details: Option<Vec<String>>,
    pub parking_impact: Option<Vec<String>>,
    pub request_id: Option<String>,
    pub work_site_id: Option<String>,
    pub geometry: Option<Value>,
    pub coordinates: Option<Value>,
}

impl From<WorkRecord> for WorkSite {
    fn from(r: WorkRecord) -> Self {
        WorkSite {
            id: r.num_emprise,
            arrondissement: r.cp_arrondissement,
            start_date: r.date_debut,
            end_date: r.date_fin,
            category: r.chantier_categorie,
            contractor: r.moa_principal,
            area: r.surface,
            description: r.chantier_synthese,
            location_details: r.localisation_detail,
            parking_impact: r.localisation_stationnement,
            request_id: r.demande_cite_id,
            work_site_id: r.chantier_cite_id,
            geometry: r.geo_shape,
            coordinates: r.geo_point_2d,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParisWorksClient {
    http: Client,
    records_url: String,
}

impl ParisWorksClient {
    pub fn new(http: Client, records_url: &str) -> Self {
        Self {
            http,
            records_url: records_url.to_string(),
        }
    }

    pub async fn records(&self, filter: &WorksFilter) -> Result<RecordsResponse, UpstreamError> {
        let mut params = vec![("limit", filter.limit.to_string())];
        if let Some(offset) = filter.offset {
            params.push(("offset", offset.to_string()));
        }
        if let Some(clause) = filter.where_clause() {
            params.push(("where", clause));
        }

        let request = self.http.get(&self.records_url).query(&params);
        get_json(UPSTREAM, request).await
    }
}
