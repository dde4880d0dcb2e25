//! Missing-identifier reports.

use serde::Deserialize;
use url::Url;

const MAX_NAME: usize = 255;
const MAX_DESCRIPTION: usize = 500;

/// Who publishes or owns a dataset; also used for the reporter's sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgType {
    PublicSector,
    PrivateSector,
    AcademicResearch,
    NonProfit,
    Other,
}

impl OrgType {
    pub const ALL: [OrgType; 5] = [
        OrgType::PublicSector,
        OrgType::PrivateSector,
        OrgType::AcademicResearch,
        OrgType::NonProfit,
        OrgType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrgType::PublicSector => "Public Sector",
            OrgType::PrivateSector => "Private Sector",
            OrgType::AcademicResearch => "Academic/Research",
            OrgType::NonProfit => "Non-profit",
            OrgType::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Which UK identifier the dataset lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingType {
    Both,
    Usrn,
    Uprn,
}

impl MissingType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Both" => Some(MissingType::Both),
            "USRN" => Some(MissingType::Usrn),
            "UPRN" => Some(MissingType::Uprn),
            _ => None,
        }
    }

    /// Stored form, lowercase.
    pub fn as_stored(self) -> &'static str {
        match self {
            MissingType::Both => "both",
            MissingType::Usrn => "usrn",
            MissingType::Uprn => "uprn",
        }
    }
}

/// Report body as posted by the browser form. Every field is optional here so
/// that a missing field produces a validation message instead of a decode
/// error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionRequest {
    pub dataset_name: Option<String>,
    pub dataset_url: Option<String>,
    pub dataset_owner: Option<String>,
    pub owner_name: Option<String>,
    pub description: Option<String>,
    pub missing_type: Option<String>,
    pub job_title: Option<String>,
    pub sector: Option<String>,
}

/// A report that passed validation, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub dataset_name: String,
    pub dataset_url: String,
    pub dataset_owner: OrgType,
    pub owner_name: String,
    pub description: String,
    pub missing_type: MissingType,
    pub job_title: Option<String>,
    pub sector: OrgType,
}

impl SubmissionRequest {
    /// Validate, returning the first problem found.
    pub fn validate(self) -> Result<NewSubmission, String> {
        let dataset_name = bounded_text(self.dataset_name, "Dataset name", MAX_NAME)?;

        let dataset_url = self.dataset_url.unwrap_or_default();
        if Url::parse(&dataset_url).is_err() {
            return Err("Must be a valid URL".to_string());
        }

        let dataset_owner = org_type(self.dataset_owner.as_deref(), "Dataset owner")?;
        let owner_name = bounded_text(self.owner_name, "Owner name", MAX_NAME)?;
        let description = bounded_text(self.description, "Description", MAX_DESCRIPTION)?;

        let missing_type = MissingType::parse(self.missing_type.as_deref().unwrap_or_default())
            .ok_or_else(|| "Missing type must be one of: Both, USRN, UPRN".to_string())?;

        let job_title = match self.job_title {
            Some(title) if title.chars().count() > MAX_NAME => {
                return Err(format!("Job title must be at most {MAX_NAME} characters"));
            }
            Some(title) if title.is_empty() => None,
            other => other,
        };

        let sector = org_type(self.sector.as_deref(), "Sector")?;

        Ok(NewSubmission {
            dataset_name,
            dataset_url,
            dataset_owner,
            owner_name,
            description,
            missing_type,
            job_title,
            sector,
        })
    }
}

fn bounded_text(value: Option<String>, label: &str, max: usize) -> Result<String, String> {
    let value = value.unwrap_or_default();
    if value.is_empty() {
        return Err(format!("{label} is required"));
    }
    if value.chars().count() > max {
        return Err(format!("{label} must be at most {max} characters"));
    }
    Ok(value)
}

fn org_type(value: Option<&str>, label: &str) -> Result<OrgType, String> {
    value.and_then(OrgType::parse).ok_or_else(|| {
        let names: Vec<&str> = OrgType::ALL.iter().map(|t| t.as_str()).collect();
        format!("{label} must be one of: {}", names.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SubmissionRequest {
        SubmissionRequest {
            dataset_name: Some("Street lighting assets".into()),
            dataset_url: Some("https://data.example.gov.uk/lighting".into()),
            dataset_owner: Some("Public Sector".into()),
            owner_name: Some("Example Council".into()),
            description: Some("Lamp columns with no USRN".into()),
            missing_type: Some("USRN".into()),
            job_title: Some(String::new()),
            sector: Some("Academic/Research".into()),
        }
    }

    #[test]
    fn accepts_well_formed_report() {
        let report = valid().validate().unwrap();
        assert_eq!(report.dataset_owner, OrgType::PublicSector);
        assert_eq!(report.sector, OrgType::AcademicResearch);
        assert_eq!(report.missing_type.as_stored(), "usrn");
        assert_eq!(report.job_title, None);
    }

    #[test]
    fn first_problem_is_reported() {
        let mut req = valid();
        req.dataset_name = None;
        req.dataset_url = Some("not a url".into());
        assert_eq!(req.validate().unwrap_err(), "Dataset name is required");

        let mut req = valid();
        req.dataset_url = Some("not a url".into());
        assert_eq!(req.validate().unwrap_err(), "Must be a valid URL");
    }

    #[test]
    fn length_limits_count_characters() {
        let mut req = valid();
        req.description = Some("é".repeat(500));
        assert!(req.validate().is_ok());

        let mut req = valid();
        req.description = Some("x".repeat(501));
        assert_eq!(
            req.validate().unwrap_err(),
            "Description must be at most 500 characters"
        );

        let mut req = valid();
        req.job_title = Some("x".repeat(256));
        assert!(req.validate().is_err());
    }

    #[test]
    fn enums_are_exact() {
        let mut req = valid();
        req.sector = Some("public sector".into());
        assert!(req.validate().unwrap_err().starts_with("Sector must be one of"));

        let mut req = valid();
        req.missing_type = Some("usrn".into());
        assert!(req.validate().is_err());

        for t in OrgType::ALL {
            assert_eq!(OrgType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn decodes_camel_case_body() {
        let req: SubmissionRequest = serde_json::from_str(
            r#"{"datasetName":"a","missingType":"Both","jobTitle":"Analyst"}"#,
        )
        .unwrap();
        assert_eq!(req.dataset_name.as_deref(), Some("a"));
        assert_eq!(req.job_title.as_deref(), Some("Analyst"));
        assert_eq!(req.sector, None);
    }
}
