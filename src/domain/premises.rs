//! Broadband availability for the premises on one street.

use serde::{Deserialize, Serialize};

const UNKNOWN_POSTCODE: &str = "Unknown";

/// Lookup body: `{ "usrn": "12345678", "password": "..." }`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UsrnRequest {
    pub usrn: Option<String>,
    pub password: Option<String>,
}

/// Parse an 8-digit Unique Street Reference Number.
pub fn parse_usrn(raw: &str) -> Result<i64, String> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err("USRN must be exactly 8 digits".to_string());
    }
    raw.parse()
        .map_err(|_| "USRN must be exactly 8 digits".to_string())
}

/// One BDUK premises row joined to its USRN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiseRow {
    pub uprn: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub local_authority: Option<String>,
    pub region: Option<String>,
    pub current_gigabit: bool,
    pub future_gigabit: bool,
    pub lot_name: Option<String>,
    pub subsidy_control_status: Option<String>,
}

/// Rows for a USRN plus the windowed total the query reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PremisesPage {
    pub total_count: i64,
    pub rows: Vec<PremiseRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostcodeGroup {
    pub postcode: String,
    pub count: u64,
    pub gigabit_ready: u64,
    pub future_gigabit: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub postcodes: Vec<PostcodeGroup>,
    pub total_gigabit_ready: u64,
    pub total_future_gigabit: u64,
    pub region: Option<String>,
    pub local_authority: Option<String>,
}

/// `data` member of a successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsrnReport {
    pub usrn: String,
    pub total_premises: i64,
    pub showing: usize,
    pub summary: Summary,
    pub premises: Vec<PremiseRow>,
}

impl UsrnReport {
    /// Aggregate a non-empty page. Postcode groups keep first-seen order.
    pub fn build(usrn: String, page: PremisesPage) -> Self {
        let mut postcodes: Vec<PostcodeGroup> = Vec::new();

        for row in &page.rows {
            let key = row
                .postcode
                .as_deref()
                .filter(|p| !p.is_empty())
                .unwrap_or(UNKNOWN_POSTCODE);

            let index = match postcodes.iter().position(|g| g.postcode == key) {
                Some(i) => i,
                None => {
                    postcodes.push(PostcodeGroup {
                        postcode: key.to_string(),
                        count: 0,
                        gigabit_ready: 0,
                        future_gigabit: 0,
                    });
                    postcodes.len() - 1
                }
            };

            let group = &mut postcodes[index];
            group.count += 1;
            group.gigabit_ready += u64::from(row.current_gigabit);
            group.future_gigabit += u64::from(row.future_gigabit);
        }

        let first = page.rows.first();
        let summary = Summary {
            total_gigabit_ready: postcodes.iter().map(|g| g.gigabit_ready).sum(),
            total_future_gigabit: postcodes.iter().map(|g| g.future_gigabit).sum(),
            region: first.and_then(|r| r.region.clone()),
            local_authority: first.and_then(|r| r.local_authority.clone()),
            postcodes,
        };

        UsrnReport {
            usrn,
            total_premises: page.total_count,
            showing: page.rows.len(),
            summary,
            premises: page.rows,
        }
    }
}
