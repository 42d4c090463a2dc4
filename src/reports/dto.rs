use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::repo_types::{NewReport, Report};
use crate::{auth::dto::PublicUser, dates, error::ApiError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateReportRequest {
    pub work_date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    /// Number, numeric string, or anything else (treated as 0).
    pub overtime_hours: Option<Value>,
}

/// Overtime coercion: numbers and numeric strings pass, everything else is 0.
pub fn coerce_hours(raw: Option<&Value>) -> f64 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|h| h.is_finite()).unwrap_or(0.0)
}

impl CreateReportRequest {
    pub fn validate(self, owner_id: Uuid) -> Result<NewReport, ApiError> {
        let field = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let (Some(work_date), Some(location), Some(description)) = (
            field(self.work_date),
            field(self.location),
            field(self.description),
        ) else {
            return Err(ApiError::validation("Missing required fields"));
        };

        let work_date = dates::parse_calendar_date(&work_date)
            .ok_or_else(|| ApiError::validation("Invalid date format for workDate"))?;

        Ok(NewReport {
            user_id: owner_id,
            work_date,
            location,
            description,
            overtime_hours: coerce_hours(self.overtime_hours.as_ref()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LeaderDecisionRequest {
    pub action: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportEnvelope {
    pub report: Report,
}

#[derive(Debug, Serialize)]
pub struct ReportList<T> {
    pub reports: Vec<T>,
}

/// Pending report with its owner embedded.
#[derive(Debug, Serialize)]
pub struct PendingReport {
    #[serde(flatten)]
    pub report: Report,
    pub user: PublicUser,
}
