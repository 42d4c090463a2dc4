use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::dates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "report_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Pending,
    LeaderApproved,
    LeaderRejected,
}

impl ReportStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReportStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "PENDING",
            ReportStatus::LeaderApproved => "LEADER_APPROVED",
            ReportStatus::LeaderRejected => "LEADER_REJECTED",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "dates::iso_date")]
    pub work_date: Date,
    pub location: String,
    pub description: String,
    pub overtime_hours: f64,
    pub status: ReportStatus,
    pub leader_comment: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub decided_at: Option<OffsetDateTime>,
}

/// Validated input for a new report. Status and timestamps come from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub user_id: Uuid,
    pub work_date: Date,
    pub location: String,
    pub description: String,
    pub overtime_hours: f64,
}

/// Status change produced by the workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub from: ReportStatus,
    pub to: ReportStatus,
    pub comment: Option<String>,
}
