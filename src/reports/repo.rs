use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewReport, Report, ReportStatus, StatusChange};

const REPORT_COLUMNS: &str = "id, user_id, work_date, location, description, overtime_hours, \
     status, leader_comment, created_at, decided_at";

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Inserts with status `PENDING`.
    async fn insert(&self, report: NewReport) -> anyhow::Result<Report>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Report>>;
    /// Newest first.
    async fn list_by_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<Report>>;
    /// Oldest first.
    async fn list_by_status(&self, status: ReportStatus) -> anyhow::Result<Vec<Report>>;
    /// Applies `change` only while the stored status still equals `change.from`.
    /// Returns `None` when the report is missing or its status moved on.
    async fn update_status(&self, id: Uuid, change: StatusChange) -> anyhow::Result<Option<Report>>;
}

#[derive(Clone)]
pub struct PgReportStore {
    db: PgPool,
}

impl PgReportStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn insert(&self, report: NewReport) -> anyhow::Result<Report> {
        let sql = format!(
            r#"
            INSERT INTO reports (id, user_id, work_date, location, description, overtime_hours, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {REPORT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Report>(&sql)
            .bind(Uuid::new_v4())
            .bind(report.user_id)
            .bind(report.work_date)
            .bind(&report.location)
            .bind(&report.description)
            .bind(report.overtime_hours)
            .bind(ReportStatus::Pending)
            .fetch_one(&self.db)
            .await
            .context("insert report")?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Report>> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");
        let row = sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("get report by id")?;
        Ok(row)
    }

    async fn list_by_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<Report>> {
        let sql = format!(
            r#"
            SELECT {REPORT_COLUMNS}
              FROM reports
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
            "#
        );
        let rows = sqlx::query_as::<_, Report>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await
            .context("list reports by owner")?;
        Ok(rows)
    }

    async fn list_by_status(&self, status: ReportStatus) -> anyhow::Result<Vec<Report>> {
        let sql = format!(
            r#"
            SELECT {REPORT_COLUMNS}
              FROM reports
             WHERE status = $1
             ORDER BY created_at ASC, id ASC
            "#
        );
        let rows = sqlx::query_as::<_, Report>(&sql)
            .bind(status)
            .fetch_all(&self.db)
            .await
            .context("list reports by status")?;
        Ok(rows)
    }

    async fn update_status(&self, id: Uuid, change: StatusChange) -> anyhow::Result<Option<Report>> {
        // single-row conditional UPDATE is atomic; concurrent deciders cannot both win
        let sql = format!(
            r#"
            UPDATE reports
               SET status = $3, leader_comment = $4, decided_at = now()
             WHERE id = $1 AND status = $2
            RETURNING {REPORT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(change.from)
            .bind(change.to)
            .bind(&change.comment)
            .fetch_optional(&self.db)
            .await
            .context("update report status")?;
        Ok(row)
    }
}
