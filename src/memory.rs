//! Process-local implementation of both stores, used by tests and local demos.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    reports::{
        repo::ReportStore,
        repo_types::{NewReport, Report, ReportStatus, StatusChange},
    },
};

#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    // insertion order == creation order
    reports: RwLock<Vec<Report>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let mut users = self.users.write().await;
        anyhow::ensure!(
            !users.iter().any(|u| u.email == user.email),
            "duplicate key value violates unique constraint \"users_email_key\""
        );
        let row = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            first_name: user.first_name,
            last_name: user.last_name,
            birthdate: user.birthdate,
            age: user.age,
            nationality: user.nationality,
            company_code: user.company_code,
            profile_image: user.profile_image,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn insert(&self, report: NewReport) -> anyhow::Result<Report> {
        let row = Report {
            id: Uuid::new_v4(),
            user_id: report.user_id,
            work_date: report.work_date,
            location: report.location,
            description: report.description,
            overtime_hours: report.overtime_hours,
            status: ReportStatus::Pending,
            leader_comment: None,
            created_at: OffsetDateTime::now_utc(),
            decided_at: None,
        };
        self.reports.write().await.push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Report>> {
        Ok(self.reports.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn list_by_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<Report>> {
        let mut rows: Vec<Report> = self
            .reports
            .read()
            .await
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        // stable: equal timestamps stay newest-inserted first
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_by_status(&self, status: ReportStatus) -> anyhow::Result<Vec<Report>> {
        let mut rows: Vec<Report> = self
            .reports
            .read()
            .await
            .iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn update_status(&self, id: Uuid, change: StatusChange) -> anyhow::Result<Option<Report>> {
        let mut reports = self.reports.write().await;
        let Some(row) = reports
            .iter_mut()
            .find(|r| r.id == id && r.status == change.from)
        else {
            return Ok(None);
        };
        row.status = change.to;
        row.leader_comment = change.comment;
        row.decided_at = Some(OffsetDateTime::now_utc());
        Ok(Some(row.clone()))
    }
}
