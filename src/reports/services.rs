use std::collections::HashMap;

use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{CreateReportRequest, PendingReport},
    repo::ReportStore,
    repo_types::{Report, ReportStatus, StatusChange},
    workflow::{self, Action, WorkflowError},
};
use crate::{
    auth::{claims::Role, dto::PublicUser, extractors::Identity, repo::UserStore},
    error::ApiError,
};

pub fn parse_report_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::validation("Invalid report ID"))
}

pub async fn create_report(
    reports: &dyn ReportStore,
    owner_id: Uuid,
    request: CreateReportRequest,
) -> Result<Report, ApiError> {
    let new = request.validate(owner_id)?;
    let report = reports.insert(new).await?;
    info!(report_id = %report.id, user_id = %owner_id, "report created");
    Ok(report)
}

pub async fn list_owned_reports(
    reports: &dyn ReportStore,
    user_id: Uuid,
) -> Result<Vec<Report>, ApiError> {
    let mut owned = reports.list_by_owner(user_id).await?;
    // never hand out another user's report
    owned.retain(|r| r.user_id == user_id);
    Ok(owned)
}

pub async fn get_report(reports: &dyn ReportStore, id: Uuid) -> Result<Report, ApiError> {
    reports
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Report not found".into()))
}

/// Every pending report, oldest first, with owners attached.
///
/// Users carry no team, so the queue is global.
pub async fn list_team_pending(
    users: &dyn UserStore,
    reports: &dyn ReportStore,
    leader: Identity,
) -> Result<Vec<PendingReport>, ApiError> {
    if users.find_by_id(leader.user_id).await?.is_none() {
        warn!(user_id = %leader.user_id, "team-pending for missing user");
        return Err(ApiError::NotFound("User not found".into()));
    }

    let pending = reports.list_by_status(ReportStatus::Pending).await?;
    let mut owner_ids: Vec<Uuid> = pending.iter().map(|r| r.user_id).collect();
    owner_ids.sort_unstable();
    owner_ids.dedup();

    let owners: HashMap<Uuid, PublicUser> = users
        .find_by_ids(&owner_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, PublicUser::from(u)))
        .collect();

    let mut out = Vec::with_capacity(pending.len());
    for report in pending {
        match owners.get(&report.user_id) {
            Some(user) => out.push(PendingReport {
                user: user.clone(),
                report,
            }),
            None => warn!(report_id = %report.id, "pending report without owner; skipped"),
        }
    }
    Ok(out)
}

/// Applies a leader decision to one report.
pub async fn apply_leader_decision(
    reports: &dyn ReportStore,
    report_id: Uuid,
    action: Option<&str>,
    acting_role: Role,
    comment: Option<String>,
) -> Result<Report, ApiError> {
    // role is checked before the report is loaded
    if acting_role != Role::TeamLeader {
        return Err(WorkflowError::Forbidden(acting_role).into());
    }
    let action: Action = action.unwrap_or_default().parse()?;

    let current = get_report(reports, report_id).await?;
    let next = workflow::decide(current.status, action, acting_role)?;

    let comment = comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    let change = StatusChange {
        from: current.status,
        to: next,
        comment,
    };

    match reports.update_status(report_id, change).await? {
        Some(updated) => {
            info!(report_id = %report_id, status = %updated.status, "report decided");
            Ok(updated)
        }
        None => {
            // lost a race: someone else decided between our read and write
            let latest = get_report(reports, report_id).await?;
            Err(WorkflowError::AlreadyDecided(latest.status).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::repo_types::NewUser, memory::InMemoryStore};
    use serde_json::json;

    fn create_req(date: &str, location: &str) -> CreateReportRequest {
        serde_json::from_value(json!({
            "workDate": date,
            "location": location,
            "description": "work",
        }))
        .unwrap()
    }

    async fn add_user(store: &InMemoryStore, email: &str, role: Role) -> Uuid {
        store
            .create(NewUser {
                email: email.into(),
                password_hash: "$argon2id$unused".into(),
                role,
                first_name: "F".into(),
                last_name: "L".into(),
                birthdate: None,
                age: None,
                nationality: None,
                company_code: None,
                profile_image: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn created_report_is_pending() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let report = create_report(&store, owner, create_req("2024-05-01", "Site 1"))
            .await
            .unwrap();
        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.user_id, owner);
        assert_eq!(report.overtime_hours, 0.0);
        assert!(report.decided_at.is_none());
    }

    #[tokio::test]
    async fn owned_reports_are_filtered_and_newest_first() {
        let store = InMemoryStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let first = create_report(&store, a, create_req("2024-05-01", "one")).await.unwrap();
        create_report(&store, b, create_req("2024-05-02", "other")).await.unwrap();
        let second = create_report(&store, a, create_req("2024-05-03", "two")).await.unwrap();

        let listed = list_owned_reports(&store, a).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert!(listed.iter().all(|r| r.user_id == a));
    }

    #[tokio::test]
    async fn leader_approves_and_rejects() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let r1 = create_report(&store, owner, create_req("2024-05-01", "x")).await.unwrap();
        let r2 = create_report(&store, owner, create_req("2024-05-01", "y")).await.unwrap();

        let approved = apply_leader_decision(&store, r1.id, Some("approve"), Role::TeamLeader, None)
            .await
            .unwrap();
        assert_eq!(approved.status, ReportStatus::LeaderApproved);
        assert!(approved.decided_at.is_some());

        let rejected = apply_leader_decision(
            &store,
            r2.id,
            Some("reject"),
            Role::TeamLeader,
            Some("  missing hours  ".into()),
        )
        .await
        .unwrap();
        assert_eq!(rejected.status, ReportStatus::LeaderRejected);
        assert_eq!(rejected.leader_comment.as_deref(), Some("missing hours"));
        assert_eq!(rejected.location, "y");
    }

    #[tokio::test]
    async fn employee_decision_is_forbidden_and_status_unchanged() {
        let store = InMemoryStore::new();
        let r = create_report(&store, Uuid::new_v4(), create_req("2024-05-01", "x"))
            .await
            .unwrap();
        let err = apply_leader_decision(&store, r.id, Some("approve"), Role::Employee, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(
            get_report(&store, r.id).await.unwrap().status,
            ReportStatus::Pending
        );
    }

    #[tokio::test]
    async fn invalid_action_unknown_report_and_redecision() {
        let store = InMemoryStore::new();
        let r = create_report(&store, Uuid::new_v4(), create_req("2024-05-01", "x"))
            .await
            .unwrap();

        let err = apply_leader_decision(&store, r.id, Some("escalate"), Role::TeamLeader, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let err = apply_leader_decision(&store, r.id, None, Role::TeamLeader, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = apply_leader_decision(&store, Uuid::new_v4(), Some("approve"), Role::TeamLeader, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        apply_leader_decision(&store, r.id, Some("approve"), Role::TeamLeader, None)
            .await
            .unwrap();
        let err = apply_leader_decision(&store, r.id, Some("reject"), Role::TeamLeader, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(
            get_report(&store, r.id).await.unwrap().status,
            ReportStatus::LeaderApproved
        );
    }

    #[tokio::test]
    async fn team_pending_lists_pending_with_owner() {
        let store = InMemoryStore::new();
        let leader = add_user(&store, "lead@corp.io", Role::TeamLeader).await;
        let emp = add_user(&store, "emp@corp.io", Role::Employee).await;
        let older = create_report(&store, emp, create_req("2024-05-01", "a")).await.unwrap();
        let decided = create_report(&store, emp, create_req("2024-05-02", "b")).await.unwrap();
        let newer = create_report(&store, emp, create_req("2024-05-03", "c")).await.unwrap();
        apply_leader_decision(&store, decided.id, Some("approve"), Role::TeamLeader, None)
            .await
            .unwrap();

        let identity = Identity {
            user_id: leader,
            role: Role::TeamLeader,
        };
        let pending = list_team_pending(&store, &store, identity).await.unwrap();
        let ids: Vec<Uuid> = pending.iter().map(|p| p.report.id).collect();
        assert_eq!(ids, vec![older.id, newer.id]);
        assert!(pending.iter().all(|p| p.user.email == "emp@corp.io"));
    }

    #[tokio::test]
    async fn team_pending_requires_existing_leader() {
        let store = InMemoryStore::new();
        let ghost = Identity {
            user_id: Uuid::new_v4(),
            role: Role::TeamLeader,
        };
        let err = list_team_pending(&store, &store, ghost).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn report_id_parsing() {
        assert!(parse_report_id("not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_report_id(&id.to_string()).unwrap(), id);
    }
}
