use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateReportRequest, LeaderDecisionRequest, PendingReport, ReportEnvelope, ReportList},
    repo_types::Report,
    services,
};
use crate::{
    auth::extractors::{AuthUser, TeamLeader},
    error::{ApiError, ApiJson},
    state::AppState,
};

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports).post(create_report))
        .route("/reports/team-pending", get(team_pending))
        .route("/reports/:id", get(get_report))
        .route("/reports/:id/leader-decision", put(leader_decision))
}

#[instrument(skip(state, body), fields(user_id = %user.user_id))]
pub async fn create_report(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<CreateReportRequest>,
) -> Result<(StatusCode, HeaderMap, Json<ReportEnvelope>), ApiError> {
    let report = services::create_report(state.reports.as_ref(), user.user_id, body).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/reports/{}", report.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }

    Ok((StatusCode::CREATED, headers, Json(ReportEnvelope { report })))
}

#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn list_reports(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ReportList<Report>>, ApiError> {
    let reports = services::list_owned_reports(state.reports.as_ref(), user.user_id).await?;
    Ok(Json(ReportList { reports }))
}

#[instrument(skip(state, _user))]
pub async fn get_report(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ReportEnvelope>, ApiError> {
    let id = services::parse_report_id(&id)?;
    let report = services::get_report(state.reports.as_ref(), id).await?;
    Ok(Json(ReportEnvelope { report }))
}

#[instrument(skip(state, body), fields(leader_id = %leader.user_id))]
pub async fn leader_decision(
    State(state): State<AppState>,
    TeamLeader(leader): TeamLeader,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<LeaderDecisionRequest>,
) -> Result<Json<ReportEnvelope>, ApiError> {
    let id = services::parse_report_id(&id)?;
    let report = services::apply_leader_decision(
        state.reports.as_ref(),
        id,
        body.action.as_deref(),
        leader.role,
        body.comment,
    )
    .await?;
    Ok(Json(ReportEnvelope { report }))
}

#[instrument(skip(state), fields(leader_id = %leader.user_id))]
pub async fn team_pending(
    State(state): State<AppState>,
    TeamLeader(leader): TeamLeader,
) -> Result<Json<ReportList<PendingReport>>, ApiError> {
    let reports =
        services::list_team_pending(state.users.as_ref(), state.reports.as_ref(), leader).await?;
    Ok(Json(ReportList { reports }))
}
