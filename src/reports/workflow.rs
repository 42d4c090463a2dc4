//! Report status state machine.
//!
//! `PENDING` is the only non-terminal state. A team leader moves it to
//! `LEADER_APPROVED` or `LEADER_REJECTED`; nothing leaves a terminal state.

use std::str::FromStr;

use super::repo_types::ReportStatus;
use crate::{auth::claims::Role, error::ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Approve,
    Reject,
}

impl FromStr for Action {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Action::Approve),
            "reject" => Ok(Action::Reject),
            _ => Err(WorkflowError::InvalidAction),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Forbidden: not a team leader")]
    Forbidden(Role),
    #[error("Invalid action")]
    InvalidAction,
    #[error("Report already decided ({0})")]
    AlreadyDecided(ReportStatus),
}

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::Forbidden(_) => ApiError::Forbidden(e.to_string()),
            WorkflowError::InvalidAction => ApiError::Validation(e.to_string()),
            WorkflowError::AlreadyDecided(_) => ApiError::Conflict(e.to_string()),
        }
    }
}

/// Next status for `action` applied by `acting_role` to a report in `current`.
pub fn decide(
    current: ReportStatus,
    action: Action,
    acting_role: Role,
) -> Result<ReportStatus, WorkflowError> {
    if acting_role != Role::TeamLeader {
        return Err(WorkflowError::Forbidden(acting_role));
    }
    match (current, action) {
        (ReportStatus::Pending, Action::Approve) => Ok(ReportStatus::LeaderApproved),
        (ReportStatus::Pending, Action::Reject) => Ok(ReportStatus::LeaderRejected),
        (terminal, _) => Err(WorkflowError::AlreadyDecided(terminal)),
    }
}
