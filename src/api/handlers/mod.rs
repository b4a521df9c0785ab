pub mod activity;
pub mod booking;
pub mod checkin;
pub mod health;
pub mod policy;
pub mod room;
pub mod schedule;
pub mod session;
pub mod waitlist;
pub mod settings;

use crate::domain::models::activity::{Activity, ActivityPolicy};
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;

/// Authorization gate in front of every mutating handler. The decision
/// itself belongs to the external access-control collaborator.
pub async fn ensure_permission(
    state: &Arc<AppState>,
    actor: &str,
    gym_id: &str,
    permission: &str,
) -> Result<(), AppError> {
    if state.access_control.resolve_gym_permission(actor, gym_id, permission).await? {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("Missing permission: {permission}")))
    }
}

pub async fn load_policy(
    state: &Arc<AppState>,
    gym_id: &str,
    activity: &Activity,
) -> Result<Option<ActivityPolicy>, AppError> {
    match &activity.policy_id {
        Some(policy_id) => state.policy_repo.find_by_id(gym_id, policy_id).await,
        None => Ok(None),
    }
}
