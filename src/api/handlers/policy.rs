use crate::api::dtos::requests::CreatePolicyRequest;
use crate::api::extractors::{actor::Actor, gym::GymId};
use crate::api::handlers::ensure_permission;
use crate::domain::models::activity::{ActivityPolicy, NewPolicyParams};
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

pub async fn create_policy(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Json(payload): Json<CreatePolicyRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.add_activitypolicy").await?;

    if let Some(mode) = &payload.waitlist_mode
        && !["AUTO_PROMOTE", "BROADCAST", "FIRST_CLAIM"].contains(&mode.as_str())
    {
        return Err(AppError::Validation(format!("Unknown waitlist mode: {mode}")));
    }
    if let Some(penalty) = &payload.penalty_type
        && !["STRIKE", "FEE", "FORFEIT"].contains(&penalty.as_str())
    {
        return Err(AppError::Validation(format!("Unknown penalty type: {penalty}")));
    }

    let policy = ActivityPolicy::new(NewPolicyParams {
        gym_id,
        name: payload.name,
        cancellation_window_hours: payload.cancellation_window_hours,
        penalty_type: payload.penalty_type,
        waitlist_enabled: payload.waitlist_enabled,
        waitlist_mode: payload.waitlist_mode,
        waitlist_limit: payload.waitlist_limit,
        waitlist_claim_timeout_minutes: payload.waitlist_claim_timeout_minutes,
        auto_promote_cutoff_hours: payload.auto_promote_cutoff_hours,
        broadcast_count: payload.broadcast_count,
    });
    let created = state.policy_repo.create(&policy).await?;
    info!("Policy created: {}", created.id);
    Ok(Json(created))
}

pub async fn list_policies(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
) -> Result<impl IntoResponse, AppError> {
    let policies = state.policy_repo.list(&gym_id).await?;
    Ok(Json(policies))
}
