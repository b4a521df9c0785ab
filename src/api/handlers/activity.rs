use crate::api::dtos::requests::{CreateActivityRequest, UpdateActivityRequest};
use crate::api::extractors::{actor::Actor, gym::GymId};
use crate::api::handlers::ensure_permission;
use crate::domain::models::activity::{Activity, NewActivityParams};
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::{Path, State}, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

pub async fn create_activity(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Json(payload): Json<CreateActivityRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.add_activity").await?;

    if payload.base_capacity <= 0 {
        return Err(AppError::Validation("Base capacity must be positive".into()));
    }
    if let Some(policy_id) = &payload.policy_id
        && state.policy_repo.find_by_id(&gym_id, policy_id).await?.is_none()
    {
        return Err(AppError::NotFound("Policy not found".into()));
    }

    let activity = Activity::new(NewActivityParams {
        gym_id,
        name: payload.name,
        description: payload.description,
        color: payload.color,
        duration_min: payload.duration_min,
        base_capacity: payload.base_capacity,
        qr_checkin_enabled: payload.qr_checkin_enabled.unwrap_or(false),
        allow_spot_booking: payload.allow_spot_booking.unwrap_or(false),
        policy_id: payload.policy_id,
    });
    let created = state.activity_repo.create(&activity).await?;
    info!("Activity created: {}", created.id);
    Ok(Json(created))
}

pub async fn list_activities(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
) -> Result<impl IntoResponse, AppError> {
    let activities = state.activity_repo.list(&gym_id).await?;
    Ok(Json(activities))
}

pub async fn update_activity(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Path((_, activity_id)): Path<(String, String)>,
    Json(payload): Json<UpdateActivityRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.change_activity").await?;

    let mut activity = state.activity_repo.find_by_id(&gym_id, &activity_id).await?
        .ok_or(AppError::NotFound("Activity not found".into()))?;

    if let Some(name) = payload.name { activity.name = name; }
    if let Some(description) = payload.description { activity.description = description; }
    if let Some(color) = payload.color { activity.color = color; }
    if let Some(duration_min) = payload.duration_min { activity.duration_min = duration_min; }
    if let Some(base_capacity) = payload.base_capacity { activity.base_capacity = base_capacity; }
    if let Some(enabled) = payload.qr_checkin_enabled { activity.qr_checkin_enabled = enabled; }
    if let Some(allowed) = payload.allow_spot_booking { activity.allow_spot_booking = allowed; }
    if let Some(policy_id) = payload.policy_id {
        if policy_id.is_empty() {
            activity.policy_id = None;
        } else {
            if state.policy_repo.find_by_id(&gym_id, &policy_id).await?.is_none() {
                return Err(AppError::NotFound("Policy not found".into()));
            }
            activity.policy_id = Some(policy_id);
        }
    }

    let updated = state.activity_repo.update(&activity).await?;
    info!("Activity updated: {}", updated.id);
    Ok(Json(updated))
}

pub async fn delete_activity(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Path((_, activity_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.delete_activity").await?;

    // Soft-protect: history stays intact while any session references it.
    if state.session_repo.count_by_activity(&activity_id).await? > 0 {
        return Err(AppError::Conflict("Activity has sessions and cannot be deleted".into()));
    }

    state.activity_repo.delete(&gym_id, &activity_id).await?;
    info!("Activity deleted: {}", activity_id);
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}
