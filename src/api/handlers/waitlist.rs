use crate::api::dtos::requests::JoinWaitlistRequest;
use crate::api::extractors::{actor::Actor, gym::GymId};
use crate::api::handlers::{ensure_permission, load_policy};
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::{Path, State}, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

pub async fn join_waitlist(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Path((_, session_id)): Path<(String, String)>,
    Json(payload): Json<JoinWaitlistRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.manage_activity_sessions").await?;

    let session = state.session_repo.find_by_id(&gym_id, &session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    let activity = state.activity_repo.find_by_id(&gym_id, &session.activity_id).await?
        .ok_or(AppError::Internal)?;
    let policy = load_policy(&state, &gym_id, &activity).await?;

    let (entry, position) = state.waitlist_service
        .join(&session, policy.as_ref(), &payload.client_id)
        .await?;
    let waitlist_count = state.waitlist_repo.active_count(&session.id).await?;

    Ok(Json(json!({
        "status": "ok",
        "entry": entry,
        "position": position,
        "waitlist_count": waitlist_count,
    })))
}

pub async fn leave_waitlist(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Path((_, entry_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.manage_activity_sessions").await?;

    let entry = state.waitlist_repo.find_by_id(&gym_id, &entry_id).await?
        .ok_or(AppError::NotFound("Waitlist entry not found".into()))?;
    let cancelled = state.waitlist_service.leave(&entry).await?;

    Ok(Json(json!({ "status": "ok", "entry": cancelled })))
}

/// BROADCAST / FIRST_CLAIM: a notified client takes the open slot. The
/// capacity re-check at claim time settles the race between claimants.
pub async fn claim_waitlist_spot(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Path((_, entry_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.manage_activity_sessions").await?;

    let entry = state.waitlist_repo.find_by_id(&gym_id, &entry_id).await?
        .ok_or(AppError::NotFound("Waitlist entry not found".into()))?;
    let session = state.session_repo.find_by_id(&gym_id, &entry.session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    let activity = state.activity_repo.find_by_id(&gym_id, &session.activity_id).await?
        .ok_or(AppError::Internal)?;
    let policy = load_policy(&state, &gym_id, &activity).await?;

    let booking = state.waitlist_service
        .claim(&session, policy.as_ref(), &entry, Utc::now())
        .await?;

    Ok(Json(json!({
        "status": "ok",
        "message": "Spot claimed. You are in the class.",
        "booking": booking,
    })))
}
