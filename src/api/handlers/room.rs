use crate::api::dtos::requests::CreateRoomRequest;
use crate::api::extractors::{actor::Actor, gym::GymId};
use crate::api::handlers::ensure_permission;
use crate::domain::models::room::Room;
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

pub async fn create_room(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.add_room").await?;

    if payload.capacity <= 0 {
        return Err(AppError::Validation("Room capacity must be positive".into()));
    }
    let layout_json = match payload.layout {
        Some(layout) => Some(layout.to_string()),
        None => None,
    };

    let room = Room::new(gym_id, payload.name, payload.capacity, layout_json);
    let created = state.room_repo.create(&room).await?;
    info!("Room created: {}", created.id);
    Ok(Json(created))
}

pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
) -> Result<impl IntoResponse, AppError> {
    let rooms = state.room_repo.list(&gym_id).await?;
    Ok(Json(rooms))
}
