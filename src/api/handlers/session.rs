use crate::api::dtos::requests::SessionsQuery;
use crate::api::dtos::responses::{SessionDetailResponse, SessionListItem, WaitlistPositionView};
use crate::api::extractors::gym::GymId;
use crate::domain::services::cancellation;
use crate::domain::services::schedule;
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use chrono::{Duration, NaiveTime, Utc};
use std::sync::Arc;

/// Calendar listing: all non-cancelled sessions of a gym day with booked
/// and checked-in counts.
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Query(query): Query<SessionsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state.settings_repo.schedule_settings(&gym_id).await?;
    let tz: chrono_tz::Tz = settings.timezone.parse().unwrap_or(chrono_tz::UTC);

    let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
    let day_start = schedule::local_datetime(query.date, midnight, &tz)?;
    let day_end = day_start + Duration::days(1);

    let sessions = state.session_repo.list_by_range(&gym_id, day_start, day_end).await?;
    let mut items = Vec::with_capacity(sessions.len());
    for session in sessions {
        let booked = state.booking_repo.confirmed_count(&session.id).await?;
        let checked_in = state.checkin_repo.count_by_session(&session.id).await?;
        items.push(SessionListItem {
            is_full: booked >= session.max_capacity as i64,
            session,
            booked,
            checked_in,
        });
    }
    Ok(Json(items))
}

/// Full session view: bookings, waitlist in promotion order with
/// positions, and the current cancellation-window assessment.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Path((_, session_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session_repo.find_by_id(&gym_id, &session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;

    let activity = state.activity_repo.find_by_id(&gym_id, &session.activity_id).await?
        .ok_or(AppError::Internal)?;
    let policy = crate::api::handlers::load_policy(&state, &gym_id, &activity).await?;

    let bookings = state.booking_repo.list_by_session(&session.id).await?;
    let confirmed_count = state.booking_repo.confirmed_count(&session.id).await?;
    let checked_in_count = state.checkin_repo.count_by_session(&session.id).await?;

    let mut waitlist = Vec::new();
    for entry in state.waitlist_repo.active_entries(&session.id).await? {
        let position = state.waitlist_service.position_of(&entry).await?;
        waitlist.push(WaitlistPositionView { entry, position });
    }

    let cancellation = policy
        .as_ref()
        .map(|p| cancellation::evaluate(session.start_at, Some(p), Utc::now()));

    Ok(Json(SessionDetailResponse {
        session,
        confirmed_count,
        checked_in_count,
        bookings,
        waitlist,
        cancellation,
    }))
}
