use crate::api::dtos::requests::{CancelSessionRequest, CreateRecurringRequest, CreateSessionRequest, UpdateSessionRequest};
use crate::api::dtos::responses::RecurringGenerationResponse;
use crate::api::extractors::{actor::Actor, gym::GymId};
use crate::api::handlers::ensure_permission;
use crate::domain::models::activity::Activity;
use crate::domain::models::schedule::{NewRuleParams, ScheduleRule, ScheduleSettings};
use crate::domain::models::session::{NewSessionParams, Session};
use crate::domain::services::schedule::{self, CandidateSlot, ScheduleConflict};
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::{Path, State}, response::IntoResponse, Json};
use chrono::{Datelike, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

fn conflict_error(conflict: ScheduleConflict) -> AppError {
    match conflict.kind.as_str() {
        "ROOM_OVERLAP" => AppError::RoomOverlap(conflict.message),
        "STAFF_OVERLAP" => AppError::StaffOverlap(conflict.message),
        _ => AppError::MinBreakViolation(conflict.message),
    }
}

fn gym_timezone(settings: &ScheduleSettings) -> Tz {
    settings.timezone.parse().unwrap_or(chrono_tz::UTC)
}

async fn snapshot_capacity(
    state: &Arc<AppState>,
    gym_id: &str,
    room_id: Option<&String>,
    activity: &Activity,
) -> Result<i32, AppError> {
    match room_id {
        Some(room_id) => {
            let room = state.room_repo.find_by_id(gym_id, room_id).await?
                .ok_or(AppError::NotFound("Room not found".into()))?;
            Ok(room.capacity)
        }
        None => Ok(activity.base_capacity),
    }
}

fn end_time_or_duration(
    start: NaiveTime,
    end_time: Option<&String>,
    activity: &Activity,
) -> Result<NaiveTime, AppError> {
    match end_time {
        Some(raw) => {
            let end = schedule::parse_hhmm(raw)?;
            if end <= start {
                return Err(AppError::Validation("End time must be after start time".into()));
            }
            Ok(end)
        }
        None => Ok(start + Duration::minutes(activity.duration_min as i64)),
    }
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.create_class_sessions").await?;

    let activity = state.activity_repo.find_by_id(&gym_id, &payload.activity_id).await?
        .ok_or(AppError::NotFound("Activity not found".into()))?;
    let settings = state.settings_repo.schedule_settings(&gym_id).await?;
    let tz = gym_timezone(&settings);

    let start_t = schedule::parse_hhmm(&payload.start_time)?;
    let end_t = end_time_or_duration(start_t, payload.end_time.as_ref(), &activity)?;
    let start_at = schedule::local_datetime(payload.date, start_t, &tz)?;
    let end_at = schedule::local_datetime(payload.date, end_t, &tz)?;

    let candidate = CandidateSlot {
        start_at,
        end_at,
        room_id: payload.room_id.clone(),
        staff_id: payload.staff_id.clone(),
    };
    let existing = state.session_repo
        .list_by_range(&gym_id, start_at - Duration::days(1), end_at + Duration::days(1))
        .await?;
    if let Some(conflict) = schedule::find_conflict(&candidate, &existing, &settings) {
        warn!("Session creation rejected: {} on {}", conflict.kind, conflict.date);
        return Err(conflict_error(conflict));
    }

    let max_capacity = match payload.max_capacity {
        Some(capacity) => capacity,
        None => snapshot_capacity(&state, &gym_id, payload.room_id.as_ref(), &activity).await?,
    };
    let session = Session::new(NewSessionParams {
        gym_id,
        activity_id: activity.id.clone(),
        rule_id: None,
        room_id: payload.room_id,
        staff_id: payload.staff_id,
        start_at,
        end_at,
        max_capacity,
    });
    let created = state.session_repo.create(&session).await?;
    info!("Session created: {} ({})", created.id, activity.name);
    Ok(Json(created))
}

/// Creates one rule per selected weekday and expands them into sessions,
/// walking candidate days in ascending date order across the whole batch.
/// On a conflict the behaviour follows ScheduleSettings.on_conflict: FAIL
/// keeps what was created before the conflict and reports it, SKIP steps
/// over the day and keeps going.
pub async fn create_recurring(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Json(payload): Json<CreateRecurringRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.create_class_sessions").await?;

    if payload.days.is_empty() {
        return Err(AppError::Validation("At least one weekday is required".into()));
    }
    if payload.days.iter().any(|d| !(0..=6).contains(d)) {
        return Err(AppError::Validation("Weekdays must be in 0..=6 (Monday = 0)".into()));
    }

    let activity = state.activity_repo.find_by_id(&gym_id, &payload.activity_id).await?
        .ok_or(AppError::NotFound("Activity not found".into()))?;
    let settings = state.settings_repo.schedule_settings(&gym_id).await?;
    let tz = gym_timezone(&settings);

    let start_t = schedule::parse_hhmm(&payload.start_time)?;
    let end_t = end_time_or_duration(start_t, payload.end_time.as_ref(), &activity)?;
    let today = Utc::now().with_timezone(&tz).date_naive();
    if payload.end_date < today {
        return Err(AppError::Validation("End date is in the past".into()));
    }

    let max_capacity = snapshot_capacity(&state, &gym_id, payload.room_id.as_ref(), &activity).await?;

    let mut rule_ids = Vec::new();
    let mut candidates: Vec<(String, CandidateSlot)> = Vec::new();
    for day in &payload.days {
        let rule = state.rule_repo.create(&ScheduleRule::new(NewRuleParams {
            gym_id: gym_id.clone(),
            activity_id: activity.id.clone(),
            room_id: payload.room_id.clone(),
            staff_id: payload.staff_id.clone(),
            day_of_week: *day,
            start_time: payload.start_time.clone(),
            end_time: format!("{}", end_t.format("%H:%M")),
            start_date: today,
            end_date: Some(payload.end_date),
        })).await?;

        for date in schedule::rule_dates(&rule, today, payload.end_date) {
            candidates.push((rule.id.clone(), CandidateSlot {
                start_at: schedule::local_datetime(date, start_t, &tz)?,
                end_at: schedule::local_datetime(date, end_t, &tz)?,
                room_id: payload.room_id.clone(),
                staff_id: payload.staff_id.clone(),
            }));
        }
        rule_ids.push(rule.id);
    }
    candidates.sort_by_key(|(_, slot)| slot.start_at);

    let mut response = RecurringGenerationResponse {
        rule_ids,
        created: 0,
        conflict: None,
        skipped: Vec::new(),
    };
    let Some(first) = candidates.first() else {
        return Ok(Json(response));
    };
    let last_end = candidates.iter().map(|(_, s)| s.end_at).max().unwrap_or(first.1.end_at);

    let mut existing = state.session_repo
        .list_by_range(&gym_id, first.1.start_at - Duration::days(1), last_end + Duration::days(1))
        .await?;

    for (rule_id, slot) in candidates {
        if let Some(conflict) = schedule::find_conflict(&slot, &existing, &settings) {
            if settings.on_conflict == "SKIP" {
                info!("Skipping conflicting day {}: {}", conflict.date, conflict.kind);
                response.skipped.push(conflict);
                continue;
            }
            warn!("Recurring generation stopped at {}: {}", conflict.date, conflict.kind);
            response.conflict = Some(conflict);
            break;
        }

        let created = state.session_repo.create(&Session::new(NewSessionParams {
            gym_id: gym_id.clone(),
            activity_id: activity.id.clone(),
            rule_id: Some(rule_id),
            room_id: slot.room_id.clone(),
            staff_id: slot.staff_id.clone(),
            start_at: slot.start_at,
            end_at: slot.end_at,
            max_capacity,
        })).await?;
        existing.push(created);
        response.created += 1;
    }

    info!(
        "Recurring generation for {}: {} session(s) created, {} skipped",
        activity.name,
        response.created,
        response.skipped.len()
    );
    Ok(Json(response))
}

/// mode "future" rewrites the rule and every later SCHEDULED session of
/// the series, keeping each session's date and replacing its time-of-day.
pub async fn update_session(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Path((_, session_id)): Path<(String, String)>,
    Json(payload): Json<UpdateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.manage_activity_sessions").await?;

    let mut session = state.session_repo.find_by_id(&gym_id, &session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    let settings = state.settings_repo.schedule_settings(&gym_id).await?;
    let tz = gym_timezone(&settings);
    let mode = payload.mode.as_deref().unwrap_or("single");

    if mode == "future"
        && let Some(rule_id) = session.rule_id.clone()
    {
        let mut rule = state.rule_repo.find_by_id(&gym_id, &rule_id).await?
            .ok_or(AppError::NotFound("Schedule rule not found".into()))?;
        if let Some(start_time) = &payload.start_time { rule.start_time = start_time.clone(); }
        if let Some(end_time) = &payload.end_time { rule.end_time = end_time.clone(); }
        if let Some(date) = payload.date {
            rule.day_of_week = date.weekday().num_days_from_monday() as i32;
        }
        if let Some(room_id) = &payload.room_id {
            rule.room_id = if room_id.is_empty() { None } else { Some(room_id.clone()) };
        }
        if let Some(staff_id) = &payload.staff_id {
            rule.staff_id = if staff_id.is_empty() { None } else { Some(staff_id.clone()) };
        }
        let rule = state.rule_repo.update(&rule).await?;

        let start_t = schedule::parse_hhmm(&rule.start_time)?;
        let end_t = schedule::parse_hhmm(&rule.end_time)?;
        let targets = state.session_repo.list_future_by_rule(&rule_id, session.start_at).await?;
        let mut updated = 0;
        for mut target in targets {
            let date = target.start_at.with_timezone(&tz).date_naive();
            target.start_at = schedule::local_datetime(date, start_t, &tz)?;
            target.end_at = schedule::local_datetime(date, end_t, &tz)?;
            apply_session_fields(&mut target, &payload);
            state.session_repo.update(&target).await?;
            updated += 1;
        }

        info!("Updated rule {} and {} future session(s)", rule_id, updated);
        return Ok(Json(serde_json::json!({ "status": "ok", "updated": updated })));
    }

    if let (Some(date), Some(start_time)) = (payload.date, &payload.start_time) {
        let start_t = schedule::parse_hhmm(start_time)?;
        let duration = session.end_at - session.start_at;
        session.start_at = schedule::local_datetime(date, start_t, &tz)?;
        session.end_at = match &payload.end_time {
            Some(end_time) => schedule::local_datetime(date, schedule::parse_hhmm(end_time)?, &tz)?,
            None => session.start_at + duration,
        };
    }
    apply_session_fields(&mut session, &payload);

    let updated = state.session_repo.update(&session).await?;
    info!("Session updated: {}", updated.id);
    Ok(Json(serde_json::json!({ "status": "ok", "updated": 1, "session": updated })))
}

fn apply_session_fields(session: &mut Session, payload: &UpdateSessionRequest) {
    if let Some(room_id) = &payload.room_id {
        session.room_id = if room_id.is_empty() { None } else { Some(room_id.clone()) };
    }
    if let Some(staff_id) = &payload.staff_id {
        session.staff_id = if staff_id.is_empty() { None } else { Some(staff_id.clone()) };
    }
    if let Some(max_capacity) = payload.max_capacity {
        session.max_capacity = max_capacity;
    }
    if let Some(notes) = &payload.notes {
        session.notes = notes.clone();
    }
}

pub async fn cancel_session(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Path((_, session_id)): Path<(String, String)>,
    Json(payload): Json<CancelSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.manage_activity_sessions").await?;

    let mut session = state.session_repo.find_by_id(&gym_id, &session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    if !session.is_scheduled() {
        return Err(AppError::Conflict("Session is already closed".into()));
    }

    let mode = payload.mode.as_deref().unwrap_or("single");
    let cancelled = if mode == "future"
        && let Some(rule_id) = &session.rule_id
    {
        state.session_repo.cancel_future_by_rule(rule_id, session.start_at).await?
    } else {
        session.status = "CANCELLED".to_string();
        state.session_repo.update(&session).await?;
        1
    };

    info!("Cancelled {} session(s) starting from {}", cancelled, session_id);
    Ok(Json(serde_json::json!({ "status": "ok", "cancelled": cancelled })))
}
