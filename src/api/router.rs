use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post, put},
    Router,
};
use crate::api::handlers::{activity, booking, checkin, health, policy, room, schedule, session, settings, waitlist};
use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Rooms & Activities
        .route("/api/v1/{gym_id}/rooms", get(room::list_rooms).post(room::create_room))
        .route("/api/v1/{gym_id}/activities", get(activity::list_activities).post(activity::create_activity))
        .route("/api/v1/{gym_id}/activities/{activity_id}", put(activity::update_activity).delete(activity::delete_activity))
        .route("/api/v1/{gym_id}/policies", get(policy::list_policies).post(policy::create_policy))

        // Settings
        .route("/api/v1/{gym_id}/schedule-settings", get(settings::get_schedule_settings).put(settings::update_schedule_settings))
        .route("/api/v1/{gym_id}/checkin-settings", get(settings::get_checkin_settings).put(settings::update_checkin_settings))

        // Scheduling
        .route("/api/v1/{gym_id}/sessions", get(session::list_sessions).post(schedule::create_session))
        .route("/api/v1/{gym_id}/sessions/recurring", post(schedule::create_recurring))
        .route("/api/v1/{gym_id}/sessions/{session_id}", get(session::get_session).put(schedule::update_session))
        .route("/api/v1/{gym_id}/sessions/{session_id}/cancel", post(schedule::cancel_session))

        // Attendees & attendance
        .route("/api/v1/{gym_id}/sessions/{session_id}/attendees", post(booking::add_attendee))
        .route("/api/v1/{gym_id}/sessions/{session_id}/attendees/{client_id}", delete(booking::remove_attendee))
        .route("/api/v1/{gym_id}/sessions/{session_id}/attendance", post(booking::mark_attendance))
        .route("/api/v1/{gym_id}/sessions/{session_id}/spots", get(booking::get_spots).post(booking::change_spot))

        // Waitlist
        .route("/api/v1/{gym_id}/sessions/{session_id}/waitlist", post(waitlist::join_waitlist))
        .route("/api/v1/{gym_id}/waitlist/{entry_id}", delete(waitlist::leave_waitlist))
        .route("/api/v1/{gym_id}/waitlist/{entry_id}/claim", post(waitlist::claim_waitlist_spot))

        // QR check-in
        .route("/api/v1/{gym_id}/sessions/{session_id}/qr", get(checkin::qr_display))
        .route("/api/v1/{gym_id}/checkin/qr/{token}", post(checkin::qr_checkin))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        gym_id = tracing::field::Empty,
                        actor = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
