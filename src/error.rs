use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Internal server error")]
    Internal,

    // Capacity
    #[error("Session is full")]
    CapacityExceeded,
    #[error("{0}")]
    SpotTaken(String),

    // Booking state
    #[error("Client already has a booking for this session")]
    AlreadyBooked,
    #[error("No reservation found for this session")]
    NoReservation,

    // Waitlist policy
    #[error("Waitlist is not enabled for this activity")]
    WaitlistDisabled,
    #[error("Waitlist is full")]
    WaitlistLimitReached,
    #[error("Client is already on the waitlist")]
    AlreadyWaitlisted,
    #[error("The window to claim this spot has expired")]
    ClaimExpired,

    // QR check-in. Token failures collapse into one generic variant so the
    // response leaks nothing about which check failed; the precise cause is
    // logged where the token is verified.
    #[error("Invalid QR code")]
    InvalidQr,
    #[error("Outside of check-in window: {0}")]
    OutsideCheckinWindow(String),

    // Schedule generation conflicts
    #[error("Room conflict: {0}")]
    RoomOverlap(String),
    #[error("Staff conflict: {0}")]
    StaffOverlap(String),
    #[error("Minimum break violated: {0}")]
    MinBreakViolation(String),
}

impl AppError {
    /// Stable machine-readable code surfaced next to the human message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION",
            AppError::Internal => "INTERNAL",
            AppError::CapacityExceeded => "CAPACITY_EXCEEDED",
            AppError::SpotTaken(_) => "SPOT_TAKEN",
            AppError::AlreadyBooked => "ALREADY_BOOKED",
            AppError::NoReservation => "NO_RESERVATION",
            AppError::WaitlistDisabled => "WAITLIST_DISABLED",
            AppError::WaitlistLimitReached => "WAITLIST_LIMIT_REACHED",
            AppError::AlreadyWaitlisted => "ALREADY_WAITLISTED",
            AppError::ClaimExpired => "CLAIM_EXPIRED",
            AppError::InvalidQr => "INVALID_QR",
            AppError::OutsideCheckinWindow(_) => "OUTSIDE_CHECKIN_WINDOW",
            AppError::RoomOverlap(_) => "ROOM_OVERLAP",
            AppError::StaffOverlap(_) => "STAFF_OVERLAP",
            AppError::MinBreakViolation(_) => "MIN_BREAK",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_)
            | AppError::CapacityExceeded
            | AppError::SpotTaken(_)
            | AppError::AlreadyBooked
            | AppError::AlreadyWaitlisted
            | AppError::RoomOverlap(_)
            | AppError::StaffOverlap(_)
            | AppError::MinBreakViolation(_) => StatusCode::CONFLICT,
            AppError::Validation(_)
            | AppError::NoReservation
            | AppError::WaitlistDisabled
            | AppError::WaitlistLimitReached
            | AppError::ClaimExpired
            | AppError::InvalidQr
            | AppError::OutsideCheckinWindow(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (self.status(), body).into_response()
    }
}
