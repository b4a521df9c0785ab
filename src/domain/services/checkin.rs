use crate::domain::models::checkin::{Checkin, CheckinSettings};
use crate::domain::models::session::Session;
use crate::domain::ports::{ActivityRepository, BookingRepository, CheckinRepository, SessionRepository, SettingsRepository};
use crate::domain::services::qr_token::{self, TokenError};
use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

pub struct CheckinOutcome {
    pub checkin: Checkin,
    pub already_checked_in: bool,
    pub message: String,
}

pub struct QrDisplayData {
    pub token: String,
    pub refresh_in: i64,
    pub session_id: String,
    pub qr_seq: i64,
}

/// Self check-in via rotating session-bound QR tokens. Token failures are
/// security-relevant: the precise cause is logged, the caller only ever
/// sees a generic "invalid QR".
pub struct CheckinService {
    session_repo: Arc<dyn SessionRepository>,
    activity_repo: Arc<dyn ActivityRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    checkin_repo: Arc<dyn CheckinRepository>,
    settings_repo: Arc<dyn SettingsRepository>,
    qr_secret: String,
}

impl CheckinService {
    pub fn new(
        session_repo: Arc<dyn SessionRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        checkin_repo: Arc<dyn CheckinRepository>,
        settings_repo: Arc<dyn SettingsRepository>,
        qr_secret: String,
    ) -> Self {
        Self { session_repo, activity_repo, booking_repo, checkin_repo, settings_repo, qr_secret }
    }

    /// Current token for a session's projected QR, plus how long until the
    /// display should refresh it.
    pub fn display_data(&self, session: &Session, settings: &CheckinSettings, now: DateTime<Utc>) -> QrDisplayData {
        let refresh = settings.qr_refresh_seconds as i64;
        let rounded = qr_token::rounded_timestamp(now.timestamp(), refresh);
        QrDisplayData {
            token: qr_token::generate_token(&self.qr_secret, session.qr_seq, rounded),
            refresh_in: refresh - (now.timestamp() - rounded),
            session_id: session.id.clone(),
            qr_seq: session.qr_seq,
        }
    }

    pub async fn checkin_by_qr(&self, token: &str, client_id: &str, now: DateTime<Utc>) -> Result<CheckinOutcome, AppError> {
        let seq = qr_token::peek_session_seq(token).map_err(|_| {
            warn!("QR check-in rejected: malformed token");
            AppError::InvalidQr
        })?;

        let session = self.session_repo.find_by_qr_seq(seq).await?.ok_or_else(|| {
            warn!("QR check-in rejected: token references unknown session {}", seq);
            AppError::InvalidQr
        })?;

        let settings = self.settings_repo.checkin_settings(&session.gym_id).await?;

        if let Err(cause) = qr_token::verify_token(
            &self.qr_secret,
            token,
            session.qr_seq,
            settings.max_token_age_seconds(),
            now.timestamp(),
        ) {
            match cause {
                TokenError::Expired => warn!("QR check-in rejected: expired token for session {}", session.id),
                TokenError::SessionMismatch => warn!("QR check-in rejected: session mismatch for session {}", session.id),
                _ => warn!("QR check-in rejected: bad signature for session {}", session.id),
            }
            return Err(AppError::InvalidQr);
        }

        let activity = self
            .activity_repo
            .find_by_id(&session.gym_id, &session.activity_id)
            .await?
            .ok_or(AppError::Internal)?;
        if !activity.qr_checkin_enabled {
            return Err(AppError::Forbidden("QR check-in is not enabled for this class".into()));
        }

        let window_start = session.start_at - Duration::minutes(settings.minutes_before as i64);
        let window_end = session.start_at + Duration::minutes(settings.minutes_after as i64);
        if now < window_start {
            return Err(AppError::OutsideCheckinWindow(format!(
                "Check-in opens {} minutes before the class",
                settings.minutes_before
            )));
        }
        if now > window_end {
            return Err(AppError::OutsideCheckinWindow("The check-in window has closed".into()));
        }

        let booking = self
            .booking_repo
            .find_active(&session.id, client_id)
            .await?
            .ok_or(AppError::NoReservation)?;

        // Re-scans are idempotent: hand back the original record.
        if let Some(existing) = self.checkin_repo.find(&session.id, client_id).await? {
            return Ok(CheckinOutcome {
                message: format!("Already checked in at {}", existing.checked_in_at.format("%H:%M")),
                checkin: existing,
                already_checked_in: true,
            });
        }

        let record = Checkin::new(
            session.id.clone(),
            session.gym_id.clone(),
            client_id.to_string(),
            "QR",
            Some(token.to_string()),
        );
        let created = match self.checkin_repo.insert(&record).await {
            Ok(created) => created,
            // Two scans racing past the existence check: the unique index
            // decides, the loser returns the winner's record.
            Err(AppError::Database(_)) => {
                if let Some(existing) = self.checkin_repo.find(&session.id, client_id).await? {
                    return Ok(CheckinOutcome {
                        message: format!("Already checked in at {}", existing.checked_in_at.format("%H:%M")),
                        checkin: existing,
                        already_checked_in: true,
                    });
                }
                return Err(AppError::Internal);
            }
            Err(e) => return Err(e),
        };

        self.booking_repo.mark_attendance(&booking.id, "ATTENDED", "self-qr").await?;

        info!("Client {} checked into session {} via QR", client_id, session.id);
        Ok(CheckinOutcome {
            checkin: created,
            already_checked_in: false,
            message: settings.success_message,
        })
    }
}
