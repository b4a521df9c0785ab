use crate::domain::models::activity::{Activity, ActivityPolicy};
use crate::domain::models::booking::{Booking, ATTENDANCE_STATUSES};
use crate::domain::models::job::NotificationJob;
use crate::domain::models::session::Session;
use crate::domain::models::waitlist::WaitlistEntry;
use crate::domain::ports::{
    BookingRepository, EligibilityService, NotificationJobRepository, SessionRepository, WaitlistRepository,
};
use crate::domain::services::cancellation;
use crate::domain::services::waitlist::WaitlistService;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

pub struct RemovalOutcome {
    /// "EARLY", "LATE" or "WAITLIST" as applied to the requested session.
    pub cancellation_type: String,
    pub removed: i64,
    pub moved_to_waitlist: i64,
    pub promoted: i64,
    pub notified: i64,
}

/// The authoritative gate for a session's attendee set. Every path that
/// adds a confirmed booking goes through the repository's guarded insert,
/// which checks capacity and writes in one atomic statement, so two
/// concurrent calls can never both fit through the last free slot.
pub struct BookingService {
    session_repo: Arc<dyn SessionRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    waitlist_repo: Arc<dyn WaitlistRepository>,
    job_repo: Arc<dyn NotificationJobRepository>,
    eligibility: Arc<dyn EligibilityService>,
    waitlist: Arc<WaitlistService>,
}

impl BookingService {
    pub fn new(
        session_repo: Arc<dyn SessionRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        waitlist_repo: Arc<dyn WaitlistRepository>,
        job_repo: Arc<dyn NotificationJobRepository>,
        eligibility: Arc<dyn EligibilityService>,
        waitlist: Arc<WaitlistService>,
    ) -> Self {
        Self { session_repo, booking_repo, waitlist_repo, job_repo, eligibility, waitlist }
    }

    pub async fn add_attendee(
        &self,
        session: &Session,
        activity: &Activity,
        client_id: &str,
        spot_number: Option<i32>,
    ) -> Result<Booking, AppError> {
        if !session.is_scheduled() {
            return Err(AppError::Conflict("Session is not open for booking".into()));
        }
        if spot_number.is_some() && !activity.allow_spot_booking {
            return Err(AppError::Validation("This activity does not allow spot selection".into()));
        }

        if !self.eligibility.entitlement_check(client_id, session).await? {
            return Err(AppError::Forbidden("No valid membership covers this class".into()));
        }

        if self.booking_repo.find_active(&session.id, client_id).await?.is_some() {
            return Err(AppError::AlreadyBooked);
        }
        if let Some(spot) = spot_number
            && let Some(holder) = self.booking_repo.spot_holder(&session.id, spot).await?
            && holder.client_id != client_id
        {
            return Err(AppError::SpotTaken(format!("Spot #{spot} is already taken")));
        }

        let booking = Booking::new(session.id.clone(), session.gym_id.clone(), client_id.to_string(), spot_number);
        if !self.booking_repo.insert_confirmed_if_free(&booking, session.max_capacity).await? {
            // The guard rejected the write; re-check to report the precise cause.
            if self.booking_repo.find_active(&session.id, client_id).await?.is_some() {
                return Err(AppError::AlreadyBooked);
            }
            if let Some(spot) = spot_number
                && self.booking_repo.spot_holder(&session.id, spot).await?.is_some()
            {
                return Err(AppError::SpotTaken(format!("Spot #{spot} is already taken")));
            }
            return Err(AppError::CapacityExceeded);
        }

        // A directly-booked client no longer needs its waitlist place.
        self.waitlist_repo.promote_active_for_client(&session.id, client_id).await?;
        self.enqueue(session, client_id, "CLASS_BOOKED").await;

        let created = self
            .booking_repo
            .find_active(&session.id, client_id)
            .await?
            .ok_or(AppError::Internal)?;
        info!("Client {} booked into session {}", client_id, session.id);
        Ok(created)
    }

    /// `mode` is "single" or "future" (this and all later sessions of the
    /// same rule where the client is booked). When no cancellation type is
    /// forced, the policy evaluator classifies each session on its own
    /// clock, so a "future" batch can mix LATE (today's class) with EARLY.
    pub async fn remove_attendee(
        &self,
        session: &Session,
        policy: Option<&ActivityPolicy>,
        client_id: &str,
        mode: &str,
        cancellation_type: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<RemovalOutcome, AppError> {
        if let Some(kind) = cancellation_type
            && !["EARLY", "LATE", "WAITLIST"].contains(&kind)
        {
            return Err(AppError::Validation(format!("Unknown cancellation type: {kind}")));
        }

        let mut targets = vec![session.clone()];
        if mode == "future"
            && let Some(rule_id) = &session.rule_id
        {
            for booking in self
                .booking_repo
                .list_active_future_by_rule(rule_id, client_id, session.start_at)
                .await?
            {
                if booking.session_id == session.id {
                    continue;
                }
                if let Some(s) = self.session_repo.find_by_id(&session.gym_id, &booking.session_id).await? {
                    targets.push(s);
                }
            }
        }

        let mut outcome = RemovalOutcome {
            cancellation_type: String::new(),
            removed: 0,
            moved_to_waitlist: 0,
            promoted: 0,
            notified: 0,
        };

        for (i, target) in targets.iter().enumerate() {
            let booking = match self.booking_repo.find_active(&target.id, client_id).await? {
                Some(b) => b,
                None if i == 0 => return Err(AppError::NoReservation),
                None => continue,
            };

            let kind = match cancellation_type {
                Some(kind) => kind.to_string(),
                None => cancellation::evaluate(target.start_at, policy, now).kind,
            };
            if i == 0 {
                outcome.cancellation_type = kind.clone();
            }

            match kind.as_str() {
                "WAITLIST" => {
                    let waitlist_open = policy.is_some_and(|p| p.waitlist_enabled);
                    if !waitlist_open {
                        if i == 0 {
                            return Err(AppError::WaitlistDisabled);
                        }
                        continue;
                    }
                    self.booking_repo.cancel(&booking.id, None).await?;
                    let is_vip = self
                        .eligibility
                        .is_vip(client_id, policy)
                        .await
                        .unwrap_or(false);
                    self.waitlist_repo
                        .insert(&WaitlistEntry::new(
                            target.id.clone(),
                            target.gym_id.clone(),
                            client_id.to_string(),
                            is_vip,
                        ))
                        .await?;
                    outcome.moved_to_waitlist += 1;

                    let promotion = self.waitlist.promote(target, policy, Some(client_id), now).await?;
                    outcome.promoted += promotion.promoted.is_some() as i64;
                    outcome.notified += promotion.notified;
                }
                "LATE" => {
                    // Late cancel: the row stays visible with attendance
                    // LATE_CANCEL and stops counting against capacity, but
                    // the waitlist is not run for it.
                    self.booking_repo.cancel(&booking.id, Some("LATE_CANCEL")).await?;
                    outcome.removed += 1;
                }
                _ => {
                    self.booking_repo.cancel(&booking.id, None).await?;
                    outcome.removed += 1;

                    let promotion = self.waitlist.promote(target, policy, Some(client_id), now).await?;
                    outcome.promoted += promotion.promoted.is_some() as i64;
                    outcome.notified += promotion.notified;
                }
            }
        }

        info!(
            "Removed client {} from {} session(s) as {} (promoted {}, notified {})",
            client_id,
            outcome.removed + outcome.moved_to_waitlist,
            outcome.cancellation_type,
            outcome.promoted,
            outcome.notified
        );
        Ok(outcome)
    }

    /// Idempotent: re-marking with the same status just refreshes the
    /// marker metadata.
    pub async fn mark_attendance(
        &self,
        booking: &Booking,
        status: &str,
        marked_by: &str,
    ) -> Result<Booking, AppError> {
        if !ATTENDANCE_STATUSES.contains(&status) {
            return Err(AppError::Validation(format!("Invalid attendance status: {status}")));
        }
        self.booking_repo.mark_attendance(&booking.id, status, marked_by).await
    }

    /// Moves an existing active booking to another spot.
    pub async fn change_spot(
        &self,
        session: &Session,
        activity: &Activity,
        client_id: &str,
        spot_number: i32,
    ) -> Result<Booking, AppError> {
        if !activity.allow_spot_booking {
            return Err(AppError::Validation("This activity does not allow spot selection".into()));
        }
        let booking = self
            .booking_repo
            .find_active(&session.id, client_id)
            .await?
            .ok_or(AppError::NoReservation)?;
        if let Some(holder) = self.booking_repo.spot_holder(&session.id, spot_number).await?
            && holder.client_id != client_id
        {
            return Err(AppError::SpotTaken(format!("Spot #{spot_number} is already taken")));
        }
        self.booking_repo.set_spot(&booking.id, spot_number).await
    }

    async fn enqueue(&self, session: &Session, client_id: &str, event_type: &str) {
        let job = NotificationJob::new(
            session.gym_id.clone(),
            client_id.to_string(),
            session.id.clone(),
            event_type,
        );
        if let Err(e) = self.job_repo.enqueue(&job).await {
            warn!("Failed to enqueue {} notification: {:?}", event_type, e);
        }
    }
}
