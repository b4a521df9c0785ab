use crate::domain::models::activity::ActivityPolicy;
use crate::domain::models::booking::Booking;
use crate::domain::models::job::NotificationJob;
use crate::domain::models::session::Session;
use crate::domain::models::waitlist::WaitlistEntry;
use crate::domain::ports::{BookingRepository, EligibilityService, NotificationJobRepository, WaitlistRepository};
use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

pub struct PromotionOutcome {
    pub promoted: Option<WaitlistEntry>,
    pub notified: i64,
}

impl PromotionOutcome {
    fn idle() -> Self {
        Self { promoted: None, notified: 0 }
    }
}

/// Manages queued clients for full sessions and converts them into
/// confirmed bookings when capacity frees up. Promotion order is
/// (is_vip DESC, joined_at ASC); the capacity decision itself is always
/// the booking repository's guarded insert, so promotion can never
/// overshoot `max_capacity` even against concurrent direct bookings.
pub struct WaitlistService {
    booking_repo: Arc<dyn BookingRepository>,
    waitlist_repo: Arc<dyn WaitlistRepository>,
    job_repo: Arc<dyn NotificationJobRepository>,
    eligibility: Arc<dyn EligibilityService>,
}

impl WaitlistService {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        waitlist_repo: Arc<dyn WaitlistRepository>,
        job_repo: Arc<dyn NotificationJobRepository>,
        eligibility: Arc<dyn EligibilityService>,
    ) -> Self {
        Self { booking_repo, waitlist_repo, job_repo, eligibility }
    }

    pub async fn join(
        &self,
        session: &Session,
        policy: Option<&ActivityPolicy>,
        client_id: &str,
    ) -> Result<(WaitlistEntry, i64), AppError> {
        let Some(policy) = policy.filter(|p| p.waitlist_enabled) else {
            return Err(AppError::WaitlistDisabled);
        };

        if self.booking_repo.find_active(&session.id, client_id).await?.is_some() {
            return Err(AppError::AlreadyBooked);
        }
        if self.waitlist_repo.find_active(&session.id, client_id).await?.is_some() {
            return Err(AppError::AlreadyWaitlisted);
        }
        if policy.waitlist_limit > 0
            && self.waitlist_repo.active_count(&session.id).await? >= policy.waitlist_limit as i64
        {
            return Err(AppError::WaitlistLimitReached);
        }

        // VIP tier is the loyalty collaborator's call; an outage just means
        // no priority this time.
        let is_vip = self
            .eligibility
            .is_vip(client_id, Some(policy))
            .await
            .unwrap_or(false);

        let entry = self
            .waitlist_repo
            .insert(&WaitlistEntry::new(
                session.id.clone(),
                session.gym_id.clone(),
                client_id.to_string(),
                is_vip,
            ))
            .await?;
        let position = self.position_of(&entry).await?;

        info!("Client {} joined waitlist for session {} at position {}", client_id, session.id, position);
        Ok((entry, position))
    }

    /// 1-based position in promotion order. VIP entries rank among VIPs
    /// only; for non-VIPs every VIP counts as ahead regardless of when it
    /// joined.
    pub async fn position_of(&self, entry: &WaitlistEntry) -> Result<i64, AppError> {
        let ahead = self
            .waitlist_repo
            .count_active_before(&entry.session_id, entry.joined_at, entry.is_vip)
            .await?;
        Ok(ahead + 1)
    }

    /// Invoked whenever capacity may have freed up. Does nothing unless the
    /// policy enables a waitlist, the session is still SCHEDULED, a slot is
    /// actually free and auto-promotion has not been cut off this close to
    /// start.
    pub async fn promote(
        &self,
        session: &Session,
        policy: Option<&ActivityPolicy>,
        exclude_client: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PromotionOutcome, AppError> {
        let Some(policy) = policy.filter(|p| p.waitlist_enabled) else {
            return Ok(PromotionOutcome::idle());
        };
        if !session.is_scheduled() {
            return Ok(PromotionOutcome::idle());
        }
        let hours_until = (session.start_at - now).num_seconds() as f64 / 3600.0;
        if hours_until < policy.auto_promote_cutoff_hours as f64 {
            return Ok(PromotionOutcome::idle());
        }
        if self.booking_repo.confirmed_count(&session.id).await? >= session.max_capacity as i64 {
            return Ok(PromotionOutcome::idle());
        }

        self.expire_lapsed(session, now).await?;

        match policy.waitlist_mode.as_str() {
            "BROADCAST" | "FIRST_CLAIM" => {
                let head = self
                    .waitlist_repo
                    .waiting_entries(&session.id, exclude_client, Some(1))
                    .await?
                    .into_iter()
                    .next();
                let Some(head) = head else {
                    return Ok(PromotionOutcome::idle());
                };

                // VIPs never compete for a claim.
                if head.is_vip {
                    return Ok(PromotionOutcome {
                        promoted: self.confirm_entry(session, &head).await?,
                        notified: 0,
                    });
                }

                let limit = match policy.waitlist_mode.as_str() {
                    "FIRST_CLAIM" => None,
                    _ => Some(policy.broadcast_count as i64),
                };
                let deadline = now + Duration::minutes(policy.waitlist_claim_timeout_minutes as i64);
                let entries = self.waitlist_repo.waiting_entries(&session.id, exclude_client, limit).await?;

                let mut notified = 0;
                for entry in entries {
                    self.waitlist_repo.mark_notified(&entry.id, deadline).await?;
                    self.enqueue(session, &entry.client_id, "WAITLIST_SPOT_AVAILABLE").await;
                    notified += 1;
                }
                Ok(PromotionOutcome { promoted: None, notified })
            }
            _ => {
                let next = self
                    .waitlist_repo
                    .waiting_entries(&session.id, exclude_client, Some(1))
                    .await?
                    .into_iter()
                    .next();
                let Some(next) = next else {
                    return Ok(PromotionOutcome::idle());
                };
                Ok(PromotionOutcome {
                    promoted: self.confirm_entry(session, &next).await?,
                    notified: 0,
                })
            }
        }
    }

    /// First successful capacity increment wins; everyone else gets a 409.
    /// A losing claimant keeps its NOTIFIED entry until the window lapses.
    pub async fn claim(
        &self,
        session: &Session,
        policy: Option<&ActivityPolicy>,
        entry: &WaitlistEntry,
        now: DateTime<Utc>,
    ) -> Result<Booking, AppError> {
        if !entry.is_active() {
            return Err(AppError::Validation("This waitlist entry is no longer active".into()));
        }
        if entry.claim_lapsed(now) {
            self.waitlist_repo.mark_expired(&entry.id).await?;
            // the queue moves on to the next eligible entry
            self.promote(session, policy, Some(&entry.client_id), now).await?;
            return Err(AppError::ClaimExpired);
        }

        let booking = Booking::new(session.id.clone(), session.gym_id.clone(), entry.client_id.clone(), None);
        if !self.booking_repo.insert_confirmed_if_free(&booking, session.max_capacity).await? {
            if self.booking_repo.find_active(&session.id, &entry.client_id).await?.is_some() {
                return Err(AppError::AlreadyBooked);
            }
            return Err(AppError::SpotTaken("The spot was already claimed by another client".into()));
        }

        self.waitlist_repo.mark_promoted(&entry.id).await?;
        self.enqueue(session, &entry.client_id, "WAITLIST_PROMOTED").await;

        self.booking_repo
            .find_active(&session.id, &entry.client_id)
            .await?
            .ok_or(AppError::Internal)
    }

    /// Leaving never triggers promotion: the entry held no capacity.
    pub async fn leave(&self, entry: &WaitlistEntry) -> Result<WaitlistEntry, AppError> {
        if !entry.is_active() {
            return Err(AppError::Validation("This waitlist entry is no longer active".into()));
        }
        self.waitlist_repo.mark_cancelled(&entry.id).await
    }

    /// Claim deadlines are hard but enforced lazily: expire whatever has
    /// lapsed for this session before deciding who is next.
    async fn expire_lapsed(&self, session: &Session, now: DateTime<Utc>) -> Result<(), AppError> {
        for entry in self.waitlist_repo.active_entries(&session.id).await? {
            if entry.status == "NOTIFIED" && entry.claim_lapsed(now) {
                self.waitlist_repo.mark_expired(&entry.id).await?;
                info!("Waitlist entry {} expired unclaimed for session {}", entry.id, session.id);
            }
        }
        Ok(())
    }

    async fn confirm_entry(&self, session: &Session, entry: &WaitlistEntry) -> Result<Option<WaitlistEntry>, AppError> {
        let booking = Booking::new(session.id.clone(), session.gym_id.clone(), entry.client_id.clone(), None);
        if !self.booking_repo.insert_confirmed_if_free(&booking, session.max_capacity).await? {
            // Lost the slot to a concurrent booking; the entry keeps its
            // place in the queue.
            warn!("Promotion of entry {} lost the capacity race on session {}", entry.id, session.id);
            return Ok(None);
        }
        let promoted = self.waitlist_repo.mark_promoted(&entry.id).await?;
        self.enqueue(session, &entry.client_id, "WAITLIST_PROMOTED").await;
        info!("Promoted client {} from waitlist on session {}", entry.client_id, session.id);
        Ok(Some(promoted))
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
