use crate::domain::models::{
    activity::{Activity, ActivityPolicy},
    booking::Booking,
    checkin::{Checkin, CheckinSettings},
    job::NotificationJob,
    room::Room,
    schedule::{ScheduleRule, ScheduleSettings},
    session::Session,
    waitlist::WaitlistEntry,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create(&self, room: &Room) -> Result<Room, AppError>;
    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<Room>, AppError>;
    async fn list(&self, gym_id: &str) -> Result<Vec<Room>, AppError>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn create(&self, activity: &Activity) -> Result<Activity, AppError>;
    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<Activity>, AppError>;
    async fn list(&self, gym_id: &str) -> Result<Vec<Activity>, AppError>;
    async fn update(&self, activity: &Activity) -> Result<Activity, AppError>;
    async fn delete(&self, gym_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait PolicyRepository: Send + Sync {
    async fn create(&self, policy: &ActivityPolicy) -> Result<ActivityPolicy, AppError>;
    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<ActivityPolicy>, AppError>;
    async fn list(&self, gym_id: &str) -> Result<Vec<ActivityPolicy>, AppError>;
}

#[async_trait]
pub trait RuleRepository: Send + Sync {
    async fn create(&self, rule: &ScheduleRule) -> Result<ScheduleRule, AppError>;
    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<ScheduleRule>, AppError>;
    async fn update(&self, rule: &ScheduleRule) -> Result<ScheduleRule, AppError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Inserts the session and assigns its `qr_seq`.
    async fn create(&self, session: &Session) -> Result<Session, AppError>;
    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<Session>, AppError>;
    async fn find_by_qr_seq(&self, qr_seq: i64) -> Result<Option<Session>, AppError>;
    /// Non-cancelled sessions overlapping [start, end).
    async fn list_by_range(&self, gym_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Session>, AppError>;
    /// SCHEDULED sessions of a rule starting at or after `from`.
    async fn list_future_by_rule(&self, rule_id: &str, from: DateTime<Utc>) -> Result<Vec<Session>, AppError>;
    async fn update(&self, session: &Session) -> Result<Session, AppError>;
    async fn cancel_future_by_rule(&self, rule_id: &str, from: DateTime<Utc>) -> Result<u64, AppError>;
    async fn count_by_activity(&self, activity_id: &str) -> Result<i64, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// The capacity gate. Inserts (or revives a cancelled row for the same
    /// client) only while the session's confirmed count stays below
    /// `max_capacity` and the requested spot is free, as one atomic
    /// statement. Returns false when the guard rejected the write.
    async fn insert_confirmed_if_free(&self, booking: &Booking, max_capacity: i32) -> Result<bool, AppError>;
    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<Booking>, AppError>;
    async fn find_active(&self, session_id: &str, client_id: &str) -> Result<Option<Booking>, AppError>;
    /// Confirmed bookings excluding LATE_CANCEL rows: the number that
    /// counts against `max_capacity`.
    async fn confirmed_count(&self, session_id: &str) -> Result<i64, AppError>;
    async fn spot_holder(&self, session_id: &str, spot_number: i32) -> Result<Option<Booking>, AppError>;
    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn cancel(&self, booking_id: &str, attendance_status: Option<&str>) -> Result<Booking, AppError>;
    async fn mark_attendance(&self, booking_id: &str, status: &str, marked_by: &str) -> Result<Booking, AppError>;
    async fn set_spot(&self, booking_id: &str, spot_number: i32) -> Result<Booking, AppError>;
    /// Active bookings of a client on future SCHEDULED sessions of a rule.
    async fn list_active_future_by_rule(&self, rule_id: &str, client_id: &str, from: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
}

#[async_trait]
pub trait WaitlistRepository: Send + Sync {
    async fn insert(&self, entry: &WaitlistEntry) -> Result<WaitlistEntry, AppError>;
    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<WaitlistEntry>, AppError>;
    async fn find_active(&self, session_id: &str, client_id: &str) -> Result<Option<WaitlistEntry>, AppError>;
    async fn active_count(&self, session_id: &str) -> Result<i64, AppError>;
    /// Active entries in promotion order (is_vip DESC, joined_at ASC).
    async fn active_entries(&self, session_id: &str) -> Result<Vec<WaitlistEntry>, AppError>;
    /// WAITING entries in promotion order, optionally excluding a client
    /// and capping the result.
    async fn waiting_entries(&self, session_id: &str, exclude_client: Option<&str>, limit: Option<i64>) -> Result<Vec<WaitlistEntry>, AppError>;
    async fn mark_promoted(&self, id: &str) -> Result<WaitlistEntry, AppError>;
    async fn mark_notified(&self, id: &str, claim_expires_at: DateTime<Utc>) -> Result<WaitlistEntry, AppError>;
    async fn mark_cancelled(&self, id: &str) -> Result<WaitlistEntry, AppError>;
    async fn mark_expired(&self, id: &str) -> Result<WaitlistEntry, AppError>;
    /// Flips any active entry of the client to PROMOTED (used when a
    /// waitlisted client gets booked directly).
    async fn promote_active_for_client(&self, session_id: &str, client_id: &str) -> Result<(), AppError>;
    /// NOTIFIED entries whose claim window has lapsed.
    async fn lapsed_entries(&self, now: DateTime<Utc>) -> Result<Vec<WaitlistEntry>, AppError>;
    /// Active entries ahead of `joined_at`; vip_only restricts to the VIP
    /// sub-queue. Used for position reporting.
    async fn count_active_before(&self, session_id: &str, joined_at: DateTime<Utc>, vip_only: bool) -> Result<i64, AppError>;
}

#[async_trait]
pub trait CheckinRepository: Send + Sync {
    async fn insert(&self, checkin: &Checkin) -> Result<Checkin, AppError>;
    async fn find(&self, session_id: &str, client_id: &str) -> Result<Option<Checkin>, AppError>;
    async fn count_by_session(&self, session_id: &str) -> Result<i64, AppError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn checkin_settings(&self, gym_id: &str) -> Result<CheckinSettings, AppError>;
    async fn upsert_checkin_settings(&self, settings: &CheckinSettings) -> Result<CheckinSettings, AppError>;
    async fn schedule_settings(&self, gym_id: &str) -> Result<ScheduleSettings, AppError>;
    async fn upsert_schedule_settings(&self, settings: &ScheduleSettings) -> Result<ScheduleSettings, AppError>;
}

#[async_trait]
pub trait NotificationJobRepository: Send + Sync {
    async fn enqueue(&self, job: &NotificationJob) -> Result<(), AppError>;
    async fn find_pending(&self, limit: i32) -> Result<Vec<NotificationJob>, AppError>;
    async fn update_status(&self, id: &str, status: &str, error_message: Option<String>) -> Result<(), AppError>;
}

/// Delivery collaborator behind the outbox. Failures are recorded on the
/// job row and never propagate into request handling.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send(&self, job: &NotificationJob) -> Result<(), AppError>;
}

/// Membership/loyalty collaborator: payment entitlement and VIP tier.
#[async_trait]
pub trait EligibilityService: Send + Sync {
    async fn entitlement_check(&self, client_id: &str, session: &Session) -> Result<bool, AppError>;
    async fn is_vip(&self, client_id: &str, policy: Option<&ActivityPolicy>) -> Result<bool, AppError>;
}

/// Authorization collaborator consulted by every mutating call.
#[async_trait]
pub trait AccessControl: Send + Sync {
    async fn resolve_gym_permission(&self, actor: &str, gym_id: &str, permission: &str) -> Result<bool, AppError>;
}
