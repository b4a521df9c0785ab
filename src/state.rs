use crate::config::Config;
use crate::domain::ports::{
    AccessControl, ActivityRepository, BookingRepository, CheckinRepository, EligibilityService,
    NotificationJobRepository, NotificationService, PolicyRepository, RoomRepository, RuleRepository,
    SessionRepository, SettingsRepository, WaitlistRepository,
};
use crate::domain::services::booking::BookingService;
use crate::domain::services::checkin::CheckinService;
use crate::domain::services::waitlist::WaitlistService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub room_repo: Arc<dyn RoomRepository>,
    pub activity_repo: Arc<dyn ActivityRepository>,
    pub policy_repo: Arc<dyn PolicyRepository>,
    pub rule_repo: Arc<dyn RuleRepository>,
    pub session_repo: Arc<dyn SessionRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub waitlist_repo: Arc<dyn WaitlistRepository>,
    pub checkin_repo: Arc<dyn CheckinRepository>,
    pub settings_repo: Arc<dyn SettingsRepository>,
    pub job_repo: Arc<dyn NotificationJobRepository>,
    pub notify_service: Arc<dyn NotificationService>,
    pub eligibility: Arc<dyn EligibilityService>,
    pub access_control: Arc<dyn AccessControl>,
    pub booking_service: Arc<BookingService>,
    pub waitlist_service: Arc<WaitlistService>,
    pub checkin_service: Arc<CheckinService>,
}
