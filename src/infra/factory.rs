use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::ports::{AccessControl, EligibilityService};
use crate::domain::services::booking::BookingService;
use crate::domain::services::checkin::CheckinService;
use crate::domain::services::waitlist::WaitlistService;
use crate::infra::collaborators::{AllowAllAccessControl, HttpAccessControl, HttpEligibilityService, OpenEligibilityService};
use crate::infra::notify::http_notify_service::HttpNotifyService;
use crate::infra::repositories::{
    sqlite_activity_repo::SqliteActivityRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_checkin_repo::SqliteCheckinRepo, sqlite_job_repo::SqliteJobRepo,
    sqlite_policy_repo::SqlitePolicyRepo, sqlite_room_repo::SqliteRoomRepo,
    sqlite_rule_repo::SqliteRuleRepo, sqlite_session_repo::SqliteSessionRepo,
    sqlite_settings_repo::SqliteSettingsRepo, sqlite_waitlist_repo::SqliteWaitlistRepo,
};
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid SQLite connection string")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .expect("Failed to connect to SQLite");

    run_migrations(&pool).await;

    let eligibility: Arc<dyn EligibilityService> = match &config.membership_service_url {
        Some(url) => Arc::new(HttpEligibilityService::new(url.clone(), config.membership_service_token.clone())),
        None => Arc::new(OpenEligibilityService),
    };

    let access_control: Arc<dyn AccessControl> = match &config.access_control_url {
        Some(url) => Arc::new(HttpAccessControl::new(url.clone())),
        None => Arc::new(AllowAllAccessControl),
    };

    let notify_service = Arc::new(HttpNotifyService::new(
        config.notify_service_url.clone(),
        config.notify_service_token.clone(),
    ));

    let room_repo = Arc::new(SqliteRoomRepo::new(pool.clone()));
    let activity_repo = Arc::new(SqliteActivityRepo::new(pool.clone()));
    let policy_repo = Arc::new(SqlitePolicyRepo::new(pool.clone()));
    let rule_repo = Arc::new(SqliteRuleRepo::new(pool.clone()));
    let session_repo = Arc::new(SqliteSessionRepo::new(pool.clone()));
    let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));
    let waitlist_repo = Arc::new(SqliteWaitlistRepo::new(pool.clone()));
    let checkin_repo = Arc::new(SqliteCheckinRepo::new(pool.clone()));
    let settings_repo = Arc::new(SqliteSettingsRepo::new(pool.clone()));
    let job_repo = Arc::new(SqliteJobRepo::new(pool.clone()));

    let waitlist_service = Arc::new(WaitlistService::new(
        booking_repo.clone(),
        waitlist_repo.clone(),
        job_repo.clone(),
        eligibility.clone(),
    ));
    let booking_service = Arc::new(BookingService::new(
        session_repo.clone(),
        booking_repo.clone(),
        waitlist_repo.clone(),
        job_repo.clone(),
        eligibility.clone(),
        waitlist_service.clone(),
    ));
    let checkin_service = Arc::new(CheckinService::new(
        session_repo.clone(),
        activity_repo.clone(),
        booking_repo.clone(),
        checkin_repo.clone(),
        settings_repo.clone(),
        config.qr_secret_key.clone(),
    ));

    AppState {
        config: config.clone(),
        room_repo,
        activity_repo,
        policy_repo,
        rule_repo,
        session_repo,
        booking_repo,
        waitlist_repo,
        checkin_repo,
        settings_repo,
        job_repo,
        notify_service,
        eligibility,
        access_control,
        booking_service,
        waitlist_service,
        checkin_service,
    }
}

async fn run_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run migrations");
}
