use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::{DateTime, Utc};
use gymclass_backend::{
    api::router::create_router,
    config::Config,
    domain::models::activity::ActivityPolicy,
    domain::models::job::NotificationJob,
    domain::models::session::Session,
    domain::ports::{AccessControl, EligibilityService, NotificationService},
    domain::services::booking::BookingService,
    domain::services::checkin::CheckinService,
    domain::services::waitlist::WaitlistService,
    error::AppError,
    infra::repositories::{
        sqlite_activity_repo::SqliteActivityRepo, sqlite_booking_repo::SqliteBookingRepo,
        sqlite_checkin_repo::SqliteCheckinRepo, sqlite_job_repo::SqliteJobRepo,
        sqlite_policy_repo::SqlitePolicyRepo, sqlite_room_repo::SqliteRoomRepo,
        sqlite_rule_repo::SqliteRuleRepo, sqlite_session_repo::SqliteSessionRepo,
        sqlite_settings_repo::SqliteSettingsRepo, sqlite_waitlist_repo::SqliteWaitlistRepo,
    },
    state::AppState,
};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

pub struct MockNotifyService;

#[async_trait]
impl NotificationService for MockNotifyService {
    async fn send(&self, _job: &NotificationJob) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct MockEligibilityService {
    pub vip_clients: HashSet<String>,
    pub entitled: bool,
}

#[async_trait]
impl EligibilityService for MockEligibilityService {
    async fn entitlement_check(&self, _client_id: &str, _session: &Session) -> Result<bool, AppError> {
        Ok(self.entitled)
    }

    async fn is_vip(&self, client_id: &str, _policy: Option<&ActivityPolicy>) -> Result<bool, AppError> {
        Ok(self.vip_clients.contains(client_id))
    }
}

pub struct AllowAllAccess;

#[async_trait]
impl AccessControl for AllowAllAccess {
    async fn resolve_gym_permission(&self, _actor: &str, _gym_id: &str, _permission: &str) -> Result<bool, AppError> {
        Ok(true)
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_eligibility(&[], true).await
    }

    pub async fn with_vips(vip_clients: &[&str]) -> Self {
        Self::with_eligibility(vip_clients, true).await
    }

    pub async fn without_entitlement() -> Self {
        Self::with_eligibility(&[], false).await
    }

    async fn with_eligibility(vip_clients: &[&str], entitled: bool) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            qr_secret_key: "integration-test-secret".to_string(),
            notify_service_url: "http://localhost".to_string(),
            notify_service_token: "token".to_string(),
            membership_service_url: None,
            membership_service_token: "token".to_string(),
            access_control_url: None,
        };

        let eligibility = Arc::new(MockEligibilityService {
            vip_clients: vip_clients.iter().map(|c| c.to_string()).collect(),
            entitled,
        });

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

        let state = Arc::new(AppState {
            config,
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
            notify_service: Arc::new(MockNotifyService),
            eligibility,
            access_control: Arc::new(AllowAllAccess),
            booking_service,
            waitlist_service,
            checkin_service,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> axum::response::Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-Actor-Id", "staff-1");
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> axum::response::Response {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> axum::response::Response {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> axum::response::Response {
        self.request("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> axum::response::Response {
        self.request("DELETE", uri, None).await
    }

    /// Creates a policy from defaults merged with `overrides`, returns its id.
    pub async fn create_policy(&self, gym: &str, overrides: Value) -> String {
        let mut payload = serde_json::json!({
            "name": "standard",
            "cancellation_window_hours": 12,
            "waitlist_enabled": true,
            "waitlist_mode": "AUTO_PROMOTE",
        });
        merge(&mut payload, overrides);
        let res = self.post(&format!("/api/v1/{gym}/policies"), payload).await;
        assert!(res.status().is_success(), "create_policy failed: {}", res.status());
        parse_body(res).await["id"].as_str().unwrap().to_string()
    }

    pub async fn create_activity(&self, gym: &str, policy_id: Option<&str>, overrides: Value) -> String {
        let mut payload = serde_json::json!({
            "name": "Yoga",
            "base_capacity": 10,
            "duration_min": 60,
            "policy_id": policy_id,
        });
        merge(&mut payload, overrides);
        let res = self.post(&format!("/api/v1/{gym}/activities"), payload).await;
        assert!(res.status().is_success(), "create_activity failed: {}", res.status());
        parse_body(res).await["id"].as_str().unwrap().to_string()
    }

    /// Creates a single session starting at `start` (UTC gym timezone),
    /// returns the session JSON.
    pub async fn create_session_at(
        &self,
        gym: &str,
        activity_id: &str,
        start: DateTime<Utc>,
        max_capacity: i32,
    ) -> Value {
        let payload = serde_json::json!({
            "activity_id": activity_id,
            "date": start.format("%Y-%m-%d").to_string(),
            "start_time": start.format("%H:%M").to_string(),
            "max_capacity": max_capacity,
        });
        let res = self.post(&format!("/api/v1/{gym}/sessions"), payload).await;
        assert!(res.status().is_success(), "create_session failed: {}", res.status());
        parse_body(res).await
    }

    pub async fn add_attendee(&self, gym: &str, session_id: &str, client_id: &str) -> axum::response::Response {
        self.post(
            &format!("/api/v1/{gym}/sessions/{session_id}/attendees"),
            serde_json::json!({ "client_id": client_id }),
        )
        .await
    }

    pub async fn join_waitlist(&self, gym: &str, session_id: &str, client_id: &str) -> axum::response::Response {
        self.post(
            &format!("/api/v1/{gym}/sessions/{session_id}/waitlist"),
            serde_json::json!({ "client_id": client_id }),
        )
        .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn merge(base: &mut Value, overrides: Value) {
    if let (Value::Object(base_map), Value::Object(override_map)) = (base, overrides) {
        for (key, value) in override_map {
            base_map.insert(key, value);
        }
    }
}
