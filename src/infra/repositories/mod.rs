pub mod sqlite_activity_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_checkin_repo;
pub mod sqlite_job_repo;
pub mod sqlite_policy_repo;
pub mod sqlite_room_repo;
pub mod sqlite_rule_repo;
pub mod sqlite_session_repo;
pub mod sqlite_settings_repo;
pub mod sqlite_waitlist_repo;
