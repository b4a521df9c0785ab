pub mod activity;
pub mod booking;
pub mod checkin;
pub mod job;
pub mod room;
pub mod schedule;
pub mod session;
pub mod waitlist;
