pub mod booking;
pub mod cancellation;
pub mod checkin;
pub mod qr_token;
pub mod schedule;
pub mod spots;
pub mod waitlist;
