use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Server-side secret keying the HMAC over QR check-in tokens.
    pub qr_secret_key: String,
    pub notify_service_url: String,
    pub notify_service_token: String,
    /// Membership/loyalty service answering entitlement and VIP lookups.
    /// Unset = standalone mode (everyone entitled, nobody VIP).
    pub membership_service_url: Option<String>,
    pub membership_service_token: String,
    /// Access-control service resolving gym permissions. Unset = allow all.
    pub access_control_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            qr_secret_key: env::var("QR_SECRET_KEY").expect("QR_SECRET_KEY must be set"),
            notify_service_url: env::var("NOTIFY_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/notify".to_string()),
            notify_service_token: env::var("NOTIFY_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            membership_service_url: env::var("MEMBERSHIP_SERVICE_URL").ok(),
            membership_service_token: env::var("MEMBERSHIP_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            access_control_url: env::var("ACCESS_CONTROL_URL").ok(),
        }
    }
}
