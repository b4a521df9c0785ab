use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Why a token was rejected. Surfaced to logs only; callers collapse all
/// variants into a generic "invalid QR" response.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    InvalidFormat,
    SessionMismatch,
    Expired,
    InvalidSignature,
}

/// Rounds a unix timestamp down to the nearest rotation boundary so the
/// displayed QR changes predictably every `refresh_seconds`.
pub fn rounded_timestamp(now: i64, refresh_seconds: i64) -> i64 {
    let step = refresh_seconds.max(1);
    now.div_euclid(step) * step
}

/// Token wire format: `"{session_seq}:{timestamp}:{signature}"` where the
/// signature is the first 32 hex chars of HMAC-SHA256 over
/// `"{session_seq}:{timestamp}"`.
pub fn generate_token(secret: &str, session_seq: i64, timestamp: i64) -> String {
    let message = format!("{session_seq}:{timestamp}");
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    let digest = mac.finalize().into_bytes();
    let signature = &hex::encode(digest)[..32];
    format!("{session_seq}:{timestamp}:{signature}")
}

pub fn verify_token(
    secret: &str,
    token: &str,
    expected_seq: i64,
    max_age_seconds: i64,
    now: i64,
) -> Result<(), TokenError> {
    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() != 3 {
        return Err(TokenError::InvalidFormat);
    }

    let token_seq: i64 = parts[0].parse().map_err(|_| TokenError::InvalidFormat)?;
    let token_ts: i64 = parts[1].parse().map_err(|_| TokenError::InvalidFormat)?;

    if token_seq != expected_seq {
        return Err(TokenError::SessionMismatch);
    }
    if now - token_ts > max_age_seconds {
        return Err(TokenError::Expired);
    }

    let expected = generate_token(secret, expected_seq, token_ts);
    if bool::from(expected.as_bytes().ct_eq(token.as_bytes())) {
        Ok(())
    } else {
        Err(TokenError::InvalidSignature)
    }
}

/// Extracts the session sequence from an unverified token, for looking up
/// which session to verify against.
pub fn peek_session_seq(token: &str) -> Result<i64, TokenError> {
    let mut parts = token.split(':');
    parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or(TokenError::InvalidFormat)
}
