use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use std::sync::Arc;

/// The staff user performing a mutating call, taken from the gateway's
/// `X-Actor-Id` header. Authentication itself happens upstream; this core
/// only needs an identity to resolve gym permissions against.
pub struct Actor(pub String);

impl FromRequestParts<Arc<AppState>> for Actor {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get("X-Actor-Id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or(StatusCode::UNAUTHORIZED)?;
        Ok(Actor(actor.to_string()))
    }
}
