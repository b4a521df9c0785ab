use axum::{
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use std::collections::HashMap;
use std::sync::Arc;

/// Gym scoping comes from the path on every route; gyms themselves live in
/// an external registry, so there is nothing to look up here.
pub struct GymId(pub String);

impl FromRequestParts<Arc<AppState>> for GymId {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let params: Path<HashMap<String, String>> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        let gym_id = params.get("gym_id").ok_or(StatusCode::BAD_REQUEST)?;
        Ok(GymId(gym_id.clone()))
    }
}
