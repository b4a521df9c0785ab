use crate::domain::models::activity::ActivityPolicy;
use crate::domain::models::session::Session;
use crate::domain::ports::{AccessControl, EligibilityService};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::error;

#[derive(Deserialize)]
struct BoolAnswer {
    allowed: bool,
}

/// Membership/loyalty lookups against the external membership service.
pub struct HttpEligibilityService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpEligibilityService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self { client: Client::new(), api_url, api_key }
    }

    async fn ask(&self, path: &str, body: serde_json::Value) -> Result<bool, AppError> {
        let res = self.client.post(format!("{}/{}", self.api_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Membership service connection error: {}", e);
                AppError::Internal
            })?;

        if !res.status().is_success() {
            error!("Membership service failed. Status: {}", res.status());
            return Err(AppError::Internal);
        }

        let answer: BoolAnswer = res.json().await.map_err(|e| {
            error!("Membership service returned malformed body: {}", e);
            AppError::Internal
        })?;
        Ok(answer.allowed)
    }
}

#[async_trait]
impl EligibilityService for HttpEligibilityService {
    async fn entitlement_check(&self, client_id: &str, session: &Session) -> Result<bool, AppError> {
        self.ask(
            "entitlement",
            serde_json::json!({
                "client_id": client_id,
                "gym_id": session.gym_id,
                "activity_id": session.activity_id,
                "session_id": session.id,
            }),
        )
        .await
    }

    async fn is_vip(&self, client_id: &str, policy: Option<&ActivityPolicy>) -> Result<bool, AppError> {
        self.ask(
            "vip",
            serde_json::json!({
                "client_id": client_id,
                "policy_id": policy.map(|p| p.id.clone()),
            }),
        )
        .await
    }
}

/// Standalone fallback when no membership service is configured: everyone
/// is entitled, nobody has VIP priority.
pub struct OpenEligibilityService;

#[async_trait]
impl EligibilityService for OpenEligibilityService {
    async fn entitlement_check(&self, _client_id: &str, _session: &Session) -> Result<bool, AppError> {
        Ok(true)
    }

    async fn is_vip(&self, _client_id: &str, _policy: Option<&ActivityPolicy>) -> Result<bool, AppError> {
        Ok(false)
    }
}

/// Gym permissions resolved by the external access-control service.
pub struct HttpAccessControl {
    client: Client,
    api_url: String,
}

impl HttpAccessControl {
    pub fn new(api_url: String) -> Self {
        Self { client: Client::new(), api_url }
    }
}

#[async_trait]
impl AccessControl for HttpAccessControl {
    async fn resolve_gym_permission(&self, actor: &str, gym_id: &str, permission: &str) -> Result<bool, AppError> {
        let res = self.client.post(&self.api_url)
            .json(&serde_json::json!({
                "actor": actor,
                "gym_id": gym_id,
                "permission": permission,
            }))
            .send()
            .await
            .map_err(|e| {
                error!("Access control connection error: {}", e);
                AppError::Internal
            })?;

        if !res.status().is_success() {
            error!("Access control failed. Status: {}", res.status());
            return Err(AppError::Internal);
        }

        let answer: BoolAnswer = res.json().await.map_err(|_| AppError::Internal)?;
        Ok(answer.allowed)
    }
}

/// Used when no access-control service is configured (dev, tests).
pub struct AllowAllAccessControl;

#[async_trait]
impl AccessControl for AllowAllAccessControl {
    async fn resolve_gym_permission(&self, _actor: &str, _gym_id: &str, _permission: &str) -> Result<bool, AppError> {
        Ok(true)
    }
}
