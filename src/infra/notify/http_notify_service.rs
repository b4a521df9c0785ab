use crate::domain::models::job::NotificationJob;
use crate::domain::ports::NotificationService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

/// Pushes class events (booked, promoted, spot available) to the external
/// notification gateway. Delivery is fire-and-forget from the domain's
/// point of view: the background worker records failures on the job row
/// and moves on.
pub struct HttpNotifyService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpNotifyService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct NotifyPayload {
    gym_id: String,
    client_id: String,
    session_id: String,
    event_type: String,
}

#[async_trait]
impl NotificationService for HttpNotifyService {
    async fn send(&self, job: &NotificationJob) -> Result<(), AppError> {
        let payload = NotifyPayload {
            gym_id: job.gym_id.clone(),
            client_id: job.client_id.clone(),
            session_id: job.session_id.clone(),
            event_type: job.event_type.clone(),
        };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Notification service connection error: {}", e);
                AppError::Internal
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            error!("Notification service failed. Status: {}, Body: {}", status, text);
            return Err(AppError::Internal);
        }

        Ok(())
    }
}
