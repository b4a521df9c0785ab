use crate::state::AppState;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};

/// Background loop: delivers queued notifications and sweeps lapsed
/// waitlist claim windows. Expiry is already enforced lazily on claim and
/// promote; the sweep keeps the queue state consistent for display and
/// re-runs promotion for sessions whose offer went unclaimed.
pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting background worker...");

    loop {
        drain_notification_jobs(&state).await;
        sweep_expired_claims(&state).await;
        sleep(Duration::from_secs(5)).await;
    }
}

async fn drain_notification_jobs(state: &Arc<AppState>) {
    let jobs = match state.job_repo.find_pending(10).await {
        Ok(jobs) => jobs,
        Err(e) => {
            error!("Failed to fetch pending notification jobs: {:?}", e);
            return;
        }
    };

    for job in jobs {
        let span = info_span!(
            "notification_job",
            job_id = %job.id,
            event_type = %job.event_type,
            gym_id = %job.gym_id
        );

        async {
            match state.notify_service.send(&job).await {
                Ok(_) => {
                    info!("Notification delivered");
                    if let Err(e) = state.job_repo.update_status(&job.id, "SENT", None).await {
                        error!("Failed to mark job as sent: {:?}", e);
                    }
                }
                Err(e) => {
                    let err_msg = format!("{}", e);
                    error!("Notification delivery failed: {}", err_msg);
                    if let Err(up_err) = state.job_repo.update_status(&job.id, "FAILED", Some(err_msg)).await {
                        error!("Failed to mark job as failed: {:?}", up_err);
                    }
                }
            }
        }
        .instrument(span)
        .await;
    }
}

async fn sweep_expired_claims(state: &Arc<AppState>) {
    let now = Utc::now();
    let lapsed = match state.waitlist_repo.lapsed_entries(now).await {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to fetch lapsed waitlist entries: {:?}", e);
            return;
        }
    };
    if lapsed.is_empty() {
        return;
    }

    let mut touched: HashSet<(String, String)> = HashSet::new();
    for entry in lapsed {
        if let Err(e) = state.waitlist_repo.mark_expired(&entry.id).await {
            error!("Failed to expire waitlist entry {}: {:?}", entry.id, e);
            continue;
        }
        info!("Expired unclaimed waitlist entry {} on session {}", entry.id, entry.session_id);
        touched.insert((entry.gym_id, entry.session_id));
    }

    // An unclaimed offer means the slot is still free: run promotion again.
    for (gym_id, session_id) in touched {
        let session = match state.session_repo.find_by_id(&gym_id, &session_id).await {
            Ok(Some(session)) => session,
            Ok(None) => continue,
            Err(e) => {
                error!("Failed to load session {} for re-promotion: {:?}", session_id, e);
                continue;
            }
        };
        let policy = match load_policy(state, &session.gym_id, &session.activity_id).await {
            Ok(policy) => policy,
            Err(e) => {
                error!("Failed to load policy for session {}: {:?}", session_id, e);
                continue;
            }
        };
        if let Err(e) = state.waitlist_service.promote(&session, policy.as_ref(), None, now).await {
            error!("Re-promotion on session {} failed: {:?}", session_id, e);
        }
    }
}

async fn load_policy(
    state: &Arc<AppState>,
    gym_id: &str,
    activity_id: &str,
) -> Result<Option<crate::domain::models::activity::ActivityPolicy>, crate::error::AppError> {
    let Some(activity) = state.activity_repo.find_by_id(gym_id, activity_id).await? else {
        return Ok(None);
    };
    match activity.policy_id {
        Some(policy_id) => state.policy_repo.find_by_id(gym_id, &policy_id).await,
        None => Ok(None),
    }
}
