use crate::domain::models::activity::ActivityPolicy;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Outcome of evaluating a cancellation against the activity's policy
/// window. Penalty enforcement (fee, strike, credit forfeit) is the
/// billing/loyalty collaborator's job; this only classifies.
#[derive(Debug, Serialize, Clone)]
pub struct CancellationAssessment {
    /// "EARLY" or "LATE"
    pub kind: String,
    pub can_cancel_free: bool,
    pub hours_until_start: f64,
    pub window_hours: i32,
    pub deadline: Option<DateTime<Utc>>,
    pub penalty: Option<PenaltyInfo>,
}

#[derive(Debug, Serialize, Clone)]
pub struct PenaltyInfo {
    pub penalty_type: String,
    pub description: String,
}

pub fn evaluate(
    session_start: DateTime<Utc>,
    policy: Option<&ActivityPolicy>,
    now: DateTime<Utc>,
) -> CancellationAssessment {
    let hours_until_start = (session_start - now).num_seconds() as f64 / 3600.0;

    let Some(policy) = policy else {
        // No policy configured: cancellation is always free.
        return CancellationAssessment {
            kind: "EARLY".to_string(),
            can_cancel_free: true,
            hours_until_start,
            window_hours: 0,
            deadline: None,
            penalty: None,
        };
    };

    let window_hours = policy.cancellation_window_hours;
    let can_cancel_free = hours_until_start > window_hours as f64;
    let deadline = session_start - Duration::hours(window_hours as i64);

    CancellationAssessment {
        kind: if can_cancel_free { "EARLY" } else { "LATE" }.to_string(),
        can_cancel_free,
        hours_until_start,
        window_hours,
        deadline: Some(deadline),
        penalty: if can_cancel_free { None } else { Some(penalty_info(policy)) },
    }
}

fn penalty_info(policy: &ActivityPolicy) -> PenaltyInfo {
    let description = match policy.penalty_type.as_str() {
        "STRIKE" => "A strike will be recorded",
        "FEE" => "A late-cancellation fee will be charged",
        _ => "The class credit is forfeited",
    };
    PenaltyInfo {
        penalty_type: policy.penalty_type.clone(),
        description: description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::activity::{ActivityPolicy, NewPolicyParams};

    fn policy(window_hours: i32) -> ActivityPolicy {
        ActivityPolicy::new(NewPolicyParams {
            gym_id: "g1".to_string(),
            name: "standard".to_string(),
            cancellation_window_hours: Some(window_hours),
            penalty_type: Some("STRIKE".to_string()),
            waitlist_enabled: None,
            waitlist_mode: None,
            waitlist_limit: None,
            waitlist_claim_timeout_minutes: None,
            auto_promote_cutoff_hours: None,
            broadcast_count: None,
        })
    }

    #[test]
    fn outside_window_is_early() {
        let now = Utc::now();
        let result = evaluate(now + Duration::hours(20), Some(&policy(12)), now);
        assert_eq!(result.kind, "EARLY");
        assert!(result.can_cancel_free);
        assert!(result.penalty.is_none());
    }

    #[test]
    fn inside_window_is_late_with_penalty() {
        let now = Utc::now();
        let result = evaluate(now + Duration::hours(2), Some(&policy(12)), now);
        assert_eq!(result.kind, "LATE");
        assert!(!result.can_cancel_free);
        assert_eq!(result.penalty.as_ref().unwrap().penalty_type, "STRIKE");
    }

    #[test]
    fn exactly_at_window_boundary_is_late() {
        let now = Utc::now();
        let result = evaluate(now + Duration::hours(12), Some(&policy(12)), now);
        assert!(!result.can_cancel_free);
    }

    #[test]
    fn no_policy_means_always_free() {
        let now = Utc::now();
        let result = evaluate(now + Duration::minutes(5), None, now);
        assert_eq!(result.kind, "EARLY");
        assert!(result.can_cancel_free);
        assert!(result.penalty.is_none());
    }
}
