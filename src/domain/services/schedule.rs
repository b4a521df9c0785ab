use crate::domain::models::schedule::{ScheduleRule, ScheduleSettings};
use crate::domain::models::session::Session;
use crate::error::AppError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// A day the generator wants to place a session on, before conflict checks.
pub struct CandidateSlot {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub room_id: Option<String>,
    pub staff_id: Option<String>,
}

/// What a candidate collided with. `kind` is one of ROOM_OVERLAP,
/// STAFF_OVERLAP, MIN_BREAK.
#[derive(Debug, Serialize, Clone)]
pub struct ScheduleConflict {
    pub kind: String,
    pub date: NaiveDate,
    pub session_id: String,
    pub message: String,
}

pub fn parse_hhmm(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid time format (HH:MM): {value}")))
}

/// Combines a calendar date with a wall-clock time in the gym's timezone.
/// Ambiguous or skipped local times (DST transitions) are rejected.
pub fn local_datetime(date: NaiveDate, time: NaiveTime, tz: &Tz) -> Result<DateTime<Utc>, AppError> {
    tz.from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::Validation(format!("Invalid local time (ambiguous or skipped due to DST): {date} {time}")))
}

/// Calendar days in [from, until] matching the rule's weekday, ascending,
/// clamped to the rule's own active range.
pub fn rule_dates(rule: &ScheduleRule, from: NaiveDate, until: NaiveDate) -> Vec<NaiveDate> {
    let lower = from.max(rule.start_date);
    let upper = match rule.end_date {
        Some(end) => until.min(end),
        None => until,
    };

    let mut dates = Vec::new();
    let mut current = lower;
    while current <= upper {
        if current.weekday().num_days_from_monday() as i32 == rule.day_of_week {
            dates.push(current);
        }
        current += Duration::days(1);
    }
    dates
}

/// Applies the same overlap rules a single-session creation goes through.
/// `existing` must hold the sessions that could collide (same gym, same
/// time window); cancelled sessions never conflict. Checks run in a fixed
/// order (room, staff, break) so batch generation stops deterministically.
pub fn find_conflict(
    candidate: &CandidateSlot,
    existing: &[Session],
    settings: &ScheduleSettings,
) -> Option<ScheduleConflict> {
    let date = candidate.start_at.date_naive();

    if !settings.allow_room_overlaps
        && let Some(room_id) = &candidate.room_id
    {
        for session in existing {
            if session.status != "CANCELLED"
                && session.room_id.as_deref() == Some(room_id)
                && overlaps(candidate, session)
            {
                return Some(ScheduleConflict {
                    kind: "ROOM_OVERLAP".to_string(),
                    date,
                    session_id: session.id.clone(),
                    message: format!("Room is occupied from {} to {}", session.start_at, session.end_at),
                });
            }
        }
    }

    if !settings.allow_staff_overlaps
        && let Some(staff_id) = &candidate.staff_id
    {
        for session in existing {
            if session.status != "CANCELLED"
                && session.staff_id.as_deref() == Some(staff_id)
                && overlaps(candidate, session)
            {
                return Some(ScheduleConflict {
                    kind: "STAFF_OVERLAP".to_string(),
                    date,
                    session_id: session.id.clone(),
                    message: format!("Instructor already teaches from {} to {}", session.start_at, session.end_at),
                });
            }
        }
    }

    if settings.min_break_minutes > 0
        && let Some(staff_id) = &candidate.staff_id
    {
        let min_break = Duration::minutes(settings.min_break_minutes as i64);
        for session in existing {
            if session.status == "CANCELLED" || session.staff_id.as_deref() != Some(staff_id) {
                continue;
            }
            let gap = if session.end_at <= candidate.start_at {
                candidate.start_at - session.end_at
            } else if candidate.end_at <= session.start_at {
                session.start_at - candidate.end_at
            } else {
                continue; // true overlap, handled above when enabled
            };
            if gap < min_break {
                return Some(ScheduleConflict {
                    kind: "MIN_BREAK".to_string(),
                    date,
                    session_id: session.id.clone(),
                    message: format!(
                        "Only {} min between classes, {} required",
                        gap.num_minutes(),
                        settings.min_break_minutes
                    ),
                });
            }
        }
    }

    None
}

fn overlaps(candidate: &CandidateSlot, session: &Session) -> bool {
    candidate.start_at < session.end_at && candidate.end_at > session.start_at
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::schedule::{NewRuleParams, ScheduleRule};
    use crate::domain::models::session::{NewSessionParams, Session};

    fn rule(day_of_week: i32, start_date: NaiveDate, end_date: Option<NaiveDate>) -> ScheduleRule {
        ScheduleRule::new(NewRuleParams {
            gym_id: "g1".to_string(),
            activity_id: "a1".to_string(),
            room_id: None,
            staff_id: None,
            day_of_week,
            start_time: "10:00".to_string(),
            end_time: "11:00".to_string(),
            start_date,
            end_date,
        })
    }

    fn session(room: Option<&str>, staff: Option<&str>, start: DateTime<Utc>, end: DateTime<Utc>) -> Session {
        Session::new(NewSessionParams {
            gym_id: "g1".to_string(),
            activity_id: "a1".to_string(),
            rule_id: None,
            room_id: room.map(String::from),
            staff_id: staff.map(String::from),
            start_at: start,
            end_at: end,
            max_capacity: 10,
        })
    }

    fn candidate(room: Option<&str>, staff: Option<&str>, start: DateTime<Utc>, end: DateTime<Utc>) -> CandidateSlot {
        CandidateSlot {
            start_at: start,
            end_at: end,
            room_id: room.map(String::from),
            staff_id: staff.map(String::from),
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, h, m, 0).unwrap()
    }

    #[test]
    fn rule_dates_match_weekday_within_range() {
        // 2025-03-03 is a Monday
        let r = rule(0, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(), None);
        let dates = rule_dates(&r, r.start_date, NaiveDate::from_ymd_opt(2025, 3, 24).unwrap());
        assert_eq!(dates.len(), 4);
        assert!(dates.iter().all(|d| d.weekday().num_days_from_monday() == 0));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn rule_dates_clamp_to_rule_end_date() {
        let r = rule(
            0,
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()),
        );
        let dates = rule_dates(&r, r.start_date, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert_eq!(dates.len(), 2);
    }

    #[test]
    fn room_overlap_detected() {
        let settings = ScheduleSettings::defaults("g1");
        let existing = vec![session(Some("r1"), None, at(10, 30), at(11, 30))];
        let conflict = find_conflict(&candidate(Some("r1"), None, at(10, 0), at(11, 0)), &existing, &settings);
        assert_eq!(conflict.unwrap().kind, "ROOM_OVERLAP");
    }

    #[test]
    fn room_overlap_tolerated_when_allowed() {
        let mut settings = ScheduleSettings::defaults("g1");
        settings.allow_room_overlaps = true;
        let existing = vec![session(Some("r1"), None, at(10, 30), at(11, 30))];
        assert!(find_conflict(&candidate(Some("r1"), None, at(10, 0), at(11, 0)), &existing, &settings).is_none());
    }

    #[test]
    fn different_room_does_not_conflict() {
        let settings = ScheduleSettings::defaults("g1");
        let existing = vec![session(Some("r2"), None, at(10, 30), at(11, 30))];
        assert!(find_conflict(&candidate(Some("r1"), None, at(10, 0), at(11, 0)), &existing, &settings).is_none());
    }

    #[test]
    fn staff_overlap_detected() {
        let settings = ScheduleSettings::defaults("g1");
        let existing = vec![session(None, Some("s1"), at(10, 30), at(11, 30))];
        let conflict = find_conflict(&candidate(None, Some("s1"), at(10, 0), at(11, 0)), &existing, &settings);
        assert_eq!(conflict.unwrap().kind, "STAFF_OVERLAP");
    }

    #[test]
    fn back_to_back_without_required_break_is_rejected() {
        let mut settings = ScheduleSettings::defaults("g1");
        settings.min_break_minutes = 15;
        let existing = vec![session(None, Some("s1"), at(9, 0), at(10, 0))];
        let conflict = find_conflict(&candidate(None, Some("s1"), at(10, 10), at(11, 10)), &existing, &settings);
        assert_eq!(conflict.unwrap().kind, "MIN_BREAK");
    }

    #[test]
    fn sufficient_break_passes() {
        let mut settings = ScheduleSettings::defaults("g1");
        settings.min_break_minutes = 15;
        let existing = vec![session(None, Some("s1"), at(9, 0), at(10, 0))];
        assert!(find_conflict(&candidate(None, Some("s1"), at(10, 15), at(11, 15)), &existing, &settings).is_none());
    }

    #[test]
    fn cancelled_sessions_never_conflict() {
        let settings = ScheduleSettings::defaults("g1");
        let mut blocked = session(Some("r1"), None, at(10, 30), at(11, 30));
        blocked.status = "CANCELLED".to_string();
        assert!(find_conflict(&candidate(Some("r1"), None, at(10, 0), at(11, 0)), &[blocked], &settings).is_none());
    }
}
