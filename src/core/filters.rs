use chrono::{DateTime, Utc};

use crate::models::CandidateMatch;

/// Check if a candidate can still be offered to the player
///
/// The backend query already asks for public, upcoming matches; this
/// re-checks against the caller's clock since candidate lists may be served
/// from cache. Full matches stay eligible and simply score no slot points.
#[inline]
pub fn is_eligible(
    candidate: &CandidateMatch,
    now: DateTime<Utc>,
    excluded_match_ids: &[String],
) -> bool {
    if !candidate.is_public {
        return false;
    }

    if candidate.scheduled_at < now {
        return false;
    }

    !excluded_match_ids.contains(&candidate.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn create_candidate(id: &str, scheduled_at: DateTime<Utc>, is_public: bool) -> CandidateMatch {
        CandidateMatch {
            id: id.to_string(),
            scheduled_at,
            field_id: None,
            field_name: None,
            skill_level: None,
            max_players: 14,
            current_players: 14,
            fairness_score: None,
            is_public,
            match_type: None,
            duration_minutes: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_upcoming_public_match_is_eligible() {
        let candidate = create_candidate("m1", now() + Duration::hours(3), true);
        assert!(is_eligible(&candidate, now(), &[]));
    }

    #[test]
    fn test_full_match_stays_eligible() {
        let candidate = create_candidate("m1", now() + Duration::hours(3), true);
        assert!(candidate.is_full());
        assert!(is_eligible(&candidate, now(), &[]));
    }

    #[test]
    fn test_private_match_filtered() {
        let candidate = create_candidate("m1", now() + Duration::hours(3), false);
        assert!(!is_eligible(&candidate, now(), &[]));
    }

    #[test]
    fn test_started_match_filtered() {
        let candidate = create_candidate("m1", now() - Duration::minutes(1), true);
        assert!(!is_eligible(&candidate, now(), &[]));

        let starting_now = create_candidate("m2", now(), true);
        assert!(is_eligible(&starting_now, now(), &[]));
    }

    #[test]
    fn test_excluded_match_filtered() {
        let candidate = create_candidate("m1", now() + Duration::hours(3), true);
        assert!(!is_eligible(&candidate, now(), &["m1".to_string()]));
    }
}
