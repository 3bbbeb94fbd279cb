use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{NewMatch, MAX_MATCH_PLAYERS, MIN_MATCH_PLAYERS};

/// Reasons a new match is refused before it reaches the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchRuleError {
    #[error("Max players must be between {min} and {max}, got {requested}")]
    PlayerLimitOutOfRange { requested: u16, min: u16, max: u16 },

    #[error("Cannot create a match in the past")]
    ScheduledInPast,
}

impl MatchRuleError {
    /// Machine-readable error code for responses
    pub fn code(&self) -> &'static str {
        match self {
            MatchRuleError::PlayerLimitOutOfRange { .. } => "invalid_max_players",
            MatchRuleError::ScheduledInPast => "match_in_past",
        }
    }
}

/// Check roster size and kickoff time of a match about to be created
pub fn check_new_match(new_match: &NewMatch, now: DateTime<Utc>) -> Result<(), MatchRuleError> {
    if !(MIN_MATCH_PLAYERS..=MAX_MATCH_PLAYERS).contains(&new_match.max_players) {
        return Err(MatchRuleError::PlayerLimitOutOfRange {
            requested: new_match.max_players,
            min: MIN_MATCH_PLAYERS,
            max: MAX_MATCH_PLAYERS,
        });
    }

    if new_match.scheduled_at < now {
        return Err(MatchRuleError::ScheduledInPast);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchType, SkillLevel};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn new_match(max_players: u16, scheduled_at: DateTime<Utc>) -> NewMatch {
        NewMatch {
            created_by: "u1".to_string(),
            field_id: "lubetkin".to_string(),
            scheduled_at,
            max_players,
            skill_level: SkillLevel::Intermediate,
            match_type: MatchType::Casual,
            is_public: true,
            duration_minutes: None,
        }
    }

    #[test]
    fn test_player_limit_bounds() {
        let later = now() + Duration::hours(2);

        assert!(check_new_match(&new_match(6, later), now()).is_ok());
        assert!(check_new_match(&new_match(22, later), now()).is_ok());

        let err = check_new_match(&new_match(5, later), now()).unwrap_err();
        assert_eq!(err.code(), "invalid_max_players");
        assert!(check_new_match(&new_match(23, later), now()).is_err());
    }

    #[test]
    fn test_past_kickoff_is_refused() {
        let err = check_new_match(&new_match(14, now() - Duration::minutes(1)), now()).unwrap_err();

        assert_eq!(err, MatchRuleError::ScheduledInPast);
        assert_eq!(err.code(), "match_in_past");
    }

    #[test]
    fn test_kickoff_right_now_is_allowed() {
        assert!(check_new_match(&new_match(14, now()), now()).is_ok());
    }
}
