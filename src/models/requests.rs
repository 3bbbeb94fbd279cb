use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{
    AvailabilityStatus, MatchType, NewMatch, SkillLevel, TimeSlot, DEFAULT_MAX_PLAYERS,
};

/// Request to find a placement
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindPlacementRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub limit: Option<u16>,
    #[serde(default)]
    #[serde(alias = "exclude_match_ids", rename = "excludeMatchIds")]
    pub exclude_match_ids: Vec<String>,
}

/// Request to join a match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JoinMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Request to set today's availability
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetAvailabilityRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(alias = "time_slot", rename = "timeSlot")]
    pub time_slot: TimeSlot,
    #[serde(default = "default_status")]
    pub status: AvailabilityStatus,
}

fn default_status() -> AvailabilityStatus {
    AvailabilityStatus::Looking
}

/// Request to create a match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "field_id", rename = "fieldId")]
    pub field_id: String,
    #[serde(alias = "scheduled_at", rename = "scheduledAt")]
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    #[serde(alias = "max_players", rename = "maxPlayers", default = "default_max_players")]
    pub max_players: u16,
    #[serde(alias = "skill_level", rename = "skillLevel", default = "default_skill_level")]
    pub skill_level: SkillLevel,
    #[serde(alias = "match_type", rename = "matchType", default = "default_match_type")]
    pub match_type: MatchType,
    #[serde(alias = "is_public", rename = "isPublic", default = "default_true")]
    pub is_public: bool,
    #[serde(alias = "duration_minutes", rename = "durationMinutes", default)]
    pub duration_minutes: Option<u16>,
}

fn default_max_players() -> u16 {
    DEFAULT_MAX_PLAYERS
}

fn default_skill_level() -> SkillLevel {
    SkillLevel::Intermediate
}

fn default_match_type() -> MatchType {
    MatchType::Casual
}

fn default_true() -> bool {
    true
}

impl From<CreateMatchRequest> for NewMatch {
    fn from(req: CreateMatchRequest) -> Self {
        NewMatch {
            created_by: req.user_id,
            field_id: req.field_id,
            scheduled_at: req.scheduled_at,
            max_players: req.max_players,
            skill_level: req.skill_level,
            match_type: req.match_type,
            is_public: req.is_public,
            duration_minutes: req.duration_minutes,
        }
    }
}

/// Query string carrying a user id
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub limit: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_request_accepts_snake_case_alias() {
        let req: FindPlacementRequest =
            serde_json::from_str(r#"{"user_id":"u1","exclude_match_ids":["m1"]}"#).unwrap();
        assert_eq!(req.user_id, "u1");
        assert_eq!(req.exclude_match_ids, vec!["m1"]);
        assert!(req.limit.is_none());
    }

    #[test]
    fn test_empty_user_id_fails_validation() {
        let req: FindPlacementRequest = serde_json::from_str(r#"{"userId":""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_availability_status_defaults_to_looking() {
        let req: SetAvailabilityRequest =
            serde_json::from_str(r#"{"userId":"u1","timeSlot":"night"}"#).unwrap();
        assert_eq!(req.time_slot, TimeSlot::Night);
        assert_eq!(req.status, AvailabilityStatus::Looking);
    }

    #[test]
    fn test_create_match_defaults() {
        let req: CreateMatchRequest = serde_json::from_str(
            r#"{"userId":"u1","fieldId":"lubetkin","scheduledAt":"2026-10-17T22:30:00Z"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());

        let new_match = NewMatch::from(req);
        assert_eq!(new_match.created_by, "u1");
        assert_eq!(new_match.max_players, 14);
        assert_eq!(new_match.skill_level, SkillLevel::Intermediate);
        assert_eq!(new_match.match_type, MatchType::Casual);
        assert!(new_match.is_public);
    }
}
