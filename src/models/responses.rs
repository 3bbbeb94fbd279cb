use serde::{Deserialize, Serialize};

use crate::models::domain::{CandidateMatch, SkillLevel, Team};

/// A scored match, shaped for direct display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementView {
    #[serde(rename = "matchId")]
    pub match_id: String,
    #[serde(rename = "fieldId")]
    pub field_id: Option<String>,
    #[serde(rename = "fieldName")]
    pub field_name: String,
    #[serde(rename = "scheduledAt")]
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub time: String,
    pub role: String,
    pub occupancy: String,
    #[serde(rename = "currentPlayers")]
    pub current_players: u16,
    #[serde(rename = "maxPlayers")]
    pub max_players: u16,
    #[serde(rename = "skillLevel")]
    pub skill_level: Option<SkillLevel>,
    #[serde(rename = "fairnessScore")]
    pub fairness_score: Option<f64>,
    pub score: u8,
    #[serde(rename = "scorePercent")]
    pub score_percent: String,
    #[serde(rename = "positionLikelyOpen")]
    pub position_likely_open: bool,
}

/// Response for the find placement endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlacementResponse {
    Placed {
        recommended: PlacementView,
        alternatives: Vec<PlacementView>,
        #[serde(rename = "totalCandidates")]
        total_candidates: usize,
    },
    NoMatchesAvailable {
        #[serde(rename = "totalCandidates")]
        total_candidates: usize,
    },
}

/// Response for the join match endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinMatchResponse {
    pub success: bool,
    #[serde(rename = "matchId")]
    pub match_id: String,
    #[serde(rename = "openSlots")]
    pub open_slots: u16,
}

/// A match with its team rosters, shaped for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDetailsResponse {
    #[serde(rename = "match")]
    pub candidate: CandidateMatch,
    #[serde(rename = "fieldName")]
    pub field_name: String,
    pub time: String,
    pub occupancy: String,
    #[serde(rename = "rosteredPlayers")]
    pub rostered_players: u16,
    pub teams: Vec<Team>,
}

/// Response for the leave team endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveTeamResponse {
    pub success: bool,
    #[serde(rename = "teamId")]
    pub team_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            status_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matches_is_tagged() {
        let response = PlacementResponse::NoMatchesAvailable { total_candidates: 0 };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "no_matches_available");
        assert_eq!(json["totalCandidates"], 0);
        assert!(json.get("recommended").is_none());
    }
}
