use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default roster size when a match row has no `max_players`
pub const DEFAULT_MAX_PLAYERS: u16 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// Skill pairs that earn partial credit when they differ
    pub fn is_adjacent_to(self, other: SkillLevel) -> bool {
        matches!(
            (self, other),
            (SkillLevel::Beginner, SkillLevel::Intermediate)
                | (SkillLevel::Intermediate, SkillLevel::Beginner)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerPosition {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Casual,
    Competitive,
}

/// An upcoming, publicly joinable game as fetched from the backend.
///
/// Snapshots are never mutated after construction; a fresh list is fetched
/// for every placement search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub id: String,
    #[serde(rename = "scheduledAt")]
    pub scheduled_at: DateTime<Utc>,
    #[serde(rename = "fieldId", default)]
    pub field_id: Option<String>,
    #[serde(rename = "fieldName", default)]
    pub field_name: Option<String>,
    #[serde(rename = "skillLevel", default)]
    pub skill_level: Option<SkillLevel>,
    #[serde(rename = "maxPlayers", default = "default_max_players")]
    pub max_players: u16,
    #[serde(rename = "currentPlayers", default)]
    pub current_players: u16,
    #[serde(rename = "fairnessScore", default)]
    pub fairness_score: Option<f64>,
    #[serde(rename = "isPublic", default = "default_true")]
    pub is_public: bool,
    #[serde(rename = "matchType", default)]
    pub match_type: Option<MatchType>,
    #[serde(rename = "durationMinutes", default)]
    pub duration_minutes: Option<u16>,
}

impl CandidateMatch {
    /// Free roster slots; an over-full roster has none
    pub fn open_slots(&self) -> u16 {
        self.max_players.saturating_sub(self.current_players)
    }

    pub fn is_full(&self) -> bool {
        self.open_slots() == 0
    }
}

fn default_max_players() -> u16 {
    DEFAULT_MAX_PLAYERS
}

fn default_true() -> bool {
    true
}

/// The requesting player's inputs to scoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPreferences {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "skillLevel")]
    pub skill_level: SkillLevel,
    #[serde(rename = "preferredPosition")]
    pub preferred_position: PlayerPosition,
    #[serde(rename = "homeFieldId", default)]
    pub home_field_id: Option<String>,
}

/// Player profile row from the backend `profiles` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub skill_level: Option<SkillLevel>,
    #[serde(default)]
    pub preferred_position: Option<PlayerPosition>,
    #[serde(default)]
    pub home_field_id: Option<String>,
    #[serde(default)]
    pub games_played: Option<i32>,
    #[serde(default)]
    pub fair_play_rating: Option<f64>,
}

impl PlayerProfile {
    /// Scoring inputs, filling gaps left by an unfinished onboarding
    pub fn preferences(&self) -> PlayerPreferences {
        PlayerPreferences {
            user_id: self.id.clone(),
            skill_level: self.skill_level.unwrap_or(SkillLevel::Intermediate),
            preferred_position: self.preferred_position.unwrap_or(PlayerPosition::Midfielder),
            home_field_id: self.home_field_id.clone(),
        }
    }
}

/// Candidate match with its placement score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    #[serde(flatten)]
    pub candidate: CandidateMatch,
    pub score: u8,
    #[serde(rename = "positionLikelyOpen")]
    pub position_likely_open: bool,
}

/// Playing field from the backend `fields` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub capacity: Option<i32>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Looking,
    NotLooking,
}

/// A player's availability for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(rename = "timeSlot")]
    pub time_slot: TimeSlot,
    pub status: AvailabilityStatus,
}

/// Live counters shown on the home screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityStats {
    #[serde(rename = "playersLooking")]
    pub players_looking: u64,
    #[serde(rename = "communityMembers")]
    pub community_members: u64,
    #[serde(rename = "gamesToday")]
    pub games_today: u64,
}

/// Roster bounds accepted when creating a match
pub const MIN_MATCH_PLAYERS: u16 = 6;
pub const MAX_MATCH_PLAYERS: u16 = 22;

/// Name and color of the two teams every new match starts with
pub const DEFAULT_TEAMS: [(&str, &str); 2] = [("Team A", "#3B82F6"), ("Team B", "#0EEA4A")];

/// A match to be inserted into the backend
#[derive(Debug, Clone, PartialEq)]
pub struct NewMatch {
    pub created_by: String,
    pub field_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub max_players: u16,
    pub skill_level: SkillLevel,
    pub match_type: MatchType,
    pub is_public: bool,
    pub duration_minutes: Option<u16>,
}

/// One player on a team roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(rename = "assignedPosition", default)]
    pub assigned_position: Option<PlayerPosition>,
    #[serde(rename = "isCaptain", default)]
    pub is_captain: bool,
    #[serde(rename = "skillLevel", default)]
    pub skill_level: Option<SkillLevel>,
    #[serde(rename = "preferredPosition", default)]
    pub preferred_position: Option<PlayerPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    #[serde(rename = "matchId")]
    pub match_id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

/// A match together with its team rosters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    #[serde(rename = "match")]
    pub candidate: CandidateMatch,
    pub teams: Vec<Team>,
}

impl MatchDetails {
    /// Players placed on a team, which can lag behind the participant count
    pub fn rostered_players(&self) -> u16 {
        let total: usize = self.teams.iter().map(|t| t.members.len()).sum();
        u16::try_from(total).unwrap_or(u16::MAX)
    }

    /// Team the player is on, if any
    pub fn team_of(&self, user_id: &str) -> Option<&Team> {
        self.teams
            .iter()
            .find(|team| team.members.iter().any(|m| m.user_id == user_id))
    }
}

/// Upper bound of every placement score
pub const MAX_SCORE: u32 = 100;

/// Point weights and thresholds for match scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub skill_exact: u32,
    pub skill_adjacent: u32,
    pub open_slot: u32,
    pub fairness_high: u32,
    pub fairness_mid: u32,
    pub home_field: u32,
    /// Fairness must be strictly above this for `fairness_high`
    pub fairness_high_threshold: f64,
    /// Fairness must be strictly above this for `fairness_mid`
    pub fairness_mid_threshold: f64,
    pub min_open_slots: u16,
    pub max_score: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill_exact: 30,
            skill_adjacent: 15,
            open_slot: 40,
            fairness_high: 20,
            fairness_mid: 10,
            home_field: 10,
            fairness_high_threshold: 7.0,
            fairness_mid_threshold: 5.0,
            min_open_slots: 2,
            max_score: MAX_SCORE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_adjacency_is_symmetric() {
        assert!(SkillLevel::Beginner.is_adjacent_to(SkillLevel::Intermediate));
        assert!(SkillLevel::Intermediate.is_adjacent_to(SkillLevel::Beginner));
        assert!(!SkillLevel::Intermediate.is_adjacent_to(SkillLevel::Advanced));
        assert!(!SkillLevel::Advanced.is_adjacent_to(SkillLevel::Beginner));
        assert!(!SkillLevel::Advanced.is_adjacent_to(SkillLevel::Advanced));
    }

    #[test]
    fn test_candidate_defaults_from_sparse_json() {
        let json = r#"{"id":"m1","scheduledAt":"2026-10-17T19:30:00Z"}"#;
        let candidate: CandidateMatch = serde_json::from_str(json).unwrap();

        assert_eq!(candidate.max_players, DEFAULT_MAX_PLAYERS);
        assert_eq!(candidate.current_players, 0);
        assert!(candidate.is_public);
        assert!(candidate.fairness_score.is_none());
        assert!(candidate.skill_level.is_none());
    }

    #[test]
    fn test_open_slots_saturates() {
        let json = r#"{"id":"m1","scheduledAt":"2026-10-17T19:30:00Z","maxPlayers":10,"currentPlayers":12}"#;
        let candidate: CandidateMatch = serde_json::from_str(json).unwrap();

        assert_eq!(candidate.open_slots(), 0);
        assert!(candidate.is_full());
    }

    #[test]
    fn test_profile_preferences_fallbacks() {
        let profile = PlayerProfile {
            id: "u1".to_string(),
            full_name: None,
            skill_level: None,
            preferred_position: None,
            home_field_id: Some("lubetkin".to_string()),
            games_played: None,
            fair_play_rating: None,
        };

        let prefs = profile.preferences();
        assert_eq!(prefs.skill_level, SkillLevel::Intermediate);
        assert_eq!(prefs.preferred_position, PlayerPosition::Midfielder);
        assert_eq!(prefs.home_field_id.as_deref(), Some("lubetkin"));
    }

    #[test]
    fn test_availability_uses_camel_case_keys() {
        let availability = Availability {
            user_id: "u1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            time_slot: TimeSlot::Night,
            status: AvailabilityStatus::Looking,
        };

        let json = serde_json::to_value(&availability).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["timeSlot"], "night");
        assert_eq!(json["date"], "2026-10-16");
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_rostered_players_sums_team_members() {
        let member = |id: &str| TeamMember {
            user_id: id.to_string(),
            full_name: None,
            assigned_position: None,
            is_captain: false,
            skill_level: None,
            preferred_position: None,
        };
        let team = |id: &str, members: Vec<TeamMember>| Team {
            id: id.to_string(),
            match_id: "m1".to_string(),
            name: id.to_string(),
            color: None,
            members,
        };

        let details = MatchDetails {
            candidate: serde_json::from_str(r#"{"id":"m1","scheduledAt":"2026-10-17T19:30:00Z"}"#).unwrap(),
            teams: vec![team("a", vec![member("u1"), member("u2")]), team("b", vec![member("u3")])],
        };

        assert_eq!(details.rostered_players(), 3);
        assert_eq!(details.team_of("u3").map(|t| t.id.as_str()), Some("b"));
        assert!(details.team_of("u9").is_none());
    }

    #[test]
    fn test_availability_status_wire_format() {
        let json = serde_json::to_string(&AvailabilityStatus::NotLooking).unwrap();
        assert_eq!(json, "\"not_looking\"");
    }
}
