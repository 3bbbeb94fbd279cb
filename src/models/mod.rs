// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Availability, AvailabilityStatus, CandidateMatch, CommunityStats, Field, MatchDetails,
    MatchType, NewMatch, PlayerPosition, PlayerPreferences, PlayerProfile, ScoredMatch,
    ScoringWeights, SkillLevel, Team, TeamMember, TimeSlot, DEFAULT_MAX_PLAYERS, DEFAULT_TEAMS,
    MAX_MATCH_PLAYERS, MAX_SCORE, MIN_MATCH_PLAYERS,
};
pub use requests::{CreateMatchRequest, FindPlacementRequest, JoinMatchRequest, SetAvailabilityRequest, UserQuery};
pub use responses::{ErrorResponse, HealthResponse, JoinMatchResponse, LeaveTeamResponse, MatchDetailsResponse, PlacementResponse, PlacementView};
