use chrono::{DateTime, FixedOffset, Utc};

use crate::models::{MatchDetails, MatchDetailsResponse, PlacementView, PlayerPosition, ScoredMatch};

/// Shown when a match has no field attached yet
pub const UNKNOWN_FIELD_LABEL: &str = "Field TBD";

pub fn position_label(position: PlayerPosition) -> &'static str {
    match position {
        PlayerPosition::Goalkeeper => "Goalkeeper",
        PlayerPosition::Defender => "Defender",
        PlayerPosition::Midfielder => "Midfielder",
        PlayerPosition::Forward => "Forward",
    }
}

/// Format a kickoff time like `Sat, Oct 17 · 7:30 PM` in the given offset
pub fn format_match_time(scheduled_at: DateTime<Utc>, offset: FixedOffset) -> String {
    scheduled_at
        .with_timezone(&offset)
        .format("%a, %b %-d · %-I:%M %p")
        .to_string()
}

pub fn occupancy_label(current_players: u16, max_players: u16) -> String {
    format!("{}/{}", current_players, max_players)
}

pub fn score_percentage(score: u8) -> String {
    format!("{}%", score)
}

pub fn field_label(field_name: Option<&str>, field_id: Option<&str>) -> String {
    field_name
        .or(field_id)
        .unwrap_or(UNKNOWN_FIELD_LABEL)
        .to_string()
}

/// Build the display view for a scored match
pub fn placement_view(scored: &ScoredMatch, position: PlayerPosition, offset: FixedOffset) -> PlacementView {
    let candidate = &scored.candidate;

    PlacementView {
        match_id: candidate.id.clone(),
        field_id: candidate.field_id.clone(),
        field_name: field_label(candidate.field_name.as_deref(), candidate.field_id.as_deref()),
        scheduled_at: candidate.scheduled_at,
        time: format_match_time(candidate.scheduled_at, offset),
        role: position_label(position).to_string(),
        occupancy: occupancy_label(candidate.current_players, candidate.max_players),
        current_players: candidate.current_players,
        max_players: candidate.max_players,
        skill_level: candidate.skill_level,
        fairness_score: candidate.fairness_score,
        score: scored.score,
        score_percent: score_percentage(scored.score),
        position_likely_open: scored.position_likely_open,
    }
}

/// Build the display view for a match and its teams
///
/// Occupancy counts rostered team members, not raw participants.
pub fn match_details_view(details: MatchDetails, offset: FixedOffset) -> MatchDetailsResponse {
    let candidate = &details.candidate;
    let rostered_players = details.rostered_players();

    MatchDetailsResponse {
        field_name: field_label(candidate.field_name.as_deref(), candidate.field_id.as_deref()),
        time: format_match_time(candidate.scheduled_at, offset),
        occupancy: occupancy_label(rostered_players, candidate.max_players),
        rostered_players,
        candidate: details.candidate,
        teams: details.teams,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateMatch, Team, TeamMember};
    use chrono::TimeZone;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_format_match_time() {
        let kickoff = Utc.with_ymd_and_hms(2026, 10, 17, 19, 30, 0).unwrap();
        assert_eq!(format_match_time(kickoff, utc()), "Sat, Oct 17 · 7:30 PM");
    }

    #[test]
    fn test_format_match_time_applies_offset() {
        let kickoff = Utc.with_ymd_and_hms(2026, 10, 17, 23, 0, 0).unwrap();
        let newark = FixedOffset::west_opt(4 * 3600).unwrap();
        assert_eq!(format_match_time(kickoff, newark), "Sat, Oct 17 · 7:00 PM");
    }

    #[test]
    fn test_field_label_fallbacks() {
        assert_eq!(field_label(Some("Lubetkin Field"), Some("lubetkin")), "Lubetkin Field");
        assert_eq!(field_label(None, Some("lubetkin")), "lubetkin");
        assert_eq!(field_label(None, None), UNKNOWN_FIELD_LABEL);
    }

    #[test]
    fn test_placement_view() {
        let scored = ScoredMatch {
            candidate: CandidateMatch {
                id: "m1".to_string(),
                scheduled_at: Utc.with_ymd_and_hms(2026, 10, 17, 17, 0, 0).unwrap(),
                field_id: Some("frederick-douglass".to_string()),
                field_name: Some("Frederick Douglass Field".to_string()),
                skill_level: None,
                max_players: 14,
                current_players: 8,
                fairness_score: Some(8.0),
                is_public: true,
                match_type: None,
                duration_minutes: None,
            },
            score: 70,
            position_likely_open: true,
        };

        let view = placement_view(&scored, PlayerPosition::Forward, utc());

        assert_eq!(view.match_id, "m1");
        assert_eq!(view.field_name, "Frederick Douglass Field");
        assert_eq!(view.time, "Sat, Oct 17 · 5:00 PM");
        assert_eq!(view.role, "Forward");
        assert_eq!(view.occupancy, "8/14");
        assert_eq!(view.score_percent, "70%");
        assert!(view.position_likely_open);
    }

    #[test]
    fn test_match_details_view_counts_team_members() {
        let member = |id: &str| TeamMember {
            user_id: id.to_string(),
            full_name: None,
            assigned_position: Some(PlayerPosition::Defender),
            is_captain: false,
            skill_level: None,
            preferred_position: None,
        };

        let details = MatchDetails {
            candidate: CandidateMatch {
                id: "m1".to_string(),
                scheduled_at: Utc.with_ymd_and_hms(2026, 10, 17, 19, 30, 0).unwrap(),
                field_id: Some("lubetkin".to_string()),
                field_name: None,
                skill_level: None,
                max_players: 14,
                current_players: 9,
                fairness_score: None,
                is_public: true,
                match_type: None,
                duration_minutes: None,
            },
            teams: vec![Team {
                id: "t1".to_string(),
                match_id: "m1".to_string(),
                name: "Team A".to_string(),
                color: Some("#3B82F6".to_string()),
                members: vec![member("u1"), member("u2")],
            }],
        };

        let view = match_details_view(details, utc());

        assert_eq!(view.occupancy, "2/14");
        assert_eq!(view.rostered_players, 2);
        assert_eq!(view.field_name, "lubetkin");
        assert_eq!(view.time, "Sat, Oct 17 · 7:30 PM");
        assert_eq!(view.candidate.current_players, 9);
    }
}
