use chrono::{DateTime, Utc};

use crate::core::{filters::is_eligible, scoring::calculate_match_score};
use crate::models::{CandidateMatch, PlayerPreferences, ScoredMatch, ScoringWeights};

/// Number of runners-up returned next to the recommended match
pub const DEFAULT_ALTERNATIVES: usize = 2;

/// Outcome of a placement search
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Placed {
        recommended: ScoredMatch,
        alternatives: Vec<ScoredMatch>,
        total_candidates: usize,
    },
    /// Nothing to rank, as opposed to candidates that merely scored low
    NoMatchesAvailable { total_candidates: usize },
}

impl Placement {
    pub fn recommended(&self) -> Option<&ScoredMatch> {
        match self {
            Placement::Placed { recommended, .. } => Some(recommended),
            Placement::NoMatchesAvailable { .. } => None,
        }
    }

    pub fn total_candidates(&self) -> usize {
        match self {
            Placement::Placed { total_candidates, .. }
            | Placement::NoMatchesAvailable { total_candidates } => *total_candidates,
        }
    }
}

/// Scores candidate matches for a player and picks a placement
///
/// # Pipeline Stages
/// 1. Eligibility filter (public, upcoming, not excluded)
/// 2. Scoring
/// 3. Stable ranking, best first
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    alternatives: usize,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, alternatives: usize) -> Self {
        Self { weights, alternatives }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
            alternatives: DEFAULT_ALTERNATIVES,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score one candidate (0-100)
    pub fn score(&self, candidate: &CandidateMatch, preferences: &PlayerPreferences) -> u8 {
        calculate_match_score(candidate, preferences, &self.weights).0
    }

    /// Score every candidate and sort best first
    ///
    /// Equal scores keep their input order.
    pub fn rank_all(
        &self,
        preferences: &PlayerPreferences,
        candidates: Vec<CandidateMatch>,
    ) -> Vec<ScoredMatch> {
        let mut scored: Vec<ScoredMatch> = candidates
            .into_iter()
            .map(|candidate| {
                let (score, position_likely_open) =
                    calculate_match_score(&candidate, preferences, &self.weights);
                ScoredMatch {
                    candidate,
                    score,
                    position_likely_open,
                }
            })
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.score.cmp(&a.score));

        scored
    }

    /// Rank a candidate list as-is and split it into a placement
    pub fn rank(&self, preferences: &PlayerPreferences, candidates: Vec<CandidateMatch>) -> Placement {
        let total_candidates = candidates.len();
        self.place(self.rank_all(preferences, candidates), total_candidates)
    }

    /// Filter, score and rank candidates fetched for a placement search
    ///
    /// # Arguments
    /// * `preferences` - The player's scoring inputs
    /// * `candidates` - Upcoming matches from the backend
    /// * `now` - Reference time for dropping matches that already started
    /// * `excluded_match_ids` - Matches the player joined or dismissed
    pub fn find_placement(
        &self,
        preferences: &PlayerPreferences,
        candidates: Vec<CandidateMatch>,
        now: DateTime<Utc>,
        excluded_match_ids: &[String],
    ) -> Placement {
        let total_candidates = candidates.len();

        let eligible: Vec<CandidateMatch> = candidates
            .into_iter()
            .filter(|candidate| is_eligible(candidate, now, excluded_match_ids))
            .collect();

        tracing::debug!(
            "{} of {} candidates eligible for {}",
            eligible.len(),
            total_candidates,
            preferences.user_id
        );

        self.place(self.rank_all(preferences, eligible), total_candidates)
    }

    fn place(&self, ranked: Vec<ScoredMatch>, total_candidates: usize) -> Placement {
        let mut ranked = ranked.into_iter();

        match ranked.next() {
            Some(recommended) => Placement::Placed {
                recommended,
                alternatives: ranked.take(self.alternatives).collect(),
                total_candidates,
            },
            None => Placement::NoMatchesAvailable { total_candidates },
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlayerPosition, SkillLevel};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn create_candidate(id: &str, skill: SkillLevel, current: u16, fairness: Option<f64>) -> CandidateMatch {
        CandidateMatch {
            id: id.to_string(),
            scheduled_at: now() + Duration::hours(6),
            field_id: Some("lubetkin".to_string()),
            field_name: Some("Lubetkin Field".to_string()),
            skill_level: Some(skill),
            max_players: 14,
            current_players: current,
            fairness_score: fairness,
            is_public: true,
            match_type: None,
            duration_minutes: Some(90),
        }
    }

    fn create_preferences() -> PlayerPreferences {
        PlayerPreferences {
            user_id: "current_user".to_string(),
            skill_level: SkillLevel::Intermediate,
            preferred_position: PlayerPosition::Defender,
            home_field_id: None,
        }
    }

    #[test]
    fn test_rank_picks_highest_score() {
        let matcher = Matcher::with_default_weights();

        let candidates = vec![
            create_candidate("low", SkillLevel::Advanced, 13, None),
            create_candidate("high", SkillLevel::Intermediate, 4, Some(9.0)),
            create_candidate("mid", SkillLevel::Beginner, 4, None),
        ];

        let placement = matcher.rank(&create_preferences(), candidates);

        match placement {
            Placement::Placed { recommended, alternatives, total_candidates } => {
                assert_eq!(recommended.candidate.id, "high");
                assert_eq!(recommended.score, 90);
                assert_eq!(alternatives[0].candidate.id, "mid");
                assert_eq!(alternatives[0].score, 55);
                assert_eq!(alternatives[1].candidate.id, "low");
                assert_eq!(alternatives[1].score, 0);
                assert_eq!(total_candidates, 3);
            }
            other => panic!("expected a placement, got {:?}", other),
        }
    }

    #[test]
    fn test_at_most_two_alternatives() {
        let matcher = Matcher::with_default_weights();

        let candidates: Vec<CandidateMatch> = (0..6)
            .map(|i| create_candidate(&i.to_string(), SkillLevel::Intermediate, i, None))
            .collect();

        let placement = matcher.rank(&create_preferences(), candidates);

        match placement {
            Placement::Placed { alternatives, .. } => assert_eq!(alternatives.len(), 2),
            other => panic!("expected a placement, got {:?}", other),
        }
    }

    #[test]
    fn test_single_candidate_has_no_alternatives() {
        let matcher = Matcher::with_default_weights();
        let candidates = vec![create_candidate("only", SkillLevel::Advanced, 13, None)];

        match matcher.rank(&create_preferences(), candidates) {
            Placement::Placed { recommended, alternatives, .. } => {
                assert_eq!(recommended.candidate.id, "only");
                assert_eq!(recommended.score, 0);
                assert!(alternatives.is_empty());
            }
            other => panic!("expected a placement, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_candidates_signal_no_matches() {
        let matcher = Matcher::with_default_weights();
        let placement = matcher.rank(&create_preferences(), vec![]);

        assert_eq!(placement, Placement::NoMatchesAvailable { total_candidates: 0 });
        assert!(placement.recommended().is_none());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let matcher = Matcher::with_default_weights();

        let candidates = vec![
            create_candidate("first", SkillLevel::Intermediate, 4, None),
            create_candidate("second", SkillLevel::Intermediate, 4, None),
            create_candidate("third", SkillLevel::Intermediate, 4, None),
        ];

        let ranked = matcher.rank_all(&create_preferences(), candidates);
        let ids: Vec<&str> = ranked.iter().map(|m| m.candidate.id.as_str()).collect();

        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_find_placement_drops_excluded_and_started() {
        let matcher = Matcher::with_default_weights();

        let mut started = create_candidate("started", SkillLevel::Intermediate, 4, Some(9.0));
        started.scheduled_at = now() - Duration::hours(1);

        let candidates = vec![
            started,
            create_candidate("joined", SkillLevel::Intermediate, 4, Some(9.0)),
            create_candidate("open", SkillLevel::Advanced, 4, None),
        ];

        let placement = matcher.find_placement(
            &create_preferences(),
            candidates,
            now(),
            &["joined".to_string()],
        );

        assert_eq!(placement.recommended().map(|m| m.candidate.id.as_str()), Some("open"));
        assert_eq!(placement.total_candidates(), 3);
    }

    #[test]
    fn test_find_placement_all_filtered() {
        let matcher = Matcher::with_default_weights();
        let candidates = vec![create_candidate("joined", SkillLevel::Intermediate, 4, None)];

        let placement = matcher.find_placement(
            &create_preferences(),
            candidates,
            now(),
            &["joined".to_string()],
        );

        assert_eq!(placement, Placement::NoMatchesAvailable { total_candidates: 1 });
    }
}
