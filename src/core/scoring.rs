use crate::models::{CandidateMatch, PlayerPreferences, ScoringWeights, SkillLevel, MAX_SCORE};

/// Calculate a placement score (0-100) for a candidate match
///
/// Scoring is point-additive:
/// score = min(
///     skill_points +        # exact level 30, beginner/intermediate 15
///     slot_points +         # 40 when at least 2 roster slots are free
///     fairness_points +     # 20 above 7, 10 above 5
///     home_field_points,    # 10 at the player's home field
///     max_score,            # never above 100
/// )
///
/// The preferred position does not affect the score. The second value is
/// whether the player's position is likely still open, which is the same
/// aggregate headcount check that drives `slot_points`.
pub fn calculate_match_score(
    candidate: &CandidateMatch,
    preferences: &PlayerPreferences,
    weights: &ScoringWeights,
) -> (u8, bool) {
    let skill = skill_points(candidate.skill_level, preferences.skill_level, weights);

    let position_open = has_open_slot(candidate, weights);
    let slot = if position_open { weights.open_slot } else { 0 };

    let fairness = fairness_points(candidate.fairness_score, weights);

    let home_field = home_field_points(
        candidate.field_id.as_deref(),
        preferences.home_field_id.as_deref(),
        weights,
    );

    let total = skill
        .saturating_add(slot)
        .saturating_add(fairness)
        .saturating_add(home_field)
        .min(weights.max_score)
        .min(MAX_SCORE);

    (total as u8, position_open)
}

#[inline]
fn skill_points(match_skill: Option<SkillLevel>, player_skill: SkillLevel, weights: &ScoringWeights) -> u32 {
    match match_skill {
        Some(level) if level == player_skill => weights.skill_exact,
        Some(level) if level.is_adjacent_to(player_skill) => weights.skill_adjacent,
        _ => 0,
    }
}

/// Rough estimate: the backend only tracks total headcount, not per-position fill
#[inline]
fn has_open_slot(candidate: &CandidateMatch, weights: &ScoringWeights) -> bool {
    candidate.open_slots() >= weights.min_open_slots
}

#[inline]
fn fairness_points(fairness: Option<f64>, weights: &ScoringWeights) -> u32 {
    match fairness {
        Some(f) if f > weights.fairness_high_threshold => weights.fairness_high,
        Some(f) if f > weights.fairness_mid_threshold => weights.fairness_mid,
        _ => 0,
    }
}

#[inline]
fn home_field_points(field_id: Option<&str>, home_field_id: Option<&str>, weights: &ScoringWeights) -> u32 {
    match (field_id, home_field_id) {
        (Some(field), Some(home)) if field == home => weights.home_field,
        _ => 0,
    }
}
