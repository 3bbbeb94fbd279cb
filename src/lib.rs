//! TeamMind Placement - auto-placement service for TeamMind pickup games
//!
//! This library scores upcoming public matches against a player's skill
//! level, open roster slots, match fairness and home field, and picks a
//! recommended match plus runners-up.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, Placement, calculate_match_score};
pub use models::{CandidateMatch, PlayerPreferences, ScoredMatch, ScoringWeights, SkillLevel, PlayerPosition};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let matcher = Matcher::default();
        assert_eq!(matcher.weights(), &ScoringWeights::default());
    }
}
