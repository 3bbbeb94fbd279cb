// Core algorithm exports
pub mod display;
pub mod filters;
pub mod matcher;
pub mod rules;
pub mod scoring;

pub use display::{format_match_time, match_details_view, placement_view, position_label};
pub use filters::is_eligible;
pub use matcher::{Matcher, Placement, DEFAULT_ALTERNATIVES};
pub use rules::{check_new_match, MatchRuleError};
pub use scoring::calculate_match_score;
