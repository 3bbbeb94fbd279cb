use chrono::{FixedOffset, Offset, Utc};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::models::{ScoringWeights, MAX_SCORE};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub placement: PlacementSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// L1 only when unset
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacementSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    #[serde(default = "default_alternatives")]
    pub alternatives: usize,
    #[serde(default)]
    pub display_utc_offset_minutes: i32,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            alternatives: default_alternatives(),
            display_utc_offset_minutes: 0,
        }
    }
}

impl PlacementSettings {
    /// Offset used for display times and for deciding what "today" is
    pub fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.display_utc_offset_minutes * 60).unwrap_or_else(|| {
            tracing::warn!(
                "Invalid display offset {} minutes, falling back to UTC",
                self.display_utc_offset_minutes
            );
            Utc.fix()
        })
    }

    /// Clamp a requested candidate count to the configured bounds
    pub fn effective_limit(&self, requested: Option<u16>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1)) as usize
    }
}

fn default_limit() -> u16 { 20 }
fn default_max_limit() -> u16 { 50 }
fn default_alternatives() -> usize { 2 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_skill_exact")]
    pub skill_exact: u32,
    #[serde(default = "default_skill_adjacent")]
    pub skill_adjacent: u32,
    #[serde(default = "default_open_slot")]
    pub open_slot: u32,
    #[serde(default = "default_fairness_high")]
    pub fairness_high: u32,
    #[serde(default = "default_fairness_mid")]
    pub fairness_mid: u32,
    #[serde(default = "default_home_field")]
    pub home_field: u32,
    #[serde(default = "default_fairness_high_threshold")]
    pub fairness_high_threshold: f64,
    #[serde(default = "default_fairness_mid_threshold")]
    pub fairness_mid_threshold: f64,
    #[serde(default = "default_min_open_slots")]
    pub min_open_slots: u16,
    #[serde(default = "default_max_score")]
    pub max_score: u32,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            skill_exact: default_skill_exact(),
            skill_adjacent: default_skill_adjacent(),
            open_slot: default_open_slot(),
            fairness_high: default_fairness_high(),
            fairness_mid: default_fairness_mid(),
            home_field: default_home_field(),
            fairness_high_threshold: default_fairness_high_threshold(),
            fairness_mid_threshold: default_fairness_mid_threshold(),
            min_open_slots: default_min_open_slots(),
            max_score: default_max_score(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            skill_exact: config.skill_exact,
            skill_adjacent: config.skill_adjacent,
            open_slot: config.open_slot,
            fairness_high: config.fairness_high,
            fairness_mid: config.fairness_mid,
            home_field: config.home_field,
            fairness_high_threshold: config.fairness_high_threshold,
            fairness_mid_threshold: config.fairness_mid_threshold,
            min_open_slots: config.min_open_slots,
            max_score: capped_max_score(config.max_score),
        }
    }
}

/// Scores are percentages; a larger configured ceiling is lowered to 100
fn capped_max_score(configured: u32) -> u32 {
    if configured > MAX_SCORE {
        tracing::warn!(
            "scoring.weights.max_score = {} exceeds {}, using {}",
            configured,
            MAX_SCORE,
            MAX_SCORE
        );
    }
    configured.min(MAX_SCORE)
}

fn default_skill_exact() -> u32 { 30 }
fn default_skill_adjacent() -> u32 { 15 }
fn default_open_slot() -> u32 { 40 }
fn default_fairness_high() -> u32 { 20 }
fn default_fairness_mid() -> u32 { 10 }
fn default_home_field() -> u32 { 10 }
fn default_fairness_high_threshold() -> f64 { 7.0 }
fn default_fairness_mid_threshold() -> f64 { 5.0 }
fn default_min_open_slots() -> u16 { 2 }
fn default_max_score() -> u32 { MAX_SCORE }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TEAMMIND_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., TEAMMIND__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("TEAMMIND")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_env_shortcuts(settings)?.try_deserialize()
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights::from(&self.scoring.weights)
    }
}

/// Honour the conventional backend variables on top of the TEAMMIND_ ones
///
/// `DATABASE_URL`, `SUPABASE_URL` and `SUPABASE_SERVICE_KEY` win when set.
fn apply_env_shortcuts(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    let shortcuts = [
        ("DATABASE_URL", "database.url"),
        ("SUPABASE_URL", "supabase.url"),
        ("SUPABASE_SERVICE_KEY", "supabase.api_key"),
    ];

    for (var, key) in shortcuts {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
