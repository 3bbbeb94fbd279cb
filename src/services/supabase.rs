use crate::models::{
    Availability, AvailabilityStatus, CandidateMatch, CommunityStats, Field, MatchDetails, MatchType,
    NewMatch, PlayerPosition, PlayerProfile, SkillLevel, Team, TeamMember, TimeSlot,
    DEFAULT_MAX_PLAYERS, DEFAULT_TEAMS,
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const MATCH_SELECT: &str = "id,scheduled_at,field_id,skill_level,max_players,fairness_score,\
is_public,match_type,duration_minutes,fields(name),match_participants(count)";

const PROFILE_SELECT: &str =
    "id,full_name,skill_level,preferred_position,home_field_id,games_played,fair_play_rating";

const FIELD_SELECT: &str = "id,name,location,capacity,latitude,longitude,status";

const AVAILABILITY_SELECT: &str = "user_id,date,time_slot,status";

const TEAM_SELECT: &str = "id,match_id,name,color,team_members(user_id,assigned_position,is_captain,\
profiles(full_name,skill_level,preferred_position))";

/// Errors that can occur when talking to the hosted backend
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: invalid service key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// PostgREST client for the hosted backend
///
/// Handles all reads and writes against the backend tables:
/// - Player profiles and fields
/// - Upcoming candidate matches with their headcount
/// - Match participants (joining a match)
/// - Daily availability and community counters
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
}

/// `matches` row with embedded field name and participant count
#[derive(Debug, Deserialize)]
struct MatchRow {
    id: String,
    scheduled_at: DateTime<Utc>,
    #[serde(default)]
    field_id: Option<String>,
    #[serde(default)]
    fields: Option<FieldName>,
    #[serde(default)]
    skill_level: Option<SkillLevel>,
    #[serde(default)]
    max_players: Option<i32>,
    #[serde(default)]
    fairness_score: Option<f64>,
    #[serde(default)]
    is_public: Option<bool>,
    #[serde(default)]
    match_type: Option<MatchType>,
    #[serde(default)]
    duration_minutes: Option<i32>,
    #[serde(default)]
    match_participants: Vec<CountRow>,
}

#[derive(Debug, Deserialize)]
struct FieldName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: i64,
}

#[derive(Debug, Deserialize)]
struct ParticipantRow {
    match_id: String,
}

/// `user_availability` row; one per player and day
#[derive(Debug, Serialize, Deserialize)]
struct AvailabilityRow {
    user_id: String,
    date: NaiveDate,
    time_slot: TimeSlot,
    status: AvailabilityStatus,
}

impl From<&Availability> for AvailabilityRow {
    fn from(availability: &Availability) -> Self {
        AvailabilityRow {
            user_id: availability.user_id.clone(),
            date: availability.date,
            time_slot: availability.time_slot,
            status: availability.status,
        }
    }
}

impl From<AvailabilityRow> for Availability {
    fn from(row: AvailabilityRow) -> Self {
        Availability {
            user_id: row.user_id,
            date: row.date,
            time_slot: row.time_slot,
            status: row.status,
        }
    }
}

/// `matches` insert payload
#[derive(Debug, Serialize)]
struct NewMatchRow<'a> {
    field_id: &'a str,
    scheduled_at: String,
    match_type: MatchType,
    skill_level: SkillLevel,
    max_players: u16,
    is_public: bool,
    auto_balance: bool,
    created_by: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_minutes: Option<u16>,
}

#[derive(Debug, Serialize)]
struct NewTeamRow<'a> {
    match_id: &'a str,
    name: &'a str,
    color: &'a str,
}

/// `teams` row with embedded members and their profiles
#[derive(Debug, Deserialize)]
struct TeamRow {
    id: String,
    match_id: String,
    name: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    team_members: Vec<TeamMemberRow>,
}

#[derive(Debug, Deserialize)]
struct TeamMemberRow {
    user_id: String,
    #[serde(default)]
    assigned_position: Option<PlayerPosition>,
    #[serde(default)]
    is_captain: Option<bool>,
    #[serde(default)]
    profiles: Option<MemberProfile>,
}

#[derive(Debug, Deserialize)]
struct MemberProfile {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    skill_level: Option<SkillLevel>,
    #[serde(default)]
    preferred_position: Option<PlayerPosition>,
}

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Team {
            id: row.id,
            match_id: row.match_id,
            name: row.name,
            color: row.color,
            members: row
                .team_members
                .into_iter()
                .map(|member| {
                    let profile = member.profiles;
                    TeamMember {
                        user_id: member.user_id,
                        assigned_position: member.assigned_position,
                        is_captain: member.is_captain.unwrap_or(false),
                        full_name: profile.as_ref().and_then(|p| p.full_name.clone()),
                        skill_level: profile.as_ref().and_then(|p| p.skill_level),
                        preferred_position: profile.as_ref().and_then(|p| p.preferred_position),
                    }
                })
                .collect(),
        }
    }
}

impl From<MatchRow> for CandidateMatch {
    fn from(row: MatchRow) -> Self {
        let participants: i64 = row.match_participants.iter().map(|c| c.count).sum();

        CandidateMatch {
            id: row.id,
            scheduled_at: row.scheduled_at,
            field_id: row.field_id,
            field_name: row.fields.map(|f| f.name),
            skill_level: row.skill_level,
            max_players: row
                .max_players
                .and_then(|n| u16::try_from(n).ok())
                .unwrap_or(DEFAULT_MAX_PLAYERS),
            current_players: u16::try_from(participants.max(0)).unwrap_or(u16::MAX),
            fairness_score: row.fairness_score,
            // Missing flag means the backend default (public)
            is_public: row.is_public.unwrap_or(true),
            match_type: row.match_type,
            duration_minutes: row.duration_minutes.and_then(|n| u16::try_from(n).ok()),
        }
    }
}

impl SupabaseClient {
    /// Create a new backend client
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Result<Self, SupabaseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    /// Fetch a player profile by user ID
    pub async fn get_profile(&self, user_id: &str) -> Result<PlayerProfile, SupabaseError> {
        let url = self.table_url(
            "profiles",
            &[
                ("select", PROFILE_SELECT.to_string()),
                ("id", format!("eq.{}", user_id)),
                ("limit", "1".to_string()),
            ],
        );

        tracing::debug!("Fetching profile for user: {}", user_id);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_status(response, "fetch profile").await?;

        let profiles: Vec<PlayerProfile> = response.json().await?;

        profiles
            .into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(format!("Profile not found for user {}", user_id)))
    }

    /// Query upcoming public matches, soonest first
    pub async fn query_candidate_matches(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CandidateMatch>, SupabaseError> {
        let url = self.table_url(
            "matches",
            &[
                ("select", MATCH_SELECT.to_string()),
                ("is_public", "eq.true".to_string()),
                ("scheduled_at", format!("gte.{}", timestamp(now))),
                ("order", "scheduled_at.asc".to_string()),
                ("limit", limit.to_string()),
            ],
        );

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_status(response, "query candidate matches").await?;

        let rows: Vec<MatchRow> = response
            .json()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse matches: {}", e)))?;

        let candidates: Vec<CandidateMatch> = rows.into_iter().map(CandidateMatch::from).collect();

        tracing::debug!("Queried {} candidate matches (limit: {})", candidates.len(), limit);

        Ok(candidates)
    }

    /// Fetch a single match by ID
    pub async fn get_match(&self, match_id: &str) -> Result<CandidateMatch, SupabaseError> {
        let url = self.table_url(
            "matches",
            &[
                ("select", MATCH_SELECT.to_string()),
                ("id", format!("eq.{}", match_id)),
                ("limit", "1".to_string()),
            ],
        );

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_status(response, "fetch match").await?;

        let rows: Vec<MatchRow> = response
            .json()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse match: {}", e)))?;

        rows.into_iter()
            .next()
            .map(CandidateMatch::from)
            .ok_or_else(|| SupabaseError::NotFound(format!("Match {} not found", match_id)))
    }

    /// IDs of every match the player already joined
    pub async fn joined_match_ids(&self, user_id: &str) -> Result<Vec<String>, SupabaseError> {
        let url = self.table_url(
            "match_participants",
            &[
                ("select", "match_id".to_string()),
                ("user_id", format!("eq.{}", user_id)),
            ],
        );

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_status(response, "fetch joined matches").await?;

        let rows: Vec<ParticipantRow> = response.json().await?;

        Ok(rows.into_iter().map(|r| r.match_id).collect())
    }

    /// Add the player to a match roster
    pub async fn join_match(&self, match_id: &str, user_id: &str) -> Result<(), SupabaseError> {
        let url = self.table_url("match_participants", &[]);

        let payload = serde_json::json!({
            "match_id": match_id,
            "user_id": user_id,
            "status": "joined",
        });

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=minimal")
            .json(&payload)
            .send()
            .await?;
        check_status(response, "join match").await?;

        tracing::debug!("User {} joined match {}", user_id, match_id);

        Ok(())
    }

    /// Insert a match and its two default teams
    ///
    /// The teams are inserted separately; if that fails the match row stays.
    pub async fn create_match(&self, new_match: &NewMatch) -> Result<MatchDetails, SupabaseError> {
        let url = self.table_url("matches", &[("select", MATCH_SELECT.to_string())]);

        let payload = NewMatchRow {
            field_id: &new_match.field_id,
            scheduled_at: timestamp(new_match.scheduled_at),
            match_type: new_match.match_type,
            skill_level: new_match.skill_level,
            max_players: new_match.max_players,
            is_public: new_match.is_public,
            auto_balance: false,
            created_by: &new_match.created_by,
            duration_minutes: new_match.duration_minutes,
        };

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await?;
        let response = check_status(response, "create match").await?;

        let rows: Vec<MatchRow> = response
            .json()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse created match: {}", e)))?;

        let candidate = rows
            .into_iter()
            .next()
            .map(CandidateMatch::from)
            .ok_or_else(|| SupabaseError::InvalidResponse("Insert returned no match".into()))?;

        let teams = self.create_default_teams(&candidate.id).await?;

        tracing::debug!("Created match {} with {} teams", candidate.id, teams.len());

        Ok(MatchDetails { candidate, teams })
    }

    async fn create_default_teams(&self, match_id: &str) -> Result<Vec<Team>, SupabaseError> {
        let url = self.table_url("teams", &[("select", TEAM_SELECT.to_string())]);

        let payload: Vec<NewTeamRow> = DEFAULT_TEAMS
            .iter()
            .map(|&(name, color)| NewTeamRow { match_id, name, color })
            .collect();

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await?;
        let response = check_status(response, "create teams").await?;

        let rows: Vec<TeamRow> = response
            .json()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse teams: {}", e)))?;

        Ok(rows.into_iter().map(Team::from).collect())
    }

    /// Teams of a match with their members
    pub async fn get_teams(&self, match_id: &str) -> Result<Vec<Team>, SupabaseError> {
        let url = self.table_url(
            "teams",
            &[
                ("select", TEAM_SELECT.to_string()),
                ("match_id", format!("eq.{}", match_id)),
                ("order", "name.asc".to_string()),
            ],
        );

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_status(response, "fetch teams").await?;

        let rows: Vec<TeamRow> = response
            .json()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse teams: {}", e)))?;

        Ok(rows.into_iter().map(Team::from).collect())
    }

    /// A match together with its team rosters
    pub async fn get_match_details(&self, match_id: &str) -> Result<MatchDetails, SupabaseError> {
        let candidate = self.get_match(match_id).await?;
        let teams = self.get_teams(match_id).await?;

        Ok(MatchDetails { candidate, teams })
    }

    /// Remove the player from a team roster
    pub async fn leave_team(&self, team_id: &str, user_id: &str) -> Result<(), SupabaseError> {
        let url = self.table_url(
            "team_members",
            &[
                ("team_id", format!("eq.{}", team_id)),
                ("user_id", format!("eq.{}", user_id)),
                ("select", "user_id".to_string()),
            ],
        );

        let response = self
            .authorized(self.client.delete(&url))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let response = check_status(response, "leave team").await?;

        let removed: Vec<serde_json::Value> = response.json().await?;
        if removed.is_empty() {
            return Err(SupabaseError::NotFound(format!(
                "User {} is not on team {}",
                user_id, team_id
            )));
        }

        tracing::debug!("User {} left team {}", user_id, team_id);

        Ok(())
    }

    /// List all playing fields by name
    pub async fn list_fields(&self) -> Result<Vec<Field>, SupabaseError> {
        let url = self.table_url(
            "fields",
            &[
                ("select", FIELD_SELECT.to_string()),
                ("order", "name.asc".to_string()),
            ],
        );

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_status(response, "list fields").await?;

        Ok(response.json().await?)
    }

    /// Insert or replace the player's availability for a day
    ///
    /// The backend keeps one row per `(user_id, date)`.
    pub async fn upsert_availability(
        &self,
        availability: &Availability,
    ) -> Result<Availability, SupabaseError> {
        let url = self.table_url(
            "user_availability",
            &[
                ("on_conflict", "user_id,date".to_string()),
                ("select", AVAILABILITY_SELECT.to_string()),
            ],
        );

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&AvailabilityRow::from(availability))
            .send()
            .await?;
        let response = check_status(response, "set availability").await?;

        let rows: Vec<AvailabilityRow> = response.json().await?;

        rows.into_iter()
            .next()
            .map(Availability::from)
            .ok_or_else(|| SupabaseError::InvalidResponse("Upsert returned no rows".into()))
    }

    /// Fetch the player's availability for a day, if set
    pub async fn get_availability(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Availability>, SupabaseError> {
        let url = self.table_url(
            "user_availability",
            &[
                ("select", AVAILABILITY_SELECT.to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("date", format!("eq.{}", date)),
                ("limit", "1".to_string()),
            ],
        );

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_status(response, "fetch availability").await?;

        let rows: Vec<AvailabilityRow> = response.json().await?;

        Ok(rows.into_iter().next().map(Availability::from))
    }

    /// Count players looking today, community members and games today
    pub async fn community_stats(
        &self,
        date: NaiveDate,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<CommunityStats, SupabaseError> {
        let players_looking = self
            .count_rows(
                "user_availability",
                &[
                    ("date", format!("eq.{}", date)),
                    ("status", "eq.looking".to_string()),
                ],
            )
            .await?;

        let community_members = self.count_rows("profiles", &[]).await?;

        let games_today = self
            .count_rows(
                "matches",
                &[
                    ("scheduled_at", format!("gte.{}", timestamp(day_start))),
                    ("scheduled_at", format!("lt.{}", timestamp(day_end))),
                ],
            )
            .await?;

        Ok(CommunityStats {
            players_looking,
            community_members,
            games_today,
        })
    }

    /// Exact row count via `Content-Range` without fetching rows
    async fn count_rows(&self, table: &str, filters: &[(&str, String)]) -> Result<u64, SupabaseError> {
        let mut query = vec![("select", "id".to_string())];
        query.extend(filters.iter().cloned());
        let url = self.table_url(table, &query);

        let response = self
            .authorized(self.client.head(&url))
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = check_status(response, "count rows").await?;

        let range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| SupabaseError::InvalidResponse(format!("Missing Content-Range for {}", table)))?;

        parse_content_range_total(range)
            .ok_or_else(|| SupabaseError::InvalidResponse(format!("Bad Content-Range: {}", range)))
    }

    fn table_url(&self, table: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table);

        for (i, (key, value)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }

        url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

async fn check_status(response: Response, action: &str) -> Result<Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read body".to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SupabaseError::Unauthorized),
        StatusCode::NOT_FOUND => Err(SupabaseError::NotFound(format!("Failed to {}: {}", action, body))),
        StatusCode::CONFLICT => Err(SupabaseError::Conflict(format!("Failed to {}: {}", action, body))),
        _ => {
            tracing::error!("Failed to {}: {} - {}", action, status, body);
            Err(SupabaseError::ApiError(format!("Failed to {}: {}", action, status)))
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Total from a PostgREST `Content-Range` header such as `0-24/3573` or `*/0`
pub(crate) fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}
