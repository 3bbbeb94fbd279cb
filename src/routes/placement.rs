use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use std::sync::Arc;
use validator::Validate;

use crate::config::PlacementSettings;
use crate::core::{placement_view, Matcher, Placement};
use crate::models::{
    Availability, CandidateMatch, ErrorResponse, Field, FindPlacementRequest, HealthResponse,
    PlacementResponse, PlayerProfile, SetAvailabilityRequest, UserQuery,
};
use crate::routes::validation_failed;
use crate::services::{CacheKey, CacheManager, EventType, PostgresClient, SupabaseClient, SupabaseError};

const DEFAULT_HISTORY_LIMIT: u16 = 20;
const MAX_HISTORY_LIMIT: u16 = 100;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub supabase: Arc<SupabaseClient>,
    pub cache: Arc<CacheManager>,
    pub postgres: Arc<PostgresClient>,
    pub matcher: Matcher,
    pub placement: PlacementSettings,
}

/// Configure all placement-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/placements/find", web::post().to(find_placement))
        .route("/placements/history", web::get().to(placement_history))
        .route("/availability", web::post().to(set_availability))
        .route("/availability", web::get().to(get_availability))
        .route("/stats", web::get().to(community_stats))
        .route("/fields", web::get().to(list_fields));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Find placement endpoint
///
/// POST /api/v1/placements/find
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "limit": 20,
///   "excludeMatchIds": ["string"]
/// }
/// ```
async fn find_placement(
    state: web::Data<AppState>,
    req: web::Json<FindPlacementRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let user_id = &req.user_id;
    let limit = state.placement.effective_limit(req.limit);
    let now = Utc::now();

    tracing::info!("Finding placement for user: {}, limit: {}", user_id, limit);

    let profile = match load_profile(&state, user_id).await {
        Ok(profile) => profile,
        Err(SupabaseError::NotFound(message)) => {
            return HttpResponse::NotFound().json(ErrorResponse::new("profile_not_found", message, 404));
        }
        Err(e) => {
            tracing::error!("Failed to fetch profile for {}: {}", user_id, e);
            return HttpResponse::BadGateway().json(ErrorResponse::new(
                "could_not_load_profile",
                e.to_string(),
                502,
            ));
        }
    };
    let preferences = profile.preferences();

    // Matches the player is already on are never recommended again
    let mut excluded = match state.supabase.joined_match_ids(user_id).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!("Failed to fetch joined matches for {}, proceeding without filtering: {}", user_id, e);
            vec![]
        }
    };
    excluded.extend(req.exclude_match_ids.iter().cloned());

    let candidates = match load_candidates(&state, now, limit).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to load candidate matches for {}: {}", user_id, e);
            return HttpResponse::BadGateway().json(ErrorResponse::new(
                "could_not_load_candidates",
                "Could not load candidate matches",
                502,
            ));
        }
    };

    let placement = state
        .matcher
        .find_placement(&preferences, candidates, now, &excluded);

    let offset = state.placement.display_offset();
    let position = preferences.preferred_position;

    let response = match placement {
        Placement::Placed { recommended, alternatives, total_candidates } => {
            if let Err(e) = state
                .postgres
                .record_placement(
                    user_id,
                    &recommended.candidate.id,
                    EventType::Recommended,
                    Some(recommended.score),
                )
                .await
            {
                tracing::warn!("Failed to record recommendation for {}: {}", user_id, e);
            }

            tracing::info!(
                "Recommending match {} (score {}) to user {} from {} candidates",
                recommended.candidate.id,
                recommended.score,
                user_id,
                total_candidates
            );

            PlacementResponse::Placed {
                recommended: placement_view(&recommended, position, offset),
                alternatives: alternatives
                    .iter()
                    .map(|m| placement_view(m, position, offset))
                    .collect(),
                total_candidates,
            }
        }
        Placement::NoMatchesAvailable { total_candidates } => {
            tracing::info!("No matches available for user {} ({} candidates)", user_id, total_candidates);
            PlacementResponse::NoMatchesAvailable { total_candidates }
        }
    };

    HttpResponse::Ok().json(response)
}

/// Set today's availability
///
/// POST /api/v1/availability
async fn set_availability(
    state: web::Data<AppState>,
    req: web::Json<SetAvailabilityRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let (today, _, _) = local_day_bounds(Utc::now(), state.placement.display_offset());

    let availability = Availability {
        user_id: req.user_id.clone(),
        date: today,
        time_slot: req.time_slot,
        status: req.status,
    };

    match state.supabase.upsert_availability(&availability).await {
        Ok(saved) => {
            tracing::info!("User {} is {:?} for {:?} on {}", saved.user_id, saved.status, saved.time_slot, saved.date);
            HttpResponse::Ok().json(saved)
        }
        Err(e) => {
            tracing::error!("Failed to set availability for {}: {}", req.user_id, e);
            HttpResponse::BadGateway().json(ErrorResponse::new(
                "could_not_set_availability",
                e.to_string(),
                502,
            ))
        }
    }
}

/// Get today's availability
///
/// GET /api/v1/availability?userId={userId}
async fn get_availability(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(errors);
    }

    let (today, _, _) = local_day_bounds(Utc::now(), state.placement.display_offset());

    match state.supabase.get_availability(&query.user_id, today).await {
        Ok(availability) => HttpResponse::Ok().json(availability),
        Err(e) => {
            tracing::error!("Failed to fetch availability for {}: {}", query.user_id, e);
            HttpResponse::BadGateway().json(ErrorResponse::new(
                "could_not_load_availability",
                e.to_string(),
                502,
            ))
        }
    }
}

/// Community counters for today
///
/// GET /api/v1/stats
async fn community_stats(state: web::Data<AppState>) -> impl Responder {
    let (today, day_start, day_end) = local_day_bounds(Utc::now(), state.placement.display_offset());

    match state.supabase.community_stats(today, day_start, day_end).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => {
            tracing::error!("Failed to load community stats: {}", e);
            HttpResponse::BadGateway().json(ErrorResponse::new(
                "could_not_load_stats",
                e.to_string(),
                502,
            ))
        }
    }
}

/// Recent placements for a user
///
/// GET /api/v1/placements/history?userId={userId}&limit={limit}
async fn placement_history(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(errors);
    }

    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT) as usize;

    match state.postgres.get_placement_history(&query.user_id, limit, 0).await {
        Ok(placements) => HttpResponse::Ok().json(serde_json::json!({
            "userId": query.user_id,
            "count": placements.len(),
            "placements": placements,
        })),
        Err(e) => {
            tracing::error!("Failed to fetch placement history for {}: {}", query.user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "could_not_load_history",
                e.to_string(),
                500,
            ))
        }
    }
}

/// All playing fields
///
/// GET /api/v1/fields
async fn list_fields(state: web::Data<AppState>) -> impl Responder {
    if let Ok(fields) = state.cache.get::<Vec<Field>>(CacheKey::fields()).await {
        return HttpResponse::Ok().json(fields);
    }

    match state.supabase.list_fields().await {
        Ok(fields) => {
            if let Err(e) = state.cache.set(CacheKey::fields(), &fields).await {
                tracing::warn!("Failed to cache fields: {}", e);
            }
            HttpResponse::Ok().json(fields)
        }
        Err(e) => {
            tracing::error!("Failed to list fields: {}", e);
            HttpResponse::BadGateway().json(ErrorResponse::new(
                "could_not_load_fields",
                e.to_string(),
                502,
            ))
        }
    }
}

async fn load_profile(state: &AppState, user_id: &str) -> Result<PlayerProfile, SupabaseError> {
    let key = CacheKey::profile(user_id);
    if let Ok(profile) = state.cache.get::<PlayerProfile>(&key).await {
        return Ok(profile);
    }

    let profile = state.supabase.get_profile(user_id).await?;
    if let Err(e) = state.cache.set(&key, &profile).await {
        tracing::warn!("Failed to cache profile for {}: {}", user_id, e);
    }

    Ok(profile)
}

async fn load_candidates(
    state: &AppState,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<CandidateMatch>, SupabaseError> {
    let key = CacheKey::candidates(limit);
    if let Ok(candidates) = state.cache.get::<Vec<CandidateMatch>>(&key).await {
        return Ok(candidates);
    }

    let candidates = state.supabase.query_candidate_matches(now, limit).await?;
    if let Err(e) = state.cache.set(&key, &candidates).await {
        tracing::warn!("Failed to cache candidate matches: {}", e);
    }

    Ok(candidates)
}

/// Local calendar date for `now` plus its start and end as UTC instants
fn local_day_bounds(now: DateTime<Utc>, offset: FixedOffset) -> (NaiveDate, DateTime<Utc>, DateTime<Utc>) {
    let date = now.with_timezone(&offset).date_naive();
    let local_midnight = date.and_time(NaiveTime::MIN);
    let start = Utc.from_utc_datetime(&(local_midnight - Duration::seconds(offset.local_minus_utc() as i64)));

    (date, start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_day_bounds_utc() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 15, 0, 0).unwrap();
        let (date, start, end) = local_day_bounds(now, FixedOffset::east_opt(0).unwrap());

        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_local_day_bounds_behind_utc() {
        // 02:00 UTC is still the previous evening in Newark
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 2, 0, 0).unwrap();
        let (date, start, _) = local_day_bounds(now, FixedOffset::west_opt(4 * 3600).unwrap());

        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 16, 4, 0, 0).unwrap());
    }
}
