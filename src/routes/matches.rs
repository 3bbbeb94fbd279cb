use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;

use crate::core::{check_new_match, match_details_view};
use crate::models::{
    CreateMatchRequest, ErrorResponse, JoinMatchRequest, JoinMatchResponse, LeaveTeamResponse, NewMatch,
};
use crate::routes::{validation_failed, AppState};
use crate::services::{CacheKey, EventType, SupabaseError};

/// Configure match and team routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/matches", web::post().to(create_match))
        .route("/matches/{match_id}", web::get().to(match_details))
        .route("/matches/{match_id}/join", web::post().to(join_match))
        .route("/teams/{team_id}/members/{user_id}", web::delete().to(leave_team));
}

/// Create match endpoint
///
/// POST /api/v1/matches
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "fieldId": "string",
///   "scheduledAt": "2026-10-17T22:30:00Z",
///   "maxPlayers": 14,
///   "skillLevel": "intermediate",
///   "matchType": "casual",
///   "isPublic": true
/// }
/// ```
async fn create_match(
    state: web::Data<AppState>,
    req: web::Json<CreateMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let new_match = NewMatch::from(req.into_inner());

    if let Err(rule) = check_new_match(&new_match, Utc::now()) {
        tracing::info!("Refusing match from {}: {}", new_match.created_by, rule);
        return HttpResponse::BadRequest().json(ErrorResponse::new(rule.code(), rule.to_string(), 400));
    }

    let details = match state.supabase.create_match(&new_match).await {
        Ok(details) => details,
        Err(e) => {
            tracing::error!("Failed to create match for {}: {}", new_match.created_by, e);
            return HttpResponse::BadGateway().json(ErrorResponse::new(
                "could_not_create_match",
                e.to_string(),
                502,
            ));
        }
    };

    // New public match is a fresh candidate
    if let Err(e) = state.cache.invalidate_pattern(CacheKey::all_candidates()).await {
        tracing::warn!("Failed to invalidate candidate cache: {}", e);
    }

    tracing::info!(
        "User {} created match {} at {}",
        new_match.created_by,
        details.candidate.id,
        new_match.field_id
    );

    HttpResponse::Created().json(match_details_view(details, state.placement.display_offset()))
}

/// Match details endpoint
///
/// GET /api/v1/matches/{matchId}
async fn match_details(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let match_id = path.into_inner();

    match state.supabase.get_match_details(&match_id).await {
        Ok(details) => HttpResponse::Ok().json(match_details_view(details, state.placement.display_offset())),
        Err(SupabaseError::NotFound(message)) => {
            HttpResponse::NotFound().json(ErrorResponse::new("match_not_found", message, 404))
        }
        Err(e) => {
            tracing::error!("Failed to load match {}: {}", match_id, e);
            HttpResponse::BadGateway().json(ErrorResponse::new(
                "could_not_load_match",
                e.to_string(),
                502,
            ))
        }
    }
}

/// Join match endpoint
///
/// POST /api/v1/matches/{matchId}/join
///
/// Request body:
/// ```json
/// { "userId": "string" }
/// ```
async fn join_match(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<JoinMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let match_id = path.into_inner();
    let user_id = &req.user_id;

    let candidate = match state.supabase.get_match(&match_id).await {
        Ok(candidate) => candidate,
        Err(SupabaseError::NotFound(message)) => {
            return HttpResponse::NotFound().json(ErrorResponse::new("match_not_found", message, 404));
        }
        Err(e) => {
            tracing::error!("Failed to fetch match {}: {}", match_id, e);
            return HttpResponse::BadGateway().json(ErrorResponse::new(
                "could_not_load_match",
                e.to_string(),
                502,
            ));
        }
    };

    if candidate.is_full() {
        return HttpResponse::Conflict().json(ErrorResponse::new(
            "match_full",
            format!("Match {} has no open slots", match_id),
            409,
        ));
    }

    match state.supabase.join_match(&match_id, user_id).await {
        Ok(()) => {}
        Err(SupabaseError::Conflict(message)) => {
            return HttpResponse::Conflict().json(ErrorResponse::new("already_joined", message, 409));
        }
        Err(e) => {
            tracing::error!("Failed to join match {} for {}: {}", match_id, user_id, e);
            return HttpResponse::BadGateway().json(ErrorResponse::new(
                "could_not_join_match",
                e.to_string(),
                502,
            ));
        }
    }

    if let Err(e) = state
        .postgres
        .record_placement(user_id, &match_id, EventType::Joined, None)
        .await
    {
        tracing::warn!("Joined match {} but history recording failed: {}", match_id, e);
    }

    // Headcounts changed
    if let Err(e) = state.cache.invalidate_pattern(CacheKey::all_candidates()).await {
        tracing::warn!("Failed to invalidate candidate cache: {}", e);
    }

    tracing::info!("User {} joined match {}", user_id, match_id);

    HttpResponse::Ok().json(JoinMatchResponse {
        success: true,
        match_id,
        open_slots: candidate.open_slots().saturating_sub(1),
    })
}

/// Leave team endpoint
///
/// DELETE /api/v1/teams/{teamId}/members/{userId}
async fn leave_team(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (team_id, user_id) = path.into_inner();

    match state.supabase.leave_team(&team_id, &user_id).await {
        Ok(()) => {
            tracing::info!("User {} left team {}", user_id, team_id);
            HttpResponse::Ok().json(LeaveTeamResponse {
                success: true,
                team_id,
                user_id,
            })
        }
        Err(SupabaseError::NotFound(message)) => {
            HttpResponse::NotFound().json(ErrorResponse::new("not_on_team", message, 404))
        }
        Err(e) => {
            tracing::error!("Failed to remove {} from team {}: {}", user_id, team_id, e);
            HttpResponse::BadGateway().json(ErrorResponse::new(
                "could_not_leave_team",
                e.to_string(),
                502,
            ))
        }
    }
}
