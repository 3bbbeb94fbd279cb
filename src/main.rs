use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use teammind_placement::config::{LoggingSettings, Settings};
use teammind_placement::core::Matcher;
use teammind_placement::routes::{self, handle_json_payload_error, handle_query_payload_error, AppState};
use teammind_placement::services::{CacheManager, PostgresClient, SupabaseClient};

/// Initialize logging; `RUST_LOG` overrides the configured level
fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();

    init_logging(
        settings
            .as_ref()
            .map(|s| &s.logging)
            .unwrap_or(&LoggingSettings::default()),
    );

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    info!("Starting TeamMind placement service...");

    let supabase = SupabaseClient::new(
        settings.supabase.url.clone(),
        settings.supabase.api_key.clone(),
        settings.supabase.timeout_secs.unwrap_or(10),
    )
    .map_err(|e| {
        error!("Failed to create backend client: {}", e);
        std::io::Error::other(e.to_string())
    })?;
    let supabase = Arc::new(supabase);

    info!("Backend client initialized for {}", settings.supabase.url);

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(30);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    // Redis is optional; fall back to the in-process tier
    let cache = match CacheManager::new(settings.cache.redis_url.as_deref(), l1_cache_size, cache_ttl).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to connect to Redis ({}), running with in-process cache only", e);
            CacheManager::local(l1_cache_size, cache_ttl)
        }
    };
    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s, Redis: {})",
        l1_cache_size,
        cache_ttl,
        cache.has_redis()
    );
    let cache = Arc::new(cache);

    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::io::Error::other(format!("PostgreSQL connection error: {}", e))
    })?;
    let postgres = Arc::new(postgres);

    info!("Placement history database ready");

    let weights = settings.scoring_weights();
    let matcher = Matcher::new(weights, settings.placement.alternatives);

    info!("Matcher initialized with weights: {:?}", weights);

    let app_state = AppState {
        supabase,
        cache,
        postgres,
        matcher,
        placement: settings.placement.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
