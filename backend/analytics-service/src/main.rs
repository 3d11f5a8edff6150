use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analytics_service::analytics::AnalyticsStore;
use analytics_service::config::Config;
use analytics_service::db::{MangaRepo, PostgresEventStore};
use analytics_service::handlers::{similar, suggestions, trending, AnalyticsHandlerState};
use analytics_service::jobs::start_trending_decay;
use analytics_service::metrics::serve_metrics;
use analytics_service::security::TokenVerifier;
use analytics_service::storage::CoverStorage;
use analytics_service::tracking::{ingest, Enricher, TrackingState};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,analytics_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Failed to load configuration")?;

    info!(
        "Starting analytics-service v{} ({})",
        env!("CARGO_PKG_VERSION"),
        config.app.env
    );

    // Database pool (standardized sizing)
    let mut db_cfg = db_pool::DbConfig::for_service("analytics-service");
    if db_cfg.database_url.is_empty() {
        db_cfg.database_url = config.database.url.clone();
    }
    db_cfg.max_connections = std::cmp::max(db_cfg.max_connections, config.database.max_connections);
    db_cfg.log_config();

    let db_pool = db_pool::create_pool(db_cfg)
        .await
        .context("Failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run migrations")?;
    info!("Migrations completed");

    // Redis connection manager (shared, reconnecting)
    let redis_client =
        redis::Client::open(config.redis.url.as_str()).context("Invalid REDIS_URL")?;
    let redis_conn = ConnectionManager::new(redis_client)
        .await
        .context("Failed to connect to Redis")?;

    // Token verification is best-effort: without a key every tracked event
    // is anonymous, which is a legal mode for the tracking endpoint.
    let verifier = match &config.auth.jwt_public_key_pem {
        Some(pem) => match TokenVerifier::from_rsa_pem(pem) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, "invalid JWT public key, tracking will be anonymous");
                None
            }
        },
        None => {
            warn!("JWT_PUBLIC_KEY_PEM not set, tracking will be anonymous");
            None
        }
    };

    let covers = CoverStorage::from_config(&config.storage).await;

    let store = Arc::new(AnalyticsStore::new(
        redis_conn,
        MangaRepo::new(db_pool.clone()),
    ));

    let enricher: Arc<dyn Enricher> = store.clone();
    let tracking_state = web::Data::new(TrackingState {
        store: Arc::new(PostgresEventStore::new(db_pool.clone())),
        enricher: Some(enricher),
        verifier,
    });

    let analytics_state = web::Data::new(AnalyticsHandlerState {
        store: store.clone(),
        covers,
    });

    // Hourly trending decay, stopped by the shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(start_trending_decay(store.clone(), shutdown_rx));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(tracking_state.clone())
            .app_data(analytics_state.clone())
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/api/v1/health/live", web::get().to(|| async { "OK" }))
            .route("/api/v1/health/ready", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(serve_metrics))
            .service(ingest)
            .service(
                web::scope("/api/v1/analytics")
                    .service(trending)
                    .service(suggestions)
                    .service(similar),
            )
    })
    .bind(("0.0.0.0", config.app.port))
    .with_context(|| format!("Failed to bind 0.0.0.0:{}", config.app.port))?
    .run();

    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
        server_handle.stop(true).await;
    });

    server.await.context("HTTP server failed")?;
    info!("analytics-service stopped");

    Ok(())
}
