//! BuildTrack Server
//!
//! Serves the JSON API, health checks and metrics. Runs on PostgreSQL when
//! a database URL is configured and reachable, otherwise on the in-memory
//! store.

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bt_api::AppState;
use bt_attachments::{LocalStorage, MemoryStorage, Storage};
use bt_auth::{hash_password, MemorySessionStore};
use bt_core::config::AppConfig;
use bt_db::{seed_demo_data, Database, MemoryStore, PgStore, Store};
use bt_models::fixtures::{self, DEMO_PASSWORD};

mod health;
mod metrics;
mod settings;

use health::{HealthChecker, HealthConfig, HealthState};
use metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = settings::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting BuildTrack"
    );

    let (store, database) = open_store(&config).await;

    if config.instance.seed_demo_data {
        let hash = hash_password(DEMO_PASSWORD)?;
        let users = fixtures::users()
            .into_iter()
            .map(|u| u.with_password_hash(hash.clone()))
            .collect();
        if seed_demo_data(store.as_ref(), users).await? {
            info!("Demo data loaded");
        }
    }

    let photo_storage: Arc<dyn Storage> = if config.storage.local_path.trim().is_empty() {
        Arc::new(MemoryStorage::new())
    } else {
        Arc::new(LocalStorage::new(&config.storage.local_path))
    };

    let mut checker = HealthChecker::new(HealthConfig::default(), store.clone(), photo_storage.clone());
    if let Some(database) = database.clone() {
        checker = checker.with_database(database);
    }
    let health_state = Arc::new(HealthState {
        health: Arc::new(checker),
    });
    let metrics = Arc::new(Metrics::new());

    let addr = config.server_addr()?;
    let api_state = AppState::new(
        config,
        store,
        Arc::new(MemorySessionStore::new()),
        photo_storage,
    );
    let app = build_router(api_state, health_state, metrics);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(database) = database {
        database.close().await;
    }
    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,bt_server=debug,bt_api=debug,tower_http=debug".into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// PostgreSQL when configured and reachable, else the in-memory store
async fn open_store(config: &AppConfig) -> (Arc<dyn Store>, Option<Database>) {
    if !config.uses_database() {
        info!("No database configured, using the in-memory store");
        return (Arc::new(MemoryStore::new()), None);
    }

    let database = match Database::connect(&config.database).await {
        Ok(database) => database,
        Err(e) => {
            warn!(error = %e, "Failed to connect to database, using the in-memory store");
            return (Arc::new(MemoryStore::new()), None);
        }
    };

    if config.database.run_migrations {
        if let Err(e) = database.migrate().await {
            warn!(error = %e, "Migrations failed, using the in-memory store");
            database.close().await;
            return (Arc::new(MemoryStore::new()), None);
        }
    }

    info!("Connected to database");
    (Arc::new(PgStore::new(database.pool().clone())), Some(database))
}

fn build_router(api: AppState, health_state: Arc<HealthState>, metrics: Arc<Metrics>) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health_state);

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/metrics.json", get(metrics::json_metrics))
        .with_state(metrics.clone());

    Router::new()
        .merge(health_routes)
        .merge(metrics_routes)
        .merge(bt_api::app(api))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .layer(middleware::from_fn_with_state(
            metrics,
            metrics::metrics_middleware,
        ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let photo_storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let checker = HealthChecker::new(HealthConfig::default(), store.clone(), photo_storage.clone());
        let api = AppState::new(
            AppConfig::default(),
            store,
            Arc::new(MemorySessionStore::new()),
            photo_storage,
        );

        build_router(
            api,
            Arc::new(HealthState {
                health: Arc::new(checker),
            }),
            Arc::new(Metrics::new()),
        )
    }

    async fn get(app: &Router, uri: &str) -> StatusCode {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = test_app();
        assert_eq!(get(&app, "/health").await, StatusCode::OK);
        assert_eq!(get(&app, "/health/live").await, StatusCode::OK);
        assert_eq!(get(&app, "/health/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_is_mounted() {
        let app = test_app();
        assert_eq!(get(&app, "/api").await, StatusCode::OK);
        assert_eq!(get(&app, "/api/projects").await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_metrics_count_requests() {
        let app = test_app();
        get(&app, "/api/projects").await;

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("buildtrack_rejections_total{reason=\"unauthorized\"} 1"));
    }
}
