//! Health checks
//!
//! Checks the store, the database pool when one is configured, and photo
//! storage. Reports are cached briefly so frequent checks cannot hammer the database.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use bt_attachments::Storage;
use bt_db::{Database, Store};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }

    fn worst(self, other: HealthStatus) -> HealthStatus {
        match (self, other) {
            (Self::Unhealthy, _) | (_, Self::Unhealthy) => Self::Unhealthy,
            (Self::Degraded, _) | (_, Self::Degraded) => Self::Degraded,
            _ => Self::Healthy,
        }
    }
}

/// Individual component health
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Overall health report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Health checker configuration
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Timeout for individual health checks
    pub check_timeout: Duration,
    /// Cache duration for health results
    pub cache_duration: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(5),
            cache_duration: Duration::from_secs(10),
        }
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

/// Health checker service
pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
    cache: RwLock<Option<CachedHealth>>,
    store: Arc<dyn Store>,
    photo_storage: Arc<dyn Storage>,
    database: Option<Database>,
}

impl HealthChecker {
    pub fn new(config: HealthConfig, store: Arc<dyn Store>, photo_storage: Arc<dyn Storage>) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            cache: RwLock::new(None),
            store,
            photo_storage,
            database: None,
        }
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// Get cached health or perform checks
    pub async fn check(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.cached_at.elapsed() < self.config.cache_duration {
                    debug!("Returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let report = self.perform_checks().await;

        let mut cache = self.cache.write().await;
        *cache = Some(CachedHealth {
            report: report.clone(),
            cached_at: Instant::now(),
        });

        report
    }

    async fn perform_checks(&self) -> HealthReport {
        let mut components = Vec::new();

        if let Some(ref database) = self.database {
            components.push(self.check_database(database).await);
        }
        components.push(self.check_store().await);
        components.push(self.check_photo_storage().await);

        let status = components
            .iter()
            .fold(HealthStatus::Healthy, |acc, c| acc.worst(c.status));
        if status != HealthStatus::Healthy {
            warn!(?status, "Health check found a problem");
        }

        HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components,
            timestamp: chrono::Utc::now(),
        }
    }

    async fn check_database(&self, database: &Database) -> ComponentHealth {
        let start = Instant::now();
        let (status, message) = match tokio::time::timeout(self.config.check_timeout, database.ping()).await {
            Ok(Ok(())) => (HealthStatus::Healthy, "Connected".to_string()),
            Ok(Err(e)) => (HealthStatus::Unhealthy, e.to_string()),
            Err(_) => (HealthStatus::Unhealthy, "Timed out".to_string()),
        };
        let stats = database.stats();

        ComponentHealth {
            name: "database".to_string(),
            status,
            message: Some(message),
            response_time_ms: start.elapsed().as_millis() as u64,
            details: Some(serde_json::json!({
                "type": "postgresql",
                "poolSize": stats.size,
                "idleConnections": stats.idle,
            })),
        }
    }

    async fn check_store(&self) -> ComponentHealth {
        let start = Instant::now();
        let (status, message, details) =
            match tokio::time::timeout(self.config.check_timeout, self.store.count_users()).await {
                Ok(Ok(users)) => (
                    HealthStatus::Healthy,
                    "Readable".to_string(),
                    Some(serde_json::json!({ "users": users })),
                ),
                Ok(Err(e)) => (HealthStatus::Unhealthy, e.to_string(), None),
                Err(_) => (HealthStatus::Unhealthy, "Timed out".to_string(), None),
            };

        ComponentHealth {
            name: "store".to_string(),
            status,
            message: Some(message),
            response_time_ms: start.elapsed().as_millis() as u64,
            details,
        }
    }

    /// Storage trouble only costs photos, so it degrades rather than fails
    async fn check_photo_storage(&self) -> ComponentHealth {
        let start = Instant::now();
        let (status, message) = match self.photo_storage.exists("health/check").await {
            Ok(_) => (HealthStatus::Healthy, "Available".to_string()),
            Err(e) => (HealthStatus::Degraded, e.to_string()),
        };

        ComponentHealth {
            name: "photo_storage".to_string(),
            status,
            message: Some(message),
            response_time_ms: start.elapsed().as_millis() as u64,
            details: Some(serde_json::json!({ "backend": self.photo_storage.name() })),
        }
    }
}

/// State shared by the health routes
pub struct HealthState {
    pub health: Arc<HealthChecker>,
}

/// Liveness: the process answers
pub async fn liveness() -> &'static str {
    "OK"
}

/// Readiness: every component answers
pub async fn readiness(State(state): State<Arc<HealthState>>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.check().await;
    (report.http_status(), Json(report))
}

/// GET /health
pub async fn health(State(state): State<Arc<HealthState>>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.check().await;
    (report.http_status(), Json(report))
}
