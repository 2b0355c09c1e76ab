//! Reusable ChargeHub server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, database and
//! migrations, optional demo seeding, the REST API with its notification
//! WebSocket, and graceful shutdown.

use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::events::{create_event_bus, SharedEventBus};
use crate::application::services::seed_demo_data;
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::init_database;
use crate::interfaces::http::{create_api_router, ApiState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting ChargeHub.
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Load demo data even when the database already has stations.
    pub force_seed: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            force_seed: false,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running ChargeHub server.
pub struct ServerHandle {
    /// Shared event bus for admin notifications.
    pub event_bus: SharedEventBus,
    /// Repository provider for data access.
    pub repos: Arc<dyn RepositoryProvider>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Port the API is listening on.
    pub port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

/// The global recorder can only be installed once per process; later starts reuse it.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder unavailable, /metrics will be empty");
                None
            }
        })
        .clone()
}

impl ServerHandle {
    /// Start ChargeHub with the given options.
    ///
    /// This will:
    /// 1. Install the Prometheus metrics recorder
    /// 2. Connect to the database and run migrations
    /// 3. Seed demo data when configured and the database is empty
    /// 4. Start the REST API (Swagger UI, notification WebSocket)
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;

        info!("Starting ChargeHub...");

        let prometheus = prometheus_handle();

        // ── Build sub-configs ──────────────────────────────────
        let db_config = app_cfg.database.to_database_config();
        let jwt_config = app_cfg.security.to_jwt_config();
        if app_cfg.security.uses_default_secret() {
            warn!("security.jwt_secret is the built-in default; set it before exposing the API");
        }

        // ── Database ───────────────────────────────────────────
        let db = init_database(&db_config).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        // ── State, event bus, shutdown ─────────────────────────
        let event_bus = create_event_bus();
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let state = ApiState::new(
            db.clone(),
            jwt_config,
            event_bus.clone(),
            shutdown_signal.clone(),
            prometheus,
        );
        let repos = state.repos.clone();

        if opts.force_seed || app_cfg.seed.on_startup {
            seed_if_needed(repos.as_ref(), opts.force_seed).await?;
        }

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(state);

        let port = app_cfg.server.port;
        let api_addr = app_cfg.server.address();
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        info!("REST API server listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            event_bus,
            repos,
            config: app_cfg,
            port,
            db,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the API to drain after shutdown has been triggered, then close the database.
    pub async fn wait(self) {
        info!("Waiting for server tasks to complete...");

        let Self {
            db,
            shutdown,
            api_task,
            ..
        } = self;

        let drained = shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
            })
            .await;
        if !drained {
            warn!("In-flight requests were abandoned");
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }

        info!("ChargeHub shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down ChargeHub...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if the API task is still running.
    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Seed the demo catalogue into an empty database, or unconditionally when `force`.
///
/// Seeding upserts by id, so re-running it restores the demo rows.
async fn seed_if_needed(
    repos: &dyn RepositoryProvider,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let existing = repos.stations().count().await?;
    if existing > 0 && !force {
        info!(stations = existing, "Database already has stations, skipping demo seed");
        return Ok(());
    }

    let report = seed_demo_data(repos).await?;
    info!(
        stations = report.stations,
        payments = report.payments,
        "Demo data loaded"
    );
    Ok(())
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
/// `log` records from the repositories are bridged into the same subscriber.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_database;
    use crate::infrastructure::SeaOrmRepositoryProvider;

    #[tokio::test]
    async fn seed_skips_populated_database() {
        let repos = SeaOrmRepositoryProvider::new(test_database().await);
        seed_if_needed(&repos, false).await.unwrap();
        assert_eq!(repos.stations().count().await.unwrap(), 3);

        repos.stations().delete("station-3").await.unwrap();
        seed_if_needed(&repos, false).await.unwrap();
        assert_eq!(repos.stations().count().await.unwrap(), 2);

        seed_if_needed(&repos, true).await.unwrap();
        assert_eq!(repos.stations().count().await.unwrap(), 3);
    }
}
