//! Indexkeeper API - search index administration and schema migrations
//!
//! Two admin surfaces share one server:
//! - Search index admin: list, create, update, rebuild and delete indexes
//!   through the configured index provider, with per-user notifications.
//! - Data migrations: turn alter-column and add-index commands into SQL for
//!   the configured data provider. The MySQL builder consults the live
//!   schema to keep composite index keys within the 767 byte limit.

mod auth;
mod config;
mod error;
mod indexing;
mod migration;
mod models;
mod routes;
mod state;

use crate::config::Settings;
use crate::indexing::{
    DefaultIndexingService, IndexAdmin, IndexManager, IndexProvider, MemoryIndexProvider,
};
use crate::migration::{
    MigrationRunner, MySqlCatalog, SchemaCatalog, StatementBuilder, TablePrefix,
};
use crate::routes::create_router;
use crate::state::AppState;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("Starting Indexkeeper...");

    // Load configuration
    let settings = Settings::load()?;
    info!("Configuration loaded successfully");

    let pool = init_database_pool(&settings)?;
    let migrations = init_migrations(&settings, pool);

    // Search indexes live in process
    let provider: Arc<dyn IndexProvider> = Arc::new(MemoryIndexProvider::new());
    info!(provider = provider.name(), "Index provider ready");
    let manager = IndexManager::new(Some(provider));
    let service = Arc::new(DefaultIndexingService::new(manager.clone()));
    let index_admin = IndexAdmin::new(manager, service);

    let state = Arc::new(AppState::new(
        index_admin,
        migrations,
        settings.auth.jwt_secret.clone(),
    ));

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("Server listening on http://{}", addr);
    info!("   GET  /admin/indexing/index          - List indexes");
    info!("   POST /admin/indexing/create         - Create an index (owner)");
    info!("   POST /admin/indexing/update         - Update an index (owner)");
    info!("   POST /admin/indexing/rebuild        - Rebuild an index (owner)");
    info!("   POST /admin/indexing/delete         - Delete an index (owner)");
    info!("   POST /admin/migrations/statements   - Preview migration SQL (owner)");
    info!("   POST /admin/migrations/apply        - Execute migration SQL (owner)");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,indexkeeper=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Lazy pool for the migration target; connections open on first use
fn init_database_pool(settings: &Settings) -> anyhow::Result<Option<MySqlPool>> {
    let Some(database) = &settings.database else {
        info!("DATABASE_URL not set, migrations will not be executed");
        return Ok(None);
    };

    let pool = MySqlPoolOptions::new()
        .max_connections(database.max_pool_size)
        .connect_lazy(&database.url)?;

    info!(
        host = %database.host,
        port = database.port,
        database = %database.database,
        "Database pool configured"
    );
    Ok(Some(pool))
}

fn init_migrations(settings: &Settings, pool: Option<MySqlPool>) -> Option<MigrationRunner> {
    let catalog = pool
        .clone()
        .map(|pool| Arc::new(MySqlCatalog::new(pool)) as Arc<dyn SchemaCatalog>);
    let prefix = TablePrefix::from(settings.migration.table_prefix.clone());

    match StatementBuilder::for_provider(&settings.migration.data_provider, prefix, catalog) {
        Some(builder) => {
            info!(
                data_provider = builder.data_provider(),
                "Migration statement builder ready"
            );
            Some(MigrationRunner::new(builder, pool))
        }
        None => {
            warn!(
                data_provider = %settings.migration.data_provider,
                "Data provider needs DATABASE_URL, migration endpoints are disabled"
            );
            None
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
