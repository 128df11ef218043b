use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fleet_monitor::config::EnvironmentConfig;
use fleet_monitor::database::{self, mask_database_url};
use fleet_monitor::repositories::{FleetStore, MemoryFleetStore, PgFleetStore};
use fleet_monitor::{app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fleet_monitor=debug,tower_http=debug")),
        )
        .init();

    info!("🚗 Fleet Monitor API");

    let config = EnvironmentConfig::from_env()?;
    info!(environment = %config.environment, "⚙️ Configuration loaded");

    let store: Arc<dyn FleetStore> = match &config.database {
        Some(db) => {
            info!("🐘 Connecting to {}", mask_database_url(&db.url));
            let pool = database::connect(db).await.map_err(|e| {
                error!("❌ Database connection failed: {}", e);
                e
            })?;
            info!("✅ Database ready, migrations applied");
            Arc::new(PgFleetStore::new(pool))
        }
        None => {
            warn!("⚠️ DATABASE_URL not set, using the in-memory store; data is lost on exit");
            Arc::new(MemoryFleetStore::new())
        }
    };

    let addr = format!("{}:{}", config.host, config.port);
    let server_url = config.server_url();
    let app = app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 Listening on {}", server_url);
    info!("   GET  /health");
    info!("   POST /api/auth/login | /api/auth/register");
    info!("   /api/cars /api/drivers /api/trips /api/maintenances /api/dashboard/summary");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("🛑 Ctrl+C received, shutting down"),
        _ = terminate => info!("🛑 SIGTERM received, shutting down"),
    }
}
