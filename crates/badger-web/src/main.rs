//! Badger 徽章站点服务入口

use std::time::Duration;

use badger_shared::{
    config::{AppConfig, StorageBackend},
    database::Database,
    observability,
};
use badger_web::{AppState, app, repository::MemoryRepository};
use sqlx::migrate::Migrator;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

static MIGRATOR: Migrator = sqlx::migrate!();

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("badger-web")?;
    let _guard = observability::init(&config.observability, &config.service_name).await?;

    info!(
        environment = %config.environment,
        backend = ?config.storage.backend,
        "Starting badger-web on {}",
        config.server_addr()
    );

    if config.is_production()
        && config.auth.jwt_secret == badger_shared::config::AuthConfig::default().jwt_secret
    {
        anyhow::bail!("production environment requires BADGER_AUTH__JWT_SECRET");
    }

    let state = match config.storage.backend {
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database).await?;
            if config.database.run_migrations {
                db.run_migrations(&MIGRATOR).await?;
            }
            AppState::postgres(db, config.site.clone(), config.auth.clone())
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage, data is lost on restart");
            AppState::in_memory(MemoryRepository::new(), config.site.clone(), config.auth.clone())
        }
    };

    let db = state.db.clone();
    let app = app(state, Duration::from_secs(config.server.request_timeout_seconds));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }
    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 后返回，触发 axum 的优雅关闭流程。
/// 信号处理器注册失败时只记录日志，对应分支永不完成。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
