//! Jif-Tube API 서버.
//!
//! 같은 리스너에서 `/api` REST 엔드포인트와 SPA 정적 번들을 제공합니다.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use jif_api::repository::{InMemoryUserRepository, PgUserRepository, UserRepository};
use jif_api::spa::SpaAssets;
use jif_api::state::AppState;
use jif_core::{init_logging, AppConfig, DatabaseConfig, JifError, JifResult, LogConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있으면)
    dotenvy::dotenv().ok();

    let config = load_config()?;

    init_logging(LogConfig::from_settings(&config.logging))?;

    info!(
        service = jif_core::SERVICE_NAME,
        version = jif_core::SERVICE_VERSION,
        "Starting API server"
    );

    let users = connect_users(&config.database).await?;

    let state = Arc::new(AppState::from_config(&config.auth, users));
    info!(
        version = %state.version,
        backend = state.users.backend(),
        issuer = state.tokens.issuer(),
        "Application state initialized"
    );

    // 정적 번들이 없으면 시작하지 않음
    let assets = SpaAssets::from_config(&config.static_files).map_err(JifError::from)?;

    let app = jif_api::create_app(state, assets);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// 설정 로드. JIF_CONFIG가 있으면 해당 파일을 사용합니다.
fn load_config() -> JifResult<AppConfig> {
    let config = match std::env::var_os("JIF_CONFIG") {
        Some(path) => AppConfig::load(Some(PathBuf::from(path).as_path()))?,
        None => AppConfig::load_default()?,
    };
    Ok(config)
}

/// 사용자 저장소 연결. URL이 없으면 인메모리 저장소를 사용합니다.
async fn connect_users(config: &DatabaseConfig) -> JifResult<Arc<dyn UserRepository>> {
    let Some(url) = config.url.as_deref() else {
        warn!("database.url not set, using in-memory user repository");
        return Ok(Arc::new(InMemoryUserRepository::new()));
    };

    info!("Connecting to database...");
    let repo = PgUserRepository::connect(url, config).await?;
    repo.init_schema().await?;
    info!("Database connected");

    Ok(Arc::new(repo))
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
