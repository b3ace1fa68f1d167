//! TwStock API 서버 진입점.
//!
//! 조회 API와 일일 동기화 스케줄러를 한 프로세스에서 실행합니다.

use anyhow::Context;
use axum::{http::StatusCode, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use twstock_api::{create_api_router, AppState};
use twstock_collector::{start_sync_scheduler, SyncOrchestrator};
use twstock_core::{init_logging, AppConfig, LogConfig};
use twstock_data::{Database, PgStockStore, StockStore, TwseClient};

/// CORS 레이어 생성.
///
/// # 환경변수
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => AllowOrigin::any(),
    };

    // 읽기 전용 API
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

fn create_router(state: Arc<AppState>) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("TWSTOCK_CONFIG")
        .unwrap_or_else(|_| twstock_core::DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load(&config_path).context("설정 로드 실패")?;

    init_logging(LogConfig::from(&config.logging)).map_err(|e| anyhow::anyhow!(e))?;

    info!("Starting TwStock API server...");

    // 저장소
    let db = Database::connect(&config.database).await?;
    db.migrate().await?;
    let store: Arc<dyn StockStore> =
        Arc::new(PgStockStore::new(db.clone()).with_case_sensitive(config.search.case_sensitive));

    // 동기화 오케스트레이터
    let gateway = Arc::new(TwseClient::new(&config.remote)?);
    let orchestrator = Arc::new(SyncOrchestrator::new(
        gateway,
        store.clone(),
        config.sync.clone(),
    ));

    let state = Arc::new(AppState::new(store, &config.search).with_sync(orchestrator.clone()));
    info!(version = %state.version, "Application state initialized");

    // 전역 종료 토큰 (백그라운드 태스크에 종료 전파)
    let shutdown_token = CancellationToken::new();

    let scheduler = start_sync_scheduler(
        orchestrator,
        config.schedule.clone(),
        shutdown_token.clone(),
    )?;

    let app = create_router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("주소 바인딩 실패: {}", addr))?;
    info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    shutdown_token.cancel();

    // 스케줄러 종료 대기 (최대 10초)
    if tokio::time::timeout(Duration::from_secs(10), scheduler)
        .await
        .is_err()
    {
        warn!("Scheduler shutdown timeout, forcing shutdown");
    }

    db.pool().close().await;
    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
