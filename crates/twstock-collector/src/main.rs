//! Standalone collector CLI.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use twstock_collector::{start_sync_scheduler, SyncOrchestrator};
use twstock_core::{init_logging, AppConfig, LogConfig, DEFAULT_CONFIG_PATH};
use twstock_data::{Database, PgStockStore, TwseClient};

#[derive(Parser)]
#[command(name = "twstock-collector")]
#[command(about = "TWSE/TPEx listing collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// 로그 레벨 (trace, debug, info, warn, error). 설정 파일보다 우선
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 업종/종목 동기화 1회 실행
    Sync,

    /// 저장된 종목의 최신 시세 갱신
    Prices,

    /// 데몬 모드: 매일 지정 시각에 동기화 실행
    Daemon,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config).context("설정 로드 실패")?;

    let mut log_config = LogConfig::from(&config.logging);
    if let Some(level) = cli.log_level {
        log_config.level = level;
    }
    init_logging(log_config).map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "TwStock Collector 시작");

    // DB 연결
    let db = Database::connect(&config.database).await?;
    db.migrate().await?;

    let store = Arc::new(PgStockStore::new(db.clone()).with_case_sensitive(config.search.case_sensitive));
    let gateway = Arc::new(TwseClient::new(&config.remote)?);
    let orchestrator = Arc::new(SyncOrchestrator::new(gateway, store, config.sync.clone()));

    // 명령 실행
    match cli.command {
        Commands::Sync => {
            let stats = orchestrator.run_cycle().await?;
            stats.log_summary("종목 동기화");
        }
        Commands::Prices => {
            let saved = orchestrator.refresh_prices().await?;
            tracing::info!(saved, "시세 갱신 완료");
        }
        Commands::Daemon => {
            let shutdown = CancellationToken::new();
            let scheduler =
                start_sync_scheduler(orchestrator.clone(), config.schedule.clone(), shutdown.clone())?;

            tokio::signal::ctrl_c().await?;
            tracing::info!("종료 신호 수신, 데몬 종료 중...");

            shutdown.cancel();
            scheduler.await?;
        }
    }

    db.pool().close().await;
    tracing::info!("TwStock Collector 종료");

    Ok(())
}
