//! OKX 수익 추적 봇 CLI.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracker_bot::{BotError, ReportCommandHandler, TelegramPoller};
use tracker_core::config::AppConfig;
use tracker_core::logging::init_logging_from_settings;
use tracker_exchange::{OkxClient, OkxConfig};
use tracker_report::{ProfitSync, Reporting};
use tracker_store::Database;

#[derive(Parser)]
#[command(name = "tracker-bot")]
#[command(about = "OKX Profit Tracker Telegram Bot", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로
    #[arg(long, default_value = "config/default.toml")]
    config: String,

    /// 로그 레벨 재정의 (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 봇 실행: 텔레그램 폴링 + 주기적 수익 동기화
    Run,

    /// 수익 동기화 1회 실행 후 종료
    SyncOnce,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 설정 로드
    let mut config = AppConfig::load(&cli.config)?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    // 로깅 초기화
    init_logging_from_settings(&config.logging)?;

    tracing::info!("OKX Profit Tracker 시작");
    tracing::debug!(okx = ?config.okx, "설정 로드 완료");

    // DB 연결
    let db = Database::new(&config.database.path).await?;

    if config.okx.api_key.is_empty() {
        tracing::warn!("OKX API 키가 설정되지 않았습니다. 잔고/체결 조회는 실패합니다");
    }

    let okx_config = OkxConfig::new(
        config.okx.api_key.clone(),
        config.okx.secret_key.clone(),
        config.okx.passphrase.clone(),
    )
    .with_base_url(config.okx.base_url.clone())
    .with_timeout_secs(config.okx.timeout_secs);
    let client = OkxClient::new(okx_config)?;

    let registry = config.bot_registry();
    tracing::info!(bots = registry.len(), "봇 레지스트리 구성 완료");

    match cli.command {
        Commands::SyncOnce => {
            let sync = ProfitSync::new(db.clone(), client, registry, config.sync.lookback_days);
            let stats = sync.run_once().await?;
            stats.log_summary("수익 동기화");
        }
        Commands::Run => {
            if config.telegram.bot_token.is_empty() {
                return Err(BotError::InvalidConfig(
                    "telegram.bot_token이 비어 있습니다".to_string(),
                )
                .into());
            }

            let reporting = Arc::new(Reporting::new(
                db.clone(),
                client.clone(),
                registry.clone(),
            ));
            let handler = Arc::new(ReportCommandHandler::new(reporting));
            let poller = TelegramPoller::new(config.telegram.clone(), handler);

            let sync = ProfitSync::new(db.clone(), client, registry, config.sync.lookback_days);

            // 첫 tick은 즉시 발생하므로 시작 직후 1회 동기화됩니다.
            let mut interval = tokio::time::interval(config.sync.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(
                "=== 봇 시작 (동기화 주기: {}분) ===",
                config.sync.interval_minutes
            );

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("종료 신호 수신, 봇 종료 중...");
                }
                _ = poller.start_polling() => {}
                _ = async {
                    loop {
                        interval.tick().await;
                        match sync.run_once().await {
                            Ok(stats) => {
                                stats.log_summary("수익 동기화");
                            }
                            Err(e) => {
                                tracing::error!("수익 동기화 실패: {}", e);
                            }
                        }
                    }
                } => {}
            }
        }
    }

    db.close().await;
    tracing::info!("OKX Profit Tracker 종료");

    Ok(())
}
