//! 시장 상관관계 대시보드 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 시가총액 상위 암호화폐 목록
//! pulse top --limit 20
//!
//! # 현재 Fear & Greed 심리 지수
//! pulse sentiment
//!
//! # 암호화폐 + 카테고리 지수 + 전통 시장 상관행렬
//! pulse correlate
//! pulse correlate --symbols BTC,ETH,SOL
//!
//! # S&P 500 대비 30일 롤링 상관계수
//! pulse rolling --symbol BTC --window 30
//! ```

use clap::{Parser, Subcommand};
use tracing::{debug, warn};

mod commands;

use pulse_core::{init_logging, AppConfig, LogConfig, LogFormat};
use pulse_data::MarketDataManager;

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Crypto/macro market correlation dashboard", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 시가총액 상위 암호화폐 목록 보기
    Top {
        /// 표시할 개수 (기본값: 설정의 top_n_crypto)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// 현재 Fear & Greed 심리 지수 보기
    Sentiment,

    /// 시장 전체 상관행렬 계산 (암호화폐 + 카테고리 지수 + SP500/VIX/심리 지수)
    Correlate {
        /// 분석할 심볼 목록 (쉼표 구분, 생략 시 시가총액 상위)
        #[arg(short, long)]
        symbols: Option<String>,
    },

    /// S&P 500 대비 롤링 상관계수 계산
    Rolling {
        /// 암호화폐 심볼
        #[arg(short, long, default_value = "BTC")]
        symbol: String,

        /// 롤링 윈도우 크기 (일)
        #[arg(short, long, default_value_t = 30)]
        window: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일이 있으면 환경 변수로 로드
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)?;
    let log_format: LogFormat = config.logging.format.parse().unwrap_or_default();
    init_logging(LogConfig::new(&config.logging.level).with_format(log_format))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    let manager = MarketDataManager::from_config(&config)?;

    // 스냅샷 디렉터리가 설정되어 있으면 이전 세션의 캐시를 복원
    if let Some(dir) = &config.cache.snapshot_dir {
        match manager.cache().load_snapshot(dir).await {
            Ok(loaded) => debug!(loaded = loaded, "캐시 스냅샷 복원"),
            Err(e) => warn!(error = %e, "캐시 스냅샷 복원 실패, 무시"),
        }
    }

    let result = match cli.command {
        Commands::Top { limit } => {
            commands::top::run(&manager, limit.unwrap_or(config.data.top_n_crypto)).await
        }
        Commands::Sentiment => commands::sentiment::run(&manager).await,
        Commands::Correlate { symbols } => {
            commands::correlate::run(&manager, &config, symbols.as_deref()).await
        }
        Commands::Rolling { symbol, window } => {
            commands::rolling::run(&manager, &symbol, window).await
        }
    };

    // 종료 전에 캐시를 디스크로 내보냄
    if let Some(dir) = &config.cache.snapshot_dir {
        if let Err(e) = manager.cache().save_snapshot(dir).await {
            warn!(error = %e, "캐시 스냅샷 저장 실패, 무시");
        }
    }

    result
}
