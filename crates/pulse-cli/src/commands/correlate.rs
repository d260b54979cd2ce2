//! 시장 전체 상관행렬 명령어.
//!
//! 암호화폐 가격, 카테고리 지수, 전통 시장 지표(S&P 500, VIX), 심리 지수를
//! 하나의 날짜 축으로 정렬해 수익률 상관행렬을 출력합니다. 일부 소스가
//! 실패해도 경고만 출력하고 남은 데이터로 계속 진행합니다.

use anyhow::bail;
use tracing::warn;

use pulse_analytics::{category_price_indices, CorrelationMatrix, Frame};
use pulse_core::{Series, TraditionalIndicator};
use pulse_data::provider::fear_greed::FEAR_GREED_SERIES;
use pulse_data::MarketDataManager;

/// CMC 키가 없을 때 사용하는 기본 분석 대상.
const DEFAULT_SYMBOLS: &[&str] = &[
    "BTC", "ETH", "SOL", "BNB", "XRP", "ADA", "DOGE", "AVAX", "DOT", "LINK",
];

pub async fn run(
    manager: &MarketDataManager,
    config: &pulse_core::AppConfig,
    symbols_flag: Option<&str>,
) -> anyhow::Result<()> {
    let symbols = resolve_symbols(manager, config, symbols_flag).await;

    // 1. 암호화폐 가격 (주 → 보조 전환은 매니저가 처리)
    let batch = manager.all_crypto_series(&symbols).await;
    for (symbol, error) in &batch.failures {
        eprintln!("warning: {} 데이터 조회 실패: {}", symbol, error);
    }
    if batch.series.is_empty() {
        bail!("사용 가능한 암호화폐 데이터가 없습니다");
    }

    // 2. 카테고리 지수
    let mut all_series: Vec<Series> = batch.series.clone();
    all_series.extend(category_price_indices(&batch.series));

    // 3. 전통 시장 지표 + 심리 지수 (실패 시 경고 후 제외)
    let mut traditional: Vec<&'static str> = Vec::new();
    for indicator in TraditionalIndicator::all() {
        match manager.indicator_series(*indicator).await {
            Ok(record) => {
                if let Some(series) = record.series.into_iter().next() {
                    all_series.push(Series {
                        name: indicator.label().to_string(),
                        points: series.points,
                    });
                    traditional.push(indicator.label());
                }
            }
            Err(e) => eprintln!("warning: {} 데이터 조회 실패: {}", indicator.label(), e),
        }
    }
    match manager.sentiment_series().await {
        Ok(record) => {
            if let Some(series) = record.series_named(FEAR_GREED_SERIES) {
                all_series.push(series.clone());
                traditional.push(FEAR_GREED_SERIES);
            }
        }
        Err(e) => eprintln!("warning: Fear & Greed 조회 실패: {}", e),
    }

    // 4. 정렬 → 수익률 → 상관행렬
    let mut frame = Frame::from_daily_series(&all_series);
    frame.forward_fill(&traditional);
    frame.retain_business_days();
    frame.drop_incomplete_rows();

    if frame.len() < 2 {
        bail!("정렬된 관측치가 부족해 상관행렬을 계산할 수 없습니다");
    }

    let mut returns = frame.returns(&[FEAR_GREED_SERIES]);
    returns.drop_incomplete_rows();

    let Some(matrix) = returns.correlation_matrix() else {
        bail!("상관행렬 계산 실패: 정렬된 관측치 부족");
    };

    print_matrix(&matrix);
    Ok(())
}

/// 분석 대상 심볼 결정: 플래그 > 시가총액 상위 > 기본 목록.
async fn resolve_symbols(
    manager: &MarketDataManager,
    config: &pulse_core::AppConfig,
    symbols_flag: Option<&str>,
) -> Vec<String> {
    if let Some(flag) = symbols_flag {
        return flag
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }

    match manager.top_symbols(config.data.top_n_crypto).await {
        Ok(listings) => listings.into_iter().map(|l| l.symbol).collect(),
        Err(e) => {
            warn!(error = %e, "상위 목록 조회 실패, 기본 심볼 목록 사용");
            eprintln!("warning: 상위 목록 조회 실패 ({}), 기본 심볼 목록을 사용합니다", e);
            DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
        }
    }
}

/// 상관행렬을 고정폭 표로 출력합니다. 정의되지 않은 쌍은 "."으로 표시.
fn print_matrix(matrix: &CorrelationMatrix) {
    const LABEL_WIDTH: usize = 16;
    const CELL_WIDTH: usize = 7;

    println!(
        "Correlation matrix ({} observations, business days only)\n",
        matrix.observations
    );

    // 헤더: 칼럼 번호 (긴 레이블은 행 쪽에만 표기)
    print!("{:<width$}", "", width = LABEL_WIDTH);
    for i in 1..=matrix.labels.len() {
        print!("{:>width$}", format!("[{}]", i), width = CELL_WIDTH);
    }
    println!();

    for (i, label) in matrix.labels.iter().enumerate() {
        let short: String = label.chars().take(LABEL_WIDTH - 5).collect();
        print!("[{}] {:<width$}", i + 1, short, width = LABEL_WIDTH - 4 - digits(i + 1));
        for value in &matrix.matrix[i] {
            match value {
                Some(v) => print!("{:>+width$.2}", v, width = CELL_WIDTH),
                None => print!("{:>width$}", ".", width = CELL_WIDTH),
            }
        }
        println!();
    }
}

fn digits(n: usize) -> usize {
    n.to_string().len()
}
