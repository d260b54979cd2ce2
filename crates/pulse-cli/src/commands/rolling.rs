//! S&P 500 대비 롤링 상관계수 명령어.

use anyhow::{bail, Context};

use pulse_analytics::{prices_to_returns, rolling_correlation};
use pulse_core::TraditionalIndicator;
use pulse_data::MarketDataManager;

/// 암호화폐 수익률과 S&P 500 수익률의 롤링 상관계수를 출력합니다.
pub async fn run(manager: &MarketDataManager, symbol: &str, window: usize) -> anyhow::Result<()> {
    if window < 2 {
        bail!("윈도우는 2 이상이어야 합니다");
    }

    let symbol = symbol.to_uppercase();
    let crypto_record = manager
        .crypto_series(&symbol)
        .await
        .with_context(|| format!("{} 데이터 조회 실패", symbol))?;
    let crypto = crypto_record
        .series_named(&symbol)
        .with_context(|| format!("응답에 {} 시리즈가 없음", symbol))?;

    let sp500_record = manager
        .indicator_series(TraditionalIndicator::Sp500)
        .await
        .context("S&P 500 데이터 조회 실패")?;
    let sp500 = sp500_record
        .series
        .first()
        .context("응답에 S&P 500 시리즈가 없음")?;

    // 공유 날짜로 정렬한 뒤 수익률 기준으로 계산
    let aligned = pulse_analytics::align::inner_join(crypto, sp500);
    if aligned.len() < window + 1 {
        bail!(
            "정렬된 관측치 {}개로는 윈도우 {}의 롤링 상관계수를 계산할 수 없습니다",
            aligned.len(),
            window
        );
    }

    let crypto_returns = prices_to_returns(&aligned.iter().map(|(_, x, _)| *x).collect::<Vec<_>>());
    let sp500_returns = prices_to_returns(&aligned.iter().map(|(_, _, y)| *y).collect::<Vec<_>>());
    let rolling = rolling_correlation(&crypto_returns, &sp500_returns, window);

    println!(
        "{}-day rolling correlation: {} vs SP500 ({} aligned observations)\n",
        window,
        symbol,
        aligned.len()
    );

    // 수익률은 두 번째 관측치부터 시작하므로 날짜 축이 하나 밀림
    println!("{:<12} {:>8}", "Date", "Corr");
    println!("{}", "-".repeat(22));
    let defined: Vec<(usize, f64)> = rolling
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();

    for (i, value) in defined.iter().rev().take(10).rev() {
        let (ts, _, _) = aligned[i + 1];
        println!("{:<12} {:>+8.3}", ts.format("%Y-%m-%d"), value);
    }

    if let Some((_, last)) = defined.last() {
        let mean = defined.iter().map(|(_, v)| v).sum::<f64>() / defined.len() as f64;
        println!("\nlatest {:+.3}, mean {:+.3} over {} windows", last, mean, defined.len());
    } else {
        println!("\n(정의된 롤링 값 없음)");
    }

    Ok(())
}
