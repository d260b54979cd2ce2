//! Fear & Greed 심리 지수 명령어.

use anyhow::Context;
use rust_decimal::prelude::ToPrimitive;

use pulse_data::provider::fear_greed::{classification, FEAR_GREED_SERIES};
use pulse_data::MarketDataManager;

/// 최근 심리 지수와 짧은 이력을 출력합니다.
pub async fn run(manager: &MarketDataManager) -> anyhow::Result<()> {
    let record = manager
        .sentiment_series()
        .await
        .context("Fear & Greed 지수 조회 실패")?;

    let series = record
        .series_named(FEAR_GREED_SERIES)
        .context("응답에 심리 지수 시리즈가 없음")?;
    let latest = series.last().context("심리 지수 데이터가 비어 있음")?;
    let value = latest.value.to_f64().unwrap_or(f64::NAN);

    println!(
        "Fear & Greed Index: {:.0} ({})",
        value,
        classification(value)
    );
    println!("As of: {}", latest.timestamp.format("%Y-%m-%d"));

    // 최근 7일 이력
    println!("\n{:<12} {:>6}  {}", "Date", "Value", "Band");
    println!("{}", "-".repeat(40));
    for point in series.points.iter().rev().take(7) {
        let v = point.value.to_f64().unwrap_or(f64::NAN);
        println!(
            "{:<12} {:>6.0}  {}",
            point.timestamp.format("%Y-%m-%d"),
            v,
            classification(v)
        );
    }

    Ok(())
}
