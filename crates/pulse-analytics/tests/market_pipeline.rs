//! End-to-end test of the market correlation pipeline.
//!
//! Mirrors the dashboard flow: mix 24/7 crypto series with weekday-only
//! traditional indicators, align them on one date axis, convert to returns
//! and compute the correlation matrix plus a rolling correlation against
//! the S&P 500.

use chrono::{Datelike, TimeZone, Utc, Weekday};
use rust_decimal::Decimal;

use pulse_analytics::{category_price_indices, Frame};
use pulse_core::{Series, SeriesPoint};

/// Crypto trades every day; traditional markets skip weekends.
fn build_series(name: &str, base: f64, drift: f64, days: u32, weekdays_only: bool) -> Series {
    let mut points = Vec::new();
    let mut value = base;
    for day in 0..days {
        let ts = Utc.with_ymd_and_hms(2025, 1, 6, 21, 0, 0).unwrap() + chrono::Duration::days(day as i64);
        value *= 1.0 + drift * if day % 2 == 0 { 1.0 } else { -0.5 };
        if weekdays_only && matches!(ts.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }
        points.push(SeriesPoint::new(ts, Decimal::try_from(value).unwrap()));
    }
    Series::new(name, points)
}

#[test]
fn full_market_correlation_pipeline() {
    let btc = build_series("BTC", 95_000.0, 0.02, 21, false);
    let eth = build_series("ETH", 3_300.0, 0.02, 21, false);
    let sp500 = build_series("SP500", 5_900.0, 0.01, 21, true);
    let vix = build_series("VIX", 16.0, -0.01, 21, true);
    let fear_greed = build_series("Fear_Greed", 40.0, 0.005, 21, false);

    let mut all = vec![btc, eth];
    all.extend(category_price_indices(&all));
    all.extend([sp500, vix, fear_greed]);

    let mut frame = Frame::from_daily_series(&all);
    assert_eq!(frame.len(), 21);

    // Traditional indicators carry Friday's close through the weekend.
    frame.forward_fill(&["SP500", "VIX", "Fear_Greed"]);
    frame.retain_business_days();
    frame.drop_incomplete_rows();
    assert!(frame.len() >= 10);

    let returns = {
        let mut r = frame.returns(&["Fear_Greed"]);
        r.drop_incomplete_rows();
        r
    };

    let matrix = returns.correlation_matrix().expect("matrix");
    assert_eq!(
        matrix.labels,
        vec!["BTC", "ETH", "Layer1_Index", "SP500", "VIX", "Fear_Greed"]
    );

    let n = matrix.labels.len();
    for i in 0..n {
        assert_eq!(matrix.matrix[i][i], Some(1.0));
        for j in 0..n {
            assert_eq!(matrix.matrix[i][j], matrix.matrix[j][i], "matrix must be symmetric");
            if let Some(value) = matrix.matrix[i][j] {
                assert!(value.abs() <= 1.0 + 1e-9, "coefficient out of range");
            }
        }
    }

    // BTC and ETH share the same drift pattern -> strongly positive.
    let btc_eth = matrix.matrix[0][1].expect("btc/eth defined");
    assert!(btc_eth > 0.9);

    // The equal-weight Layer1 index must track its members.
    let btc_idx = matrix.matrix[0][2].expect("btc/index defined");
    assert!(btc_idx > 0.9);

    let rolling = returns.rolling_corr_with("SP500", 5).expect("rolling");
    assert_eq!(rolling.target, "SP500");
    // SP500 itself is excluded from the output columns.
    assert!(rolling.columns.iter().all(|c| c.name != "SP500"));
    for column in &rolling.columns {
        for value in &column.values[..4] {
            assert!(value.is_none(), "first window-1 positions must be undefined");
        }
        assert!(column.values[4..].iter().any(|v| v.is_some()));
    }
}
