//! 상관계수 계산 모듈.
//!
//! 자산 간 가격 움직임의 상관관계를 계산합니다.
//!
//! # 주요 기능
//!
//! - **Pearson 상관계수**: 두 시계열 간 선형 상관관계 측정
//! - **롤링 상관계수**: 고정 크기 슬라이딩 윈도우 단위 측정
//! - **쌍별 상관계수**: 타임스탬프 정렬을 포함한 상위 연산
//!
//! 표본이 2개 미만이거나 분산이 0이면 결과는 `None`입니다.
//! 오류나 패닉이 아니라 정의되지 않은 값입니다.

use chrono::{DateTime, Utc};

use crate::align::inner_join;
use pulse_core::Series;

/// 쌍별 상관계수 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum CorrelationResult {
    /// 전체 정렬 구간의 단일 계수
    Scalar(Option<f64>),
    /// 정렬된 시점당 하나씩의 롤링 계수.
    /// 처음 `window - 1`개 위치는 `None`입니다.
    Rolling(Vec<(DateTime<Utc>, Option<f64>)>),
}

impl CorrelationResult {
    /// 단일 계수를 반환합니다 (롤링 결과면 `None`).
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            CorrelationResult::Scalar(value) => *value,
            CorrelationResult::Rolling(_) => None,
        }
    }

    /// 롤링 결과를 반환합니다 (단일 계수면 `None`).
    pub fn as_rolling(&self) -> Option<&[(DateTime<Utc>, Option<f64>)]> {
        match self {
            CorrelationResult::Scalar(_) => None,
            CorrelationResult::Rolling(values) => Some(values),
        }
    }
}

/// Pearson 상관계수 계산.
///
/// # 반환
///
/// 상관계수 (-1.0 ~ 1.0). 길이 불일치, 표본 2개 미만, 분산 0이면 `None`.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    // 변동이 없는 시계열과의 상관계수는 정의되지 않음
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// 롤링 Pearson 상관계수 계산.
///
/// 출력 길이는 입력과 같고, 처음 `window - 1`개 위치는 `None`입니다.
pub fn rolling_correlation(x: &[f64], y: &[f64], window: usize) -> Vec<Option<f64>> {
    let len = x.len().min(y.len());
    let mut out = Vec::with_capacity(len);

    for i in 0..len {
        if window == 0 || i + 1 < window {
            out.push(None);
        } else {
            let lo = i + 1 - window;
            out.push(pearson(&x[lo..=i], &y[lo..=i]));
        }
    }

    out
}

/// 가격 시계열을 수익률로 변환.
///
/// # 반환
///
/// 구간 수익률 벡터 (길이: `prices.len() - 1`).
pub fn prices_to_returns(prices: &[f64]) -> Vec<f64> {
    if prices.len() < 2 {
        return Vec::new();
    }

    prices
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { (w[1] - w[0]) / w[0] })
        .collect()
}

/// 두 시리즈의 쌍별 상관계수 계산.
///
/// 입력을 공유 타임스탬프로 정렬(내부 조인)한 뒤 계산합니다.
///
/// # 인자
///
/// * `window` - `None`이면 전체 정렬 구간의 단일 계수,
///   `Some(w)`면 롤링 계수 (처음 `w - 1`개 위치는 `None`)
pub fn pairwise_correlation(a: &Series, b: &Series, window: Option<usize>) -> CorrelationResult {
    let aligned = inner_join(a, b);
    let xs: Vec<f64> = aligned.iter().map(|(_, x, _)| *x).collect();
    let ys: Vec<f64> = aligned.iter().map(|(_, _, y)| *y).collect();

    match window {
        None => CorrelationResult::Scalar(pearson(&xs, &ys)),
        Some(w) => {
            let rolling = rolling_correlation(&xs, &ys, w);
            CorrelationResult::Rolling(
                aligned
                    .iter()
                    .map(|(ts, _, _)| *ts)
                    .zip(rolling)
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pulse_core::SeriesPoint;
    use rust_decimal::Decimal;

    fn series_from(name: &str, values: &[f64]) -> Series {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                SeriesPoint::new(
                    Utc.with_ymd_and_hms(2025, 1, 1 + i as u32, 0, 0, 0).unwrap(),
                    Decimal::try_from(*v).unwrap(),
                )
            })
            .collect();
        Series::new(name, points)
    }

    #[test]
    fn test_pearson_perfect_positive() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let corr = pearson(&x, &y).unwrap();
        assert!((corr - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![10.0, 8.0, 6.0, 4.0, 2.0];
        let corr = pearson(&x, &y).unwrap();
        assert!((corr + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_insufficient_or_flat() {
        assert!(pearson(&[1.0], &[2.0]).is_none());
        assert!(pearson(&[1.0, 2.0, 3.0], &[1.0, 2.0]).is_none());
        // 분산 0
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
    }

    /// 자기 자신과의 상관계수는 1.0 (표본 2개 이상).
    #[test]
    fn test_self_correlation_is_one() {
        let s = series_from("BTC", &[100.0, 105.0, 103.0, 110.0]);
        let result = pairwise_correlation(&s, &s, None);
        let corr = result.as_scalar().unwrap();
        assert!((corr - 1.0).abs() < 1e-9);
    }

    /// 롤링 윈도우 5 → 처음 4개 위치는 None (0이 아님).
    #[test]
    fn test_rolling_prefix_is_undefined() {
        let a = series_from("A", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let b = series_from("B", &[2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0]);

        let result = pairwise_correlation(&a, &b, Some(5));
        let rolling = result.as_rolling().unwrap();
        assert_eq!(rolling.len(), 7);

        for (_, value) in &rolling[..4] {
            assert!(value.is_none());
        }
        for (_, value) in &rolling[4..] {
            assert!((value.unwrap() - 1.0).abs() < 1e-9);
        }
    }

    /// 겹치는 시점이 1개뿐이면 정의되지 않은 결과, 패닉 없음.
    #[test]
    fn test_single_overlap_is_undefined() {
        let a = series_from("A", &[1.0, 2.0, 3.0]);
        let b = series_from("B", &[5.0]);

        let result = pairwise_correlation(&a, &b, None);
        assert_eq!(result, CorrelationResult::Scalar(None));
    }

    /// 윈도우가 정렬 길이보다 크면 전부 None.
    #[test]
    fn test_window_larger_than_series() {
        let a = series_from("A", &[1.0, 2.0, 3.0]);
        let b = series_from("B", &[3.0, 2.0, 1.0]);

        let result = pairwise_correlation(&a, &b, Some(10));
        let rolling = result.as_rolling().unwrap();
        assert_eq!(rolling.len(), 3);
        assert!(rolling.iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn test_prices_to_returns() {
        let returns = prices_to_returns(&[100.0, 101.0, 99.0, 102.0]);
        assert_eq!(returns.len(), 3);
        assert!((returns[0] - 0.01).abs() < 1e-9);
        assert!(returns[1] < 0.0);
        assert!(prices_to_returns(&[100.0]).is_empty());
    }
}
