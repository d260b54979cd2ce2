//! 시계열 데이터 타입 및 캐시 엔트리 정의.
//!
//! 이 모듈은 시계열 관련 타입을 정의합니다:
//! - `SeriesPoint` - 단일 관측치 (시각, 값)
//! - `Series` - 이름이 붙은 시계열
//! - `SeriesKey` - 캐시 조회 키
//! - `SeriesRecord` - 캐시 엔트리

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Granularity, SourceId};

/// 단일 관측치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// 관측 시각 (UTC)
    pub timestamp: DateTime<Utc>,
    /// 관측 값 (가격, 지수 등)
    pub value: Decimal,
}

impl SeriesPoint {
    /// 새 관측치를 생성합니다.
    pub fn new(timestamp: DateTime<Utc>, value: Decimal) -> Self {
        Self { timestamp, value }
    }
}

/// 이름이 붙은 시계열.
///
/// 포인트는 시간 오름차순으로 유지됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    /// 시리즈 이름 (심볼 또는 지표 레이블)
    pub name: String,
    /// 관측치 목록 (시간 오름차순)
    pub points: Vec<SeriesPoint>,
}

impl Series {
    /// 새 시리즈를 생성합니다. 포인트는 시간순으로 정렬됩니다.
    pub fn new(name: impl Into<String>, mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        Self {
            name: name.into(),
            points,
        }
    }

    /// 관측치 개수.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 관측치가 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 가장 최근 관측치.
    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    /// 통계 계산용 f64 값 벡터.
    ///
    /// f64로 표현할 수 없는 값은 제외됩니다.
    pub fn values_f64(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.value.to_f64()).collect()
    }

    /// 주어진 시간 구간 [start, end] 안의 포인트만 남깁니다.
    pub fn clamp_to(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.points.retain(|p| p.timestamp >= start && p.timestamp <= end);
    }
}

/// 캐시 조회 키.
///
/// 사용자 요청 (소스, 심볼 집합, 구간, 단위)에서 결정적으로 유도됩니다.
/// 심볼 집합은 정렬 후 '+'로 연결되어 순서와 무관하게 같은 키를 만듭니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    /// 데이터 소스
    pub source: SourceId,
    /// 정규화된 심볼 집합 ('+' 연결)
    pub symbols: String,
    /// 구간 시작 (UTC)
    pub start: DateTime<Utc>,
    /// 구간 끝 (UTC)
    pub end: DateTime<Utc>,
    /// 조회 단위
    pub granularity: Granularity,
}

impl SeriesKey {
    /// 요청 파라미터에서 키를 유도합니다.
    pub fn new(
        source: SourceId,
        symbols: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Self {
        let mut sorted: Vec<String> = symbols.iter().map(|s| s.to_uppercase()).collect();
        sorted.sort();
        Self {
            source,
            symbols: sorted.join("+"),
            start,
            end,
            granularity,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}-{}",
            self.source,
            self.symbols,
            self.granularity,
            self.start.timestamp(),
            self.end.timestamp()
        )
    }
}

/// 캐시 엔트리.
///
/// 저장 후 불변이며, 갱신 시 수정되지 않고 새 레코드로 교체됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesRecord {
    /// 조회 키
    pub key: SeriesKey,
    /// 데이터를 가져온 시각
    pub fetched_at: DateTime<Utc>,
    /// 가져온 시리즈 목록 (심볼당 하나)
    pub series: Vec<Series>,
}

impl SeriesRecord {
    /// 기준 시각 대비 레코드의 나이.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// 이름으로 시리즈 조회.
    pub fn series_named(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    /// 모든 시리즈가 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_series_sorts_points() {
        let series = Series::new(
            "BTC",
            vec![
                SeriesPoint::new(ts(3), dec!(3.0)),
                SeriesPoint::new(ts(1), dec!(1.0)),
                SeriesPoint::new(ts(2), dec!(2.0)),
            ],
        );
        let hours: Vec<u32> = series
            .points
            .iter()
            .map(|p| p.timestamp.format("%H").to_string().parse().unwrap())
            .collect();
        assert_eq!(hours, vec![1, 2, 3]);
    }

    #[test]
    fn test_key_symbol_order_independent() {
        let a = SeriesKey::new(
            SourceId::CoinMarketCap,
            &["ETH".to_string(), "BTC".to_string()],
            ts(0),
            ts(12),
            Granularity::D1,
        );
        let b = SeriesKey::new(
            SourceId::CoinMarketCap,
            &["btc".to_string(), "eth".to_string()],
            ts(0),
            ts(12),
            Granularity::D1,
        );
        assert_eq!(a, b);
        assert_eq!(a.symbols, "BTC+ETH");
    }

    #[test]
    fn test_record_age_and_lookup() {
        let key = SeriesKey::new(
            SourceId::FearGreed,
            &["FNG".to_string()],
            ts(0),
            ts(12),
            Granularity::D1,
        );
        let record = SeriesRecord {
            key,
            fetched_at: ts(1),
            series: vec![Series::new("FNG", vec![SeriesPoint::new(ts(1), dec!(42))])],
        };
        assert_eq!(record.age(ts(3)), Duration::hours(2));
        assert!(record.series_named("FNG").is_some());
        assert!(record.series_named("BTC").is_none());
        assert!(!record.is_empty());
    }

    #[test]
    fn test_clamp_to_window() {
        let mut series = Series::new(
            "BTC",
            (0..6).map(|h| SeriesPoint::new(ts(h), dec!(1))).collect(),
        );
        series.clamp_to(ts(2), ts(4));
        assert_eq!(series.len(), 3);
        assert_eq!(series.points.first().unwrap().timestamp, ts(2));
        assert_eq!(series.points.last().unwrap().timestamp, ts(4));
    }
}
