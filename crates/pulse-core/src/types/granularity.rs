//! 시계열 조회 단위 정의.
//!
//! 이 모듈은 업스트림에 요청하는 캔들/관측치 간격을 나타내는 타입을 정의합니다.
//! 대시보드는 일 단위 분석이 기본이며, 시간/주 단위는 보조적으로 사용됩니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// 시계열 조회 단위.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// 1시간 간격
    H1,
    /// 1일 간격
    D1,
    /// 1주 간격
    W1,
}

impl Granularity {
    /// 이 단위의 기간을 반환합니다.
    pub fn duration(&self) -> Duration {
        match self {
            Granularity::H1 => Duration::from_secs(60 * 60),
            Granularity::D1 => Duration::from_secs(24 * 60 * 60),
            Granularity::W1 => Duration::from_secs(7 * 24 * 60 * 60),
        }
    }

    /// 이 단위의 초 단위 값을 반환합니다.
    pub fn as_secs(&self) -> u64 {
        self.duration().as_secs()
    }

    /// 타임스탬프를 단위 경계로 내림 정렬합니다.
    ///
    /// "지금"으로부터 유도된 캐시 키가 같은 버킷 안에서는 항상 동일하도록
    /// 만들기 위해 사용합니다.
    pub fn truncate(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let secs = self.as_secs() as i64;
        let aligned = ts.timestamp() - ts.timestamp().rem_euclid(secs);
        DateTime::from_timestamp(aligned, 0).unwrap_or(ts)
    }

    /// Yahoo Finance 간격 문자열로 변환합니다.
    pub fn to_yahoo_interval(&self) -> &'static str {
        match self {
            Granularity::H1 => "1h",
            Granularity::D1 => "1d",
            Granularity::W1 => "1wk",
        }
    }

    /// CoinMarketCap 간격 문자열로 변환합니다.
    pub fn to_cmc_interval(&self) -> &'static str {
        match self {
            Granularity::H1 => "1h",
            Granularity::D1 => "1d",
            Granularity::W1 => "7d",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::H1 => write!(f, "1h"),
            Granularity::D1 => write!(f, "1d"),
            Granularity::W1 => write!(f, "1w"),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1h" | "h1" | "hourly" => Ok(Granularity::H1),
            "1d" | "d1" | "daily" => Ok(Granularity::D1),
            "1w" | "w1" | "weekly" => Ok(Granularity::W1),
            _ => Err(format!("Unknown granularity: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_durations() {
        assert_eq!(Granularity::H1.as_secs(), 3600);
        assert_eq!(Granularity::D1.as_secs(), 86400);
        assert_eq!(Granularity::W1.as_secs(), 7 * 86400);
    }

    #[test]
    fn test_truncate_day_boundary() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap();
        let truncated = Granularity::D1.truncate(ts);
        assert_eq!(truncated, Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap());

        // 같은 날의 다른 시각은 같은 버킷으로 정렬됨
        let later = Utc.with_ymd_and_hms(2025, 3, 14, 23, 59, 59).unwrap();
        assert_eq!(Granularity::D1.truncate(later), truncated);
    }

    #[test]
    fn test_truncate_idempotent() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 15, 0, 0).unwrap();
        let once = Granularity::H1.truncate(ts);
        assert_eq!(Granularity::H1.truncate(once), once);
    }

    #[test]
    fn test_parse() {
        assert_eq!("1d".parse::<Granularity>().unwrap(), Granularity::D1);
        assert_eq!("hourly".parse::<Granularity>().unwrap(), Granularity::H1);
        assert!("5m".parse::<Granularity>().is_err());
    }
}
