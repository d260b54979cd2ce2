//! Crypto Fear & Greed Index 클라이언트.
//!
//! alternative.me의 공개 API에서 시장 심리 지수를 조회합니다.
//! 단일 전역 지수이므로 요청의 심볼 목록은 무시되며, 시리즈 이름은
//! 항상 [`FEAR_GREED_SERIES`]입니다.
//!
//! # 와이어 형식
//!
//! 값과 타임스탬프가 모두 문자열로 내려오는 점에 주의:
//!
//! ```json
//! {"data": [{"value": "26", "value_classification": "Fear",
//!            "timestamp": "1735689600"}]}
//! ```

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

use crate::error::{DataError, Result};
use crate::provider::{status_to_error, SeriesProvider, SeriesRequest};
use chrono::DateTime;
use pulse_core::{Series, SeriesPoint, SourceId};

/// 심리 지수 시리즈의 고정 이름.
pub const FEAR_GREED_SERIES: &str = "Fear_Greed";

/// Fear & Greed Index 클라이언트.
#[derive(Clone)]
pub struct FearGreedClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct FngResponse {
    data: Vec<FngEntry>,
}

#[derive(Debug, Deserialize)]
struct FngEntry {
    value: String,
    timestamp: String,
}

impl FearGreedClient {
    /// 새로운 Fear & Greed 클라이언트 생성.
    ///
    /// # Arguments
    /// * `base_url` - API URL (예: `https://api.alternative.me/fng/`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            base_url: base_url.into(),
        }
    }

    /// 전체 지수 이력 조회.
    async fn fetch_history(&self) -> Result<Vec<SeriesPoint>> {
        debug!(url = %self.base_url, "Fear & Greed 조회");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("limit", "0"), ("format", "json")])
            .send()
            .await
            .map_err(DataError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_to_error(SourceId::FearGreed, status));
        }

        let body: FngResponse = response
            .json()
            .await
            .map_err(|e| DataError::MalformedResponse(format!("FNG: {}", e)))?;

        if body.data.is_empty() {
            return Err(DataError::NoData("FNG: empty data".to_string()));
        }

        body.data
            .into_iter()
            .map(|entry| {
                let seconds: i64 = entry.timestamp.parse().map_err(|_| {
                    DataError::MalformedResponse(format!(
                        "FNG: bad timestamp '{}'",
                        entry.timestamp
                    ))
                })?;
                let timestamp = DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
                    DataError::MalformedResponse(format!("FNG: timestamp {} out of range", seconds))
                })?;
                let value = Decimal::from_str(&entry.value).map_err(|_| {
                    DataError::MalformedResponse(format!("FNG: bad value '{}'", entry.value))
                })?;
                Ok(SeriesPoint::new(timestamp, value))
            })
            .collect()
    }
}

/// 지수 값(0~100)을 심리 구간 레이블로 변환합니다.
pub fn classification(value: f64) -> &'static str {
    match value {
        v if v < 25.0 => "Extreme Fear",
        v if v < 45.0 => "Fear",
        v if v <= 55.0 => "Neutral",
        v if v <= 75.0 => "Greed",
        _ => "Extreme Greed",
    }
}

#[async_trait]
impl SeriesProvider for FearGreedClient {
    fn source(&self) -> SourceId {
        SourceId::FearGreed
    }

    /// 심볼 목록은 무시됩니다. 단일 전역 지수만 존재합니다.
    async fn fetch_series(&self, req: &SeriesRequest) -> Result<Vec<Series>> {
        let points = self.fetch_history().await?;

        // API는 최신순으로 내려줌. Series가 오름차순으로 재정렬
        let mut series = Series::new(FEAR_GREED_SERIES, points);
        series.clamp_to(req.start, req.end);

        if series.is_empty() {
            return Err(DataError::NoData(
                "FNG: no data in requested window".to_string(),
            ));
        }

        debug!(points = series.len(), "Fear & Greed 수신");
        Ok(vec![series])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_bands() {
        assert_eq!(classification(0.0), "Extreme Fear");
        assert_eq!(classification(24.9), "Extreme Fear");
        assert_eq!(classification(30.0), "Fear");
        assert_eq!(classification(50.0), "Neutral");
        assert_eq!(classification(60.0), "Greed");
        assert_eq!(classification(90.0), "Extreme Greed");
    }
}
