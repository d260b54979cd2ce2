//! CoinMarketCap API 클라이언트.
//!
//! Pro API를 통해 시가총액 순위 목록과 과거 OHLCV 시계열을 조회합니다.
//! 주 암호화폐 가격 소스이며, 실패 시 호출자가 보조 소스로 전환합니다.
//!
//! # API 키 관리
//!
//! 키는 프로세스 시작 시 한 번 설정에서 읽습니다. 키 없이 생성된
//! 클라이언트는 모든 호출에서 [`DataError::MissingApiKey`]로 실패하여
//! 보조 소스로의 영구 강등을 만듭니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use pulse_data::provider::CoinMarketCapClient;
//!
//! let client = CoinMarketCapClient::new(Some("YOUR_KEY".into()), None);
//! let listings = client.fetch_top_listings(50).await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{DataError, Result};
use crate::provider::{status_to_error, Listing, ListingProvider, SeriesProvider, SeriesRequest};
use pulse_core::{Series, SeriesPoint, SourceId};

const DEFAULT_BASE_URL: &str = "https://pro-api.coinmarketcap.com/v1";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// CoinMarketCap API 클라이언트.
#[derive(Clone)]
pub struct CoinMarketCapClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

/// 순위 목록 응답.
#[derive(Debug, Deserialize)]
struct ListingsResponse {
    data: Vec<ListingEntry>,
}

#[derive(Debug, Deserialize)]
struct ListingEntry {
    symbol: String,
    quote: UsdQuoteMap<ListingQuote>,
}

#[derive(Debug, Deserialize)]
struct UsdQuoteMap<T> {
    #[serde(rename = "USD")]
    usd: T,
}

#[derive(Debug, Deserialize)]
struct ListingQuote {
    price: f64,
}

/// 과거 OHLCV 응답.
#[derive(Debug, Deserialize)]
struct OhlcvResponse {
    data: OhlcvData,
}

#[derive(Debug, Deserialize)]
struct OhlcvData {
    quotes: Vec<OhlcvQuote>,
}

#[derive(Debug, Deserialize)]
struct OhlcvQuote {
    time_open: DateTime<Utc>,
    quote: UsdQuoteMap<OhlcvUsd>,
}

#[derive(Debug, Deserialize)]
struct OhlcvUsd {
    close: f64,
}

impl CoinMarketCapClient {
    /// 새로운 CoinMarketCap 클라이언트 생성.
    ///
    /// # Arguments
    /// * `api_key` - Pro API 키. `None`이면 모든 호출이 실패합니다.
    /// * `base_url` - 기본 URL 오버라이드 (테스트용)
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// API 요청 실행.
    ///
    /// API 키는 HTTP 헤더로 전달합니다 (CMC Pro API 명세 준수).
    async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let api_key = self.api_key.as_ref().ok_or(DataError::MissingApiKey)?;
        let url = format!("{}{}", self.base_url, path);

        debug!(path = path, url = %url, "CMC API 요청");

        let response = self
            .client
            .get(&url)
            .query(params)
            .header(API_KEY_HEADER, api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(DataError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_to_error(SourceId::CoinMarketCap, status));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DataError::MalformedResponse(format!("CMC: {}", e)))
    }

    /// 시가총액 상위 암호화폐 목록 조회 (순위순).
    pub async fn fetch_top_listings(&self, n: usize) -> Result<Vec<Listing>> {
        let params = [("limit", n.to_string()), ("convert", "USD".to_string())];
        let response: ListingsResponse = self
            .request("/cryptocurrency/listings/latest", &params)
            .await?;

        if response.data.is_empty() {
            return Err(DataError::NoData("CMC listings empty".to_string()));
        }

        let listings = response
            .data
            .into_iter()
            .take(n)
            .map(|entry| {
                let price = Decimal::from_f64(entry.quote.usd.price).ok_or_else(|| {
                    DataError::MalformedResponse(format!(
                        "CMC: unrepresentable price for {}",
                        entry.symbol
                    ))
                })?;
                Ok(Listing {
                    symbol: entry.symbol,
                    price,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(count = listings.len(), "CMC 순위 목록 수신");
        Ok(listings)
    }

    /// 단일 심볼의 과거 종가 시계열 조회.
    async fn fetch_symbol_history(&self, symbol: &str, req: &SeriesRequest) -> Result<Series> {
        let params = [
            ("symbol", symbol.to_string()),
            (
                "time_start",
                req.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            (
                "time_end",
                req.end.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("interval", req.granularity.to_cmc_interval().to_string()),
            ("convert", "USD".to_string()),
        ];

        let response: OhlcvResponse = self
            .request("/cryptocurrency/ohlcv/historical", &params)
            .await?;

        if response.data.quotes.is_empty() {
            return Err(DataError::NoData(format!("CMC: no quotes for {}", symbol)));
        }

        let points = response
            .data
            .quotes
            .into_iter()
            .map(|q| {
                let value = Decimal::from_f64(q.quote.usd.close).ok_or_else(|| {
                    DataError::MalformedResponse(format!(
                        "CMC: unrepresentable close for {}",
                        symbol
                    ))
                })?;
                Ok(SeriesPoint::new(q.time_open, value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Series::new(symbol.to_uppercase(), points))
    }
}

#[async_trait]
impl SeriesProvider for CoinMarketCapClient {
    fn source(&self) -> SourceId {
        SourceId::CoinMarketCap
    }

    async fn fetch_series(&self, req: &SeriesRequest) -> Result<Vec<Series>> {
        let mut series = Vec::with_capacity(req.symbols.len());
        // 순차 호출. 동시 요청은 하지 않음
        for symbol in &req.symbols {
            series.push(self.fetch_symbol_history(symbol, req).await?);
        }
        Ok(series)
    }
}

#[async_trait]
impl ListingProvider for CoinMarketCapClient {
    async fn fetch_top(&self, n: usize) -> Result<Vec<Listing>> {
        self.fetch_top_listings(n).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_fails_every_call() {
        let client = CoinMarketCapClient::new(None, None);
        let err = client.fetch_top_listings(10).await.unwrap_err();
        assert!(matches!(err, DataError::MissingApiKey));
        assert!(err.is_fallback_eligible());
    }
}
