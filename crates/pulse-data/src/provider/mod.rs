//! 소스 클라이언트 정의.
//!
//! 모든 업스트림은 "심볼 집합과 구간에 대한 시계열 조회"라는 공통 능력
//! 뒤에 숨겨집니다. 각 클라이언트는 전송/파싱 실패를 [`DataError`]의
//! 구별 가능한 종류로 매핑하며, 재시도나 페이지네이션은 하지 않습니다.

pub mod coinmarketcap;
pub mod fear_greed;
pub mod yahoo;

pub use coinmarketcap::CoinMarketCapClient;
pub use fear_greed::FearGreedClient;
pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{DataError, Result};
use pulse_core::{Granularity, Series, SeriesKey, SourceId};

/// 시계열 조회 요청.
#[derive(Debug, Clone)]
pub struct SeriesRequest {
    /// 조회할 심볼 목록 (심리 지수처럼 심볼이 없는 소스는 무시)
    pub symbols: Vec<String>,
    /// 구간 시작 (UTC)
    pub start: DateTime<Utc>,
    /// 구간 끝 (UTC)
    pub end: DateTime<Utc>,
    /// 조회 단위
    pub granularity: Granularity,
}

impl SeriesRequest {
    /// 새 요청을 생성합니다.
    pub fn new(
        symbols: Vec<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Self {
        Self {
            symbols,
            start,
            end,
            granularity,
        }
    }

    /// 단일 심볼 요청을 생성합니다.
    pub fn single(
        symbol: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Self {
        Self::new(vec![symbol.into()], start, end, granularity)
    }

    /// 이 요청에서 캐시 키를 유도합니다.
    ///
    /// 키의 소스는 요청의 논리적 소스입니다. 보조 클라이언트가 대신 응답한
    /// 경우에도 같은 키가 사용됩니다.
    pub fn key(&self, source: SourceId) -> SeriesKey {
        SeriesKey::new(source, &self.symbols, self.start, self.end, self.granularity)
    }
}

/// 시계열 제공자 트레잇.
///
/// 구현체는 요청 구간의 시계열을 심볼당 하나씩 반환합니다.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// 이 제공자의 소스 식별자.
    fn source(&self) -> SourceId;

    /// 요청 구간의 시계열 조회.
    async fn fetch_series(&self, req: &SeriesRequest) -> Result<Vec<Series>>;
}

/// 순위 목록의 단일 항목.
#[derive(Debug, Clone)]
pub struct Listing {
    /// 심볼 (예: "BTC")
    pub symbol: String,
    /// 현재 가격 (USD)
    pub price: Decimal,
}

/// 시가총액 순위 목록 제공자 트레잇.
#[async_trait]
pub trait ListingProvider: Send + Sync {
    /// 시가총액 상위 `n`개 목록 조회 (순위순).
    async fn fetch_top(&self, n: usize) -> Result<Vec<Listing>>;
}

/// HTTP 상태 코드를 오류 종류로 매핑합니다.
///
/// 429는 `RateLimited`, 그 외 비 2xx는 `UpstreamUnavailable`입니다.
pub(crate) fn status_to_error(source: SourceId, status: reqwest::StatusCode) -> DataError {
    if status.as_u16() == 429 {
        DataError::RateLimited
    } else {
        DataError::UpstreamUnavailable(format!("{} returned HTTP {}", source, status))
    }
}
