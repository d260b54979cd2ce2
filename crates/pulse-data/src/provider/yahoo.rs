//! Yahoo Finance 과거 데이터 클라이언트.
//!
//! 두 가지 역할을 수행합니다:
//! - 주 소스(CoinMarketCap) 실패 시의 보조 암호화폐 가격 소스
//! - 전통 시장 지표(S&P 500, VIX)의 단독 소스
//!
//! # 심볼 형식
//!
//! - 암호화폐: "BTC" → "BTC-USD" 로 변환하여 조회
//! - 지수: "^GSPC", "^VIX" 등 '^' 접두사 티커는 그대로 전달
//!
//! 반환되는 시리즈 이름은 요청한 심볼 그대로입니다 ("BTC-USD"가 아니라 "BTC").

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

use crate::error::{DataError, Result};
use crate::provider::{SeriesProvider, SeriesRequest};
use pulse_core::{Series, SeriesPoint, SourceId};

/// Yahoo Finance 클라이언트.
pub struct YahooFinanceClient {
    connector: yahoo::YahooConnector,
}

impl YahooFinanceClient {
    /// 새로운 Yahoo Finance 클라이언트 생성.
    pub fn new() -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| DataError::UpstreamUnavailable(format!("Yahoo 연결 실패: {}", e)))?;

        Ok(Self { connector })
    }

    /// 요청 심볼을 Yahoo 티커로 변환.
    ///
    /// '^' 접두사 지수 티커와 이미 통화쌍 형식인 심볼은 그대로,
    /// 그 외 암호화폐 심볼은 "-USD"를 붙입니다.
    pub fn to_yahoo_ticker(symbol: &str) -> String {
        if symbol.starts_with('^') || symbol.contains('-') {
            symbol.to_string()
        } else {
            format!("{}-USD", symbol.to_uppercase())
        }
    }

    fn to_offset(ts: DateTime<Utc>) -> Result<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(ts.timestamp())
            .map_err(|e| DataError::MalformedResponse(format!("timestamp out of range: {}", e)))
    }

    /// 단일 티커의 종가 시계열 조회.
    async fn fetch_ticker(&self, symbol: &str, req: &SeriesRequest) -> Result<Series> {
        let ticker = Self::to_yahoo_ticker(symbol);
        let start = Self::to_offset(req.start)?;
        let end = Self::to_offset(req.end)?;
        let interval = req.granularity.to_yahoo_interval();

        debug!(symbol = symbol, ticker = %ticker, interval = interval, "Yahoo 시세 조회");

        let response = self
            .connector
            .get_quote_history_interval(&ticker, start, end, interval)
            .await
            .map_err(|e| DataError::UpstreamUnavailable(format!("Yahoo ({}): {}", ticker, e)))?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::MalformedResponse(format!("Yahoo ({}): {}", ticker, e)))?;

        if quotes.is_empty() {
            return Err(DataError::NoData(format!("Yahoo: no quotes for {}", ticker)));
        }

        let points = quotes
            .into_iter()
            .map(|q| {
                let timestamp = DateTime::from_timestamp(q.timestamp as i64, 0).ok_or_else(|| {
                    DataError::MalformedResponse(format!(
                        "Yahoo ({}): invalid timestamp {}",
                        ticker, q.timestamp
                    ))
                })?;
                let value = Decimal::from_f64(q.close).ok_or_else(|| {
                    DataError::MalformedResponse(format!(
                        "Yahoo ({}): unrepresentable close {}",
                        ticker, q.close
                    ))
                })?;
                Ok(SeriesPoint::new(timestamp, value))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut series = Series::new(symbol.to_string(), points);
        // Yahoo는 구간 밖 캔들을 덧붙여 줄 때가 있음
        series.clamp_to(req.start, req.end);

        if series.is_empty() {
            return Err(DataError::NoData(format!(
                "Yahoo: no quotes for {} in requested window",
                ticker
            )));
        }

        debug!(symbol = symbol, points = series.len(), "Yahoo 시세 수신");
        Ok(series)
    }
}

#[async_trait]
impl SeriesProvider for YahooFinanceClient {
    fn source(&self) -> SourceId {
        SourceId::YahooFinance
    }

    async fn fetch_series(&self, req: &SeriesRequest) -> Result<Vec<Series>> {
        let mut series = Vec::with_capacity(req.symbols.len());
        for symbol in &req.symbols {
            series.push(self.fetch_ticker(symbol, req).await?);
        }
        Ok(series)
    }
}
