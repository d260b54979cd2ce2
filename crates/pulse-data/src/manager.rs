//! 데이터 매니저 구현.
//!
//! 리프레시 캐시와 소스 클라이언트 사이를 조정합니다. 요청 하나가
//! "캐시 확인 → 필요 시 조회 → 저장 → 반환"의 한 사이클이며, 업스트림
//! 호출은 모두 순차적으로 일어납니다.
//!
//! # 소스 전환
//!
//! 암호화폐 가격은 주 소스(CoinMarketCap)를 먼저 시도하고, 전환 대상
//! 오류(비 2xx, 빈 응답, 키 없음)면 보조 소스(Yahoo Finance)를 한 번
//! 시도합니다. 전환 순서는 고정이며 런타임에 바꿀 수 없습니다.
//! 보조 소스까지 실패하면 주 소스의 오류가 전파됩니다.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::cache::refresh::RefreshCache;
use crate::error::{DataError, Result};
use crate::provider::{Listing, ListingProvider, SeriesProvider, SeriesRequest};
use pulse_core::{
    AppConfig, Granularity, Series, SeriesKey, SeriesPoint, SeriesRecord, SourceId,
    TraditionalIndicator,
};

/// 매니저가 사용하는 소스 클라이언트 집합.
pub struct ProviderSet {
    /// 주 암호화폐 가격 소스 (키가 없으면 None)
    pub primary: Option<Arc<dyn SeriesProvider>>,
    /// 보조 암호화폐 가격 소스
    pub fallback: Arc<dyn SeriesProvider>,
    /// 심리 지수 소스
    pub sentiment: Arc<dyn SeriesProvider>,
    /// 전통 시장 지표 소스
    pub indicators: Arc<dyn SeriesProvider>,
    /// 시가총액 순위 목록 소스 (키가 없으면 None)
    pub listings: Option<Arc<dyn ListingProvider>>,
}

/// 여러 심볼 일괄 조회의 결과.
///
/// 실패한 심볼은 전체를 중단시키지 않고 여기에 기록됩니다.
pub struct CryptoBatch {
    /// 성공적으로 조회된 시리즈 (심볼당 하나)
    pub series: Vec<Series>,
    /// 실패한 심볼과 원인
    pub failures: Vec<(String, DataError)>,
}

/// 캐시와 소스 클라이언트를 조정하는 중앙 데이터 매니저.
pub struct MarketDataManager {
    cache: RefreshCache,
    providers: ProviderSet,
    days_of_history: i64,
}

impl MarketDataManager {
    /// 새 데이터 매니저를 생성합니다.
    pub fn new(cache: RefreshCache, providers: ProviderSet, days_of_history: i64) -> Self {
        Self {
            cache,
            providers,
            days_of_history,
        }
    }

    /// 설정에서 실제 클라이언트들로 매니저를 구성합니다.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        use crate::provider::{CoinMarketCapClient, FearGreedClient, YahooFinanceClient};

        let cmc = match &config.api.cmc_api_key {
            Some(key) => Some(Arc::new(CoinMarketCapClient::new(
                Some(key.clone()),
                Some(config.api.cmc_base_url.clone()),
            ))),
            None => {
                // 키 없음 → 주 소스 영구 강등, 모든 조회가 보조 소스로 넘어감
                warn!("CMC API 키가 설정되지 않음. 암호화폐 가격은 Yahoo Finance로만 조회됩니다");
                None
            }
        };

        let yahoo: Arc<YahooFinanceClient> = Arc::new(YahooFinanceClient::new()?);
        let sentiment = Arc::new(FearGreedClient::new(config.api.fear_greed_url.clone()));

        let providers = ProviderSet {
            primary: cmc.clone().map(|c| c as Arc<dyn SeriesProvider>),
            fallback: yahoo.clone(),
            sentiment,
            indicators: yahoo,
            listings: cmc.map(|c| c as Arc<dyn ListingProvider>),
        };

        let cache = RefreshCache::new(crate::cache::policy::StalenessPolicy::from_config(
            &config.cache,
        ));

        Ok(Self::new(cache, providers, config.data.days_of_history))
    }

    /// 내부 캐시 참조 (스냅샷 저장/복원용).
    pub fn cache(&self) -> &RefreshCache {
        &self.cache
    }

    /// 조회 구간 계산.
    ///
    /// 끝 시각을 단위 경계로 내림 정렬해 같은 버킷 안의 반복 요청이
    /// 같은 캐시 키를 만들도록 합니다.
    fn window(&self, granularity: Granularity) -> (DateTime<Utc>, DateTime<Utc>) {
        let end = granularity.truncate(Utc::now());
        (end - Duration::days(self.days_of_history), end)
    }

    /// 단일 암호화폐의 과거 가격 시계열 조회 (주 → 보조 전환).
    pub async fn crypto_series(&self, symbol: &str) -> Result<SeriesRecord> {
        let (start, end) = self.window(Granularity::D1);
        let req = SeriesRequest::single(symbol.to_uppercase(), start, end, Granularity::D1);
        let key = req.key(SourceId::CoinMarketCap);

        let primary = self.providers.primary.clone();
        let fallback = self.providers.fallback.clone();
        let symbol = symbol.to_uppercase();

        self.cache
            .get_or_fetch(key, || async move {
                let primary_err = match &primary {
                    Some(provider) => match provider.fetch_series(&req).await {
                        Ok(series) if series.iter().any(|s| !s.is_empty()) => return Ok(series),
                        Ok(_) => DataError::NoData(format!("primary returned empty {}", symbol)),
                        Err(e) => e,
                    },
                    None => DataError::MissingApiKey,
                };

                if primary_err.is_fallback_eligible() {
                    warn!(symbol = %symbol, error = %primary_err, "주 소스 실패, 보조 소스로 전환");
                    match fallback.fetch_series(&req).await {
                        Ok(series) => {
                            info!(symbol = %symbol, "보조 소스에서 조회 성공");
                            return Ok(series);
                        }
                        Err(fallback_err) => {
                            warn!(symbol = %symbol, error = %fallback_err, "보조 소스도 실패");
                        }
                    }
                }

                Err(primary_err)
            })
            .await
    }

    /// Fear & Greed 심리 지수 시계열 조회.
    pub async fn sentiment_series(&self) -> Result<SeriesRecord> {
        let (start, end) = self.window(Granularity::D1);
        let req = SeriesRequest::single("FNG", start, end, Granularity::D1);
        let key = req.key(SourceId::FearGreed);

        let provider = self.providers.sentiment.clone();
        self.cache
            .get_or_fetch(key, || async move { provider.fetch_series(&req).await })
            .await
    }

    /// 전통 시장 지표 시계열 조회.
    pub async fn indicator_series(&self, indicator: TraditionalIndicator) -> Result<SeriesRecord> {
        let (start, end) = self.window(Granularity::D1);
        let req = SeriesRequest::single(indicator.yahoo_ticker(), start, end, Granularity::D1);
        let key = req.key(SourceId::YahooFinance);

        let provider = self.providers.indicators.clone();
        self.cache
            .get_or_fetch(key, || async move { provider.fetch_series(&req).await })
            .await
    }

    /// 시가총액 상위 암호화폐 목록 조회 (순위순).
    ///
    /// 목록은 심볼당 한 포인트짜리 시리즈로 캐시되며, 가격 데이터와 같은
    /// 신선도 정책을 따릅니다.
    pub async fn top_symbols(&self, n: usize) -> Result<Vec<Listing>> {
        let provider = self
            .providers
            .listings
            .clone()
            .ok_or(DataError::MissingApiKey)?;

        let now = Granularity::D1.truncate(Utc::now());
        let key = SeriesKey::new(
            SourceId::CoinMarketCap,
            &[format!("TOP{}", n)],
            now,
            now,
            Granularity::D1,
        );

        let record = self
            .cache
            .get_or_fetch(key, || async move {
                let listings = provider.fetch_top(n).await?;
                let fetched = Utc::now();
                Ok(listings
                    .into_iter()
                    .map(|l| Series::new(l.symbol, vec![SeriesPoint::new(fetched, l.price)]))
                    .collect())
            })
            .await?;

        Ok(record
            .series
            .iter()
            .filter_map(|s| {
                s.last().map(|p| Listing {
                    symbol: s.name.clone(),
                    price: p.value,
                })
            })
            .collect())
    }

    /// 여러 심볼의 가격 시계열 일괄 조회.
    ///
    /// 실패한 심볼은 경고 후 건너뛰고 결과에 원인을 기록합니다.
    pub async fn all_crypto_series(&self, symbols: &[String]) -> CryptoBatch {
        let mut batch = CryptoBatch {
            series: Vec::with_capacity(symbols.len()),
            failures: Vec::new(),
        };

        for symbol in symbols {
            match self.crypto_series(symbol).await {
                Ok(record) => {
                    if let Some(series) = record.series.into_iter().next() {
                        batch.series.push(series);
                    }
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "심볼 조회 실패, 건너뜀");
                    batch.failures.push((symbol.clone(), e));
                }
            }
        }

        info!(
            loaded = batch.series.len(),
            failed = batch.failures.len(),
            "암호화폐 일괄 조회 완료"
        );
        batch
    }
}
