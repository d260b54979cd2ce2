//! Integration tests for the primary/fallback source switching in
//! `MarketDataManager`.
//!
//! The scenarios use in-memory mock providers so no network access is
//! required:
//! 1. Primary rate-limited, fallback healthy -> fallback data is cached and
//!    returned with no error surfaced to the caller.
//! 2. No API key (no primary) -> fallback serves everything.
//! 3. Both sources failing -> the primary's error propagates.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pulse_core::{Series, SeriesPoint, SourceId};
use pulse_data::{
    DataError, MarketDataManager, ProviderSet, RefreshCache, SeriesProvider, SeriesRequest,
};

/// Provider that always fails with a fixed error kind.
struct FailingProvider {
    source: SourceId,
    rate_limited: bool,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SeriesProvider for FailingProvider {
    fn source(&self) -> SourceId {
        self.source
    }

    async fn fetch_series(&self, _req: &SeriesRequest) -> Result<Vec<Series>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.rate_limited {
            Err(DataError::RateLimited)
        } else {
            Err(DataError::UpstreamUnavailable("mock outage".into()))
        }
    }
}

/// Provider that returns a fixed two-point series for every requested symbol.
struct FixedProvider {
    source: SourceId,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SeriesProvider for FixedProvider {
    fn source(&self) -> SourceId {
        self.source
    }

    async fn fetch_series(&self, req: &SeriesRequest) -> Result<Vec<Series>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        Ok(req
            .symbols
            .iter()
            .map(|symbol| {
                Series::new(
                    symbol.clone(),
                    vec![
                        SeriesPoint::new(now - Duration::days(1), dec!(100)),
                        SeriesPoint::new(now, dec!(105)),
                    ],
                )
            })
            .collect())
    }
}

struct Harness {
    manager: MarketDataManager,
    primary_calls: Arc<AtomicUsize>,
    fallback_calls: Arc<AtomicUsize>,
}

fn harness(primary: Option<Arc<dyn SeriesProvider>>, primary_calls: Arc<AtomicUsize>) -> Harness {
    let fallback_calls = Arc::new(AtomicUsize::new(0));
    let fallback = Arc::new(FixedProvider {
        source: SourceId::YahooFinance,
        calls: fallback_calls.clone(),
    });

    let providers = ProviderSet {
        primary,
        fallback: fallback.clone(),
        sentiment: Arc::new(FixedProvider {
            source: SourceId::FearGreed,
            calls: Arc::new(AtomicUsize::new(0)),
        }),
        indicators: fallback,
        listings: None,
    };

    Harness {
        manager: MarketDataManager::new(RefreshCache::default(), providers, 30),
        primary_calls,
        fallback_calls,
    }
}

#[tokio::test]
async fn rate_limited_primary_falls_back_without_surfacing_an_error() {
    let primary_calls = Arc::new(AtomicUsize::new(0));
    let primary = Arc::new(FailingProvider {
        source: SourceId::CoinMarketCap,
        rate_limited: true,
        calls: primary_calls.clone(),
    });
    let h = harness(Some(primary), primary_calls);

    let record = h.manager.crypto_series("BTC").await.expect("fallback data");
    assert_eq!(record.series.len(), 1);
    assert_eq!(record.series[0].name, "BTC");
    assert_eq!(record.series[0].len(), 2);

    assert_eq!(h.primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.fallback_calls.load(Ordering::SeqCst), 1);

    // The fallback result is cached: a second request within the staleness
    // window must not touch either source again.
    h.manager.crypto_series("BTC").await.expect("cached data");
    assert_eq!(h.primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.fallback_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.manager.cache().len().await, 1);
}

#[tokio::test]
async fn missing_primary_degrades_to_permanent_fallback() {
    let h = harness(None, Arc::new(AtomicUsize::new(0)));

    let record = h.manager.crypto_series("eth").await.expect("fallback data");
    assert_eq!(record.series[0].name, "ETH");
    assert_eq!(h.fallback_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn both_sources_failing_propagates_the_primary_error() {
    let primary_calls = Arc::new(AtomicUsize::new(0));
    let primary = Arc::new(FailingProvider {
        source: SourceId::CoinMarketCap,
        rate_limited: true,
        calls: primary_calls.clone(),
    });

    let fallback_calls = Arc::new(AtomicUsize::new(0));
    let fallback = Arc::new(FailingProvider {
        source: SourceId::YahooFinance,
        rate_limited: false,
        calls: fallback_calls.clone(),
    });

    let providers = ProviderSet {
        primary: Some(primary),
        fallback: fallback.clone(),
        sentiment: fallback.clone(),
        indicators: fallback,
        listings: None,
    };
    let manager = MarketDataManager::new(RefreshCache::default(), providers, 30);

    let err = manager.crypto_series("BTC").await.unwrap_err();
    assert!(matches!(err, DataError::RateLimited));
    assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    // Nothing was cached for the failed key.
    assert!(manager.cache().is_empty().await);
}

#[tokio::test]
async fn batch_fetch_skips_failing_symbols() {
    let h = harness(None, Arc::new(AtomicUsize::new(0)));

    let batch = h
        .manager
        .all_crypto_series(&["BTC".to_string(), "ETH".to_string()])
        .await;
    assert_eq!(batch.series.len(), 2);
    assert!(batch.failures.is_empty());

    let names: Vec<&str> = batch.series.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["BTC", "ETH"]);
}

#[tokio::test]
async fn indicator_and_sentiment_use_their_own_cache_keys() {
    let h = harness(None, Arc::new(AtomicUsize::new(0)));

    h.manager
        .indicator_series(pulse_core::TraditionalIndicator::Sp500)
        .await
        .expect("indicator data");
    h.manager
        .indicator_series(pulse_core::TraditionalIndicator::Vix)
        .await
        .expect("indicator data");
    h.manager.sentiment_series().await.expect("sentiment data");

    assert_eq!(h.manager.cache().len().await, 3);
}
