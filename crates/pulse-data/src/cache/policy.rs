//! 소스별 신선도 정책.

use chrono::Duration;

use pulse_core::{CacheConfig, SourceId};

/// 소스별 최대 허용 나이.
///
/// 레코드는 `now - fetched_at < max_age(source)`인 동안에만 재조회 없이
/// 제공될 수 있습니다.
#[derive(Debug, Clone)]
pub struct StalenessPolicy {
    /// 암호화폐 가격 데이터 최대 나이
    crypto_max_age: Duration,
    /// 심리 지수 데이터 최대 나이
    sentiment_max_age: Duration,
    /// 전통 시장 지표 데이터 최대 나이
    indicator_max_age: Duration,
}

impl StalenessPolicy {
    /// 설정에서 정책을 생성합니다.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            crypto_max_age: Duration::minutes(config.crypto_max_age_min),
            sentiment_max_age: Duration::minutes(config.sentiment_max_age_min),
            indicator_max_age: Duration::minutes(config.indicator_max_age_min),
        }
    }

    /// 소스의 최대 허용 나이를 반환합니다.
    ///
    /// 암호화폐 키는 보조 클라이언트가 응답한 경우에도 논리 소스인
    /// `CoinMarketCap`으로 만들어지므로, 가격 정책이 일관되게 적용됩니다.
    pub fn max_age(&self, source: SourceId) -> Duration {
        match source {
            SourceId::CoinMarketCap => self.crypto_max_age,
            SourceId::FearGreed => self.sentiment_max_age,
            SourceId::YahooFinance => self.indicator_max_age,
        }
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
