//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정은 파일(`config/default.toml`)에서 로드되며 `PULSE__` 접두사의
//! 환경 변수로 오버라이드됩니다. CoinMarketCap API 키는 원본 배포 환경과의
//! 호환성을 위해 `CMC_API_KEY` 환경 변수도 인식합니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 업스트림 API 설정
    #[serde(default)]
    pub api: ApiConfig,
    /// 데이터 조회 설정
    #[serde(default)]
    pub data: DataConfig,
    /// 캐시 설정
    #[serde(default)]
    pub cache: CacheConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 업스트림 API 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// CoinMarketCap API 키. 없으면 주 소스는 영구 실패로 강등되어
    /// 모든 암호화폐 조회가 보조 소스로 넘어갑니다.
    pub cmc_api_key: Option<String>,
    /// CoinMarketCap API 기본 URL
    pub cmc_base_url: String,
    /// Fear & Greed Index API URL
    pub fear_greed_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cmc_api_key: None,
            cmc_base_url: "https://pro-api.coinmarketcap.com/v1".to_string(),
            fear_greed_url: "https://api.alternative.me/fng/".to_string(),
        }
    }
}

/// 데이터 조회 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// 과거 데이터 조회 기간 (일)
    pub days_of_history: i64,
    /// 분석 대상 상위 암호화폐 개수
    pub top_n_crypto: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            days_of_history: 365,
            top_n_crypto: 50,
        }
    }
}

/// 캐시 설정.
///
/// 소스별 최대 허용 나이(분). 이 시간 이내의 레코드는 재조회 없이
/// 그대로 반환됩니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 암호화폐 가격 데이터 최대 나이 (분)
    pub crypto_max_age_min: i64,
    /// 심리 지수 데이터 최대 나이 (분)
    pub sentiment_max_age_min: i64,
    /// 전통 시장 지표 데이터 최대 나이 (분)
    pub indicator_max_age_min: i64,
    /// 디스크 스냅샷 디렉터리 (없으면 인메모리 전용)
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            crypto_max_age_min: 5,
            sentiment_max_age_min: 60,
            indicator_max_age_min: 60,
            snapshot_dir: None,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨 필터 (예: "info", "pulse_data=debug")
    pub level: String,
    /// 출력 형식 ("pretty", "json", "compact")
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드 (예: PULSE__API__CMC_API_KEY)
            .add_source(
                config::Environment::with_prefix("PULSE")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        Ok(config.with_env_api_key())
    }

    /// 파일이 있으면 로드하고, 없으면 기본값에 환경 변수만 반영합니다.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default().with_env_api_key())
        }
    }

    /// `CMC_API_KEY` 환경 변수를 반영합니다 (설정 파일보다 후순위).
    fn with_env_api_key(mut self) -> Self {
        if self.api.cmc_api_key.is_none() {
            self.api.cmc_api_key = std::env::var("CMC_API_KEY").ok().filter(|k| !k.is_empty());
        }
        self
    }
}
