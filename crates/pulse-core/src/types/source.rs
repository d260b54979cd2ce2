//! 데이터 소스 및 전통 시장 지표 정의.
//!
//! 이 모듈은 업스트림 데이터 소스 관련 타입을 정의합니다:
//! - `SourceId` - 업스트림 데이터 소스 식별자
//! - `TraditionalIndicator` - 전통 시장 지표 (S&P 500, VIX)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 업스트림 데이터 소스 식별자.
///
/// 캐시 키의 일부로 사용되며, 소스별 신선도 정책의 기준이 됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// CoinMarketCap (주 암호화폐 가격 소스)
    CoinMarketCap,
    /// Yahoo Finance (보조 암호화폐 소스 + 전통 시장 지표)
    YahooFinance,
    /// Alternative.me Fear & Greed Index (시장 심리 지수)
    FearGreed,
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::CoinMarketCap => write!(f, "cmc"),
            SourceId::YahooFinance => write!(f, "yahoo"),
            SourceId::FearGreed => write!(f, "fng"),
        }
    }
}

impl FromStr for SourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cmc" | "coinmarketcap" => Ok(SourceId::CoinMarketCap),
            "yahoo" | "yahoo_finance" => Ok(SourceId::YahooFinance),
            "fng" | "fear_greed" => Ok(SourceId::FearGreed),
            _ => Err(format!("Unknown source id: {}", s)),
        }
    }
}

/// 전통 시장 지표.
///
/// 암호화폐 시장과의 상관관계 분석에 사용되는 지표들입니다.
/// 각 지표는 Yahoo Finance 티커로 매핑됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraditionalIndicator {
    /// S&P 500 지수
    Sp500,
    /// CBOE 변동성 지수
    Vix,
}

impl TraditionalIndicator {
    /// Yahoo Finance 티커 반환.
    pub fn yahoo_ticker(&self) -> &'static str {
        match self {
            TraditionalIndicator::Sp500 => "^GSPC",
            TraditionalIndicator::Vix => "^VIX",
        }
    }

    /// 상관행렬/차트에 표시할 레이블 반환.
    pub fn label(&self) -> &'static str {
        match self {
            TraditionalIndicator::Sp500 => "SP500",
            TraditionalIndicator::Vix => "VIX",
        }
    }

    /// 지원하는 모든 지표 목록.
    pub fn all() -> &'static [TraditionalIndicator] {
        &[TraditionalIndicator::Sp500, TraditionalIndicator::Vix]
    }
}

impl fmt::Display for TraditionalIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TraditionalIndicator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SP500" | "GSPC" | "^GSPC" | "S&P500" => Ok(TraditionalIndicator::Sp500),
            "VIX" | "^VIX" => Ok(TraditionalIndicator::Vix),
            _ => Err(format!("Unknown indicator: {}", s)),
        }
    }
}
