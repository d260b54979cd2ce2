//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 수집 관련 오류.
///
/// 소스 클라이언트는 일반 실패가 아니라 구별 가능한 오류 종류로 실패해야
/// 합니다. 호출자는 이를 근거로 보조 소스 전환 또는 전파를 결정합니다.
#[derive(Debug, Error)]
pub enum DataError {
    /// API 키 없이 생성된 주 소스 클라이언트
    #[error("API key not configured")]
    MissingApiKey,

    /// 네트워크 오류 또는 업스트림 5xx
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// 요청 한도 초과 (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimited,

    /// 스키마 불일치 또는 파싱 불가능한 응답
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// 2xx 응답이지만 비어 있거나 불충분한 데이터
    #[error("No data: {0}")]
    NoData(String),

    /// 디스크 스냅샷 입출력/직렬화 오류
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl DataError {
    /// 보조 소스 전환 대상인지 확인.
    ///
    /// 업스트림을 향한 실패(비 2xx, 빈 응답 포함)는 모두 전환 대상입니다.
    /// 스냅샷 오류는 로컬 문제이므로 제외됩니다.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            DataError::MissingApiKey
                | DataError::UpstreamUnavailable(_)
                | DataError::RateLimited
                | DataError::MalformedResponse(_)
                | DataError::NoData(_)
        )
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            if status.as_u16() == 429 {
                return DataError::RateLimited;
            }
            return DataError::UpstreamUnavailable(err.to_string());
        }
        if err.is_decode() {
            return DataError::MalformedResponse(err.to_string());
        }
        // 연결 실패, 타임아웃, 요청 중단 등
        DataError::UpstreamUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_eligibility() {
        assert!(DataError::MissingApiKey.is_fallback_eligible());
        assert!(DataError::RateLimited.is_fallback_eligible());
        assert!(DataError::UpstreamUnavailable("503".into()).is_fallback_eligible());
        assert!(DataError::MalformedResponse("bad json".into()).is_fallback_eligible());
        assert!(DataError::NoData("empty".into()).is_fallback_eligible());
        assert!(!DataError::Snapshot("io".into()).is_fallback_eligible());
    }
}
