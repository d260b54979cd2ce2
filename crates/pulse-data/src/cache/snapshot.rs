//! 캐시 디스크 스냅샷.
//!
//! 저장소를 키당 하나의 JSON 파일로 직렬화하여 프로세스 재시작 사이에
//! 유지합니다. `fetched_at`이 보존되므로 복원된 레코드에도 신선도 정책이
//! 그대로 적용됩니다. 손상된 파일은 건너뛰고 경고만 남깁니다.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::cache::refresh::RefreshCache;
use crate::error::{DataError, Result};
use pulse_core::SeriesRecord;

/// 키 표시 문자열을 파일명으로 쓸 수 있게 정리합니다.
fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl RefreshCache {
    /// 저장소 전체를 디렉터리에 기록합니다.
    ///
    /// 개별 파일 쓰기 실패는 경고 후 건너뛰고, 기록한 레코드 수를
    /// 반환합니다. 디렉터리 생성 실패만 오류입니다.
    pub async fn save_snapshot(&self, dir: &Path) -> Result<usize> {
        fs::create_dir_all(dir)
            .map_err(|e| DataError::Snapshot(format!("{}: {}", dir.display(), e)))?;

        let mut saved = 0;
        for record in self.records().await {
            let path = dir.join(format!("{}.json", sanitize(&record.key.to_string())));
            let body = match serde_json::to_string(&record) {
                Ok(body) => body,
                Err(e) => {
                    warn!(key = %record.key, error = %e, "스냅샷 직렬화 실패, 건너뜀");
                    continue;
                }
            };
            match fs::write(&path, body) {
                Ok(()) => saved += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "스냅샷 쓰기 실패, 건너뜀"),
            }
        }

        debug!(dir = %dir.display(), saved = saved, "캐시 스냅샷 저장");
        Ok(saved)
    }

    /// 디렉터리의 스냅샷을 저장소로 복원합니다.
    ///
    /// 디렉터리가 없으면 아무것도 하지 않습니다. 파싱에 실패한 파일은
    /// 경고 후 건너뛰고, 복원한 레코드 수를 반환합니다.
    pub async fn load_snapshot(&self, dir: &Path) -> Result<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(dir)
            .map_err(|e| DataError::Snapshot(format!("{}: {}", dir.display(), e)))?;

        let mut loaded = 0;
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!(error = %e, "스냅샷 항목 읽기 실패, 건너뜀");
                    continue;
                }
            };
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let record: SeriesRecord = match fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|body| serde_json::from_str(&body).map_err(|e| e.to_string()))
            {
                Ok(record) => record,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "스냅샷 파싱 실패, 건너뜀");
                    continue;
                }
            };

            self.restore(record).await;
            loaded += 1;
        }

        debug!(dir = %dir.display(), loaded = loaded, "캐시 스냅샷 복원");
        Ok(loaded)
    }
}
