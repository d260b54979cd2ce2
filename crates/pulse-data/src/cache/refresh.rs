//! 리프레시 캐시 구현.
//!
//! # 동작 흐름
//!
//! ```text
//! get_or_fetch(key, fetch_fn)
//!         │
//!   ┌─────▼──────┐
//!   │ 레코드 존재? │
//!   └─────┬──────┘
//!     YES │ NO
//!   ┌─────▼─────┐   │
//!   │ 신선한가?  │   │
//!   └─────┬─────┘   │
//!     YES │ NO      │
//!         │  └──────┤
//!         │         ▼
//!         │   fetch_fn().await
//!         │   성공 → 저장(교체) 후 반환
//!         │   실패 → 기존 레코드 유지, 오류 전파
//!         ▼
//!   저장된 레코드 반환 (I/O 없음)
//! ```
//!
//! 세션/요청 컨텍스트가 소유하는 명시적 저장소이며, 프로세스 전역
//! 싱글턴이 아닙니다. 축출 정책은 없고 교체만 있으므로 저장소 크기는
//! 프로세스 수명 동안 요청된 서로 다른 키 수로 한정됩니다.

use std::collections::HashMap;
use std::future::Future;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::policy::StalenessPolicy;
use crate::error::Result;
use pulse_core::{Series, SeriesKey, SeriesRecord};

/// 신선도 정책 기반 리프레시 캐시.
pub struct RefreshCache {
    policy: StalenessPolicy,
    store: RwLock<HashMap<SeriesKey, SeriesRecord>>,
}

impl RefreshCache {
    /// 새 캐시를 생성합니다.
    pub fn new(policy: StalenessPolicy) -> Self {
        Self {
            policy,
            store: RwLock::new(HashMap::new()),
        }
    }

    /// 신선한 레코드를 반환하거나, 없으면 가져와 저장 후 반환합니다.
    ///
    /// `fetch_fn`이 실패하면 기존 레코드(있다면)는 교체되지 않고 오류가
    /// 그대로 전파됩니다. 오래된 레코드를 대체 제공할지는 호출자가
    /// [`RefreshCache::peek`]으로 결정할 문제입니다.
    pub async fn get_or_fetch<F, Fut>(&self, key: SeriesKey, fetch_fn: F) -> Result<SeriesRecord>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Series>>>,
    {
        let max_age = self.policy.max_age(key.source);

        {
            let store = self.store.read().await;
            if let Some(record) = store.get(&key) {
                if record.age(Utc::now()) < max_age {
                    debug!(key = %key, age_secs = record.age(Utc::now()).num_seconds(), "캐시 적중");
                    return Ok(record.clone());
                }
                debug!(key = %key, "캐시 레코드 만료");
            }
        }

        let series = fetch_fn().await?;

        let record = SeriesRecord {
            key: key.clone(),
            fetched_at: Utc::now(),
            series,
        };

        // 마지막 쓰기 우선. 이전 레코드는 버려짐
        self.store.write().await.insert(key, record.clone());

        info!(key = %record.key, series = record.series.len(), "캐시 갱신");
        Ok(record)
    }

    /// 신선도와 무관하게 현재 레코드를 반환합니다.
    ///
    /// 업스트림 실패 시 오래된 데이터를 경고와 함께 보여주는 식의
    /// 호출자 측 대체 정책에 사용됩니다.
    pub async fn peek(&self, key: &SeriesKey) -> Option<SeriesRecord> {
        self.store.read().await.get(key).cloned()
    }

    /// 특정 키의 레코드를 제거합니다.
    pub async fn invalidate(&self, key: &SeriesKey) -> bool {
        self.store.write().await.remove(key).is_some()
    }

    /// 모든 레코드를 제거합니다.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// 저장된 레코드 수.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// 저장소가 비어 있는지 확인.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// 저장된 모든 레코드의 사본 (스냅샷 저장용).
    pub(crate) async fn records(&self) -> Vec<SeriesRecord> {
        self.store.read().await.values().cloned().collect()
    }

    /// 레코드를 그대로 삽입합니다 (스냅샷 복원용).
    ///
    /// `fetched_at`을 보존하므로 복원된 레코드에도 신선도 정책이
    /// 자연스럽게 적용됩니다.
    pub(crate) async fn restore(&self, record: SeriesRecord) {
        self.store.write().await.insert(record.key.clone(), record);
    }
}

impl Default for RefreshCache {
    fn default() -> Self {
        Self::new(StalenessPolicy::default())
    }
}
