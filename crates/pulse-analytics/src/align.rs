//! 시계열 정렬 유틸리티.
//!
//! 상관계수는 같은 시점의 관측치끼리만 비교해야 합니다. 이 모듈은
//! 두 시리즈를 타임스탬프 기준 내부 조인으로 정렬합니다. 한쪽에만
//! 존재하는 시점은 버려집니다.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use pulse_core::Series;

/// 두 시리즈를 공유 타임스탬프로 정렬합니다.
///
/// # 반환
///
/// `(타임스탬프, a의 값, b의 값)` 튜플 벡터 (시간 오름차순).
/// f64로 표현할 수 없는 값을 가진 시점은 제외됩니다.
pub fn inner_join(a: &Series, b: &Series) -> Vec<(DateTime<Utc>, f64, f64)> {
    use rust_decimal::prelude::ToPrimitive;

    let b_by_ts: HashMap<DateTime<Utc>, f64> = b
        .points
        .iter()
        .filter_map(|p| p.value.to_f64().map(|v| (p.timestamp, v)))
        .collect();

    a.points
        .iter()
        .filter_map(|p| {
            let x = p.value.to_f64()?;
            let y = *b_by_ts.get(&p.timestamp)?;
            Some((p.timestamp, x, y))
        })
        .collect()
}
