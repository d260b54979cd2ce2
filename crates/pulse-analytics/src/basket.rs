//! 카테고리 버스킷 지수.
//!
//! 개별 코인을 카테고리(Layer1, DeFi, Meme 등)로 묶어 등가중 평균 가격
//! 지수를 만듭니다. 지수 시리즈는 다른 가격 시리즈와 똑같이 수익률 변환과
//! 상관계수 계산을 거칩니다.

use chrono::{NaiveDate, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::frame::Frame;
use pulse_core::categories::{category_names, members_of};
use pulse_core::{Series, SeriesPoint};

/// 카테고리 지수 시리즈 이름 접미사.
pub const INDEX_SUFFIX: &str = "_Index";

/// 사용 가능한 심볼들로 카테고리별 등가중 가격 지수를 만듭니다.
///
/// 카테고리 구성원 중 입력에 존재하는 심볼만 사용하며, 구성원이 하나도
/// 없는 카테고리는 건너뜁니다. 각 날짜의 지수 값은 그 날짜에 관측치가
/// 있는 구성원들의 평균입니다.
///
/// # 반환
///
/// `"{카테고리}_Index"` 이름의 시리즈 목록 (카테고리 테이블 순서).
pub fn category_price_indices(crypto: &[Series]) -> Vec<Series> {
    let mut indices = Vec::new();

    for category in category_names() {
        let Some(members) = members_of(category) else {
            continue;
        };

        let available: Vec<&Series> = crypto
            .iter()
            .filter(|s| members.iter().any(|m| m.eq_ignore_ascii_case(&s.name)))
            .collect();
        if available.is_empty() {
            continue;
        }

        let member_series: Vec<Series> = available.iter().map(|s| (*s).clone()).collect();
        let frame = Frame::from_daily_series(&member_series);

        let points: Vec<SeriesPoint> = frame
            .index
            .iter()
            .enumerate()
            .filter_map(|(row, date)| {
                let values: Vec<f64> = frame
                    .columns
                    .iter()
                    .filter_map(|c| c.values[row])
                    .collect();
                if values.is_empty() {
                    return None;
                }
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                Some(SeriesPoint::new(
                    date_to_utc(*date)?,
                    Decimal::from_f64(mean)?,
                ))
            })
            .collect();

        if points.is_empty() {
            continue;
        }

        debug!(
            category = category,
            members = available.len(),
            "카테고리 지수 생성"
        );
        indices.push(Series::new(format!("{}{}", category, INDEX_SUFFIX), points));
    }

    indices
}

fn date_to_utc(date: NaiveDate) -> Option<chrono::DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}
