//! 날짜 인덱스 기반 정렬 테이블.
//!
//! 여러 시리즈를 하나의 날짜 축 위에 정렬해 상관행렬과 롤링 상관계수를
//! 계산합니다. 암호화폐는 연중무휴로 거래되지만 전통 시장은 평일에만
//! 거래되므로, 분석 전에 다음 순서로 정리합니다:
//!
//! 1. 일 단위 리샘플링 (하루의 마지막 관측치)
//! 2. 전통 시장 칼럼의 주말/휴일 전방 채움
//! 3. 평일만 유지
//! 4. 값이 빠진 행 제거

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::correlation::pearson;
use pulse_core::Series;

/// 이름이 붙은 칼럼.
#[derive(Debug, Clone)]
pub struct Column {
    /// 칼럼 이름 (심볼 또는 지표 레이블)
    pub name: String,
    /// 날짜 축과 같은 길이의 값 목록. 관측치가 없는 날은 `None`
    pub values: Vec<Option<f64>>,
}

/// 날짜 인덱스 기반 정렬 테이블.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// 날짜 축 (오름차순)
    pub index: Vec<NaiveDate>,
    /// 칼럼 목록
    pub columns: Vec<Column>,
}

/// 상관행렬 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// 칼럼 레이블 (행/열 순서)
    pub labels: Vec<String>,
    /// 상관계수 행렬 (N×N). 표본 부족 쌍은 `None`
    pub matrix: Vec<Vec<Option<f64>>>,
    /// 사용된 관측치(행) 수
    pub observations: usize,
}

/// 단일 목표 칼럼 대비 롤링 상관계수.
#[derive(Debug, Clone)]
pub struct RollingCorrelation {
    /// 날짜 축
    pub index: Vec<NaiveDate>,
    /// 목표 칼럼 이름
    pub target: String,
    /// 칼럼별 롤링 계수 (처음 `window - 1`개 위치는 `None`)
    pub columns: Vec<Column>,
}

impl Frame {
    /// 시리즈 목록에서 테이블을 만듭니다.
    ///
    /// 날짜 축은 모든 시리즈 날짜의 합집합이고, 각 칼럼은 하루의 마지막
    /// 관측치로 리샘플링됩니다.
    pub fn from_daily_series(series: &[Series]) -> Self {
        use rust_decimal::prelude::ToPrimitive;

        // 시리즈별 (날짜 → 마지막 값). 포인트는 이미 시간 오름차순
        let mut per_series: Vec<(String, BTreeMap<NaiveDate, f64>)> = Vec::new();
        let mut dates: BTreeMap<NaiveDate, ()> = BTreeMap::new();

        for s in series {
            let mut daily = BTreeMap::new();
            for p in &s.points {
                if let Some(v) = p.value.to_f64() {
                    daily.insert(p.timestamp.date_naive(), v);
                }
            }
            for date in daily.keys() {
                dates.insert(*date, ());
            }
            per_series.push((s.name.clone(), daily));
        }

        let index: Vec<NaiveDate> = dates.into_keys().collect();
        let columns = per_series
            .into_iter()
            .map(|(name, daily)| Column {
                values: index.iter().map(|d| daily.get(d).copied()).collect(),
                name,
            })
            .collect();

        Self { index, columns }
    }

    /// 행 수.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// 테이블이 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty() || self.columns.is_empty()
    }

    /// 이름으로 칼럼 조회.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// 지정한 칼럼들을 전방 채움합니다.
    ///
    /// 평일에만 거래되는 전통 시장 지표를 주말의 암호화폐 관측치와 맞추기
    /// 위해 사용합니다. 첫 관측치 이전의 구멍은 채우지 않습니다.
    pub fn forward_fill(&mut self, names: &[&str]) {
        for column in &mut self.columns {
            if !names.contains(&column.name.as_str()) {
                continue;
            }
            let mut last = None;
            for value in &mut column.values {
                match value {
                    Some(v) => last = Some(*v),
                    None => *value = last,
                }
            }
        }
    }

    /// 평일(월~금) 행만 유지합니다.
    pub fn retain_business_days(&mut self) {
        self.retain_rows(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun));
    }

    /// 모든 칼럼에 값이 있는 행만 유지합니다.
    pub fn drop_incomplete_rows(&mut self) {
        let keep: Vec<bool> = (0..self.index.len())
            .map(|i| self.columns.iter().all(|c| c.values[i].is_some()))
            .collect();
        let mut it = keep.iter();
        self.index.retain(|_| *it.next().unwrap_or(&false));
        for column in &mut self.columns {
            let mut it = keep.iter();
            column.values.retain(|_| *it.next().unwrap_or(&false));
        }
    }

    fn retain_rows<F: Fn(&NaiveDate) -> bool>(&mut self, pred: F) {
        let keep: Vec<bool> = self.index.iter().map(|d| pred(d)).collect();
        let mut it = keep.iter();
        self.index.retain(|_| *it.next().unwrap_or(&false));
        for column in &mut self.columns {
            let mut it = keep.iter();
            column.values.retain(|_| *it.next().unwrap_or(&false));
        }
    }

    /// 칼럼별 구간 수익률 테이블을 만듭니다.
    ///
    /// 첫 행은 기준이 없으므로 버려집니다. `exempt`에 있는 칼럼(심리
    /// 지수처럼 이미 수준 값인 칼럼)은 수익률 대신 원래 값을 유지합니다.
    pub fn returns(&self, exempt: &[&str]) -> Frame {
        if self.len() < 2 {
            return Frame::default();
        }

        let index = self.index[1..].to_vec();
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let passthrough = exempt.contains(&column.name.as_str());
                let values = (1..column.values.len())
                    .map(|i| {
                        if passthrough {
                            return column.values[i];
                        }
                        match (column.values[i - 1], column.values[i]) {
                            (Some(prev), Some(curr)) if prev != 0.0 => {
                                Some((curr - prev) / prev)
                            }
                            _ => None,
                        }
                    })
                    .collect();
                Column {
                    name: column.name.clone(),
                    values,
                }
            })
            .collect();

        Frame { index, columns }
    }

    /// 모든 칼럼 쌍의 상관행렬을 계산합니다.
    ///
    /// 대각선은 1.0이고 행렬은 대칭입니다. 겹치는 표본이 2개 미만이거나
    /// 분산이 0인 쌍은 `None`입니다.
    pub fn correlation_matrix(&self) -> Option<CorrelationMatrix> {
        if self.is_empty() {
            return None;
        }

        let n = self.columns.len();
        let mut matrix = vec![vec![None; n]; n];

        for i in 0..n {
            matrix[i][i] = Some(1.0);
            for j in (i + 1)..n {
                let corr = self.pairwise(&self.columns[i], &self.columns[j]);
                matrix[i][j] = corr;
                matrix[j][i] = corr;
            }
        }

        debug!(columns = n, rows = self.len(), "상관행렬 계산");
        Some(CorrelationMatrix {
            labels: self.columns.iter().map(|c| c.name.clone()).collect(),
            matrix,
            observations: self.len(),
        })
    }

    /// 두 칼럼에서 모두 값이 있는 행만 모아 상관계수를 계산합니다.
    fn pairwise(&self, a: &Column, b: &Column) -> Option<f64> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = a
            .values
            .iter()
            .zip(&b.values)
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .unzip();
        pearson(&xs, &ys)
    }

    /// 목표 칼럼 대비 각 칼럼의 롤링 상관계수를 계산합니다.
    ///
    /// 윈도우 안에 빠진 표본이 있으면 그 위치도 `None`입니다.
    pub fn rolling_corr_with(&self, target: &str, window: usize) -> Option<RollingCorrelation> {
        if window < 2 {
            return None;
        }
        let target_column = self.column(target)?.clone();

        let columns = self
            .columns
            .iter()
            .filter(|c| c.name != target)
            .map(|column| {
                let values = (0..self.len())
                    .map(|i| {
                        if i + 1 < window {
                            return None;
                        }
                        let lo = i + 1 - window;
                        let (xs, ys): (Vec<f64>, Vec<f64>) = (lo..=i)
                            .filter_map(|k| Some((column.values[k]?, target_column.values[k]?)))
                            .unzip();
                        if xs.len() < window {
                            return None;
                        }
                        pearson(&xs, &ys)
                    })
                    .collect();
                Column {
                    name: column.name.clone(),
                    values,
                }
            })
            .collect();

        Some(RollingCorrelation {
            index: self.index.clone(),
            target: target.to_string(),
            columns,
        })
    }
}
