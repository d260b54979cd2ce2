//! 공통 도메인 타입.

pub mod granularity;
pub mod series;
pub mod source;

pub use granularity::Granularity;
pub use series::{Series, SeriesKey, SeriesPoint, SeriesRecord};
pub use source::{SourceId, TraditionalIndicator};
