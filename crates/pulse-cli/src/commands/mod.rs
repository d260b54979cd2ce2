//! CLI 하위 명령 구현.

pub mod correlate;
pub mod rolling;
pub mod sentiment;
pub mod top;
