//! # MRP Coverage
//!
//! 子件需求與庫存覆蓋率分析：載入 → 分析 → 報表 → 匯出

pub mod logging;
pub mod pipeline;
pub mod report;

pub use pipeline::{build_filter, Pipeline};
pub use report::Report;
