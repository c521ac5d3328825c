//! # MRP Core
//!
//! 核心資料模型與類型定義

pub mod bom;
pub mod calendar;
pub mod cell;
pub mod columns;
pub mod config;
pub mod coverage;
pub mod input;
pub mod plan;
pub mod requirement;
pub mod warning;

// Re-export 主要類型
pub use bom::{BomLine, ControllerAssignments};
pub use cell::{Cell, Table};
pub use columns::{normalize_columns, ColumnAliases, Field};
pub use config::{AnalysisConfig, CoverageThresholds, DEFAULT_UNDEFINED_LABEL};
pub use coverage::{CoverageRecord, CoverageStatus, Priority};
pub use input::InputData;
pub use plan::PlanEntry;
pub use requirement::{ComponentKey, RequirementRecord};
pub use warning::{MrpWarning, WarningSeverity};

/// MRP 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum MrpError {
    #[error("檔案缺少必要的工作表: {}", .sheets.join(", "))]
    MissingSheet { sheets: Vec<String> },

    #[error("工作表 {sheet} 缺少必要欄位: {}", .columns.join(", "))]
    MissingColumn { sheet: String, columns: Vec<String> },

    #[error("工作表 {sheet} 第 {row} 列的用量無效: {value}")]
    InvalidQuantity {
        sheet: String,
        row: usize,
        value: String,
    },

    #[error("無法解析的日期欄位: {0}")]
    MalformedDate(String),

    #[error("子件 {0} 的總需求為零，覆蓋率無定義")]
    ZeroRequirement(String),

    #[error("數量超出可計算範圍: {0}")]
    QuantityOverflow(String),

    #[error("活頁簿讀取錯誤: {0}")]
    Workbook(String),

    #[error("匯出錯誤: {0}")]
    Export(String),

    #[error("配置錯誤: {0}")]
    Config(String),

    #[error("檔案存取錯誤: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MrpError>;
