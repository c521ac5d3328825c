//! # MRP Calculation Engine
//!
//! 需求展開、彙總樞紐與庫存覆蓋率分析

pub mod analyzer;
pub mod coverage;
pub mod explosion;
pub mod filter;
pub mod insights;
pub mod pivot;

// Re-export 主要類型
pub use analyzer::MrpAnalyzer;
pub use filter::{CoverageFilter, FilterOptions};
pub use mrp_core::{MrpWarning, WarningSeverity};
pub use pivot::{BomMembershipPivot, DatePivot, OrderTypePivot};

use chrono::NaiveDate;
use mrp_core::{CoverageRecord, PlanEntry, RequirementRecord};

/// MRP 分析結果
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// 計劃表展開後的記錄
    pub plan_entries: Vec<PlanEntry>,

    /// 成功解析的計劃日期（排序）
    pub dates: Vec<NaiveDate>,

    /// 需求記錄（計劃 × BOM）
    pub requirements: Vec<RequirementRecord>,

    /// 計劃中有但沒有 BOM 的成品
    pub missing_boms: Vec<String>,

    /// 子件 × 日期需求
    pub by_date: DatePivot,

    /// 子件 × (日期, 訂單類型) 需求
    pub by_order_type: OrderTypePivot,

    /// 子件在各成品 BOM 中的使用情況
    pub bom_membership: BomMembershipPivot,

    /// 覆蓋率分析（未過濾）
    pub coverage: Vec<CoverageRecord>,

    /// 計劃摘要
    pub summary: insights::PlanSummary,

    /// 每月計劃量分佈
    pub monthly: insights::MonthlyDistribution,

    /// 警告信息
    pub warnings: Vec<MrpWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl AnalysisResult {
    /// 套用過濾條件，依覆蓋率由低到高排序（無定義者在後）
    pub fn filtered_coverage(&self, filter: &CoverageFilter) -> Vec<&CoverageRecord> {
        let mut rows = filter.apply(&self.coverage);
        coverage::sort_by_coverage(&mut rows);
        rows
    }
}
