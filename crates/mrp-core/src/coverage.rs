//! 庫存覆蓋率模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 覆蓋狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageStatus {
    /// 充足（>= 100%）
    Sufficient,
    /// 部分（50% ~ 100%）
    Partial,
    /// 不足（< 50%）
    Insufficient,
    /// 總需求為零，覆蓋率無定義
    Undefined,
}

impl CoverageStatus {
    pub fn label(self) -> &'static str {
        match self {
            CoverageStatus::Sufficient => "sufficient",
            CoverageStatus::Partial => "partial",
            CoverageStatus::Insufficient => "insufficient",
            CoverageStatus::Undefined => "undefined",
        }
    }
}

impl fmt::Display for CoverageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 補貨優先級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    Medium,
    Low,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 單一子件的覆蓋率分析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRecord {
    pub component_id: String,
    pub component_description: String,
    pub component_uom: String,
    pub current_stock: Decimal,
    pub component_order_type: String,
    pub hierarchy_level: String,

    /// 全部日期與訂單類型的總需求
    pub total_required: Decimal,

    /// 驅動此需求的計劃訂單類型（以 ", " 連接）
    pub order_types: String,

    /// MRP 控制員（無指派時為缺值標籤）
    pub mrp_controller: String,

    /// 覆蓋率（%，一位小數）；總需求為零時為 `None`
    pub coverage_pct: Option<Decimal>,

    pub status: CoverageStatus,

    pub priority: Priority,
}

impl CoverageRecord {
    /// 覆蓋率是否有定義
    pub fn has_coverage(&self) -> bool {
        self.coverage_pct.is_some()
    }

    pub fn is_urgent(&self) -> bool {
        self.priority == Priority::Urgent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_names_match_labels() {
        for status in [
            CoverageStatus::Sufficient,
            CoverageStatus::Partial,
            CoverageStatus::Insufficient,
            CoverageStatus::Undefined,
        ] {
            assert_eq!(serde_json::to_value(status).unwrap(), status.label());
        }
        for priority in [Priority::Urgent, Priority::Medium, Priority::Low] {
            assert_eq!(serde_json::to_value(priority).unwrap(), priority.label());
        }

        let parsed: Priority = serde_json::from_str("\"urgent\"").unwrap();
        assert_eq!(parsed, Priority::Urgent);
    }
}
