//! 分析配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::calendar::DATE_LABEL_FORMAT;
use crate::{MrpError, Result};

/// 缺值時使用的預設標籤
pub const DEFAULT_UNDEFINED_LABEL: &str = "undefined";

/// 覆蓋率與優先級門檻（百分比單位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageThresholds {
    /// 低於此覆蓋率且需求量超過 `urgent_min_required` 時為緊急
    pub urgent_coverage_pct: Decimal,

    /// 緊急判定的最低總需求量（嚴格大於）
    pub urgent_min_required: Decimal,

    /// 低於此覆蓋率為中等優先
    pub medium_coverage_pct: Decimal,

    /// 達到此覆蓋率為充足
    pub sufficient_coverage_pct: Decimal,

    /// 達到此覆蓋率為部分覆蓋
    pub partial_coverage_pct: Decimal,
}

impl Default for CoverageThresholds {
    fn default() -> Self {
        Self {
            urgent_coverage_pct: Decimal::from(30),
            urgent_min_required: Decimal::from(1000),
            medium_coverage_pct: Decimal::from(50),
            sufficient_coverage_pct: Decimal::from(100),
            partial_coverage_pct: Decimal::from(50),
        }
    }
}

/// 分析配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 覆蓋率門檻
    pub thresholds: CoverageThresholds,

    /// 缺少 MRP 控制員、物料訂單類型或層級時的標籤
    pub undefined_label: String,

    /// 物料訂單類型代碼 → 顯示標籤（F 採購、E 生產）
    pub order_type_labels: BTreeMap<String, String>,

    /// 最低覆蓋率清單筆數
    pub lowest_coverage_count: usize,

    /// 日期欄位標籤格式
    pub date_label_format: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let mut order_type_labels = BTreeMap::new();
        order_type_labels.insert("F".to_string(), "Purchase".to_string());
        order_type_labels.insert("E".to_string(), "Manufacture".to_string());

        Self {
            thresholds: CoverageThresholds::default(),
            undefined_label: DEFAULT_UNDEFINED_LABEL.to_string(),
            order_type_labels,
            lowest_coverage_count: 10,
            date_label_format: DATE_LABEL_FORMAT.to_string(),
        }
    }
}

impl AnalysisConfig {
    /// 從 JSON 讀取配置，未提供的欄位使用預設值
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MrpError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置門檻
    pub fn with_thresholds(mut self, thresholds: CoverageThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// 建構器模式：設置缺值標籤
    pub fn with_undefined_label(mut self, label: impl Into<String>) -> Self {
        self.undefined_label = label.into();
        self
    }

    /// 建構器模式：新增物料訂單類型標籤
    pub fn with_order_type_label(
        mut self,
        code: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.order_type_labels.insert(code.into(), label.into());
        self
    }

    /// 建構器模式：設置最低覆蓋率清單筆數
    pub fn with_lowest_coverage_count(mut self, count: usize) -> Self {
        self.lowest_coverage_count = count;
        self
    }

    /// 建構器模式：設置日期欄位標籤格式
    pub fn with_date_label_format(mut self, format: impl Into<String>) -> Self {
        self.date_label_format = format.into();
        self
    }

    /// 物料訂單類型代碼的顯示標籤，未對應時回傳缺值標籤
    pub fn order_type_label(&self, code: &str) -> &str {
        self.order_type_labels
            .get(code.trim())
            .map(String::as_str)
            .unwrap_or(&self.undefined_label)
    }

    /// 檢查門檻設定
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if t.urgent_coverage_pct > t.medium_coverage_pct {
            return Err(MrpError::Config(format!(
                "緊急覆蓋率門檻 {} 不可高於中等門檻 {}",
                t.urgent_coverage_pct, t.medium_coverage_pct
            )));
        }
        if t.partial_coverage_pct > t.sufficient_coverage_pct {
            return Err(MrpError::Config(format!(
                "部分覆蓋門檻 {} 不可高於充足門檻 {}",
                t.partial_coverage_pct, t.sufficient_coverage_pct
            )));
        }
        if self.undefined_label.trim().is_empty() {
            return Err(MrpError::Config("缺值標籤不可為空".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();

        assert_eq!(config.thresholds.urgent_coverage_pct, Decimal::from(30));
        assert_eq!(config.thresholds.urgent_min_required, Decimal::from(1000));
        assert_eq!(config.thresholds.medium_coverage_pct, Decimal::from(50));
        assert_eq!(config.order_type_label("F"), "Purchase");
        assert_eq!(config.order_type_label("E"), "Manufacture");
        assert_eq!(config.order_type_label("X"), "undefined");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AnalysisConfig::default()
            .with_undefined_label("n/a")
            .with_order_type_label("U", "Subcontract")
            .with_lowest_coverage_count(5);

        assert_eq!(config.order_type_label("U"), "Subcontract");
        assert_eq!(config.order_type_label("Z"), "n/a");
        assert_eq!(config.lowest_coverage_count, 5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            AnalysisConfig::from_json_str(r#"{ "thresholds": { "urgent_min_required": "500" } }"#)
                .unwrap();

        assert_eq!(config.thresholds.urgent_min_required, Decimal::from(500));
        assert_eq!(config.thresholds.urgent_coverage_pct, Decimal::from(30));
        assert_eq!(config.undefined_label, "undefined");
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let result = AnalysisConfig::from_json_str(
            r#"{ "thresholds": { "urgent_coverage_pct": "60" } }"#,
        );
        assert!(matches!(result, Err(MrpError::Config(_))));
    }
}
