//! 覆蓋率過濾（MRP 控制員、物料訂單類型、BOM 層級）

use mrp_core::CoverageRecord;
use serde::Serialize;
use std::collections::BTreeSet;

/// 覆蓋率過濾條件
///
/// 三個條件互相獨立並以 AND 組合；未設定的條件不限制。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageFilter {
    controllers: Option<BTreeSet<String>>,
    component_order_types: Option<BTreeSet<String>>,
    hierarchy_levels: Option<BTreeSet<String>>,
}

impl CoverageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：限制 MRP 控制員
    pub fn with_controllers<I, S>(mut self, controllers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.controllers = Some(controllers.into_iter().map(Into::into).collect());
        self
    }

    /// 建構器模式：限制物料訂單類型
    pub fn with_component_order_types<I, S>(mut self, order_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.component_order_types = Some(order_types.into_iter().map(Into::into).collect());
        self
    }

    /// 建構器模式：限制 BOM 層級
    pub fn with_hierarchy_levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hierarchy_levels = Some(levels.into_iter().map(Into::into).collect());
        self
    }

    /// 沒有任何限制
    pub fn is_unrestricted(&self) -> bool {
        self.controllers.is_none()
            && self.component_order_types.is_none()
            && self.hierarchy_levels.is_none()
    }

    pub fn matches(&self, record: &CoverageRecord) -> bool {
        admits(&self.controllers, &record.mrp_controller)
            && admits(&self.component_order_types, &record.component_order_type)
            && admits(&self.hierarchy_levels, &record.hierarchy_level)
    }

    pub fn apply<'a>(&self, records: &'a [CoverageRecord]) -> Vec<&'a CoverageRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

fn admits(allowed: &Option<BTreeSet<String>>, value: &str) -> bool {
    allowed.as_ref().map_or(true, |set| set.contains(value))
}

/// 過濾選項（各屬性去重排序後的值）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub controllers: Vec<String>,
    pub component_order_types: Vec<String>,
    pub hierarchy_levels: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[CoverageRecord]) -> Self {
        let mut controllers = BTreeSet::new();
        let mut order_types = BTreeSet::new();
        let mut levels = BTreeSet::new();
        for record in records {
            controllers.insert(record.mrp_controller.clone());
            order_types.insert(record.component_order_type.clone());
            levels.insert(record.hierarchy_level.clone());
        }
        Self {
            controllers: controllers.into_iter().collect(),
            component_order_types: order_types.into_iter().collect(),
            hierarchy_levels: levels.into_iter().collect(),
        }
    }
}
