//! 需求記錄（計劃 × BOM 展開結果）

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 子件彙總鍵
///
/// 與庫存、訂單類型一起分組，庫存不同的同一子件會分成不同列。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentKey {
    pub component_id: String,
    pub description: String,
    pub uom: String,
    pub current_stock: Decimal,
    pub component_order_type: String,
}

/// 單筆需求記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementRecord {
    /// 成品料號
    pub material_id: String,

    /// 計劃訂單類型
    pub order_type: String,

    /// 需求日期
    pub date: NaiveDate,

    /// 成品計劃數量
    pub planned_quantity: Decimal,

    /// 子件料號
    pub component_id: String,

    pub component_description: String,

    pub component_uom: String,

    pub current_stock: Decimal,

    pub component_order_type: String,

    pub hierarchy_level: String,

    /// 每單位用量
    pub quantity_per_unit: Decimal,

    /// 子件需求量 = 計劃數量 × 每單位用量
    pub required_quantity: Decimal,
}

impl RequirementRecord {
    /// 彙總用的子件鍵
    pub fn component_key(&self) -> ComponentKey {
        ComponentKey {
            component_id: self.component_id.clone(),
            description: self.component_description.clone(),
            uom: self.component_uom.clone(),
            current_stock: self.current_stock,
            component_order_type: self.component_order_type.clone(),
        }
    }
}
