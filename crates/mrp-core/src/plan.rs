//! 生產計劃模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 計劃表展開後的單筆記錄（成品 × 日期）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// 成品料號
    pub material_id: String,

    /// 成品描述
    pub material_description: String,

    /// 訂單類型（如 L、E）
    pub order_type: String,

    /// 計劃日期
    pub date: NaiveDate,

    /// 計劃數量
    pub planned_quantity: Decimal,
}

impl PlanEntry {
    /// 創建新的計劃記錄
    pub fn new(
        material_id: String,
        order_type: String,
        date: NaiveDate,
        planned_quantity: Decimal,
    ) -> Self {
        Self {
            material_id,
            material_description: String::new(),
            order_type,
            date,
            planned_quantity,
        }
    }

    /// 建構器模式：設置描述
    pub fn with_description(mut self, description: String) -> Self {
        self.material_description = description;
        self
    }
}
