//! BOM 明細與 MRP 控制員指派

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::DEFAULT_UNDEFINED_LABEL;
use crate::requirement::ComponentKey;

/// BOM 明細（一個成品對應多個子件）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomLine {
    /// 成品料號
    pub material_id: String,

    /// 子件料號
    pub component_id: String,

    /// 子件描述
    pub component_description: String,

    /// 子件單位
    pub component_uom: String,

    /// 每單位成品的子件用量（>= 0）
    pub quantity_per_unit: Decimal,

    /// 現有庫存
    pub current_stock: Decimal,

    /// 子件訂單類型（F 採購 / E 生產）
    pub component_order_type: String,

    /// BOM 層級
    pub hierarchy_level: String,
}

impl BomLine {
    /// 創建新的 BOM 明細
    pub fn new(material_id: String, component_id: String, quantity_per_unit: Decimal) -> Self {
        Self {
            material_id,
            component_id,
            component_description: String::new(),
            component_uom: String::new(),
            quantity_per_unit,
            current_stock: Decimal::ZERO,
            component_order_type: DEFAULT_UNDEFINED_LABEL.to_string(),
            hierarchy_level: DEFAULT_UNDEFINED_LABEL.to_string(),
        }
    }

    /// 建構器模式：設置描述
    pub fn with_description(mut self, description: String) -> Self {
        self.component_description = description;
        self
    }

    /// 建構器模式：設置單位
    pub fn with_uom(mut self, uom: String) -> Self {
        self.component_uom = uom;
        self
    }

    /// 建構器模式：設置現有庫存
    pub fn with_current_stock(mut self, stock: Decimal) -> Self {
        self.current_stock = stock;
        self
    }

    /// 建構器模式：設置子件訂單類型
    pub fn with_component_order_type(mut self, order_type: String) -> Self {
        self.component_order_type = order_type;
        self
    }

    /// 建構器模式：設置 BOM 層級
    pub fn with_hierarchy_level(mut self, level: String) -> Self {
        self.hierarchy_level = level;
        self
    }

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

/// 子件 → MRP 控制員
///
/// 每個子件最多一位控制員；重複指派時保留第一筆。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerAssignments {
    by_component: BTreeMap<String, String>,
}

impl ControllerAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指派控制員，已有指派時回傳 `false`
    pub fn assign(&mut self, component_id: String, controller_id: String) -> bool {
        match self.by_component.entry(component_id) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(controller_id);
                true
            }
        }
    }

    pub fn get(&self, component_id: &str) -> Option<&str> {
        self.by_component.get(component_id).map(String::as_str)
    }

    /// 取得控制員，沒有指派時回傳 `fallback`
    pub fn controller_or<'a>(&'a self, component_id: &str, fallback: &'a str) -> &'a str {
        self.get(component_id).unwrap_or(fallback)
    }

    pub fn contains(&self, component_id: &str) -> bool {
        self.by_component.contains_key(component_id)
    }

    pub fn len(&self) -> usize {
        self.by_component.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_component.is_empty()
    }
}
