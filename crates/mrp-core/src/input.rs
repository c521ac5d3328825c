//! 已驗證的輸入資料

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::bom::{BomLine, ControllerAssignments};
use crate::cell::Table;
use crate::columns::Field;
use crate::warning::MrpWarning;

/// 載入並驗證後的活頁簿內容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputData {
    /// 計劃表（欄位已正規化，日期欄位保持原樣）
    pub plan: Table,

    /// 子件表（已補齊選填欄位）
    pub components: Table,

    /// MRP 控制員表，檔案未提供時為空表
    pub controllers: Table,

    /// 子件表的型別化明細
    pub bom_lines: Vec<BomLine>,

    /// 子件 → 控制員
    pub assignments: ControllerAssignments,

    /// 載入時略過或修正的資料
    pub warnings: Vec<MrpWarning>,
}

impl InputData {
    /// 計劃表中的成品料號（去重、排序）
    pub fn plan_materials(&self) -> BTreeSet<String> {
        self.plan
            .column_texts(Field::Material.canonical())
            .into_iter()
            .filter(|m| !m.is_empty())
            .collect()
    }

    /// BOM 中出現的成品料號
    pub fn bom_materials(&self) -> BTreeSet<String> {
        self.bom_lines.iter().map(|l| l.material_id.clone()).collect()
    }

    pub fn has_controllers(&self) -> bool {
        !self.controllers.is_empty()
    }
}
