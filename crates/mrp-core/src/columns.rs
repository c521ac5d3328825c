//! 欄位名稱正規化
//!
//! 輸入檔案的表頭可能是英文、阿拉伯文或 ERP 匯出的縮寫。每個欄位對應一組
//! 有序別名，第一個別名即標準名稱。

use serde::{Deserialize, Serialize};

use crate::cell::Table;

/// 標準欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    Material,
    MaterialDescription,
    OrderType,
    Component,
    ComponentDescription,
    ComponentUom,
    ComponentQuantity,
    MrpController,
    CurrentStock,
    ComponentOrderType,
    HierarchyLevel,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Material,
        Field::MaterialDescription,
        Field::OrderType,
        Field::Component,
        Field::ComponentDescription,
        Field::ComponentUom,
        Field::ComponentQuantity,
        Field::MrpController,
        Field::CurrentStock,
        Field::ComponentOrderType,
        Field::HierarchyLevel,
    ];

    /// 標準欄位名稱
    pub fn canonical(self) -> &'static str {
        match self {
            Field::Material => "Material",
            Field::MaterialDescription => "Material Description",
            Field::OrderType => "Order Type",
            Field::Component => "Component",
            Field::ComponentDescription => "Component Description",
            Field::ComponentUom => "Component UoM",
            Field::ComponentQuantity => "Component Quantity",
            Field::MrpController => "MRP Controller",
            Field::CurrentStock => "Current Stock",
            Field::ComponentOrderType => "Component Order Type",
            Field::HierarchyLevel => "Hierarchy Level",
        }
    }

    fn default_aliases(self) -> &'static [&'static str] {
        match self {
            Field::Material => &["Item", "code", "Code", "المادة", "Product"],
            Field::MaterialDescription => &["Description", "وصف"],
            Field::OrderType => &["OT", "نوع الطلب", "Sales Org."],
            Field::Component => &["Comp", "المكون"],
            Field::ComponentDescription => &["Comp Desc", "المسمى", "وصف المكون"],
            Field::ComponentUom => &["UoM", "الوحدة"],
            Field::ComponentQuantity => &["Qty", "كمية المكون"],
            Field::MrpController => &["MRP Contor", "مسؤول MRP"],
            Field::CurrentStock => &["Stock", "المخزون الحالي", "Unrestricted"],
            Field::ComponentOrderType => &[
                "Order Category",
                "نوع أمر المكون",
                "Procurement Type",
            ],
            Field::HierarchyLevel => &["Level", "المستوى الهرمي"],
        }
    }
}

/// 欄位別名查找表
///
/// 每個項目的別名列表第一個元素固定為標準名稱。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAliases {
    entries: Vec<(Field, Vec<String>)>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let entries = Field::ALL
            .iter()
            .map(|&field| {
                let mut aliases = vec![field.canonical().to_string()];
                aliases.extend(field.default_aliases().iter().map(|a| a.to_string()));
                (field, aliases)
            })
            .collect();
        Self { entries }
    }
}

impl ColumnAliases {
    /// 建構器模式：為欄位追加別名
    pub fn with_alias(mut self, field: Field, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if let Some((_, aliases)) = self.entries.iter_mut().find(|(f, _)| *f == field) {
            if !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }
        self
    }

    /// 欄位的全部別名（含標準名稱）
    pub fn aliases(&self, field: Field) -> &[String] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, aliases)| aliases.as_slice())
            .unwrap_or(&[])
    }

    /// 由表頭文字反查欄位
    pub fn resolve(&self, header: &str) -> Option<Field> {
        let header = header.trim();
        self.entries
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| a.trim() == header))
            .map(|(field, _)| *field)
    }

    /// 就地正規化表頭，回傳重新命名的欄位數
    ///
    /// 標準名稱已存在時不處理該欄位，因此重複套用結果不變。
    pub fn normalize(&self, table: &mut Table) -> usize {
        let mut renamed = 0;
        for (_, aliases) in &self.entries {
            let Some((canonical, rest)) = aliases.split_first() else {
                continue;
            };
            if table.has_column(canonical) {
                continue;
            }
            if let Some(col) = rest.iter().find_map(|alias| table.column_index(alias)) {
                table.rename_column(col, canonical);
                renamed += 1;
            }
        }
        renamed
    }
}

/// 正規化表格欄位名稱
pub fn normalize_columns(mut table: Table, aliases: &ColumnAliases) -> Table {
    aliases.normalize(&mut table);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn component_sheet() -> Table {
        Table::with_columns(
            "Component",
            &["Item", "Comp", " المسمى", "UoM", "Qty", "Unrestricted", "Level"],
        )
        .with_rows(vec![vec![
            Cell::text("A"),
            Cell::text("C1"),
            Cell::text("Screw"),
            Cell::text("PC"),
            Cell::Number(2.0),
            Cell::Number(100.0),
            Cell::text("1"),
        ]])
    }

    #[test]
    fn test_normalize_aliases() {
        let table = normalize_columns(component_sheet(), &ColumnAliases::default());

        assert_eq!(
            table.header_names(),
            vec![
                "Material",
                "Component",
                "Component Description",
                "Component UoM",
                "Component Quantity",
                "Current Stock",
                "Hierarchy Level",
            ]
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let aliases = ColumnAliases::default();
        let once = normalize_columns(component_sheet(), &aliases);
        let twice = normalize_columns(once.clone(), &aliases);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_canonical_present_is_noop() {
        let mut table = Table::with_columns("plan", &["Material", "Item"]);
        let renamed = ColumnAliases::default().normalize(&mut table);

        assert_eq!(renamed, 0);
        assert_eq!(table.header_names(), vec!["Material", "Item"]);
    }

    #[test]
    fn test_custom_alias_and_resolve() {
        let aliases = ColumnAliases::default().with_alias(Field::CurrentStock, "On Hand");

        assert_eq!(aliases.resolve(" On Hand "), Some(Field::CurrentStock));
        assert_eq!(aliases.resolve("Sales Org."), Some(Field::OrderType));
        assert_eq!(aliases.aliases(Field::CurrentStock)[0], "Current Stock");
        assert_eq!(aliases.resolve("Unknown"), None);
    }
}
