//! 輸入活頁簿驗證與型別化

use mrp_core::{
    BomLine, Cell, ColumnAliases, ControllerAssignments, Field, InputData, MrpError, MrpWarning,
    Result, Table, DEFAULT_UNDEFINED_LABEL,
};
use rust_decimal::Decimal;
use std::path::Path;

use crate::workbook::{read_workbook_bytes, read_workbook_path};

/// 計劃表工作表名稱
pub const PLAN_SHEET: &str = "plan";

/// 子件表工作表名稱
pub const COMPONENT_SHEET: &str = "Component";

/// MRP 控制員工作表名稱（第二個為舊名稱）
pub const CONTROLLER_SHEETS: [&str; 2] = ["MRP Controller", "MRP Contor"];

const PLAN_REQUIRED: [Field; 3] = [Field::Material, Field::MaterialDescription, Field::OrderType];
const COMPONENT_REQUIRED: [Field; 3] =
    [Field::Material, Field::Component, Field::ComponentQuantity];
const CONTROLLER_REQUIRED: [Field; 2] = [Field::Component, Field::MrpController];

/// 活頁簿載入器
#[derive(Debug, Clone)]
pub struct WorkbookLoader {
    aliases: ColumnAliases,
    undefined_label: String,
}

impl Default for WorkbookLoader {
    fn default() -> Self {
        Self {
            aliases: ColumnAliases::default(),
            undefined_label: DEFAULT_UNDEFINED_LABEL.to_string(),
        }
    }
}

impl WorkbookLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置欄位別名表
    pub fn with_aliases(mut self, aliases: ColumnAliases) -> Self {
        self.aliases = aliases;
        self
    }

    /// 建構器模式：設置缺值標籤
    pub fn with_undefined_label(mut self, label: impl Into<String>) -> Self {
        self.undefined_label = label.into();
        self
    }

    pub fn load_bytes(&self, bytes: &[u8]) -> Result<InputData> {
        self.load_tables(read_workbook_bytes(bytes)?)
    }

    pub fn load_path(&self, path: &Path) -> Result<InputData> {
        tracing::info!("載入活頁簿: {}", path.display());
        self.load_tables(read_workbook_path(path)?)
    }

    /// 驗證工作表並轉換為分析輸入
    pub fn load_tables(&self, tables: Vec<Table>) -> Result<InputData> {
        let mut plan = None;
        let mut components = None;
        let mut controllers = None;
        for table in tables {
            if sheet_matches(&table.name, PLAN_SHEET) && plan.is_none() {
                plan = Some(table);
            } else if sheet_matches(&table.name, COMPONENT_SHEET) && components.is_none() {
                components = Some(table);
            } else if CONTROLLER_SHEETS.iter().any(|s| sheet_matches(&table.name, s))
                && controllers.is_none()
            {
                controllers = Some(table);
            }
        }

        let (mut plan, mut components) = match (plan, components) {
            (Some(plan), Some(components)) => (plan, components),
            (plan, components) => {
                let mut sheets = Vec::new();
                if plan.is_none() {
                    sheets.push(PLAN_SHEET.to_string());
                }
                if components.is_none() {
                    sheets.push(COMPONENT_SHEET.to_string());
                }
                return Err(MrpError::MissingSheet { sheets });
            }
        };

        self.aliases.normalize(&mut plan);
        require_columns(&plan, &PLAN_REQUIRED)?;

        self.aliases.normalize(&mut components);
        require_columns(&components, &COMPONENT_REQUIRED)?;
        let mut warnings = self.fill_optional_columns(&mut components);
        let (bom_lines, bom_warnings) = self.bom_lines(&components)?;
        warnings.extend(bom_warnings);

        let mut controllers = controllers.unwrap_or_default();
        let assignments = if controllers.width() > 0 {
            self.aliases.normalize(&mut controllers);
            require_columns(&controllers, &CONTROLLER_REQUIRED)?;
            controller_assignments(&controllers)
        } else {
            ControllerAssignments::new()
        };

        tracing::info!(
            "活頁簿驗證完成：計劃 {} 列，BOM 明細 {} 筆，控制員指派 {} 筆，警告 {} 則",
            plan.height(),
            bom_lines.len(),
            assignments.len(),
            warnings.len()
        );

        Ok(InputData {
            plan,
            components,
            controllers,
            bom_lines,
            assignments,
            warnings,
        })
    }

    fn fill_optional_columns(&self, components: &mut Table) -> Vec<MrpWarning> {
        let defaults = [
            (Field::ComponentDescription, Cell::Empty),
            (Field::ComponentUom, Cell::Empty),
            (Field::CurrentStock, Cell::Number(0.0)),
            (Field::ComponentOrderType, Cell::text(&self.undefined_label)),
            (Field::HierarchyLevel, Cell::text(&self.undefined_label)),
        ];
        let mut warnings = Vec::new();
        for (field, default) in defaults {
            if components.ensure_column(field.canonical(), default) {
                tracing::debug!("子件表缺少 {}，以預設值補齊", field.canonical());
                warnings.push(MrpWarning::info(
                    field.canonical().to_string(),
                    "子件表缺少此欄位，以預設值補齊".to_string(),
                ));
            }
        }
        warnings
    }

    /// 子件表明細；子件料號空白的列略過，庫存無法解析時以 0 計
    fn bom_lines(&self, components: &Table) -> Result<(Vec<BomLine>, Vec<MrpWarning>)> {
        let col = |field: Field| components.column_index(field.canonical());
        let (Some(material_col), Some(component_col), Some(qty_col)) = (
            col(Field::Material),
            col(Field::Component),
            col(Field::ComponentQuantity),
        ) else {
            return Err(MrpError::MissingColumn {
                sheet: components.name.clone(),
                columns: missing_columns(components, &COMPONENT_REQUIRED),
            });
        };
        let text = |row: usize, field: Field| -> String {
            col(field)
                .map(|c| components.cell(row, c).as_text())
                .unwrap_or_default()
        };

        // 含表頭的 1 起算列號
        let row_subject = |row: usize| format!("{} 第 {} 列", components.name, row + 2);

        let mut lines = Vec::with_capacity(components.height());
        let mut warnings = Vec::new();
        for row in 0..components.height() {
            let material_id = components.cell(row, material_col).as_text();
            let component_id = components.cell(row, component_col).as_text();
            if component_id.is_empty() {
                if !material_id.is_empty() {
                    tracing::warn!("{} 子件料號空白，略過", row_subject(row));
                    warnings.push(MrpWarning::warning(
                        row_subject(row),
                        format!("成品 {} 的子件料號空白，略過此列", material_id),
                    ));
                }
                continue;
            }

            let qty_cell = components.cell(row, qty_col);
            let quantity = match qty_cell.as_decimal() {
                Some(qty) if qty >= Decimal::ZERO => qty,
                _ => {
                    return Err(MrpError::InvalidQuantity {
                        sheet: components.name.clone(),
                        row: row + 2,
                        value: qty_cell.as_text(),
                    })
                }
            };
            let stock_cell = col(Field::CurrentStock).map(|c| components.cell(row, c));
            let current_stock = match stock_cell.map(Cell::as_decimal) {
                Some(Some(stock)) => stock,
                Some(None) => {
                    let shown = stock_cell.map(Cell::as_text).unwrap_or_default();
                    tracing::warn!("{} 庫存無法解析: {}", row_subject(row), shown);
                    warnings.push(MrpWarning::warning(
                        row_subject(row),
                        format!("子件 {} 的庫存無法解析（{}），以 0 計", component_id, shown),
                    ));
                    Decimal::ZERO
                }
                None => Decimal::ZERO,
            };

            lines.push(
                BomLine::new(material_id, component_id, quantity)
                    .with_description(text(row, Field::ComponentDescription))
                    .with_uom(text(row, Field::ComponentUom))
                    .with_current_stock(current_stock)
                    .with_component_order_type(
                        self.or_undefined(text(row, Field::ComponentOrderType)),
                    )
                    .with_hierarchy_level(self.or_undefined(text(row, Field::HierarchyLevel))),
            );
        }
        Ok((lines, warnings))
    }

    fn or_undefined(&self, value: String) -> String {
        if value.is_empty() {
            self.undefined_label.clone()
        } else {
            value
        }
    }
}

fn sheet_matches(name: &str, expected: &str) -> bool {
    name.trim().eq_ignore_ascii_case(expected)
}

fn missing_columns(table: &Table, fields: &[Field]) -> Vec<String> {
    fields
        .iter()
        .filter(|f| !table.has_column(f.canonical()))
        .map(|f| f.canonical().to_string())
        .collect()
}

fn require_columns(table: &Table, fields: &[Field]) -> Result<()> {
    let columns = missing_columns(table, fields);
    if columns.is_empty() {
        Ok(())
    } else {
        Err(MrpError::MissingColumn {
            sheet: table.name.clone(),
            columns,
        })
    }
}

/// 子件 → 控制員（重複指派保留第一筆，控制員空白的列略過）
fn controller_assignments(controllers: &Table) -> ControllerAssignments {
    let mut assignments = ControllerAssignments::new();
    let components = controllers.column_texts(Field::Component.canonical());
    let owners = controllers.column_texts(Field::MrpController.canonical());
    for (component, owner) in components.into_iter().zip(owners) {
        if component.is_empty() || owner.is_empty() {
            continue;
        }
        if !assignments.assign(component.clone(), owner) {
            tracing::debug!("子件 {} 重複指派控制員，保留第一筆", component);
        }
    }
    assignments
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrp_core::WarningSeverity;
    use rstest::rstest;

    fn plan() -> Table {
        Table::with_columns("plan", &["Item", "Description", "OT", "2025-10-01"]).with_rows(vec![
            vec![
                Cell::Number(1000123.0),
                Cell::text("Stove"),
                Cell::text("L"),
                Cell::Number(5.0),
            ],
        ])
    }

    fn components() -> Table {
        Table::with_columns("Component", &["Material", "Comp", "Qty", "Unrestricted"]).with_rows(
            vec![
                vec![
                    Cell::Number(1000123.0),
                    Cell::text("C1"),
                    Cell::Number(2.0),
                    Cell::Number(40.0),
                ],
                vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty],
                vec![
                    Cell::Number(1000123.0),
                    Cell::text("C2"),
                    Cell::text("1,5"),
                    Cell::Empty,
                ],
            ],
        )
    }

    fn controllers(name: &str) -> Table {
        Table::with_columns(name, &["Component", "MRP Contor"]).with_rows(vec![
            vec![Cell::text("C1"), Cell::text("P01")],
            vec![Cell::text("C1"), Cell::text("P02")],
            vec![Cell::text("C2"), Cell::Empty],
        ])
    }

    #[test]
    fn test_load_normalizes_and_defaults() {
        let input = WorkbookLoader::new()
            .load_tables(vec![plan(), components(), controllers("MRP Controller")])
            .unwrap();

        assert!(input.plan.has_column("Material"));
        assert_eq!(input.plan_materials().into_iter().collect::<Vec<_>>(), vec!["1000123"]);
        assert!(input.components.has_column("Component Order Type"));
        assert!(input.components.has_column("Hierarchy Level"));

        assert_eq!(input.bom_lines.len(), 2);
        let c1 = &input.bom_lines[0];
        assert_eq!(c1.material_id, "1000123");
        assert_eq!(c1.current_stock, Decimal::from(40));
        assert_eq!(c1.component_order_type, "undefined");
        assert_eq!(c1.hierarchy_level, "undefined");
        // 千分位逗號被移除
        assert_eq!(input.bom_lines[1].quantity_per_unit, Decimal::from(15));
        assert_eq!(input.bom_lines[1].current_stock, Decimal::ZERO);

        assert_eq!(input.assignments.get("C1"), Some("P01"));
        assert!(!input.assignments.contains("C2"));

        // 補齊的選填欄位以 info 記錄
        assert!(input
            .warnings
            .iter()
            .any(|w| w.subject == "Hierarchy Level" && w.severity == WarningSeverity::Info));
    }

    #[test]
    fn test_blank_component_rows_skipped() {
        let table =
            Table::with_columns("Component", &["Material", "Component", "Component Quantity"])
                .with_rows(vec![
                    vec![Cell::text("A"), Cell::text("C1"), Cell::Number(1.0)],
                    vec![Cell::text("A"), Cell::Empty, Cell::Number(2.0)],
                    vec![Cell::text("A"), Cell::text("  "), Cell::Number(3.0)],
                ]);
        let input = WorkbookLoader::new()
            .load_tables(vec![plan(), table])
            .unwrap();

        let ids: Vec<&str> = input
            .bom_lines
            .iter()
            .map(|l| l.component_id.as_str())
            .collect();
        assert_eq!(ids, vec!["C1"]);

        let skipped: Vec<&str> = input
            .warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Warning)
            .map(|w| w.subject.as_str())
            .collect();
        assert_eq!(skipped, vec!["Component 第 3 列", "Component 第 4 列"]);
    }

    #[rstest]
    #[case(Cell::text("n/a"), None)]
    #[case(Cell::text("1,200"), Some(1200))]
    #[case(Cell::Empty, Some(0))]
    fn test_current_stock_parsing(#[case] stock: Cell, #[case] expected: Option<i64>) {
        let table = Table::with_columns(
            "Component",
            &["Material", "Component", "Component Quantity", "Current Stock"],
        )
        .with_rows(vec![vec![
            Cell::text("A"),
            Cell::text("C1"),
            Cell::Number(1.0),
            stock,
        ]]);
        let input = WorkbookLoader::new()
            .load_tables(vec![plan(), table])
            .unwrap();

        let stock_warnings: Vec<_> = input
            .warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Warning)
            .collect();
        match expected {
            Some(value) => {
                assert_eq!(input.bom_lines[0].current_stock, Decimal::from(value));
                assert!(stock_warnings.is_empty());
            }
            None => {
                assert_eq!(input.bom_lines[0].current_stock, Decimal::ZERO);
                assert_eq!(stock_warnings.len(), 1);
                assert_eq!(stock_warnings[0].subject, "Component 第 2 列");
                assert!(stock_warnings[0].message.contains("n/a"));
            }
        }
    }

    #[rstest]
    #[case("MRP Controller")]
    #[case("MRP Contor")]
    fn test_controller_sheet_names(#[case] name: &str) {
        let input = WorkbookLoader::new()
            .load_tables(vec![plan(), components(), controllers(name)])
            .unwrap();
        assert!(input.has_controllers());
    }

    #[test]
    fn test_controller_sheet_optional() {
        let input = WorkbookLoader::new()
            .load_tables(vec![plan(), components()])
            .unwrap();
        assert!(!input.has_controllers());
        assert!(input.assignments.is_empty());
    }

    #[test]
    fn test_missing_sheets_listed() {
        let err = WorkbookLoader::new()
            .load_tables(vec![controllers("MRP Controller")])
            .unwrap_err();
        match err {
            MrpError::MissingSheet { sheets } => assert_eq!(sheets, vec!["plan", "Component"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_columns_listed() {
        let bad = Table::with_columns("Component", &["Material", "Remark"]);
        let err = WorkbookLoader::new()
            .load_tables(vec![plan(), bad])
            .unwrap_err();
        match err {
            MrpError::MissingColumn { sheet, columns } => {
                assert_eq!(sheet, "Component");
                assert_eq!(columns, vec!["Component", "Component Quantity"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    #[case(Cell::Number(-1.0), "-1")]
    #[case(Cell::text("two"), "two")]
    fn test_invalid_quantity(#[case] qty: Cell, #[case] shown: &str) {
        let bad = Table::with_columns("Component", &["Material", "Component", "Component Quantity"])
            .with_rows(vec![vec![Cell::text("A"), Cell::text("C1"), qty]]);
        let err = WorkbookLoader::new()
            .load_tables(vec![plan(), bad])
            .unwrap_err();
        match err {
            MrpError::InvalidQuantity { row, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, shown);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
