//! 需求彙總樞紐表
//!
//! 所有彙總皆以總和歸約，分組使用以複合鍵排序的 `BTreeMap`，
//! 欄位與列的順序因此固定。缺少的組合填 0（數值）或空字串（BOM 使用表）。

use chrono::NaiveDate;
use mrp_core::calendar::format_date_label;
use mrp_core::{ComponentKey, ControllerAssignments, RequirementRecord};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// 樞紐表的一列（一個子件）
#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub key: ComponentKey,

    /// MRP 控制員
    pub mrp_controller: String,

    /// 與欄位對齊的需求量
    pub quantities: Vec<Decimal>,
}

impl PivotRow {
    /// 全部欄位合計
    pub fn total(&self) -> Decimal {
        self.quantities.iter().copied().sum()
    }
}

/// 子件 × 日期
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatePivot {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<PivotRow>,
}

impl DatePivot {
    pub fn build(
        records: &[RequirementRecord],
        assignments: &ControllerAssignments,
        undefined_label: &str,
    ) -> Self {
        let mut grouped: BTreeMap<ComponentKey, BTreeMap<NaiveDate, Decimal>> = BTreeMap::new();
        let mut dates = BTreeSet::new();

        for record in records {
            dates.insert(record.date);
            *grouped
                .entry(record.component_key())
                .or_default()
                .entry(record.date)
                .or_default() += record.required_quantity;
        }

        let dates: Vec<NaiveDate> = dates.into_iter().collect();
        let rows = grouped
            .into_iter()
            .map(|(key, by_date)| {
                let quantities = dates
                    .iter()
                    .map(|d| by_date.get(d).copied().unwrap_or(Decimal::ZERO))
                    .collect();
                PivotRow {
                    mrp_controller: assignments
                        .controller_or(&key.component_id, undefined_label)
                        .to_string(),
                    key,
                    quantities,
                }
            })
            .collect();

        Self { dates, rows }
    }

    /// 日期欄位標籤
    pub fn column_labels(&self, format: &str) -> Vec<String> {
        self.dates
            .iter()
            .map(|d| format_date_label(*d, format))
            .collect()
    }

    /// 子件的總需求（跨所有列）
    pub fn total_for(&self, component_id: &str) -> Decimal {
        self.rows
            .iter()
            .filter(|r| r.key.component_id == component_id)
            .map(PivotRow::total)
            .sum()
    }
}

/// 日期 + 訂單類型欄位
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderTypeColumn {
    pub date: NaiveDate,
    pub order_type: String,
}

impl OrderTypeColumn {
    /// 欄位名稱，例如 `L - 01 Oct`
    pub fn label(&self, format: &str) -> String {
        format!("{} - {}", self.order_type, format_date_label(self.date, format))
    }
}

/// 子件 × (日期, 訂單類型)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderTypePivot {
    pub columns: Vec<OrderTypeColumn>,
    pub rows: Vec<PivotRow>,
}

impl OrderTypePivot {
    pub fn build(
        records: &[RequirementRecord],
        assignments: &ControllerAssignments,
        undefined_label: &str,
    ) -> Self {
        let mut grouped: BTreeMap<ComponentKey, BTreeMap<OrderTypeColumn, Decimal>> =
            BTreeMap::new();
        let mut columns = BTreeSet::new();

        for record in records {
            let column = OrderTypeColumn {
                date: record.date,
                order_type: record.order_type.clone(),
            };
            columns.insert(column.clone());
            *grouped
                .entry(record.component_key())
                .or_default()
                .entry(column)
                .or_default() += record.required_quantity;
        }

        let columns: Vec<OrderTypeColumn> = columns.into_iter().collect();
        let rows = grouped
            .into_iter()
            .map(|(key, by_column)| PivotRow {
                mrp_controller: assignments
                    .controller_or(&key.component_id, undefined_label)
                    .to_string(),
                quantities: columns
                    .iter()
                    .map(|c| by_column.get(c).copied().unwrap_or(Decimal::ZERO))
                    .collect(),
                key,
            })
            .collect();

        Self { columns, rows }
    }

    pub fn column_labels(&self, format: &str) -> Vec<String> {
        self.columns.iter().map(|c| c.label(format)).collect()
    }

    pub fn total_for(&self, component_id: &str) -> Decimal {
        self.rows
            .iter()
            .filter(|r| r.key.component_id == component_id)
            .map(PivotRow::total)
            .sum()
    }
}

/// BOM 使用表的一列
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipRow {
    pub mrp_controller: String,
    pub component_id: String,
    pub component_order_type: String,

    /// 與成品欄位對齊的標籤，例如 `L (450)`；未使用時為空字串
    pub cells: Vec<String>,
}

/// 子件 × 成品：子件被哪些成品以哪些訂單類型、多少計劃量使用
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BomMembershipPivot {
    pub materials: Vec<String>,
    pub rows: Vec<MembershipRow>,
}

type MembershipKey = (String, String, String);

impl BomMembershipPivot {
    pub fn build(
        records: &[RequirementRecord],
        assignments: &ControllerAssignments,
        undefined_label: &str,
    ) -> Self {
        let mut grouped: BTreeMap<MembershipKey, BTreeMap<String, (BTreeSet<String>, Decimal)>> =
            BTreeMap::new();
        let mut materials = BTreeSet::new();

        for record in records {
            let controller = assignments
                .controller_or(&record.component_id, undefined_label)
                .to_string();
            let key = (
                controller,
                record.component_id.clone(),
                record.component_order_type.clone(),
            );
            materials.insert(record.material_id.clone());

            let (order_types, planned) = grouped
                .entry(key)
                .or_default()
                .entry(record.material_id.clone())
                .or_default();
            order_types.insert(record.order_type.clone());
            *planned += record.planned_quantity;
        }

        let materials: Vec<String> = materials.into_iter().collect();
        let rows = grouped
            .into_iter()
            .map(|((mrp_controller, component_id, component_order_type), by_material)| {
                let cells = materials
                    .iter()
                    .map(|m| {
                        by_material
                            .get(m)
                            .map(|(types, planned)| membership_label(types, *planned))
                            .unwrap_or_default()
                    })
                    .collect();
                MembershipRow {
                    mrp_controller,
                    component_id,
                    component_order_type,
                    cells,
                }
            })
            .collect();

        Self { materials, rows }
    }
}

fn membership_label(order_types: &BTreeSet<String>, planned: Decimal) -> String {
    let types: Vec<&str> = order_types.iter().map(String::as_str).collect();
    format!("{} ({})", types.join(","), planned.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrp_core::BomLine;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn record(
        material: &str,
        order_type: &str,
        day: u32,
        planned: i64,
        line: &BomLine,
    ) -> RequirementRecord {
        let planned = Decimal::from(planned);
        RequirementRecord {
            material_id: material.to_string(),
            order_type: order_type.to_string(),
            date: date(day),
            planned_quantity: planned,
            component_id: line.component_id.clone(),
            component_description: line.component_description.clone(),
            component_uom: line.component_uom.clone(),
            current_stock: line.current_stock,
            component_order_type: line.component_order_type.clone(),
            hierarchy_level: line.hierarchy_level.clone(),
            quantity_per_unit: line.quantity_per_unit,
            required_quantity: planned * line.quantity_per_unit,
        }
    }

    fn sample() -> Vec<RequirementRecord> {
        let burner = BomLine::new("A".into(), "BURNER".into(), Decimal::from(4))
            .with_component_order_type("F".into());
        let burner_b = BomLine::new("B".into(), "BURNER".into(), Decimal::from(2))
            .with_component_order_type("F".into());
        let knob = BomLine::new("A".into(), "KNOB".into(), Decimal::from(1))
            .with_component_order_type("E".into());
        vec![
            record("A", "L", 1, 100, &burner),
            record("A", "E", 1, 50, &burner),
            record("A", "L", 2, 300, &burner),
            record("B", "L", 2, 10, &burner_b),
            record("A", "L", 1, 100, &knob),
        ]
    }

    #[test]
    fn test_date_pivot_fills_zero() {
        let mut assignments = ControllerAssignments::new();
        assignments.assign("BURNER".into(), "P01".into());
        let pivot = DatePivot::build(&sample(), &assignments, "undefined");

        assert_eq!(pivot.dates, vec![date(1), date(2)]);
        assert_eq!(pivot.rows.len(), 2);

        let burner = &pivot.rows[0];
        assert_eq!(burner.key.component_id, "BURNER");
        assert_eq!(burner.mrp_controller, "P01");
        assert_eq!(burner.quantities, vec![Decimal::from(600), Decimal::from(1220)]);

        let knob = &pivot.rows[1];
        assert_eq!(knob.mrp_controller, "undefined");
        assert_eq!(knob.quantities, vec![Decimal::from(100), Decimal::ZERO]);
        assert_eq!(pivot.column_labels("%d %b"), vec!["01 Oct", "02 Oct"]);
    }

    #[test]
    fn test_order_type_pivot_totals_match_date_pivot() {
        let records = sample();
        let assignments = ControllerAssignments::new();
        let by_date = DatePivot::build(&records, &assignments, "undefined");
        let by_order = OrderTypePivot::build(&records, &assignments, "undefined");

        assert_eq!(
            by_order.column_labels("%d %b"),
            vec!["E - 01 Oct", "L - 01 Oct", "L - 02 Oct"]
        );
        for component in ["BURNER", "KNOB"] {
            assert_eq!(by_date.total_for(component), by_order.total_for(component));
        }
        assert_eq!(by_order.total_for("BURNER"), Decimal::from(1820));
    }

    #[test]
    fn test_bom_membership_labels() {
        let pivot =
            BomMembershipPivot::build(&sample(), &ControllerAssignments::new(), "undefined");

        assert_eq!(pivot.materials, vec!["A".to_string(), "B".to_string()]);
        let burner = pivot.rows.iter().find(|r| r.component_id == "BURNER").unwrap();
        assert_eq!(burner.cells, vec!["E,L (450)".to_string(), "L (10)".to_string()]);

        let knob = pivot.rows.iter().find(|r| r.component_id == "KNOB").unwrap();
        assert_eq!(knob.component_order_type, "E");
        assert_eq!(knob.cells, vec!["L (100)".to_string(), String::new()]);
    }
}
