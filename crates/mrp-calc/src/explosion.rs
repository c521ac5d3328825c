//! 計劃展開與 BOM 需求計算

use chrono::NaiveDate;
use mrp_core::calendar::parse_date_header;
use mrp_core::{BomLine, Field, MrpError, PlanEntry, RequirementRecord, Table};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::MrpWarning;

/// 計劃表展開結果（寬表 → 長表）
#[derive(Debug, Clone, Default)]
pub struct MeltedPlan {
    /// 每筆成品 × 日期的計劃記錄
    pub entries: Vec<PlanEntry>,

    /// 成功解析的日期（排序、去重）
    pub dates: Vec<NaiveDate>,

    /// 無法解析為日期而被排除的欄位
    pub malformed_headers: Vec<String>,

    pub warnings: Vec<MrpWarning>,
}

/// 展開計劃表
///
/// 料號、描述、訂單類型為識別欄位，其餘欄位視為日期欄位。
/// 無法解析的表頭被排除並記錄為警告；空白數量視為 0。
pub fn melt_plan(plan: &Table) -> mrp_core::Result<MeltedPlan> {
    let id_fields = [Field::Material, Field::MaterialDescription, Field::OrderType];
    let mut id_columns = Vec::with_capacity(id_fields.len());
    let mut missing = Vec::new();
    for field in id_fields {
        match plan.column_index(field.canonical()) {
            Some(col) => id_columns.push(col),
            None => missing.push(field.canonical().to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(MrpError::MissingColumn {
            sheet: plan.name.clone(),
            columns: missing,
        });
    }
    let (material_col, desc_col, order_type_col) = (id_columns[0], id_columns[1], id_columns[2]);

    let mut melted = MeltedPlan::default();
    let mut date_columns = Vec::new();
    let mut dates = BTreeSet::new();

    for (col, header) in plan.headers.iter().enumerate() {
        if id_columns.contains(&col) || header.is_blank() {
            continue;
        }
        match parse_date_header(header) {
            Some(date) => {
                date_columns.push((col, date));
                dates.insert(date);
            }
            None => {
                let name = header.as_text();
                tracing::warn!("計劃表欄位 {} 無法解析為日期，已排除", name);
                melted.warnings.push(MrpWarning::from_error(
                    name.clone(),
                    &MrpError::MalformedDate(name.clone()),
                ));
                melted.malformed_headers.push(name);
            }
        }
    }

    for row in 0..plan.height() {
        let material_id = plan.cell(row, material_col).as_text();
        if material_id.is_empty() {
            continue;
        }
        let description = plan.cell(row, desc_col).as_text();
        let order_type = plan.cell(row, order_type_col).as_text();

        for &(col, date) in &date_columns {
            let cell = plan.cell(row, col);
            let planned_quantity = match cell.as_decimal() {
                Some(qty) => qty,
                None => {
                    melted.warnings.push(MrpWarning::warning(
                        material_id.clone(),
                        format!("計劃數量無法解析 ({}): {}，以 0 計算", date, cell),
                    ));
                    Decimal::ZERO
                }
            };
            melted.entries.push(
                PlanEntry::new(material_id.clone(), order_type.clone(), date, planned_quantity)
                    .with_description(description.clone()),
            );
        }
    }

    melted.dates = dates.into_iter().collect();
    Ok(melted)
}

/// BOM 展開：計劃記錄 × 該成品的所有子件
///
/// 沒有 BOM 的成品不產生需求記錄。需求量相乘溢位，或計劃量、需求量、
/// 庫存任一項的絕對值總和溢位時回傳 [`MrpError::QuantityOverflow`]，
/// 因此後續彙總可直接相加。
pub fn explode(
    entries: &[PlanEntry],
    bom_lines: &[BomLine],
) -> mrp_core::Result<Vec<RequirementRecord>> {
    let mut by_material: BTreeMap<&str, Vec<&BomLine>> = BTreeMap::new();
    for line in bom_lines {
        by_material
            .entry(line.material_id.as_str())
            .or_default()
            .push(line);
    }

    let mut records = Vec::new();
    for entry in entries {
        let Some(lines) = by_material.get(entry.material_id.as_str()) else {
            continue;
        };
        for line in lines {
            let required_quantity = entry
                .planned_quantity
                .checked_mul(line.quantity_per_unit)
                .ok_or_else(|| {
                    MrpError::QuantityOverflow(format!(
                        "{} × {}: {} × {}",
                        entry.material_id,
                        line.component_id,
                        entry.planned_quantity,
                        line.quantity_per_unit
                    ))
                })?;
            records.push(RequirementRecord {
                material_id: entry.material_id.clone(),
                order_type: entry.order_type.clone(),
                date: entry.date,
                planned_quantity: entry.planned_quantity,
                component_id: line.component_id.clone(),
                component_description: line.component_description.clone(),
                component_uom: line.component_uom.clone(),
                current_stock: line.current_stock,
                component_order_type: line.component_order_type.clone(),
                hierarchy_level: line.hierarchy_level.clone(),
                quantity_per_unit: line.quantity_per_unit,
                required_quantity,
            });
        }
    }

    tracing::debug!(
        "BOM 展開: 計劃記錄 {} 筆 → 需求記錄 {} 筆",
        entries.len(),
        records.len()
    );

    checked_total("計劃量", entries.iter().map(|e| e.planned_quantity))?;
    checked_total("展開計劃量", records.iter().map(|r| r.planned_quantity))?;
    checked_total("需求量", records.iter().map(|r| r.required_quantity))?;
    checked_total("庫存", bom_lines.iter().map(|l| l.current_stock))?;
    Ok(records)
}

/// 絕對值總和
fn checked_total(
    label: &str,
    values: impl IntoIterator<Item = Decimal>,
) -> mrp_core::Result<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value.abs()))
        .ok_or_else(|| MrpError::QuantityOverflow(format!("{}總和", label)))
}

/// 計劃中有、BOM 中沒有的成品（排序）
pub fn missing_boms(
    plan_materials: &BTreeSet<String>,
    bom_materials: &BTreeSet<String>,
) -> Vec<String> {
    plan_materials.difference(bom_materials).cloned().collect()
}
