//! 庫存覆蓋率與優先級分類

use mrp_core::{
    AnalysisConfig, ComponentKey, ControllerAssignments, CoverageRecord, CoverageStatus,
    CoverageThresholds, MrpError, Priority, RequirementRecord,
};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::MrpWarning;

/// 覆蓋率 = 庫存 × 100 / 總需求，四捨六入五成雙至一位小數
///
/// 總需求為零或計算溢位時回傳 `None`。
pub fn coverage_percentage(current_stock: Decimal, total_required: Decimal) -> Option<Decimal> {
    if total_required.is_zero() {
        return None;
    }
    current_stock
        .checked_mul(Decimal::ONE_HUNDRED)?
        .checked_div(total_required)
        .map(one_decimal)
}

/// 四捨六入五成雙至一位小數，並固定顯示一位小數（`5` → `5.0`）
pub fn one_decimal(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(1);
    rounded.rescale(1);
    rounded
}

/// 覆蓋狀態（與優先級互相獨立）
pub fn classify_status(
    coverage_pct: Option<Decimal>,
    thresholds: &CoverageThresholds,
) -> CoverageStatus {
    match coverage_pct {
        None => CoverageStatus::Undefined,
        Some(pct) if pct >= thresholds.sufficient_coverage_pct => CoverageStatus::Sufficient,
        Some(pct) if pct >= thresholds.partial_coverage_pct => CoverageStatus::Partial,
        Some(_) => CoverageStatus::Insufficient,
    }
}

/// 優先級，依序判斷：
/// 1. 覆蓋率 < 緊急門檻 且 總需求 > 緊急數量 → 緊急
/// 2. 覆蓋率 < 中等門檻 → 中等
/// 3. 其他 → 低
///
/// 覆蓋率無定義時為低。
pub fn classify_priority(
    coverage_pct: Option<Decimal>,
    total_required: Decimal,
    thresholds: &CoverageThresholds,
) -> Priority {
    let Some(pct) = coverage_pct else {
        return Priority::Low;
    };
    if pct < thresholds.urgent_coverage_pct && total_required > thresholds.urgent_min_required {
        Priority::Urgent
    } else if pct < thresholds.medium_coverage_pct {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[derive(Default)]
struct ComponentTotals {
    required: Decimal,
    order_types: BTreeSet<String>,
}

/// 依子件彙總全部日期與訂單類型的需求並分類
pub fn build_coverage(
    records: &[RequirementRecord],
    assignments: &ControllerAssignments,
    config: &AnalysisConfig,
) -> (Vec<CoverageRecord>, Vec<MrpWarning>) {
    let mut grouped: BTreeMap<(ComponentKey, String), ComponentTotals> = BTreeMap::new();
    for record in records {
        let totals = grouped
            .entry((record.component_key(), record.hierarchy_level.clone()))
            .or_default();
        totals.required += record.required_quantity;
        totals.order_types.insert(record.order_type.clone());
    }

    let mut warnings = Vec::new();
    let coverage = grouped
        .into_iter()
        .map(|((key, hierarchy_level), totals)| {
            let coverage_pct = coverage_percentage(key.current_stock, totals.required);
            if coverage_pct.is_none() {
                warnings.push(undefined_coverage_warning(&key, totals.required));
            }
            let order_types: Vec<&str> = totals.order_types.iter().map(String::as_str).collect();

            CoverageRecord {
                mrp_controller: assignments
                    .controller_or(&key.component_id, &config.undefined_label)
                    .to_string(),
                status: classify_status(coverage_pct, &config.thresholds),
                priority: classify_priority(coverage_pct, totals.required, &config.thresholds),
                order_types: order_types.join(", "),
                total_required: totals.required,
                coverage_pct,
                hierarchy_level,
                component_id: key.component_id,
                component_description: key.description,
                component_uom: key.uom,
                current_stock: key.current_stock,
                component_order_type: key.component_order_type,
            }
        })
        .collect();

    (coverage, warnings)
}

fn undefined_coverage_warning(key: &ComponentKey, total_required: Decimal) -> MrpWarning {
    let subject = key.component_id.clone();
    if total_required.is_zero() {
        tracing::debug!("子件 {} 總需求為零，覆蓋率無定義", subject);
        let error = MrpError::ZeroRequirement(subject.clone());
        MrpWarning::from_error(subject, &error)
    } else {
        tracing::warn!(
            "子件 {} 覆蓋率計算溢位：庫存 {}，總需求 {}",
            subject,
            key.current_stock,
            total_required
        );
        let error = MrpError::QuantityOverflow(format!(
            "子件 {} 覆蓋率（庫存 {}，總需求 {}）",
            subject, key.current_stock, total_required
        ));
        MrpWarning::error(subject, error.to_string())
    }
}

/// 依覆蓋率由低到高排序，無定義者排在最後（穩定排序）
pub fn sort_by_coverage(rows: &mut [&CoverageRecord]) {
    rows.sort_by(|a, b| match (a.coverage_pct, b.coverage_pct) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
