//! 計劃摘要與覆蓋率統計

use chrono::{Datelike, NaiveDate};
use mrp_core::{AnalysisConfig, CoverageRecord, CoverageStatus, InputData, PlanEntry};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::coverage::{coverage_percentage, one_decimal};

/// 計劃摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanSummary {
    /// 計劃中的成品數
    pub total_materials: usize,

    /// 使用到的子件數
    pub total_components: usize,

    /// BOM 明細總筆數
    pub total_bom_lines: usize,

    /// 沒有 MRP 控制員的子件（僅在提供控制員表時計算）
    pub components_without_controller: Vec<String>,

    /// 單位不一致的子件
    pub multi_uom_components: Vec<String>,

    /// 沒有 BOM 的成品
    pub missing_boms: Vec<String>,

    /// 物料訂單類型標籤 → BOM 明細筆數
    pub order_type_counts: BTreeMap<String, usize>,
}

impl PlanSummary {
    pub fn build(input: &InputData, missing_boms: &[String], config: &AnalysisConfig) -> Self {
        let components: BTreeSet<&str> = input
            .bom_lines
            .iter()
            .map(|l| l.component_id.as_str())
            .collect();

        let components_without_controller = if input.has_controllers() {
            components
                .iter()
                .filter(|c| !input.assignments.contains(c))
                .map(|c| c.to_string())
                .collect()
        } else {
            Vec::new()
        };

        let mut uoms: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for line in &input.bom_lines {
            uoms.entry(line.component_id.as_str())
                .or_default()
                .insert(line.component_uom.as_str());
        }
        let multi_uom_components = uoms
            .into_iter()
            .filter(|(_, set)| set.len() > 1)
            .map(|(c, _)| c.to_string())
            .collect();

        let mut order_type_counts: BTreeMap<String, usize> = config
            .order_type_labels
            .values()
            .chain(std::iter::once(&config.undefined_label))
            .map(|label| (label.clone(), 0))
            .collect();
        for line in &input.bom_lines {
            *order_type_counts
                .entry(config.order_type_label(&line.component_order_type).to_string())
                .or_default() += 1;
        }

        Self {
            total_materials: input.plan_materials().len(),
            total_components: components.len(),
            total_bom_lines: input.bom_lines.len(),
            components_without_controller,
            multi_uom_components,
            missing_boms: missing_boms.to_vec(),
            order_type_counts,
        }
    }
}

/// 覆蓋狀態統計
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageStats {
    pub total: usize,
    pub sufficient: usize,
    pub partial: usize,
    pub insufficient: usize,

    /// 覆蓋率無定義，不列入比例
    pub undefined: usize,

    /// 緊急子件數
    pub urgent: usize,
}

impl CoverageStats {
    pub fn from_records(records: &[&CoverageRecord]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };
        for record in records {
            match record.status {
                CoverageStatus::Sufficient => stats.sufficient += 1,
                CoverageStatus::Partial => stats.partial += 1,
                CoverageStatus::Insufficient => stats.insufficient += 1,
                CoverageStatus::Undefined => stats.undefined += 1,
            }
            if record.is_urgent() {
                stats.urgent += 1;
            }
        }
        stats
    }

    /// 佔有定義覆蓋率子件的比例（%，一位小數）
    pub fn share(&self, count: usize) -> Option<Decimal> {
        let defined = self.total - self.undefined;
        if defined == 0 {
            return None;
        }
        Some(one_decimal(
            Decimal::from(count) * Decimal::ONE_HUNDRED / Decimal::from(defined),
        ))
    }
}

/// 物料訂單類型統計
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderTypeStat {
    pub component_order_type: String,
    pub component_count: usize,
    pub total_required: Decimal,
    pub total_stock: Decimal,
    pub coverage_pct: Option<Decimal>,
}

pub fn order_type_stats(records: &[&CoverageRecord]) -> Vec<OrderTypeStat> {
    let mut grouped: BTreeMap<&str, (usize, Decimal, Decimal)> = BTreeMap::new();
    for record in records {
        let (count, required, stock) = grouped
            .entry(record.component_order_type.as_str())
            .or_default();
        *count += 1;
        *required += record.total_required;
        *stock += record.current_stock;
    }
    grouped
        .into_iter()
        .map(|(order_type, (count, required, stock))| OrderTypeStat {
            component_order_type: order_type.to_string(),
            component_count: count,
            total_required: required,
            total_stock: stock,
            coverage_pct: coverage_percentage(stock, required),
        })
        .collect()
}

/// 緊急子件
pub fn critical_components<'a>(records: &[&'a CoverageRecord]) -> Vec<&'a CoverageRecord> {
    records.iter().copied().filter(|r| r.is_urgent()).collect()
}

/// 覆蓋率最低的前 `count` 個子件（排除無定義）
pub fn lowest_coverage<'a>(
    records: &[&'a CoverageRecord],
    count: usize,
) -> Vec<&'a CoverageRecord> {
    let mut defined: Vec<&CoverageRecord> =
        records.iter().copied().filter(|r| r.has_coverage()).collect();
    defined.sort_by_key(|r| r.coverage_pct);
    defined.truncate(count);
    defined
}

/// 單月計劃量
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    /// 當月第一天
    pub month: NaiveDate,

    /// 訂單類型 → 計劃量（缺少的類型為 0）
    pub quantities: BTreeMap<String, Decimal>,

    pub total: Decimal,
}

impl MonthlyRow {
    /// 例如 `October 2025`
    pub fn label(&self) -> String {
        self.month.format("%B %Y").to_string()
    }

    /// 訂單類型佔當月比例（%，一位小數），當月總量為零時為 0
    pub fn share(&self, order_type: &str) -> Decimal {
        let qty = self.quantities.get(order_type).copied().unwrap_or_default();
        if self.total.is_zero() {
            return one_decimal(Decimal::ZERO);
        }
        let pct = qty
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(self.total))
            .or_else(|| qty.checked_div(self.total)?.checked_mul(Decimal::ONE_HUNDRED));
        match pct {
            Some(pct) => one_decimal(pct),
            None => {
                tracing::warn!("{} {} 比例計算溢位，以 0 表示", self.label(), order_type);
                one_decimal(Decimal::ZERO)
            }
        }
    }
}

/// 每月計劃量 × 訂單類型
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyDistribution {
    pub order_types: Vec<String>,
    pub rows: Vec<MonthlyRow>,
}

impl MonthlyDistribution {
    pub fn build(entries: &[PlanEntry]) -> Self {
        let order_types: BTreeSet<&str> = entries.iter().map(|e| e.order_type.as_str()).collect();
        let mut grouped: BTreeMap<NaiveDate, BTreeMap<String, Decimal>> = BTreeMap::new();

        for entry in entries {
            let Some(month) = NaiveDate::from_ymd_opt(entry.date.year(), entry.date.month(), 1)
            else {
                continue;
            };
            let by_type = grouped.entry(month).or_insert_with(|| {
                order_types
                    .iter()
                    .map(|t| (t.to_string(), Decimal::ZERO))
                    .collect()
            });
            *by_type.entry(entry.order_type.clone()).or_default() += entry.planned_quantity;
        }

        Self {
            order_types: order_types.iter().map(|t| t.to_string()).collect(),
            rows: grouped
                .into_iter()
                .map(|(month, quantities)| MonthlyRow {
                    total: quantities.values().copied().sum(),
                    month,
                    quantities,
                })
                .collect(),
        }
    }
}
