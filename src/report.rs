//! 終端機報表與 JSON 輸出

use mrp_calc::insights::{
    critical_components, lowest_coverage, order_type_stats, CoverageStats, OrderTypeStat,
    PlanSummary,
};
use mrp_calc::{AnalysisResult, CoverageFilter, FilterOptions, MrpWarning};
use mrp_core::{AnalysisConfig, CoverageRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// 每月分佈的一列
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyLine {
    pub month: String,
    pub total: Decimal,
    pub quantities: BTreeMap<String, Decimal>,
    pub shares: BTreeMap<String, Decimal>,
}

/// 單一活頁簿的分析報表
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub source: String,
    pub summary: PlanSummary,
    pub filter_options: FilterOptions,
    pub coverage: CoverageStats,
    pub order_types: Vec<OrderTypeStat>,
    pub critical: Vec<CoverageRecord>,
    pub lowest: Vec<CoverageRecord>,
    pub monthly: Vec<MonthlyLine>,
    pub warnings: Vec<MrpWarning>,
    pub calculation_time_ms: Option<u128>,
}

impl Report {
    pub fn build(
        source: impl Into<String>,
        result: &AnalysisResult,
        filter: &CoverageFilter,
        config: &AnalysisConfig,
    ) -> Self {
        let rows = result.filtered_coverage(filter);
        let monthly = result
            .monthly
            .rows
            .iter()
            .map(|row| MonthlyLine {
                month: row.label(),
                total: row.total,
                shares: row
                    .quantities
                    .keys()
                    .map(|t| (t.clone(), row.share(t)))
                    .collect(),
                quantities: row.quantities.clone(),
            })
            .collect();

        Self {
            source: source.into(),
            summary: result.summary.clone(),
            filter_options: FilterOptions::from_records(&result.coverage),
            coverage: CoverageStats::from_records(&rows),
            order_types: order_type_stats(&rows),
            critical: critical_components(&rows).into_iter().cloned().collect(),
            lowest: lowest_coverage(&rows, config.lowest_coverage_count)
                .into_iter()
                .cloned()
                .collect(),
            monthly,
            warnings: result.warnings.clone(),
            calculation_time_ms: result.calculation_time_ms,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// 純文字報表
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // 寫入 String 不會失敗
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        let s = &self.summary;
        writeln!(out, "=== {} ===", self.source)?;
        writeln!(out, "成品數: {}", s.total_materials)?;
        writeln!(out, "子件數: {}", s.total_components)?;
        writeln!(out, "BOM 明細: {}", s.total_bom_lines)?;
        writeln!(out, "未指派控制員子件: {}", s.components_without_controller.len())?;
        if !s.multi_uom_components.is_empty() {
            writeln!(out, "多單位子件: {}", s.multi_uom_components.join(", "))?;
        }
        if !s.missing_boms.is_empty() {
            writeln!(out, "缺少 BOM 的成品: {}", s.missing_boms.join(", "))?;
        }
        for (label, count) in &s.order_type_counts {
            writeln!(out, "  {}: {}", label, count)?;
        }

        let c = &self.coverage;
        writeln!(out)?;
        writeln!(out, "--- 覆蓋率 ({} 個子件) ---", c.total)?;
        for (label, count) in [
            ("sufficient", c.sufficient),
            ("partial", c.partial),
            ("insufficient", c.insufficient),
        ] {
            writeln!(out, "  {}: {} ({}%)", label, count, percent(c.share(count)))?;
        }
        if c.undefined > 0 {
            writeln!(out, "  undefined: {}", c.undefined)?;
        }
        writeln!(out, "  urgent: {}", c.urgent)?;

        if !self.order_types.is_empty() {
            writeln!(out)?;
            writeln!(out, "--- 物料訂單類型 ---")?;
            for stat in &self.order_types {
                writeln!(
                    out,
                    "  {}: {} 個子件, 需求 {}, 庫存 {}, 覆蓋率 {}%",
                    stat.component_order_type,
                    stat.component_count,
                    stat.total_required.normalize(),
                    stat.total_stock.normalize(),
                    percent(stat.coverage_pct)
                )?;
            }
        }

        if !self.critical.is_empty() {
            writeln!(out)?;
            writeln!(out, "--- 緊急子件 ---")?;
            for record in &self.critical {
                write_record(out, record)?;
            }
        }

        if !self.lowest.is_empty() {
            writeln!(out)?;
            writeln!(out, "--- 覆蓋率最低 {} 個子件 ---", self.lowest.len())?;
            for record in &self.lowest {
                write_record(out, record)?;
            }
        }

        if !self.monthly.is_empty() {
            writeln!(out)?;
            writeln!(out, "--- 每月計劃量 ---")?;
            for line in &self.monthly {
                let parts: Vec<String> = line
                    .quantities
                    .iter()
                    .map(|(t, qty)| format!("{} {} ({}%)", t, qty.normalize(), line.shares[t]))
                    .collect();
                writeln!(
                    out,
                    "  {}: {} | {}",
                    line.month,
                    line.total.normalize(),
                    parts.join(", ")
                )?;
            }
        }

        if !self.warnings.is_empty() {
            writeln!(out)?;
            writeln!(out, "--- 警告 ({}) ---", self.warnings.len())?;
            for warning in &self.warnings {
                writeln!(out, "  [{}] {}", warning.subject, warning.message)?;
            }
        }
        Ok(())
    }
}

fn percent(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn write_record(out: &mut String, record: &CoverageRecord) -> std::fmt::Result {
    writeln!(
        out,
        "  {} {} [{}] 庫存 {} / 需求 {} = {}% ({}, {})",
        record.component_id,
        record.component_description,
        record.mrp_controller,
        record.current_stock.normalize(),
        record.total_required.normalize(),
        percent(record.coverage_pct),
        record.status,
        record.priority
    )
}
