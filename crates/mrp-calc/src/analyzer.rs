//! MRP 分析主流程

use mrp_core::{AnalysisConfig, InputData};

use crate::coverage::build_coverage;
use crate::explosion::{explode, melt_plan, missing_boms};
use crate::insights::{MonthlyDistribution, PlanSummary};
use crate::{AnalysisResult, BomMembershipPivot, DatePivot, MrpWarning, OrderTypePivot};

/// MRP 分析器
#[derive(Debug, Clone, Default)]
pub struct MrpAnalyzer {
    config: AnalysisConfig,
}

impl MrpAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// 主分析入口
    pub fn analyze(&self, input: &InputData) -> mrp_core::Result<AnalysisResult> {
        tracing::info!(
            "開始 MRP 分析：計劃 {} 列，BOM 明細 {} 筆，控制員 {} 位",
            input.plan.height(),
            input.bom_lines.len(),
            input.assignments.len()
        );

        let start_time = std::time::Instant::now();
        let undefined = self.config.undefined_label.as_str();

        // Step 1: 計劃表展開
        tracing::debug!("Step 1: 計劃表展開");
        let melted = melt_plan(&input.plan)?;
        tracing::debug!(
            "計劃記錄 {} 筆，日期 {} 個，排除欄位 {} 個",
            melted.entries.len(),
            melted.dates.len(),
            melted.malformed_headers.len()
        );
        let mut warnings = input.warnings.clone();
        warnings.extend(melted.warnings);

        // Step 2: BOM 展開
        tracing::debug!("Step 2: BOM 展開");
        let requirements = explode(&melted.entries, &input.bom_lines)?;

        // Step 3: 缺少 BOM 的成品
        tracing::debug!("Step 3: 檢查缺少 BOM 的成品");
        let missing = missing_boms(&input.plan_materials(), &input.bom_materials());
        for material in &missing {
            tracing::warn!("成品 {} 沒有 BOM，不產生子件需求", material);
            warnings.push(MrpWarning::warning(
                material.clone(),
                "計劃中的成品沒有 BOM".to_string(),
            ));
        }

        // Step 4: 樞紐彙總
        tracing::debug!("Step 4: 樞紐彙總");
        let by_date = DatePivot::build(&requirements, &input.assignments, undefined);
        let by_order_type = OrderTypePivot::build(&requirements, &input.assignments, undefined);
        let bom_membership =
            BomMembershipPivot::build(&requirements, &input.assignments, undefined);

        // Step 5: 覆蓋率分類
        tracing::debug!("Step 5: 覆蓋率分類");
        let (coverage, coverage_warnings) =
            build_coverage(&requirements, &input.assignments, &self.config);
        warnings.extend(coverage_warnings);

        // Step 6: 摘要
        tracing::debug!("Step 6: 計劃摘要");
        let summary = PlanSummary::build(input, &missing, &self.config);
        let monthly = MonthlyDistribution::build(&melted.entries);

        let result = AnalysisResult {
            plan_entries: melted.entries,
            dates: melted.dates,
            requirements,
            missing_boms: missing,
            by_date,
            by_order_type,
            bom_membership,
            coverage,
            summary,
            monthly,
            warnings,
            calculation_time_ms: Some(start_time.elapsed().as_millis()),
        };

        tracing::info!("MRP 分析完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "子件 {} 個，警告 {} 則",
            result.coverage.len(),
            result.warnings.len()
        );

        Ok(result)
    }
}
