//! 分析流程：載入（含快取）→ 分析 → 匯出

use anyhow::{Context, Result};
use chrono::NaiveDate;
use mrp_cache::{memoize, LoadCache};
use mrp_calc::{AnalysisResult, CoverageFilter, MrpAnalyzer};
use mrp_core::{AnalysisConfig, InputData};
use mrp_io::{ResultExporter, WorkbookLoader};
use std::path::{Path, PathBuf};

/// 單次分析流程，載入快取由呼叫端提供
pub struct Pipeline<C> {
    loader: WorkbookLoader,
    analyzer: MrpAnalyzer,
    cache: C,
}

impl<C: LoadCache<InputData>> Pipeline<C> {
    pub fn new(config: AnalysisConfig, cache: C) -> Self {
        let loader = WorkbookLoader::new().with_undefined_label(config.undefined_label.clone());
        Self {
            loader,
            analyzer: MrpAnalyzer::new(config),
            cache,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        self.analyzer.config()
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// 載入活頁簿內容，相同內容只解析一次
    pub fn load_bytes(&mut self, bytes: &[u8]) -> mrp_core::Result<InputData> {
        let loader = &self.loader;
        memoize(&mut self.cache, bytes, |b| loader.load_bytes(b))
    }

    pub fn load(&mut self, path: &Path) -> Result<InputData> {
        let bytes =
            std::fs::read(path).with_context(|| format!("無法讀取檔案 {}", path.display()))?;
        tracing::info!("載入活頁簿: {} ({} bytes)", path.display(), bytes.len());
        self.load_bytes(&bytes)
            .with_context(|| format!("活頁簿驗證失敗 {}", path.display()))
    }

    pub fn run(&mut self, path: &Path) -> Result<(InputData, AnalysisResult)> {
        let input = self.load(path)?;
        let result = self
            .analyzer
            .analyze(&input)
            .with_context(|| format!("分析失敗 {}", path.display()))?;
        Ok((input, result))
    }

    /// 匯出壓縮檔到目錄，回傳檔案路徑
    pub fn export(
        &self,
        result: &AnalysisResult,
        input: &InputData,
        dir: &Path,
        date: NaiveDate,
    ) -> Result<PathBuf> {
        let archive = ResultExporter::new(self.config())
            .export(result, input, date)
            .context("產生匯出檔失敗")?;
        archive
            .write_to(dir)
            .with_context(|| format!("無法寫入匯出目錄 {}", dir.display()))
    }
}

/// 由命令列選項建立過濾條件，空白選項表示不限制
pub fn build_filter(
    controllers: &[String],
    order_types: &[String],
    levels: &[String],
) -> CoverageFilter {
    let mut filter = CoverageFilter::new();
    if !controllers.is_empty() {
        filter = filter.with_controllers(controllers.iter().cloned());
    }
    if !order_types.is_empty() {
        filter = filter.with_component_order_types(order_types.iter().cloned());
    }
    if !levels.is_empty() {
        filter = filter.with_hierarchy_levels(levels.iter().cloned());
    }
    filter
}
