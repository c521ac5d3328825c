//! mrp-coverage 命令列

use anyhow::{Context, Result};
use clap::Parser;
use mrp_cache::MemoryCache;
use mrp_core::AnalysisConfig;
use mrp_coverage::{build_filter, logging, Pipeline, Report};
use std::path::PathBuf;

/// 子件需求展開與庫存覆蓋率分析
#[derive(Debug, Parser)]
#[command(name = "mrp-coverage", version, about)]
struct Cli {
    /// 輸入活頁簿（plan、Component、MRP Controller 工作表）
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// 只顯示指定 MRP 控制員（可重複）
    #[arg(long = "controller")]
    controllers: Vec<String>,

    /// 只顯示指定物料訂單類型（可重複）
    #[arg(long = "component-order-type")]
    component_order_types: Vec<String>,

    /// 只顯示指定 BOM 層級（可重複）
    #[arg(long = "level")]
    levels: Vec<String>,

    /// 匯出目錄
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// 不產生匯出檔
    #[arg(long)]
    no_export: bool,

    /// JSON 分析配置
    #[arg(long)]
    config: Option<PathBuf>,

    /// 以 JSON 輸出報表
    #[arg(long)]
    json: bool,

    /// 覆蓋率最低清單筆數
    #[arg(long)]
    top: Option<usize>,
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("無法讀取配置檔 {}", path.display()))?;
            AnalysisConfig::from_json_str(&json)
                .with_context(|| format!("配置檔無效 {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(top) = cli.top {
        config = config.with_lowest_coverage_count(top);
    }
    Ok(config)
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let filter = build_filter(&cli.controllers, &cli.component_order_types, &cli.levels);
    let mut pipeline = Pipeline::new(config, MemoryCache::new());
    let today = chrono::Local::now().date_naive();

    for path in &cli.inputs {
        let (input, result) = pipeline.run(path)?;

        let report = Report::build(path.display().to_string(), &result, &filter, pipeline.config());
        if cli.json {
            println!("{}", report.to_json().context("無法序列化報表")?);
        } else {
            print!("{}", report.render_text());
        }

        if !cli.no_export {
            let written = pipeline.export(&result, &input, &cli.out, today)?;
            eprintln!("已匯出: {}", written.display());
        }
    }

    let stats = pipeline.cache().stats();
    tracing::debug!("載入快取：命中 {}，未命中 {}", stats.hits, stats.misses);
    Ok(())
}
