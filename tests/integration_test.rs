//! 集成測試：活頁簿 → 分析 → 匯出 → 重新讀取

use chrono::NaiveDate;
use mrp_cache::{CacheStats, MemoryCache, NoopCache};
use mrp_calc::CoverageFilter;
use mrp_core::{AnalysisConfig, CoverageStatus, MrpError, Priority};
use mrp_coverage::{build_filter, Pipeline, Report};
use rstest::rstest;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

/// 爐具計劃：A、B 有 BOM，C 沒有
fn sample_workbook(controller_sheet: &str) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let plan = workbook.add_worksheet();
    plan.set_name("plan").unwrap();
    for (col, header) in ["Item", "Description", "OT"].iter().enumerate() {
        plan.write_string(0, col as u16, *header).unwrap();
    }
    // 45931 = 2025-10-01, 45962 = 2025-11-01
    plan.write_number_with_format(0, 3, 45931.0, &date_format).unwrap();
    plan.write_string(0, 4, "2025-10-15").unwrap();
    plan.write_number(0, 5, 45962.0).unwrap();
    plan.write_string(0, 6, "Remarks").unwrap();
    let rows: [(&str, &str, &str, [f64; 3]); 4] = [
        ("A", "Stove A", "L", [100.0, 200.0, 300.0]),
        ("A", "Stove A", "E", [50.0, 0.0, 0.0]),
        ("B", "Stove B", "L", [10.0, 20.0, 30.0]),
        ("C", "Stove C", "L", [5.0, 5.0, 5.0]),
    ];
    for (i, (material, desc, order_type, qtys)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        plan.write_string(row, 0, *material).unwrap();
        plan.write_string(row, 1, *desc).unwrap();
        plan.write_string(row, 2, *order_type).unwrap();
        for (j, qty) in qtys.iter().enumerate() {
            plan.write_number(row, 3 + j as u16, *qty).unwrap();
        }
    }

    let component = workbook.add_worksheet();
    component.set_name("Component").unwrap();
    let headers = [
        "Material",
        "Comp",
        "Comp Desc",
        "UoM",
        "Qty",
        "Stock",
        "Procurement Type",
        "Level",
    ];
    for (col, header) in headers.iter().enumerate() {
        component.write_string(0, col as u16, *header).unwrap();
    }
    let lines: [(&str, &str, &str, &str, f64, f64, &str, &str); 5] = [
        ("A", "BURNER", "Gas burner", "PC", 4.0, 300.0, "F", "1"),
        ("A", "KNOB", "Control knob", "PC", 2.0, 5000.0, "E", "2"),
        ("B", "BURNER", "Gas burner", "PC", 2.0, 300.0, "F", "1"),
        ("B", "GLASS", "Glass lid", "PC", 0.0, 10.0, "F", "1"),
        ("B", "PIPE", "Gas pipe", "M", 1.5, 100.0, "", "2"),
    ];
    for (i, (material, comp, desc, uom, qty, stock, order_type, level)) in
        lines.iter().enumerate()
    {
        let row = i as u32 + 1;
        component.write_string(row, 0, *material).unwrap();
        component.write_string(row, 1, *comp).unwrap();
        component.write_string(row, 2, *desc).unwrap();
        component.write_string(row, 3, *uom).unwrap();
        component.write_number(row, 4, *qty).unwrap();
        component.write_number(row, 5, *stock).unwrap();
        if !order_type.is_empty() {
            component.write_string(row, 6, *order_type).unwrap();
        }
        component.write_number(row, 7, level.parse::<f64>().unwrap()).unwrap();
    }

    let controllers = workbook.add_worksheet();
    controllers.set_name(controller_sheet).unwrap();
    controllers.write_string(0, 0, "Component").unwrap();
    controllers.write_string(0, 1, "MRP Contor").unwrap();
    controllers.write_string(1, 0, "BURNER").unwrap();
    controllers.write_string(1, 1, "P01").unwrap();
    controllers.write_string(2, 0, "KNOB").unwrap();
    controllers.write_string(2, 1, "P02").unwrap();

    workbook.save_to_buffer().unwrap()
}

fn write_sample(dir: &Path, name: &str, controller_sheet: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, sample_workbook(controller_sheet)).unwrap();
    path
}

fn unzip_single(path: &Path) -> (String, Vec<u8>) {
    let bytes = std::fs::read(path).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_index(0).unwrap();
    let name = file.name().to_string();
    let mut content = Vec::new();
    file.read_to_end(&mut content).unwrap();
    (name, content)
}

#[test]
fn test_workbook_to_coverage() {
    mrp_coverage::logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path(), "plan.xlsx", "MRP Controller");

    let mut pipeline = Pipeline::new(AnalysisConfig::default(), NoopCache);
    let (input, result) = pipeline.run(&path).unwrap();

    assert_eq!(input.bom_lines.len(), 5);
    assert_eq!(result.dates.len(), 3);
    assert_eq!(result.missing_boms, vec!["C".to_string()]);
    assert!(result.warnings.iter().any(|w| w.subject == "Remarks"));
    assert!(result.warnings.iter().any(|w| w.subject == "GLASS"));

    let find = |id: &str| result.coverage.iter().find(|r| r.component_id == id).unwrap();

    // A: (100+200+300+50) × 4 = 2600, B: 60 × 2 = 120
    let burner = find("BURNER");
    assert_eq!(burner.total_required.to_i64(), Some(2720));
    assert_eq!(burner.coverage_pct.unwrap().to_string(), "11.0");
    assert_eq!(burner.priority, Priority::Urgent);
    assert_eq!(burner.mrp_controller, "P01");
    assert_eq!(burner.order_types, "E, L");

    let knob = find("KNOB");
    assert_eq!(knob.status, CoverageStatus::Sufficient);
    assert_eq!(knob.hierarchy_level, "2");

    let glass = find("GLASS");
    assert_eq!(glass.coverage_pct, None);
    assert_eq!(glass.status, CoverageStatus::Undefined);
    assert_eq!(glass.priority, Priority::Low);

    let pipe = find("PIPE");
    assert_eq!(pipe.component_order_type, "undefined");
    assert_eq!(pipe.mrp_controller, "undefined");
    assert_eq!(pipe.total_required.to_f64(), Some(90.0));

    assert_eq!(result.summary.multi_uom_components, Vec::<String>::new());
    assert_eq!(result.summary.components_without_controller, vec!["GLASS", "PIPE"]);
    assert_eq!(result.summary.order_type_counts["Purchase"], 3);
    assert_eq!(result.monthly.rows.len(), 2);
}

#[test]
fn test_export_round_trip_matches_classifier_totals() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path(), "plan.xlsx", "MRP Controller");
    let out = dir.path().join("out");

    let mut pipeline = Pipeline::new(AnalysisConfig::default(), NoopCache);
    let (input, result) = pipeline.run(&path).unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let written = pipeline.export(&result, &input, &out, date).unwrap();

    assert_eq!(
        written.file_name().unwrap().to_str().unwrap(),
        "All_Component_Results_19_Oct_2026.zip"
    );
    let (name, xlsx) = unzip_single(&written);
    assert_eq!(name, "All_Component_Results_19_Oct_2026.xlsx");

    let tables = mrp_io::read_workbook_bytes(&xlsx).unwrap();
    let need = tables.iter().find(|t| t.name == "Need_By_Date").unwrap();
    assert_eq!(&need.header_names()[6..], &["01 Oct", "15 Oct", "01 Nov"]);
    assert!(tables.iter().any(|t| t.name == "MRP_Controller"));

    let component_col = need.column_index("Component").unwrap();
    for row in 0..need.height() {
        let id = need.cell(row, component_col).as_text();
        let total: f64 = (6..need.width())
            .map(|col| need.cell(row, col).as_decimal().unwrap().to_f64().unwrap())
            .sum();
        let record = result.coverage.iter().find(|r| r.component_id == id).unwrap();
        assert!((total - record.total_required.to_f64().unwrap()).abs() < 1e-9, "{id}");
    }
}

#[test]
fn test_identical_inputs_load_once() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_sample(dir.path(), "first.xlsx", "MRP Controller");
    let copy = dir.path().join("copy.xlsx");
    std::fs::copy(&first, &copy).unwrap();
    let legacy = write_sample(dir.path(), "legacy.xlsx", "MRP Contor");

    let mut pipeline = Pipeline::new(AnalysisConfig::default(), MemoryCache::new());
    let (a, _) = pipeline.run(&first).unwrap();
    let (b, _) = pipeline.run(&copy).unwrap();
    assert_eq!(a, b);
    assert_eq!(pipeline.cache().stats(), CacheStats { hits: 1, misses: 1 });

    pipeline.run(&legacy).unwrap();
    assert_eq!(pipeline.cache().stats(), CacheStats { hits: 1, misses: 2 });
    assert_eq!(pipeline.cache().len(), 2);
}

#[rstest]
#[case(vec!["P01"], vec![], vec![], vec!["BURNER"])]
#[case(vec![], vec!["F"], vec![], vec!["BURNER", "GLASS"])]
#[case(vec![], vec![], vec!["2"], vec!["PIPE", "KNOB"])]
#[case(vec!["P01", "P02"], vec!["E"], vec!["2"], vec!["KNOB"])]
fn test_filters(
    #[case] controllers: Vec<&str>,
    #[case] order_types: Vec<&str>,
    #[case] levels: Vec<&str>,
    #[case] expected: Vec<&str>,
) {
    let owned = |v: Vec<&str>| v.into_iter().map(String::from).collect::<Vec<_>>();
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path(), "plan.xlsx", "MRP Controller");
    let mut pipeline = Pipeline::new(AnalysisConfig::default(), NoopCache);
    let (_, result) = pipeline.run(&path).unwrap();

    let filter = build_filter(&owned(controllers), &owned(order_types), &owned(levels));
    let ids: Vec<&str> = result
        .filtered_coverage(&filter)
        .iter()
        .map(|r| r.component_id.as_str())
        .collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_report_from_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path(), "plan.xlsx", "MRP Controller");
    let config = AnalysisConfig::default().with_lowest_coverage_count(2);
    let mut pipeline = Pipeline::new(config.clone(), NoopCache);
    let (_, result) = pipeline.run(&path).unwrap();

    let report = Report::build("plan.xlsx", &result, &CoverageFilter::new(), &config);
    assert_eq!(report.coverage.total, 4);
    assert_eq!(report.coverage.undefined, 1);
    assert_eq!(report.lowest.len(), 2);
    assert_eq!(report.lowest[0].component_id, "BURNER");
    assert!(report.render_text().contains("缺少 BOM 的成品: C"));
}

#[test]
fn test_missing_sheet_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.xlsx");
    let mut workbook = Workbook::new();
    workbook.add_worksheet().set_name("plan").unwrap();
    std::fs::write(&path, workbook.save_to_buffer().unwrap()).unwrap();

    let mut pipeline = Pipeline::new(AnalysisConfig::default(), NoopCache);
    let err = pipeline.run(&path).unwrap_err();
    let source = err.downcast_ref::<MrpError>().unwrap();
    assert!(matches!(source, MrpError::MissingSheet { sheets } if sheets == &["Component"]));
}
