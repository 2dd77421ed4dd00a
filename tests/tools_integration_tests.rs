//! 工具层集成测试
//!
//! 测试CLI配置、目录扫描、工程检查流程与报告输出。


use mtdaw_inspect::audio::BinVerdict;
use mtdaw_inspect::error::ErrorCategory;
use mtdaw_inspect::tools::{self, AppConfig, BinOutcome, ProjectEntry};
use project_fixtures::{ensure_projects_generated, fixtures_dir};
use std::path::{Path, PathBuf};

fn base_config(input: &Path) -> AppConfig {
    AppConfig {
        json: true,
        ..AppConfig::for_project(input.to_path_buf())
    }
}

fn output_file(name: &str) -> PathBuf {
    let dir = fixtures_dir().join("reports");
    std::fs::create_dir_all(&dir).expect("无法创建报告目录");
    dir.join(name)
}

// ============================================================================
// CLI配置与扫描
// ============================================================================

#[test]
fn test_batch_mode_detection() {
    let fixtures = ensure_projects_generated();

    assert!(
        base_config(&fixtures.root).is_batch_mode(),
        "包含多个工程的目录应为批量模式"
    );
    assert!(
        !base_config(&fixtures.clean).is_batch_mode(),
        ".mtdaw 工程目录应为单工程模式"
    );
    println!("  ✓ 批量/单工程模式识别正确");
}

#[test]
fn test_scan_projects_finds_songs_only() {
    let fixtures = ensure_projects_generated();
    let projects = tools::scan_projects(&fixtures.root).unwrap();

    let names: Vec<String> = projects
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "Clean.mtdaw",
            "Damaged.mtdaw",
            "MissingSettings.mtdaw",
            "Outdated.mtdaw"
        ]
    );
}

#[test]
fn test_scan_bin_files_filters_extensions() {
    let fixtures = ensure_projects_generated();
    let bins = tools::scan_bin_files(&fixtures.damaged.join("Bins")).unwrap();

    assert_eq!(bins.len(), 3, "notes.txt 应被忽略: {bins:?}");
    assert!(bins.windows(2).all(|w| w[0] <= w[1]), "扫描结果应排序");
    assert!(
        bins.iter()
            .all(|p| p.extension().unwrap().eq_ignore_ascii_case("wav"))
    );
}

// ============================================================================
// 工程检查
// ============================================================================

#[test]
fn test_inspect_clean_project() {
    let fixtures = ensure_projects_generated();
    let report = tools::inspect_project(&fixtures.clean, &base_config(&fixtures.clean)).unwrap();

    assert!(report.is_clean(), "{:?}", report.stats);
    assert_eq!(report.bins.len(), 3);
    assert_eq!(report.stats.passed, 3);
    assert!(report.orphan_regions.is_empty());

    let mut decoded: Vec<_> = report
        .bins
        .iter()
        .filter_map(|b| b.metadata().cloned())
        .collect();
    decoded.sort_by_key(|m| m.bin_id);
    assert_eq!(decoded, fixtures.clean_bins);
}

#[test]
fn test_inspect_damaged_project_reports_per_bin() {
    let fixtures = ensure_projects_generated();
    let report =
        tools::inspect_project(&fixtures.damaged, &base_config(&fixtures.damaged)).unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.stats.total(), 3);
    assert_eq!(report.stats.passed, 1);
    assert_eq!(report.stats.mismatched, 1);
    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.stats.error_stats[&ErrorCategory::Format], ["zz.wav"]);

    let mismatched: Vec<_> = report.bins.iter().filter(|b| b.is_mismatch()).collect();
    assert_eq!(mismatched.len(), 1);
    assert_eq!(mismatched[0].metadata().unwrap().bin_id, 10);

    assert_eq!(report.orphan_regions.len(), 1);
    assert_eq!(report.orphan_regions[0].bin_id, 99);
    assert_eq!(report.orphan_regions[0].region, "lost");
}

#[test]
fn test_serial_and_parallel_agree() {
    let fixtures = ensure_projects_generated();
    let bins = tools::scan_bin_files(&fixtures.clean.join("Bins")).unwrap();
    let config = base_config(&fixtures.clean);

    let (serial, serial_stats) = tools::inspect_bins_serial(&bins, &config);
    let (parallel, parallel_stats) = tools::inspect_bins_parallel(&bins, &config, 3).unwrap();

    let names = |reports: &[tools::BinReport]| -> Vec<String> {
        reports.iter().map(|r| r.file_name.clone()).collect()
    };
    assert_eq!(names(&serial), names(&parallel), "并行结果应按扫描顺序排列");
    assert_eq!(serial_stats.summary(), parallel_stats.summary());
}

#[test]
fn test_no_verify_skips_hashing() {
    let fixtures = ensure_projects_generated();
    let config = AppConfig {
        verify: false,
        ..base_config(&fixtures.damaged)
    };
    let report = tools::inspect_project(&fixtures.damaged, &config).unwrap();

    assert_eq!(report.stats.mismatched, 0);
    for bin in &report.bins {
        if let BinOutcome::Decoded { verdict, .. } = &bin.outcome {
            assert!(verdict.is_none());
        }
    }
}

// ============================================================================
// 报告输出
// ============================================================================

#[test]
fn test_single_project_json_report() {
    let fixtures = ensure_projects_generated();
    let out = output_file("clean.json");
    let config = AppConfig {
        output_path: Some(out.clone()),
        ..base_config(&fixtures.clean)
    };

    tools::process_single_project(&fixtures.clean, &config).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();

    assert_eq!(json["project"]["settings"]["tempo"], 96.0);
    assert_eq!(json["project"]["tracks"][0]["friendly_name"], "Drums");
    assert_eq!(json["bin_stats"]["passed"], 3);
    assert_eq!(json["bins"][0]["result"], "decoded");
    assert_eq!(json["bins"][0]["verdict"]["status"], "verified");
}

#[test]
fn test_text_report_contains_sections() {
    let fixtures = ensure_projects_generated();
    let config = AppConfig {
        json: false,
        ..base_config(&fixtures.damaged)
    };
    let report = tools::inspect_project(&fixtures.damaged, &config).unwrap();
    let text = tools::format_project_report(&report, true);

    assert!(text.contains("projectVersion: 1"));
    assert!(text.contains("TRACKS [count: 1]"));
    assert!(text.contains("REGIONS [count: 2]"));
    assert!(text.contains("BINS [count: 3]"));
    assert!(text.contains("FAILED 0x"));
    assert!(text.contains("[binID: 99]"));
}

#[test]
fn test_batch_continues_after_fatal_project() {
    let fixtures = ensure_projects_generated();
    let out = output_file("batch.json");
    let config = AppConfig {
        output_path: Some(out.clone()),
        ..base_config(&fixtures.root)
    };

    let projects = tools::scan_projects(&fixtures.root).unwrap();
    let (entries, stats) = tools::process_batch(&projects, &config).unwrap();

    assert_eq!(entries.len(), 4);
    assert_eq!(stats.passed, 1);
    assert_eq!(stats.mismatched, 1);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.error_stats[&ErrorCategory::Project].len(), 2);

    assert!(matches!(entries[0], ProjectEntry::Inspected(_)));
    assert!(matches!(
        entries[2],
        ProjectEntry::Failed {
            category: ErrorCategory::Project,
            ..
        }
    ));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json[0]["status"], "inspected");
    assert_eq!(json[3]["status"], "failed");
}

#[test]
fn test_verdict_serialization_shape() {
    let verdict = BinVerdict::Mismatch {
        expected: 1,
        computed: 2,
        bytes_read: 3,
    };
    let json = serde_json::to_value(verdict).unwrap();
    assert_eq!(json["status"], "mismatch");
    assert_eq!(json["bytes_read"], 3);
}
