//! 报告格式化模块
//!
//! 文本报告（comfy-table表格）与JSON报告的生成和输出。

use super::batch_state::BatchStatsSnapshot;
use super::cli::AppConfig;
use super::processor::{BinOutcome, BinReport, ProjectEntry, ProjectReport};
use super::utils;
use crate::audio::BinVerdict;
use crate::error::{InspectError, InspectResult};
use crate::project::{ProjectSettings, Track};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::path::Path;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const SEPARATOR: &str =
    "--------------------------------------------------------------------------------\n";

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn right(text: impl ToString) -> Cell {
    Cell::new(text.to_string()).set_alignment(CellAlignment::Right)
}

/// 报告头部
pub fn create_output_header(project_path: &Path) -> String {
    let mut output = String::new();
    output.push_str(&format!("MTDAW Inspect v{VERSION} / Project Archive Report\n"));
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    output.push_str(&format!("log date: {now}\n\n"));
    output.push_str(SEPARATOR);
    output.push_str(&format!("PROJECT: {}\n", project_path.display()));
    output.push_str(SEPARATOR);
    output
}

/// 工程设置段
pub fn format_settings(settings: &ProjectSettings) -> String {
    let mut output = String::new();
    output.push_str(&format!("   projectVersion: {}\n", settings.project_version));
    output.push_str(&format!("   inputVolumeDB: {:.1}\n", settings.input_volume_db));
    output.push_str(&format!("   outputVolumeDB: {:.1}\n", settings.output_volume_db));
    if let Some(volume) = settings.metronome_volume {
        output.push_str(&format!("   metronomeVolume: {volume:.1}\n"));
    }
    output.push_str(&format!("   tempo: {:.1}\n", settings.tempo));
    match settings.time_signature() {
        Some(sig) => output.push_str(&format!(
            "   timeSignature: [Index: {}] [\"{sig}\"]\n",
            settings.time_signature_index
        )),
        None => output.push_str(&format!(
            "   timeSignature: [Index: {}] [unknown]\n",
            settings.time_signature_index
        )),
    }
    if let Some(rate) = settings.sample_rate {
        output.push_str(&format!("   sampleRate: {rate:.0}\n"));
    }
    if let Some(bits) = settings.bit_depth {
        output.push_str(&format!("   bitDepth: {bits}\n"));
    }
    output
}

/// 轨道总表
pub fn format_tracks_table(tracks: &[Track]) -> String {
    let mut table = new_table(vec![
        "order", "name", "ch", "muted", "soloed", "volume dB", "gain", "pan", "send A",
        "send B", "regions",
    ]);

    for track in tracks {
        table.add_row(vec![
            right(track.order_num),
            Cell::new(&track.friendly_name),
            right(track.num_channels),
            Cell::new(track.muted),
            Cell::new(track.soloed),
            right(utils::format_db(track.control.volume_db)),
            right(format!("{:.3}", track.control.volume_amplitude())),
            right(format!("{:.3}", track.control.pan)),
            right(format!("{:.4}", track.control.send_a)),
            right(format!("{:.4}", track.control.send_b)),
            right(track.regions.len()),
        ]);
    }

    format!("{table}\n")
}

/// 单条轨道的区域与效果器详情
pub fn format_track_details(track: &Track, sample_rate: f64) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "TRACK [orderNum: {}] [name: \"{}\"] [trackHue: {:.3}] [trackSat: {:.2}] [trackBrt: {:.2}]\n",
        track.order_num, track.friendly_name, track.hue, track.saturation, track.brightness
    ));

    let comp = &track.compressor;
    output.push_str(&format!(
        "   COMPRESSOR [power: {}] [threshold: {:.1} dB] [ratio: {:.2}:1] [attack: {:.2} ms / {:.6}] [release: {:.2} ms / {:.6}]\n",
        comp.power,
        comp.threshold_db(),
        comp.ratio_display(),
        comp.attack_ms(),
        comp.attack_coefficient(sample_rate),
        comp.release_ms(),
        comp.release_coefficient(sample_rate),
    ));

    let eq = &track.eq;
    output.push_str(&format!(
        "   EQ [power: {}] [shelf high: {:.1} dB @ {}] [shelf low: {:.1} dB @ {}]\n",
        eq.power,
        eq.shelf_high_gain_db(),
        eq.shelf_high_freq.raw(),
        eq.shelf_low_gain_db(),
        eq.shelf_low_freq.raw(),
    ));
    output.push_str(&format!(
        "      [param low: {:.1} dB @ {:.1} Hz Q {:.2}] [param high: {:.1} dB @ {:.1} Hz Q {:.2}]\n",
        eq.param_low_gain_db(),
        eq.param_low_freq_hz(),
        eq.param_low_q_value(),
        eq.param_high_gain_db(),
        eq.param_high_freq_hz(),
        eq.param_high_q_value(),
    ));

    if track.regions.is_empty() {
        output.push_str("   REGIONS [count: 0]\n");
        return output;
    }

    output.push_str(&format!("   REGIONS [count: {}]\n", track.regions.len()));
    let mut table = new_table(vec![
        "binID", "realStart", "realLength", "binStart", "fadeA", "fadeB", "volume dB", "muted",
        "name",
    ]);
    for region in &track.regions {
        table.add_row(vec![
            right(region.bin_id),
            right(region.real_start),
            right(region.real_length),
            right(region.bin_start),
            right(region.fade_a),
            right(region.fade_b),
            right(utils::format_db(region.volume_db())),
            Cell::new(region.muted),
            Cell::new(&region.name),
        ]);
    }
    output.push_str(&format!("{table}\n"));
    output
}

fn verdict_cell(report: &BinReport) -> String {
    match &report.outcome {
        BinOutcome::Decoded { verdict: None, .. } => "skipped".to_string(),
        BinOutcome::Decoded {
            verdict: Some(BinVerdict::Verified { .. }),
            ..
        } => "OK".to_string(),
        BinOutcome::Decoded {
            verdict: Some(BinVerdict::Mismatch { computed, .. }),
            ..
        } => format!("FAILED 0x{computed:016x}"),
        BinOutcome::Unverified { category, .. } => format!("未校验 ({})", category.display_name()),
        BinOutcome::Failed { category, .. } => category.display_name().to_string(),
    }
}

/// bin表
pub fn format_bins_table(bins: &[BinReport]) -> String {
    let mut table = new_table(vec![
        "binID", "ver", "ch", "bits", "rate", "samples", "duration", "payload", "hash", "hash check",
        "name",
    ]);

    for report in bins {
        match report.metadata() {
            Some(meta) => table.add_row(vec![
                right(meta.bin_id),
                right(meta.version.as_byte()),
                right(meta.channels),
                right(meta.bits_per_sample()),
                right(meta.sample_rate()),
                right(meta.sample_count),
                right(format!("{:.2}s", meta.duration_seconds())),
                right(utils::format_bytes(meta.payload_len())),
                Cell::new(format!("0x{:016x}", meta.content_hash)),
                Cell::new(verdict_cell(report)),
                Cell::new(meta.name_lossy()),
            ]),
            None => table.add_row(vec![
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new(verdict_cell(report)),
                Cell::new(&report.file_name),
            ]),
        };
    }

    format!("{table}\n")
}

/// 统计段
pub fn format_stats(stats: &BatchStatsSnapshot, label: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("{label}统计:\n"));
    output.push_str(&format!("   总数: {}\n", stats.total()));
    output.push_str(&format!("   通过: {}\n", stats.passed));
    output.push_str(&format!("   哈希不匹配: {}\n", stats.mismatched));
    output.push_str(&format!("   失败: {}\n", stats.failed));

    let mut categories: Vec<_> = stats.error_stats.iter().collect();
    categories.sort_by_key(|(category, _)| category.display_name());
    for (category, names) in categories {
        output.push_str(&format!("   [{}] {}\n", category.display_name(), names.join(", ")));
    }
    output
}

/// 完整的单工程文本报告
pub fn format_project_report(report: &ProjectReport, verbose: bool) -> String {
    let project = &report.project;
    let mut output = create_output_header(&project.path);
    output.push_str(&format_settings(&project.settings));

    output.push_str(&format!("\nTRACKS [count: {}]\n", project.tracks.len()));
    output.push_str(&format_tracks_table(&project.tracks));

    if verbose {
        let sample_rate = project.settings.effective_sample_rate();
        for track in &project.tracks {
            output.push_str(&format_track_details(track, sample_rate));
        }
    }

    output.push_str(&format!("\nBINS [count: {}]\n", report.bins.len()));
    if !report.bins.is_empty() {
        output.push_str(&format_bins_table(&report.bins));
    }

    if !report.orphan_regions.is_empty() {
        output.push_str("\n[WARNING] 区域引用的bin不存在 / regions referencing missing bins:\n");
        for orphan in &report.orphan_regions {
            output.push_str(&format!(
                "   [track: \"{}\"] [region: \"{}\"] [binID: {}]\n",
                orphan.track, orphan.region, orphan.bin_id
            ));
        }
    }

    output.push('\n');
    output.push_str(SEPARATOR);
    output.push_str(&format_stats(&report.stats, "bin校验"));
    output.push_str(SEPARATOR);
    output
}

/// 批量报告：逐个工程的报告加上批量统计
pub fn format_batch_report(
    entries: &[ProjectEntry],
    stats: &BatchStatsSnapshot,
    verbose: bool,
) -> String {
    let mut output = String::new();
    output.push_str("=====================================\n");
    output.push_str("   MTDAW Project Inspection Report\n");
    output.push_str("   批量检查结果\n");
    output.push_str("=====================================\n\n");

    for entry in entries {
        match entry {
            ProjectEntry::Inspected(report) => {
                output.push_str(&format_project_report(report, verbose));
            }
            ProjectEntry::Failed { path, message, .. } => {
                output.push_str(SEPARATOR);
                output.push_str(&format!("PROJECT: {}\n", path.display()));
                output.push_str(&format!("[FAIL] {message}\n"));
                output.push_str(SEPARATOR);
            }
        }
        output.push('\n');
    }

    output.push_str("=====================================\n");
    output.push_str(&format_stats(stats, "批量处理"));
    output.push('\n');
    output.push_str(&format!("生成工具: MTDAW Inspect v{VERSION}\n"));
    output
}

/// 序列化为格式化JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> InspectResult<String> {
    serde_json::to_string_pretty(value)
        .map(|mut json| {
            json.push('\n');
            json
        })
        .map_err(|e| InspectError::InvalidInput(format!("JSON序列化失败: {e}")))
}

/// 处理输出写入（文件或控制台）
pub fn write_output(output: &str, config: &AppConfig) -> InspectResult<()> {
    match &config.output_path {
        Some(output_path) => {
            std::fs::write(output_path, output)?;
            if !config.json {
                println!("📄 结果已保存到: {}", output_path.display());
            }
        }
        None => print!("{output}"),
    }
    Ok(())
}
