//! 工程检查模块
//!
//! 负责加载工程、解码bin描述符、校验内容哈希，并把区域引用与磁盘上的bin关联起来。

use super::batch_state::{BatchStatsSnapshot, SerialBatchStats, StatsSummary, Tally};
use super::cli::AppConfig;
use super::{formatter, parallel_processor, scanner, utils};
use crate::audio::{BinMetadata, BinVerdict, verify_bin_with_chunk_size};
use crate::error::{ErrorCategory, InspectError, InspectResult};
use crate::project::{Project, Track, load_project};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 单个bin的检查结果
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BinOutcome {
    /// 描述符解码成功；未启用校验时 `verdict` 为 `None`
    Decoded {
        metadata: BinMetadata,
        verdict: Option<BinVerdict>,
    },
    /// 描述符解码成功，但读取内容失败（权限、锁定等）
    Unverified {
        metadata: BinMetadata,
        category: ErrorCategory,
        message: String,
    },
    /// 描述符解码失败（只影响该bin）
    Failed {
        category: ErrorCategory,
        message: String,
    },
}

/// bin检查报告
#[derive(Debug, Clone, Serialize)]
pub struct BinReport {
    pub file_name: String,
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: BinOutcome,
}

impl BinReport {
    pub fn metadata(&self) -> Option<&BinMetadata> {
        match &self.outcome {
            BinOutcome::Decoded { metadata, .. } | BinOutcome::Unverified { metadata, .. } => {
                Some(metadata)
            }
            BinOutcome::Failed { .. } => None,
        }
    }

    /// 该bin在统计中的归类
    pub fn tally(&self) -> Tally {
        match &self.outcome {
            BinOutcome::Decoded {
                verdict: Some(BinVerdict::Mismatch { .. }),
                ..
            } => Tally::Mismatched,
            BinOutcome::Decoded { .. } => Tally::Passed,
            BinOutcome::Unverified { category, .. } | BinOutcome::Failed { category, .. } => {
                Tally::Failed(*category)
            }
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(
            self.outcome,
            BinOutcome::Decoded {
                verdict: Some(BinVerdict::Mismatch { .. }),
                ..
            }
        )
    }
}

/// 引用了磁盘上不存在的bin的区域
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanRegion {
    pub track: String,
    pub region: String,
    pub bin_id: i64,
}

/// 单个工程的检查报告
#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub project: Project,
    pub bins: Vec<BinReport>,
    pub bin_stats: StatsSummary,
    pub orphan_regions: Vec<OrphanRegion>,
    #[serde(skip)]
    pub stats: BatchStatsSnapshot,
}

impl ProjectReport {
    /// 所有bin均解码成功、校验通过且没有悬空引用
    pub fn is_clean(&self) -> bool {
        self.stats.is_clean() && self.orphan_regions.is_empty()
    }
}

/// 检查单个bin：解码文件名描述符，按需校验内容哈希
pub fn inspect_bin(path: &Path, config: &AppConfig) -> BinReport {
    let file_name = utils::extract_filename_lossy(path);
    let outcome = match decode_bin(path) {
        Ok(metadata) => verify_decoded(path, metadata, config),
        Err(e) => BinOutcome::Failed {
            category: ErrorCategory::from_inspect_error(&e),
            message: e.to_string(),
        },
    };

    BinReport {
        file_name,
        path: path.to_path_buf(),
        outcome,
    }
}

fn decode_bin(path: &Path) -> InspectResult<BinMetadata> {
    BinMetadata::from_path(path).ok_or_else(|| {
        InspectError::InvalidInput(format!("不是bin文件: {}", path.display()))
    })?
}

/// 读取失败时保留描述符，bin仍视为存在
fn verify_decoded(path: &Path, metadata: BinMetadata, config: &AppConfig) -> BinOutcome {
    if !config.verify {
        return BinOutcome::Decoded {
            metadata,
            verdict: None,
        };
    }

    match verify_bin_with_chunk_size(path, &metadata, config.chunk_size) {
        Ok(verdict) => BinOutcome::Decoded {
            metadata,
            verdict: Some(verdict),
        },
        Err(e) => BinOutcome::Unverified {
            metadata,
            category: ErrorCategory::from_inspect_error(&e),
            message: e.to_string(),
        },
    }
}

/// 串行检查bin列表
pub fn inspect_bins_serial(
    bin_files: &[PathBuf],
    config: &AppConfig,
) -> (Vec<BinReport>, BatchStatsSnapshot) {
    let mut stats = SerialBatchStats::new();
    let total = bin_files.len();

    let reports = bin_files
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let report = inspect_bin(path, config);
            stats.record(report.tally(), report.file_name.clone());
            if config.verbose && !config.json {
                print_progress(i + 1, total, &report);
            }
            report
        })
        .collect();

    (reports, stats.snapshot())
}

/// 检查bin列表：多于一个文件且允许并行时使用线程池
pub fn inspect_bins(
    bin_files: &[PathBuf],
    config: &AppConfig,
) -> InspectResult<(Vec<BinReport>, BatchStatsSnapshot)> {
    match config.parallel_files {
        Some(degree) if degree > 1 && bin_files.len() > 1 => {
            // 线程池创建失败时降级为串行
            parallel_processor::inspect_bins_parallel(bin_files, config, degree).or_else(|e| {
                eprintln!("[WARNING] 并行校验失败 / Parallel verification failed: {e}，回退到串行模式 / fallback to serial");
                Ok(inspect_bins_serial(bin_files, config))
            })
        }
        _ => Ok(inspect_bins_serial(bin_files, config)),
    }
}

pub(crate) fn print_progress(index: usize, total: usize, report: &BinReport) {
    match &report.outcome {
        BinOutcome::Decoded {
            verdict: Some(BinVerdict::Mismatch { computed, .. }),
            ..
        } => println!(
            "⚠️  [{index}/{total}] {} - 哈希不匹配 / Failed hash: 0x{computed:016x}",
            report.file_name
        ),
        BinOutcome::Decoded { .. } => println!("✅ [{index}/{total}] {}", report.file_name),
        BinOutcome::Unverified { message, .. } | BinOutcome::Failed { message, .. } => {
            println!("❌ [{index}/{total}] {} - {message}", report.file_name)
        }
    }
}

/// 找出引用了不存在bin的区域
pub fn find_orphan_regions(tracks: &[Track], bins: &[BinReport]) -> Vec<OrphanRegion> {
    let known: HashSet<u16> = bins
        .iter()
        .filter_map(BinReport::metadata)
        .map(|m| m.bin_id)
        .collect();

    tracks
        .iter()
        .flat_map(|track| {
            track.regions.iter().filter_map(|region| {
                let present = region.bin_ref().is_some_and(|id| known.contains(&id));
                (!present).then(|| OrphanRegion {
                    track: track.friendly_name.clone(),
                    region: region.name.clone(),
                    bin_id: region.bin_id,
                })
            })
        })
        .collect()
}

/// 检查一个工程
///
/// 工程文件缺失或版本不兼容是致命错误；单个bin的错误记录在报告中。
pub fn inspect_project(song_path: &Path, config: &AppConfig) -> InspectResult<ProjectReport> {
    let project = load_project(song_path)?;

    let bins_dir = project.bins_dir();
    let bin_files = if bins_dir.is_dir() {
        scanner::scan_bin_files(&bins_dir)?
    } else {
        log::warn!("工程缺少 Bins 目录: {}", bins_dir.display());
        Vec::new()
    };
    log::debug!("{} 个bin文件待检查", bin_files.len());

    let (bins, stats) = inspect_bins(&bin_files, config)?;
    let orphan_regions = find_orphan_regions(&project.tracks, &bins);
    for orphan in &orphan_regions {
        log::warn!(
            "区域 \"{}\"（轨道 \"{}\"）引用的 bin {} 不存在",
            orphan.region,
            orphan.track,
            orphan.bin_id
        );
    }

    Ok(ProjectReport {
        project,
        bin_stats: stats.summary(),
        bins,
        orphan_regions,
        stats,
    })
}

/// 检查单个工程并输出报告
pub fn process_single_project(song_path: &Path, config: &AppConfig) -> InspectResult<ProjectReport> {
    if config.verbose && !config.json {
        println!("加载工程 / Loading project: {}", song_path.display());
    }

    let report = inspect_project(song_path, config)?;
    let output = if config.json {
        formatter::to_json(&report)?
    } else {
        formatter::format_project_report(&report, config.verbose)
    };
    formatter::write_output(&output, config)?;

    Ok(report)
}

/// 批量模式中的一个工程条目
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProjectEntry {
    Inspected(Box<ProjectReport>),
    Failed {
        path: PathBuf,
        category: ErrorCategory,
        message: String,
    },
}

/// 批量检查多个工程
///
/// 工程之间串行处理（每个工程内部的bin可并行），单个工程的致命错误只记为该工程失败。
/// 统计中"不匹配"表示工程已加载但存在bin问题或悬空引用。
pub fn process_batch(
    projects: &[PathBuf],
    config: &AppConfig,
) -> InspectResult<(Vec<ProjectEntry>, BatchStatsSnapshot)> {
    let mut stats = SerialBatchStats::new();
    let mut entries = Vec::with_capacity(projects.len());
    let show_progress = !config.json;

    for (i, song_path) in projects.iter().enumerate() {
        let name = utils::extract_filename_lossy(song_path);
        match inspect_project(song_path, config) {
            Ok(report) => {
                if report.is_clean() {
                    stats.inc_passed();
                    if show_progress {
                        println!("[INFO] [{}/{}] {name}", i + 1, projects.len());
                    }
                } else {
                    stats.inc_mismatched(name.clone());
                    if show_progress {
                        println!(
                            "[WARNING] [{}/{}] {name} - bin问题: {} 不匹配, {} 失败, {} 悬空引用",
                            i + 1,
                            projects.len(),
                            report.stats.mismatched,
                            report.stats.failed,
                            report.orphan_regions.len()
                        );
                    }
                }
                entries.push(ProjectEntry::Inspected(Box::new(report)));
            }
            Err(e) => {
                let category = ErrorCategory::from_inspect_error(&e);
                stats.inc_failed(category, name.clone());
                if show_progress {
                    println!("[FAIL] [{}/{}] {name} - {e}", i + 1, projects.len());
                }
                entries.push(ProjectEntry::Failed {
                    path: song_path.clone(),
                    category,
                    message: e.to_string(),
                });
            }
        }
    }

    let snapshot = stats.snapshot();
    let output = if config.json {
        formatter::to_json(&entries)?
    } else {
        formatter::format_batch_report(&entries, &snapshot, config.verbose)
    };
    formatter::write_output(&output, config)?;

    Ok((entries, snapshot))
}
