//! bin并行校验模块
//!
//! 使用rayon实现文件级并行校验，保证输出顺序一致性

use super::batch_state::{BatchStatsSnapshot, ParallelBatchStats};
use super::cli::AppConfig;
use super::processor::{BinReport, inspect_bin, print_progress};
use crate::error::{InspectError, InspectResult};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 有序结果容器（保证输出顺序）
struct OrderedReport {
    /// 原始扫描索引（用于排序）
    index: usize,
    report: BinReport,
}

/// 多文件并行校验
///
/// - 使用rayon线程池精确控制并发度
/// - 每个任务持有独立的 CRC 累加器，任务间无共享可变状态
/// - 索引排序保证输出顺序与扫描顺序一致
pub fn inspect_bins_parallel(
    bin_files: &[PathBuf],
    config: &AppConfig,
    parallel_degree: usize,
) -> InspectResult<(Vec<BinReport>, BatchStatsSnapshot)> {
    let show_progress = config.verbose && !config.json;
    if show_progress {
        println!("⚡ 启用多文件并行校验：{parallel_degree} 并发度");
    }

    let stats = ParallelBatchStats::new();
    let completed = AtomicUsize::new(0);
    let total = bin_files.len();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallel_degree)
        .thread_name(|i| format!("bin-verify-{i}"))
        .build()
        .map_err(|e| InspectError::ResourceError(format!("线程池创建失败: {e}")))?;

    let results: Vec<OrderedReport> = pool.install(|| {
        bin_files
            .par_iter()
            .enumerate()
            .map(|(index, path)| {
                let report = inspect_bin(path, config);

                stats.record(report.tally(), report.file_name.clone());

                if show_progress {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    print_progress(done, total, &report);
                }

                OrderedReport { index, report }
            })
            .collect()
    });

    // 按原始顺序排序结果
    let mut sorted = results;
    sorted.sort_by_key(|r| r.index);

    Ok((
        sorted.into_iter().map(|r| r.report).collect(),
        stats.snapshot(),
    ))
}
