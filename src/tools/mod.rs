//! 工具模块集合
//!
//! 包含CLI、扫描、检查流程、格式化等工具模块，支持main.rs的流程控制。

pub mod batch_state;
pub mod cli;
pub mod constants;
pub mod formatter;
pub mod parallel_processor;
pub mod processor;
pub mod scanner;
pub mod utils;

// 重新导出主要的公共接口
pub use batch_state::{
    BatchStatsSnapshot, ParallelBatchStats, SerialBatchStats, StatsSummary, Tally,
};
pub use cli::{AppConfig, parse_args, show_completion_info, show_startup_info};
pub use formatter::{format_batch_report, format_project_report, to_json, write_output};
pub use parallel_processor::inspect_bins_parallel;
pub use processor::{
    BinOutcome, BinReport, OrphanRegion, ProjectEntry, ProjectReport, find_orphan_regions,
    inspect_bin, inspect_bins, inspect_bins_serial, inspect_project, process_batch,
    process_single_project,
};
pub use scanner::{scan_bin_files, scan_projects, show_scan_results};
