//! 文件扫描模块
//!
//! 扫描 `Bins/` 目录中的bin文件，以及批量模式下查找工程目录。

use super::cli::AppConfig;
use super::constants::defaults;
use super::utils;
use crate::audio::BIN_EXTENSION;
use crate::error::{InspectError, InspectResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn ensure_dir(dir_path: &Path) -> InspectResult<()> {
    if !dir_path.exists() {
        return Err(InspectError::IoFailure(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("目录不存在: {}", dir_path.display()),
        )));
    }

    if !dir_path.is_dir() {
        return Err(InspectError::InvalidInput(format!(
            "路径不是目录: {}",
            dir_path.display()
        )));
    }
    Ok(())
}

/// 扫描bin目录（不递归）
///
/// 只收集扩展名为 `.wav`（不区分大小写）的文件，其他条目直接忽略。
pub fn scan_bin_files(bins_dir: &Path) -> InspectResult<Vec<PathBuf>> {
    ensure_dir(bins_dir)?;

    let mut bin_files = Vec::new();
    for entry in std::fs::read_dir(bins_dir)? {
        let path = entry?.path();

        // 只处理文件，跳过目录
        if !path.is_file() {
            continue;
        }

        if let Some(extension) = path.extension()
            && let Some(ext_str) = extension.to_str()
            && ext_str.eq_ignore_ascii_case(BIN_EXTENSION)
        {
            bin_files.push(path);
        }
    }

    // 按文件名排序，保证报告顺序稳定
    bin_files.sort();

    Ok(bin_files)
}

/// 在目录下查找工程（最大深度2，不进入工程内部）
pub fn scan_projects(root: &Path) -> InspectResult<Vec<PathBuf>> {
    ensure_dir(root)?;

    let mut projects = Vec::new();
    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(defaults::PROJECT_SCAN_DEPTH)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("跳过无法访问的路径: {e}");
                continue;
            }
        };

        if entry.file_type().is_dir() && utils::is_project_dir(entry.path()) {
            projects.push(entry.into_path());
            walker.skip_current_dir();
        }
    }

    Ok(projects)
}

/// 显示工程扫描结果
pub fn show_scan_results(config: &AppConfig, projects: &[PathBuf]) {
    if config.json {
        return;
    }

    if projects.is_empty() {
        println!(
            "⚠️  在目录 {} 中没有找到 .mtdaw 工程",
            config.input_path.display()
        );
        return;
    }

    println!("📁 扫描目录: {}", config.input_path.display());
    println!("🎵 找到 {} 个工程", projects.len());

    if config.verbose {
        for (i, project) in projects.iter().enumerate() {
            println!("   {}. {}", i + 1, utils::extract_filename_lossy(project));
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dir_is_io_error() {
        let result = scan_bin_files(Path::new("/nonexistent/Bins"));
        assert!(matches!(result, Err(InspectError::IoFailure(_))));
    }
}
