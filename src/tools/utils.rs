//! 工具函数模块
//!
//! 文件路径处理与报告用的数值格式化。

/// 数值格式化工具函数
pub mod units {
    /// dB值格式化，负无穷显示为 `-inf`
    #[inline]
    pub fn format_db(value: f64) -> String {
        if value.is_finite() {
            format!("{value:.1}")
        } else {
            "-inf".to_string()
        }
    }

    /// 样本数换算为秒，采样率未知时返回 `None`
    #[inline]
    pub fn samples_to_seconds(samples: i64, sample_rate: f64) -> Option<f64> {
        (sample_rate > 0.0).then(|| samples as f64 / sample_rate)
    }

    /// 字节数格式化（KiB/MiB）
    pub fn format_bytes(bytes: u64) -> String {
        const KIB: f64 = 1024.0;
        const MIB: f64 = KIB * 1024.0;
        let b = bytes as f64;
        if b >= MIB {
            format!("{:.2} MiB", b / MIB)
        } else if b >= KIB {
            format!("{:.1} KiB", b / KIB)
        } else {
            format!("{bytes} B")
        }
    }
}

/// 文件路径处理工具函数
pub mod path {
    use crate::tools::constants::project;
    use std::path::Path;

    /// 提取文件名（返回String，用于日志显示）
    #[inline]
    pub fn extract_filename_lossy(path: &Path) -> String {
        path.file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// 是否为工程目录：扩展名为 `.mtdaw`（不区分大小写）或包含轨道文件
    pub fn is_project_dir(path: &Path) -> bool {
        if !path.is_dir() {
            return false;
        }
        let has_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(project::PROJECT_EXTENSION));
        has_extension
            || path.join(project::TRACKS_FILE).is_file()
            || path.join(project::LEGACY_TRACKS_FILE).is_file()
    }
}

pub use path::{extract_filename_lossy, is_project_dir};
pub use units::{format_bytes, format_db, samples_to_seconds};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_db(-16.5), "-16.5");
        assert_eq!(format_db(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MiB");
        assert_eq!(samples_to_seconds(88200, 44100.0), Some(2.0));
        assert_eq!(samples_to_seconds(100, 0.0), None);
    }
}
