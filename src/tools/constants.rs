//! 常量和默认配置集中管理
//!
//! 将所有重要常量集中定义，避免"默认值漂移"和重复定义

/// 默认配置值
pub mod defaults {
    /// 哈希校验的默认读取块大小（1 MiB）
    ///
    /// 块大小只影响内存占用，不影响摘要结果
    pub const VERIFY_CHUNK_BYTES: usize = 1024 * 1024;

    /// 默认bin并行校验并发度
    ///
    /// 4并发度在多数场景下提供良好的性能/资源平衡
    pub const PARALLEL_FILES_DEGREE: usize = 4;

    /// 批量模式下查找工程目录的最大深度
    pub const PROJECT_SCAN_DEPTH: usize = 2;
}

/// 并发度限制常量
pub mod parallel_limits {
    /// 最小并发度
    pub const MIN_PARALLEL_DEGREE: usize = 1;

    /// 最大并发度
    ///
    /// 校验以顺序读为主，过高的并发只会加剧磁盘竞争
    pub const MAX_PARALLEL_DEGREE: usize = 16;

    /// 最小读取块大小
    pub const MIN_CHUNK_BYTES: usize = 4 * 1024;
}

/// 工程目录布局
pub mod project {
    /// 本模型可理解的最低 projectVersion
    pub const MIN_PROJECT_VERSION: i64 = 1;

    /// 工程未记录采样率时使用的采样率（Hz）
    pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

    pub const TRACKS_FILE: &str = "Tracks2.plist";
    pub const LEGACY_TRACKS_FILE: &str = "Tracks.plist";
    pub const SETTINGS_FILE: &str = "project.plist";
    pub const BINS_DIR: &str = "Bins";

    /// 工程目录扩展名
    pub const PROJECT_EXTENSION: &str = "mtdaw";
}
