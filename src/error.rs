//! 统一错误处理框架
//!
//! 工程检查过程中的所有错误类型定义。单个bin的解码/格式错误只影响该bin，
//! 缺失或不兼容的工程文件对整个工程是致命的。

use std::fmt;
use std::io;
use std::path::PathBuf;

/// 工程检查相关的统一错误类型
#[derive(Debug)]
pub enum InspectError {
    /// bin文件名首字节不是已知版本（1或2），携带实际字节值
    UnsupportedFormatVersion(u8),

    /// bitrateFormat 编码不在采样率表中
    UnknownBitrateFormat(u8),

    /// bin文件名十六进制解码失败或长度与版本不符
    MalformedBinFilename(String),

    /// 工程目录缺少必需文件（Tracks2.plist/Tracks.plist/project.plist）
    MissingProjectFile(PathBuf),

    /// 工程版本低于本模型可理解的最低版本
    IncompatibleProjectVersion { found: i64, minimum: i64 },

    /// 内容哈希不匹配（非致命，按bin报告）
    IntegrityMismatch {
        bin_id: u16,
        expected: u64,
        computed: u64,
    },

    /// 文件打开/读取错误
    IoFailure(io::Error),

    /// 归档容器结构错误（plist解析失败、对象图引用越界等）
    ArchiveError(String),

    /// 输入验证错误
    InvalidInput(String),

    /// 资源访问错误（线程池创建失败等）
    ResourceError(String),
}

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectError::UnsupportedFormatVersion(v) => {
                write!(f, "不支持的bin文件名版本 / unsupported version on bin filename: {v}")
            }
            InspectError::UnknownBitrateFormat(code) => {
                write!(f, "未知的采样率编码 / unknown bitrate format code: {code}")
            }
            InspectError::MalformedBinFilename(msg) => {
                write!(f, "bin文件名格式错误 / malformed bin filename: {msg}")
            }
            InspectError::MissingProjectFile(path) => {
                write!(f, "缺少工程文件 / missing project file: {}", path.display())
            }
            InspectError::IncompatibleProjectVersion { found, minimum } => write!(
                f,
                "工程版本不兼容 / incompatible project version {found} (minimum {minimum})"
            ),
            InspectError::IntegrityMismatch {
                bin_id,
                expected,
                computed,
            } => write!(
                f,
                "哈希校验失败 / failed hash for bin {bin_id}: expected 0x{expected:016x}, computed 0x{computed:016x}"
            ),
            InspectError::IoFailure(err) => write!(f, "文件I/O错误: {err}"),
            InspectError::ArchiveError(msg) => write!(f, "归档解析错误 / archive error: {msg}"),
            InspectError::InvalidInput(msg) => write!(f, "输入验证失败: {msg}"),
            InspectError::ResourceError(msg) => write!(f, "资源访问错误: {msg}"),
        }
    }
}

impl std::error::Error for InspectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InspectError::IoFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for InspectError {
    fn from(err: io::Error) -> Self {
        InspectError::IoFailure(err)
    }
}

impl From<plist::Error> for InspectError {
    fn from(err: plist::Error) -> Self {
        InspectError::ArchiveError(format!("plist解析错误: {err}"))
    }
}

/// 工程检查操作的标准Result类型
pub type InspectResult<T> = Result<T, InspectError>;

// ==================== 错误转换Helper函数 ====================

/// 创建bin文件名格式错误的helper函数
#[inline]
pub fn malformed_bin<E: fmt::Display>(context: &str, err: E) -> InspectError {
    InspectError::MalformedBinFilename(format!("{context}: {err}"))
}

/// 创建归档错误的helper函数
#[inline]
pub fn archive_error<E: fmt::Display>(context: &str, err: E) -> InspectError {
    InspectError::ArchiveError(format!("{context}: {err}"))
}

// ==================== 错误分类系统 ====================
// 用于批量处理中的错误统计和分析

/// 错误类别枚举（用于批量处理统计）
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, serde::Serialize)]
pub enum ErrorCategory {
    /// bin描述符格式错误（版本、采样率编码、文件名）
    Format,
    /// 工程文件错误（缺失、版本不兼容、归档损坏）
    Project,
    /// 内容完整性错误
    Integrity,
    /// I/O相关错误（文件不存在、权限不足等）
    Io,
    /// 其他未分类错误
    Other,
}

impl ErrorCategory {
    /// 从InspectError提取错误类别
    pub fn from_inspect_error(e: &InspectError) -> Self {
        match e {
            InspectError::UnsupportedFormatVersion(_)
            | InspectError::UnknownBitrateFormat(_)
            | InspectError::MalformedBinFilename(_) => Self::Format,
            InspectError::MissingProjectFile(_)
            | InspectError::IncompatibleProjectVersion { .. }
            | InspectError::ArchiveError(_) => Self::Project,
            InspectError::IntegrityMismatch { .. } => Self::Integrity,
            InspectError::IoFailure(_) => Self::Io,
            InspectError::InvalidInput(_) | InspectError::ResourceError(_) => Self::Other,
        }
    }

    /// 获取错误类别的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Format => "格式错误",
            Self::Project => "工程错误",
            Self::Integrity => "校验错误",
            Self::Io => "I/O错误",
            Self::Other => "其他错误",
        }
    }

    /// 是否对整个工程致命
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Project)
    }
}
