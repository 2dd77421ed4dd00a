//! MTDAW 工程归档检查工具
//!
//! 读取多轨录音应用的 `.mtdaw` 工程目录：解码轨道/区域/效果器元数据，
//! 从 `Bins/<hex>.wav` 文件名恢复bin描述符，并用 CRC-64 校验每个bin的音频负载。
//!
//! ## 核心特性
//! - 12位量化旋钮值到 dB、比率、毫秒、单极点系数、赫兹和Q值的换算
//! - v1/v2 bin文件名描述符的大端编解码
//! - 分块、加共享锁的 CRC-64 内容校验，支持rayon并行
//! - 基于 [`project::FieldSource`] 的工程模型，不依赖具体归档格式
//!
//! 本工具只读，从不修改工程文件。

pub mod audio;
pub mod core;
pub mod error;
pub mod project;
pub mod tools;

// 重新导出核心类型
pub use audio::{BinMetadata, BinVerdict, Crc64, verify_bin};
pub use core::Knob;
pub use error::{ErrorCategory, InspectError, InspectResult};
pub use project::{Project, Track, load_project};
