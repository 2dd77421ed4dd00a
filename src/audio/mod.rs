//! bin音频负载模块
//!
//! bin文件名元数据的编解码，以及负载内容的 CRC-64 完整性校验。

pub mod bin_codec;
pub mod crc64;
mod format;
pub mod integrity;

pub use bin_codec::{BIN_EXTENSION, BinMetadata};
pub use crc64::Crc64;
pub use format::{BinVersion, SampleRateCode};
pub use integrity::{BinVerdict, compute_payload_digest, verify_bin, verify_bin_with_chunk_size};
