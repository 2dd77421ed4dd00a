//! 内容完整性校验模块
//!
//! 按 [`BinMetadata`] 描述的区间 `[offset, offset + samples × frameSize)` 分块读取bin文件，
//! 计算 CRC-64 并与存储的哈希比较。大文件按块读取，峰值内存由块大小决定。

use super::bin_codec::BinMetadata;
use super::crc64::Crc64;
use crate::error::{InspectError, InspectResult};
use crate::tools::constants::defaults;
use fs2::FileExt;
use serde::Serialize;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

/// 单个bin的校验结论
///
/// 哈希不匹配是一个结论而不是错误：文件损坏或元数据过期都不应中断其他bin的检查。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BinVerdict {
    Verified {
        digest: u64,
    },
    Mismatch {
        expected: u64,
        computed: u64,
        /// 实际读取的字节数（文件过短时小于负载长度）
        bytes_read: u64,
    },
}

impl BinVerdict {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    /// 把不匹配转换为错误（供需要硬失败的调用方使用）
    pub fn into_result(self, bin_id: u16) -> InspectResult<u64> {
        match self {
            Self::Verified { digest } => Ok(digest),
            Self::Mismatch {
                expected, computed, ..
            } => Err(InspectError::IntegrityMismatch {
                bin_id,
                expected,
                computed,
            }),
        }
    }
}

/// 作用域文件锁：在所有退出路径（包括错误）上释放
struct LockedBin {
    file: File,
}

impl LockedBin {
    fn open(path: &Path) -> InspectResult<Self> {
        let file = File::open(path)?;
        // 共享锁：允许并发读取，排斥写入方；被独占锁定时立即失败，不等待
        if let Err(e) = FileExt::try_lock_shared(&file) {
            let contended = e.kind() == ErrorKind::WouldBlock
                || e.raw_os_error() == fs2::lock_contended_error().raw_os_error();
            if contended {
                return Err(InspectError::IoFailure(std::io::Error::new(
                    ErrorKind::WouldBlock,
                    format!("bin被其他进程锁定: {}", path.display()),
                )));
            }
            return Err(InspectError::IoFailure(e));
        }
        Ok(Self { file })
    }
}

impl Drop for LockedBin {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// 流式计算bin负载的 CRC-64
///
/// 返回 `(摘要, 实际读取字节数)`。文件在负载结束前到达EOF时，
/// 只对已读取部分求摘要（与旧工具一致），由比较结果体现不匹配。
pub fn compute_payload_digest(
    path: &Path,
    meta: &BinMetadata,
    chunk_size: usize,
) -> InspectResult<(u64, u64)> {
    let chunk_size = chunk_size.max(1);
    let mut bin = LockedBin::open(path)?;
    bin.file.seek(SeekFrom::Start(u64::from(meta.data_offset)))?;

    let mut crc = Crc64::new();
    let buffer_len = (chunk_size as u64).min(meta.payload_len()).max(1) as usize;
    let mut buffer = vec![0u8; buffer_len];
    let mut remaining = meta.payload_len();
    let mut bytes_read = 0u64;

    while remaining > 0 {
        let want = remaining.min(buffer.len() as u64) as usize;
        let got = read_up_to(&mut bin.file, &mut buffer[..want])?;
        if got == 0 {
            log::warn!(
                "bin {} 在负载结束前到达EOF: 缺少 {} 字节 ({})",
                meta.bin_id,
                remaining,
                path.display()
            );
            break;
        }
        crc.update(&buffer[..got]);
        bytes_read += got as u64;
        remaining -= got as u64;
    }

    Ok((crc.digest(), bytes_read))
}

/// 读满缓冲区或直到EOF
fn read_up_to(file: &mut File, buf: &mut [u8]) -> InspectResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(InspectError::IoFailure(e)),
        }
    }
    Ok(filled)
}

/// 使用指定块大小校验bin
pub fn verify_bin_with_chunk_size(
    path: &Path,
    meta: &BinMetadata,
    chunk_size: usize,
) -> InspectResult<BinVerdict> {
    let (computed, bytes_read) = compute_payload_digest(path, meta, chunk_size)?;

    let verdict = if computed == meta.content_hash {
        BinVerdict::Verified { digest: computed }
    } else {
        log::debug!(
            "bin {} 哈希不匹配: 存储 0x{:016x}, 计算 0x{:016x}",
            meta.bin_id,
            meta.content_hash,
            computed
        );
        BinVerdict::Mismatch {
            expected: meta.content_hash,
            computed,
            bytes_read,
        }
    };
    Ok(verdict)
}

/// 使用默认块大小（1 MiB）校验bin
pub fn verify_bin(path: &Path, meta: &BinMetadata) -> InspectResult<BinVerdict> {
    verify_bin_with_chunk_size(path, meta, defaults::VERIFY_CHUNK_BYTES)
}
