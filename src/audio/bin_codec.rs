//! bin元数据编解码模块
//!
//! bin的元数据以大端二进制布局编码进文件名（`<hex>.wav`）。
//!
//! ## 布局
//!
//! | 偏移 | v1 | v2 |
//! |---|---|---|
//! | 0 | version `u8` | version `u8` |
//! | 1 | binID `u16` | binID `u16` |
//! | 3 | channels `u8` | channels `u8` |
//! | 4 | samples `i32` | samples `i32` |
//! | 8 | hash `u64` | bytesPerChannel `u8` |
//! | 9 | | bitrateFormat `u8` |
//! | 10 | | hash `u64` |
//! | 16 / 18 | offset `u32` | offset `u32` |
//! | 20 / 22 | name（至结尾） | name（至结尾） |
//!
//! 版本1隐含 `bytesPerChannel = 2`、`bitrateFormat = 5`（44100Hz）。

use super::format::{BinVersion, SampleRateCode};
use crate::error::{InspectError, InspectResult, malformed_bin};
use serde::{Serialize, Serializer};
use std::path::Path;

/// bin文件扩展名（大小写不敏感）
pub const BIN_EXTENSION: &str = "wav";

/// 版本1隐含的每声道字节数
const LEGACY_BYTES_PER_CHANNEL: u8 = 2;

/// 一个音频负载的描述符
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinMetadata {
    pub version: BinVersion,
    pub bin_id: u16,
    pub channels: u8,
    pub sample_count: i32,
    pub bytes_per_channel: u8,
    pub bitrate_format: SampleRateCode,
    pub content_hash: u64,
    /// 在关联音频文件中的字节偏移
    pub data_offset: u32,
    /// 原始尾部字节（长度可变，不保证是UTF-8）
    #[serde(serialize_with = "serialize_name")]
    pub name: Vec<u8>,
}

fn serialize_name<S: Serializer>(name: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(name))
}

impl BinMetadata {
    /// 构造版本1描述符（16位 / 44100Hz）
    pub fn v1(
        bin_id: u16,
        channels: u8,
        sample_count: i32,
        content_hash: u64,
        data_offset: u32,
        name: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            version: BinVersion::V1,
            bin_id,
            channels,
            sample_count,
            bytes_per_channel: LEGACY_BYTES_PER_CHANNEL,
            bitrate_format: SampleRateCode::LEGACY_44K1,
            content_hash,
            data_offset,
            name: name.into(),
        }
    }

    /// 构造版本2描述符
    #[allow(clippy::too_many_arguments)]
    pub fn v2(
        bin_id: u16,
        channels: u8,
        sample_count: i32,
        bytes_per_channel: u8,
        bitrate_format: SampleRateCode,
        content_hash: u64,
        data_offset: u32,
        name: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            version: BinVersion::V2,
            bin_id,
            channels,
            sample_count,
            bytes_per_channel,
            bitrate_format,
            content_hash,
            data_offset,
            name: name.into(),
        }
    }

    #[inline]
    pub fn bits_per_sample(&self) -> u16 {
        u16::from(self.bytes_per_channel) * 8
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.bitrate_format.hz()
    }

    /// 每帧字节数 = 每声道字节数 × 声道数
    #[inline]
    pub fn frame_size(&self) -> u64 {
        u64::from(self.bytes_per_channel) * u64::from(self.channels)
    }

    /// 负载字节数；负样本数视为空负载
    pub fn payload_len(&self) -> u64 {
        u64::try_from(self.sample_count)
            .unwrap_or(0)
            .saturating_mul(self.frame_size())
    }

    /// 时长（秒），采样率编码为0时返回0
    pub fn duration_seconds(&self) -> f64 {
        match self.sample_rate() {
            0 => 0.0,
            rate => f64::from(self.sample_count.max(0)) / f64::from(rate),
        }
    }

    /// 名称的有损UTF-8表示（用于显示）
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    /// 从十六进制文件名主干解码
    pub fn decode_hex(stem: &str) -> InspectResult<Self> {
        let bytes = hex_decode(stem)?;
        Self::decode_bytes(&bytes)
    }

    /// 从原始字节解码
    ///
    /// 先只读取版本字节；版本无效时立即返回，不再读取后续字节。
    pub fn decode_bytes(bytes: &[u8]) -> InspectResult<Self> {
        let (&version_byte, _) = bytes
            .split_first()
            .ok_or_else(|| InspectError::MalformedBinFilename("空的bin描述符".to_string()))?;
        let version = BinVersion::from_byte(version_byte)?;

        if bytes.len() < version.header_len() {
            return Err(malformed_bin(
                "描述符长度不足",
                format!(
                    "版本{}需要至少{}字节，实际{}字节",
                    version.as_byte(),
                    version.header_len(),
                    bytes.len()
                ),
            ));
        }

        let mut reader = BeReader::new(&bytes[1..version.header_len()]);
        let bin_id = reader.u16()?;
        let channels = reader.u8()?;
        let sample_count = reader.i32()?;
        let (bytes_per_channel, bitrate_format) = match version {
            BinVersion::V1 => (LEGACY_BYTES_PER_CHANNEL, SampleRateCode::LEGACY_44K1),
            BinVersion::V2 => {
                let bpc = reader.u8()?;
                let code = SampleRateCode::from_code(reader.u8()?)?;
                (bpc, code)
            }
        };
        let content_hash = reader.u64()?;
        let data_offset = reader.u32()?;

        Ok(Self {
            version,
            bin_id,
            channels,
            sample_count,
            bytes_per_channel,
            bitrate_format,
            content_hash,
            data_offset,
            name: bytes[version.header_len()..].to_vec(),
        })
    }

    /// 编码为原始字节
    ///
    /// 版本1无法表达非默认的位深/采样率，此类记录被拒绝而不是静默丢失信息。
    pub fn encode_bytes(&self) -> InspectResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.version.header_len() + self.name.len());
        out.push(self.version.as_byte());
        out.extend_from_slice(&self.bin_id.to_be_bytes());
        out.push(self.channels);
        out.extend_from_slice(&self.sample_count.to_be_bytes());
        match self.version {
            BinVersion::V1 => {
                if self.bytes_per_channel != LEGACY_BYTES_PER_CHANNEL
                    || self.bitrate_format != SampleRateCode::LEGACY_44K1
                {
                    return Err(InspectError::InvalidInput(format!(
                        "版本1描述符只能表示16位/44100Hz (bin {})",
                        self.bin_id
                    )));
                }
            }
            BinVersion::V2 => {
                out.push(self.bytes_per_channel);
                out.push(self.bitrate_format.code());
            }
        }
        out.extend_from_slice(&self.content_hash.to_be_bytes());
        out.extend_from_slice(&self.data_offset.to_be_bytes());
        out.extend_from_slice(&self.name);
        Ok(out)
    }

    /// 编码为小写十六进制文件名主干
    pub fn encode_hex(&self) -> InspectResult<String> {
        Ok(hex_encode(&self.encode_bytes()?))
    }

    /// 完整文件名（`<hex>.wav`）
    pub fn file_name(&self) -> InspectResult<String> {
        Ok(format!("{}.{BIN_EXTENSION}", self.encode_hex()?))
    }

    /// 从文件路径解析
    ///
    /// 扩展名不是 `.wav`（大小写不敏感）时返回 `None`，该条目不是bin。
    pub fn from_path(path: &Path) -> Option<InspectResult<Self>> {
        let file_name = path.file_name()?.to_str()?;
        Self::from_file_name(file_name)
    }

    /// 从文件名解析，规则同 [`from_path`](Self::from_path)
    pub fn from_file_name(file_name: &str) -> Option<InspectResult<Self>> {
        let stem = strip_bin_extension(file_name)?;
        Some(Self::decode_hex(stem))
    }
}

/// 去掉大小写不敏感的 `.wav` 扩展名
fn strip_bin_extension(file_name: &str) -> Option<&str> {
    let split = file_name.len().checked_sub(BIN_EXTENSION.len() + 1)?;
    if !file_name.is_char_boundary(split) {
        return None;
    }
    let (stem, ext) = file_name.split_at(split);
    let ext = ext.strip_prefix('.')?;
    ext.eq_ignore_ascii_case(BIN_EXTENSION).then_some(stem)
}

/// 顺序大端读取器
struct BeReader<'a> {
    bytes: &'a [u8],
}

impl<'a> BeReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    fn take<const N: usize>(&mut self) -> InspectResult<[u8; N]> {
        let (head, rest) = self
            .bytes
            .split_first_chunk::<N>()
            .ok_or_else(|| InspectError::MalformedBinFilename("描述符提前结束".to_string()))?;
        self.bytes = rest;
        Ok(*head)
    }

    fn u8(&mut self) -> InspectResult<u8> {
        Ok(self.take::<1>()?[0])
    }

    fn u16(&mut self) -> InspectResult<u16> {
        self.take().map(u16::from_be_bytes)
    }

    fn i32(&mut self) -> InspectResult<i32> {
        self.take().map(i32::from_be_bytes)
    }

    fn u32(&mut self) -> InspectResult<u32> {
        self.take().map(u32::from_be_bytes)
    }

    fn u64(&mut self) -> InspectResult<u64> {
        self.take().map(u64::from_be_bytes)
    }
}

/// 十六进制解码（大小写不敏感）
pub fn hex_decode(text: &str) -> InspectResult<Vec<u8>> {
    let digits = text.as_bytes();
    if digits.is_empty() {
        return Err(InspectError::MalformedBinFilename("空的文件名主干".to_string()));
    }
    if digits.len() % 2 != 0 {
        return Err(malformed_bin("十六进制长度为奇数", text));
    }

    digits
        .chunks_exact(2)
        .map(|pair| match (hex_value(pair[0]), hex_value(pair[1])) {
            (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
            _ => Err(malformed_bin(
                "非十六进制字符",
                String::from_utf8_lossy(pair),
            )),
        })
        .collect()
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// 小写十六进制编码
pub fn hex_encode(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(DIGITS[usize::from(b >> 4)]));
        out.push(char::from(DIGITS[usize::from(b & 0x0f)]));
    }
    out
}
