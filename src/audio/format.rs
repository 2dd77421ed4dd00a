//! bin格式信息模块
//!
//! 定义bin描述符的版本号与采样率编码表。

use crate::error::{InspectError, InspectResult};
use serde::Serialize;

/// 采样率编码表（bitrateFormat → Hz），编码即下标
const SAMPLE_RATES: [u32; 9] = [0, 11025, 12000, 22050, 24000, 44100, 48000, 88200, 96000];

/// bin描述符版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinVersion {
    /// 版本1：固定 16位 / 44100Hz
    V1,
    /// 版本2：显式 bytesPerChannel 与 bitrateFormat
    V2,
}

impl BinVersion {
    /// 从首字节解析版本，未知版本不可重试，必须上报
    pub fn from_byte(byte: u8) -> InspectResult<Self> {
        match byte {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(InspectError::UnsupportedFormatVersion(other)),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    /// 定长头部字节数（含版本字节，不含名称）
    pub fn header_len(self) -> usize {
        match self {
            Self::V1 => 20,
            Self::V2 => 22,
        }
    }
}

/// 采样率编码（bitrateFormat）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub struct SampleRateCode(u8);

impl SampleRateCode {
    /// 版本1隐含的编码（44100Hz）
    pub const LEGACY_44K1: SampleRateCode = SampleRateCode(5);

    /// 校验并构造编码
    pub fn from_code(code: u8) -> InspectResult<Self> {
        if usize::from(code) < SAMPLE_RATES.len() {
            Ok(Self(code))
        } else {
            Err(InspectError::UnknownBitrateFormat(code))
        }
    }

    /// 查找对应的采样率（Hz）
    pub fn from_hz(hz: u32) -> Option<Self> {
        SAMPLE_RATES
            .iter()
            .position(|&rate| rate == hz)
            .map(|idx| Self(idx as u8))
    }

    #[inline]
    pub fn code(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn hz(self) -> u32 {
        SAMPLE_RATES[usize::from(self.0)]
    }
}

impl From<SampleRateCode> for u8 {
    fn from(code: SampleRateCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_table() {
        let expected = [
            (0, 0),
            (1, 11025),
            (2, 12000),
            (3, 22050),
            (4, 24000),
            (5, 44100),
            (6, 48000),
            (7, 88200),
            (8, 96000),
        ];
        for (code, hz) in expected {
            assert_eq!(SampleRateCode::from_code(code).unwrap().hz(), hz);
        }
        assert!(matches!(
            SampleRateCode::from_code(9),
            Err(InspectError::UnknownBitrateFormat(9))
        ));
        assert_eq!(SampleRateCode::from_hz(48000).map(SampleRateCode::code), Some(6));
        assert_eq!(SampleRateCode::from_hz(32000), None);
    }

    #[test]
    fn test_version_bytes() {
        assert_eq!(BinVersion::from_byte(1).unwrap().header_len(), 20);
        assert_eq!(BinVersion::from_byte(2).unwrap().header_len(), 22);
        assert!(matches!(
            BinVersion::from_byte(0),
            Err(InspectError::UnsupportedFormatVersion(0))
        ));
    }
}
