//! 量化旋钮类型

use super::curves::{float_to_int_vol, int_vol_to_float};
use serde::{Deserialize, Serialize};

/// 12位定点旋钮值，约定范围 [0,4096] ↔ [0.0,1.0]
///
/// 声像和 EQ 增益旋钮是居中的，可以为负。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Knob(pub i32);

impl Knob {
    /// 满刻度旋钮（1.0）
    pub const FULL: Knob = Knob(0x1000);

    /// 从归一化值构造（向下取整）
    #[inline]
    pub fn from_unit(value: f64) -> Self {
        Knob(float_to_int_vol(value))
    }

    /// 归一化值
    #[inline]
    pub fn to_unit(self) -> f64 {
        int_vol_to_float(self.0)
    }

    /// 原始整数
    #[inline]
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl From<i32> for Knob {
    fn from(raw: i32) -> Self {
        Knob(raw)
    }
}
