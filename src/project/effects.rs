//! 轨道效果器设置：压缩器与四段 EQ
//!
//! 只保存旋钮原始值，派生的工程单位通过方法按需计算；
//! attack/release 系数依赖运行时采样率，每次调用都重新计算。

use super::fields::FieldSource;
use crate::core::{Knob, curves};
use serde::Serialize;

mod keys {
    pub const POWER: &str = "power";

    pub const THRESH: &str = "thresh";
    pub const RATIO: &str = "ratio";
    pub const ATTACK: &str = "attack";
    pub const RELEASE: &str = "release";

    pub const SHELF_HIGH_AMP: &str = "sHA";
    pub const SHELF_HIGH_FREQ: &str = "sHF";
    pub const SHELF_LOW_AMP: &str = "sLA";
    pub const SHELF_LOW_FREQ: &str = "sLF";
    pub const PARAM_LOW_Q: &str = "pLQ";
    pub const PARAM_LOW_FREQ: &str = "pLF";
    pub const PARAM_LOW_AMP: &str = "pLA";
    pub const PARAM_HIGH_Q: &str = "pHQ";
    pub const PARAM_HIGH_FREQ: &str = "pHF";
    pub const PARAM_HIGH_AMP: &str = "pHA";
}

/// 压缩器设置
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompressorSettings {
    pub power: bool,
    pub thresh: Knob,
    pub ratio: Knob,
    pub attack: Knob,
    pub release: Knob,
}

impl Default for CompressorSettings {
    /// 新建轨道的出厂设置
    fn default() -> Self {
        Self {
            power: false,
            thresh: Knob::from_unit(1.0),
            ratio: Knob::from_unit(0.5),
            attack: Knob::from_unit(0.1),
            release: Knob::from_unit(0.2),
        }
    }
}

impl CompressorSettings {
    /// `power` 是后加的字段，按存在性读取；其余旋钮缺失时为0
    pub fn from_fields(src: &dyn FieldSource) -> Self {
        Self {
            power: src.bool_or(keys::POWER, false),
            thresh: src.knob(keys::THRESH),
            ratio: src.knob(keys::RATIO),
            attack: src.knob(keys::ATTACK),
            release: src.knob(keys::RELEASE),
        }
    }

    /// 阈值 [-45,0] dB
    pub fn threshold_db(&self) -> f64 {
        curves::compressor_threshold_db(self.thresh.to_unit())
    }

    /// 比率标量 [0.01,1]
    pub fn ratio_scalar(&self) -> f64 {
        curves::compressor_ratio(self.ratio.to_unit())
    }

    /// 显示用比率（"N:1" 中的 N）
    pub fn ratio_display(&self) -> f64 {
        1.0 / self.ratio_scalar()
    }

    pub fn attack_ms(&self) -> f64 {
        curves::attack_ms(self.attack.to_unit())
    }

    pub fn release_ms(&self) -> f64 {
        curves::release_ms(self.release.to_unit())
    }

    pub fn attack_coefficient(&self, sample_rate: f64) -> f64 {
        curves::attack_coefficient(sample_rate, self.attack.to_unit())
    }

    pub fn release_coefficient(&self, sample_rate: f64) -> f64 {
        curves::release_coefficient(sample_rate, self.release.to_unit())
    }
}

/// 参量 EQ 设置：高/低搁架 + 高/低参量频段
///
/// 增益旋钮是居中的有符号值，0 为 0dB。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EqSettings {
    pub power: bool,
    pub shelf_high_amp: Knob,
    pub shelf_high_freq: Knob,
    pub shelf_low_amp: Knob,
    pub shelf_low_freq: Knob,
    pub param_low_q: Knob,
    pub param_low_freq: Knob,
    pub param_low_amp: Knob,
    pub param_high_q: Knob,
    pub param_high_freq: Knob,
    pub param_high_amp: Knob,
}

impl EqSettings {
    pub fn from_fields(src: &dyn FieldSource) -> Self {
        Self {
            power: src.bool_or(keys::POWER, false),
            shelf_high_amp: src.knob(keys::SHELF_HIGH_AMP),
            shelf_high_freq: src.knob(keys::SHELF_HIGH_FREQ),
            shelf_low_amp: src.knob(keys::SHELF_LOW_AMP),
            shelf_low_freq: src.knob(keys::SHELF_LOW_FREQ),
            param_low_q: src.knob(keys::PARAM_LOW_Q),
            param_low_freq: src.knob(keys::PARAM_LOW_FREQ),
            param_low_amp: src.knob(keys::PARAM_LOW_AMP),
            param_high_q: src.knob(keys::PARAM_HIGH_Q),
            param_high_freq: src.knob(keys::PARAM_HIGH_FREQ),
            param_high_amp: src.knob(keys::PARAM_HIGH_AMP),
        }
    }

    pub fn shelf_high_gain_db(&self) -> f64 {
        curves::eq_int_db_to_db(self.shelf_high_amp.raw())
    }

    pub fn shelf_low_gain_db(&self) -> f64 {
        curves::eq_int_db_to_db(self.shelf_low_amp.raw())
    }

    pub fn param_low_gain_db(&self) -> f64 {
        curves::eq_int_db_to_db(self.param_low_amp.raw())
    }

    pub fn param_high_gain_db(&self) -> f64 {
        curves::eq_int_db_to_db(self.param_high_amp.raw())
    }

    pub fn param_low_q_value(&self) -> f64 {
        curves::eq_int_q_to_q(self.param_low_q.raw())
    }

    pub fn param_high_q_value(&self) -> f64 {
        curves::eq_int_q_to_q(self.param_high_q.raw())
    }

    /// 低参量频率（Hz）
    pub fn param_low_freq_hz(&self) -> f64 {
        curves::eq_parametric_low_freq(self.param_low_freq.to_unit())
    }

    /// 高参量频率（Hz）
    pub fn param_high_freq_hz(&self) -> f64 {
        curves::eq_parametric_high_freq(self.param_high_freq.to_unit())
    }
}
