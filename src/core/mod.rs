//! 核心算法模块
//!
//! 参数曲线引擎：量化旋钮整数与工程单位（dB、毫秒、赫兹、Q值）之间的纯数值变换。

pub mod curves;
pub mod knob;

// 重新导出公共接口
pub use curves::{
    attack_coefficient, attack_ms, compressor_ratio, compressor_threshold_db, db_to_mm,
    eq_int_db_to_db, eq_int_q_to_q, eq_parametric_high_freq, eq_parametric_low_freq,
    float_to_int_vol, int_vol_to_float, linear_interp, log20k, mm_to_db, quadratic_interp,
    release_coefficient, release_ms, scalar_to_amplitude,
};
pub use knob::Knob;
