//! 参数曲线引擎
//!
//! 将12位定点旋钮值映射为音频引擎实际使用的数值域：音量推子（dB）、
//! 压缩器包络系数、EQ 搁架/参量频段设置。
//!
//! ## 兼容性约束
//! - 所有函数无状态、确定性，相同输入必须得到逐位相同的浮点输出，
//!   以保证已有工程显示值不变
//! - 输入超出 [0,1] 时按公式外推，不做截断（调用方负责只传入归一化值）

/// 12位定点满刻度（0dB 对应 0x1000）
///
/// 工程格式生命周期内固定不变，不可配置。
pub const KNOB_SCALE: f64 = 4096.0;

/// 音量推子下限（dB）
pub const FADER_MIN_DB: f64 = -45.0;

/// 音量推子上限（dB）
pub const FADER_MAX_DB: f64 = 12.0;

/// log10(20000)，与旧引擎使用的字面常量保持一致
const LOG10_20K: f64 = 4.301029995663981;

/// EQ 频率上限（Hz）
const EQ_CEILING_HZ: f64 = 20000.0;

/// EQ 增益满刻度（dB）
const EQ_GAIN_RANGE_DB: f64 = 18.0;

/// 压缩器 attack 曲线控制点（毫秒）
const ATTACK_MS_CURVE: (f64, f64, f64) = (0.1, 10.0, 400.0);

/// 压缩器 release 曲线控制点（毫秒）
const RELEASE_MS_CURVE: (f64, f64, f64) = (1.0, 100.0, 2000.0);

/// 线性插值，`t` 为 [0,1] 标量
#[inline]
pub fn linear_interp(p0: f64, p1: f64, t: f64) -> f64 {
    (1.0 - t) * p0 + t * p1
}

/// 单段二次贝塞尔插值
///
/// 用于需要非线性"甜区"的映射（attack/release、Q值、低频参量频率）。
#[inline]
pub fn quadratic_interp(p0: f64, p1: f64, p2: f64, t: f64) -> f64 {
    (1.0 - t) * (1.0 - t) * p0 + 2.0 * t * (1.0 - t) * p1 + t * t * p2
}

/// 归一化浮点值 → 12位定点整数（向下取整）
#[inline]
pub fn float_to_int_vol(fvol: f64) -> i32 {
    (fvol * KNOB_SCALE).floor() as i32
}

/// 12位定点整数 → 归一化浮点值
#[inline]
pub fn int_vol_to_float(ivol: i32) -> f64 {
    f64::from(ivol) / KNOB_SCALE
}

/// 推子位置 [0,1] → dB [-45,12]
#[inline]
pub fn mm_to_db(mm: f64) -> f64 {
    linear_interp(FADER_MIN_DB, FADER_MAX_DB, mm)
}

/// dB [-45,12] → 推子位置 [0,1]
#[inline]
pub fn db_to_mm(db: f64) -> f64 {
    (db - FADER_MIN_DB) / (FADER_MAX_DB - FADER_MIN_DB)
}

/// 推子位置 → 线性幅度；位置 0 为完全静音
pub fn scalar_to_amplitude(scalar: f64) -> f64 {
    if scalar == 0.0 {
        return 0.0;
    }
    10f64.powf(0.05 * mm_to_db(scalar))
}

/// 以 20kHz 为上限把频率归一化到 [0,1]
#[inline]
pub fn log20k(hz: f64) -> f64 {
    hz.log10() / LOG10_20K
}

/// 单极点平滑系数：`exp(-1000 / (ms * sample_rate))`
#[inline]
fn one_pole_coefficient(ms: f64, sample_rate: f64) -> f64 {
    (-1000.0 / (ms * sample_rate)).exp()
}

/// attack 旋钮 → 毫秒
pub fn attack_ms(t: f64) -> f64 {
    let (lo, mid, hi) = ATTACK_MS_CURVE;
    quadratic_interp(lo, mid, hi, t)
}

/// release 旋钮 → 毫秒
pub fn release_ms(t: f64) -> f64 {
    let (lo, mid, hi) = RELEASE_MS_CURVE;
    quadratic_interp(lo, mid, hi, t)
}

/// attack 包络系数
///
/// 依赖运行时采样率，每次调用重新计算，不做缓存。
pub fn attack_coefficient(sample_rate: f64, t: f64) -> f64 {
    one_pole_coefficient(attack_ms(t), sample_rate)
}

/// release 包络系数（同样随采样率重新计算）
pub fn release_coefficient(sample_rate: f64, t: f64) -> f64 {
    one_pole_coefficient(release_ms(t), sample_rate)
}

/// 压缩器阈值 [-45,0] dB
#[inline]
pub fn compressor_threshold_db(t: f64) -> f64 {
    linear_interp(-45.0, 0.0, t)
}

/// 压缩器比率标量 [0.01,1]，显示值为其倒数（"N:1"）
#[inline]
pub fn compressor_ratio(t: f64) -> f64 {
    linear_interp(1.0 / 100.0, 1.0, t)
}

/// EQ 增益旋钮 → dB（居中由调用方负责，结果范围 ±18dB）
#[inline]
pub fn eq_int_db_to_db(intdb: i32) -> f64 {
    int_vol_to_float(intdb) * EQ_GAIN_RANGE_DB
}

/// EQ Q值旋钮 → Q
///
/// 旋钮增大时Q值减小（10 → 1），与旧引擎一致，保留该方向。
#[inline]
pub fn eq_int_q_to_q(intq: i32) -> f64 {
    quadratic_interp(10.0, 2.0, 1.0, int_vol_to_float(intq))
}

/// 低频参量频段：50Hz ~ 1500Hz，250Hz 为曲线控制点
pub fn eq_parametric_low_freq(t: f64) -> f64 {
    let curve = quadratic_interp(log20k(50.0), log20k(250.0), log20k(1500.0), t);
    EQ_CEILING_HZ.powf(curve)
}

/// 高频参量频段：450Hz ~ 20kHz，对数域线性
pub fn eq_parametric_high_freq(t: f64) -> f64 {
    let curve = linear_interp(log20k(450.0), 1.0, t);
    EQ_CEILING_HZ.powf(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "actual {actual} expected {expected} (tol {tol})"
        );
    }

    #[test]
    fn test_half_knob_is_minus_16_5_db() {
        let t = int_vol_to_float(2048);
        assert_eq!(t, 0.5);
        assert_eq!(mm_to_db(t), -16.5);
    }

    #[test]
    fn test_fader_endpoints() {
        assert_eq!(mm_to_db(0.0), -45.0);
        assert_eq!(mm_to_db(1.0), 12.0);
        assert_close(db_to_mm(0.0), 45.0 / 57.0, 1e-15);
        assert_close(mm_to_db(db_to_mm(-3.0)), -3.0, 1e-12);
    }

    #[test]
    fn test_knob_round_trip_within_one() {
        for i in 0..=4096 {
            let back = float_to_int_vol(int_vol_to_float(i));
            assert!((back - i).abs() <= 1, "knob {i} -> {back}");
        }
    }

    #[test]
    fn test_float_round_trip_tolerance() {
        for step in 0..=1000 {
            let x = step as f64 / 1000.0;
            let back = int_vol_to_float(float_to_int_vol(x));
            assert!((back - x).abs() <= 1.0 / KNOB_SCALE, "{x} -> {back}");
        }
    }

    #[test]
    fn test_mm_to_db_monotonic() {
        let mut prev = f64::NEG_INFINITY;
        for i in 0..=4096 {
            let db = mm_to_db(int_vol_to_float(i));
            assert!(db > prev);
            prev = db;
        }
    }

    #[test]
    fn test_eq_q_monotonic_decreasing() {
        let mut prev = f64::INFINITY;
        for i in 0..=4096 {
            let q = eq_int_q_to_q(i);
            assert!(q < prev, "Q must fall as knob rises (knob {i})");
            prev = q;
        }
        assert_eq!(eq_int_q_to_q(0), 10.0);
        assert_eq!(eq_int_q_to_q(4096), 1.0);
    }

    #[test]
    fn test_attack_coefficient_reference() {
        let ms = quadratic_interp(0.1, 10.0, 400.0, 0.1);
        assert_close(ms, 5.881, 1e-12);

        let coeff = attack_coefficient(44100.0, 0.1);
        let reference = 0.996_151_661_797_317_6;
        assert!(((coeff - reference) / reference).abs() < 1e-9);
    }

    #[test]
    fn test_release_coefficient_follows_sample_rate() {
        let at_48k = release_coefficient(48000.0, 0.2);
        assert!(((at_48k - 0.999_815_062_084_185_7) / at_48k).abs() < 1e-9);

        // 采样率越高，每样本衰减越慢
        assert!(release_coefficient(96000.0, 0.2) > at_48k);
    }

    #[test]
    fn test_eq_frequency_endpoints() {
        assert_close(eq_parametric_low_freq(0.0), 50.0, 1e-9);
        assert_close(eq_parametric_low_freq(1.0), 1500.0, 1e-9);
        assert_close(eq_parametric_low_freq(0.5), 261.658_784_848_026_4, 1e-9);
        assert_close(eq_parametric_high_freq(0.0), 450.0, 1e-9);
        assert_close(eq_parametric_high_freq(0.5), 3000.0, 1e-9);
        assert_close(eq_parametric_high_freq(1.0), 20000.0, 1e-9);
    }

    #[test]
    fn test_out_of_range_extrapolates() {
        assert_eq!(mm_to_db(2.0), 69.0);
        assert_eq!(linear_interp(0.0, 10.0, -1.0), -10.0);
    }

    #[test]
    fn test_scalar_to_amplitude() {
        assert_eq!(scalar_to_amplitude(0.0), 0.0);
        assert_close(scalar_to_amplitude(db_to_mm(0.0)), 1.0, 1e-12);
        assert_close(scalar_to_amplitude(1.0), 10f64.powf(0.6), 1e-12);
    }

    #[test]
    fn test_compressor_helpers() {
        assert_eq!(compressor_threshold_db(1.0), 0.0);
        assert_eq!(compressor_threshold_db(0.0), -45.0);
        assert_close(1.0 / compressor_ratio(0.0), 100.0, 1e-9);
        assert_eq!(compressor_ratio(1.0), 1.0);
    }

    #[test]
    fn test_eq_gain_scale() {
        assert_eq!(eq_int_db_to_db(4096), 18.0);
        assert_eq!(eq_int_db_to_db(-2048), -9.0);
        assert_eq!(eq_int_db_to_db(0), 0.0);
    }
}
