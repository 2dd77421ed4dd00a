//! 轨道/区域/控制点模型
//!
//! 从 [`FieldSource`] 组装，应用参数曲线得到派生值，并为旧版本归档缺失的字段填充默认值。
//! 本模块不做任何 I/O。

use super::effects::{CompressorSettings, EqSettings};
use super::fields::FieldSource;
use crate::core::{Knob, curves};
use serde::Serialize;

mod keys {
    // 控制点
    pub const VOLUME: &str = "vol2";
    pub const PAN: &str = "pan2";
    pub const SEND_A: &str = "send2a";
    pub const SEND_B: &str = "send2b";

    // 区域
    pub const BIN_ID: &str = "binID";
    pub const NAME: &str = "name";
    pub const REAL_START: &str = "realStart";
    pub const REAL_LENGTH: &str = "realLength";
    pub const BIN_START: &str = "binStart";
    pub const REGION_VOLUME: &str = "volume";
    pub const FADE_A: &str = "fadeA";
    pub const FADE_B: &str = "fadeB";
    pub const FADE_A0: &str = "fadeA0";
    pub const FADE_A1: &str = "fadeA1";
    pub const FADE_B0: &str = "fadeB0";
    pub const FADE_B1: &str = "fadeB1";
    pub const MUTED: &str = "muted";

    // 虚拟轨道
    pub const REGIONS: &str = "regions";
    pub const NUM_REGIONS: &str = "numRegions";

    // 轨道
    pub const FRIENDLY_NAME: &str = "friendlyName";
    pub const TRACK_NUM: &str = "trackNum";
    pub const ORDER_NUM: &str = "orderNum";
    pub const NUM_CHANNELS: &str = "numChannels";
    pub const SOLOED: &str = "soloed";
    pub const VIRTUAL_TRACK: &str = "virtualTrack";
    pub const CONTROL_VALUES: &str = "controlValues";
    pub const HUE: &str = "trackHue";
    pub const SATURATION: &str = "trackSat";
    pub const BRIGHTNESS: &str = "trackBrt";
    pub const COMPRESSOR: &str = "compressorSet";
    pub const EQ: &str = "parametricSet";
}

/// 旧版本归档缺失字段的默认值
pub mod defaults {
    /// 区域淡入/淡出长度（样本）
    pub const FADE_SAMPLES: i64 = 128;
    /// 淡变曲线控制柄
    pub const FADE_HANDLE_0: f64 = 1.0 / 3.0;
    pub const FADE_HANDLE_1: f64 = 2.0 / 3.0;
    pub const TRACK_HUE: f64 = 0.0;
    pub const TRACK_SATURATION: f64 = 0.35;
    pub const TRACK_BRIGHTNESS: f64 = 0.8;
}

/// 轨道混音控制点
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlPoint {
    /// 推子位置 [0,1]
    pub volume: f64,
    /// 声像 [-1,1]
    pub pan: f64,
    pub send_a: f64,
    pub send_b: f64,
    /// 派生音量 [-45,12] dB
    pub volume_db: f64,
}

impl ControlPoint {
    pub fn from_knobs(volume: Knob, pan: Knob, send_a: Knob, send_b: Knob) -> Self {
        let volume = volume.to_unit();
        Self {
            volume,
            pan: pan.to_unit(),
            send_a: send_a.to_unit(),
            send_b: send_b.to_unit(),
            volume_db: curves::mm_to_db(volume),
        }
    }

    pub fn from_fields(src: &dyn FieldSource) -> Self {
        Self::from_knobs(
            src.knob(keys::VOLUME),
            src.knob(keys::PAN),
            src.knob(keys::SEND_A),
            src.knob(keys::SEND_B),
        )
    }

    /// 推子对应的线性幅度
    pub fn volume_amplitude(&self) -> f64 {
        curves::scalar_to_amplitude(self.volume)
    }
}

impl Default for ControlPoint {
    /// 0dB、居中、无发送
    fn default() -> Self {
        Self::from_knobs(
            Knob::from_unit(curves::db_to_mm(0.0)),
            Knob(0),
            Knob(0),
            Knob(0),
        )
    }
}

/// 时间线上的一个音频片段
///
/// `bin_id` 只是对 bin 描述符的引用，两者在报告阶段才关联。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub bin_id: i64,
    pub name: String,
    /// 时间线上的绝对起点（样本）
    pub real_start: i64,
    pub real_length: i64,
    /// 在 bin 内的偏移（样本）
    pub bin_start: i64,
    /// 推子位置 [0,1]，缺省为 0dB
    pub volume: f64,
    /// 相对起点的淡入长度，即 realStart + fadeA
    pub fade_a: i64,
    /// 相对终点的淡出长度，即 (realStart + realLength) - fadeB
    pub fade_b: i64,
    pub fade_a0: f64,
    pub fade_a1: f64,
    pub fade_b0: f64,
    pub fade_b1: f64,
    pub muted: bool,
}

impl Region {
    pub fn from_fields(src: &dyn FieldSource) -> Self {
        Self {
            bin_id: src.int_or(keys::BIN_ID, 0),
            name: src.string_or_default(keys::NAME),
            real_start: src.int_or(keys::REAL_START, 0),
            real_length: src.int_or(keys::REAL_LENGTH, 0),
            bin_start: src.int_or(keys::BIN_START, 0),
            volume: src.float_or(keys::REGION_VOLUME, curves::db_to_mm(0.0)),
            fade_a: src.int_or(keys::FADE_A, defaults::FADE_SAMPLES),
            fade_b: src.int_or(keys::FADE_B, defaults::FADE_SAMPLES),
            fade_a0: src.float_or(keys::FADE_A0, defaults::FADE_HANDLE_0),
            fade_a1: src.float_or(keys::FADE_A1, defaults::FADE_HANDLE_1),
            fade_b0: src.float_or(keys::FADE_B0, defaults::FADE_HANDLE_0),
            fade_b1: src.float_or(keys::FADE_B1, defaults::FADE_HANDLE_1),
            muted: src.bool_or(keys::MUTED, false),
        }
    }

    pub fn volume_db(&self) -> f64 {
        curves::mm_to_db(self.volume)
    }

    /// 时间线上的终点（不含）
    pub fn real_end(&self) -> i64 {
        self.real_start.saturating_add(self.real_length)
    }

    /// 引用的 bin ID；超出 u16 范围的引用无法对应任何 bin
    pub fn bin_ref(&self) -> Option<u16> {
        u16::try_from(self.bin_id).ok()
    }
}

/// 一条轨道
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub friendly_name: String,
    pub track_num: i64,
    /// 显示排序键
    pub order_num: i64,
    pub num_channels: i64,
    pub muted: bool,
    pub soloed: bool,
    /// 时间线顺序
    pub regions: Vec<Region>,
    pub control: ControlPoint,
    pub compressor: CompressorSettings,
    pub eq: EqSettings,
    pub hue: f64,
    pub saturation: f64,
    pub brightness: f64,
}

impl Track {
    pub fn from_fields(src: &dyn FieldSource) -> Self {
        let regions = src
            .object(keys::VIRTUAL_TRACK)
            .map(|vt| decode_regions(vt.as_ref()))
            .unwrap_or_default();

        Self {
            friendly_name: src.string_or_default(keys::FRIENDLY_NAME),
            track_num: src.int_or(keys::TRACK_NUM, 0),
            order_num: src.int_or(keys::ORDER_NUM, 0),
            num_channels: src.int_or(keys::NUM_CHANNELS, 0),
            muted: src.bool_or(keys::MUTED, false),
            soloed: src.bool_or(keys::SOLOED, false),
            regions,
            control: src
                .object(keys::CONTROL_VALUES)
                .map(|cv| ControlPoint::from_fields(cv.as_ref()))
                .unwrap_or_default(),
            compressor: src
                .object(keys::COMPRESSOR)
                .map(|c| CompressorSettings::from_fields(c.as_ref()))
                .unwrap_or_default(),
            eq: src
                .object(keys::EQ)
                .map(|e| EqSettings::from_fields(e.as_ref()))
                .unwrap_or_default(),
            hue: src.float_or(keys::HUE, defaults::TRACK_HUE),
            saturation: src.float_or(keys::SATURATION, defaults::TRACK_SATURATION),
            brightness: src.float_or(keys::BRIGHTNESS, defaults::TRACK_BRIGHTNESS),
        }
    }
}

/// 解码虚拟轨道的区域列表
///
/// 支持两种表示：`regions` 数组，或键控归档的 `numRegions` + `region <i>`。
fn decode_regions(vt: &dyn FieldSource) -> Vec<Region> {
    if let Some(items) = vt.objects(keys::REGIONS) {
        return items
            .iter()
            .map(|item| Region::from_fields(item.as_ref()))
            .collect();
    }

    let count = vt.int_or(keys::NUM_REGIONS, 0).max(0);
    (0..count)
        .filter_map(|i| {
            let region = vt.object(&format!("region {i}"));
            if region.is_none() {
                log::warn!("虚拟轨道缺少 region {i}（numRegions = {count}）");
            }
            region.map(|r| Region::from_fields(r.as_ref()))
        })
        .collect()
}

/// 按 `order_num` 升序排列（稳定排序，相同键保持存储顺序）
pub fn sort_for_display(tracks: &mut [Track]) {
    tracks.sort_by_key(|t| t.order_num);
}
