//! 工程级设置（project.plist）

use super::fields::FieldSource;
use crate::error::{InspectError, InspectResult};
use crate::tools::constants::project;
use serde::Serialize;

mod keys {
    pub const PROJECT_VERSION: &str = "projectVersion";
    pub const INPUT_VOLUME_DB: &str = "inputVolumeDB";
    pub const OUTPUT_VOLUME_DB: &str = "outputVolumeDB";
    pub const TEMPO: &str = "tempo";
    pub const METRONOME_VOLUME: &str = "metronomeVolume";
    pub const SAMPLE_RATE: &str = "sampleRate";
    pub const BIT_DEPTH: &str = "bitDepth";
    pub const TIME_SIGNATURE: &str = "timeSignature";
    pub const TIME_SIGNATURE_2: &str = "timeSignature2";
}

/// 拍号表（下标即存储值）
const SIGNATURES: [(u8, u8); 11] = [
    (2, 2),
    (2, 4),
    (3, 4),
    (4, 4),
    (5, 4),
    (7, 4),
    (6, 8),
    (7, 8),
    (9, 8),
    (11, 8),
    (12, 8),
];

/// 未记录拍号时的下标（4/4）
pub const DEFAULT_TIME_SIGNATURE_INDEX: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignature {
    pub fn from_index(index: i64) -> Option<Self> {
        let (numerator, denominator) = *SIGNATURES.get(usize::try_from(index).ok()?)?;
        Some(Self {
            numerator,
            denominator,
        })
    }
}

impl std::fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// 工程设置
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSettings {
    pub project_version: i64,
    pub input_volume_db: f64,
    pub output_volume_db: f64,
    pub tempo: f64,
    pub metronome_volume: Option<f64>,
    pub sample_rate: Option<f64>,
    pub bit_depth: Option<i64>,
    /// `timeSignature2` 优先，其次 `timeSignature`
    pub time_signature_index: i64,
}

impl ProjectSettings {
    /// 读取必需字段并检查版本
    pub fn from_fields(src: &dyn FieldSource) -> InspectResult<Self> {
        let project_version = src
            .int(keys::PROJECT_VERSION)
            .ok_or_else(|| missing_key(keys::PROJECT_VERSION))?;
        if project_version < project::MIN_PROJECT_VERSION {
            return Err(InspectError::IncompatibleProjectVersion {
                found: project_version,
                minimum: project::MIN_PROJECT_VERSION,
            });
        }

        let required_float = |key: &str| src.float(key).ok_or_else(|| missing_key(key));

        let time_signature_index = src
            .int(keys::TIME_SIGNATURE_2)
            .or_else(|| src.int(keys::TIME_SIGNATURE))
            .unwrap_or(DEFAULT_TIME_SIGNATURE_INDEX);

        Ok(Self {
            project_version,
            input_volume_db: required_float(keys::INPUT_VOLUME_DB)?,
            output_volume_db: required_float(keys::OUTPUT_VOLUME_DB)?,
            tempo: required_float(keys::TEMPO)?,
            metronome_volume: src.float(keys::METRONOME_VOLUME),
            sample_rate: src.float(keys::SAMPLE_RATE),
            bit_depth: src.int(keys::BIT_DEPTH),
            time_signature_index,
        })
    }

    /// 未知下标返回 `None`
    pub fn time_signature(&self) -> Option<TimeSignature> {
        TimeSignature::from_index(self.time_signature_index)
    }

    /// 压缩器系数使用的采样率，工程未记录时取 44100Hz
    pub fn effective_sample_rate(&self) -> f64 {
        self.sample_rate
            .filter(|rate| *rate > 0.0)
            .unwrap_or(project::DEFAULT_SAMPLE_RATE)
    }
}

fn missing_key(key: &str) -> InspectError {
    InspectError::ArchiveError(format!("project.plist 缺少键 / missing key: {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::fields::{FieldMap, FieldValue};

    fn base() -> FieldMap {
        FieldMap::new()
            .with("projectVersion", FieldValue::Int(3))
            .with("inputVolumeDB", FieldValue::Float(-3.0))
            .with("outputVolumeDB", FieldValue::Int(0))
            .with("tempo", FieldValue::Float(120.0))
    }

    #[test]
    fn test_time_signature_table() {
        assert_eq!(TimeSignature::from_index(3).unwrap().to_string(), "4/4");
        assert_eq!(TimeSignature::from_index(6).unwrap().to_string(), "6/8");
        assert_eq!(TimeSignature::from_index(10).unwrap().to_string(), "12/8");
        assert_eq!(TimeSignature::from_index(11), None);
        assert_eq!(TimeSignature::from_index(-1), None);
    }

    #[test]
    fn test_signature_fallback_order() {
        let settings = ProjectSettings::from_fields(&base()).unwrap();
        assert_eq!(settings.time_signature_index, DEFAULT_TIME_SIGNATURE_INDEX);

        let legacy = base().with("timeSignature", FieldValue::Int(2));
        assert_eq!(
            ProjectSettings::from_fields(&legacy).unwrap().time_signature_index,
            2
        );

        let both = legacy.with("timeSignature2", FieldValue::Int(7));
        let settings = ProjectSettings::from_fields(&both).unwrap();
        assert_eq!(settings.time_signature().unwrap().to_string(), "7/8");
    }

    #[test]
    fn test_optional_fields() {
        let settings = ProjectSettings::from_fields(&base()).unwrap();
        assert_eq!(settings.metronome_volume, None);
        assert_eq!(settings.output_volume_db, 0.0);
        assert_eq!(settings.effective_sample_rate(), 44100.0);

        let with_rate = base().with("sampleRate", FieldValue::Int(48000));
        let settings = ProjectSettings::from_fields(&with_rate).unwrap();
        assert_eq!(settings.effective_sample_rate(), 48000.0);
    }

    #[test]
    fn test_version_and_required_keys() {
        let old = base().with("projectVersion", FieldValue::Int(0));
        assert!(matches!(
            ProjectSettings::from_fields(&old),
            Err(InspectError::IncompatibleProjectVersion { found: 0, .. })
        ));

        let no_tempo = FieldMap::new()
            .with("projectVersion", FieldValue::Int(3))
            .with("inputVolumeDB", FieldValue::Float(0.0))
            .with("outputVolumeDB", FieldValue::Float(0.0));
        assert!(matches!(
            ProjectSettings::from_fields(&no_tempo),
            Err(InspectError::ArchiveError(_))
        ));
    }
}
