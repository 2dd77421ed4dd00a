//! 工程目录加载
//!
//! 定位 `Tracks2.plist`（旧版本为 `Tracks.plist`）与 `project.plist`，
//! 经 [`KeyedArchive`] 暴露为 [`FieldSource`] 后交给模型层组装。

use super::fields::FieldSource;
use super::keyed_archive::{KeyedArchive, PlistObject};
use super::model::{Track, sort_for_display};
use super::settings::ProjectSettings;
use crate::error::{InspectError, InspectResult};
use crate::tools::constants::project as names;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 已加载的工程
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub path: PathBuf,
    /// 实际读取的轨道文件
    pub tracks_file: PathBuf,
    pub settings: ProjectSettings,
    /// 已按显示顺序排列
    pub tracks: Vec<Track>,
}

impl Project {
    /// bin 目录
    pub fn bins_dir(&self) -> PathBuf {
        bins_dir(&self.path)
    }

    pub fn region_count(&self) -> usize {
        self.tracks.iter().map(|t| t.regions.len()).sum()
    }
}

/// 工程中的 bin 目录（`<song>/Bins`）
pub fn bins_dir(song_path: &Path) -> PathBuf {
    song_path.join(names::BINS_DIR)
}

/// 定位轨道文件：优先 `Tracks2.plist`，其次 `Tracks.plist`
pub fn locate_tracks_file(song_path: &Path) -> InspectResult<PathBuf> {
    [names::TRACKS_FILE, names::LEGACY_TRACKS_FILE]
        .iter()
        .map(|name| song_path.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| InspectError::MissingProjectFile(song_path.join(names::TRACKS_FILE)))
}

/// 定位 `project.plist`
pub fn locate_settings_file(song_path: &Path) -> InspectResult<PathBuf> {
    let settings = song_path.join(names::SETTINGS_FILE);
    if settings.is_file() {
        Ok(settings)
    } else {
        Err(InspectError::MissingProjectFile(settings))
    }
}

/// 由已解码的字段源组装工程（不做I/O）
pub fn assemble_project<S, T>(settings: &S, tracks: &[T]) -> InspectResult<(ProjectSettings, Vec<Track>)>
where
    S: FieldSource + ?Sized,
    T: FieldSource,
{
    let settings = ProjectSettings::from_fields(&settings)?;
    let mut tracks: Vec<Track> = tracks.iter().map(|t| Track::from_fields(t)).collect();
    sort_for_display(&mut tracks);
    Ok((settings, tracks))
}

/// 加载一个 `.mtdaw` 工程目录
pub fn load_project(song_path: &Path) -> InspectResult<Project> {
    if !song_path.is_dir() {
        return Err(InspectError::InvalidInput(format!(
            "不是工程目录 / bad input project: {}",
            song_path.display()
        )));
    }

    let tracks_file = locate_tracks_file(song_path)?;
    let settings_file = locate_settings_file(song_path)?;
    log::debug!(
        "加载工程 {}: tracks={}, settings={}",
        song_path.display(),
        tracks_file.display(),
        settings_file.display()
    );

    let archive = KeyedArchive::open(&tracks_file)?;
    let track_objects = archive.root_array()?;

    let settings_value = plist::Value::from_file(&settings_file)?;
    let settings_dict = settings_value.as_dictionary().ok_or_else(|| {
        InspectError::ArchiveError(format!(
            "project.plist 顶层不是字典: {}",
            settings_file.display()
        ))
    })?;

    let (settings, tracks) = assemble_project(&PlistObject::plain(settings_dict), &track_objects)?;
    log::debug!(
        "工程版本 {}，{} 条轨道",
        settings.project_version,
        tracks.len()
    );

    Ok(Project {
        path: song_path.to_path_buf(),
        tracks_file,
        settings,
        tracks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::fields::{FieldMap, FieldValue};

    fn settings() -> FieldMap {
        FieldMap::new()
            .with("projectVersion", FieldValue::Int(4))
            .with("inputVolumeDB", FieldValue::Float(0.0))
            .with("outputVolumeDB", FieldValue::Float(-1.5))
            .with("tempo", FieldValue::Float(100.0))
    }

    #[test]
    fn test_assemble_sorts_tracks() {
        let tracks = vec![
            FieldMap::new()
                .with("friendlyName", FieldValue::String("B".into()))
                .with("orderNum", FieldValue::Int(2)),
            FieldMap::new()
                .with("friendlyName", FieldValue::String("A".into()))
                .with("orderNum", FieldValue::Int(1)),
        ];
        let (settings, tracks) = assemble_project(&settings(), &tracks).unwrap();
        assert_eq!(settings.tempo, 100.0);
        let names: Vec<_> = tracks.iter().map(|t| t.friendly_name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn test_missing_directory_is_invalid_input() {
        let result = load_project(Path::new("/nonexistent/song.mtdaw"));
        assert!(matches!(result, Err(InspectError::InvalidInput(_))));
    }
}
