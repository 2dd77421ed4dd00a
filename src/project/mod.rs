//! 工程模型模块
//!
//! 轨道、区域、控制点、效果器与工程设置，以及把 plist 归档暴露为字段源的读取器。

pub mod effects;
pub mod fields;
pub mod keyed_archive;
pub mod loader;
pub mod model;
pub mod settings;

pub use effects::{CompressorSettings, EqSettings};
pub use fields::{FieldMap, FieldSource, FieldValue};
pub use keyed_archive::{KeyedArchive, PlistObject};
pub use loader::{Project, assemble_project, bins_dir, load_project};
pub use model::{ControlPoint, Region, Track, sort_for_display};
pub use settings::{ProjectSettings, TimeSignature};
