//! NSKeyedArchiver / plist 读取器
//!
//! 把 plist 文件暴露为 [`FieldSource`]，工程模型不依赖具体容器格式。
//!
//! 键控归档的结构：
//! - `$objects`：扁平对象表，下标 0 为 `"$null"`
//! - `$top.root`：根对象的 UID
//! - 对象之间通过 UID 引用（二进制 plist 的 UID 类型，或 XML 中的 `{"CF$UID": n}`）
//! - 数组对象的元素位于 `NS.objects`，字符串可能直接内联或包装在 `NS.string`

use super::fields::FieldSource;
use crate::error::{InspectError, InspectResult, archive_error};
use plist::{Dictionary, Value};
use std::path::Path;

const OBJECTS_KEY: &str = "$objects";
const TOP_KEY: &str = "$top";
const ROOT_KEY: &str = "root";
const NULL_MARKER: &str = "$null";
const CF_UID_KEY: &str = "CF$UID";
const NS_OBJECTS: &str = "NS.objects";
const NS_STRING: &str = "NS.string";

/// 已加载的键控归档
#[derive(Debug, Clone)]
pub struct KeyedArchive {
    objects: Vec<Value>,
    root: usize,
}

impl KeyedArchive {
    /// 读取 plist 文件（二进制或XML）
    pub fn open(path: &Path) -> InspectResult<Self> {
        let value = Value::from_file(path)
            .map_err(|e| archive_error(&format!("无法读取 {}", path.display()), e))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> InspectResult<Self> {
        let mut dict = value
            .into_dictionary()
            .ok_or_else(|| InspectError::ArchiveError("归档顶层不是字典".to_string()))?;

        let root = dict
            .get(TOP_KEY)
            .and_then(Value::as_dictionary)
            .and_then(|top| top.get(ROOT_KEY))
            .and_then(uid_of)
            .ok_or_else(|| InspectError::ArchiveError("缺少 $top.root 引用".to_string()))?;

        let objects = dict
            .remove(OBJECTS_KEY)
            .and_then(Value::into_array)
            .ok_or_else(|| InspectError::ArchiveError("缺少 $objects 对象表".to_string()))?;

        if root >= objects.len() {
            return Err(archive_error(
                "根对象引用越界",
                format!("{root} >= {}", objects.len()),
            ));
        }

        Ok(Self { objects, root })
    }

    /// 解析UID引用；`$null` 与越界引用视为缺失
    fn resolve<'a>(&'a self, value: &'a Value) -> Option<&'a Value> {
        match uid_of(value) {
            Some(idx) => match self.objects.get(idx)? {
                Value::String(s) if s == NULL_MARKER => None,
                target => Some(target),
            },
            None => Some(value),
        }
    }

    /// 根对象
    pub fn root(&self) -> Option<PlistObject<'_>> {
        self.objects[self.root]
            .as_dictionary()
            .map(|dict| PlistObject::archived(self, dict))
    }

    /// 根对象为数组（NSArray）时的元素列表
    pub fn root_array(&self) -> InspectResult<Vec<PlistObject<'_>>> {
        let root = self
            .root()
            .ok_or_else(|| InspectError::ArchiveError("根对象不是字典".to_string()))?;
        root.array_items(NS_OBJECTS)
            .ok_or_else(|| InspectError::ArchiveError("根对象不是数组".to_string()))
    }
}

/// UID 值：二进制 UID 或 XML 的 `{"CF$UID": n}`
fn uid_of(value: &Value) -> Option<usize> {
    match value {
        Value::Uid(uid) => usize::try_from(uid.get()).ok(),
        Value::Dictionary(dict) if dict.len() == 1 => dict
            .get(CF_UID_KEY)
            .and_then(Value::as_unsigned_integer)
            .and_then(|n| usize::try_from(n).ok()),
        _ => None,
    }
}

/// plist 字典视图；属于键控归档时会解析 UID 引用
#[derive(Debug, Clone, Copy)]
pub struct PlistObject<'a> {
    archive: Option<&'a KeyedArchive>,
    dict: &'a Dictionary,
}

impl<'a> PlistObject<'a> {
    /// 普通 plist 字典（如 project.plist）
    pub fn plain(dict: &'a Dictionary) -> Self {
        Self {
            archive: None,
            dict,
        }
    }

    fn archived(archive: &'a KeyedArchive, dict: &'a Dictionary) -> Self {
        Self {
            archive: Some(archive),
            dict,
        }
    }

    fn value(&self, key: &str) -> Option<&'a Value> {
        let raw = self.dict.get(key)?;
        match self.archive {
            Some(archive) => archive.resolve(raw),
            None => Some(raw),
        }
    }

    fn child(&self, value: &'a Value) -> Option<PlistObject<'a>> {
        value.as_dictionary().map(|dict| Self {
            archive: self.archive,
            dict,
        })
    }

    /// 数组字段的字典元素：NSArray 对象（`NS.objects`）或直接的 plist 数组
    fn array_items(&self, key: &str) -> Option<Vec<PlistObject<'a>>> {
        let items = match self.value(key)? {
            Value::Array(items) => items,
            Value::Dictionary(dict) => dict.get(NS_OBJECTS)?.as_array()?,
            _ => return None,
        };

        Some(
            items
                .iter()
                .filter_map(|item| {
                    let resolved = match self.archive {
                        Some(archive) => archive.resolve(item)?,
                        None => item,
                    };
                    self.child(resolved)
                })
                .collect(),
        )
    }
}

impl FieldSource for PlistObject<'_> {
    fn contains(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    fn int(&self, key: &str) -> Option<i64> {
        match self.value(key)? {
            Value::Integer(i) => i.as_signed(),
            Value::Real(r) => Some(*r as i64),
            Value::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    fn float(&self, key: &str) -> Option<f64> {
        match self.value(key)? {
            Value::Real(r) => Some(*r),
            Value::Integer(i) => i.as_signed().map(|v| v as f64),
            _ => None,
        }
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        match self.value(key)? {
            Value::Boolean(b) => Some(*b),
            Value::Integer(i) => i.as_signed().map(|v| v != 0),
            _ => None,
        }
    }

    fn string(&self, key: &str) -> Option<String> {
        match self.value(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Dictionary(dict) => dict
                .get(NS_STRING)
                .and_then(Value::as_string)
                .map(str::to_owned),
            _ => None,
        }
    }

    fn object(&self, key: &str) -> Option<Box<dyn FieldSource + '_>> {
        let child = self.child(self.value(key)?)?;
        Some(Box::new(child))
    }

    fn objects(&self, key: &str) -> Option<Vec<Box<dyn FieldSource + '_>>> {
        let items = self.array_items(key)?;
        Some(
            items
                .into_iter()
                .map(|item| Box::new(item) as Box<dyn FieldSource + '_>)
                .collect(),
        )
    }
}
