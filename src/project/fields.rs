//! 字段源接口
//!
//! 工程模型只通过 [`FieldSource`] 读取已解码的字段值，不关心底层容器格式
//! （NSKeyedArchiver plist、JSON导出或测试中的内存字典）。
//!
//! 旧版本归档中缺失的可选字段按"存在性"判断而不是哨兵值：
//! 每个可选字段通过 `*_or` 方法读取，并在调用处给出它的默认常量。

use crate::core::Knob;
use serde::Deserialize;
use std::collections::BTreeMap;

/// 可按键查询的已解码对象
///
/// 取值方法在键缺失或类型不符时返回 `None`；
/// 键控解码器的语义（缺失的整数为0、缺失的布尔为false）由 `*_or` 方法表达。
pub trait FieldSource {
    /// 键是否存在（且不是空引用）
    fn contains(&self, key: &str) -> bool;

    fn int(&self, key: &str) -> Option<i64>;

    fn float(&self, key: &str) -> Option<f64>;

    fn boolean(&self, key: &str) -> Option<bool>;

    fn string(&self, key: &str) -> Option<String>;

    /// 子对象
    fn object(&self, key: &str) -> Option<Box<dyn FieldSource + '_>>;

    /// 子对象列表（数组字段）
    fn objects(&self, key: &str) -> Option<Vec<Box<dyn FieldSource + '_>>>;

    fn int_or(&self, key: &str, default: i64) -> i64 {
        self.int(key).unwrap_or(default)
    }

    fn float_or(&self, key: &str, default: f64) -> f64 {
        self.float(key).unwrap_or(default)
    }

    fn bool_or(&self, key: &str, default: bool) -> bool {
        self.boolean(key).unwrap_or(default)
    }

    fn string_or_default(&self, key: &str) -> String {
        self.string(key).unwrap_or_default()
    }

    /// 旋钮字段，缺失时为 `default`，超出 i32 的值饱和
    fn knob_or(&self, key: &str, default: Knob) -> Knob {
        match self.int(key) {
            Some(raw) => Knob(raw.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32),
            None => default,
        }
    }

    /// 旋钮字段，缺失时为0（与键控解码器的 decodeInt 一致）
    fn knob(&self, key: &str) -> Knob {
        self.knob_or(key, Knob(0))
    }
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }

    fn int(&self, key: &str) -> Option<i64> {
        (**self).int(key)
    }

    fn float(&self, key: &str) -> Option<f64> {
        (**self).float(key)
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        (**self).boolean(key)
    }

    fn string(&self, key: &str) -> Option<String> {
        (**self).string(key)
    }

    fn object(&self, key: &str) -> Option<Box<dyn FieldSource + '_>> {
        (**self).object(key)
    }

    fn objects(&self, key: &str) -> Option<Vec<Box<dyn FieldSource + '_>>> {
        (**self).objects(key)
    }
}

/// 内存字段值（可由 JSON 反序列化）
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<FieldValue>),
    Object(FieldMap),
}

/// 内存字典实现的 [`FieldSource`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    fields: BTreeMap<String, FieldValue>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式插入
    pub fn with(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    /// 从 JSON 值构造（顶层必须是对象）
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl FieldSource for FieldMap {
    fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    fn int(&self, key: &str) -> Option<i64> {
        match self.fields.get(key)? {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Float(v) => Some(*v as i64),
            FieldValue::Bool(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    fn float(&self, key: &str) -> Option<f64> {
        match self.fields.get(key)? {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        match self.fields.get(key)? {
            FieldValue::Bool(v) => Some(*v),
            FieldValue::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    fn string(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            FieldValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn object(&self, key: &str) -> Option<Box<dyn FieldSource + '_>> {
        match self.fields.get(key)? {
            FieldValue::Object(map) => Some(Box::new(map)),
            _ => None,
        }
    }

    fn objects(&self, key: &str) -> Option<Vec<Box<dyn FieldSource + '_>>> {
        match self.fields.get(key)? {
            FieldValue::List(items) => Some(
                items
                    .iter()
                    .filter_map(|item| match item {
                        FieldValue::Object(map) => {
                            Some(Box::new(map) as Box<dyn FieldSource + '_>)
                        }
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        }
    }
}
