// crates/mc_case/src/dictionary.rs

//! 类型化算例字典
//!
//! 描述符的底层容器: 插入序保持的键值映射。键重复立即报错，
//! 禁止后写覆盖，重复键视为装配逻辑缺陷而非数据问题。
//!
//! 序列化为 JSON 对象时保持插入顺序，外部求解器按布尔码
//! 'T'/'F' 读取开关量。

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::error::CaseError;

// ============================================================================
// 值类型
// ============================================================================

/// 算例字典值
#[derive(Debug, Clone, PartialEq)]
pub enum CaseValue {
    /// 整数量（计数、编码）
    Int(i64),
    /// 物理量
    Real(f64),
    /// 字符串量
    Str(String),
    /// 开关量，线上表示为 'T'/'F'
    Flag(bool),
}

impl CaseValue {
    /// 线上字符串表示
    pub fn wire_string(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Real(v) => v.to_string(),
            Self::Str(v) => v.clone(),
            Self::Flag(true) => "T".to_string(),
            Self::Flag(false) => "F".to_string(),
        }
    }
}

impl fmt::Display for CaseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_string())
    }
}

impl Serialize for CaseValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Real(v) => serializer.serialize_f64(*v),
            Self::Str(v) => serializer.serialize_str(v),
            Self::Flag(true) => serializer.serialize_str("T"),
            Self::Flag(false) => serializer.serialize_str("F"),
        }
    }
}

impl From<i64> for CaseValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for CaseValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for CaseValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for CaseValue {
    fn from(v: u64) -> Self {
        // 步数等计数远小于 i64 上限
        Self::Int(v as i64)
    }
}

impl From<f64> for CaseValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<bool> for CaseValue {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

impl From<&str> for CaseValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for CaseValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

// ============================================================================
// 插入序字典
// ============================================================================

/// 插入序保持的算例字典
///
/// `insert` 在键已存在时返回错误，不覆盖。
#[derive(Debug, Clone, Default)]
pub struct CaseDictionary {
    entries: Vec<(String, CaseValue)>,
    index: HashMap<String, usize>,
}

impl CaseDictionary {
    /// 创建空字典
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入键值对，键重复时报错
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<CaseValue>,
    ) -> Result<(), CaseError> {
        let key = key.into();
        if self.index.contains_key(&key) {
            return Err(CaseError::DuplicateKey(key));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value.into()));
        Ok(())
    }

    /// 按键取值
    pub fn get(&self, key: &str) -> Option<&CaseValue> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// 键是否存在
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 字典是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按插入顺序迭代
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CaseValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 按插入顺序迭代键
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for CaseDictionary {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Serialize for CaseDictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut dict = CaseDictionary::new();
        dict.insert("m", 100u32).unwrap();
        dict.insert("dt", 0.00136).unwrap();
        dict.insert("run_time_info", true).unwrap();
        dict.insert("queue", "normal").unwrap();

        assert_eq!(dict.get("m"), Some(&CaseValue::Int(100)));
        assert_eq!(dict.get("run_time_info"), Some(&CaseValue::Flag(true)));
        assert_eq!(dict.len(), 4);
        assert!(dict.contains_key("dt"));
        assert!(dict.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_key_fails_fast() {
        let mut dict = CaseDictionary::new();
        dict.insert("dt", 0.1).unwrap();
        let err = dict.insert("dt", 0.2).unwrap_err();
        assert!(err.to_string().contains("dt"));
        // 原值未被覆盖
        assert_eq!(dict.get("dt"), Some(&CaseValue::Real(0.1)));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut dict = CaseDictionary::new();
        dict.insert("z_last", 1i64).unwrap();
        dict.insert("a_first", 2i64).unwrap();
        dict.insert("m_mid", 3i64).unwrap();

        let keys: Vec<&str> = dict.keys().collect();
        assert_eq!(keys, vec!["z_last", "a_first", "m_mid"]);
    }

    #[test]
    fn test_flag_wire_encoding() {
        assert_eq!(CaseValue::Flag(true).wire_string(), "T");
        assert_eq!(CaseValue::Flag(false).wire_string(), "F");
        assert_eq!(CaseValue::Int(-8).wire_string(), "-8");
    }

    #[test]
    fn test_json_serialization_order_and_flags() {
        let mut dict = CaseDictionary::new();
        dict.insert("bubbles", true).unwrap();
        dict.insert("m", 100u32).unwrap();
        dict.insert("weno_eps", 1.0e-16).unwrap();

        let json = serde_json::to_string(&dict).unwrap();
        assert!(json.starts_with("{\"bubbles\":\"T\""));
        let bubbles_pos = json.find("bubbles").unwrap();
        let m_pos = json.find("\"m\"").unwrap();
        assert!(bubbles_pos < m_pos);
    }

    #[test]
    fn test_equality_by_entries() {
        let mut a = CaseDictionary::new();
        a.insert("x", 1i64).unwrap();
        a.insert("y", 2i64).unwrap();

        let mut b = CaseDictionary::new();
        b.insert("x", 1i64).unwrap();
        b.insert("y", 2i64).unwrap();

        assert_eq!(a, b);

        let mut c = CaseDictionary::new();
        c.insert("y", 2i64).unwrap();
        c.insert("x", 1i64).unwrap();
        // 顺序不同视为不同字典
        assert_ne!(a, c);
    }
}
