//! Serde adapters for weak record references
//!
//! 文档内嵌的弱引用统一以 "table:key" 字符串落库，读取时兼容两种来源：
//! - API JSON 里的字符串形式 ("product:abc")
//! - SurrealDB 返回的原生 RecordId 结构
//!
//! 模型字段通过 `#[serde(with = "serde_helpers::record_id")]` 及其
//! option/vec 变体挂接。

use serde::{Deserialize, Deserializer, Serializer};
use surrealdb::RecordId;

/// Deserialize bool that treats null/absent as false
pub fn bool_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(false))
}

/// 弱引用的读取端：字符串和原生结构都接受
#[derive(Debug, Clone)]
struct WeakRef(RecordId);

impl<'de> Deserialize<'de> for WeakRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct WeakRefVisitor;

        impl<'de> Visitor<'de> for WeakRefVisitor {
            type Value = WeakRef;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a record reference like 'product:abc'")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse::<RecordId>()
                    .map(WeakRef)
                    .map_err(|_| de::Error::custom(format!("bad record reference: {}", value)))
            }

            fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
            where
                M: de::MapAccess<'de>,
            {
                // 数据库原生形式，交还给 RecordId 自身的反序列化
                RecordId::deserialize(de::value::MapAccessDeserializer::new(map)).map(WeakRef)
            }
        }

        deserializer.deserialize_any(WeakRefVisitor)
    }
}

/// RecordId stored as a "table:key" string
pub mod record_id {
    use super::*;

    pub fn serialize<S>(id: &RecordId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<RecordId, D::Error>
    where
        D: Deserializer<'de>,
    {
        WeakRef::deserialize(d).map(|r| r.0)
    }
}

/// Option<RecordId>, same string convention
pub mod option_record_id {
    use super::*;

    pub fn serialize<S>(id: &Option<RecordId>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match id {
            Some(id) => s.serialize_some(&id.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<WeakRef>::deserialize(d).map(|opt| opt.map(|r| r.0))
    }
}

/// Vec<RecordId>, each element a "table:key" string
pub mod vec_record_id {
    use super::*;

    pub fn serialize<S>(ids: &[RecordId], s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = s.serialize_seq(Some(ids.len()))?;
        for id in ids {
            seq.serialize_element(&id.to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Vec<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<WeakRef>::deserialize(d).map(|v| v.into_iter().map(|r| r.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Line {
        #[serde(with = "record_id")]
        product: RecordId,
    }

    #[derive(Serialize, Deserialize)]
    struct Favorites {
        #[serde(default, with = "vec_record_id")]
        items: Vec<RecordId>,
        #[serde(default, deserialize_with = "bool_false")]
        is_admin: bool,
    }

    #[test]
    fn weak_ref_round_trips_as_string() {
        let line = Line {
            product: RecordId::from_table_key("product", "p1"),
        };
        let json = serde_json::to_string(&line).unwrap();
        assert_eq!(json, r#"{"product":"product:p1"}"#);

        let back: Line = serde_json::from_str(&json).unwrap();
        assert_eq!(back.product, line.product);
    }

    #[test]
    fn bad_reference_string_rejected() {
        let err = serde_json::from_str::<Line>(r#"{"product":"no-table-here"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn vec_and_bool_defaults() {
        let favs: Favorites = serde_json::from_str(r#"{"items":["product:a","product:b"]}"#).unwrap();
        assert_eq!(favs.items.len(), 2);
        assert!(!favs.is_admin);

        let favs: Favorites = serde_json::from_str(r#"{"is_admin":null}"#).unwrap();
        assert!(favs.items.is_empty());
        assert!(!favs.is_admin);
    }
}
