//! User Model
//!
//! cart 和 favorites 内嵌在 user 文档上，只存弱引用 (RecordId)，
//! 被引用的商品可能已被删除，读取方必须容忍。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// One cart entry; merge key is (product, color, size)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub color: String,
    pub size: String,
    pub quantity: i64,
}

impl CartLine {
    /// True when this line carries the given merge key
    pub fn matches(&self, product: &RecordId, color: &str, size: &str) -> bool {
        &self.product == product && self.color == color && self.size == size
    }

    /// Merge key as an owned triple
    pub fn key(&self) -> (String, String, String) {
        (self.product.to_string(), self.color.clone(), self.size.clone())
    }
}

/// User model (account credentials live with the auth service, not here)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_admin: bool,
    #[serde(default)]
    pub cart: Vec<CartLine>,
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub favorites: Vec<RecordId>,
    #[serde(default)]
    pub created_at: i64,
}

impl User {
    pub fn new(email: String, name: String) -> Self {
        Self {
            id: None,
            email,
            name,
            is_admin: false,
            cart: Vec::new(),
            favorites: Vec::new(),
            created_at: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub name: Option<String>,
    pub is_admin: Option<bool>,
}
