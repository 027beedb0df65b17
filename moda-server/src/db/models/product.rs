//! Product Model
//!
//! 商品按颜色分 variant，每个 variant 再按尺码拆分库存。
//! rating / review_count 是评论聚合的缓存字段，只由 RatingService 写入。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Stock entry for one size of a variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SizeStock {
    pub size: String,
    /// Remaining units, never negative
    #[serde(default)]
    pub stock: i64,
}

/// Color variant with its per-size stock breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    pub color: String,
    #[serde(default)]
    pub sizes: Vec<SizeStock>,
}

impl Variant {
    /// Find the stock entry for a size
    pub fn size_entry(&self, size: &str) -> Option<&SizeStock> {
        self.sizes.iter().find(|s| s.size == size)
    }
}

/// Product model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Plain string grouping ("women", "men", ...), no category table
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub material: String,
    pub price: f64,
    #[serde(default)]
    pub variants: Vec<Variant>,
    /// Cached mean review rating, one decimal (derived, do not hand-edit)
    #[serde(default)]
    pub rating: f64,
    /// Cached review line count (derived, do not hand-edit)
    #[serde(default)]
    pub review_count: i64,
    /// Units sold counter
    #[serde(default)]
    pub sold: i64,
    /// Stored image URLs
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Product {
    /// Find the variant for a color
    pub fn variant(&self, color: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.color == color)
    }

    /// Live stock for a (color, size) pair, None when either is unknown
    pub fn stock_of(&self, color: &str, size: &str) -> Option<i64> {
        self.variant(color)
            .and_then(|v| v.size_entry(size))
            .map(|s| s.stock)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub material: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Partial update; rating / review_count / sold are derived and not settable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<Variant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}
