//! Review Model
//!
//! 一个订单只有一条 review（order 字段带唯一索引）。
//! product_reviews 按 (product, color, size) 键只追加，不改写已有行。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use surrealdb::RecordId;

/// One reviewed line, keyed by (product, color, size)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductReview {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    /// Rating in [1, 5]
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub color: String,
    pub size: String,
}

impl ProductReview {
    /// Merge key as an owned triple
    pub fn key(&self) -> (String, String, String) {
        (self.product.to_string(), self.color.clone(), self.size.clone())
    }
}

/// Review model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    /// Rating in [1, 5]
    pub overall_rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_comment: Option<String>,
    #[serde(default)]
    pub product_reviews: Vec<ProductReview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_rating: Option<f64>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Review {
    /// Set of (product, color, size) keys already present on this review
    pub fn keys(&self) -> HashSet<(String, String, String)> {
        self.product_reviews.iter().map(|r| r.key()).collect()
    }

    /// Distinct product ids referenced by this review's lines
    pub fn product_ids(&self) -> HashSet<RecordId> {
        self.product_reviews
            .iter()
            .map(|r| r.product.clone())
            .collect()
    }
}

/// One incoming review line (ids as strings, parsed at the service layer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductReviewSubmit {
    pub product: String,
    pub rating: f64,
    #[serde(default)]
    pub comment: Option<String>,
    pub color: String,
    pub size: String,
}

/// Review submission payload for create-or-append
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSubmit {
    pub order: String,
    pub user: String,
    pub overall_rating: f64,
    #[serde(default)]
    pub overall_comment: Option<String>,
    #[serde(default)]
    pub product_reviews: Vec<ProductReviewSubmit>,
    #[serde(default)]
    pub delivery_rating: Option<f64>,
    #[serde(default)]
    pub service_rating: Option<f64>,
}

/// Partial update addressed by review id; product_reviews follow the same
/// append-only dedup rules as submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_reviews: Option<Vec<ProductReviewSubmit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_rating: Option<f64>,
}
