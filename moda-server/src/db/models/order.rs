//! Order Model
//!
//! 每行快照下单时的单价；rated 是评论流程唯一会改写的订单字段。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipping,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Parse a status string, None when it is not one of the allowed states
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "shipping" => Some(Self::Shipping),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipping => "shipping",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One purchased line with its price-at-purchase snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub color: String,
    pub size: String,
    pub quantity: i64,
    /// Unit price at purchase time
    pub price: f64,
}

impl OrderLine {
    /// Merge key as an owned triple
    pub fn key(&self) -> (String, String, String) {
        (self.product.to_string(), self.color.clone(), self.size.clone())
    }
}

/// Order model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub status: OrderStatus,
    #[serde(default)]
    pub products: Vec<OrderLine>,
    #[serde(default)]
    pub total: f64,
    /// True once every ordered line has a matching review line
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub rated: bool,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineCreate {
    pub product: String,
    pub color: String,
    pub size: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub user: String,
    #[serde(default)]
    pub products: Vec<OrderLineCreate>,
}
