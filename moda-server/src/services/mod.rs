//! 服务层 - 门店核心服务
//!
//! # 服务列表
//!
//! - [`CartService`] - 购物车变更与对账 (sweep)
//! - [`ReviewService`] - 评论提交 / 追加 / 删除
//! - [`RatingService`] - 商品评分聚合缓存
//! - [`CleanupService`] - 商品删除级联清理
//! - [`FavoriteService`] - 收藏夹
//! - [`OrderService`] - 下单与订单状态
//! - [`CatalogService`] - 商品目录维护
//! - [`ImageStore`] - 图片存储后端

pub mod cart;
pub mod catalog;
pub mod cleanup;
pub mod favorites;
pub mod images;
pub mod orders;
pub mod rating;
pub mod review;

pub use cart::{CartRequest, CartService, CartView};
pub use catalog::CatalogService;
pub use cleanup::{CascadeReport, CleanupService};
pub use favorites::FavoriteService;
pub use images::{ImageStore, LocalImageStore};
pub use orders::OrderService;
pub use rating::RatingService;
pub use review::ReviewService;

use shared::AppError;
use surrealdb::RecordId;

/// Parse a client-supplied "table:key" reference, enforcing the table name
pub(crate) fn parse_ref(value: &str, table: &str) -> Result<RecordId, AppError> {
    let id = value
        .parse::<RecordId>()
        .map_err(|_| AppError::validation(format!("Invalid {table} reference: {value}")))?;
    if id.table() != table {
        return Err(AppError::validation(format!(
            "Invalid {table} reference: {value}"
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ref() {
        assert!(parse_ref("product:abc", "product").is_ok());
        assert!(parse_ref("user:abc", "product").is_err());
        assert!(parse_ref("not-a-ref", "product").is_err());
        assert!(parse_ref("", "product").is_err());
    }
}
