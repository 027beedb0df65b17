//! Review Mutation Service
//!
//! 一单一评：review 文档按 order 唯一；行按 (product, color, size) 键
//! 只追加不改写，已有行只能随整条 review 被删除。
//! 状态机: absent → partial → complete (order.rated = true)，单向。

use crate::db::models::{
    Order, OrderStatus, ProductReview, ProductReviewSubmit, Review, ReviewSubmit, ReviewUpdate,
};
use crate::db::repository::{OrderRepository, ReviewRepository};
use crate::services::parse_ref;
use crate::services::rating::RatingService;
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_COMMENT_LEN, MAX_SHORT_TEXT_LEN, validate_optional_rating, validate_optional_text,
    validate_rating, validate_required_text,
};
use shared::{AppError, ErrorCode};
use std::collections::HashSet;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

// =============================================================================
// Review Service
// =============================================================================

#[derive(Clone)]
pub struct ReviewService {
    reviews: ReviewRepository,
    orders: OrderRepository,
    rating: RatingService,
}

impl ReviewService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            reviews: ReviewRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            rating: RatingService::new(db),
        }
    }

    /// Create the order's review, or append new lines to the existing one.
    ///
    /// On append, lines whose key is already present are filtered out; when
    /// nothing new is left the whole submission fails and no state changes.
    pub async fn submit(&self, data: ReviewSubmit) -> Result<Review, AppError> {
        let order_id = parse_ref(&data.order, "order")?;
        let user_id = parse_ref(&data.user, "user")?;
        validate_rating(data.overall_rating, "overall_rating")?;
        validate_optional_rating(data.delivery_rating, "delivery_rating")?;
        validate_optional_rating(data.service_rating, "service_rating")?;
        validate_optional_text(&data.overall_comment, "overall_comment", MAX_COMMENT_LEN)?;
        let lines = convert_lines(&data.product_reviews)?;

        let order = self.eligible_order(&order_id, &user_id).await?;

        let (saved, touched) = match self.reviews.find_by_order(&order_id).await? {
            None => {
                let touched: HashSet<RecordId> =
                    lines.iter().map(|line| line.product.clone()).collect();
                let review = Review {
                    id: None,
                    order: order_id.clone(),
                    user: user_id.clone(),
                    overall_rating: data.overall_rating,
                    overall_comment: normalize_comment(data.overall_comment),
                    product_reviews: lines,
                    delivery_rating: data.delivery_rating,
                    service_rating: data.service_rating,
                    created_at: now_millis(),
                    updated_at: now_millis(),
                };
                let saved = self.reviews.create(review).await?;
                (saved, touched)
            }
            Some(mut existing) => {
                let seen = existing.keys();
                let fresh: Vec<ProductReview> = lines
                    .into_iter()
                    .filter(|line| !seen.contains(&line.key()))
                    .collect();
                if fresh.is_empty() {
                    return Err(AppError::with_message(
                        ErrorCode::AlreadyReviewed,
                        "All submitted lines are already reviewed",
                    ));
                }

                let touched: HashSet<RecordId> =
                    fresh.iter().map(|line| line.product.clone()).collect();
                existing.product_reviews.extend(fresh);

                // Header fields overwrite only with a supplied non-empty value
                existing.overall_rating = data.overall_rating;
                if let Some(comment) = normalize_comment(data.overall_comment) {
                    existing.overall_comment = Some(comment);
                }
                if let Some(v) = data.delivery_rating {
                    existing.delivery_rating = Some(v);
                }
                if let Some(v) = data.service_rating {
                    existing.service_rating = Some(v);
                }

                let id = existing
                    .id
                    .clone()
                    .ok_or_else(|| AppError::internal("Stored review has no id"))?;
                let saved = self.reviews.save_content(&id, &existing).await?;
                (saved, touched)
            }
        };

        // Derived state repair: only newly added lines trigger a recompute
        self.rating.recompute_all(&touched).await?;
        self.recheck_rated(&order, &saved).await?;

        tracing::info!(
            order = %order_id,
            lines = saved.product_reviews.len(),
            added = touched.len(),
            "Review saved"
        );
        Ok(saved)
    }

    /// Append-only partial update addressed by review id
    pub async fn update_review(
        &self,
        review_id: &RecordId,
        data: ReviewUpdate,
    ) -> Result<Review, AppError> {
        validate_optional_rating(data.overall_rating, "overall_rating")?;
        validate_optional_rating(data.delivery_rating, "delivery_rating")?;
        validate_optional_rating(data.service_rating, "service_rating")?;
        validate_optional_text(&data.overall_comment, "overall_comment", MAX_COMMENT_LEN)?;

        let Some(mut review) = self.reviews.find_by_id(review_id).await? else {
            return Err(AppError::new(ErrorCode::ReviewNotFound));
        };

        let mut touched: HashSet<RecordId> = HashSet::new();
        if let Some(incoming) = &data.product_reviews {
            let lines = convert_lines(incoming)?;
            let seen = review.keys();
            let fresh: Vec<ProductReview> = lines
                .into_iter()
                .filter(|line| !seen.contains(&line.key()))
                .collect();
            if fresh.is_empty() {
                return Err(AppError::with_message(
                    ErrorCode::AlreadyReviewed,
                    "All submitted lines are already reviewed",
                ));
            }
            touched = fresh.iter().map(|line| line.product.clone()).collect();
            review.product_reviews.extend(fresh);
        }

        if let Some(v) = data.overall_rating {
            review.overall_rating = v;
        }
        if let Some(comment) = normalize_comment(data.overall_comment) {
            review.overall_comment = Some(comment);
        }
        if let Some(v) = data.delivery_rating {
            review.delivery_rating = Some(v);
        }
        if let Some(v) = data.service_rating {
            review.service_rating = Some(v);
        }

        let saved = self.reviews.save_content(review_id, &review).await?;

        self.rating.recompute_all(&touched).await?;

        // rated recheck needs the order; skip when it no longer resolves
        if let Some(order) = self.orders.find_by_id(&review.order).await? {
            self.recheck_rated(&order, &saved).await?;
        }

        tracing::info!(review = %review_id, added = touched.len(), "Review updated");
        Ok(saved)
    }

    /// Admin path: drop the whole document and repair every product it touched
    pub async fn delete_review(&self, review_id: &RecordId) -> Result<(), AppError> {
        let Some(review) = self.reviews.find_by_id(review_id).await? else {
            return Err(AppError::new(ErrorCode::ReviewNotFound));
        };

        self.reviews.delete(review_id).await?;

        let touched = review.product_ids();
        self.rating.recompute_all(&touched).await?;

        tracing::info!(review = %review_id, products = touched.len(), "Review deleted");
        Ok(())
    }

    /// All reviews carrying at least one line for the product
    pub async fn reviews_for_product(&self, product: &RecordId) -> Result<Vec<Review>, AppError> {
        Ok(self.reviews.find_touching(product).await?)
    }

    /// The order's review, if one was submitted
    pub async fn review_for_order(&self, order: &RecordId) -> Result<Option<Review>, AppError> {
        Ok(self.reviews.find_by_order(order).await?)
    }

    /// NOT_ELIGIBLE gate: a missing order, an order owned by someone else and
    /// an uncompleted order all surface the same error code.
    async fn eligible_order(
        &self,
        order_id: &RecordId,
        user_id: &RecordId,
    ) -> Result<Order, AppError> {
        let Some(order) = self.orders.find_by_id(order_id).await? else {
            return Err(AppError::with_message(
                ErrorCode::OrderNotCompleted,
                "Order is not eligible for review",
            ));
        };
        if order.user != *user_id {
            return Err(AppError::with_message(
                ErrorCode::OrderNotCompleted,
                "Order is not eligible for review",
            ));
        }
        if order.status != OrderStatus::Completed {
            return Err(AppError::with_message(
                ErrorCode::OrderNotCompleted,
                "Only completed orders can be reviewed",
            ));
        }
        Ok(order)
    }

    /// order.rated = true iff every ordered key has a matching review line.
    /// Persisted only when the value actually changes.
    async fn recheck_rated(&self, order: &Order, review: &Review) -> Result<(), AppError> {
        let review_keys = review.keys();
        let rated = order
            .products
            .iter()
            .all(|line| review_keys.contains(&line.key()));

        if rated != order.rated {
            let Some(order_id) = &order.id else {
                return Ok(());
            };
            self.orders.set_rated(order_id, rated).await?;
            tracing::info!(order = %order_id, rated, "Order rated flag updated");
        }
        Ok(())
    }
}

/// Validate and convert incoming review lines
fn convert_lines(lines: &[ProductReviewSubmit]) -> Result<Vec<ProductReview>, AppError> {
    lines
        .iter()
        .map(|line| {
            let product = parse_ref(&line.product, "product")?;
            validate_rating(line.rating, "rating")?;
            validate_required_text(&line.color, "color", MAX_SHORT_TEXT_LEN)?;
            validate_required_text(&line.size, "size", MAX_SHORT_TEXT_LEN)?;
            validate_optional_text(&line.comment, "comment", MAX_COMMENT_LEN)?;
            Ok(ProductReview {
                product,
                rating: line.rating,
                comment: normalize_comment(line.comment.clone()),
                color: line.color.clone(),
                size: line.size.clone(),
            })
        })
        .collect()
}

/// Blank comments count as absent
fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment.filter(|c| !c.trim().is_empty())
}
