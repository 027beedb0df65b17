//! Order Service
//!
//! 下单是"读库存-内存校验扣减-落库"的串行流程，价格按下单时点快照。
//! 整批行先全部校验通过才开始写库，库存写入之间没有事务。

use crate::db::models::{CartLine, Order, OrderCreate, OrderLine, OrderStatus, Product};
use crate::db::repository::{OrderRepository, ProductRepository, UserRepository};
use crate::money;
use crate::services::parse_ref;
use crate::utils::time::now_millis;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_quantity, validate_required_text};
use shared::{AppError, ErrorCode};
use std::collections::{HashMap, HashSet};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

// =============================================================================
// Order Service
// =============================================================================

#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    users: UserRepository,
    products: ProductRepository,
}

impl OrderService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            products: ProductRepository::new(db),
        }
    }

    /// Place an order: validate every line against live stock, decrement
    /// stock and bump sold counters, snapshot unit prices, then clear the
    /// purchased keys from the buyer's cart.
    pub async fn place_order(&self, data: OrderCreate) -> Result<Order, AppError> {
        let user_id = parse_ref(&data.user, "user")?;
        if data.products.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }

        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

        // Parse and validate line shapes first
        let mut parsed: Vec<(RecordId, &crate::db::models::OrderLineCreate)> =
            Vec::with_capacity(data.products.len());
        let mut distinct: Vec<RecordId> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for item in &data.products {
            validate_quantity(item.quantity, "quantity")?;
            validate_required_text(&item.color, "color", MAX_SHORT_TEXT_LEN)?;
            validate_required_text(&item.size, "size", MAX_SHORT_TEXT_LEN)?;
            let id = parse_ref(&item.product, "product")?;
            if seen.insert(id.to_string()) {
                distinct.push(id.clone());
            }
            parsed.push((id, item));
        }

        // Load all referenced products, then check and decrement in memory.
        // 整批校验全部通过之前不会有任何写入。
        let products = self.products.find_by_ids(&distinct).await?;
        let mut by_ref: HashMap<String, Product> = products
            .into_iter()
            .filter_map(|p| p.id.clone().map(|id| (id.to_string(), p)))
            .collect();

        let mut lines: Vec<OrderLine> = Vec::with_capacity(parsed.len());
        let mut sold: HashMap<String, i64> = HashMap::new();
        for (product_id, item) in &parsed {
            let reference = product_id.to_string();
            let product = by_ref.get_mut(&reference).ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::ProductNotFound,
                    format!("Product {reference} not found"),
                )
            })?;

            let price = product.price;
            let Some(variant) = product.variants.iter_mut().find(|v| v.color == item.color)
            else {
                return Err(AppError::with_message(
                    ErrorCode::VariantNotFound,
                    format!("No '{}' variant for {}", item.color, product.name),
                ));
            };
            let Some(entry) = variant.sizes.iter_mut().find(|s| s.size == item.size) else {
                return Err(AppError::with_message(
                    ErrorCode::SizeNotFound,
                    format!("Size '{}' not available in '{}'", item.size, item.color),
                ));
            };
            if entry.stock < item.quantity {
                return Err(AppError::out_of_stock(entry.stock));
            }
            entry.stock -= item.quantity;
            *sold.entry(reference).or_insert(0) += item.quantity;

            lines.push(OrderLine {
                product: product_id.clone(),
                color: item.color.clone(),
                size: item.size.clone(),
                quantity: item.quantity,
                price,
            });
        }

        // Persist the decremented stock and sold counters, one write per product
        for (reference, product) in &by_ref {
            let Some(quantity) = sold.get(reference) else {
                continue;
            };
            let Some(id) = &product.id else { continue };
            self.products
                .apply_sale(id, product.variants.clone(), *quantity)
                .await?;
        }

        let total = money::order_total(&lines);
        let order = Order {
            id: None,
            user: user_id.clone(),
            status: OrderStatus::Pending,
            products: lines,
            total,
            rated: false,
            created_at: now_millis(),
        };
        let created = self.orders.create(order).await?;

        // Purchased keys leave the cart, one whole-cart write. The order is
        // already placed at this point, a failed cart write only leaves lines
        // the next sweep will reconcile.
        let keys: HashSet<(String, String, String)> =
            created.products.iter().map(|line| line.key()).collect();
        let kept: Vec<CartLine> = user
            .cart
            .iter()
            .filter(|line| !keys.contains(&line.key()))
            .cloned()
            .collect();
        if kept.len() != user.cart.len()
            && let Err(e) = self.users.set_cart(&user_id, &kept).await
        {
            tracing::warn!(user = %user_id, error = %e, "Purchased cart lines not cleared");
        }

        tracing::info!(
            order = ?created.id,
            user = %user_id,
            lines = created.products.len(),
            total = created.total,
            "Order placed"
        );
        Ok(created)
    }

    /// Move an order to a new status. Any defined status is accepted from
    /// any other; cancelled orders do not restock.
    pub async fn update_status(&self, order_id: &RecordId, status: &str) -> Result<Order, AppError> {
        let Some(status) = OrderStatus::parse(status) else {
            return Err(AppError::with_message(
                ErrorCode::OrderStatusInvalid,
                format!("Unknown order status: {status}"),
            ));
        };

        if self.orders.find_by_id(order_id).await?.is_none() {
            return Err(AppError::new(ErrorCode::OrderNotFound));
        }

        let updated = self.orders.set_status(order_id, status).await?;
        tracing::info!(order = %order_id, status = %status, "Order status updated");
        Ok(updated)
    }

    pub async fn get_order(&self, order_id: &RecordId) -> Result<Order, AppError> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))
    }

    /// All orders of one user, newest first
    pub async fn orders_for_user(&self, user_id: &RecordId) -> Result<Vec<Order>, AppError> {
        Ok(self.orders.find_by_user(user_id).await?)
    }
}
