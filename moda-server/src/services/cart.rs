//! Cart Reconciliation Service
//!
//! 一次购物车变更 = 单行校验 + 提交 + 全量对账（sweep）。
//! 没有每用户锁：并发请求在存储写入层面竞争，sweep 负责事后收敛。

use crate::db::models::{CartLine, Product};
use crate::db::repository::{ProductRepository, UserRepository};
use crate::services::parse_ref;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_quantity, validate_required_text};
use shared::{AppError, ErrorCode};
use std::collections::HashMap;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// One cart mutation request; `action` selects add / remove / update
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CartRequest {
    pub action: String,
    pub product: String,
    pub color: String,
    pub size: String,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Cart line joined with live product data for display
#[derive(Debug, Clone, serde::Serialize)]
pub struct CartView {
    pub product: String,
    pub name: String,
    pub price: f64,
    pub color: String,
    pub size: String,
    pub quantity: i64,
    pub stock: i64,
    pub image: Option<String>,
}

// =============================================================================
// Cart Service
// =============================================================================

#[derive(Clone)]
pub struct CartService {
    users: UserRepository,
    products: ProductRepository,
}

impl CartService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            products: ProductRepository::new(db),
        }
    }

    /// Entry point: validate, run one mutation, sweep, return the reconciled cart
    pub async fn apply(
        &self,
        user: &RecordId,
        request: CartRequest,
    ) -> Result<Vec<CartLine>, AppError> {
        validate_required_text(&request.color, "color", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&request.size, "size", MAX_SHORT_TEXT_LEN)?;
        let product_id = parse_ref(&request.product, "product")?;

        match request.action.as_str() {
            "add" => {
                let quantity = request
                    .quantity
                    .ok_or_else(|| AppError::validation("quantity is required for add"))?;
                self.add_item(user, &product_id, &request.color, &request.size, quantity)
                    .await
            }
            "remove" => {
                self.remove_item(user, &product_id, &request.color, &request.size)
                    .await
            }
            "update" => {
                let quantity = request
                    .quantity
                    .ok_or_else(|| AppError::validation("quantity is required for update"))?;
                self.update_item(user, &product_id, &request.color, &request.size, quantity)
                    .await
            }
            other => Err(AppError::with_message(
                ErrorCode::UnknownCartAction,
                format!("Unknown cart action: {other}"),
            )),
        }
    }

    /// Add quantity to the cart, merging into an existing line for the same
    /// (product, color, size) key. The merged total is checked against live
    /// stock before anything is written.
    async fn add_item(
        &self,
        user_id: &RecordId,
        product_id: &RecordId,
        color: &str,
        size: &str,
        quantity: i64,
    ) -> Result<Vec<CartLine>, AppError> {
        validate_quantity(quantity, "quantity")?;

        let user = self.load_user(user_id).await?;
        let product = self.load_product(product_id).await?;
        let stock = resolve_stock(&product, color, size)?;

        let existing = user
            .cart
            .iter()
            .position(|line| line.matches(product_id, color, size));
        let proposed = match existing {
            Some(idx) => user.cart[idx].quantity + quantity,
            None => quantity,
        };
        if proposed > stock {
            return Err(AppError::out_of_stock(stock));
        }

        match existing {
            Some(idx) => {
                // Merge into the first matching line, one whole-cart write
                let mut cart = user.cart.clone();
                cart[idx].quantity = proposed;
                self.users.set_cart(user_id, &cart).await?;
            }
            None => {
                // Append-only commit. Two concurrent adds may both land here,
                // leaving duplicate-key lines that the sweep clamps afterwards.
                let line = CartLine {
                    product: product_id.clone(),
                    color: color.to_string(),
                    size: size.to_string(),
                    quantity,
                };
                self.users.push_cart_line(user_id, &line).await?;
            }
        }

        tracing::info!(user = %user_id, product = %product_id, color, size, quantity, "Cart add committed");
        self.sweep(user_id).await
    }

    /// Remove every line matching the key
    async fn remove_item(
        &self,
        user_id: &RecordId,
        product_id: &RecordId,
        color: &str,
        size: &str,
    ) -> Result<Vec<CartLine>, AppError> {
        let user = self.load_user(user_id).await?;
        let product = self.load_product(product_id).await?;
        resolve_stock(&product, color, size)?;

        let cart: Vec<CartLine> = user
            .cart
            .iter()
            .filter(|line| !line.matches(product_id, color, size))
            .cloned()
            .collect();
        if cart.len() == user.cart.len() {
            return Err(AppError::with_message(
                ErrorCode::CartLineNotFound,
                "No matching line in cart",
            ));
        }

        self.users.set_cart(user_id, &cart).await?;
        tracing::info!(user = %user_id, product = %product_id, color, size, "Cart line removed");
        self.sweep(user_id).await
    }

    /// Set the quantity of the first line matching the key.
    /// quantity ≤ 0 是隐式删除，等价于 remove。
    async fn update_item(
        &self,
        user_id: &RecordId,
        product_id: &RecordId,
        color: &str,
        size: &str,
        quantity: i64,
    ) -> Result<Vec<CartLine>, AppError> {
        if quantity <= 0 {
            return self.remove_item(user_id, product_id, color, size).await;
        }

        let user = self.load_user(user_id).await?;
        let product = self.load_product(product_id).await?;
        let stock = resolve_stock(&product, color, size)?;

        let Some(idx) = user
            .cart
            .iter()
            .position(|line| line.matches(product_id, color, size))
        else {
            return Err(AppError::with_message(
                ErrorCode::CartLineNotFound,
                "No matching line in cart",
            ));
        };

        if quantity > stock {
            return Err(AppError::out_of_stock(stock));
        }

        let mut cart = user.cart.clone();
        cart[idx].quantity = quantity;
        self.users.set_cart(user_id, &cart).await?;
        tracing::info!(user = %user_id, product = %product_id, color, size, quantity, "Cart line updated");
        self.sweep(user_id).await
    }

    /// Full-cart reconciliation pass, run after every committed mutation:
    /// 解析不了的行和零库存的行删掉，超出库存的行收敛到库存上限。
    /// Racing appends can leave duplicate keys; each line is clamped on its
    /// own, duplicates are not merged.
    pub async fn sweep(&self, user_id: &RecordId) -> Result<Vec<CartLine>, AppError> {
        let user = self.load_user(user_id).await?;

        let ids: Vec<RecordId> = user.cart.iter().map(|line| line.product.clone()).collect();
        let products = if ids.is_empty() {
            Vec::new()
        } else {
            self.products.find_by_ids(&ids).await?
        };
        let by_ref: HashMap<String, &Product> = products
            .iter()
            .filter_map(|p| p.id.as_ref().map(|id| (id.to_string(), p)))
            .collect();

        let mut swept: Vec<CartLine> = Vec::with_capacity(user.cart.len());
        for line in &user.cart {
            let Some(product) = by_ref.get(&line.product.to_string()) else {
                continue;
            };
            let Some(stock) = product.stock_of(&line.color, &line.size) else {
                continue;
            };
            if stock <= 0 {
                continue;
            }
            let quantity = line.quantity.min(stock);
            if quantity <= 0 {
                continue;
            }
            let mut kept = line.clone();
            kept.quantity = quantity;
            swept.push(kept);
        }

        if swept != user.cart {
            self.users.set_cart(user_id, &swept).await?;
            tracing::debug!(
                user = %user_id,
                before = user.cart.len(),
                after = swept.len(),
                "Cart swept"
            );
        }
        Ok(swept)
    }

    /// Read-model projection: stored lines joined with live product data.
    /// Unresolvable lines are skipped here, the next mutation's sweep drops them.
    pub async fn get_cart(&self, user_id: &RecordId) -> Result<Vec<CartView>, AppError> {
        let user = self.load_user(user_id).await?;

        let ids: Vec<RecordId> = user.cart.iter().map(|line| line.product.clone()).collect();
        let products = if ids.is_empty() {
            Vec::new()
        } else {
            self.products.find_by_ids(&ids).await?
        };
        let by_ref: HashMap<String, &Product> = products
            .iter()
            .filter_map(|p| p.id.as_ref().map(|id| (id.to_string(), p)))
            .collect();

        Ok(user
            .cart
            .iter()
            .filter_map(|line| {
                let product = by_ref.get(&line.product.to_string())?;
                let stock = product.stock_of(&line.color, &line.size)?;
                Some(CartView {
                    product: line.product.to_string(),
                    name: product.name.clone(),
                    price: product.price,
                    color: line.color.clone(),
                    size: line.size.clone(),
                    quantity: line.quantity,
                    stock,
                    image: product.images.first().cloned(),
                })
            })
            .collect())
    }

    async fn load_user(&self, id: &RecordId) -> Result<crate::db::models::User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))
    }

    async fn load_product(&self, id: &RecordId) -> Result<Product, AppError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))
    }
}

/// Resolve live stock for a (color, size) pair, failing with the precise
/// not-found code for each missing level.
pub(crate) fn resolve_stock(product: &Product, color: &str, size: &str) -> Result<i64, AppError> {
    let variant = product.variant(color).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::VariantNotFound,
            format!("No '{color}' variant for {}", product.name),
        )
    })?;
    let entry = variant.size_entry(size).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::SizeNotFound,
            format!("Size '{size}' not available in '{color}'"),
        )
    })?;
    Ok(entry.stock)
}
