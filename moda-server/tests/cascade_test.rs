//! 商品删除级联测试
//!
//! 删除商品后对收藏夹、购物车、评价行、评分缓存和图片文件的清理。
//! 级联步骤尽力而为：单步失败不回滚已完成的步骤。
//! Run: cargo test -p moda-server --test cascade_test -- --nocapture

use moda_server::db::models::{
    OrderCreate, OrderLineCreate, ProductCreate, ProductReviewSubmit, ReviewSubmit, SizeStock,
    UserCreate, Variant,
};
use moda_server::db::repository::UserRepository;
use moda_server::services::ImageStore;
use moda_server::{AppState, CartRequest, CleanupService, Config, ErrorCode};
use shared::AppError;
use std::sync::Arc;
use surrealdb::RecordId;

async fn setup() -> (tempfile::TempDir, AppState) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy(), 0);
    let state = AppState::initialize(&config).await.unwrap();
    (tmp, state)
}

fn product(name: &str, color: &str, sizes: &[(&str, i64)]) -> ProductCreate {
    ProductCreate {
        name: name.to_string(),
        description: None,
        category: Some("men".to_string()),
        material: None,
        price: 79.0,
        variants: vec![Variant {
            color: color.to_string(),
            sizes: sizes
                .iter()
                .map(|(size, stock)| SizeStock {
                    size: size.to_string(),
                    stock: *stock,
                })
                .collect(),
        }],
        images: vec![],
    }
}

async fn seed_product(state: &AppState, data: ProductCreate) -> RecordId {
    let created = state.catalog_service().create_product(data).await.unwrap();
    created.id.unwrap()
}

async fn seed_user(state: &AppState, email: &str, is_admin: bool) -> RecordId {
    let users = UserRepository::new(state.get_db());
    let user = users
        .create(UserCreate {
            email: email.to_string(),
            name: None,
            is_admin: Some(is_admin),
        })
        .await
        .unwrap();
    user.id.unwrap()
}

fn add_to_cart(product: &RecordId, color: &str, size: &str) -> CartRequest {
    CartRequest {
        action: "add".to_string(),
        product: product.to_string(),
        color: color.to_string(),
        size: size.to_string(),
        quantity: Some(1),
    }
}

fn review_line(product: &RecordId, rating: f64, color: &str, size: &str) -> ProductReviewSubmit {
    ProductReviewSubmit {
        product: product.to_string(),
        rating,
        comment: None,
        color: color.to_string(),
        size: size.to_string(),
    }
}

/// 下单、完成、整单评价，返回订单 id
async fn reviewed_order(
    state: &AppState,
    user: &RecordId,
    lines: Vec<OrderLineCreate>,
    reviews: Vec<ProductReviewSubmit>,
) -> RecordId {
    let order = state
        .order_service()
        .place_order(OrderCreate {
            user: user.to_string(),
            products: lines,
        })
        .await
        .unwrap();
    let order_id = order.id.unwrap();
    state
        .order_service()
        .update_status(&order_id, "completed")
        .await
        .unwrap();
    state
        .review_service()
        .submit(ReviewSubmit {
            order: order_id.to_string(),
            user: user.to_string(),
            overall_rating: 5.0,
            overall_comment: None,
            product_reviews: reviews,
            delivery_rating: None,
            service_rating: None,
        })
        .await
        .unwrap();
    order_id
}

#[tokio::test]
async fn cascade_cleans_every_reference() {
    let (_tmp, state) = setup().await;
    let shirt = seed_product(&state, product("Linen Shirt", "white", &[("M", 20)])).await;
    let jacket = seed_product(&state, product("Denim Jacket", "blue", &[("L", 20)])).await;

    // X 收藏，Y 加购，Z 下单并评价（shirt + jacket 各一行）
    let fan = seed_user(&state, "fan@example.com", false).await;
    state
        .favorite_service()
        .add(&fan, &shirt.to_string())
        .await
        .unwrap();

    let shopper = seed_user(&state, "shopper@example.com", false).await;
    state
        .cart_service()
        .apply(&shopper, add_to_cart(&shirt, "white", "M"))
        .await
        .unwrap();

    let buyer = seed_user(&state, "buyer@example.com", false).await;
    let order = reviewed_order(
        &state,
        &buyer,
        vec![
            OrderLineCreate {
                product: shirt.to_string(),
                color: "white".to_string(),
                size: "M".to_string(),
                quantity: 1,
            },
            OrderLineCreate {
                product: jacket.to_string(),
                color: "blue".to_string(),
                size: "L".to_string(),
                quantity: 1,
            },
        ],
        vec![
            review_line(&shirt, 2.0, "white", "M"),
            review_line(&jacket, 4.0, "blue", "L"),
        ],
    )
    .await;

    // 管理员账号也收藏、加购同一商品，级联不应触碰
    let admin = seed_user(&state, "admin@example.com", true).await;
    state
        .favorite_service()
        .add(&admin, &shirt.to_string())
        .await
        .unwrap();
    state
        .cart_service()
        .apply(&admin, add_to_cart(&shirt, "white", "M"))
        .await
        .unwrap();

    let report = state
        .cleanup_service()
        .delete_products(&[shirt.to_string()])
        .await
        .unwrap();
    assert_eq!(report.deleted_count, 1);
    assert_eq!(report.deleted_ids, vec![shirt.to_string()]);

    // 商品本体已删
    let err = state.catalog_service().get_product(&shirt).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductNotFound);

    // 顾客的收藏和购物车被清理
    let users = UserRepository::new(state.get_db());
    assert!(state.favorite_service().list(&fan).await.unwrap().is_empty());
    assert!(
        users.find_by_id(&fan).await.unwrap().unwrap().favorites.is_empty(),
        "收藏里的弱引用应被移除而不是留着"
    );
    assert!(users.find_by_id(&shopper).await.unwrap().unwrap().cart.is_empty());

    // 评价文档保留，只剥掉被删商品的行；幸存商品重算评分
    let review = state
        .review_service()
        .review_for_order(&order)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(review.product_reviews.len(), 1);
    assert_eq!(review.product_reviews[0].product, jacket);
    let survivor = state.catalog_service().get_product(&jacket).await.unwrap();
    assert_eq!(survivor.rating, 4.0);
    assert_eq!(survivor.review_count, 1);

    // 管理员不在清理范围内，留下悬挂引用
    let stale = users.find_by_id(&admin).await.unwrap().unwrap();
    assert_eq!(stale.favorites.len(), 1, "管理员收藏保留");
    assert_eq!(stale.cart.len(), 1, "管理员购物车保留");
}

#[tokio::test]
async fn cascade_retains_emptied_review_documents() {
    let (_tmp, state) = setup().await;
    let scarf = seed_product(&state, product("Silk Scarf", "green", &[("U", 20)])).await;
    let buyer = seed_user(&state, "mono@example.com", false).await;

    // 整条 review 只评这一个商品
    let order = reviewed_order(
        &state,
        &buyer,
        vec![OrderLineCreate {
            product: scarf.to_string(),
            color: "green".to_string(),
            size: "U".to_string(),
            quantity: 1,
        }],
        vec![review_line(&scarf, 5.0, "green", "U")],
    )
    .await;

    state
        .cleanup_service()
        .delete_products(&[scarf.to_string()])
        .await
        .unwrap();

    // 行全被剥掉后文档仍在，头部评价（overall 等）保留
    let review = state
        .review_service()
        .review_for_order(&order)
        .await
        .unwrap()
        .expect("清空的评价文档应保留");
    assert!(review.product_reviews.is_empty());
    assert_eq!(review.overall_rating, 5.0);
}

#[tokio::test]
async fn cascade_rejects_bad_id_batches() {
    let (_tmp, state) = setup().await;
    let cleanup = state.cleanup_service();

    // 没有一个合法的 product id
    let err = cleanup
        .delete_products(&["garbage".to_string(), "user:x".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);

    // 格式合法但都不存在
    let err = cleanup
        .delete_products(&["product:zzz".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductNotFound);

    // 混合批次：存在的删掉，不存在的跳过
    let hat = seed_product(&state, product("Bucket Hat", "beige", &[("U", 5)])).await;
    let report = cleanup
        .delete_products(&["product:zzz".to_string(), hat.to_string()])
        .await
        .unwrap();
    assert_eq!(report.deleted_count, 1);
    assert_eq!(report.deleted_ids, vec![hat.to_string()]);
}

/// 总是失败的图片存储，用来验证第 7 步失败不影响级联结果
struct FailingStore;

#[async_trait::async_trait]
impl ImageStore for FailingStore {
    async fn store(&self, _data: &[u8]) -> Result<String, AppError> {
        Err(AppError::internal("store is down"))
    }

    async fn delete(&self, _url: &str) -> Result<bool, AppError> {
        Err(AppError::internal("store is down"))
    }
}

#[tokio::test]
async fn cascade_survives_image_store_failure() {
    let (_tmp, state) = setup().await;
    let mut data = product("Print Tee", "black", &[("M", 5)]);
    data.images = vec![
        "/images/0000000000000000000000000000000000000000000000000000000000000000.jpg"
            .to_string(),
    ];
    let tee = seed_product(&state, data).await;

    let cleanup = CleanupService::new(state.get_db(), Arc::new(FailingStore));
    let report = cleanup.delete_products(&[tee.to_string()]).await.unwrap();
    assert_eq!(report.deleted_count, 1);

    let err = state.catalog_service().get_product(&tee).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductNotFound);
}
