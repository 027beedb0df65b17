//! 商品目录与图片、收藏夹测试
//!
//! 名称唯一、变体形状校验、图片内容寻址存储、收藏弱引用的读取容忍。
//! Run: cargo test -p moda-server --test catalog_test -- --nocapture

use moda_server::db::models::{ProductCreate, ProductUpdate, SizeStock, UserCreate, Variant};
use moda_server::db::repository::{ProductRepository, UserRepository};
use moda_server::services::{ImageStore, LocalImageStore};
use moda_server::{AppState, Config, ErrorCode};
use surrealdb::RecordId;

async fn setup() -> (tempfile::TempDir, AppState) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy(), 0);
    let state = AppState::initialize(&config).await.unwrap();
    (tmp, state)
}

fn product(name: &str) -> ProductCreate {
    ProductCreate {
        name: name.to_string(),
        description: Some("Soft handfeel".to_string()),
        category: Some("accessories".to_string()),
        material: Some("cotton".to_string()),
        price: 19.0,
        variants: vec![Variant {
            color: "black".to_string(),
            sizes: vec![SizeStock {
                size: "U".to_string(),
                stock: 10,
            }],
        }],
        images: vec![],
    }
}

fn no_update() -> ProductUpdate {
    ProductUpdate {
        name: None,
        description: None,
        category: None,
        material: None,
        price: None,
        variants: None,
        images: None,
    }
}

/// 4x4 纯色 PNG，够过格式校验
fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200u8, 30, 60]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
    bytes
}

#[tokio::test]
async fn product_names_are_unique() {
    let (_tmp, state) = setup().await;
    let catalog = state.catalog_service();

    let beanie = catalog.create_product(product("Rib Beanie")).await.unwrap();
    let beanie_id = beanie.id.unwrap();
    catalog.create_product(product("Wool Gloves")).await.unwrap();

    // 同名创建被拒
    let err = catalog.create_product(product("Rib Beanie")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductNameExists);

    // 改名撞上别人的名字也被拒
    let mut update = no_update();
    update.name = Some("Wool Gloves".to_string());
    let err = catalog.update_product(&beanie_id, update).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductNameExists);

    // 改成自己现在的名字没问题
    let mut update = no_update();
    update.name = Some("Rib Beanie".to_string());
    update.price = Some(21.0);
    let updated = catalog.update_product(&beanie_id, update).await.unwrap();
    assert_eq!(updated.price, 21.0);
}

#[tokio::test]
async fn product_shape_is_validated() {
    let (_tmp, state) = setup().await;
    let catalog = state.catalog_service();

    let mut bad = product("Free Hat");
    bad.price = 0.0;
    let err = catalog.create_product(bad).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductInvalidPrice);

    let mut bad = product("No Variant Hat");
    bad.variants = vec![];
    let err = catalog.create_product(bad).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);

    let mut bad = product("No Size Hat");
    bad.variants[0].sizes = vec![];
    let err = catalog.create_product(bad).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);

    let mut bad = product("Twin Size Hat");
    bad.variants[0].sizes = vec![
        SizeStock {
            size: "M".to_string(),
            stock: 1,
        },
        SizeStock {
            size: "M".to_string(),
            stock: 2,
        },
    ];
    let err = catalog.create_product(bad).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);

    let mut bad = product("Negative Hat");
    bad.variants[0].sizes[0].stock = -1;
    let err = catalog.create_product(bad).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);

    // 更新不存在的商品
    let ghost = RecordId::from_table_key("product", "ghost");
    let mut update = no_update();
    update.price = Some(9.0);
    let err = catalog.update_product(&ghost, update).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductNotFound);
}

#[tokio::test]
async fn image_upload_is_content_addressed() {
    let (_tmp, state) = setup().await;
    let catalog = state.catalog_service();
    let created = catalog.create_product(product("Canvas Tote")).await.unwrap();
    let id = created.id.unwrap();

    let updated = catalog.attach_image(&id, &png_bytes()).await.unwrap();
    assert_eq!(updated.images.len(), 1);
    let url = updated.images[0].clone();
    assert!(url.starts_with("/images/"), "公开 URL: {url}");
    assert!(url.ends_with(".jpg"), "存储格式统一转 JPEG: {url}");

    // 文件落在 {work_dir}/images/{hash}.jpg
    let file_name = url.strip_prefix("/images/").unwrap();
    let path = state.work_dir().join("images").join(file_name);
    assert!(path.exists(), "{path:?} 应该存在");

    // 相同内容再传一次：同 hash 同 URL，追加到列表
    let again = catalog.attach_image(&id, &png_bytes()).await.unwrap();
    assert_eq!(again.images.len(), 2);
    assert_eq!(again.images[1], url);

    // delete 幂等：第一次 true，第二次 false
    assert!(state.images.delete(&url).await.unwrap());
    assert!(!state.images.delete(&url).await.unwrap());
    assert!(!path.exists());
}

#[tokio::test]
async fn image_upload_rejects_bad_content() {
    let (_tmp, state) = setup().await;
    let catalog = state.catalog_service();
    let created = catalog.create_product(product("Logo Tee")).await.unwrap();
    let id = created.id.unwrap();

    let err = catalog.attach_image(&id, &[]).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::EmptyFile);

    let err = catalog
        .attach_image(&id, b"definitely not an image")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedFileFormat);

    let ghost = RecordId::from_table_key("product", "ghost");
    let err = catalog.attach_image(&ghost, &png_bytes()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductNotFound);

    // 上传失败时商品不变
    let stored = catalog.get_product(&id).await.unwrap();
    assert!(stored.images.is_empty());
}

#[tokio::test]
async fn image_size_limit_is_enforced() {
    let tmp = tempfile::tempdir().unwrap();
    let store = LocalImageStore::new(tmp.path().to_path_buf(), 16);

    let err = store.store(&png_bytes()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::FileTooLarge);
}

#[tokio::test]
async fn favorites_roundtrip_and_tolerate_stale_refs() {
    let (_tmp, state) = setup().await;
    let favorites = state.favorite_service();
    let catalog = state.catalog_service();
    let users = UserRepository::new(state.get_db());

    let clip = catalog.create_product(product("Hair Clip")).await.unwrap();
    let clip_id = clip.id.unwrap();
    let user = users
        .create(UserCreate {
            email: "vera@example.com".to_string(),
            name: None,
            is_admin: None,
        })
        .await
        .unwrap()
        .id
        .unwrap();

    let list = favorites.add(&user, &clip_id.to_string()).await.unwrap();
    assert_eq!(list, vec![clip_id.to_string()]);
    let err = favorites.add(&user, &clip_id.to_string()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyFavorited);

    let listed = favorites.list(&user).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Hair Clip");

    // 商品被直接删掉（绕过级联）后：存储里还挂着引用，读取时跳过
    ProductRepository::new(state.get_db())
        .delete(&clip_id)
        .await
        .unwrap();
    assert!(favorites.list(&user).await.unwrap().is_empty());
    assert_eq!(
        users.find_by_id(&user).await.unwrap().unwrap().favorites.len(),
        1,
        "弱引用本身不因读取而被清理"
    );

    // 悬挂引用仍然占着 membership：remove 可以清掉它
    let list = favorites.remove(&user, &clip_id.to_string()).await.unwrap();
    assert!(list.is_empty());
    let err = favorites
        .remove(&user, &clip_id.to_string())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::FavoriteNotFound);

    // 用户不存在
    let ghost = RecordId::from_table_key("user", "ghost");
    let err = favorites.add(&ghost, &clip_id.to_string()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::UserNotFound);

    // 商品不存在不能收藏
    let err = favorites
        .add(&user, "product:missing")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductNotFound);
}
