mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use smartshop::{
    build_app,
    dto::products::{ProductRequest, StockAdjustRequest},
    error::AppError,
    middleware::auth::AuthUser,
    models::StockStatus,
    routes::params::ProductQuery,
    services::{auth_service, category_service, product_service, stats_service, sync_service},
};
use tower::ServiceExt;

use common::{JWT_SECRET, setup};

fn staff() -> AuthUser {
    AuthUser {
        user_id: "staff-1".into(),
        email: "staff@shop.example".into(),
    }
}

fn ring_request(name: &str, quantity: i32) -> ProductRequest {
    ProductRequest {
        name: name.into(),
        description: Some("  ".into()),
        category_id: "cat-rings".into(),
        quantity,
        price: Decimal::new(25_050, 2),
        image_path: None,
        is_available: None,
        low_stock_threshold: None,
    }
}

#[tokio::test]
async fn product_lifecycle_through_services() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let user = staff();
    category_service::initialize_defaults(state).await?;

    let created = product_service::create_product(state, &user, ring_request("Ring A", 3))
        .await?
        .data
        .expect("product");
    assert_eq!(created.stock_status, StockStatus::LowStock);
    assert_eq!(created.product.description, None);
    assert_eq!(created.product.low_stock_threshold, 5);
    assert!(created.product.is_available);

    let sold = product_service::adjust_stock(
        state,
        &user,
        &created.product.id,
        StockAdjustRequest { delta: -3 },
    )
    .await?
    .data
    .expect("product");
    assert_eq!(sold.stock_status, StockStatus::OutOfStock);

    let err = product_service::adjust_stock(
        state,
        &user,
        &created.product.id,
        StockAdjustRequest { delta: -1 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let restocked = product_service::update_product(
        state,
        &user,
        &created.product.id,
        ring_request("Ring A", 10),
    )
    .await?
    .data
    .expect("product");
    assert_eq!(restocked.stock_status, StockStatus::InStock);

    product_service::delete_product(state, &user, &created.product.id).await?;
    let err = product_service::get_product(state, &created.product.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    let err = product_service::delete_product(state, &user, &created.product.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn unknown_category_and_missing_product_are_reported() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let user = staff();

    let err = product_service::create_product(state, &user, ring_request("Ring A", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    category_service::initialize_defaults(state).await?;
    let err = product_service::update_product(state, &user, "missing", ring_request("Ring A", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn list_paginates_and_dashboard_summarizes() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let user = staff();
    category_service::initialize_defaults(state).await?;

    for (name, quantity) in [("Ring A", 3), ("Ring B", 10), ("Ring C", 20)] {
        product_service::create_product(state, &user, ring_request(name, quantity)).await?;
    }

    let page = product_service::list_products(
        state,
        ProductQuery {
            page: Some(2),
            per_page: Some(2),
            ..Default::default()
        },
    )
    .await?;
    let meta = page.meta.expect("meta");
    assert_eq!(meta.total, Some(3));
    let items = page.data.expect("items").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product.name, "Ring C");

    let far = product_service::list_products(
        state,
        ProductQuery {
            page: Some(i64::MAX),
            per_page: Some(100),
            ..Default::default()
        },
    )
    .await?;
    assert!(far.data.expect("items").items.is_empty());

    let dash = stats_service::dashboard(state)
        .await?
        .data
        .expect("dashboard");
    assert_eq!(dash.total_products, 3);
    assert_eq!(dash.total_units, 33);
    assert_eq!(dash.inventory_value, Decimal::new(25_050, 2) * Decimal::from(33));
    assert_eq!(dash.low_stock, 1);
    assert_eq!(dash.in_stock, 2);
    assert_eq!(dash.active_categories, 5);
    assert_eq!(dash.per_category.len(), 1);
    assert_eq!(dash.per_category[0].category_name.as_deref(), Some("Rings"));

    // The dashboard reads the view-model cell, which now holds every product.
    assert_eq!(state.products.current().len(), 3);
    Ok(())
}

#[tokio::test]
async fn category_in_use_cannot_be_deleted() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let user = staff();
    category_service::initialize_defaults(state).await?;
    product_service::create_product(state, &user, ring_request("Ring A", 3)).await?;

    let err = category_service::delete_category(state, &user, "cat-rings")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    category_service::delete_category(state, &user, "cat-watches").await?;
    let err = category_service::delete_category(state, &user, "cat-watches")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn image_upload_stores_blob_and_sets_url() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let user = staff();
    category_service::initialize_defaults(state).await?;
    let created = product_service::create_product(state, &user, ring_request("Ring A", 3))
        .await?
        .data
        .expect("product");

    let bytes = b"\x89PNG\r\n\x1a\nfake";
    let updated =
        product_service::attach_image(state, &user, &created.product.id, "image/png", bytes)
            .await?
            .data
            .expect("product");

    let url = updated.product.image_path.expect("image url");
    let prefix = format!("http://localhost:3000/media/products/{}/", created.product.id);
    assert!(url.starts_with(&prefix), "unexpected url {url}");
    assert!(url.ends_with(".png"));

    let key = url.trim_start_matches("http://localhost:3000/media/");
    let stored = tokio::fs::read(ctx.blob_dir.path().join(key)).await?;
    assert_eq!(stored, bytes);

    let err = product_service::attach_image(state, &user, &created.product.id, "text/plain", b"x")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn sync_endpoint_rebuilds_an_empty_cache() -> anyhow::Result<()> {
    let source = setup().await?;
    let user = staff();
    category_service::initialize_defaults(&source.state).await?;
    product_service::create_product(&source.state, &user, ring_request("Ring A", 3)).await?;

    // A second device sharing the same remote store starts with an empty cache.
    let (local, _) = smartshop::db::connect_stores("sqlite::memory:", "sqlite::memory:").await?;
    let device = smartshop::state::AppState::new(
        smartshop::local::LocalStore::new(local),
        source.state.remote.clone(),
        source.state.blobs.clone(),
        JWT_SECRET,
        5,
    );

    let report = sync_service::sync_all(&device).await?.data.expect("report");
    assert_eq!(report.categories, 5);
    assert_eq!(report.products, 1);
    assert_eq!(device.products.current().len(), 1);
    assert_eq!(device.categories.current().len(), 5);
    Ok(())
}

#[tokio::test]
async fn router_requires_bearer_token() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let blob_dir = ctx.blob_dir.path().to_string_lossy().to_string();
    let app = build_app(ctx.state.clone(), &blob_dir);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/products").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = auth_service::issue_token("staff-1", "staff@shop.example", JWT_SECRET)?;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/categories/defaults")
                .method("POST")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/products")
                .method("POST")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "",
                        "category_id": "cat-rings",
                        "quantity": 2,
                        "price": "10.00"
                    })
                    .to_string(),
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.into_body().collect().await?.to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(json["data"]["fields"][0]["field"], "name");
    Ok(())
}

#[tokio::test]
async fn view_model_cell_follows_local_writes() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    category_service::initialize_defaults(state).await?;
    let mut cell = state.products.subscribe();
    let refresher = state.products.clone().spawn_auto_refresh();

    // A write that bypasses the view-model still reaches the cell.
    state
        .products
        .repository()
        .add_product(common::ring("Ring A", 3, 5))
        .await?;

    tokio::time::timeout(std::time::Duration::from_secs(2), async {
        loop {
            if cell.borrow_and_update().len() == 1 {
                break;
            }
            if cell.changed().await.is_err() {
                break;
            }
        }
    })
    .await?;
    refresher.abort();

    assert_eq!(state.products.current().len(), 1);
    assert_eq!(state.categories.current().len(), 5);
    Ok(())
}
