mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn admin_manages_products_and_public_browses_them() {
    let app = TestApp::new().await;

    let (status, created) = app
        .post(
            "/api/v1/products",
            json!({
                "name": "Hilsa Fish 1kg",
                "description": "Fresh from Chandpur",
                "category": "food",
                "price": "1200.00",
                "stock_quantity": 4
            }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["is_available"], true);
    assert_eq!(created["data"]["stock_status"], "only 4 left");

    let (status, page) = app
        .call(Method::GET, "/api/v1/products?category=food", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"]["total"], 1);
    assert_eq!(page["data"]["limit"], 12);

    let (status, updated) = app
        .put(
            &format!("/api/v1/products/{}", id),
            json!({ "price": "1150.50", "stock_quantity": 40 }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(decimal(&updated["data"]["price"]), dec!(1150.50));
    assert_eq!(updated["data"]["stock_status"], "40 in stock");
    assert_eq!(updated["data"]["name"], "Hilsa Fish 1kg");

    let (status, fetched) = app
        .call(Method::GET, &format!("/api/v1/products/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["in_stock"], true);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/products/{}", id),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert!(response.status().is_success());

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/products/{}", id),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unavailable_products_are_hidden_from_listing() {
    let app = TestApp::new().await;
    let visible = app.seed_product("Lentils 1kg", dec!(140), 30).await;
    let hidden = app.seed_product("Seasonal Mango", dec!(200), 10).await;

    let (status, _) = app
        .put(
            &format!("/api/v1/products/{}", hidden),
            json!({ "is_available": false }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, page) = app.call(Method::GET, "/api/v1/products", None, None).await;
    let ids: Vec<&str> = page["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![visible.to_string().as_str()]);

    let (_, product) = app
        .call(Method::GET, &format!("/api/v1/products/{}", hidden), None, None)
        .await;
    assert_eq!(product["data"]["stock_status"], "unavailable");
    assert_eq!(product["data"]["in_stock"], false);
}

#[tokio::test]
async fn search_matches_name_and_description() {
    let app = TestApp::new().await;
    app.seed_product("Basmati Rice", dec!(300), 10).await;
    app.seed_product("Mustard Oil", dec!(250), 10).await;

    let (_, page) = app
        .call(Method::GET, "/api/v1/products?search=Rice", None, None)
        .await;
    assert_eq!(page["data"]["total"], 1);
    assert_eq!(page["data"]["items"][0]["name"], "Basmati Rice");
}

#[tokio::test]
async fn product_writes_require_admin_and_valid_price() {
    let app = TestApp::new().await;
    let body = json!({
        "name": "Free Thing",
        "category": "other",
        "price": "0.00",
        "stock_quantity": 1
    });

    let (status, _) = app.post("/api/v1/products", body.clone(), &app.customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.post("/api/v1/products", body, &app.admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stock_decrement_skips_unavailable_products() {
    use nagaribashi_express::services::catalog::reduce_stock;

    let app = TestApp::new().await;
    let item = app.seed_product("Lentils 1kg", dec!(135), 10).await;
    let db = &*app.state.db;

    assert!(reduce_stock(db, item, 4).await.unwrap());
    assert_eq!(app.stock_of(item).await, 6);
    assert!(!reduce_stock(db, item, 7).await.unwrap(), "more than remains");

    let (status, _) = app
        .put(
            &format!("/api/v1/products/{}", item),
            json!({ "is_available": false }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    assert!(!reduce_stock(db, item, 1).await.unwrap());
    assert_eq!(app.stock_of(item).await, 6);
}
