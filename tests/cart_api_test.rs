mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;

fn amount(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("amount should be a string"))
        .expect("amount should parse as a decimal")
}

fn dosa(quantity: i32) -> Value {
    json!({
        "item_id": "dosa",
        "name": "Masala Dosa",
        "unit_price": "60",
        "quantity": quantity,
        "image_ref": "dosa.jpg",
        "restaurant_id": "r1",
        "restaurant_name": "Udupi Palace"
    })
}

fn idli(quantity: i32) -> Value {
    json!({
        "item_id": "idli",
        "name": "Idli",
        "unit_price": "30",
        "quantity": quantity,
        "restaurant_id": "r1",
        "restaurant_name": "Udupi Palace"
    })
}

#[tokio::test]
async fn get_cart_creates_on_first_access() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/cart/user_1", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cart = body_json(response).await;
    assert_eq!(cart["owner_id"], "user_1");
    assert_eq!(cart["total_items"], 0);
    assert_eq!(amount(&cart["total_amount"]), Decimal::ZERO);
    assert!(cart["items"].as_array().unwrap().is_empty());

    // A second read returns the same cart, not a new one
    let response = app.request(Method::GET, "/cart/user_1", None).await;
    let again = body_json(response).await;
    assert_eq!(again["id"], cart["id"]);
}

#[tokio::test]
async fn add_item_merges_by_catalog_id() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/cart/user_1", Some(dosa(1)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::POST, "/cart/user_1", Some(dosa(2)))
        .await;
    let cart = body_json(response).await;

    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["item_id"], "dosa");
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(cart["total_items"], 3);
    assert_eq!(amount(&cart["total_amount"]), dec!(180));
}

#[tokio::test]
async fn items_keep_insertion_order() {
    let app = TestApp::new().await;

    app.request(Method::POST, "/cart/user_1", Some(dosa(1)))
        .await;
    app.request(Method::POST, "/cart/user_1", Some(idli(2)))
        .await;
    let response = app
        .request(Method::POST, "/cart/user_1", Some(dosa(1)))
        .await;
    let cart = body_json(response).await;

    let ids: Vec<&str> = cart["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["item_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["dosa", "idli"]);
    assert_eq!(cart["total_items"], 4);
    assert_eq!(amount(&cart["total_amount"]), dec!(180));
}

#[tokio::test]
async fn update_quantity_recomputes_totals() {
    let app = TestApp::new().await;

    app.request(Method::POST, "/cart/user_1", Some(dosa(4)))
        .await;
    let response = app
        .request(
            Method::PUT,
            "/cart/user_1/item/dosa",
            Some(json!({"quantity": 1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cart = body_json(response).await;
    assert_eq!(cart["total_items"], 1);
    assert_eq!(amount(&cart["total_amount"]), dec!(60));
}

#[tokio::test]
async fn update_quantity_rejects_zero() {
    let app = TestApp::new().await;

    app.request(Method::POST, "/cart/user_1", Some(dosa(1)))
        .await;
    let response = app
        .request(
            Method::PUT,
            "/cart/user_1/item/dosa",
            Some(json!({"quantity": 0})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_unknown_item_is_not_found() {
    let app = TestApp::new().await;

    app.request(Method::POST, "/cart/user_1", Some(dosa(1)))
        .await;
    let response = app
        .request(
            Method::PUT,
            "/cart/user_1/item/ghost",
            Some(json!({"quantity": 2})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_item_in_missing_cart_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::PUT,
            "/cart/nobody/item/dosa",
            Some(json!({"quantity": 2})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn remove_item_updates_totals() {
    let app = TestApp::new().await;

    app.request(Method::POST, "/cart/user_1", Some(dosa(2)))
        .await;
    app.request(Method::POST, "/cart/user_1", Some(idli(1)))
        .await;

    let response = app
        .request(Method::DELETE, "/cart/user_1/item/dosa", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cart = body_json(response).await;
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["item_id"], "idli");
    assert_eq!(cart["total_items"], 1);
    assert_eq!(amount(&cart["total_amount"]), dec!(30));
}

#[tokio::test]
async fn remove_unknown_item_is_not_found() {
    let app = TestApp::new().await;

    app.request(Method::POST, "/cart/user_1", Some(dosa(1)))
        .await;
    let response = app
        .request(Method::DELETE, "/cart/user_1/item/ghost", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn clear_cart_keeps_the_row() {
    let app = TestApp::new().await;

    app.request(Method::POST, "/cart/user_1", Some(dosa(2)))
        .await;
    let response = app.request(Method::DELETE, "/cart/user_1", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cleared = body_json(response).await;
    assert!(cleared["items"].as_array().unwrap().is_empty());
    assert_eq!(cleared["total_items"], 0);
    assert_eq!(amount(&cleared["total_amount"]), Decimal::ZERO);

    // The same cart row survives the clear
    let response = app.request(Method::GET, "/cart/user_1", None).await;
    let cart = body_json(response).await;
    assert_eq!(cart["id"], cleared["id"]);
}

#[tokio::test]
async fn clear_missing_cart_is_not_found() {
    let app = TestApp::new().await;

    let response = app.request(Method::DELETE, "/cart/nobody", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn carts_are_isolated_per_owner() {
    let app = TestApp::new().await;

    app.request(Method::POST, "/cart/user_1", Some(dosa(2)))
        .await;
    let response = app.request(Method::GET, "/cart/user_2", None).await;
    let cart = body_json(response).await;
    assert_eq!(cart["total_items"], 0);
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn add_item_validates_payload() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/cart/user_1",
            Some(json!({
                "item_id": "dosa",
                "name": "Masala Dosa",
                "unit_price": "60",
                "quantity": 0
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::POST,
            "/cart/user_1",
            Some(json!({
                "item_id": "",
                "name": "Nameless",
                "unit_price": "10",
                "quantity": 1
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::POST,
            "/cart/user_1",
            Some(json!({
                "item_id": "weird",
                "name": "Negative",
                "unit_price": "-5",
                "quantity": 1
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
