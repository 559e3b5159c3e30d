mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use quickbite_api::entities::Order;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::{json, Value};
use std::str::FromStr;

fn amount(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("amount should be a string"))
        .expect("amount should parse as a decimal")
}

fn delivery() -> Value {
    json!({
        "name": "Asha",
        "phone": "98765 43210",
        "address": "12 MG Road",
        "instructions": "Ring twice"
    })
}

async fn seed_cart(app: &TestApp, owner: &str) {
    // dosa 60 x2 + idli 30 x2 = 180
    app.request(
        Method::POST,
        &format!("/cart/{owner}"),
        Some(json!({
            "item_id": "dosa",
            "name": "Masala Dosa",
            "unit_price": "60",
            "quantity": 2,
            "restaurant_id": "r1",
            "restaurant_name": "Udupi Palace"
        })),
    )
    .await;
    app.request(
        Method::POST,
        &format!("/cart/{owner}"),
        Some(json!({
            "item_id": "idli",
            "name": "Idli",
            "unit_price": "30",
            "quantity": 2,
            "restaurant_id": "r1",
            "restaurant_name": "Udupi Palace"
        })),
    )
    .await;
}

async fn place_order(app: &TestApp, owner: &str) -> Value {
    let response = app
        .request(
            Method::POST,
            &format!("/orders/{owner}"),
            Some(json!({
                "delivery_info": delivery(),
                "payment_method": "cod"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn order_charges_follow_cart_total() {
    let app = TestApp::new().await;
    seed_cart(&app, "user_1").await;

    let body = place_order(&app, "user_1").await;
    let order = &body["order"];

    assert_eq!(amount(&order["total_amount"]), dec!(180));
    assert_eq!(amount(&order["tax"]), dec!(9.00));
    assert_eq!(amount(&order["delivery_fee"]), dec!(40));
    assert_eq!(amount(&order["final_amount"]), dec!(229.00));
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment_method"], "cod");
    assert!(order["order_number"].as_str().unwrap().starts_with("ORD"));
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
    assert_eq!(order["delivery_info"]["name"], "Asha");
}

#[tokio::test]
async fn placing_an_order_empties_the_cart() {
    let app = TestApp::new().await;
    seed_cart(&app, "user_1").await;

    place_order(&app, "user_1").await;

    let response = app.request(Method::GET, "/cart/user_1", None).await;
    let cart = body_json(response).await;
    assert_eq!(cart["total_items"], 0);
    assert_eq!(amount(&cart["total_amount"]), Decimal::ZERO);
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_cart_rejects_order_and_writes_nothing() {
    let app = TestApp::new().await;

    // No cart at all
    let response = app
        .request(
            Method::POST,
            "/orders/user_1",
            Some(json!({"delivery_info": delivery(), "payment_method": "card"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Cart exists but is empty
    app.request(Method::GET, "/cart/user_1", None).await;
    let response = app
        .request(
            Method::POST,
            "/orders/user_1",
            Some(json!({"delivery_info": delivery(), "payment_method": "card"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Cart is empty");

    let orders = Order::find().all(&*app.state.db).await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn invalid_delivery_info_is_rejected() {
    let app = TestApp::new().await;
    seed_cart(&app, "user_1").await;

    let response = app
        .request(
            Method::POST,
            "/orders/user_1",
            Some(json!({
                "delivery_info": {
                    "name": "Asha",
                    "phone": "12345",
                    "address": "12 MG Road"
                },
                "payment_method": "upi"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Rejected orders leave the cart untouched
    let response = app.request(Method::GET, "/cart/user_1", None).await;
    let cart = body_json(response).await;
    assert_eq!(cart["total_items"], 4);
}

#[tokio::test]
async fn history_is_newest_first_without_items() {
    let app = TestApp::new().await;

    seed_cart(&app, "user_1").await;
    let first = place_order(&app, "user_1").await;
    seed_cart(&app, "user_1").await;
    let second = place_order(&app, "user_1").await;

    let response = app.request(Method::GET, "/orders/user_1", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await;
    let entries = history.as_array().unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], second["order"]["id"]);
    assert_eq!(entries[1]["id"], first["order"]["id"]);
    assert!(entries[0].get("items").is_none());
}

#[tokio::test]
async fn details_are_scoped_to_the_owner() {
    let app = TestApp::new().await;

    seed_cart(&app, "user_1").await;
    let body = place_order(&app, "user_1").await;
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(Method::GET, &format!("/orders/user_1/{order_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["id"], body["order"]["id"]);
    assert_eq!(order["items"].as_array().unwrap().len(), 2);

    // Another owner gets a plain 404, not a permission error
    let response = app
        .request(Method::GET, &format!("/orders/user_2/{order_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/orders/user_1/00000000-0000-0000-0000-000000000000",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_can_move_while_amounts_stay_frozen() {
    let app = TestApp::new().await;

    seed_cart(&app, "user_1").await;
    let body = place_order(&app, "user_1").await;
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/orders/user_1/{order_id}/status"),
            Some(json!({"status": "on_the_way"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["status"], "on_the_way");
    assert_eq!(amount(&order["final_amount"]), dec!(229.00));

    // Cross-owner status changes are rejected the same way as reads
    let response = app
        .request(
            Method::PUT,
            &format!("/orders/user_2/{order_id}/status"),
            Some(json!({"status": "delivered"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_numbers_are_unique_per_order() {
    let app = TestApp::new().await;

    seed_cart(&app, "user_1").await;
    let first = place_order(&app, "user_1").await;
    seed_cart(&app, "user_1").await;
    let second = place_order(&app, "user_1").await;

    assert_ne!(first["order"]["order_number"], second["order"]["order_number"]);
}
