use crate::{
    entities::{
        cart, cart_item,
        order::{self, OrderStatus, PaymentMethod},
        order_item, Cart, CartItem, Order, OrderItem,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Tax applied to the cart total, exact decimal arithmetic with no
/// intermediate rounding.
pub const TAX_RATE: Decimal = dec!(0.05);

/// Flat delivery fee added to every order.
pub const DELIVERY_FEE: Decimal = dec!(40);

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{10}$").expect("phone pattern is valid"));

/// Order placement and retrieval.
///
/// Amounts and delivery details are frozen at creation; only the status may
/// change afterwards. Placement and the cart clear run in one transaction so
/// an order can never exist alongside the cart it came from.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// Delivery details collected at checkout. The phone must contain exactly ten
/// digits once spaces and dashes are stripped.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeliveryInfo {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(custom(function = validate_phone))]
    pub phone: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let normalized: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    if PHONE_RE.is_match(&normalized) {
        Ok(())
    } else {
        Err(ValidationError::new("phone must be a 10 digit number"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderInput {
    #[validate(nested)]
    pub delivery_info: DeliveryInfo,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Full order representation including the item snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub owner_id: String,
    pub items: Vec<order_item::Model>,
    pub total_amount: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub final_amount: Decimal,
    pub delivery_info: DeliveryInfo,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderResponse {
    fn from_parts(order: order::Model, items: Vec<order_item::Model>) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            owner_id: order.owner_id,
            items,
            total_amount: order.total_amount,
            tax: order.tax,
            delivery_fee: order.delivery_fee,
            final_amount: order.final_amount,
            delivery_info: DeliveryInfo {
                name: order.delivery_name,
                phone: order.delivery_phone,
                address: order.delivery_address,
                instructions: order.delivery_instructions,
            },
            payment_method: order.payment_method,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

/// History entry shape; item lines are deliberately omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: Uuid,
    pub order_number: String,
    pub total_amount: Decimal,
    pub final_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<order::Model> for OrderSummary {
    fn from(order: order::Model) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            total_amount: order.total_amount,
            final_amount: order.final_amount,
            payment_method: order.payment_method,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

/// Tax, fee and final amount derived from a cart total.
pub fn compute_charges(total_amount: Decimal) -> (Decimal, Decimal, Decimal) {
    let tax = total_amount * TAX_RATE;
    let final_amount = total_amount + tax + DELIVERY_FEE;
    (tax, DELIVERY_FEE, final_amount)
}

/// `ORD` + millisecond timestamp + zero-padded 3 digit random suffix. The
/// timestamp component makes collisions negligible, so they are not retried.
pub fn generate_order_number() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("ORD{}{:03}", Utc::now().timestamp_millis(), suffix)
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Places an order from the owner's current cart.
    ///
    /// Fails with `EmptyCart` before any write when the cart is missing or has
    /// no items. On success the order rows are inserted and the cart is
    /// emptied within the same transaction.
    #[instrument(skip(self, input))]
    pub async fn create_order(
        &self,
        owner_id: &str,
        input: CreateOrderInput,
    ) -> Result<OrderResponse, ServiceError> {
        let txn = self.db.begin().await?;

        let cart = Cart::find()
            .filter(cart::Column::OwnerId.eq(owner_id))
            .one(&txn)
            .await?
            .ok_or(ServiceError::EmptyCart)?;

        let lines = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .order_by_asc(cart_item::Column::Position)
            .all(&txn)
            .await?;
        if lines.is_empty() {
            return Err(ServiceError::EmptyCart);
        }

        let total_amount = cart.total_amount;
        let (tax, delivery_fee, final_amount) = compute_charges(total_amount);
        let order_id = Uuid::new_v4();
        let now = Utc::now();

        let order = order::ActiveModel {
            id: Set(order_id),
            owner_id: Set(owner_id.to_string()),
            order_number: Set(generate_order_number()),
            total_amount: Set(total_amount),
            tax: Set(tax),
            delivery_fee: Set(delivery_fee),
            final_amount: Set(final_amount),
            delivery_name: Set(input.delivery_info.name),
            delivery_phone: Set(input.delivery_info.phone),
            delivery_address: Set(input.delivery_info.address),
            delivery_instructions: Set(input.delivery_info.instructions),
            payment_method: Set(input.payment_method),
            status: Set(OrderStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let order = order.insert(&txn).await?;

        for line in &lines {
            let snapshot = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                item_id: Set(line.item_id.clone()),
                name: Set(line.name.clone()),
                unit_price: Set(line.unit_price),
                quantity: Set(line.quantity),
                image_ref: Set(line.image_ref.clone()),
                restaurant_id: Set(line.restaurant_id.clone()),
                restaurant_name: Set(line.restaurant_name.clone()),
                position: Set(line.position),
                created_at: Set(now),
            };
            snapshot.insert(&txn).await?;
        }

        // Empty the cart in the same transaction as the order insert.
        CartItem::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .exec(&txn)
            .await?;
        let mut cart: cart::ActiveModel = cart.into();
        cart.total_items = Set(0);
        cart.total_amount = Set(Decimal::ZERO);
        cart.updated_at = Set(now);
        cart.update(&txn).await?;

        txn.commit().await?;

        self.event_sender.send_or_log(Event::OrderCreated(order_id)).await;

        info!(
            "Created order {} for owner {}: total {} final {}",
            order.order_number, owner_id, total_amount, final_amount
        );

        let items = self.load_items(order_id).await?;
        Ok(OrderResponse::from_parts(order, items))
    }

    /// Lists the owner's orders newest first, without item lines.
    #[instrument(skip(self))]
    pub async fn get_order_history(
        &self,
        owner_id: &str,
    ) -> Result<Vec<OrderSummary>, ServiceError> {
        let orders = Order::find()
            .filter(order::Column::OwnerId.eq(owner_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(orders.into_iter().map(OrderSummary::from).collect())
    }

    /// Loads one order with its items. Missing orders and orders that belong
    /// to another owner are indistinguishable to the caller.
    #[instrument(skip(self))]
    pub async fn get_order_details(
        &self,
        owner_id: &str,
        order_id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        let order = self.find_owned(owner_id, order_id).await?;
        let items = self.load_items(order_id).await?;
        Ok(OrderResponse::from_parts(order, items))
    }

    /// Moves an order to a new status. Amounts and delivery details stay
    /// frozen.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        owner_id: &str,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderResponse, ServiceError> {
        let order = self.find_owned(owner_id, order_id).await?;
        let old_status = order.status;

        let mut active: order::ActiveModel = order.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now());
        let order = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id,
                old_status: old_status.as_str().to_string(),
                new_status: status.as_str().to_string(),
            })
            .await;

        let items = self.load_items(order_id).await?;
        Ok(OrderResponse::from_parts(order, items))
    }

    async fn find_owned(
        &self,
        owner_id: &str,
        order_id: Uuid,
    ) -> Result<order::Model, ServiceError> {
        Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .filter(|order| order.owner_id == owner_id)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    async fn load_items(&self, order_id: Uuid) -> Result<Vec<order_item::Model>, ServiceError> {
        Ok(OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::Position)
            .all(&*self.db)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charges_for_sample_totals() {
        let (tax, fee, final_amount) = compute_charges(dec!(180));
        assert_eq!(tax, dec!(9.00));
        assert_eq!(fee, dec!(40));
        assert_eq!(final_amount, dec!(229.00));

        let (tax, fee, final_amount) = compute_charges(dec!(200));
        assert_eq!(tax, dec!(10.00));
        assert_eq!(fee, dec!(40));
        assert_eq!(final_amount, dec!(250.00));
    }

    #[test]
    fn tax_is_exact_decimal_arithmetic() {
        let (tax, _, final_amount) = compute_charges(dec!(99.99));
        assert_eq!(tax, dec!(4.9995));
        assert_eq!(final_amount, dec!(144.9895));
    }

    #[test]
    fn order_number_shape() {
        let number = generate_order_number();
        assert!(number.starts_with("ORD"));
        let digits = &number[3..];
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        // 13 digit millisecond timestamp plus 3 digit suffix
        assert_eq!(digits.len(), 16);
    }

    #[test]
    fn phone_validation_strips_spaces_and_dashes() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("98765 43210").is_ok());
        assert!(validate_phone("98765-43210").is_ok());
        assert!(validate_phone("987654321").is_err());
        assert!(validate_phone("98765432100").is_err());
        assert!(validate_phone("98765x3210").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn delivery_info_validation() {
        let valid = DeliveryInfo {
            name: "Asha".to_string(),
            phone: "9876543210".to_string(),
            address: "12 MG Road".to_string(),
            instructions: None,
        };
        assert!(valid.validate().is_ok());

        let invalid = DeliveryInfo {
            name: String::new(),
            phone: "123".to_string(),
            address: String::new(),
            instructions: None,
        };
        let errors = invalid.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("phone"));
        assert!(errors.field_errors().contains_key("address"));
    }
}
