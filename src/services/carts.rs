use crate::{
    entities::{cart, cart_item, Cart, CartItem},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Shopping cart service.
///
/// Carts are keyed by owner id (the opaque identifier issued by the external
/// identity provider) and created on first access. Stored totals are a pure
/// function of the stored items: every mutation recomputes both inside one
/// transaction, so they can never diverge.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// Item payload for adding to a cart. `item_id` is the catalog entry id and
/// acts as the merge key within the cart.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddItemInput {
    #[validate(length(min = 1))]
    pub item_id: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub unit_price: Decimal,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[serde(default)]
    pub image_ref: String,
    #[serde(default)]
    pub restaurant_id: String,
    #[serde(default)]
    pub restaurant_name: String,
}

/// Cart representation returned by every cart operation. Items are in
/// insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub id: Uuid,
    pub owner_id: String,
    pub items: Vec<cart_item::Model>,
    pub total_items: i32,
    pub total_amount: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl CartResponse {
    fn from_parts(cart: cart::Model, items: Vec<cart_item::Model>) -> Self {
        Self {
            id: cart.id,
            owner_id: cart.owner_id,
            items,
            total_items: cart.total_items,
            total_amount: cart.total_amount,
            updated_at: cart.updated_at,
        }
    }
}

/// Totals derived from a full scan of the cart's items.
pub(crate) fn compute_totals(items: &[cart_item::Model]) -> (i32, Decimal) {
    let total_items = items.iter().map(|item| item.quantity).sum();
    let total_amount = items
        .iter()
        .map(|item| item.unit_price * Decimal::from(item.quantity))
        .sum();
    (total_items, total_amount)
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Retrieves the owner's cart, creating an empty one if none exists yet.
    #[instrument(skip(self))]
    pub async fn get_or_create_cart(&self, owner_id: &str) -> Result<CartResponse, ServiceError> {
        let existing = Cart::find()
            .filter(cart::Column::OwnerId.eq(owner_id))
            .one(&*self.db)
            .await?;

        let cart = match existing {
            Some(cart) => cart,
            None => {
                let cart = self.create_empty_cart(&*self.db, owner_id).await?;
                self.event_sender.send_or_log(Event::CartCreated(cart.id)).await;
                info!("Created cart for owner {}", owner_id);
                cart
            }
        };

        let items = self.load_items(&*self.db, cart.id).await?;
        Ok(CartResponse::from_parts(cart, items))
    }

    /// Adds an item to the owner's cart, creating the cart if absent.
    ///
    /// If the catalog item is already present the quantities are merged onto
    /// the existing line; a second line for the same item is never created.
    #[instrument(skip(self, input), fields(item_id = %input.item_id))]
    pub async fn add_item(
        &self,
        owner_id: &str,
        input: AddItemInput,
    ) -> Result<CartResponse, ServiceError> {
        if input.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "unit_price must not be negative".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let (cart, created) = match Cart::find()
            .filter(cart::Column::OwnerId.eq(owner_id))
            .one(&txn)
            .await?
        {
            Some(cart) => (cart, false),
            None => (self.create_empty_cart(&txn, owner_id).await?, true),
        };
        let cart_id = cart.id;

        let items = self.load_items(&txn, cart_id).await?;
        let existing = items.iter().find(|line| line.item_id == input.item_id);

        if let Some(line) = existing {
            let new_quantity = line.quantity + input.quantity;
            let mut line: cart_item::ActiveModel = line.clone().into();
            line.quantity = Set(new_quantity);
            line.updated_at = Set(Utc::now());
            line.update(&txn).await?;
        } else {
            let position = items.iter().map(|line| line.position).max().unwrap_or(-1) + 1;
            let line = cart_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart_id),
                item_id: Set(input.item_id.clone()),
                name: Set(input.name),
                unit_price: Set(input.unit_price),
                quantity: Set(input.quantity),
                image_ref: Set(input.image_ref),
                restaurant_id: Set(input.restaurant_id),
                restaurant_name: Set(input.restaurant_name),
                position: Set(position),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
            };
            line.insert(&txn).await?;
        }

        let cart = self.recalculate_cart_totals(&txn, cart_id).await?;
        let items = self.load_items(&txn, cart_id).await?;
        txn.commit().await?;

        if created {
            self.event_sender.send_or_log(Event::CartCreated(cart_id)).await;
        }
        self.event_sender
            .send_or_log(Event::CartItemAdded {
                cart_id,
                item_id: input.item_id.clone(),
            })
            .await;

        info!(
            "Added item to cart {}: {} x{}",
            cart_id, input.item_id, input.quantity
        );
        Ok(CartResponse::from_parts(cart, items))
    }

    /// Sets the quantity of one cart line.
    #[instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        owner_id: &str,
        item_id: &str,
        quantity: i32,
    ) -> Result<CartResponse, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "quantity must be at least 1".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let cart = self.find_cart(&txn, owner_id).await?;
        let cart_id = cart.id;
        let line = self.find_line(&txn, cart_id, item_id).await?;

        let mut line: cart_item::ActiveModel = line.into();
        line.quantity = Set(quantity);
        line.updated_at = Set(Utc::now());
        line.update(&txn).await?;

        let cart = self.recalculate_cart_totals(&txn, cart_id).await?;
        let items = self.load_items(&txn, cart_id).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemUpdated {
                cart_id,
                item_id: item_id.to_string(),
            })
            .await;

        Ok(CartResponse::from_parts(cart, items))
    }

    /// Removes one line from the cart.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        owner_id: &str,
        item_id: &str,
    ) -> Result<CartResponse, ServiceError> {
        let txn = self.db.begin().await?;

        let cart = self.find_cart(&txn, owner_id).await?;
        let cart_id = cart.id;
        let line = self.find_line(&txn, cart_id, item_id).await?;

        CartItem::delete_by_id(line.id).exec(&txn).await?;

        let cart = self.recalculate_cart_totals(&txn, cart_id).await?;
        let items = self.load_items(&txn, cart_id).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemRemoved {
                cart_id,
                item_id: item_id.to_string(),
            })
            .await;

        Ok(CartResponse::from_parts(cart, items))
    }

    /// Deletes every item and zeroes the totals. The cart row itself is kept.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, owner_id: &str) -> Result<CartResponse, ServiceError> {
        let txn = self.db.begin().await?;

        let cart = self.find_cart(&txn, owner_id).await?;
        let cart_id = cart.id;

        CartItem::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(&txn)
            .await?;

        let mut active: cart::ActiveModel = cart.into();
        active.total_items = Set(0);
        active.total_amount = Set(Decimal::ZERO);
        active.updated_at = Set(Utc::now());
        let cart = active.update(&txn).await?;

        txn.commit().await?;

        self.event_sender.send_or_log(Event::CartCleared(cart_id)).await;

        info!("Cleared cart: {}", cart_id);
        Ok(CartResponse::from_parts(cart, Vec::new()))
    }

    async fn create_empty_cart(
        &self,
        conn: &impl sea_orm::ConnectionTrait,
        owner_id: &str,
    ) -> Result<cart::Model, ServiceError> {
        let cart = cart::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id.to_string()),
            total_items: Set(0),
            total_amount: Set(Decimal::ZERO),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };
        Ok(cart.insert(conn).await?)
    }

    async fn find_cart(
        &self,
        conn: &impl sea_orm::ConnectionTrait,
        owner_id: &str,
    ) -> Result<cart::Model, ServiceError> {
        Cart::find()
            .filter(cart::Column::OwnerId.eq(owner_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart for owner {} not found", owner_id)))
    }

    async fn find_line(
        &self,
        conn: &impl sea_orm::ConnectionTrait,
        cart_id: Uuid,
        item_id: &str,
    ) -> Result<cart_item::Model, ServiceError> {
        CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::ItemId.eq(item_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found in cart", item_id)))
    }

    async fn load_items(
        &self,
        conn: &impl sea_orm::ConnectionTrait,
        cart_id: Uuid,
    ) -> Result<Vec<cart_item::Model>, ServiceError> {
        Ok(CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .order_by_asc(cart_item::Column::Position)
            .all(conn)
            .await?)
    }

    /// Full recompute of the stored totals from the stored items.
    async fn recalculate_cart_totals(
        &self,
        conn: &impl sea_orm::ConnectionTrait,
        cart_id: Uuid,
    ) -> Result<cart::Model, ServiceError> {
        let items = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .all(conn)
            .await?;

        let (total_items, total_amount) = compute_totals(&items);

        let mut cart: cart::ActiveModel = Cart::find_by_id(cart_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))?
            .into();

        cart.total_items = Set(total_items);
        cart.total_amount = Set(total_amount);
        cart.updated_at = Set(Utc::now());

        Ok(cart.update(conn).await?)
    }
}
