use crate::client::api::CartApi;
use crate::client::notify::ToastSink;
use crate::client::storage::{CartSnapshot, LocalStore};
use crate::client::ClientError;
use crate::entities::{cart_item, order::PaymentMethod};
use crate::services::carts::CartResponse;
use crate::services::orders::{compute_charges, DeliveryInfo, OrderResponse};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// One cart line as the client sees it. `id` is the catalog entry id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    #[serde(default)]
    pub image_ref: String,
    #[serde(default)]
    pub restaurant_id: String,
    #[serde(default)]
    pub restaurant_name: String,
}

impl From<cart_item::Model> for CartLine {
    fn from(model: cart_item::Model) -> Self {
        Self {
            id: model.item_id,
            name: model.name,
            unit_price: model.unit_price,
            quantity: model.quantity,
            image_ref: model.image_ref,
            restaurant_id: model.restaurant_id,
            restaurant_name: model.restaurant_name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    pub items: Vec<CartLine>,
    pub total_items: i32,
    pub total_amount: Decimal,
    #[serde(skip)]
    pub is_loading: bool,
}

#[derive(Debug, Clone)]
pub enum CartAction {
    Load(Vec<CartLine>),
    AddItem(CartLine),
    UpdateQuantity { id: String, quantity: i32 },
    RemoveItem(String),
    Clear,
    SetLoading(bool),
}

/// Pure reducer. Totals are adjusted by deltas; the invariant that they equal
/// a full recompute over the items is property-tested.
pub fn reduce(state: &CartState, action: CartAction) -> CartState {
    let mut next = state.clone();
    match action {
        CartAction::Load(items) => {
            next.total_items = items.iter().map(|line| line.quantity).sum();
            next.total_amount = items
                .iter()
                .map(|line| line.unit_price * Decimal::from(line.quantity))
                .sum();
            next.items = items;
            next.is_loading = false;
        }
        CartAction::AddItem(line) => {
            next.total_items += line.quantity;
            next.total_amount += line.unit_price * Decimal::from(line.quantity);
            if let Some(existing) = next.items.iter_mut().find(|l| l.id == line.id) {
                existing.quantity += line.quantity;
            } else {
                next.items.push(line);
            }
        }
        CartAction::UpdateQuantity { id, quantity } => {
            if let Some(existing) = next.items.iter_mut().find(|l| l.id == id) {
                next.total_items += quantity - existing.quantity;
                next.total_amount +=
                    existing.unit_price * Decimal::from(quantity - existing.quantity);
                existing.quantity = quantity;
            }
        }
        CartAction::RemoveItem(id) => {
            if let Some(index) = next.items.iter().position(|l| l.id == id) {
                let removed = next.items.remove(index);
                next.total_items -= removed.quantity;
                next.total_amount -= removed.unit_price * Decimal::from(removed.quantity);
            }
        }
        CartAction::Clear => {
            next.items.clear();
            next.total_items = 0;
            next.total_amount = Decimal::ZERO;
        }
        CartAction::SetLoading(loading) => {
            next.is_loading = loading;
        }
    }
    next
}

/// Order synthesized entirely on the client for anonymous sessions. Its
/// durability is whatever the local store provides, nothing more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalOrder {
    pub id: String,
    pub items: Vec<CartLine>,
    pub total_amount: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub final_amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl LocalOrder {
    /// Same fee and tax arithmetic as the server; timestamp id.
    pub fn new(items: Vec<CartLine>, total_amount: Decimal) -> Self {
        let (tax, delivery_fee, final_amount) = compute_charges(total_amount);
        let now = Utc::now();
        Self {
            id: now.timestamp_millis().to_string(),
            items,
            total_amount,
            tax,
            delivery_fee,
            final_amount,
            status: "pending".to_string(),
            created_at: now,
        }
    }
}

/// Client-side cart.
///
/// Signed-in sessions treat the server as the source of truth but apply
/// mutations optimistically; anonymous sessions live entirely in the local
/// snapshot store.
pub struct CartStore {
    api: Arc<dyn CartApi>,
    local: LocalStore,
    toasts: ToastSink,
    state: CartState,
    session: Option<String>,
    loaded: bool,
}

impl CartStore {
    pub fn new(api: Arc<dyn CartApi>, local: LocalStore, toasts: ToastSink) -> Self {
        Self {
            api,
            local,
            toasts,
            state: CartState::default(),
            session: None,
            loaded: false,
        }
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn set_session(&mut self, owner_id: Option<String>) {
        self.session = owner_id;
    }

    fn apply(&mut self, action: CartAction) {
        self.state = reduce(&self.state, action);
    }

    fn persist_snapshot(&self) {
        let snapshot = CartSnapshot {
            items: self.state.items.clone(),
            total_items: self.state.total_items,
            total_amount: self.state.total_amount,
        };
        if let Err(e) = self.local.save_cart(&snapshot) {
            warn!("Failed to persist cart snapshot: {}", e);
        }
    }

    /// One-shot initial load. A signed-in session takes the remote cart
    /// verbatim over any local draft; anonymous sessions restore the snapshot.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.apply(CartAction::SetLoading(true));

        if let Some(owner_id) = self.session.clone() {
            match self.api.fetch_cart(&owner_id).await {
                Ok(remote) => {
                    let items = remote_lines(remote);
                    self.apply(CartAction::Load(items));
                }
                Err(e) => {
                    warn!("Initial cart fetch failed: {}", e);
                    self.apply(CartAction::SetLoading(false));
                }
            }
        } else {
            let items = match self.local.load_cart()? {
                Some(snapshot) => snapshot.items,
                None => Vec::new(),
            };
            self.apply(CartAction::Load(items));
        }

        self.loaded = true;
        Ok(())
    }

    /// Re-checks the remote cart after the initial load. Local items are
    /// replayed through the add-item endpoint only when the remote reports
    /// not-found; an existing remote cart, even an empty one, wins and any
    /// local-only items are dropped.
    pub async fn reconcile(&mut self) {
        if !self.loaded {
            return;
        }
        let Some(owner_id) = self.session.clone() else {
            return;
        };

        match self.api.fetch_cart(&owner_id).await {
            Ok(remote) => {
                let items = remote_lines(remote);
                self.apply(CartAction::Load(items));
            }
            Err(e) if e.is_not_found() => {
                debug!("Remote cart missing, replaying {} local items", self.state.items.len());
                let lines = self.state.items.clone();
                for line in &lines {
                    if let Err(e) = self.api.add_item(&owner_id, line).await {
                        warn!("Replay of item {} failed: {}", line.id, e);
                    }
                }
            }
            Err(e) => {
                warn!("Cart reconciliation fetch failed: {}", e);
            }
        }
    }

    /// Adds a line to the cart. Signed-in sessions post to the server first
    /// but apply the local add regardless of the remote outcome.
    pub async fn add_item(&mut self, line: CartLine) {
        if let Some(owner_id) = self.session.clone() {
            match self.api.add_item(&owner_id, &line).await {
                Ok(_) => self.toasts.success(format!("{} added to cart", line.name)),
                Err(e) => {
                    warn!("Remote add of item {} failed: {}", line.id, e);
                    self.toasts.error("Could not update your cart on the server");
                }
            }
            self.apply(CartAction::AddItem(line));
        } else {
            self.toasts.success(format!("{} added to cart", line.name));
            self.apply(CartAction::AddItem(line));
            self.persist_snapshot();
        }
    }

    /// Local-only quantity change; a value below 1 removes the line.
    pub fn update_quantity(&mut self, id: &str, quantity: i32) {
        if quantity < 1 {
            self.remove_item(id);
            return;
        }
        self.apply(CartAction::UpdateQuantity {
            id: id.to_string(),
            quantity,
        });
        if self.session.is_none() {
            self.persist_snapshot();
        }
    }

    /// Local-only removal.
    pub fn remove_item(&mut self, id: &str) {
        self.apply(CartAction::RemoveItem(id.to_string()));
        if self.session.is_none() {
            self.persist_snapshot();
        }
    }

    /// Empties the cart. Signed-in sessions await the remote delete first;
    /// its result is logged but never surfaced.
    pub async fn clear(&mut self) {
        if let Some(owner_id) = self.session.clone() {
            if let Err(e) = self.api.clear_cart(&owner_id).await {
                warn!("Remote cart clear failed: {}", e);
            }
            self.apply(CartAction::Clear);
        } else {
            if let Err(e) = self.local.delete_cart() {
                warn!("Failed to delete cart snapshot: {}", e);
            }
            self.apply(CartAction::Clear);
        }
    }

    /// Places an order through the server and clears the local cart on
    /// success. Requires a session.
    pub async fn place_order(
        &mut self,
        delivery_info: &DeliveryInfo,
        payment_method: PaymentMethod,
    ) -> Result<OrderResponse, ClientError> {
        let owner_id = self.session.clone().ok_or(ClientError::Api {
            status: 401,
            message: "sign in to place an order".to_string(),
        })?;

        let order = self
            .api
            .place_order(&owner_id, delivery_info, payment_method)
            .await?;

        self.apply(CartAction::Clear);
        Ok(order)
    }

    /// Anonymous order placement: synthesizes a `LocalOrder`, appends it to
    /// the local order list and clears the cart.
    pub fn place_order_local(&mut self) -> Result<LocalOrder, ClientError> {
        if self.state.items.is_empty() {
            return Err(ClientError::EmptyCart);
        }

        let order = LocalOrder::new(self.state.items.clone(), self.state.total_amount);
        self.local.append_order(&order)?;
        self.local.delete_cart()?;
        self.apply(CartAction::Clear);
        Ok(order)
    }
}

fn remote_lines(remote: CartResponse) -> Vec<CartLine> {
    remote.items.into_iter().map(CartLine::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(id: &str, unit_price: Decimal, quantity: i32) -> CartLine {
        CartLine {
            id: id.to_string(),
            name: id.to_string(),
            unit_price,
            quantity,
            image_ref: String::new(),
            restaurant_id: "r1".to_string(),
            restaurant_name: "Udupi".to_string(),
        }
    }

    fn recomputed(state: &CartState) -> (i32, Decimal) {
        (
            state.items.iter().map(|l| l.quantity).sum(),
            state
                .items
                .iter()
                .map(|l| l.unit_price * Decimal::from(l.quantity))
                .sum(),
        )
    }

    #[test]
    fn add_merges_by_item_id() {
        let state = CartState::default();
        let state = reduce(&state, CartAction::AddItem(line("dosa", dec!(60), 1)));
        let state = reduce(&state, CartAction::AddItem(line("dosa", dec!(60), 2)));

        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].quantity, 3);
        assert_eq!(state.total_items, 3);
        assert_eq!(state.total_amount, dec!(180));
    }

    #[test]
    fn update_quantity_adjusts_totals_by_delta() {
        let state = reduce(
            &CartState::default(),
            CartAction::AddItem(line("idli", dec!(30), 4)),
        );
        let state = reduce(
            &state,
            CartAction::UpdateQuantity {
                id: "idli".to_string(),
                quantity: 1,
            },
        );
        assert_eq!(state.total_items, 1);
        assert_eq!(state.total_amount, dec!(30));
        assert_eq!(recomputed(&state), (state.total_items, state.total_amount));
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let state = reduce(
            &CartState::default(),
            CartAction::AddItem(line("dosa", dec!(60), 1)),
        );
        let after_update = reduce(
            &state,
            CartAction::UpdateQuantity {
                id: "ghost".to_string(),
                quantity: 5,
            },
        );
        let after_remove = reduce(&state, CartAction::RemoveItem("ghost".to_string()));
        assert_eq!(after_update, state);
        assert_eq!(after_remove, state);
    }

    #[test]
    fn remove_and_clear_zero_out() {
        let state = reduce(
            &CartState::default(),
            CartAction::AddItem(line("dosa", dec!(60), 2)),
        );
        let state = reduce(&state, CartAction::AddItem(line("idli", dec!(30), 1)));

        let removed = reduce(&state, CartAction::RemoveItem("dosa".to_string()));
        assert_eq!(removed.total_items, 1);
        assert_eq!(removed.total_amount, dec!(30));

        let cleared = reduce(&state, CartAction::Clear);
        assert!(cleared.items.is_empty());
        assert_eq!(cleared.total_items, 0);
        assert_eq!(cleared.total_amount, Decimal::ZERO);
    }

    #[test]
    fn load_replaces_state_and_recomputes() {
        let state = reduce(
            &CartState::default(),
            CartAction::AddItem(line("stale", dec!(10), 9)),
        );
        let state = reduce(
            &state,
            CartAction::Load(vec![line("dosa", dec!(60), 2), line("chai", dec!(12.50), 2)]),
        );
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.total_items, 4);
        assert_eq!(state.total_amount, dec!(145.00));
        assert!(!state.is_loading);
    }

    #[test]
    fn local_order_uses_server_arithmetic() {
        let order = LocalOrder::new(vec![line("dosa", dec!(60), 3)], dec!(180));
        assert_eq!(order.tax, dec!(9.00));
        assert_eq!(order.delivery_fee, dec!(40));
        assert_eq!(order.final_amount, dec!(229.00));
        assert_eq!(order.status, "pending");
        assert!(order.id.chars().all(|c| c.is_ascii_digit()));
    }
}
