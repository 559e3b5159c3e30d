pub mod carts;
pub mod common;
pub mod orders;
pub mod preferences;

pub use carts::carts_routes;
pub use orders::orders_routes;
pub use preferences::preferences_routes;

use crate::events::EventSender;
use crate::services::{CartService, OrderService, PreferenceService};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Aggregate of the services the HTTP handlers depend on.
#[derive(Clone)]
pub struct AppServices {
    pub carts: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub preferences: Arc<PreferenceService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self {
            carts: Arc::new(CartService::new(db.clone(), event_sender.clone())),
            orders: Arc::new(OrderService::new(db.clone(), event_sender.clone())),
            preferences: Arc::new(PreferenceService::new(db, event_sender)),
        }
    }
}
