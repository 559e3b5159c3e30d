//! Client-side cart and checkout machinery.
//!
//! Mirrors the behaviour a storefront needs against the REST surface: a pure
//! cart reducer with optimistic remote sync, a file-backed snapshot store for
//! anonymous sessions, and a linear three-step checkout flow.

pub mod api;
pub mod checkout;
pub mod notify;
pub mod storage;
pub mod store;

pub use api::{CartApi, RestCartApi};
pub use checkout::{CheckoutError, CheckoutFlow, CheckoutStep, DeliveryInfoErrors};
pub use notify::{Toast, ToastSink};
pub use storage::{CartSnapshot, LocalStore};
pub use store::{CartAction, CartLine, CartState, CartStore, LocalOrder};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("local storage error: {0}")]
    Storage(String),

    #[error("cart is empty")]
    EmptyCart,

    #[error("delivery details failed validation")]
    Validation(DeliveryInfoErrors),
}

impl ClientError {
    /// True when the server answered with a 404, as opposed to a transport
    /// failure or another rejection.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }
}
