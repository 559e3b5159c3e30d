use crate::client::store::CartStore;
use crate::client::ClientError;
use crate::entities::order::PaymentMethod;
use crate::services::orders::{validate_phone, DeliveryInfo, OrderResponse};
use serde::Serialize;
use tracing::warn;

/// Linear checkout steps. Backward navigation is always allowed; the flow is
/// never persisted, a restart begins at `Cart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckoutStep {
    Cart,
    Delivery,
    Payment,
}

impl CheckoutStep {
    pub fn index(&self) -> u8 {
        match self {
            CheckoutStep::Cart => 0,
            CheckoutStep::Delivery => 1,
            CheckoutStep::Payment => 2,
        }
    }
}

/// Per-field delivery validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryInfoErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl DeliveryInfoErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.address.is_none()
    }
}

/// Field-by-field delivery validation: non-empty name and address, phone with
/// exactly ten digits after stripping spaces and dashes.
pub fn validate_delivery(info: &DeliveryInfo) -> Result<(), DeliveryInfoErrors> {
    let mut errors = DeliveryInfoErrors::default();
    if info.name.trim().is_empty() {
        errors.name = Some("Name is required".to_string());
    }
    if validate_phone(&info.phone).is_err() {
        errors.phone = Some("Enter a valid 10 digit phone number".to_string());
    }
    if info.address.trim().is_empty() {
        errors.address = Some("Address is required".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("sign in to continue")]
    SignInRequired,

    #[error("delivery details are incomplete")]
    InvalidDelivery(DeliveryInfoErrors),

    #[error("cart is empty")]
    EmptyCart,

    #[error("an order is already being placed")]
    AlreadyPlacing,

    #[error("submission is only available at the payment step")]
    WrongStep,

    #[error("could not place the order, please try again")]
    OrderFailed,
}

/// Drives a cart through delivery details to payment and submission.
pub struct CheckoutFlow {
    step: CheckoutStep,
    delivery_info: DeliveryInfo,
    payment_method: PaymentMethod,
    is_placing_order: bool,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self {
            step: CheckoutStep::Cart,
            delivery_info: DeliveryInfo {
                name: String::new(),
                phone: String::new(),
                address: String::new(),
                instructions: None,
            },
            payment_method: PaymentMethod::default(),
            is_placing_order: false,
        }
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn is_placing_order(&self) -> bool {
        self.is_placing_order
    }

    pub fn delivery_info(&self) -> &DeliveryInfo {
        &self.delivery_info
    }

    pub fn set_delivery_info(&mut self, info: DeliveryInfo) {
        self.delivery_info = info;
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    /// Advances one step. `Cart -> Delivery` requires a session,
    /// `Delivery -> Payment` requires valid delivery details; a failed gate
    /// holds the current step.
    pub fn next(&mut self, signed_in: bool) -> Result<CheckoutStep, CheckoutError> {
        match self.step {
            CheckoutStep::Cart => {
                if !signed_in {
                    return Err(CheckoutError::SignInRequired);
                }
                self.step = CheckoutStep::Delivery;
            }
            CheckoutStep::Delivery => {
                validate_delivery(&self.delivery_info).map_err(CheckoutError::InvalidDelivery)?;
                self.step = CheckoutStep::Payment;
            }
            CheckoutStep::Payment => {}
        }
        Ok(self.step)
    }

    /// Steps backward; always allowed, `Cart` is the floor.
    pub fn back(&mut self) -> CheckoutStep {
        self.step = match self.step {
            CheckoutStep::Payment => CheckoutStep::Delivery,
            CheckoutStep::Delivery | CheckoutStep::Cart => CheckoutStep::Cart,
        };
        self.step
    }

    /// Submits the order from the `Payment` step. Re-validates everything the
    /// earlier gates checked and suppresses double submission with the
    /// `is_placing_order` flag. Success clears the cart (server side and
    /// local); failure holds the step for a retry.
    pub async fn submit(&mut self, store: &mut CartStore) -> Result<OrderResponse, CheckoutError> {
        if self.step != CheckoutStep::Payment {
            return Err(CheckoutError::WrongStep);
        }
        if self.is_placing_order {
            return Err(CheckoutError::AlreadyPlacing);
        }
        if store.state().items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if !store.is_signed_in() {
            return Err(CheckoutError::SignInRequired);
        }
        validate_delivery(&self.delivery_info).map_err(CheckoutError::InvalidDelivery)?;

        self.is_placing_order = true;
        let result = store
            .place_order(&self.delivery_info, self.payment_method)
            .await;
        self.is_placing_order = false;

        match result {
            Ok(order) => Ok(order),
            Err(e) => {
                warn!("Order submission failed: {}", e);
                Err(CheckoutError::OrderFailed)
            }
        }
    }
}

impl From<ClientError> for CheckoutError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::EmptyCart => CheckoutError::EmptyCart,
            ClientError::Validation(errors) => CheckoutError::InvalidDelivery(errors),
            _ => CheckoutError::OrderFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_delivery() -> DeliveryInfo {
        DeliveryInfo {
            name: "Asha".to_string(),
            phone: "98765 43210".to_string(),
            address: "12 MG Road".to_string(),
            instructions: Some("Ring twice".to_string()),
        }
    }

    #[test]
    fn anonymous_flow_never_leaves_cart() {
        let mut flow = CheckoutFlow::new();
        assert!(matches!(
            flow.next(false),
            Err(CheckoutError::SignInRequired)
        ));
        assert_eq!(flow.step(), CheckoutStep::Cart);
    }

    #[test]
    fn invalid_delivery_holds_the_step() {
        let mut flow = CheckoutFlow::new();
        flow.next(true).unwrap();
        assert_eq!(flow.step(), CheckoutStep::Delivery);

        let err = flow.next(true).unwrap_err();
        match err {
            CheckoutError::InvalidDelivery(errors) => {
                assert!(errors.name.is_some());
                assert!(errors.phone.is_some());
                assert!(errors.address.is_some());
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(flow.step(), CheckoutStep::Delivery);
    }

    #[test]
    fn valid_delivery_reaches_payment() {
        let mut flow = CheckoutFlow::new();
        flow.next(true).unwrap();
        flow.set_delivery_info(valid_delivery());
        assert_eq!(flow.next(true).unwrap(), CheckoutStep::Payment);
        // next at the last step stays put
        assert_eq!(flow.next(true).unwrap(), CheckoutStep::Payment);
    }

    #[test]
    fn back_is_always_allowed() {
        let mut flow = CheckoutFlow::new();
        flow.next(true).unwrap();
        flow.set_delivery_info(valid_delivery());
        flow.next(true).unwrap();

        assert_eq!(flow.back(), CheckoutStep::Delivery);
        assert_eq!(flow.back(), CheckoutStep::Cart);
        assert_eq!(flow.back(), CheckoutStep::Cart);
    }

    #[test]
    fn phone_is_normalized_before_validation() {
        let mut info = valid_delivery();
        info.phone = "98765-43210".to_string();
        assert!(validate_delivery(&info).is_ok());

        info.phone = "98765".to_string();
        assert!(validate_delivery(&info).is_err());
    }
}
