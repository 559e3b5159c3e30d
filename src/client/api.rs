use crate::client::store::CartLine;
use crate::client::ClientError;
use crate::entities::order::PaymentMethod;
use crate::errors::ErrorResponse;
use crate::services::carts::{AddItemInput, CartResponse};
use crate::services::orders::{DeliveryInfo, OrderResponse};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Remote cart operations the store depends on. Abstracted behind a trait so
/// tests can stub the wire.
#[async_trait]
pub trait CartApi: Send + Sync {
    async fn fetch_cart(&self, owner_id: &str) -> Result<CartResponse, ClientError>;
    async fn add_item(&self, owner_id: &str, line: &CartLine) -> Result<CartResponse, ClientError>;
    async fn clear_cart(&self, owner_id: &str) -> Result<CartResponse, ClientError>;
    async fn place_order(
        &self,
        owner_id: &str,
        delivery_info: &DeliveryInfo,
        payment_method: PaymentMethod,
    ) -> Result<OrderResponse, ClientError>;
}

/// `CartApi` backed by the REST surface.
#[derive(Debug, Clone)]
pub struct RestCartApi {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct OrderEnvelope {
    order: OrderResponse,
}

#[derive(Debug, serde::Serialize)]
struct CreateOrderBody<'a> {
    delivery_info: &'a DeliveryInfo,
    payment_method: PaymentMethod,
}

impl RestCartApi {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CartApi for RestCartApi {
    async fn fetch_cart(&self, owner_id: &str) -> Result<CartResponse, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/cart/{}", owner_id)))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn add_item(&self, owner_id: &str, line: &CartLine) -> Result<CartResponse, ClientError> {
        let body = AddItemInput {
            item_id: line.id.clone(),
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            image_ref: line.image_ref.clone(),
            restaurant_id: line.restaurant_id.clone(),
            restaurant_name: line.restaurant_name.clone(),
        };
        let response = self
            .http
            .post(self.url(&format!("/cart/{}", owner_id)))
            .json(&body)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn clear_cart(&self, owner_id: &str) -> Result<CartResponse, ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/cart/{}", owner_id)))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn place_order(
        &self,
        owner_id: &str,
        delivery_info: &DeliveryInfo,
        payment_method: PaymentMethod,
    ) -> Result<OrderResponse, ClientError> {
        let body = CreateOrderBody {
            delivery_info,
            payment_method,
        };
        let response = self
            .http
            .post(self.url(&format!("/orders/{}", owner_id)))
            .json(&body)
            .send()
            .await?;
        let envelope: OrderEnvelope = Self::parse(response).await?;
        Ok(envelope.order)
    }
}
