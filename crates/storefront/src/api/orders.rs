//! Order endpoints. Both require a bearer token.

use tracing::{debug, instrument};

use super::types::{CreateOrderResponse, OrderRequest, OrderSummary};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Place an order.
    ///
    /// A `200` with `success: false` is returned as-is; callers decide how to
    /// report it.
    ///
    /// # Errors
    ///
    /// Returns an error if no response arrives or the server rejects the order.
    #[instrument(skip(self, token, order), fields(
        method = %order.payment_method,
        lines = order.order_items.len(),
        total = %order.total_amount,
    ))]
    pub async fn create_order(
        &self,
        token: &str,
        order: &OrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        let response: CreateOrderResponse = self
            .send(self.post(&["orders"])?.bearer_auth(token).json(order))
            .await?;
        debug!(success = response.success, "order request answered");
        Ok(response)
    }

    /// Orders placed by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn my_orders(&self, token: &str) -> Result<Vec<OrderSummary>, ApiError> {
        self.send(self.get(&["orders", "myorders"])?.bearer_auth(token))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mangaverse_core::{PaymentMethod, Price, ProductId};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::test_support::client_for;
    use crate::api::types::OrderLine;
    use crate::checkout::ShippingInfo;

    fn order() -> OrderRequest {
        OrderRequest {
            order_items: vec![OrderLine {
                product_id: ProductId::new("p1"),
                name: "Vagabond 1".to_string(),
                quantity: 2,
                price: Price::from_cents(1000).unwrap(),
            }],
            shipping_address: ShippingInfo {
                full_name: "Musashi Miyamoto".to_string(),
                address_line1: "1 Castle Rd".to_string(),
                address_line2: None,
                city: "Kyoto".to_string(),
                state: None,
                postal_code: None,
                country: "Japan".to_string(),
                phone: "+81 90 0000 0000".to_string(),
            },
            payment_method: PaymentMethod::CashOnDelivery,
            payment_details: None,
            payment_result: None,
            total_amount: Price::from_cents(2000).unwrap(),
        }
    }

    #[tokio::test]
    async fn create_order_sends_bearer_and_contract() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/orders"))
            .and(header("authorization", "Bearer tok"))
            .and(body_partial_json(json!({
                "paymentMethod": "cod",
                "totalAmount": 20.0,
                "orderItems": [{"productId": "p1", "name": "Vagabond 1", "quantity": 2, "price": 10.0}],
                "shippingAddress": {"fullName": "Musashi Miyamoto", "addressLine1": "1 Castle Rd"}
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"success": true, "order": {"_id": "o-1"}})),
            )
            .mount(&server)
            .await;

        let api = client_for(&server.uri());
        let response = api.create_order("tok", &order()).await.unwrap();
        assert!(response.success);
        assert_eq!(response.order.unwrap().id.as_str(), "o-1");
    }

    #[tokio::test]
    async fn rejection_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/orders"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Out of stock"})))
            .mount(&server)
            .await;

        let api = client_for(&server.uri());
        let err = api.create_order("tok", &order()).await.unwrap_err();
        assert_eq!(err.server_message(), Some("Out of stock"));
    }

    #[tokio::test]
    async fn unreachable_server() {
        let api = client_for("http://127.0.0.1:9");
        let err = api.create_order("tok", &order()).await.unwrap_err();
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn my_orders_lists_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/orders/myorders"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "_id": "o-1",
                "createdAt": "2025-01-02T03:04:05Z",
                "totalAmount": 20,
                "paymentMethod": "cod",
                "status": "pending",
                "orderItems": [{"name": "Vagabond 1", "quantity": 2, "price": 10}]
            }])))
            .mount(&server)
            .await;

        let api = client_for(&server.uri());
        let orders = api.my_orders("tok").await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].total_amount, Price::from_cents(2000).unwrap());
    }
}
